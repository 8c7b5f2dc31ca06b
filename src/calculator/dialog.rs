// src/calculator/dialog.rs
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::parse::{self, SERVICE_OPTIONS, SERVICE_PROMPT};
use super::{Answers, Calculator, CalculatorKind, Estimate, Step, calculator_for};
use crate::message::CONTACT_FORM_SENTINEL;

const CANCEL_WORDS: [&str; 4] = ["отмена", "стоп", "прервать", "отменить"];

pub const CANCELLED_REPLY: &str = "Расчет стоимости отменен. Чем еще я могу вам помочь?";
const INVALID_REPLY: &str = "Не удалось распознать ответ. Попробуйте еще раз.";
const BROKEN_REPLY: &str = "Произошла ошибка. Пожалуйста, начните расчет заново.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "step", rename_all = "snake_case")]
pub enum Stage {
    ChoosingService,
    Asking(Step),
}

/// An in-progress calculator conversation for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorDialog {
    kind: CalculatorKind,
    stage: Stage,
    answers: Answers,
}

/// Outcome of one dialog turn.
#[derive(Debug, Clone)]
pub struct Turn {
    pub reply: String,
    /// Dialog to keep on the session; `None` once it finished or was cancelled.
    pub dialog: Option<CalculatorDialog>,
    pub estimate: Option<Estimate>,
}

impl Turn {
    fn ask(dialog: CalculatorDialog, reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), dialog: Some(dialog), estimate: None }
    }

    fn end(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), dialog: None, estimate: None }
    }
}

pub fn is_cancel(input: &str) -> bool {
    let lower = input.trim().to_lowercase();
    CANCEL_WORDS.contains(&lower.as_str())
}

impl CalculatorDialog {
    /// Start a dialog, skipping every step already answered in `known`.
    pub fn start(kind: CalculatorKind, known: Answers) -> Turn {
        info!(calculator = kind.as_str(), known = ?known, "starting calculator dialog");
        match calculator_for(kind) {
            Some(calculator) => {
                let mut answers = known;
                answers.retain_steps(calculator.steps());
                Self::next(calculator, answers)
            }
            None => Turn::ask(
                Self { kind, stage: Stage::ChoosingService, answers: known },
                SERVICE_PROMPT,
            ),
        }
    }

    /// Feed the visitor's reply into the current step.
    pub fn advance(self, input: &str) -> Turn {
        if is_cancel(input) {
            info!(calculator = self.kind.as_str(), "calculator dialog cancelled");
            return Turn::end(CANCELLED_REPLY);
        }

        match self.stage {
            Stage::ChoosingService => {
                let chosen = parse::parse_option(input, SERVICE_OPTIONS)
                    .and_then(|code| CalculatorKind::from_code(&code));
                match chosen {
                    Some(kind) => Self::start(kind, self.answers),
                    None => Turn::ask(self, format!("{INVALID_REPLY}\n\n{SERVICE_PROMPT}")),
                }
            }
            Stage::Asking(step) => {
                let Some(calculator) = calculator_for(self.kind) else {
                    warn!(
                        calculator = self.kind.as_str(),
                        "dialog asking a step without a calculator"
                    );
                    return Turn::end(BROKEN_REPLY);
                };
                match calculator.parse(step, input) {
                    Some(answer) => {
                        debug!(?step, ?answer, "answer accepted");
                        let mut answers = self.answers;
                        answers.insert(step, answer);
                        let note = calculator.note(step, &answers);
                        let mut turn = Self::next(calculator, answers);
                        if let Some(note) = note {
                            turn.reply = format!("{note}\n\n{}", turn.reply);
                        }
                        turn
                    }
                    None => {
                        debug!(?step, input, "answer rejected");
                        let prompt = calculator.prompt(step);
                        Turn::ask(self, format!("{INVALID_REPLY}\n\n{prompt}"))
                    }
                }
            }
        }
    }

    fn next(calculator: &dyn Calculator, answers: Answers) -> Turn {
        let pending = calculator
            .steps()
            .iter()
            .copied()
            .find(|step| !answers.contains(*step) && calculator.applies(*step, &answers));
        match pending {
            Some(step) => Turn::ask(
                Self { kind: calculator.kind(), stage: Stage::Asking(step), answers },
                calculator.prompt(step),
            ),
            None => {
                let estimate = calculator.estimate(&answers);
                info!(
                    calculator = calculator.kind().as_str(),
                    total = estimate.total,
                    "calculation finished"
                );
                Turn {
                    reply: format!("{}\n\n{}", estimate.render(), CONTACT_FORM_SENTINEL),
                    dialog: None,
                    estimate: Some(estimate),
                }
            }
        }
    }

    pub fn kind(&self) -> CalculatorKind {
        self.kind
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::Answer;

    #[test]
    fn known_steps_are_skipped() {
        let known: Answers =
            [(Step::PropertyType, Answer::Choice("house".into()))].into_iter().collect();
        let turn = CalculatorDialog::start(CalculatorKind::Socket, known);
        let dialog = turn.dialog.expect("dialog continues");
        assert_eq!(dialog.stage(), Stage::Asking(Step::WallMaterial));
        assert!(turn.reply.contains("материал стен"));
    }

    #[test]
    fn general_dialog_switches_to_chosen_service() {
        let turn = CalculatorDialog::start(CalculatorKind::General, Answers::new());
        assert_eq!(turn.reply, SERVICE_PROMPT);

        let turn = turn.dialog.unwrap().advance("2");
        let dialog = turn.dialog.unwrap();
        assert_eq!(dialog.kind(), CalculatorKind::Lighting);
        assert_eq!(dialog.stage(), Stage::Asking(Step::PropertyType));
    }

    #[test]
    fn cancel_ends_dialog() {
        let turn = CalculatorDialog::start(CalculatorKind::Panel, Answers::new());
        let turn = turn.dialog.unwrap().advance("Отмена");
        assert!(turn.dialog.is_none());
        assert_eq!(turn.reply, CANCELLED_REPLY);
    }
}
