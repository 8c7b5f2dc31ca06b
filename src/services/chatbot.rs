// src/services/chatbot.rs
//! Decides how a chat message is answered: an active calculator dialog, a
//! new calculation, or the language model.

use tracing::{info, warn};

use crate::calculator::dispatcher::{detect_details, extract_params, find_launch_command};
use crate::calculator::{CalculatorDialog, CalculatorKind, Turn};
use crate::state::AppState;

pub const REPHRASE_REPLY: &str =
    "Извините, не смог сформировать ответ. Попробуйте переформулировать вопрос.";
pub const LLM_ERROR_REPLY: &str =
    "Извините, произошла ошибка. Попробуйте позже или обратитесь к нашим специалистам.";

/// Questions about the service list, not requests for a price.
const EXCLUSION_PHRASES: &[&str] = &[
    "какие есть услуги",
    "что за услуги",
    "какие услуги",
    "перечень услуг",
    "список услуг",
    "виды услуг",
    "ваши услуги",
    "услуги компании",
    "какие работы",
    "что делаете",
    "чем занимаетесь",
];

const PRICE_PHRASES: &[&str] = &[
    "расчет стоимости",
    "рассчитать стоимость",
    "сколько стоит",
    "калькулятор",
    "цена за",
    "стоимость работ",
    "во сколько обойдется",
    "посчитайте стоимость",
    "хочу рассчитать",
    "нужен расчет",
];

const MULTI_SERVICE_PHRASES: &[&str] = &[
    "несколько услуг",
    "комплекс услуг",
    "разные услуги",
    "много услуг",
    "все услуги",
    "комплексный",
    "мне надо несколько",
    "нужно несколько",
    "хочу несколько",
];

const SPECIFIC_NEEDS: &[&str] = &[
    "нужны розетки",
    "нужно освещение",
    "нужен щит",
    "нужна проводка",
    "установить розетки",
    "поставить выключатели",
    "подключить светильники",
    "монтаж розеток",
    "монтаж освещения",
    "монтаж щита",
    "проложить кабель",
    "провести проводку",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationIntent {
    Price,
    MultiService,
    SpecificNeed,
}

/// Whether the visitor is asking for a price estimate.
pub fn detect_calculation_intent(message: &str) -> Option<CalculationIntent> {
    let lower = message.to_lowercase();
    let has = |phrases: &[&str]| phrases.iter().any(|p| lower.contains(p));

    if has(EXCLUSION_PHRASES) {
        None
    } else if has(PRICE_PHRASES) {
        Some(CalculationIntent::Price)
    } else if has(MULTI_SERVICE_PHRASES) {
        Some(CalculationIntent::MultiService)
    } else if has(SPECIFIC_NEEDS) {
        Some(CalculationIntent::SpecificNeed)
    } else {
        None
    }
}

/// Produce the bot's reply to `message`. The user message must already be in
/// the session history.
pub async fn generate_reply(state: &AppState, session_id: &str, message: &str) -> String {
    if let Some(dialog) = state.sessions.take_dialog(session_id).await {
        state.metrics.increment_route("calculator_dialog").await;
        let turn = dialog.advance(message);
        return apply_turn(state, session_id, turn).await;
    }

    if let Some(intent) = detect_calculation_intent(message) {
        let (mut kind, known) = detect_details(message);
        if intent == CalculationIntent::MultiService && kind == CalculatorKind::General {
            kind = CalculatorKind::Multi;
        }
        info!(?intent, calculator = kind.as_str(), "calculation requested");
        state.metrics.increment_route("calculation_intent").await;
        return start_calculator(state, session_id, kind, known).await;
    }

    let history = state.sessions.get_history(session_id).await.unwrap_or_default();
    match state.llm.complete(&state.system_prompt, &history).await {
        Ok(completion) => {
            if let Some(kind) = find_launch_command(&completion, message) {
                state.metrics.increment_route("llm_calculator").await;
                return start_calculator(state, session_id, kind, extract_params(message)).await;
            }
            state.metrics.increment_route("llm").await;
            let completion = completion.trim();
            if completion.is_empty() {
                REPHRASE_REPLY.to_string()
            } else {
                completion.to_string()
            }
        }
        Err(e) => {
            warn!(error = %e, "completion failed");
            state.metrics.increment_route("llm_error").await;
            LLM_ERROR_REPLY.to_string()
        }
    }
}

async fn start_calculator(
    state: &AppState,
    session_id: &str,
    kind: CalculatorKind,
    known: crate::calculator::Answers,
) -> String {
    state.metrics.increment_calculator(kind).await;
    let turn = CalculatorDialog::start(kind, known);
    apply_turn(state, session_id, turn).await
}

async fn apply_turn(state: &AppState, session_id: &str, turn: Turn) -> String {
    state.sessions.set_dialog(session_id, turn.dialog).await;
    if let Some(estimate) = turn.estimate {
        state.metrics.record_estimate().await;
        state.sessions.set_last_estimate(session_id, estimate).await;
    }
    turn.reply
}
