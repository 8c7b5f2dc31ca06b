// src/calculator/dispatcher.rs
//! Picks a calculator for a free-form request and pre-fills what the
//! visitor already told us.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{Answer, Answers, CalculatorKind, Step, parse};

const SOCKET_KEYWORDS: &[&str] = &["розетк", "выключател", "переключател", "диммер"];
const LIGHTING_KEYWORDS: &[&str] =
    &["светильник", "свет", "освещени", "лампочк", "люстр", "спот", "трек"];
/// Matched as whole words only ("бра", not "собрать").
const LIGHTING_WORDS: &[&str] = &["бра"];
const PANEL_KEYWORDS: &[&str] = &["щит", "автомат", "узо", "счетчик", "дифавтомат", "рубильник"];
const CABLING_KEYWORDS: &[&str] =
    &["кабель", "проводк", "провод", "штроб", "гофр", "трасс", "канал"];

static AREA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:[.,]\d+)?)\s*(?:кв\.?\s*м|м2|м²|квадрат)").expect("valid area regex")
});

fn keyword_hits(message: &str, keywords: &[&str]) -> usize {
    keywords.iter().map(|kw| message.matches(kw).count()).sum()
}

fn word_hits(message: &str, words: &[&str]) -> usize {
    message
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| words.contains(word))
        .count()
}

/// Calculator best matching the message. Several services → combined calculator.
pub fn detect_kind(message: &str) -> CalculatorKind {
    let lower = message.to_lowercase();
    let counts = [
        (CalculatorKind::Socket, keyword_hits(&lower, SOCKET_KEYWORDS)),
        (
            CalculatorKind::Lighting,
            keyword_hits(&lower, LIGHTING_KEYWORDS) + word_hits(&lower, LIGHTING_WORDS),
        ),
        (CalculatorKind::Panel, keyword_hits(&lower, PANEL_KEYWORDS)),
        (CalculatorKind::Cabling, keyword_hits(&lower, CABLING_KEYWORDS)),
    ];
    debug!(?counts, "calculator keyword hits");

    let matched = counts.iter().filter(|(_, n)| *n > 0).count();
    match matched {
        0 => CalculatorKind::General,
        1 => counts
            .iter()
            .max_by_key(|(_, n)| *n)
            .map(|(kind, _)| *kind)
            .unwrap_or(CalculatorKind::General),
        _ => CalculatorKind::Multi,
    }
}

/// Parameters mentioned in passing ("квартира 60 м2, кирпич").
pub fn extract_params(message: &str) -> Answers {
    let lower = message.to_lowercase();
    let mut answers = Answers::new();

    let property = if ["квартир", "комнат"].iter().any(|w| lower.contains(w)) {
        Some("apartment")
    } else if ["коттедж", "частн", "дом"].iter().any(|w| lower.contains(w)) {
        Some("house")
    } else if ["офис", "кабинет"].iter().any(|w| lower.contains(w)) {
        Some("office")
    } else {
        None
    };
    if let Some(property) = property {
        answers.insert(Step::PropertyType, Answer::Choice(property.to_string()));
    }

    if let Some(area) = AREA
        .captures(&lower)
        .and_then(|caps| parse::parse_positive(&caps[1]))
    {
        answers.insert(Step::Area, Answer::Number(area));
    }

    let wall = if lower.contains("кирпич") {
        Some("brick")
    } else if lower.contains("бетон") {
        Some("concrete")
    } else if lower.contains("гипсокартон") || lower.contains("гкл") {
        Some("drywall")
    } else {
        None
    };
    if let Some(wall) = wall {
        answers.insert(Step::WallMaterial, Answer::Choice(wall.to_string()));
    }

    debug!(?answers, "extracted calculator parameters");
    answers
}

pub fn detect_details(message: &str) -> (CalculatorKind, Answers) {
    (detect_kind(message), extract_params(message))
}

/// Commands a completion may carry to hand the conversation to a calculator.
/// Longer commands come first so a prefix never shadows them.
const LAUNCH_COMMANDS: &[(&str, Option<CalculatorKind>)] = &[
    ("ЗАПУСТИТЬ_МНОГОФУНКЦИОНАЛЬНЫЙ_КАЛЬКУЛЯТОР", Some(CalculatorKind::Multi)),
    ("ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_ОСВЕЩЕНИЕ", Some(CalculatorKind::Lighting)),
    ("ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_ОСВЕЩЕНИЯ", Some(CalculatorKind::Lighting)),
    ("ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_РОЗЕТКИ", Some(CalculatorKind::Socket)),
    ("ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_КАБЕЛЕЙ", Some(CalculatorKind::Cabling)),
    ("ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_КАБЕЛЬ", Some(CalculatorKind::Cabling)),
    ("ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_ЩИТОВ", Some(CalculatorKind::Panel)),
    ("ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_ЩИТЫ", Some(CalculatorKind::Panel)),
    // kind is taken from the visitor's own message
    ("ЗАПУСТИТЬ_КАЛЬКУЛЯТОР", None),
];

/// Calculator named by a launch command in `completion`. A bare command
/// resolves the calculator from `user_message`.
pub fn find_launch_command(completion: &str, user_message: &str) -> Option<CalculatorKind> {
    let (command, kind) = LAUNCH_COMMANDS
        .iter()
        .find(|(command, _)| completion.contains(command))?;
    let kind = kind.unwrap_or_else(|| detect_kind(user_message));
    debug!(command, calculator = kind.as_str(), "launch command in completion");
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_by_keywords() {
        assert_eq!(detect_kind("Нужно поставить 5 розеток"), CalculatorKind::Socket);
        assert_eq!(detect_kind("Собрать электрощит с УЗО"), CalculatorKind::Panel);
        assert_eq!(detect_kind("розетки и светильники"), CalculatorKind::Multi);
        assert_eq!(detect_kind("сколько стоит работа"), CalculatorKind::General);
        assert_eq!(detect_kind("Нужны бра в спальню"), CalculatorKind::Lighting);
        assert_eq!(detect_kind("Проложить кабель-канал"), CalculatorKind::Cabling);
    }

    #[test]
    fn params_from_free_text() {
        let answers = extract_params("Квартира 62,5 м2, стены кирпичные");
        assert_eq!(answers.choice(Step::PropertyType), Some("apartment"));
        assert_eq!(answers.number(Step::Area), Some(62.5));
        assert_eq!(answers.choice(Step::WallMaterial), Some("brick"));

        assert!(extract_params("просто вопрос").is_empty());
        assert!(!extract_params("склад 99999999 м2").contains(Step::Area));
    }

    #[test]
    fn launch_commands() {
        assert_eq!(
            find_launch_command("Давайте посчитаем. ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_ЩИТЫ", ""),
            Some(CalculatorKind::Panel)
        );
        assert_eq!(
            find_launch_command("ЗАПУСТИТЬ_КАЛЬКУЛЯТОР", "хочу розетки"),
            Some(CalculatorKind::Socket)
        );

        assert!(find_launch_command("Обычный ответ", "розетки").is_none());
    }
}
