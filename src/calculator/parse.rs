// src/calculator/parse.rs
//! Prompts and answer parsers shared by the calculators.
//!
//! Menu answers are accepted either as the option number or as a keyword
//! contained in the reply ("кирпич", "натяжной", ...).

use std::sync::LazyLock;

use regex::Regex;

use super::{Answer, Step};

pub type Options = &'static [(&'static str, &'static str)];

/// Largest device count accepted in a single answer.
pub const MAX_COUNT: u32 = 1000;
/// Largest area, length or height accepted in a single answer.
pub const MAX_MEASURE: f64 = 100_000.0;

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid integer regex"));
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("valid decimal regex"));

pub const PROPERTY_PROMPT: &str = "Выберите тип объекта:\n\
1. Квартира\n\
2. Дом/коттедж\n\
3. Офис\n\
4. Коммерческое помещение\n\
5. Промышленное помещение";

pub const WALL_PROMPT: &str = "Выберите материал стен:\n\
1. Гипсокартон\n\
2. Кирпич\n\
3. Бетон\n\
4. Дерево\n\
5. Газоблок/пеноблок";

pub const AREA_PROMPT: &str = "Укажите площадь помещения в квадратных метрах:";

pub const COMPLEXITY_PROMPT: &str = "Выберите сложность монтажа:\n\
1. Простой монтаж (стандартное расположение)\n\
2. Стандартная сложность\n\
3. Сложный монтаж (нестандартное расположение, дополнительные работы)";

pub const COMPLEXITY_EXTENDED_PROMPT: &str = "Выберите сложность монтажа:\n\
1. Простой монтаж (стандартное расположение)\n\
2. Стандартная сложность\n\
3. Сложный монтаж (нестандартное расположение)\n\
4. Очень сложный монтаж (фигурные потолки, сложная схема подключения)";

pub const SERVICE_PROMPT: &str = "Какую услугу рассчитать?\n\
1. Монтаж розеток и выключателей\n\
2. Монтаж освещения\n\
3. Монтаж электрощита\n\
4. Прокладка кабеля и проводки";

pub const PROPERTY_OPTIONS: Options = &[
    ("1", "apartment"),
    ("2", "house"),
    ("3", "office"),
    ("4", "commercial"),
    ("5", "industrial"),
    ("квартир", "apartment"),
    ("коттедж", "house"),
    ("дом", "house"),
    ("офис", "office"),
    ("коммерч", "commercial"),
    ("промышл", "industrial"),
];

pub const WALL_OPTIONS: Options = &[
    ("1", "drywall"),
    ("2", "brick"),
    ("3", "concrete"),
    ("4", "wood"),
    ("5", "block"),
    ("гипсокартон", "drywall"),
    ("гкл", "drywall"),
    ("кирпич", "brick"),
    ("бетон", "concrete"),
    ("дерев", "wood"),
    ("газоблок", "block"),
    ("пеноблок", "block"),
];

pub const COMPLEXITY_OPTIONS: Options = &[
    ("1", "easy"),
    ("2", "standard"),
    ("3", "complex"),
    ("прост", "easy"),
    ("стандарт", "standard"),
    ("сложн", "complex"),
];

pub const COMPLEXITY_EXTENDED_OPTIONS: Options = &[
    ("1", "easy"),
    ("2", "standard"),
    ("3", "complex"),
    ("4", "very_complex"),
    ("очень сложн", "very_complex"),
    ("прост", "easy"),
    ("стандарт", "standard"),
    ("сложн", "complex"),
];

pub const SERVICE_OPTIONS: Options = &[
    ("1", "socket"),
    ("2", "lighting"),
    ("3", "panel"),
    ("4", "cabling"),
    ("розетк", "socket"),
    ("выключат", "socket"),
    ("свет", "lighting"),
    ("щит", "panel"),
    ("кабел", "cabling"),
    ("провод", "cabling"),
];

pub fn common_prompt(step: Step) -> &'static str {
    match step {
        Step::PropertyType => PROPERTY_PROMPT,
        Step::WallMaterial => WALL_PROMPT,
        Step::Area => AREA_PROMPT,
        Step::Complexity => COMPLEXITY_PROMPT,
        Step::Services => SERVICE_PROMPT,
        _ => "Укажите значение:",
    }
}

pub fn parse_common(step: Step, input: &str) -> Option<Answer> {
    match step {
        Step::PropertyType => parse_option(input, PROPERTY_OPTIONS).map(Answer::Choice),
        Step::WallMaterial => parse_option(input, WALL_OPTIONS).map(Answer::Choice),
        Step::Complexity => parse_option(input, COMPLEXITY_OPTIONS).map(Answer::Choice),
        Step::Area => parse_positive(input).map(Answer::Number),
        Step::SocketSingles
        | Step::SocketDoubles
        | Step::SocketPower
        | Step::SwitchSingles
        | Step::SwitchDoubles
        | Step::Chandeliers
        | Step::SpotLights
        | Step::WallLights
        | Step::CircuitBreakers
        | Step::RcdCount
        | Step::DiffAutoCount => parse_count(input).map(Answer::Count),
        _ => None,
    }
}

fn is_number_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_digit())
}

/// Match a menu answer by option number or keyword.
pub fn parse_option(input: &str, options: Options) -> Option<String> {
    let lower = input.trim().to_lowercase();
    let lower = lower.trim_end_matches(['.', ')']);
    if lower.is_empty() {
        return None;
    }

    if is_number_key(lower) {
        return options
            .iter()
            .find(|(key, _)| *key == lower)
            .map(|(_, value)| value.to_string());
    }

    options
        .iter()
        .filter(|(key, _)| !is_number_key(key))
        .find(|(key, _)| lower.contains(key))
        .map(|(_, value)| value.to_string())
}

/// First integer in the reply; "нет"/"не" count as zero. Counts above
/// [`MAX_COUNT`] are rejected.
pub fn parse_count(input: &str) -> Option<u32> {
    if let Some(found) = INTEGER.find(input) {
        return found.as_str().parse().ok().filter(|count| *count <= MAX_COUNT);
    }
    let lower = input.trim().to_lowercase();
    if lower == "не" || lower.contains("нет") || lower.contains("не ") {
        Some(0)
    } else {
        None
    }
}

/// First decimal number in the reply, accepting `,` as the separator.
pub fn parse_decimal(input: &str) -> Option<f64> {
    DECIMAL
        .find(input)
        .and_then(|found| found.as_str().replace(',', ".").parse().ok())
}

/// Positive finite number no larger than [`MAX_MEASURE`].
pub fn parse_positive(input: &str) -> Option<f64> {
    parse_decimal(input).filter(|value| value.is_finite() && *value > 0.0 && *value <= MAX_MEASURE)
}

pub fn parse_flag(input: &str) -> Option<bool> {
    let lower = input.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    if lower == "не"
        || lower == "no"
        || lower == "0"
        || lower.contains("нет")
        || lower.contains("не ")
    {
        return Some(false);
    }
    const YES: [&str; 7] = ["да", "yes", "1", "нужно", "нужен", "требу", "конечно"];
    if YES.iter().any(|word| lower.contains(word)) {
        Some(true)
    } else {
        None
    }
}

/// Comma separated menu numbers. An explicit "0" / "нет" selects nothing.
pub fn parse_items(input: &str, options: Options) -> Option<Vec<String>> {
    let lower = input.trim().to_lowercase();
    if lower == "0" || lower.contains("нет") || lower.contains("не треб") {
        return Some(Vec::new());
    }

    let mut selected: Vec<String> = Vec::new();
    for found in INTEGER.find_iter(&lower) {
        if let Some((_, value)) = options.iter().find(|(key, _)| *key == found.as_str()) {
            if !selected.iter().any(|s| s == value) {
                selected.push(value.to_string());
            }
        }
    }

    if selected.is_empty() { None } else { Some(selected) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_by_number_and_keyword() {
        assert_eq!(parse_option("2", WALL_OPTIONS).as_deref(), Some("brick"));
        assert_eq!(parse_option("3.", WALL_OPTIONS).as_deref(), Some("concrete"));
        assert_eq!(parse_option("Стены из кирпича", WALL_OPTIONS).as_deref(), Some("brick"));
        assert_eq!(parse_option("12", WALL_OPTIONS), None);
        assert_eq!(parse_option("", WALL_OPTIONS), None);
    }

    #[test]
    fn very_complex_wins_over_complex() {
        assert_eq!(
            parse_option("очень сложный", COMPLEXITY_EXTENDED_OPTIONS).as_deref(),
            Some("very_complex")
        );
        assert_eq!(parse_option("сложный", COMPLEXITY_OPTIONS).as_deref(), Some("complex"));
    }

    #[test]
    fn counts_and_numbers() {
        assert_eq!(parse_count("нужно 5 штук"), Some(5));
        assert_eq!(parse_count("нет"), Some(0));
        assert_eq!(parse_count("много"), None);
        assert_eq!(parse_decimal("2,7 м"), Some(2.7));
        assert_eq!(parse_positive("0"), None);
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        assert_eq!(parse_count("1000"), Some(1000));
        assert_eq!(parse_count("1001"), None);
        assert_eq!(parse_count("4000000000"), None);
        assert_eq!(parse_count("99999999999999999999"), None);

        assert_eq!(parse_positive("100000"), Some(100_000.0));
        assert_eq!(parse_positive("100001"), None);
        // parses to infinity
        let huge = "9".repeat(400);
        assert_eq!(parse_decimal(&huge), Some(f64::INFINITY));
        assert_eq!(parse_positive(&huge), None);
    }

    #[test]
    fn flags_and_items() {
        assert_eq!(parse_flag("Да"), Some(true));
        assert_eq!(parse_flag("не нужно"), Some(false));
        assert_eq!(parse_flag("может быть"), None);

        let options: Options = &[("1", "a"), ("2", "b")];
        assert_eq!(parse_items("1, 2, 2", options), Some(vec!["a".into(), "b".into()]));
        assert_eq!(parse_items("0", options), Some(vec![]));
        assert_eq!(parse_items("7", options), None);
    }
}
