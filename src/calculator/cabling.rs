// src/calculator/cabling.rs
use super::estimate::{Estimate, EstimateLine, format_quantity};
use super::parse::{self, Options};
use super::prices;
use super::{Answer, Answers, Calculator, CalculatorKind, Step};

const STEPS: &[Step] = &[
    Step::PropertyType,
    Step::Area,
    Step::WallMaterial,
    Step::CablingType,
    Step::CableLength,
    Step::CableSection,
    Step::Complexity,
];

const CABLING_OPTIONS: Options = &[
    ("1", "open"),
    ("2", "hidden"),
    ("3", "cable_channel"),
    ("4", "corrugation"),
    ("5", "ground"),
    ("6", "overhead"),
    ("открыт", "open"),
    ("скрыт", "hidden"),
    ("канал", "cable_channel"),
    ("короб", "cable_channel"),
    ("гофр", "corrugation"),
    ("подземн", "ground"),
    ("земл", "ground"),
    ("воздуш", "overhead"),
];

const SECTION_OPTIONS: Options = &[
    ("1", "1.5"),
    ("2", "2.5"),
    ("3", "4.0"),
    ("4", "6.0"),
    ("5", "10.0"),
];

const SKIP_WORDS: [&str; 4] = ["не знаю", "неизвест", "пропуст", "-"];

/// Cable length from the floor area when the visitor does not know it.
pub fn estimated_length(area: f64, cabling_type: &str) -> f64 {
    if cabling_type == "hidden" { area * 1.2 } else { area * 0.8 }
}

pub struct CablingCalculator;

impl Calculator for CablingCalculator {
    fn kind(&self) -> CalculatorKind {
        CalculatorKind::Cabling
    }

    fn steps(&self) -> &'static [Step] {
        STEPS
    }

    fn prompt(&self, step: Step) -> &'static str {
        match step {
            Step::CablingType => {
                "Выберите тип прокладки кабеля:\n\
                 1. Открытая проводка\n\
                 2. Скрытая проводка\n\
                 3. Проводка в кабель-канале\n\
                 4. Проводка в гофре\n\
                 5. Подземная прокладка\n\
                 6. Воздушная прокладка"
            }
            Step::CableLength => {
                "Укажите примерную длину кабеля в метрах (если неизвестно, напишите «не знаю»):"
            }
            Step::CableSection => {
                "Выберите сечение кабеля:\n\
                 1. 1.5 мм²\n\
                 2. 2.5 мм²\n\
                 3. 4.0 мм²\n\
                 4. 6.0 мм²\n\
                 5. 10.0 мм²"
            }
            Step::Complexity => {
                "Выберите сложность прокладки кабеля:\n\
                 1. Простой монтаж (прямые пути, хороший доступ)\n\
                 2. Стандартная сложность\n\
                 3. Сложный монтаж (труднодоступные места, препятствия)"
            }
            other => parse::common_prompt(other),
        }
    }

    fn parse(&self, step: Step, input: &str) -> Option<Answer> {
        match step {
            Step::CablingType => parse::parse_option(input, CABLING_OPTIONS).map(Answer::Choice),
            Step::CableSection => parse_section(input).map(Answer::Choice),
            Step::CableLength => {
                let lower = input.trim().to_lowercase();
                if lower.is_empty() || SKIP_WORDS.iter().any(|w| lower.contains(w)) {
                    Some(Answer::Skipped)
                } else {
                    parse::parse_positive(&lower).map(Answer::Number)
                }
            }
            other => parse::parse_common(other, input),
        }
    }

    fn estimate(&self, answers: &Answers) -> Estimate {
        let property = answers.choice(Step::PropertyType).unwrap_or(prices::DEFAULT_PROPERTY);
        let wall = answers.choice(Step::WallMaterial).unwrap_or(prices::DEFAULT_WALL);
        let complexity = answers.choice(Step::Complexity).unwrap_or(prices::DEFAULT_COMPLEXITY);
        let cabling_type = answers.choice(Step::CablingType).unwrap_or("hidden");
        let section = answers.choice(Step::CableSection).unwrap_or("2.5");

        let min_area = prices::lookup_or(prices::MIN_AREAS, property, 5.0);
        let area = answers.number(Step::Area).unwrap_or(0.0).max(min_area);
        let length = answers
            .number(Step::CableLength)
            .unwrap_or_else(|| estimated_length(area, cabling_type));

        let per_meter = prices::lookup_or(prices::CABLING_PRICES, cabling_type, 180.0);
        let factor = prices::work_coefficients(wall, complexity)
            * prices::lookup_or(prices::CABLE_SECTION_COEFFICIENTS, section, 1.0);
        let total = length * per_meter * factor;

        let mut estimate = Estimate::new(
            CalculatorKind::Cabling,
            "📋 Расчет стоимости прокладки кабеля и проводки",
        )
        .param("Тип объекта", prices::display_name(prices::PROPERTY_NAMES, property))
        .param("Площадь", format!("{} кв.м", format_quantity(area)))
        .param("Материал стен", prices::display_name(prices::WALL_NAMES, wall))
        .param("Тип прокладки", prices::display_name(prices::CABLING_TYPE_NAMES, cabling_type))
        .param("Сечение кабеля", format!("{section} мм²"))
        .param("Сложность монтажа", prices::display_name(prices::COMPLEXITY_NAMES, complexity));
        estimate
            .lines
            .push(EstimateLine::new("прокладка кабеля", length.round(), "м", per_meter, total));
        estimate.with_total(total)
    }
}

fn parse_section(input: &str) -> Option<String> {
    let trimmed = input.trim().trim_end_matches(['.', ')']);
    if let Some(choice) = parse::parse_option(trimmed, SECTION_OPTIONS) {
        return Some(choice);
    }
    // "2,5 мм" style answers name the section itself.
    let value = parse::parse_decimal(trimmed)?;
    prices::CABLE_SECTION_COEFFICIENTS
        .iter()
        .find(|(key, _)| key.parse::<f64>().is_ok_and(|k| (k - value).abs() < f64::EPSILON))
        .map(|(key, _)| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_by_menu_or_value() {
        assert_eq!(parse_section("2").as_deref(), Some("2.5"));
        assert_eq!(parse_section("2,5 мм").as_deref(), Some("2.5"));
        assert_eq!(parse_section("10 мм²").as_deref(), Some("10.0"));
        assert_eq!(parse_section("7"), None);
    }

    #[test]
    fn length_falls_back_to_area() {
        let answers: Answers = [
            (Step::PropertyType, Answer::Choice("apartment".into())),
            (Step::Area, Answer::Number(50.0)),
            (Step::WallMaterial, Answer::Choice("block".into())),
            (Step::CablingType, Answer::Choice("hidden".into())),
            (Step::CableLength, Answer::Skipped),
            (Step::CableSection, Answer::Choice("1.5".into())),
            (Step::Complexity, Answer::Choice("standard".into())),
        ]
        .into_iter()
        .collect();

        // 50 * 1.2 m * 180 rub
        assert_eq!(CablingCalculator.estimate(&answers).total, 10800);
    }

    #[test]
    fn overflowing_length_and_area_are_asked_again() {
        let huge = "9".repeat(400);
        assert_eq!(CablingCalculator.parse(Step::CableLength, &huge), None);
        assert_eq!(CablingCalculator.parse(Step::Area, &huge), None);
        assert_eq!(CablingCalculator.parse(Step::CableLength, "250000"), None);
        assert_eq!(CablingCalculator.parse(Step::CableLength, "не знаю"), Some(Answer::Skipped));
    }

    #[test]
    fn small_area_is_raised_to_minimum() {
        let answers: Answers = [
            (Step::PropertyType, Answer::Choice("house".into())),
            (Step::Area, Answer::Number(10.0)),
            (Step::WallMaterial, Answer::Choice("block".into())),
            (Step::CablingType, Answer::Choice("open".into())),
            (Step::CableSection, Answer::Choice("1.5".into())),
        ]
        .into_iter()
        .collect();

        // min house area 50 → 40 m * 120 rub
        assert_eq!(CablingCalculator.estimate(&answers).total, 4800);
    }
}
