// src/calculator/lighting.rs
use super::estimate::{Estimate, EstimateLine};
use super::parse::{self, Options};
use super::prices::{self, DEVICE_NAMES};
use super::{Answer, Answers, Calculator, CalculatorKind, Step};

const STEPS: &[Step] = &[
    Step::PropertyType,
    Step::WallMaterial,
    Step::CeilingHeight,
    Step::CeilingType,
    Step::Chandeliers,
    Step::SpotLights,
    Step::WallLights,
    Step::Complexity,
];

const CEILING_OPTIONS: Options = &[
    ("1", "regular"),
    ("2", "drywall"),
    ("3", "stretch"),
    ("4", "suspended"),
    ("обычн", "regular"),
    ("бетон", "regular"),
    ("гипсокартон", "drywall"),
    ("натяжн", "stretch"),
    ("подвесн", "suspended"),
    ("армстронг", "suspended"),
];

/// Extra cost factor for high ceilings.
pub fn height_coefficient(height: f64) -> f64 {
    if height > 3.0 {
        1.3
    } else if height > 2.7 {
        1.15
    } else {
        1.0
    }
}

pub struct LightingCalculator;

impl Calculator for LightingCalculator {
    fn kind(&self) -> CalculatorKind {
        CalculatorKind::Lighting
    }

    fn steps(&self) -> &'static [Step] {
        STEPS
    }

    fn prompt(&self, step: Step) -> &'static str {
        match step {
            Step::CeilingHeight => "Укажите высоту потолков в метрах:",
            Step::CeilingType => {
                "Выберите тип потолка:\n\
                 1. Обычный (бетонная плита)\n\
                 2. Гипсокартонный\n\
                 3. Натяжной\n\
                 4. Подвесной (Армстронг и т.п.)"
            }
            Step::Chandeliers => {
                "Сколько люстр или подвесных светильников нужно установить? \
                 (введите число или 0 если не требуются):"
            }
            Step::SpotLights => {
                "Сколько точечных светильников нужно установить? \
                 (введите число или 0 если не требуются):"
            }
            Step::WallLights => {
                "Сколько настенных светильников нужно установить? \
                 (введите число или 0 если не требуются):"
            }
            Step::Complexity => parse::COMPLEXITY_EXTENDED_PROMPT,
            other => parse::common_prompt(other),
        }
    }

    fn parse(&self, step: Step, input: &str) -> Option<Answer> {
        match step {
            Step::CeilingHeight => parse::parse_positive(input).map(Answer::Number),
            Step::CeilingType => parse::parse_option(input, CEILING_OPTIONS).map(Answer::Choice),
            Step::Complexity => {
                parse::parse_option(input, parse::COMPLEXITY_EXTENDED_OPTIONS).map(Answer::Choice)
            }
            other => parse::parse_common(other, input),
        }
    }

    fn estimate(&self, answers: &Answers) -> Estimate {
        let property = answers.choice(Step::PropertyType).unwrap_or(prices::DEFAULT_PROPERTY);
        let wall = answers.choice(Step::WallMaterial).unwrap_or(prices::DEFAULT_WALL);
        let complexity = answers.choice(Step::Complexity).unwrap_or(prices::DEFAULT_COMPLEXITY);
        let ceiling = answers.choice(Step::CeilingType).unwrap_or("regular");
        let height = answers.number(Step::CeilingHeight).unwrap_or(2.7);

        let factor = prices::work_coefficients(wall, complexity)
            * height_coefficient(height)
            * prices::lookup_or(prices::CEILING_COEFFICIENTS, ceiling, 1.0);

        let fixtures = [
            ("chandelier", answers.count(Step::Chandeliers)),
            ("spot_light", answers.count(Step::SpotLights)),
            ("wall_light", answers.count(Step::WallLights)),
        ];

        let mut estimate = Estimate::new(
            CalculatorKind::Lighting,
            "💡 Расчет стоимости монтажа освещения",
        )
        .param("Тип объекта", prices::display_name(prices::PROPERTY_NAMES, property))
        .param("Материал стен", prices::display_name(prices::WALL_NAMES, wall))
        .param("Высота потолков", format!("{height} м"))
        .param("Тип потолка", prices::display_name(prices::CEILING_NAMES, ceiling))
        .param("Сложность монтажа", prices::display_name(prices::COMPLEXITY_NAMES, complexity));

        let mut total = 0.0;
        let mut lights: u64 = 0;
        for (fixture, count) in fixtures.into_iter().filter(|(_, count)| *count > 0) {
            let unit_price = prices::lookup_or(prices::LIGHTING_PRICES, fixture, 0.0);
            let line_total = unit_price * f64::from(count) * factor;
            total += line_total;
            lights += u64::from(count);
            estimate.lines.push(EstimateLine::new(
                prices::display_name(DEVICE_NAMES, fixture),
                f64::from(count),
                "шт.",
                unit_price,
                line_total,
            ));
        }

        estimate
            .param("Всего светильников", format!("{lights} шт."))
            .with_total(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceiling_factors_raise_price() {
        let base: Answers = [
            (Step::WallMaterial, Answer::Choice("block".into())),
            (Step::CeilingHeight, Answer::Number(2.5)),
            (Step::CeilingType, Answer::Choice("regular".into())),
            (Step::SpotLights, Answer::Count(10)),
            (Step::Complexity, Answer::Choice("standard".into())),
        ]
        .into_iter()
        .collect();
        assert_eq!(LightingCalculator.estimate(&base).total, 8000);

        let mut high = base.clone();
        high.insert(Step::CeilingHeight, Answer::Number(3.2));
        high.insert(Step::CeilingType, Answer::Choice("suspended".into()));
        // 8000 * 1.3 * 1.3
        assert_eq!(LightingCalculator.estimate(&high).total, 13520);
    }

    #[test]
    fn height_thresholds() {
        assert_eq!(height_coefficient(2.7), 1.0);
        assert_eq!(height_coefficient(2.8), 1.15);
        assert_eq!(height_coefficient(3.5), 1.3);
    }

    #[test]
    fn huge_counts_do_not_overflow_fixture_total() {
        let answers: Answers = [
            (Step::Chandeliers, Answer::Count(u32::MAX)),
            (Step::SpotLights, Answer::Count(u32::MAX)),
            (Step::WallLights, Answer::Count(u32::MAX)),
        ]
        .into_iter()
        .collect();

        let estimate = LightingCalculator.estimate(&answers);
        let expected = format!("{} шт.", u64::from(u32::MAX) * 3);
        assert!(
            estimate
                .params
                .iter()
                .any(|(name, value)| name == "Всего светильников" && *value == expected)
        );
    }

    #[test]
    fn absurd_answers_are_asked_again() {
        assert_eq!(LightingCalculator.parse(Step::SpotLights, "4000000000"), None);
        assert_eq!(LightingCalculator.parse(Step::CeilingHeight, &"9".repeat(400)), None);
        assert_eq!(LightingCalculator.parse(Step::SpotLights, "8"), Some(Answer::Count(8)));
    }
}
