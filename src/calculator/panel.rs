// src/calculator/panel.rs
use super::estimate::{Estimate, EstimateLine};
use super::parse::{self, Options};
use super::prices::{self, DEVICE_NAMES};
use super::{Answer, Answers, Calculator, CalculatorKind, Step};

const STEPS: &[Step] = &[
    Step::PropertyType,
    Step::WallMaterial,
    Step::PanelType,
    Step::CircuitBreakers,
    Step::RcdCount,
    Step::DiffAutoCount,
    Step::MeterInstallation,
    Step::PanelExtras,
    Step::Complexity,
];

const PANEL_TYPE_OPTIONS: Options = &[
    ("1", "apartment"),
    ("2", "house"),
    ("3", "floor"),
    ("4", "industrial"),
    ("квартирн", "apartment"),
    ("частн", "house"),
    ("дом", "house"),
    ("этаж", "floor"),
    ("промышл", "industrial"),
];

const EXTRA_OPTIONS: Options = &[
    ("1", "contactor"),
    ("2", "voltage_relay"),
    ("3", "timer"),
    ("4", "phase_monitor"),
];

pub struct PanelCalculator;

impl Calculator for PanelCalculator {
    fn kind(&self) -> CalculatorKind {
        CalculatorKind::Panel
    }

    fn steps(&self) -> &'static [Step] {
        STEPS
    }

    fn prompt(&self, step: Step) -> &'static str {
        match step {
            Step::PanelType => {
                "Выберите тип электрощита:\n\
                 1. Квартирный щиток\n\
                 2. Щит для частного дома\n\
                 3. Этажный щит\n\
                 4. Промышленный щит"
            }
            Step::CircuitBreakers => {
                "Укажите количество обычных автоматов (однополюсных и двухполюсных), \
                 которые необходимо установить:"
            }
            Step::RcdCount => {
                "Укажите количество УЗО (устройств защитного отключения), \
                 которые необходимо установить (или 0, если не требуется):"
            }
            Step::DiffAutoCount => {
                "Укажите количество дифавтоматов, которые необходимо установить \
                 (или 0, если не требуется):"
            }
            Step::MeterInstallation => "Требуется ли установка электросчетчика? (Да/Нет)",
            Step::PanelExtras => {
                "Выберите дополнительные устройства \
                 (можно выбрать несколько, введите номера через запятую):\n\
                 1. Контактор\n\
                 2. Реле напряжения\n\
                 3. Таймер\n\
                 4. Устройство контроля фаз\n\
                 0. Не требуются"
            }
            Step::Complexity => parse::COMPLEXITY_EXTENDED_PROMPT,
            other => parse::common_prompt(other),
        }
    }

    fn parse(&self, step: Step, input: &str) -> Option<Answer> {
        match step {
            Step::PanelType => parse::parse_option(input, PANEL_TYPE_OPTIONS).map(Answer::Choice),
            Step::MeterInstallation => parse::parse_flag(input).map(Answer::Flag),
            Step::PanelExtras => parse::parse_items(input, EXTRA_OPTIONS).map(Answer::Items),
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
        let panel_type = answers
            .choice(Step::PanelType)
            .filter(|t| prices::lookup(prices::PANEL_BASE_PRICES, t).is_some())
            .unwrap_or("apartment");

        let base_price = prices::lookup_or(prices::PANEL_BASE_PRICES, panel_type, 5000.0);

        let mut devices: Vec<(&str, u32)> = vec![
            ("circuit_breaker", answers.count(Step::CircuitBreakers)),
            ("rcd", answers.count(Step::RcdCount)),
            ("diff_auto", answers.count(Step::DiffAutoCount)),
            ("meter", u32::from(answers.flag(Step::MeterInstallation))),
        ];
        devices.extend(answers.items(Step::PanelExtras).iter().map(|d| (d.as_str(), 1)));

        let mut estimate = Estimate::new(
            CalculatorKind::Panel,
            "⚡ Расчет стоимости монтажа электрощита",
        )
        .param("Тип объекта", prices::display_name(prices::PROPERTY_NAMES, property))
        .param("Материал стен", prices::display_name(prices::WALL_NAMES, wall))
        .param("Тип щита", prices::display_name(prices::PANEL_TYPE_NAMES, panel_type))
        .param("Сложность монтажа", prices::display_name(prices::COMPLEXITY_NAMES, complexity));

        estimate
            .lines
            .push(EstimateLine::new("сборка и монтаж щита", 1.0, "шт.", base_price, base_price));

        let mut subtotal = base_price;
        for (device, count) in devices.into_iter().filter(|(_, count)| *count > 0) {
            let unit_price = prices::lookup_or(prices::PANEL_DEVICE_PRICES, device, 0.0);
            let total = unit_price * f64::from(count);
            subtotal += total;
            estimate.lines.push(EstimateLine::new(
                prices::display_name(DEVICE_NAMES, device),
                f64::from(count),
                "шт.",
                unit_price,
                total,
            ));
        }

        let total =
            (subtotal * prices::work_coefficients(wall, complexity)).max(prices::PANEL_MIN_ORDER);
        estimate.with_total(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_base_devices_and_meter() {
        let answers: Answers = [
            (Step::WallMaterial, Answer::Choice("block".into())),
            (Step::PanelType, Answer::Choice("house".into())),
            (Step::CircuitBreakers, Answer::Count(10)),
            (Step::RcdCount, Answer::Count(2)),
            (Step::MeterInstallation, Answer::Flag(true)),
            (Step::PanelExtras, Answer::Items(vec!["voltage_relay".into()])),
            (Step::Complexity, Answer::Choice("standard".into())),
        ]
        .into_iter()
        .collect();

        // 8000 + 3500 + 1000 + 1500 + 700
        let estimate = PanelCalculator.estimate(&answers);
        assert_eq!(estimate.total, 14700);
        assert_eq!(estimate.lines.len(), 5);
    }
}
