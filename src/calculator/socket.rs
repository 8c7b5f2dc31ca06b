// src/calculator/socket.rs
use super::estimate::{Estimate, EstimateLine};
use super::parse::{self, Options};
use super::prices::{self, DEVICE_NAMES};
use super::{Answer, Answers, Calculator, CalculatorKind, Step};

const STEPS: &[Step] = &[
    Step::PropertyType,
    Step::WallMaterial,
    Step::SocketSingles,
    Step::SocketDoubles,
    Step::SocketPower,
    Step::SwitchSingles,
    Step::SwitchDoubles,
    Step::SocketExtras,
    Step::Complexity,
];

const EXTRA_OPTIONS: Options = &[
    ("1", "dimmer"),
    ("2", "tv_socket"),
    ("3", "network_socket"),
    ("4", "phone_socket"),
    ("5", "usb_socket"),
];

pub struct SocketCalculator;

impl Calculator for SocketCalculator {
    fn kind(&self) -> CalculatorKind {
        CalculatorKind::Socket
    }

    fn steps(&self) -> &'static [Step] {
        STEPS
    }

    fn prompt(&self, step: Step) -> &'static str {
        match step {
            Step::SocketSingles => {
                "Сколько требуется одинарных розеток? (введите число или 0 если не требуются):"
            }
            Step::SocketDoubles => {
                "Сколько требуется двойных розеток? (введите число или 0 если не требуются):"
            }
            Step::SocketPower => {
                "Сколько требуется силовых розеток? (введите число или 0 если не требуются):"
            }
            Step::SwitchSingles => {
                "Сколько требуется одноклавишных выключателей? \
                 (введите число или 0 если не требуются):"
            }
            Step::SwitchDoubles => {
                "Сколько требуется двухклавишных выключателей? \
                 (введите число или 0 если не требуются):"
            }
            Step::SocketExtras => {
                "Выберите дополнительные устройства \
                 (можно выбрать несколько, введите номера через запятую):\n\
                 1. Диммер\n\
                 2. ТВ розетка\n\
                 3. Интернет розетка\n\
                 4. Телефонная розетка\n\
                 5. USB розетка\n\
                 0. Не требуются"
            }
            other => parse::common_prompt(other),
        }
    }

    fn parse(&self, step: Step, input: &str) -> Option<Answer> {
        match step {
            Step::SocketExtras => parse::parse_items(input, EXTRA_OPTIONS).map(Answer::Items),
            other => parse::parse_common(other, input),
        }
    }

    fn estimate(&self, answers: &Answers) -> Estimate {
        let property = answers.choice(Step::PropertyType).unwrap_or(prices::DEFAULT_PROPERTY);
        let wall = answers.choice(Step::WallMaterial).unwrap_or(prices::DEFAULT_WALL);
        let complexity = answers.choice(Step::Complexity).unwrap_or(prices::DEFAULT_COMPLEXITY);

        let mut devices: Vec<(&str, u32)> = vec![
            ("socket_single", answers.count(Step::SocketSingles)),
            ("socket_double", answers.count(Step::SocketDoubles)),
            ("socket_power", answers.count(Step::SocketPower)),
            ("switch_single", answers.count(Step::SwitchSingles)),
            ("switch_double", answers.count(Step::SwitchDoubles)),
        ];
        devices.extend(answers.items(Step::SocketExtras).iter().map(|d| (d.as_str(), 1)));

        let mut estimate = Estimate::new(
            CalculatorKind::Socket,
            "🔌 Расчет стоимости монтажа розеток и выключателей",
        )
        .param("Тип объекта", prices::display_name(prices::PROPERTY_NAMES, property))
        .param("Материал стен", prices::display_name(prices::WALL_NAMES, wall))
        .param("Сложность монтажа", prices::display_name(prices::COMPLEXITY_NAMES, complexity));

        let mut subtotal = 0.0;
        let mut device_count: u64 = 0;
        for (device, count) in devices.into_iter().filter(|(_, count)| *count > 0) {
            let unit_price =
                prices::lookup_or(prices::SOCKET_PRICES, device, prices::SOCKET_FALLBACK_PRICE);
            let total = unit_price * f64::from(count);
            subtotal += total;
            device_count += u64::from(count);
            estimate.lines.push(EstimateLine::new(
                prices::display_name(DEVICE_NAMES, device),
                f64::from(count),
                "шт.",
                unit_price,
                total,
            ));
        }

        let total =
            (subtotal * prices::work_coefficients(wall, complexity)).max(prices::SOCKET_MIN_ORDER);
        estimate
            .param("Всего устройств", format!("{device_count} шт."))
            .with_total(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_coefficients_and_minimum_order() {
        let answers: Answers = [
            (Step::PropertyType, Answer::Choice("apartment".into())),
            (Step::WallMaterial, Answer::Choice("concrete".into())),
            (Step::SocketSingles, Answer::Count(10)),
            (Step::SocketExtras, Answer::Items(vec!["usb_socket".into()])),
            (Step::Complexity, Answer::Choice("complex".into())),
        ]
        .into_iter()
        .collect();

        let estimate = SocketCalculator.estimate(&answers);
        // (10 * 350 + 550) * 1.5 * 1.3
        assert_eq!(estimate.total, 7898);
        assert_eq!(estimate.lines.len(), 2);

        let tiny: Answers = [(Step::SocketSingles, Answer::Count(1))].into_iter().collect();
        assert_eq!(SocketCalculator.estimate(&tiny).total, 2000);
    }

    #[test]
    fn huge_counts_do_not_overflow_device_total() {
        let answers: Answers = [
            (Step::SocketSingles, Answer::Count(u32::MAX)),
            (Step::SocketDoubles, Answer::Count(u32::MAX)),
            (Step::SwitchSingles, Answer::Count(2)),
        ]
        .into_iter()
        .collect();

        let estimate = SocketCalculator.estimate(&answers);
        let expected = format!("{} шт.", u64::from(u32::MAX) * 2 + 2);
        assert!(
            estimate
                .params
                .iter()
                .any(|(name, value)| name == "Всего устройств" && *value == expected)
        );
        assert!(estimate.total > 0);
    }

    #[test]
    fn huge_count_answer_is_asked_again() {
        assert_eq!(SocketCalculator.parse(Step::SocketSingles, "4000000000"), None);
        assert_eq!(SocketCalculator.parse(Step::SocketSingles, "1001"), None);
        assert_eq!(SocketCalculator.parse(Step::SocketSingles, "12"), Some(Answer::Count(12)));
    }
}
