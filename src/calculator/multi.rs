// src/calculator/multi.rs
//! Combined estimate for several services at once.
//!
//! The visitor describes the object (type, area, new or renovated, what is
//! already installed), picks the services and may override the typical
//! quantity for each of them. Sockets and lighting pull in cabling and the
//! panel unless those are already in place.

use super::estimate::format_quantity;
use super::parse::{self, Options};
use super::prices;
use super::{Answer, Answers, Calculator, CalculatorKind, Estimate, Step, calculator_for};

const STEPS: &[Step] = &[
    Step::PropertyType,
    Step::Area,
    Step::NewConstruction,
    Step::HasPanel,
    Step::HasCabling,
    Step::Services,
    Step::SocketPoints,
    Step::LightCount,
    Step::BreakerCount,
    Step::CableLength,
];

const SERVICE_ITEMS: Options = &[
    ("1", "socket"),
    ("2", "lighting"),
    ("3", "panel"),
    ("4", "cabling"),
    ("5", "all"),
];

const ALL_SERVICES_WORDS: [&str; 4] = ["все", "всё", "комплекс", "полн"];

const CONSTRUCTION_OPTIONS: Options = &[
    ("1", "new"),
    ("2", "renovation"),
    ("новостро", "new"),
    ("нов", "new"),
    ("ремонт", "renovation"),
    ("существ", "renovation"),
];

const BASE_AREA: f64 = 50.0;

/// Typical device counts for a property, scaled from a 50 m² apartment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypicalQuantities {
    pub sockets: u32,
    pub lights: u32,
    pub breakers: u32,
    pub cable_meters: u32,
}

pub fn typical_quantities(property: &str, area: f64) -> TypicalQuantities {
    // sockets, lights, breakers, cable meters
    let multiplier = match property {
        "house" => (1.2, 1.3, 1.5, 1.5),
        "office" => (1.5, 1.2, 1.3, 1.3),
        "commercial" => (1.3, 1.5, 1.4, 1.4),
        "industrial" => (0.8, 1.1, 1.8, 1.7),
        _ => (1.0, 1.0, 1.0, 1.0),
    };
    let factor = area.clamp(0.0, parse::MAX_MEASURE) / BASE_AREA;
    let scale = |base: f64, m: f64| (base * m * factor).round().max(0.0) as u32;

    TypicalQuantities {
        sockets: scale(10.0, multiplier.0),
        lights: scale(5.0, multiplier.1),
        breakers: scale(6.0, multiplier.2),
        cable_meters: scale(100.0, multiplier.3),
    }
}

fn service_kind(code: &str) -> Option<CalculatorKind> {
    CalculatorKind::from_code(code).filter(|kind| CalculatorKind::SERVICES.contains(kind))
}

fn picked_services(answers: &Answers) -> Vec<CalculatorKind> {
    answers.items(Step::Services).iter().filter_map(|code| service_kind(code)).collect()
}

/// Services missing for `kind` to work, given what is already installed.
fn missing_dependencies(kind: CalculatorKind, answers: &Answers) -> Vec<CalculatorKind> {
    if !matches!(kind, CalculatorKind::Socket | CalculatorKind::Lighting) {
        return Vec::new();
    }
    let mut missing = Vec::new();
    if !answers.flag(Step::HasCabling) {
        missing.push(CalculatorKind::Cabling);
    }
    if !answers.flag(Step::HasPanel) {
        missing.push(CalculatorKind::Panel);
    }
    missing
}

/// Picked services plus their dependencies, in menu order.
pub fn selected_services(answers: &Answers) -> Vec<CalculatorKind> {
    let picked = picked_services(answers);
    let mut selected = picked.clone();
    for kind in &picked {
        selected.extend(missing_dependencies(*kind, answers));
    }
    CalculatorKind::SERVICES.into_iter().filter(|kind| selected.contains(kind)).collect()
}

fn dependency_message(kind: CalculatorKind) -> Option<&'static str> {
    match kind {
        CalculatorKind::Socket => {
            Some("Для установки розеток потребуется прокладка кабелей и подключение к электрощиту.")
        }
        CalculatorKind::Lighting => {
            Some("Для монтажа освещения потребуется прокладка кабелей и подключение к электрощиту.")
        }
        CalculatorKind::Panel => {
            Some("Для электрощита рекомендуется также установка системы заземления.")
        }
        _ => None,
    }
}

/// Detail step asked for a selected service.
fn detail_step(kind: CalculatorKind) -> Option<Step> {
    match kind {
        CalculatorKind::Socket => Some(Step::SocketPoints),
        CalculatorKind::Lighting => Some(Step::LightCount),
        CalculatorKind::Panel => Some(Step::BreakerCount),
        CalculatorKind::Cabling => Some(Step::CableLength),
        CalculatorKind::Multi | CalculatorKind::General => None,
    }
}

fn parse_services(input: &str) -> Option<Vec<String>> {
    let lower = input.trim().to_lowercase();
    let all = || -> Vec<String> {
        CalculatorKind::SERVICES.iter().map(|kind| kind.as_str().to_string()).collect()
    };
    if ALL_SERVICES_WORDS.iter().any(|word| lower.contains(word)) {
        return Some(all());
    }

    let items = parse::parse_items(&lower, SERVICE_ITEMS).or_else(|| {
        let mut found: Vec<String> = Vec::new();
        for (key, code) in parse::SERVICE_OPTIONS {
            if lower.contains(key) && !found.iter().any(|f| f == code) {
                found.push(code.to_string());
            }
        }
        Some(found)
    })?;
    if items.iter().any(|item| item == "all") {
        return Some(all());
    }
    Some(items).filter(|items| !items.is_empty())
}

/// "есть" / "нет" about something already installed.
fn parse_presence(input: &str) -> Option<bool> {
    let lower = input.trim().to_lowercase();
    const ABSENT: [&str; 4] = ["нет", "не ", "отсутств", "нужн"];
    const PRESENT: [&str; 6] = ["да", "есть", "установлен", "проложен", "имеется", "имеются"];
    if lower == "не" || ABSENT.iter().any(|word| lower.contains(word)) {
        Some(false)
    } else if PRESENT.iter().any(|word| lower.contains(word)) {
        Some(true)
    } else {
        None
    }
}

/// A number overrides the typical quantity; anything else keeps it.
fn parse_detail(step: Step, input: &str) -> Option<Answer> {
    if !input.chars().any(|c| c.is_ascii_digit()) {
        return Some(Answer::Skipped);
    }
    if step == Step::CableLength {
        if parse::parse_decimal(input) == Some(0.0) {
            return Some(Answer::Skipped);
        }
        return parse::parse_positive(input).map(Answer::Number);
    }
    match parse::parse_count(input)? {
        0 => Some(Answer::Skipped),
        count => Some(Answer::Count(count)),
    }
}

fn override_count(answers: &Answers, step: Step, typical: u32) -> u32 {
    match answers.get(step) {
        Some(Answer::Count(count)) => *count,
        _ => typical,
    }
}

fn panel_type_for(property: &str) -> &'static str {
    match property {
        "house" => "house",
        "industrial" => "industrial",
        "apartment" => "apartment",
        _ => "floor",
    }
}

/// Quantities used for pricing after the visitor's overrides.
struct Quantities {
    sockets: u32,
    lights: u32,
    breakers: u32,
    cable_meters: f64,
}

impl Quantities {
    fn from_answers(answers: &Answers, typical: TypicalQuantities) -> Self {
        let cable_meters = match answers.get(Step::CableLength) {
            Some(Answer::Number(meters)) => *meters,
            _ => f64::from(typical.cable_meters),
        };
        Self {
            sockets: override_count(answers, Step::SocketPoints, typical.sockets),
            lights: override_count(answers, Step::LightCount, typical.lights),
            breakers: override_count(answers, Step::BreakerCount, typical.breakers),
            cable_meters,
        }
    }
}

/// Answers for one service derived from the combined dialog.
fn service_answers(kind: CalculatorKind, property: &str, area: f64, q: &Quantities) -> Answers {
    let mut answers: Answers = [
        (Step::PropertyType, Answer::Choice(property.to_string())),
        (Step::WallMaterial, Answer::Choice(prices::DEFAULT_WALL.to_string())),
        (Step::Complexity, Answer::Choice(prices::DEFAULT_COMPLEXITY.to_string())),
    ]
    .into_iter()
    .collect();

    match kind {
        CalculatorKind::Socket => {
            answers.insert(Step::SocketSingles, Answer::Count(q.sockets));
            answers.insert(Step::SwitchSingles, Answer::Count(q.lights));
        }
        CalculatorKind::Lighting => {
            answers.insert(Step::SpotLights, Answer::Count(q.lights));
        }
        CalculatorKind::Panel => {
            answers.insert(Step::PanelType, Answer::Choice(panel_type_for(property).to_string()));
            answers.insert(Step::CircuitBreakers, Answer::Count(q.breakers));
        }
        CalculatorKind::Cabling => {
            answers.insert(Step::Area, Answer::Number(area));
            answers.insert(Step::CablingType, Answer::Choice("hidden".to_string()));
            answers.insert(Step::CableLength, Answer::Number(q.cable_meters));
        }
        CalculatorKind::Multi | CalculatorKind::General => {}
    }
    answers
}

fn typical_summary(answers: &Answers) -> String {
    let property = answers.choice(Step::PropertyType).unwrap_or(prices::DEFAULT_PROPERTY);
    let area = answers.number(Step::Area).unwrap_or(BASE_AREA);
    let q = typical_quantities(property, area);
    format!(
        "📏 Для объекта '{}' площадью {} кв.м обычно требуется:\n\n\
         • Электрощит с {} автоматами\n\
         • Прокладка около {} метров кабеля\n\
         • Установка около {} розеток\n\
         • Монтаж около {} светильников",
        prices::display_name(prices::PROPERTY_NAMES, property),
        format_quantity(area),
        q.breakers,
        q.cable_meters,
        q.sockets,
        q.lights,
    )
}

fn selection_summary(answers: &Answers) -> String {
    let selected = selected_services(answers);
    let mut out = String::from("✅ Выбранные услуги:");
    for kind in &selected {
        out.push_str("\n• ");
        out.push_str(kind.title());
    }

    let picked = picked_services(answers);
    let messages: Vec<&str> = CalculatorKind::SERVICES
        .into_iter()
        .filter(|kind| match kind {
            CalculatorKind::Panel => selected.contains(kind),
            _ => picked.contains(kind) && !missing_dependencies(*kind, answers).is_empty(),
        })
        .filter_map(dependency_message)
        .collect();
    if !messages.is_empty() {
        out.push_str("\n\n💡 Информация:");
        for message in messages {
            out.push_str("\n• ");
            out.push_str(message);
        }
    }
    out
}

pub struct MultiServiceCalculator;

impl Calculator for MultiServiceCalculator {
    fn kind(&self) -> CalculatorKind {
        CalculatorKind::Multi
    }

    fn steps(&self) -> &'static [Step] {
        STEPS
    }

    fn prompt(&self, step: Step) -> &'static str {
        match step {
            Step::PropertyType => {
                "Выберите тип объекта для комплексного расчета:\n\
                 1. Квартира\n\
                 2. Дом/коттедж\n\
                 3. Офис\n\
                 4. Коммерческое помещение\n\
                 5. Промышленное помещение"
            }
            Step::Area => "Укажите общую площадь помещения в квадратных метрах:",
            Step::NewConstruction => {
                "Это новая постройка или ремонт существующего помещения?\n\
                 1. Новостройка / новое помещение\n\
                 2. Ремонт существующего помещения"
            }
            Step::HasPanel => {
                "У вас уже есть установленный и подключенный электрощит \
                 с необходимым количеством автоматов?"
            }
            Step::HasCabling => "Кабели уже проложены к местам установки розеток и светильников?",
            Step::Services => {
                "🔧 Выберите услуги для расчета (введите номера через запятую):\n\
                 1. Монтаж розеток и выключателей\n\
                 2. Монтаж освещения\n\
                 3. Монтаж электрощита\n\
                 4. Прокладка кабеля и проводки\n\
                 5. Все услуги (комплексный расчет)"
            }
            Step::SocketPoints => {
                "🔌 Детали для услуги 'Монтаж розеток и выключателей':\n\n\
                 Укажите количество точек (розеток, выключателей) \
                 или напишите «авто» для автоматического расчета:"
            }
            Step::LightCount => {
                "💡 Детали для услуги 'Монтаж освещения':\n\n\
                 Укажите количество светильников или напишите «авто» для автоматического расчета:"
            }
            Step::BreakerCount => {
                "⚡ Детали для услуги 'Монтаж электрощита':\n\n\
                 Укажите требуемое количество автоматов в щите \
                 или напишите «авто» для автоматического расчета:"
            }
            Step::CableLength => {
                "🔗 Детали для услуги 'Прокладка кабеля и проводки':\n\n\
                 Укажите примерную длину кабелей в метрах \
                 или напишите «авто» для автоматического расчета:"
            }
            other => parse::common_prompt(other),
        }
    }

    fn parse(&self, step: Step, input: &str) -> Option<Answer> {
        match step {
            Step::NewConstruction => parse::parse_option(input, CONSTRUCTION_OPTIONS)
                .map(|choice| Answer::Flag(choice == "new")),
            Step::HasPanel | Step::HasCabling => parse_presence(input).map(Answer::Flag),
            Step::Services => parse_services(input).map(Answer::Items),
            Step::SocketPoints | Step::LightCount | Step::BreakerCount | Step::CableLength => {
                parse_detail(step, input)
            }
            other => parse::parse_common(other, input),
        }
    }

    fn applies(&self, step: Step, answers: &Answers) -> bool {
        match step {
            Step::SocketPoints | Step::LightCount | Step::BreakerCount | Step::CableLength => {
                selected_services(answers).into_iter().any(|kind| detail_step(kind) == Some(step))
            }
            _ => true,
        }
    }

    fn note(&self, step: Step, answers: &Answers) -> Option<String> {
        match step {
            Step::HasCabling => Some(typical_summary(answers)),
            Step::Services => Some(selection_summary(answers)),
            _ => None,
        }
    }

    fn estimate(&self, answers: &Answers) -> Estimate {
        let property = answers.choice(Step::PropertyType).unwrap_or(prices::DEFAULT_PROPERTY);
        let area = answers.number(Step::Area).unwrap_or(BASE_AREA);
        let quantities = Quantities::from_answers(answers, typical_quantities(property, area));

        let mut estimate =
            Estimate::new(CalculatorKind::Multi, "🧮 Комплексный расчет нескольких услуг")
                .param("Тип объекта", prices::display_name(prices::PROPERTY_NAMES, property))
                .param("Площадь", format!("{} кв.м", format_quantity(area)));
        if let Some(Answer::Flag(new)) = answers.get(Step::NewConstruction) {
            let works = if *new { "Новостройка" } else { "Ремонт существующего помещения" };
            estimate = estimate.param("Тип работ", works);
        }
        if let Some(Answer::Flag(present)) = answers.get(Step::HasPanel) {
            let panel = if *present { "уже установлен" } else { "нет" };
            estimate = estimate.param("Электрощит", panel);
        }
        if let Some(Answer::Flag(present)) = answers.get(Step::HasCabling) {
            let cabling = if *present { "уже проложены" } else { "нет" };
            estimate = estimate.param("Кабели", cabling);
        }

        let mut total: u64 = 0;
        for kind in selected_services(answers) {
            let Some(calculator) = calculator_for(kind) else {
                continue;
            };
            let section = calculator.estimate(&service_answers(kind, property, area, &quantities));
            total = total.saturating_add(section.total);
            estimate.sections.push(section);
        }

        estimate.total = total;
        estimate
    }
}
