// src/calculator/mod.rs
//! Step-by-step price calculators for electrical installation work.
//!
//! A calculator is a fixed list of [`Step`]s. The [`dialog`] module walks a
//! visitor through the steps that are still unknown, parses each answer with
//! the calculator's own rules and finally produces an [`Estimate`].

pub mod cabling;
pub mod dialog;
pub mod dispatcher;
pub mod estimate;
pub mod lighting;
pub mod multi;
pub mod panel;
pub mod parse;
pub mod prices;
pub mod socket;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use dialog::{CalculatorDialog, Turn};
pub use estimate::{Estimate, EstimateLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorKind {
    Socket,
    Lighting,
    Panel,
    Cabling,
    Multi,
    /// No specific service detected yet; the visitor picks one first.
    General,
}

impl CalculatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculatorKind::Socket => "socket",
            CalculatorKind::Lighting => "lighting",
            CalculatorKind::Panel => "panel",
            CalculatorKind::Cabling => "cabling",
            CalculatorKind::Multi => "multi",
            CalculatorKind::General => "general",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CalculatorKind::Socket => "Монтаж розеток и выключателей",
            CalculatorKind::Lighting => "Монтаж освещения",
            CalculatorKind::Panel => "Монтаж электрощита",
            CalculatorKind::Cabling => "Прокладка кабеля и проводки",
            CalculatorKind::Multi => "Комплексный расчет нескольких услуг",
            CalculatorKind::General => "Общий электромонтаж",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "socket" => Some(CalculatorKind::Socket),
            "lighting" => Some(CalculatorKind::Lighting),
            "panel" => Some(CalculatorKind::Panel),
            "cabling" => Some(CalculatorKind::Cabling),
            "multi" => Some(CalculatorKind::Multi),
            "general" => Some(CalculatorKind::General),
            _ => None,
        }
    }

    /// Services that can be priced on their own, in menu order.
    pub const SERVICES: [CalculatorKind; 4] = [
        CalculatorKind::Socket,
        CalculatorKind::Lighting,
        CalculatorKind::Panel,
        CalculatorKind::Cabling,
    ];
}

/// A single question asked by a calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    PropertyType,
    Area,
    WallMaterial,
    SocketSingles,
    SocketDoubles,
    SocketPower,
    SwitchSingles,
    SwitchDoubles,
    SocketExtras,
    CeilingHeight,
    CeilingType,
    Chandeliers,
    SpotLights,
    WallLights,
    PanelType,
    CircuitBreakers,
    RcdCount,
    DiffAutoCount,
    MeterInstallation,
    PanelExtras,
    CablingType,
    CableLength,
    CableSection,
    NewConstruction,
    HasPanel,
    HasCabling,
    Services,
    SocketPoints,
    LightCount,
    BreakerCount,
    Complexity,
}

/// A parsed answer to a [`Step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Choice(String),
    Count(u32),
    Number(f64),
    Flag(bool),
    Items(Vec<String>),
    /// Optional step the visitor left blank.
    Skipped,
}

/// Answers collected so far, keyed by step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Answers(BTreeMap<Step, Answer>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, step: Step, answer: Answer) {
        self.0.insert(step, answer);
    }

    pub fn contains(&self, step: Step) -> bool {
        self.0.contains_key(&step)
    }

    pub fn get(&self, step: Step) -> Option<&Answer> {
        self.0.get(&step)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn choice(&self, step: Step) -> Option<&str> {
        match self.0.get(&step) {
            Some(Answer::Choice(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn count(&self, step: Step) -> u32 {
        match self.0.get(&step) {
            Some(Answer::Count(n)) => *n,
            _ => 0,
        }
    }

    pub fn number(&self, step: Step) -> Option<f64> {
        match self.0.get(&step) {
            Some(Answer::Number(n)) => Some(*n),
            Some(Answer::Count(n)) => Some(f64::from(*n)),
            _ => None,
        }
    }

    pub fn flag(&self, step: Step) -> bool {
        matches!(self.0.get(&step), Some(Answer::Flag(true)))
    }

    pub fn items(&self, step: Step) -> &[String] {
        match self.0.get(&step) {
            Some(Answer::Items(items)) => items,
            _ => &[],
        }
    }

    /// Keep only the answers for the given steps.
    pub fn retain_steps(&mut self, steps: &[Step]) {
        self.0.retain(|step, _| steps.contains(step));
    }
}

impl FromIterator<(Step, Answer)> for Answers {
    fn from_iter<I: IntoIterator<Item = (Step, Answer)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Behaviour shared by every pricing calculator.
pub trait Calculator: Send + Sync {
    fn kind(&self) -> CalculatorKind;

    fn steps(&self) -> &'static [Step];

    fn prompt(&self, step: Step) -> &'static str {
        parse::common_prompt(step)
    }

    /// Parse the visitor's answer for `step`; `None` means "ask again".
    fn parse(&self, step: Step, input: &str) -> Option<Answer> {
        parse::parse_common(step, input)
    }

    /// Whether `step` still needs asking given the answers so far.
    fn applies(&self, _step: Step, _answers: &Answers) -> bool {
        true
    }

    /// Extra text shown before the next prompt once `step` was answered.
    fn note(&self, _step: Step, _answers: &Answers) -> Option<String> {
        None
    }

    fn estimate(&self, answers: &Answers) -> Estimate;
}

/// Calculator implementing `kind`, or `None` for [`CalculatorKind::General`].
pub fn calculator_for(kind: CalculatorKind) -> Option<&'static dyn Calculator> {
    match kind {
        CalculatorKind::Socket => Some(&socket::SocketCalculator),
        CalculatorKind::Lighting => Some(&lighting::LightingCalculator),
        CalculatorKind::Panel => Some(&panel::PanelCalculator),
        CalculatorKind::Cabling => Some(&cabling::CablingCalculator),
        CalculatorKind::Multi => Some(&multi::MultiServiceCalculator),
        CalculatorKind::General => None,
    }
}
