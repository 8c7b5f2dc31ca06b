// src/calculator/estimate.rs
use std::fmt::Write as _;

use serde::Serialize;

use super::CalculatorKind;

const NOTICE: &str = "⚠️ ВНИМАНИЕ: Это предварительная оценка стоимости. \
Точная стоимость определяется после выезда специалиста на объект и уточнения деталей заказа. \
Цена может измениться в зависимости от сложности работ и других особенностей объекта.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateLine {
    pub label: String,
    pub quantity: f64,
    pub unit: &'static str,
    pub unit_price: u64,
    pub total: u64,
}

impl EstimateLine {
    pub fn new(
        label: impl Into<String>,
        quantity: f64,
        unit: &'static str,
        unit_price: f64,
        total: f64,
    ) -> Self {
        Self {
            label: label.into(),
            quantity,
            unit,
            unit_price: round_rub(unit_price),
            total: round_rub(total),
        }
    }
}

/// Priced result of a calculator dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub kind: CalculatorKind,
    pub title: String,
    /// Parameters shown above the line items, as (label, value).
    pub params: Vec<(String, String)>,
    pub lines: Vec<EstimateLine>,
    /// Per-service breakdown of a combined estimate.
    pub sections: Vec<Estimate>,
    pub total: u64,
}

impl Estimate {
    pub fn new(kind: CalculatorKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            params: Vec::new(),
            lines: Vec::new(),
            sections: Vec::new(),
            total: 0,
        }
    }

    pub fn param(mut self, label: &str, value: impl Into<String>) -> Self {
        self.params.push((label.to_string(), value.into()));
        self
    }

    pub fn with_total(mut self, total: f64) -> Self {
        self.total = round_rub(total);
        self
    }

    /// Plain-text rendering shown in the chat.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_body(&mut out);
        let _ = write!(out, "\n💰 Общая стоимость: {} руб.\n\n{}", self.total, NOTICE);
        out
    }

    fn render_body(&self, out: &mut String) {
        let _ = writeln!(out, "{}:\n", self.title);
        for (label, value) in &self.params {
            let _ = writeln!(out, "• {label}: {value}");
        }
        if !self.lines.is_empty() {
            out.push('\n');
            for line in &self.lines {
                let _ = writeln!(
                    out,
                    "• {}: {} {} x {} руб. = {} руб.",
                    line.label,
                    format_quantity(line.quantity),
                    line.unit,
                    line.unit_price,
                    line.total
                );
            }
        }
        for section in &self.sections {
            out.push('\n');
            section.render_body(out);
            let _ = writeln!(out, "Итого по разделу: {} руб.", section.total);
        }
    }
}

pub fn round_rub(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 { value.round() as u64 } else { 0 }
}

pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{quantity:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_lists_params_lines_and_total() {
        let mut estimate = Estimate::new(CalculatorKind::Socket, "Расчет")
            .param("Тип объекта", "Квартира")
            .with_total(2100.4);
        estimate
            .lines
            .push(EstimateLine::new("розетка одинарная", 6.0, "шт.", 350.0, 2100.0));

        let text = estimate.render();
        assert!(text.starts_with("Расчет:"));
        assert!(text.contains("• Тип объекта: Квартира"));
        assert!(text.contains("• розетка одинарная: 6 шт. x 350 руб. = 2100 руб."));
        assert!(text.contains("Общая стоимость: 2100 руб."));
    }

    #[test]
    fn quantities_keep_one_decimal() {
        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(2.74), "2.7");
    }
}
