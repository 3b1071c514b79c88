use serde::{Deserialize, Serialize};

use crate::format::format_value;
use crate::formulas::FormulaId;
use crate::model::OutputFormat;

/// A displayed result value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultValue {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for ResultValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultValue::Number(n) => write!(f, "{n}"),
            ResultValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Tabular side output (amortization schedule, enumerations)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Unformatted formula output, produced by `Calculation::compute`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outputs {
    pub(crate) numbers: Vec<(String, f64)>,
    pub(crate) exact: Vec<(String, String)>,
    pub(crate) labels: Vec<(String, String)>,
    pub(crate) derivation: Vec<String>,
    pub(crate) table: Option<Table>,
}

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// A numeric output, formatted per request
    #[must_use]
    pub fn number(mut self, key: &str, value: f64) -> Self {
        self.numbers.push((key.to_string(), value));
        self
    }

    /// A numeric output whose exact digits replace the formatted display
    #[must_use]
    pub fn exact(mut self, key: &str, approx: f64, digits: String) -> Self {
        self.numbers.push((key.to_string(), approx));
        self.exact.push((key.to_string(), digits));
        self
    }

    /// A textual output (category, verdict)
    #[must_use]
    pub fn label(mut self, key: &str, text: impl Into<String>) -> Self {
        self.labels.push((key.to_string(), text.into()));
        self
    }

    /// Append one derivation line
    #[must_use]
    pub fn step(mut self, line: impl Into<String>) -> Self {
        self.derivation.push(line.into());
        self
    }

    #[must_use]
    pub fn steps(mut self, lines: Vec<String>) -> Self {
        self.derivation.extend(lines);
        self
    }

    #[must_use]
    pub fn table(mut self, table: Table) -> Self {
        self.table = Some(table);
        self
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.numbers.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }
}

/// Outcome of one calculation
///
/// `values` are rendered at the requested precision; `raw_numeric` keeps
/// the unrounded numbers so chained computations never compound rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub formula_id: FormulaId,
    pub values: Vec<(String, ResultValue)>,
    pub derivation: Vec<String>,
    pub raw_numeric: Vec<(String, f64)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
}

impl CalculationResult {
    pub fn from_outputs(
        formula_id: FormulaId,
        outputs: Outputs,
        precision: u32,
        format: OutputFormat,
    ) -> Self {
        let mut values = Vec::with_capacity(outputs.numbers.len() + outputs.labels.len());
        for (key, raw) in &outputs.numbers {
            let exact = outputs.exact.iter().find(|(k, _)| k == key);
            let value = match (exact, format) {
                (Some((_, digits)), _) => ResultValue::Text(digits.clone()),
                (None, OutputFormat::Decimal) => ResultValue::Number(round_to(*raw, precision)),
                (None, _) => ResultValue::Text(format_value(*raw, precision, format)),
            };
            values.push((key.clone(), value));
        }
        for (key, text) in outputs.labels {
            values.push((key, ResultValue::Text(text)));
        }

        Self {
            formula_id,
            values,
            derivation: outputs.derivation,
            raw_numeric: outputs.numbers,
            table: outputs.table,
        }
    }

    /// Displayed value by key
    pub fn value(&self, key: &str) -> Option<&ResultValue> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Unrounded value by key
    pub fn raw(&self, key: &str) -> Option<f64> {
        self.raw_numeric
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    /// Value of the formula's headline output
    pub fn primary(&self) -> Option<f64> {
        self.raw(self.formula_id.primary_output())
    }

    /// `key=value` pairs for history and logs
    pub fn summary(&self) -> String {
        self.values
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Round half away from zero to `precision` decimal places
pub fn round_to(value: f64, precision: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(precision.min(15) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(898.4912, 2), 898.49);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(1e300, 10), 1e300);
    }

    #[test]
    fn test_result_keeps_raw_and_formats_values() {
        let outputs = Outputs::new()
            .number("z", 1.23456)
            .exact("count", 60.0, "60".into())
            .label("verdict", "ok")
            .step("z = 1.23");
        let result =
            CalculationResult::from_outputs(FormulaId::ZScore, outputs, 2, OutputFormat::Decimal);

        assert_eq!(result.value("z"), Some(&ResultValue::Number(1.23)));
        assert_eq!(result.raw("z"), Some(1.23456));
        assert_eq!(result.value("count"), Some(&ResultValue::Text("60".into())));
        assert_eq!(result.value("verdict"), Some(&ResultValue::Text("ok".into())));
        assert_eq!(result.primary(), Some(1.23456));
        assert_eq!(result.summary(), "z=1.23, count=60, verdict=ok");
    }
}
