use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One raw parameter as handed over by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
    /// Sample-style input (statistics values, multiset frequencies, items)
    List(Vec<String>),
}

impl ParamValue {
    /// Raw text form, used for parsing and history summaries
    pub fn as_text(&self) -> String {
        match self {
            ParamValue::Number(n) => n.to_string(),
            ParamValue::Text(s) => s.clone(),
            ParamValue::List(items) => items.join(", "),
        }
    }

    /// List form; a text value is split on commas and whitespace
    pub fn as_list(&self) -> Vec<String> {
        match self {
            ParamValue::Number(n) => vec![n.to_string()],
            ParamValue::Text(s) => split_list(s),
            ParamValue::List(items) => items.clone(),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

/// Split free text such as `"1, 2 3;4"` into list items
pub fn split_list(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Named raw parameters, keyed by field name
pub type Params = BTreeMap<String, ParamValue>;

/// How numeric results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Decimal,
    Scientific,
    Fraction,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "decimal" => Ok(OutputFormat::Decimal),
            "scientific" | "sci" => Ok(OutputFormat::Scientific),
            "fraction" => Ok(OutputFormat::Fraction),
            other => Err(format!(
                "unknown output format '{other}' (expected decimal, scientific or fraction)"
            )),
        }
    }
}

fn default_precision() -> u32 {
    2
}

/// A single calculation to perform
///
/// Built once per user action and consumed by [`crate::engine::calculate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub formula_id: String,
    #[serde(default)]
    pub parameters: Params,
    /// Decimal places for displayed values
    #[serde(default = "default_precision")]
    pub precision: u32,
    #[serde(default)]
    pub output_format: OutputFormat,
}

impl CalculationRequest {
    pub fn new(formula_id: impl Into<String>) -> Self {
        Self {
            formula_id: formula_id.into(),
            parameters: Params::new(),
            precision: default_precision(),
            output_format: OutputFormat::Decimal,
        }
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// `key=value` pairs for history and logs
    pub fn param_summary(&self) -> String {
        self.parameters
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("1, 2 3;4"), vec!["1", "2", "3", "4"]);
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn test_request_builder_and_summary() {
        let req = CalculationRequest::new("permutation")
            .param("n", 5.0)
            .param("r", "3")
            .precision(0);
        assert_eq!(req.precision, 0);
        assert_eq!(req.param_summary(), "n=5, r=3");
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let req: CalculationRequest =
            serde_json::from_str(r#"{"formula_id":"zscore","parameters":{"x":75,"mean":"70"}}"#)
                .unwrap();
        assert_eq!(req.precision, 2);
        assert_eq!(req.output_format, OutputFormat::Decimal);
        assert_eq!(req.parameters["x"], ParamValue::Number(75.0));
        assert_eq!(req.parameters["mean"], ParamValue::Text("70".into()));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("Scientific".parse::<OutputFormat>(), Ok(OutputFormat::Scientific));
        assert!("hex".parse::<OutputFormat>().is_err());
    }
}
