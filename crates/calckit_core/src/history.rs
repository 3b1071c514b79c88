//! History records handed to the host for persistence.
//!
//! The engine never stores anything itself; it only shapes a finished
//! calculation into an append-only record.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::formulas::FormulaId;
use crate::model::{CalculationRequest, CalculationResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: Timestamp,
    pub formula_id: FormulaId,
    /// `key=value` summary of the raw parameters
    pub params: String,
    /// `key=value` summary of the displayed values
    pub result: String,
}

impl HistoryEntry {
    /// Record a calculation at the current time
    pub fn record(request: &CalculationRequest, result: &CalculationResult) -> Self {
        Self::at(Timestamp::now(), request, result)
    }

    pub fn at(timestamp: Timestamp, request: &CalculationRequest, result: &CalculationResult) -> Self {
        Self {
            timestamp,
            formula_id: result.formula_id,
            params: request.param_summary(),
            result: result.summary(),
        }
    }

    /// Calendar date of the entry in UTC, e.g. `2024-03-01`
    pub fn date(&self) -> String {
        self.timestamp.strftime("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::calculate;

    #[test]
    fn test_entry_summarizes_request_and_result() {
        let request = CalculationRequest::new("combination")
            .param("n", 5.0)
            .param("r", 3.0);
        let result = calculate(&request).unwrap();
        let ts: Timestamp = "2024-03-01T12:30:00Z".parse().unwrap();
        let entry = HistoryEntry::at(ts, &request, &result);

        assert_eq!(entry.formula_id, FormulaId::Combination);
        assert_eq!(entry.params, "n=5, r=3");
        assert!(entry.result.starts_with("count=10"));
        assert_eq!(entry.date(), "2024-03-01");
    }

    #[test]
    fn test_entry_serializes_timestamp_as_rfc3339() {
        let request = CalculationRequest::new("natural_log").param("value", 1.0);
        let result = calculate(&request).unwrap();
        let ts: Timestamp = "2024-03-01T12:30:00Z".parse().unwrap();
        let json = serde_json::to_string(&HistoryEntry::at(ts, &request, &result)).unwrap();
        assert!(json.contains(r#""timestamp":"2024-03-01T12:30:00Z""#));
        assert!(json.contains(r#""formula_id":"natural_log""#));

        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.timestamp, ts);
    }
}
