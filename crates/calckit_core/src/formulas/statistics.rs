use crate::error::{CalcError, ValidationError};
use crate::format::format_compact;
use crate::model::{Outputs, Table};
use crate::stats::{self, Mode};

use super::{Calculation, Inputs};

/// Full descriptive summary of a sample
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptive {
    pub values: Vec<f64>,
}

impl Descriptive {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            values: inputs.numbers("values")?,
        })
    }
}

impl Calculation for Descriptive {
    fn validate(&self) -> Result<(), ValidationError> {
        stats::summarize(&self.values).map(|_| ())
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let s = stats::summarize(&self.values)?;
        let mut outputs = Outputs::new()
            .number("mean", s.mean)
            .number("median", s.median)
            .number("count", s.count as f64)
            .number("sum", s.sum)
            .number("min", s.min)
            .number("max", s.max)
            .number("range", s.range)
            .number("midrange", s.midrange)
            .number("variance", s.variance)
            .number("std_dev", s.std_dev)
            .number("q1", s.q1)
            .number("q3", s.q3)
            .number("iqr", s.iqr)
            .number("skewness", s.skewness)
            .number("kurtosis", s.kurtosis)
            .label("mode", s.mode.to_string())
            .step(format!(
                "mean = {} / {} = {}",
                format_compact(s.sum),
                s.count,
                format_compact(s.mean)
            ))
            .step(format!(
                "σ² = Σ(x − mean)² / n = {}",
                format_compact(s.variance)
            ))
            .step(format!(
                "Q1 = {}, Q3 = {} (linear interpolation)",
                format_compact(s.q1),
                format_compact(s.q3)
            ));

        if let Mode::Values(modes) = &s.mode {
            if modes.len() > 1 {
                outputs = outputs.step(format!("multimodal: {} values tie", modes.len()));
            }
        }

        let mut table = Table::new(&["percentile", "value"]);
        for (p, v) in stats::percentiles(&self.values, &[0.05, 0.25, 0.5, 0.75, 0.95])? {
            table.push(vec![format!("P{}", (p * 100.0).round()), format_compact(v)]);
        }
        Ok(outputs.table(table))
    }

    fn describe(&self) -> String {
        format!("summary of {} values", self.values.len())
    }
}

/// Mean of values with per-value weights
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedMean {
    pub values: Vec<f64>,
    pub weights: Vec<f64>,
}

impl WeightedMean {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            values: inputs.numbers("values")?,
            weights: inputs.numbers("weights")?,
        })
    }
}

impl Calculation for WeightedMean {
    fn validate(&self) -> Result<(), ValidationError> {
        stats::weighted_mean(&self.values, &self.weights).map(|_| ())
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let mean = stats::weighted_mean(&self.values, &self.weights)?;
        let total: f64 = self.weights.iter().sum();
        Ok(Outputs::new()
            .number("weighted_mean", mean)
            .number("total_weight", total)
            .step("Σ(wᵢ·xᵢ) / Σwᵢ")
            .step(format!("= {}", format_compact(mean))))
    }

    fn describe(&self) -> String {
        format!("weighted mean of {} values", self.values.len())
    }
}
