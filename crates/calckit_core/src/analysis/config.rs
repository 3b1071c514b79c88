//! Configuration and result types for sensitivity sweeps.

use serde::{Deserialize, Serialize};

use crate::error::SweepError;

/// Points in a default sweep: steps of `variation_percent / 5` from −v to +v
pub const DEFAULT_POINTS: usize = 11;

/// Largest point count a sweep accepts
pub const MAX_POINTS: usize = 1001;

/// How a single parameter is swept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Half-width of the sweep, in percent of the base value
    pub variation_percent: f64,
    /// Number of evenly spaced points, both ends included
    #[serde(default = "default_points")]
    pub points: usize,
    /// Raw output to follow; the formula's primary output when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
}

fn default_points() -> usize {
    DEFAULT_POINTS
}

impl SweepConfig {
    pub fn new(variation_percent: f64) -> Self {
        Self {
            variation_percent,
            points: DEFAULT_POINTS,
            output_key: None,
        }
    }

    #[must_use]
    pub fn with_points(mut self, points: usize) -> Self {
        self.points = points;
        self
    }

    #[must_use]
    pub fn with_output(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    pub fn validate(&self) -> Result<(), SweepError> {
        if !(self.variation_percent.is_finite() && self.variation_percent >= 0.0) {
            return Err(SweepError::InvalidVariation(self.variation_percent));
        }
        if self.points == 0 || self.points > MAX_POINTS {
            return Err(SweepError::InvalidPoints(self.points));
        }
        Ok(())
    }

    /// Percent offsets from the base value, ascending
    pub fn variations(&self) -> Vec<f64> {
        let min = -self.variation_percent;
        if self.points <= 1 || self.variation_percent == 0.0 {
            return vec![0.0];
        }
        let step_size = 2.0 * self.variation_percent / (self.points - 1) as f64;
        (0..self.points).map(|i| min + step_size * i as f64).collect()
    }

    /// Varied values for a given base value
    pub fn sweep_values(&self, base: f64) -> Vec<f64> {
        self.variations()
            .into_iter()
            .map(|pct| base + base * pct / 100.0)
            .collect()
    }
}

/// One evaluated sweep point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub variation_percent: f64,
    pub varied_parameter_value: f64,
    pub output_value: f64,
}

impl SensitivityPoint {
    /// Change of the output relative to `baseline`, in percent
    pub fn output_change_percent(&self, baseline: f64) -> Option<f64> {
        (baseline != 0.0).then(|| (self.output_value - baseline) / baseline * 100.0)
    }
}
