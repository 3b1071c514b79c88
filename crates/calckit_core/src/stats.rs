//! Descriptive statistics over a finite sample.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Most frequent value(s) of a sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mode {
    /// One or more values sharing the highest frequency, ascending
    Values(Vec<f64>),
    /// Every distinct value occurs equally often
    NoMode,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Values(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
            Mode::NoMode => write!(f, "no mode"),
        }
    }
}

/// Summary of a sample. Variance is the population variance (divide by n).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub mode: Mode,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub midrange: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    /// Population skewness; 0 for a constant sample
    pub skewness: f64,
    /// Excess kurtosis; 0 for a constant sample
    pub kurtosis: f64,
}

fn check_sample(values: &[f64]) -> Result<(), ValidationError> {
    if values.is_empty() {
        return Err(ValidationError::new("values", "at least one value is required"));
    }
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(ValidationError::new(
            "values",
            format!("value {} is not finite", i + 1),
        ));
    }
    Ok(())
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Linear-interpolation quantile of an ascending, non-empty slice.
///
/// Uses h = (n − 1)·p, i.e. the same rule as most spreadsheets' `QUARTILE.INC`.
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let p = p.clamp(0.0, 1.0);
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// `(p, value)` pairs for each requested fraction p ∈ [0, 1]
pub fn percentiles(values: &[f64], ps: &[f64]) -> Result<Vec<(f64, f64)>, ValidationError> {
    check_sample(values)?;
    if let Some(p) = ps.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(ValidationError::new(
            "percentile",
            format!("{p} is outside [0, 1]"),
        ));
    }
    let sorted = sorted_copy(values);
    Ok(ps.iter().map(|&p| (p, quantile(&sorted, p))).collect())
}

fn mode(sorted: &[f64]) -> Mode {
    let mut counts: FxHashMap<u64, usize> = FxHashMap::default();
    for &v in sorted {
        // −0.0 and 0.0 are the same value
        let key = if v == 0.0 { 0f64.to_bits() } else { v.to_bits() };
        *counts.entry(key).or_insert(0) += 1;
    }
    let top = counts.values().copied().max().unwrap_or(0);
    if counts.len() > 1 && counts.values().all(|&c| c == top) {
        return Mode::NoMode;
    }
    let mut modes: Vec<f64> = counts
        .into_iter()
        .filter(|&(_, c)| c == top)
        .map(|(bits, _)| f64::from_bits(bits))
        .collect();
    modes.sort_by(f64::total_cmp);
    Mode::Values(modes)
}

/// Summarize a sample of at least one finite value
pub fn summarize(values: &[f64]) -> Result<Summary, ValidationError> {
    check_sample(values)?;

    let sorted = sorted_copy(values);
    let n = sorted.len() as f64;
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let sum: f64 = sorted.iter().sum();
    // A constant sample must have exactly zero spread, whatever the summation error
    let mean = if min == max { min } else { sum / n };

    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &v in &sorted {
        let d = v - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    let variance = m2 / n;
    let std_dev = variance.sqrt();

    let (skewness, kurtosis) = if std_dev > 0.0 {
        (
            (m3 / n) / std_dev.powi(3),
            (m4 / n) / (variance * variance) - 3.0,
        )
    } else {
        (0.0, 0.0)
    };

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);

    Ok(Summary {
        count: sorted.len(),
        sum,
        mean,
        median: quantile(&sorted, 0.5),
        mode: mode(&sorted),
        min,
        max,
        range: max - min,
        midrange: (min + max) / 2.0,
        variance,
        std_dev,
        q1,
        q3,
        iqr: q3 - q1,
        skewness,
        kurtosis,
    })
}

/// Σ wᵢxᵢ / Σ wᵢ; weights must be non-negative with a positive total
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> Result<f64, ValidationError> {
    check_sample(values)?;
    if values.len() != weights.len() {
        return Err(ValidationError::new(
            "weights",
            format!(
                "expected {} weights, got {}",
                values.len(),
                weights.len()
            ),
        ));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ValidationError::new("weights", "must not be negative"));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(ValidationError::new("weights", "must not all be zero"));
    }
    let weighted: f64 = values.iter().zip(weights).map(|(v, w)| v * w).sum();
    Ok(weighted / total)
}
