//! Normal distribution: density, cumulative probability and quantiles.

use std::f64::consts::{PI, SQRT_2};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ValidationError};
use crate::special::{erfc, standard_normal_quantile};

/// Which side(s) of the distribution a probability refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tail {
    /// P(X ≤ x)
    #[default]
    Left,
    /// P(X ≥ x)
    Right,
    /// P(|X − μ| ≥ |x − μ|)
    TwoTailed,
}

impl Tail {
    pub const CHOICES: &'static str = "left, right, two_tailed";
}

impl FromStr for Tail {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "left" | "lower" => Ok(Tail::Left),
            "right" | "upper" => Ok(Tail::Right),
            "two_tailed" | "two" | "both" => Ok(Tail::TwoTailed),
            other => Err(ParseError::UnknownChoice {
                field: "tail".into(),
                value: other.to_string(),
                expected: Tail::CHOICES,
            }),
        }
    }
}

impl fmt::Display for Tail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tail::Left => "left",
            Tail::Right => "right",
            Tail::TwoTailed => "two_tailed",
        };
        write!(f, "{name}")
    }
}

/// N(μ, σ²) with σ > 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalDistribution {
    mean: f64,
    std_dev: f64,
}

impl NormalDistribution {
    pub fn new(mean: f64, std_dev: f64) -> Result<Self, ValidationError> {
        if !mean.is_finite() {
            return Err(ValidationError::new("mean", "must be a finite number"));
        }
        if !(std_dev.is_finite() && std_dev > 0.0) {
            return Err(ValidationError::new("std_dev", "must be greater than 0"));
        }
        Ok(Self { mean, std_dev })
    }

    pub fn standard() -> Self {
        Self {
            mean: 0.0,
            std_dev: 1.0,
        }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// (x − μ) / σ
    pub fn z_score(&self, x: f64) -> f64 {
        (x - self.mean) / self.std_dev
    }

    pub fn pdf(&self, x: f64) -> f64 {
        let z = self.z_score(x);
        (-0.5 * z * z).exp() / (self.std_dev * (2.0 * PI).sqrt())
    }

    /// P(X ≤ x) = ½·erfc(−z/√2), accurate in both tails
    pub fn cdf(&self, x: f64) -> f64 {
        0.5 * erfc(-self.z_score(x) / SQRT_2)
    }

    /// P(X ≥ x)
    pub fn sf(&self, x: f64) -> f64 {
        0.5 * erfc(self.z_score(x) / SQRT_2)
    }

    pub fn tail_probability(&self, x: f64, tail: Tail) -> f64 {
        match tail {
            Tail::Left => self.cdf(x),
            Tail::Right => self.sf(x),
            Tail::TwoTailed => erfc(self.z_score(x).abs() / SQRT_2).min(1.0),
        }
    }

    /// x with P(X ≤ x) = p, for p strictly inside (0, 1)
    pub fn inverse_cdf(&self, p: f64) -> Result<f64, ValidationError> {
        if !(p > 0.0 && p < 1.0) {
            return Err(ValidationError::new(
                "probability",
                "must be strictly between 0 and 1",
            ));
        }
        Ok(self.mean + self.std_dev * standard_normal_quantile(p))
    }
}

/// Standard-normal critical value |z*| for a confidence level.
///
/// Two-tailed splits α over both tails; one-tailed puts all of α on one side,
/// so left and right share the same magnitude.
pub fn critical_value(confidence: f64, tail: Tail) -> Result<f64, ValidationError> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(ValidationError::new(
            "confidence",
            "must be strictly between 0 and 1",
        ));
    }
    let alpha = 1.0 - confidence;
    let p = match tail {
        Tail::Left => alpha,
        Tail::Right => confidence,
        Tail::TwoTailed => 1.0 - alpha / 2.0,
    };
    Ok(NormalDistribution::standard().inverse_cdf(p)?.abs())
}
