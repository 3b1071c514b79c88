use crate::distribution::{self, NormalDistribution, Tail};
use crate::error::{CalcError, ValidationError};
use crate::format::format_compact;
use crate::model::Outputs;
use crate::validate::{Validator, rules};

use super::{Calculation, Inputs};

#[derive(Debug, Clone, PartialEq)]
pub struct ZScore {
    pub x: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl ZScore {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            x: inputs.number("x")?,
            mean: inputs.number("mean")?,
            std_dev: inputs.number("std_dev")?,
        })
    }
}

impl Calculation for ZScore {
    fn validate(&self) -> Result<(), ValidationError> {
        NormalDistribution::new(self.mean, self.std_dev).map(|_| ())
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let n = NormalDistribution::new(self.mean, self.std_dev)?;
        let z = n.z_score(self.x);
        let cdf = n.cdf(self.x);
        Ok(Outputs::new()
            .number("z", z)
            .number("pdf", n.pdf(self.x))
            .number("cdf", cdf)
            .number("right_tail", n.sf(self.x))
            .step("z = (x − μ) / σ")
            .step(format!(
                "z = ({} − {}) / {} = {}",
                format_compact(self.x),
                format_compact(self.mean),
                format_compact(self.std_dev),
                format_compact(z)
            ))
            .step(format!("Φ(z) = ½·erfc(−z/√2) = {}", format_compact(cdf))))
    }

    fn describe(&self) -> String {
        format!("z-score of {} in N({}, {}²)", self.x, self.mean, self.std_dev)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalProbability {
    pub x: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub tail: Tail,
}

impl NormalProbability {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            x: inputs.number("x")?,
            mean: inputs.number("mean")?,
            std_dev: inputs.number("std_dev")?,
            tail: inputs.choice("tail")?.unwrap_or_default(),
        })
    }
}

impl Calculation for NormalProbability {
    fn validate(&self) -> Result<(), ValidationError> {
        NormalDistribution::new(self.mean, self.std_dev).map(|_| ())
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let n = NormalDistribution::new(self.mean, self.std_dev)?;
        let p = n.tail_probability(self.x, self.tail);
        let expr = match self.tail {
            Tail::Left => "P(X ≤ x)",
            Tail::Right => "P(X ≥ x)",
            Tail::TwoTailed => "P(|Z| ≥ |z|)",
        };
        Ok(Outputs::new()
            .number("probability", p)
            .number("z", n.z_score(self.x))
            .label("tail", self.tail.to_string())
            .step(format!("z = {}", format_compact(n.z_score(self.x))))
            .step(format!("{expr} = {}", format_compact(p))))
    }

    fn describe(&self) -> String {
        format!(
            "{} probability of {} in N({}, {}²)",
            self.tail, self.x, self.mean, self.std_dev
        )
    }
}

/// Value whose cumulative probability is `probability`
#[derive(Debug, Clone, PartialEq)]
pub struct InverseNormal {
    pub probability: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl InverseNormal {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            probability: inputs.number("probability")?,
            mean: inputs.number_or("mean", 0.0)?,
            std_dev: inputs.number_or("std_dev", 1.0)?,
        })
    }
}

impl Calculation for InverseNormal {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .field("probability", self.probability, rules::OPEN_UNIT)
            .finish()?;
        NormalDistribution::new(self.mean, self.std_dev).map(|_| ())
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let n = NormalDistribution::new(self.mean, self.std_dev)?;
        let x = n.inverse_cdf(self.probability)?;
        let z = n.z_score(x);
        Ok(Outputs::new()
            .number("x", x)
            .number("z", z)
            .step(format!(
                "z = Φ⁻¹({}) = {}",
                format_compact(self.probability),
                format_compact(z)
            ))
            .step(format!(
                "x = μ + z·σ = {}",
                format_compact(x)
            )))
    }

    fn describe(&self) -> String {
        format!(
            "inverse normal of p={} in N({}, {}²)",
            self.probability, self.mean, self.std_dev
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CriticalValue {
    pub confidence: f64,
    pub tail: Tail,
}

impl CriticalValue {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            confidence: inputs.number("confidence")?,
            tail: inputs.choice("tail")?.unwrap_or(Tail::TwoTailed),
        })
    }
}

impl Calculation for CriticalValue {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .field("confidence", self.confidence, rules::OPEN_UNIT)
            .finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let z = distribution::critical_value(self.confidence, self.tail)?;
        Ok(Outputs::new()
            .number("critical_value", z)
            .label("tail", self.tail.to_string())
            .step(format!(
                "α = 1 − {} = {}",
                format_compact(self.confidence),
                format_compact(1.0 - self.confidence)
            ))
            .step(format!("z* = {}", format_compact(z))))
    }

    fn describe(&self) -> String {
        format!("{} critical value at {} confidence", self.tail, self.confidence)
    }
}
