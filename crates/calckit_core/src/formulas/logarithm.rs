use crate::error::{CalcError, ValidationError, ensure_finite};
use crate::format::format_compact;
use crate::model::Outputs;
use crate::validate::{Rule, Validator, rules};

use super::{Calculation, Inputs};

/// log_base(value) via change of base
#[derive(Debug, Clone, PartialEq)]
pub struct Logarithm {
    pub value: f64,
    pub base: f64,
}

impl Logarithm {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            value: inputs.number("value")?,
            base: inputs.number_or("base", 10.0)?,
        })
    }
}

impl Calculation for Logarithm {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .field("value", self.value, rules::POSITIVE)
            .field("base", self.base, &[Rule::Positive, Rule::NotEqual(1.0)])
            .finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let result = ensure_finite("logarithm", self.value.ln() / self.base.ln())?;
        Ok(Outputs::new()
            .number("result", result)
            .step("log_b(x) = ln(x) / ln(b)")
            .step(format!(
                "log_{}({}) = {}",
                format_compact(self.base),
                format_compact(self.value),
                format_compact(result)
            )))
    }

    fn describe(&self) -> String {
        format!("log base {} of {}", self.base, self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NaturalLog {
    pub value: f64,
}

impl NaturalLog {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            value: inputs.number("value")?,
        })
    }
}

impl Calculation for NaturalLog {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .field("value", self.value, rules::POSITIVE)
            .finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let result = self.value.ln();
        Ok(Outputs::new()
            .number("result", result)
            .step(format!(
                "ln({}) = {}",
                format_compact(self.value),
                format_compact(result)
            )))
    }

    fn describe(&self) -> String {
        format!("ln {}", self.value)
    }
}

/// base^exponent; the result must stay finite
#[derive(Debug, Clone, PartialEq)]
pub struct Exponential {
    pub base: f64,
    pub exponent: f64,
}

impl Exponential {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            base: inputs.number("base")?,
            exponent: inputs.number("exponent")?,
        })
    }

    fn result(&self) -> f64 {
        self.base.powf(self.exponent)
    }
}

impl Calculation for Exponential {
    fn validate(&self) -> Result<(), ValidationError> {
        let real = self.base >= 0.0 || self.exponent.fract() == 0.0;
        let defined = self.base != 0.0 || self.exponent >= 0.0;
        Validator::new()
            .cross(
                "exponent",
                real,
                "must be a whole number when the base is negative",
            )
            .cross("base", defined, "must not be 0 with a negative exponent")
            .cross(
                "exponent",
                self.result().is_finite(),
                "result is too large to represent",
            )
            .finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let result = ensure_finite("power", self.result())?;
        Ok(Outputs::new()
            .number("result", result)
            .step(format!(
                "{}^{} = {}",
                format_compact(self.base),
                format_compact(self.exponent),
                format_compact(result)
            )))
    }

    fn describe(&self) -> String {
        format!("{} to the power {}", self.base, self.exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logarithm() {
        let log = Logarithm {
            value: 8.0,
            base: 2.0,
        };
        log.validate().unwrap();
        assert!((log.compute().unwrap().get("result").unwrap() - 3.0).abs() < 1e-15);

        let err = Logarithm {
            value: 8.0,
            base: 1.0,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field, "base");
        assert_eq!(err.message, "must not equal 1");

        assert!(NaturalLog { value: 0.0 }.validate().is_err());
        assert_eq!(
            NaturalLog { value: 1.0 }.compute().unwrap().get("result"),
            Some(0.0)
        );
    }

    #[test]
    fn test_exponential() {
        let e = Exponential {
            base: 2.0,
            exponent: 10.0,
        };
        e.validate().unwrap();
        assert_eq!(e.compute().unwrap().get("result"), Some(1024.0));

        let overflow = Exponential {
            base: 10.0,
            exponent: 400.0,
        };
        assert!(overflow.validate().is_err());

        let complex = Exponential {
            base: -8.0,
            exponent: 0.5,
        };
        assert_eq!(complex.validate().unwrap_err().field, "exponent");
        assert!(Exponential {
            base: -2.0,
            exponent: 3.0
        }
        .validate()
        .is_ok());
    }
}
