//! Declarative domain checks applied after parsing.
//!
//! A [`Validator`] collects field rules and cross-field rules in declaration
//! order. Field rules are reported first: the first failing field rule wins.
//! Cross-field rules are only reported once every field rule has passed, so a
//! message like "inner radius must be less than outer radius" never masks a
//! more basic "outer radius must be positive".

use crate::error::ValidationError;

/// A single-value predicate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// > 0
    Positive,
    /// >= 0
    NonNegative,
    /// No fractional part
    Integer,
    /// >= bound
    AtLeast(f64),
    /// <= bound
    AtMost(f64),
    /// > bound
    GreaterThan(f64),
    /// < bound
    LessThan(f64),
    /// != value
    NotEqual(f64),
}

impl Rule {
    fn check(self, value: f64) -> Result<(), String> {
        let ok = match self {
            Rule::Positive => value > 0.0,
            Rule::NonNegative => value >= 0.0,
            Rule::Integer => value.fract() == 0.0,
            Rule::AtLeast(min) => value >= min,
            Rule::AtMost(max) => value <= max,
            Rule::GreaterThan(min) => value > min,
            Rule::LessThan(max) => value < max,
            Rule::NotEqual(other) => value != other,
        };
        if ok {
            return Ok(());
        }
        Err(match self {
            Rule::Positive => "must be greater than 0".to_string(),
            Rule::NonNegative => "must not be negative".to_string(),
            Rule::Integer => "must be a whole number".to_string(),
            Rule::AtLeast(min) => format!("must be at least {min}"),
            Rule::AtMost(max) => format!("must be at most {max}"),
            Rule::GreaterThan(min) => format!("must be greater than {min}"),
            Rule::LessThan(max) => format!("must be less than {max}"),
            Rule::NotEqual(other) => format!("must not equal {other}"),
        })
    }
}

/// Common rule sets
pub mod rules {
    use super::Rule;

    pub const POSITIVE: &[Rule] = &[Rule::Positive];
    pub const NON_NEGATIVE: &[Rule] = &[Rule::NonNegative];
    pub const COUNT: &[Rule] = &[Rule::NonNegative, Rule::Integer];
    pub const POSITIVE_COUNT: &[Rule] = &[Rule::Positive, Rule::Integer];
    pub const PERCENT: &[Rule] = &[Rule::NonNegative, Rule::AtMost(100.0)];
    pub const OPEN_UNIT: &[Rule] = &[Rule::GreaterThan(0.0), Rule::LessThan(1.0)];
}

/// Accumulates rule outcomes and reports the first failure
#[derive(Debug, Default)]
pub struct Validator {
    field_error: Option<ValidationError>,
    cross_errors: Vec<ValidationError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `value` against `rules` in order
    #[must_use]
    pub fn field(mut self, name: &str, value: f64, rules: &[Rule]) -> Self {
        if self.field_error.is_some() {
            return self;
        }
        for rule in rules {
            if let Err(message) = rule.check(value) {
                self.field_error = Some(ValidationError::new(name, message));
                break;
            }
        }
        self
    }

    /// Record a cross-field relation; reported only if all field rules pass
    #[must_use]
    pub fn cross(mut self, name: &str, holds: bool, message: &str) -> Self {
        if !holds {
            self.cross_errors.push(ValidationError::new(name, message));
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if let Some(err) = self.field_error {
            return Err(err);
        }
        match self.cross_errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_failing_field_rule_is_reported() {
        let err = Validator::new()
            .field("n", -1.5, rules::COUNT)
            .field("r", -2.0, rules::COUNT)
            .finish()
            .unwrap_err();
        assert_eq!(err.field, "n");
        assert_eq!(err.message, "must not be negative");

        let err = Validator::new()
            .field("n", 2.5, rules::COUNT)
            .finish()
            .unwrap_err();
        assert_eq!(err.message, "must be a whole number");
    }

    #[test]
    fn test_cross_rules_run_after_fields() {
        // Cross rule declared first still loses to a later field failure
        let err = Validator::new()
            .cross("inner_radius", false, "must be less than outer radius")
            .field("outer_radius", 0.0, rules::POSITIVE)
            .finish()
            .unwrap_err();
        assert_eq!(err.field, "outer_radius");

        let err = Validator::new()
            .field("outer_radius", 2.0, rules::POSITIVE)
            .field("inner_radius", 3.0, rules::POSITIVE)
            .cross("inner_radius", 3.0 < 2.0, "must be less than outer radius")
            .finish()
            .unwrap_err();
        assert_eq!(err.field, "inner_radius");
        assert_eq!(err.message, "must be less than outer radius");
    }

    #[test]
    fn test_all_rules_pass() {
        assert!(
            Validator::new()
                .field("p", 0.5, rules::OPEN_UNIT)
                .field("pct", 100.0, rules::PERCENT)
                .field("base", 2.0, &[Rule::Positive, Rule::NotEqual(1.0)])
                .cross("base", true, "unused")
                .finish()
                .is_ok()
        );
    }

    #[test]
    fn test_rule_messages() {
        assert_eq!(
            Rule::NotEqual(1.0).check(1.0).unwrap_err(),
            "must not equal 1"
        );
        assert_eq!(
            Rule::LessThan(1.0).check(1.0).unwrap_err(),
            "must be less than 1"
        );
    }
}
