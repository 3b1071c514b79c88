//! Formula registry.
//!
//! [`FormulaId`] names every formula the engine knows. [`Formula::from_params`]
//! turns a raw parameter bag into a typed formula value; nothing downstream
//! ever sees an untyped parameter again.
//!
//! Lifecycle of a calculation:
//!
//! ```text
//! Params ──parse──▶ Formula ──validate──▶ Formula ──compute──▶ Outputs
//! ```
//!
//! `compute` is only ever called on a formula whose `validate` succeeded;
//! [`Formula::evaluate`] enforces that ordering.

mod combinatorics;
mod finance;
mod geometry;
mod health;
mod logarithm;
mod normal;
mod statistics;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, ParseError, ValidationError};
use crate::model::{Outputs, ParamValue, Params};
use crate::parse::{parse_number, parse_numbers};

pub use combinatorics::{Bell, Circular, Multiset, Selection, SelectionKind, Stirling};
pub use finance::{
    AmortizationRow, Loan, LoanKind, Mortgage, Rental, Schedule, amortize, monthly_payment,
};
pub use geometry::{Hypotenuse, Leg, RightTriangle, Solid, SolidShape};
pub use health::{ActivityLevel, Bmi, Protein, bmi_category};
pub use logarithm::{Exponential, Logarithm, NaturalLog};
pub use normal::{CriticalValue, InverseNormal, NormalProbability, ZScore};
pub use statistics::{Descriptive, WeightedMean};

/// Capabilities shared by every formula
pub trait Calculation {
    /// Domain checks on already-parsed parameters
    fn validate(&self) -> Result<(), ValidationError>;

    /// Evaluate; only called after [`Calculation::validate`] succeeded
    fn compute(&self) -> Result<Outputs, CalcError>;

    /// One-line human description, e.g. `P(5, 3)`
    fn describe(&self) -> String;
}

/// Every formula the engine can evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaId {
    // Finance
    Loan,
    Mortgage,
    Rental,
    // Combinatorics
    Permutation,
    Combination,
    PermutationRepetition,
    CombinationRepetition,
    Circular,
    Multiset,
    StirlingFirst,
    StirlingSecond,
    Bell,
    // Normal distribution
    #[serde(rename = "zscore")]
    ZScore,
    NormalProbability,
    InverseNormal,
    CriticalValue,
    // Geometry
    Hypotenuse,
    Leg,
    RightTriangle,
    Cube,
    Cuboid,
    Sphere,
    Cylinder,
    Cone,
    Pyramid,
    HollowCylinder,
    // Logarithm / exponential
    Logarithm,
    NaturalLog,
    Exponential,
    // Statistics
    Descriptive,
    WeightedMean,
    // Health
    Bmi,
    Protein,
}

impl FormulaId {
    pub const ALL: [FormulaId; 33] = [
        FormulaId::Loan,
        FormulaId::Mortgage,
        FormulaId::Rental,
        FormulaId::Permutation,
        FormulaId::Combination,
        FormulaId::PermutationRepetition,
        FormulaId::CombinationRepetition,
        FormulaId::Circular,
        FormulaId::Multiset,
        FormulaId::StirlingFirst,
        FormulaId::StirlingSecond,
        FormulaId::Bell,
        FormulaId::ZScore,
        FormulaId::NormalProbability,
        FormulaId::InverseNormal,
        FormulaId::CriticalValue,
        FormulaId::Hypotenuse,
        FormulaId::Leg,
        FormulaId::RightTriangle,
        FormulaId::Cube,
        FormulaId::Cuboid,
        FormulaId::Sphere,
        FormulaId::Cylinder,
        FormulaId::Cone,
        FormulaId::Pyramid,
        FormulaId::HollowCylinder,
        FormulaId::Logarithm,
        FormulaId::NaturalLog,
        FormulaId::Exponential,
        FormulaId::Descriptive,
        FormulaId::WeightedMean,
        FormulaId::Bmi,
        FormulaId::Protein,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FormulaId::Loan => "loan",
            FormulaId::Mortgage => "mortgage",
            FormulaId::Rental => "rental",
            FormulaId::Permutation => "permutation",
            FormulaId::Combination => "combination",
            FormulaId::PermutationRepetition => "permutation_repetition",
            FormulaId::CombinationRepetition => "combination_repetition",
            FormulaId::Circular => "circular",
            FormulaId::Multiset => "multiset",
            FormulaId::StirlingFirst => "stirling_first",
            FormulaId::StirlingSecond => "stirling_second",
            FormulaId::Bell => "bell",
            FormulaId::ZScore => "zscore",
            FormulaId::NormalProbability => "normal_probability",
            FormulaId::InverseNormal => "inverse_normal",
            FormulaId::CriticalValue => "critical_value",
            FormulaId::Hypotenuse => "hypotenuse",
            FormulaId::Leg => "leg",
            FormulaId::RightTriangle => "right_triangle",
            FormulaId::Cube => "cube",
            FormulaId::Cuboid => "cuboid",
            FormulaId::Sphere => "sphere",
            FormulaId::Cylinder => "cylinder",
            FormulaId::Cone => "cone",
            FormulaId::Pyramid => "pyramid",
            FormulaId::HollowCylinder => "hollow_cylinder",
            FormulaId::Logarithm => "logarithm",
            FormulaId::NaturalLog => "natural_log",
            FormulaId::Exponential => "exponential",
            FormulaId::Descriptive => "descriptive",
            FormulaId::WeightedMean => "weighted_mean",
            FormulaId::Bmi => "bmi",
            FormulaId::Protein => "protein",
        }
    }

    pub fn category(self) -> &'static str {
        use FormulaId::*;
        match self {
            Loan | Mortgage | Rental => "finance",
            Permutation | Combination | PermutationRepetition | CombinationRepetition
            | Circular | Multiset | StirlingFirst | StirlingSecond | Bell => "combinatorics",
            ZScore | NormalProbability | InverseNormal | CriticalValue => "normal distribution",
            Hypotenuse | Leg | RightTriangle | Cube | Cuboid | Sphere | Cylinder | Cone
            | Pyramid | HollowCylinder => "geometry",
            Logarithm | NaturalLog | Exponential => "logarithm",
            Descriptive | WeightedMean => "statistics",
            Bmi | Protein => "health",
        }
    }

    /// Required parameters, in the positional order batch rows use
    pub fn param_names(self) -> &'static [&'static str] {
        use FormulaId::*;
        match self {
            Loan => &["principal", "annual_rate", "term_years"],
            Mortgage => &["home_price", "down_payment_pct", "annual_rate", "term_years"],
            Rental => &[
                "purchase_price",
                "down_payment_pct",
                "annual_rate",
                "term_years",
                "monthly_rent",
                "monthly_expenses",
            ],
            Permutation | Combination | PermutationRepetition | CombinationRepetition => {
                &["n", "r"]
            }
            Circular | Bell => &["n"],
            StirlingFirst | StirlingSecond => &["n", "k"],
            Multiset => &["frequencies"],
            ZScore => &["x", "mean", "std_dev"],
            NormalProbability => &["x", "mean", "std_dev"],
            InverseNormal => &["probability"],
            CriticalValue => &["confidence"],
            Hypotenuse => &["a", "b"],
            Leg => &["hypotenuse", "leg"],
            RightTriangle => &["a", "b", "c"],
            Cube => &["side"],
            Cuboid => &["length", "width", "height"],
            Sphere => &["radius"],
            Cylinder | Cone => &["radius", "height"],
            Pyramid => &["base_length", "base_width", "height"],
            HollowCylinder => &["outer_radius", "inner_radius", "height"],
            Logarithm => &["value"],
            NaturalLog => &["value"],
            Exponential => &["base", "exponent"],
            Descriptive => &["values"],
            WeightedMean => &["values", "weights"],
            Bmi => &["weight_kg", "height_cm"],
            Protein => &["weight_kg"],
        }
    }

    /// Parameters with defaults, following the required ones positionally
    pub fn optional_params(self) -> &'static [&'static str] {
        use FormulaId::*;
        match self {
            Loan => &["extra_payment"],
            Mortgage => &["loan_kind", "extra_payment"],
            Rental => &["vacancy_pct"],
            Permutation | Combination => &["items"],
            NormalProbability => &["tail"],
            InverseNormal => &["mean", "std_dev"],
            CriticalValue => &["tail"],
            Cube | Cuboid | Sphere | Cylinder | Cone | Pyramid | HollowCylinder => {
                &["unit", "volume_unit"]
            }
            Logarithm => &["base"],
            Protein => &["activity"],
            _ => &[],
        }
    }

    /// Whether the formula consumes a whole dataset as a sample
    pub fn takes_list(self) -> bool {
        matches!(
            self,
            FormulaId::Multiset | FormulaId::Descriptive | FormulaId::WeightedMean
        )
    }

    /// Raw output key that sensitivity sweeps follow by default
    pub fn primary_output(self) -> &'static str {
        use FormulaId::*;
        match self {
            Loan | Mortgage => "monthly_payment",
            Rental => "monthly_cash_flow",
            Permutation | Combination | PermutationRepetition | CombinationRepetition
            | Circular | Multiset | StirlingFirst | StirlingSecond | Bell => "count",
            ZScore => "z",
            NormalProbability => "probability",
            InverseNormal => "x",
            CriticalValue => "critical_value",
            Hypotenuse => "hypotenuse",
            Leg => "leg",
            RightTriangle => "residual",
            Cube | Cuboid | Sphere | Cylinder | Cone | Pyramid | HollowCylinder => "volume",
            Logarithm | NaturalLog | Exponential => "result",
            Descriptive => "mean",
            WeightedMean => "weighted_mean",
            Bmi => "bmi",
            Protein => "protein_grams",
        }
    }
}

impl fmt::Display for FormulaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormulaId {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        FormulaId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| CalcError::UnknownFormula(s.trim().to_string()))
    }
}

/// Typed view over a raw parameter bag
pub(crate) struct Inputs<'a> {
    params: &'a Params,
}

impl<'a> Inputs<'a> {
    pub(crate) fn new(params: &'a Params) -> Self {
        Self { params }
    }

    fn raw(&self, name: &str) -> Option<&'a ParamValue> {
        self.params.get(name)
    }

    /// Required number; text goes through the expression parser
    pub(crate) fn number(&self, name: &str) -> Result<f64, CalcError> {
        match self.raw(name) {
            None => Err(CalcError::MissingParameter(name.to_string())),
            Some(value) => parse_value(name, value),
        }
    }

    pub(crate) fn number_or(&self, name: &str, default: f64) -> Result<f64, CalcError> {
        match self.raw(name) {
            None => Ok(default),
            Some(ParamValue::Text(s)) if s.trim().is_empty() => Ok(default),
            Some(value) => parse_value(name, value),
        }
    }

    /// Optional named choice such as a tail or a unit
    pub(crate) fn choice<T>(&self, name: &str) -> Result<Option<T>, CalcError>
    where
        T: FromStr<Err = ParseError>,
    {
        match self.raw(name) {
            None => Ok(None),
            Some(value) => {
                let text = value.as_text();
                if text.trim().is_empty() {
                    return Ok(None);
                }
                text.parse::<T>()
                    .map(Some)
                    .map_err(|e| CalcError::parse(name, e))
            }
        }
    }

    /// Required list of numbers
    pub(crate) fn numbers(&self, name: &str) -> Result<Vec<f64>, CalcError> {
        let raw = self
            .raw(name)
            .ok_or_else(|| CalcError::MissingParameter(name.to_string()))?;
        parse_numbers(&raw.as_list())
            .map_err(|(i, e)| CalcError::parse(format!("{name}[{}]", i + 1), e))
    }

    /// Optional list of free-text items
    pub(crate) fn items(&self, name: &str) -> Option<Vec<String>> {
        self.raw(name)
            .map(ParamValue::as_list)
            .filter(|items| !items.is_empty())
    }
}

fn parse_value(name: &str, value: &ParamValue) -> Result<f64, CalcError> {
    match value {
        ParamValue::Number(n) if n.is_finite() => Ok(*n),
        ParamValue::Number(n) => Err(CalcError::parse(
            name,
            ParseError::NotFinite {
                token: n.to_string(),
                value: *n,
            },
        )),
        ParamValue::Text(s) => parse_number(s).map_err(|e| CalcError::parse(name, e)),
        ParamValue::List(items) => match items.as_slice() {
            [single] => parse_number(single).map_err(|e| CalcError::parse(name, e)),
            _ => Err(CalcError::parse(
                name,
                ParseError::Syntax("expected a single number, got a list".into()),
            )),
        },
    }
}

/// A fully parsed formula with typed parameters
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    Loan(Loan),
    Mortgage(Mortgage),
    Rental(Rental),
    Selection(Selection),
    Circular(Circular),
    Multiset(Multiset),
    Stirling(Stirling),
    Bell(Bell),
    ZScore(ZScore),
    NormalProbability(NormalProbability),
    InverseNormal(InverseNormal),
    CriticalValue(CriticalValue),
    Hypotenuse(Hypotenuse),
    Leg(Leg),
    RightTriangle(RightTriangle),
    Volume(Solid),
    Logarithm(Logarithm),
    NaturalLog(NaturalLog),
    Exponential(Exponential),
    Descriptive(Descriptive),
    WeightedMean(WeightedMean),
    Bmi(Bmi),
    Protein(Protein),
}

impl Formula {
    /// Parse every field of `params` for formula `id`.
    ///
    /// Parsing only; call [`Calculation::validate`] (or [`Formula::evaluate`])
    /// before computing.
    pub fn from_params(id: FormulaId, params: &Params) -> Result<Formula, CalcError> {
        let inputs = Inputs::new(params);
        use FormulaId as Id;
        Ok(match id {
            Id::Loan => Formula::Loan(Loan::parse(&inputs)?),
            Id::Mortgage => Formula::Mortgage(Mortgage::parse(&inputs)?),
            Id::Rental => Formula::Rental(Rental::parse(&inputs)?),
            Id::Permutation => {
                Formula::Selection(Selection::parse(SelectionKind::Permutation, &inputs)?)
            }
            Id::Combination => {
                Formula::Selection(Selection::parse(SelectionKind::Combination, &inputs)?)
            }
            Id::PermutationRepetition => Formula::Selection(Selection::parse(
                SelectionKind::PermutationWithRepetition,
                &inputs,
            )?),
            Id::CombinationRepetition => Formula::Selection(Selection::parse(
                SelectionKind::CombinationWithRepetition,
                &inputs,
            )?),
            Id::Circular => Formula::Circular(Circular::parse(&inputs)?),
            Id::Multiset => Formula::Multiset(Multiset::parse(&inputs)?),
            Id::StirlingFirst => Formula::Stirling(Stirling::parse(
                crate::combinatorics::StirlingKind::First,
                &inputs,
            )?),
            Id::StirlingSecond => Formula::Stirling(Stirling::parse(
                crate::combinatorics::StirlingKind::Second,
                &inputs,
            )?),
            Id::Bell => Formula::Bell(Bell::parse(&inputs)?),
            Id::ZScore => Formula::ZScore(ZScore::parse(&inputs)?),
            Id::NormalProbability => Formula::NormalProbability(NormalProbability::parse(&inputs)?),
            Id::InverseNormal => Formula::InverseNormal(InverseNormal::parse(&inputs)?),
            Id::CriticalValue => Formula::CriticalValue(CriticalValue::parse(&inputs)?),
            Id::Hypotenuse => Formula::Hypotenuse(Hypotenuse::parse(&inputs)?),
            Id::Leg => Formula::Leg(Leg::parse(&inputs)?),
            Id::RightTriangle => Formula::RightTriangle(RightTriangle::parse(&inputs)?),
            Id::Cube
            | Id::Cuboid
            | Id::Sphere
            | Id::Cylinder
            | Id::Cone
            | Id::Pyramid
            | Id::HollowCylinder => Formula::Volume(Solid::parse(id, &inputs)?),
            Id::Logarithm => Formula::Logarithm(Logarithm::parse(&inputs)?),
            Id::NaturalLog => Formula::NaturalLog(NaturalLog::parse(&inputs)?),
            Id::Exponential => Formula::Exponential(Exponential::parse(&inputs)?),
            Id::Descriptive => Formula::Descriptive(Descriptive::parse(&inputs)?),
            Id::WeightedMean => Formula::WeightedMean(WeightedMean::parse(&inputs)?),
            Id::Bmi => Formula::Bmi(Bmi::parse(&inputs)?),
            Id::Protein => Formula::Protein(Protein::parse(&inputs)?),
        })
    }

    pub fn id(&self) -> FormulaId {
        match self {
            Formula::Loan(_) => FormulaId::Loan,
            Formula::Mortgage(_) => FormulaId::Mortgage,
            Formula::Rental(_) => FormulaId::Rental,
            Formula::Selection(s) => s.kind.id(),
            Formula::Circular(_) => FormulaId::Circular,
            Formula::Multiset(_) => FormulaId::Multiset,
            Formula::Stirling(s) => s.id(),
            Formula::Bell(_) => FormulaId::Bell,
            Formula::ZScore(_) => FormulaId::ZScore,
            Formula::NormalProbability(_) => FormulaId::NormalProbability,
            Formula::InverseNormal(_) => FormulaId::InverseNormal,
            Formula::CriticalValue(_) => FormulaId::CriticalValue,
            Formula::Hypotenuse(_) => FormulaId::Hypotenuse,
            Formula::Leg(_) => FormulaId::Leg,
            Formula::RightTriangle(_) => FormulaId::RightTriangle,
            Formula::Volume(s) => s.shape.id(),
            Formula::Logarithm(_) => FormulaId::Logarithm,
            Formula::NaturalLog(_) => FormulaId::NaturalLog,
            Formula::Exponential(_) => FormulaId::Exponential,
            Formula::Descriptive(_) => FormulaId::Descriptive,
            Formula::WeightedMean(_) => FormulaId::WeightedMean,
            Formula::Bmi(_) => FormulaId::Bmi,
            Formula::Protein(_) => FormulaId::Protein,
        }
    }

    fn as_calculation(&self) -> &dyn Calculation {
        match self {
            Formula::Loan(f) => f,
            Formula::Mortgage(f) => f,
            Formula::Rental(f) => f,
            Formula::Selection(f) => f,
            Formula::Circular(f) => f,
            Formula::Multiset(f) => f,
            Formula::Stirling(f) => f,
            Formula::Bell(f) => f,
            Formula::ZScore(f) => f,
            Formula::NormalProbability(f) => f,
            Formula::InverseNormal(f) => f,
            Formula::CriticalValue(f) => f,
            Formula::Hypotenuse(f) => f,
            Formula::Leg(f) => f,
            Formula::RightTriangle(f) => f,
            Formula::Volume(f) => f,
            Formula::Logarithm(f) => f,
            Formula::NaturalLog(f) => f,
            Formula::Exponential(f) => f,
            Formula::Descriptive(f) => f,
            Formula::WeightedMean(f) => f,
            Formula::Bmi(f) => f,
            Formula::Protein(f) => f,
        }
    }

    /// Validate, then compute
    pub fn evaluate(&self) -> Result<Outputs, CalcError> {
        self.validate()?;
        self.compute()
    }
}

impl Calculation for Formula {
    fn validate(&self) -> Result<(), ValidationError> {
        self.as_calculation().validate()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        self.as_calculation().compute()
    }

    fn describe(&self) -> String {
        self.as_calculation().describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_id_round_trips_through_str() {
        for id in FormulaId::ALL {
            assert_eq!(id.as_str().parse::<FormulaId>().unwrap(), id);
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
        assert_eq!("Stirling-Second".parse::<FormulaId>().unwrap(), FormulaId::StirlingSecond);
        assert!(matches!(
            "teleport".parse::<FormulaId>(),
            Err(CalcError::UnknownFormula(_))
        ));
    }

    #[test]
    fn test_every_formula_declares_params_and_output() {
        for id in FormulaId::ALL {
            assert!(!id.param_names().is_empty(), "{id}");
            assert!(!id.primary_output().is_empty(), "{id}");
        }
    }

    #[test]
    fn test_from_params_reports_missing_and_bad_values() {
        let mut params = Params::new();
        params.insert("n".into(), "5".into());
        let err = Formula::from_params(FormulaId::Permutation, &params).unwrap_err();
        assert_eq!(err, CalcError::MissingParameter("r".into()));

        params.insert("r".into(), "abc".into());
        let err = Formula::from_params(FormulaId::Permutation, &params).unwrap_err();
        assert!(matches!(err, CalcError::Parse { ref field, .. } if field == "r"));

        params.insert("r".into(), "1 + 2".into());
        let formula = Formula::from_params(FormulaId::Permutation, &params).unwrap();
        assert_eq!(formula.id(), FormulaId::Permutation);
        assert_eq!(formula.describe(), "P(5, 3)");
    }

    #[test]
    fn test_list_parse_error_names_position() {
        let mut params = Params::new();
        params.insert("values".into(), "1, 2, x".into());
        let err = Formula::from_params(FormulaId::Descriptive, &params).unwrap_err();
        assert!(matches!(err, CalcError::Parse { ref field, .. } if field == "values[3]"));
    }
}
