//! Single-calculation entry points.

use tracing::debug;

use crate::combinatorics::{self, Count};
use crate::error::{CalcError, Result, ValidationError};
use crate::formulas::{Calculation, Formula, FormulaId};
use crate::model::{CalculationRequest, CalculationResult, OutputFormat, Params};

/// Parse, validate and evaluate one request
pub fn calculate(request: &CalculationRequest) -> Result<CalculationResult> {
    let id: FormulaId = request.formula_id.parse()?;
    calculate_formula(id, &request.parameters, request.precision, request.output_format)
}

/// [`calculate`] with an already resolved formula id
pub fn calculate_formula(
    id: FormulaId,
    params: &Params,
    precision: u32,
    format: OutputFormat,
) -> Result<CalculationResult> {
    let formula = Formula::from_params(id, params)?;
    let outputs = formula.evaluate()?;
    debug!(formula = %id, "calculated {}", formula.describe());

    let mut result = CalculationResult::from_outputs(id, outputs, precision, format);
    result.derivation.insert(0, formula.describe());
    Ok(result)
}

/// Count for a two-argument counting formula, e.g. `("combination", 5, 3)`
pub fn calculate_combinatorics(kind: &str, n: u64, r: u64) -> Result<Count> {
    let id: FormulaId = kind.parse()?;
    for (field, value) in [("n", n), ("r", r)] {
        if value > combinatorics::MAX_COUNT_N {
            return Err(ValidationError::new(
                field,
                format!("must be at most {}", combinatorics::MAX_COUNT_N),
            )
            .into());
        }
    }
    let needs_r_at_most_n = matches!(id, FormulaId::Permutation | FormulaId::Combination);
    if needs_r_at_most_n && r > n {
        return Err(ValidationError::new("r", "must not exceed n").into());
    }
    Ok(match id {
        FormulaId::Permutation => combinatorics::permutations(n, r),
        FormulaId::Combination => combinatorics::combinations(n, r),
        FormulaId::PermutationRepetition => combinatorics::permutations_with_repetition(n, r),
        FormulaId::CombinationRepetition => combinatorics::combinations_with_repetition(n, r),
        other => {
            return Err(CalcError::Validation(ValidationError::new(
                "formula_id",
                format!("{other} is not an (n, r) counting formula"),
            )));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResultValue;

    #[test]
    fn test_calculate_combinatorics() {
        assert_eq!(calculate_combinatorics("combination", 5, 3).unwrap(), Count::Exact(10));
        assert_eq!(calculate_combinatorics("permutation", 5, 3).unwrap(), Count::Exact(60));
        assert!(calculate_combinatorics("permutation", 3, 5).is_err());
        assert!(calculate_combinatorics("bmi", 3, 5).is_err());
        assert!(matches!(
            calculate_combinatorics("nope", 1, 1),
            Err(CalcError::UnknownFormula(_))
        ));
    }

    #[test]
    fn test_calculate_combinatorics_rejects_huge_inputs() {
        let err = calculate_combinatorics("combination_repetition", u64::MAX, 2).unwrap_err();
        assert_eq!(err.to_string(), "n: must be at most 1000000");
        let err = calculate_combinatorics("permutation_repetition", 3, 2_000_000).unwrap_err();
        assert!(matches!(err, CalcError::Validation(ref e) if e.field == "r"));
        assert!(calculate_combinatorics("combination_repetition", 1_000_000, 2).is_ok());
    }

    #[test]
    fn test_calculate_request() {
        let request = CalculationRequest::new("zscore")
            .param("x", 75.0)
            .param("mean", "70")
            .param("std_dev", "10 / 2");
        let result = calculate(&request).unwrap();
        assert_eq!(result.formula_id, FormulaId::ZScore);
        assert_eq!(result.value("z"), Some(&ResultValue::Number(1.0)));
        assert_eq!(result.value("cdf"), Some(&ResultValue::Number(0.84)));
        assert_eq!(result.derivation[0], "z-score of 75 in N(70, 5²)");
    }

    #[test]
    fn test_errors_surface_with_messages() {
        let request = CalculationRequest::new("hollow_cylinder")
            .param("outer_radius", 1.0)
            .param("inner_radius", 2.0)
            .param("height", 3.0);
        let err = calculate(&request).unwrap_err();
        assert_eq!(err.to_string(), "inner_radius: must be less than outer radius");

        let request = CalculationRequest::new("logarithm")
            .param("value", "")
            .param("base", 10.0);
        let err = calculate(&request).unwrap_err();
        assert_eq!(err.to_string(), "value: value is empty");
    }
}
