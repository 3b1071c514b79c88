//! Sweep evaluator - re-runs a formula with one parameter varied.

use tracing::{debug, info};

use crate::error::{CalcError, SweepError};
use crate::formulas::{Formula, FormulaId};
use crate::model::{ParamValue, Params};
use crate::parse::parse_number;

use super::{SensitivityPoint, SweepConfig};

/// Sweep `varied_key` by ±`variation_percent` in the default 11 points
pub fn sweep(
    base: &Params,
    varied_key: &str,
    variation_percent: f64,
    formula_id: FormulaId,
) -> Result<Vec<SensitivityPoint>, SweepError> {
    sweep_with(base, varied_key, formula_id, &SweepConfig::new(variation_percent))
}

/// Sweep with an explicit point count and output key
pub fn sweep_with(
    base: &Params,
    varied_key: &str,
    formula_id: FormulaId,
    config: &SweepConfig,
) -> Result<Vec<SensitivityPoint>, SweepError> {
    config.validate()?;

    let base_value = numeric_base(base, varied_key, formula_id)?;
    let output_key = config
        .output_key
        .as_deref()
        .unwrap_or(formula_id.primary_output());

    let baseline = evaluate_output(formula_id, base, output_key)?
        .ok_or_else(|| SweepError::UnknownOutput(output_key.to_string()))?;
    debug!(formula = %formula_id, varied_key, base_value, baseline, "sweep baseline");

    let mut points = Vec::with_capacity(config.points);
    for (variation_percent, value) in config
        .variations()
        .into_iter()
        .zip(config.sweep_values(base_value))
    {
        let mut params = base.clone();
        params.insert(varied_key.to_string(), ParamValue::Number(value));

        match evaluate_output(formula_id, &params, output_key) {
            Ok(Some(output_value)) => points.push(SensitivityPoint {
                variation_percent,
                varied_parameter_value: value,
                output_value,
            }),
            Ok(None) => debug!(variation_percent, value, "point has no {output_key} output"),
            Err(e) => debug!(variation_percent, value, "point skipped: {e}"),
        }
    }

    info!(
        formula = %formula_id,
        varied_key,
        requested = config.points,
        evaluated = points.len(),
        "sweep finished"
    );
    Ok(points)
}

/// Base value of the varied parameter; it must be a declared, numeric input
fn numeric_base(base: &Params, key: &str, formula_id: FormulaId) -> Result<f64, SweepError> {
    let unknown = || SweepError::UnknownParameter {
        formula: formula_id.to_string(),
        key: key.to_string(),
    };

    let declared = formula_id
        .param_names()
        .iter()
        .chain(formula_id.optional_params())
        .any(|name| *name == key);
    if !declared {
        return Err(unknown());
    }

    match base.get(key) {
        Some(ParamValue::Number(n)) if n.is_finite() => Ok(*n),
        Some(ParamValue::Text(s)) => parse_number(s).map_err(|_| unknown()),
        _ => Err(unknown()),
    }
}

fn evaluate_output(
    formula_id: FormulaId,
    params: &Params,
    output_key: &str,
) -> Result<Option<f64>, CalcError> {
    let outputs = Formula::from_params(formula_id, params)?.evaluate()?;
    Ok(outputs.get(output_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, f64)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), ParamValue::Number(*v)))
            .collect()
    }

    #[test]
    fn test_five_point_sweep_from_90_to_110() {
        let base = params(&[("side", 100.0)]);
        let config = SweepConfig::new(10.0).with_points(5);
        let points = sweep_with(&base, "side", FormulaId::Cube, &config).unwrap();

        let varied: Vec<f64> = points.iter().map(|p| p.varied_parameter_value).collect();
        assert_eq!(varied, vec![90.0, 95.0, 100.0, 105.0, 110.0]);
        assert_eq!(points[2].output_value, 1_000_000.0);
        assert!(points.windows(2).all(|w| w[0].variation_percent < w[1].variation_percent));
    }

    #[test]
    fn test_invalid_points_are_omitted() {
        let base = params(&[("hypotenuse", 5.0), ("leg", 4.8)]);
        let points = sweep(&base, "leg", 10.0, FormulaId::Leg).unwrap();
        // leg values of 5.088 and above reach the hypotenuse
        assert_eq!(points.len(), 8);
        assert!(points.iter().all(|p| p.varied_parameter_value < 5.0));
    }

    #[test]
    fn test_loan_payment_rises_with_rate() {
        let base = params(&[
            ("principal", 50_000.0),
            ("annual_rate", 3.0),
            ("term_years", 5.0),
        ]);
        let points = sweep(&base, "annual_rate", 50.0, FormulaId::Loan).unwrap();
        assert_eq!(points.len(), 11);
        assert!(points.windows(2).all(|w| w[0].output_value < w[1].output_value));
        assert!((points[5].output_value - 898.43).abs() < 0.01);
    }

    #[test]
    fn test_explicit_output_key() {
        let base = params(&[("radius", 1.0)]);
        let config = SweepConfig::new(100.0).with_points(3).with_output("surface_area");
        let points = sweep_with(&base, "radius", FormulaId::Sphere, &config).unwrap();
        // radius 0 fails validation
        assert_eq!(points.len(), 2);
        assert!((points[1].output_value - 16.0 * std::f64::consts::PI).abs() < 1e-9);

        let missing = SweepConfig::new(10.0).with_output("weight");
        assert_eq!(
            sweep_with(&base, "radius", FormulaId::Sphere, &missing),
            Err(SweepError::UnknownOutput("weight".into()))
        );
    }

    #[test]
    fn test_run_level_errors() {
        let base = params(&[("x", 75.0), ("mean", 70.0), ("std_dev", 5.0)]);

        assert_eq!(
            sweep(&base, "x", -5.0, FormulaId::ZScore),
            Err(SweepError::InvalidVariation(-5.0))
        );
        assert!(matches!(
            sweep(&base, "height", 10.0, FormulaId::ZScore),
            Err(SweepError::UnknownParameter { .. })
        ));

        let mut text = base.clone();
        text.insert("x".into(), "seventy".into());
        assert!(matches!(
            sweep(&text, "x", 10.0, FormulaId::ZScore),
            Err(SweepError::UnknownParameter { .. })
        ));

        let bad = params(&[("x", 75.0), ("mean", 70.0), ("std_dev", 0.0)]);
        assert!(matches!(
            sweep(&bad, "x", 10.0, FormulaId::ZScore),
            Err(SweepError::InvalidBase(CalcError::Validation(_)))
        ));
    }

    #[test]
    fn test_oversized_point_count_is_rejected_before_evaluating() {
        let base = params(&[("side", 2.0)]);
        let config = SweepConfig::new(10.0).with_points(usize::MAX);
        assert_eq!(
            sweep_with(&base, "side", FormulaId::Cube, &config),
            Err(SweepError::InvalidPoints(usize::MAX))
        );
        let config = SweepConfig::new(10.0).with_points(0);
        assert!(sweep_with(&base, "side", FormulaId::Cube, &config).is_err());
    }

    #[test]
    fn test_text_base_values_are_parsed() {
        let mut base = Params::new();
        base.insert("value".into(), "10^2".into());
        base.insert("base".into(), "10".into());
        let points = sweep(&base, "value", 0.0, FormulaId::Logarithm).unwrap();
        assert_eq!(points.len(), 1);
        assert!((points[0].output_value - 2.0).abs() < 1e-12);
    }
}
