//! Tests for one-parameter sensitivity sweeps over real formulas

use crate::analysis::{SweepConfig, sweep, sweep_with};
use crate::error::SweepError;
use crate::formulas::FormulaId;
use crate::model::{ParamValue, Params};

fn params(pairs: &[(&str, f64)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), ParamValue::Number(*v)))
        .collect()
}

#[test]
fn test_ten_percent_sweep_of_100_in_five_points() {
    let base = params(&[("principal", 100.0), ("annual_rate", 0.0), ("term_years", 1.0)]);
    let config = SweepConfig::new(10.0).with_points(5);
    let points = sweep_with(&base, "principal", FormulaId::Loan, &config).unwrap();

    let varied: Vec<f64> = points.iter().map(|p| p.varied_parameter_value).collect();
    assert_eq!(varied, vec![90.0, 95.0, 100.0, 105.0, 110.0]);
    let percents: Vec<f64> = points.iter().map(|p| p.variation_percent).collect();
    assert_eq!(percents, vec![-10.0, -5.0, 0.0, 5.0, 10.0]);
    assert_eq!(points[2].output_value, 100.0 / 12.0);
}

#[test]
fn test_default_sweep_has_eleven_points() {
    let base = params(&[("weight_kg", 70.0), ("height_cm", 175.0)]);
    let points = sweep(&base, "height_cm", 20.0, FormulaId::Bmi).unwrap();
    assert_eq!(points.len(), 11);
    // taller at the same weight means a lower BMI
    assert!(points.windows(2).all(|w| w[0].output_value > w[1].output_value));
}

#[test]
fn test_sweep_past_domain_edge_is_shorter() {
    // probability 0.9 ± 20% crosses 1.0, where the quantile is undefined
    let base = params(&[("probability", 0.9)]);
    let points = sweep(&base, "probability", 20.0, FormulaId::InverseNormal).unwrap();
    assert!(points.len() < 11);
    assert!(points.iter().all(|p| p.varied_parameter_value < 1.0));
    assert!(points.windows(2).all(|w| w[0].output_value < w[1].output_value));
}

#[test]
fn test_sweeping_an_optional_parameter() {
    let base = params(&[
        ("principal", 200_000.0),
        ("annual_rate", 5.0),
        ("term_years", 30.0),
        ("extra_payment", 100.0),
    ]);
    let config = SweepConfig::new(100.0).with_points(3).with_output("months");
    let points = sweep_with(&base, "extra_payment", FormulaId::Loan, &config).unwrap();
    let months: Vec<f64> = points.iter().map(|p| p.output_value).collect();
    assert_eq!(months[0], 360.0);
    assert!(months[1] < months[0] && months[2] < months[1]);
}

#[test]
fn test_sweep_errors() {
    let base = params(&[("side", 2.0)]);
    assert!(matches!(
        sweep(&base, "side", f64::INFINITY, FormulaId::Cube),
        Err(SweepError::InvalidVariation(_))
    ));
    assert!(matches!(
        sweep(&base, "radius", 10.0, FormulaId::Cube),
        Err(SweepError::UnknownParameter { .. })
    ));

    let negative = params(&[("side", -2.0)]);
    let err = sweep(&negative, "side", 10.0, FormulaId::Cube).unwrap_err();
    assert_eq!(err.to_string(), "base parameters are invalid: side: must be greater than 0");
}
