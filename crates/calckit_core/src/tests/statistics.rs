//! Tests for descriptive statistics over generated samples

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal, Uniform};

use crate::engine::calculate;
use crate::model::{CalculationRequest, ParamValue, ResultValue};
use crate::stats::{Mode, percentiles, summarize};

#[test]
fn test_large_normal_sample_matches_its_distribution() {
    let mut rng = StdRng::seed_from_u64(42);
    let normal = Normal::new(50.0, 10.0).unwrap();
    let sample: Vec<f64> = (0..20_000).map(|_| normal.sample(&mut rng)).collect();

    let s = summarize(&sample).unwrap();
    assert!((s.mean - 50.0).abs() < 0.5, "mean {}", s.mean);
    assert!((s.std_dev - 10.0).abs() < 0.5, "std dev {}", s.std_dev);
    assert!(s.skewness.abs() < 0.1, "skewness {}", s.skewness);
    assert!(s.kurtosis.abs() < 0.2, "kurtosis {}", s.kurtosis);
    // Q3 − Q1 of a normal is 1.349σ
    assert!((s.iqr - 13.49).abs() < 0.5, "iqr {}", s.iqr);
}

#[test]
fn test_uniform_sample_percentiles_are_ordered() {
    let mut rng = StdRng::seed_from_u64(5);
    let uniform = Uniform::new(0.0, 1.0).unwrap();
    let sample: Vec<f64> = (0..5_000).map(|_| uniform.sample(&mut rng)).collect();

    let ps = [0.05, 0.25, 0.5, 0.75, 0.95];
    let values = percentiles(&sample, &ps).unwrap();
    assert!(values.windows(2).all(|w| w[0].1 <= w[1].1));
    for (p, v) in values {
        assert!((v - p).abs() < 0.03, "P{p} = {v}");
    }
}

#[test]
fn test_constant_sample_is_fully_defined() {
    for value in [3.3, -0.1, 1e9, 0.0] {
        let s = summarize(&[value; 7]).unwrap();
        assert_eq!(s.variance, 0.0);
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.skewness, 0.0);
        assert_eq!(s.kurtosis, 0.0);
        assert_eq!(s.mean, value);
        assert_eq!(s.mode, Mode::Values(vec![value]));
    }
}

#[test]
fn test_mode_variants() {
    assert_eq!(summarize(&[1.0, 2.0, 3.0]).unwrap().mode, Mode::NoMode);
    assert_eq!(summarize(&[1.0, 1.0, 2.0, 2.0]).unwrap().mode, Mode::NoMode);
    assert_eq!(
        summarize(&[3.0, 1.0, 3.0, 1.0, 2.0]).unwrap().mode,
        Mode::Values(vec![1.0, 3.0])
    );
    assert_eq!(summarize(&[7.0]).unwrap().mode, Mode::Values(vec![7.0]));
}

#[test]
fn test_descriptive_request_accepts_list_and_text() {
    let list: Vec<String> = ["2", "4", "4", "4", "5", "5", "7", "9"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let from_list = calculate(
        &CalculationRequest::new("descriptive").param("values", ParamValue::List(list)),
    )
    .unwrap();
    let from_text = calculate(
        &CalculationRequest::new("descriptive").param("values", "2, 4 4;4 5 5 7 9"),
    )
    .unwrap();

    assert_eq!(from_list.values, from_text.values);
    assert_eq!(from_list.value("variance"), Some(&ResultValue::Number(4.0)));
    assert_eq!(from_list.value("mode"), Some(&ResultValue::Text("4".into())));
    assert_eq!(from_list.table.as_ref().map(|t| t.len()), Some(5));
}
