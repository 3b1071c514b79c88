//! Special functions: error function, its inverse, and log-gamma.
//!
//! `erf` is evaluated through the regularized incomplete gamma function,
//! erf(x) = sign(x)·P(1/2, x²), using the power series below x² = 3/2 and a
//! Lentz continued fraction for Q(1/2, x²) above it. Both converge to machine
//! precision, which the normal-distribution round trips rely on.

use std::f64::consts::{PI, SQRT_2};

/// √π
const SQRT_PI: f64 = 1.772_453_850_905_516;

const MAX_ITER: usize = 300;

/// Error function erf(x) = (2/√π) ∫₀ˣ e^{−t²} dt
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return x;
    }
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let ax = x.abs();
    if ax > 6.0 {
        return sign;
    }
    let (p, _) = half_gamma_pair(ax);
    sign * p
}

/// Complementary error function erfc(x) = 1 − erf(x), without cancellation
/// for large positive x
pub fn erfc(x: f64) -> f64 {
    if x.is_nan() {
        return x;
    }
    let ax = x.abs();
    if ax > 27.0 {
        return if x > 0.0 { 0.0 } else { 2.0 };
    }
    let (p, q) = half_gamma_pair(ax);
    if x >= 0.0 { q } else { 1.0 + p }
}

/// Regularized incomplete gamma (P, Q) at a = 1/2, argument x²
fn half_gamma_pair(ax: f64) -> (f64, f64) {
    let x2 = ax * ax;
    if x2 == 0.0 {
        return (0.0, 1.0);
    }
    // exp(−x² + ½·ln x² − lnΓ(½))
    let prefactor = (-x2).exp() * ax / SQRT_PI;
    if x2 < 1.5 {
        let p = series_p(x2, prefactor);
        (p, 1.0 - p)
    } else {
        let q = continued_fraction_q(x2, prefactor);
        (1.0 - q, q)
    }
}

fn series_p(x2: f64, prefactor: f64) -> f64 {
    let mut ap = 0.5;
    let mut term = 1.0 / ap;
    let mut sum = term;
    for _ in 0..MAX_ITER {
        ap += 1.0;
        term *= x2 / ap;
        sum += term;
        if term.abs() < sum.abs() * f64::EPSILON {
            break;
        }
    }
    prefactor * sum
}

fn continued_fraction_q(x2: f64, prefactor: f64) -> f64 {
    const TINY: f64 = 1e-300;
    let a = 0.5;

    let b0 = x2 + 1.0 - a;
    let mut f = if b0.abs() < TINY { TINY } else { b0 };
    let mut c = f;
    let mut d = 0.0;

    for n in 1..=MAX_ITER {
        let nf = n as f64;
        let an = nf * (a - nf);
        let bn = x2 + (2 * n + 1) as f64 - a;

        d = bn + an * d;
        if d.abs() < TINY {
            d = TINY;
        }
        d = 1.0 / d;

        c = bn + an / c;
        if c.abs() < TINY {
            c = TINY;
        }

        let delta = c * d;
        f *= delta;
        if (delta - 1.0).abs() < f64::EPSILON {
            break;
        }
    }
    prefactor / f
}

/// Giles (2010) rational approximation of erfinv(y) / y, in terms of
/// w = −ln((1 − y)(1 + y))
fn giles_initial_guess(w: f64) -> f64 {
    if w < 5.0 {
        let w = w - 2.5;
        let mut p = 2.810_226_36e-08;
        p = 3.432_739_39e-07 + p * w;
        p = -3.523_387_7e-06 + p * w;
        p = -4.391_506_54e-06 + p * w;
        p = 0.000_218_580_87 + p * w;
        p = -0.001_253_725_03 + p * w;
        p = -0.004_177_681_64 + p * w;
        p = 0.246_640_727 + p * w;
        1.501_409_41 + p * w
    } else {
        let w = w.sqrt() - 3.0;
        let mut p = -0.000_200_214_257;
        p = 0.000_100_950_558 + p * w;
        p = 0.001_349_343_22 + p * w;
        p = -0.003_673_428_44 + p * w;
        p = 0.005_739_507_73 + p * w;
        p = -0.007_622_461_3 + p * w;
        p = 0.009_438_870_47 + p * w;
        p = 1.001_674_06 + p * w;
        2.832_976_82 + p * w
    }
}

/// Inverse error function: returns z with erf(z) = y for y ∈ (−1, 1).
///
/// ±1 map to ±∞; anything outside [−1, 1] is NaN. A rational initial guess
/// (Giles, 2010) is polished with Newton steps on `erf`.
pub fn inverse_erf(y: f64) -> f64 {
    if y.is_nan() || !(-1.0..=1.0).contains(&y) {
        return f64::NAN;
    }
    if y == 1.0 {
        return f64::INFINITY;
    }
    if y == -1.0 {
        return f64::NEG_INFINITY;
    }
    if y == 0.0 {
        return 0.0;
    }

    let mut z = giles_initial_guess(-((1.0 - y) * (1.0 + y)).ln()) * y;

    // erf is flat to double precision beyond |z| ≈ 5.9
    if z.abs() < 5.8 {
        for _ in 0..3 {
            let err = erf(z) - y;
            let slope = 2.0 / SQRT_PI * (-z * z).exp();
            if slope == 0.0 {
                break;
            }
            let step = err / slope;
            z -= step;
            if step.abs() <= f64::EPSILON * z.abs() {
                break;
            }
        }
    }
    z
}

/// Inverse complementary error function: z with erfc(z) = q for q ∈ (0, 2).
///
/// Works from `q` directly so tail probabilities far below `f64::EPSILON`
/// keep their precision.
pub fn inverse_erfc(q: f64) -> f64 {
    if q.is_nan() || !(0.0..=2.0).contains(&q) {
        return f64::NAN;
    }
    if q == 0.0 {
        return f64::INFINITY;
    }
    if q == 2.0 {
        return f64::NEG_INFINITY;
    }
    if q == 1.0 {
        return 0.0;
    }
    if (0.0625..=1.9375).contains(&q) {
        return inverse_erf(1.0 - q);
    }

    // Mirror the upper half onto the lower one: erfc(−z) = 2 − erfc(z)
    let (tail, sign) = if q > 1.0 { (2.0 - q, -1.0) } else { (q, 1.0) };
    let mut z = giles_initial_guess(-(tail * (2.0 - tail)).ln());

    // Newton on ln erfc, which stays well-conditioned deep in the tail
    for _ in 0..4 {
        let value = erfc(z);
        if value <= 0.0 {
            break;
        }
        let slope = -2.0 / SQRT_PI * (-z * z).exp() / value;
        if slope == 0.0 || !slope.is_finite() {
            break;
        }
        let step = (value.ln() - tail.ln()) / slope;
        z -= step;
        if step.abs() <= f64::EPSILON * z.abs() {
            break;
        }
    }
    sign * z
}

/// Standard normal quantile: z with Φ(z) = p
pub fn standard_normal_quantile(p: f64) -> f64 {
    -SQRT_2 * inverse_erfc(2.0 * p)
}

/// Lanczos approximation of ln Γ(x), relative error < 2e-10 for x > 0
pub fn ln_gamma(x: f64) -> f64 {
    #[allow(clippy::excessive_precision)]
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    const G: f64 = 7.0;

    if x < 0.5 {
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, &c) in COEFFICIENTS[1..].iter().enumerate() {
        sum += c / (x + i as f64 + 1.0);
    }
    let t = x + G + 0.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// ln(n!)
pub fn ln_factorial(n: u64) -> f64 {
    if n < 2 {
        return 0.0;
    }
    ln_gamma(n as f64 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erf_known_values() {
        assert_eq!(erf(0.0), 0.0);
        assert!((erf(1.0) - 0.842_700_792_949_714_9).abs() < 1e-14);
        assert!((erf(0.5) - 0.520_499_877_813_046_5).abs() < 1e-14);
        assert!((erf(2.0) - 0.995_322_265_018_952_7).abs() < 1e-14);
        assert!((erf(-1.0) + 0.842_700_792_949_714_9).abs() < 1e-14);
        assert_eq!(erf(7.0), 1.0);
        assert!(erf(f64::NAN).is_nan());
    }

    #[test]
    fn test_erfc_complement() {
        for &x in &[-3.0, -1.2, -0.1, 0.0, 0.3, 1.0, 2.5, 4.0] {
            assert!((erf(x) + erfc(x) - 1.0).abs() < 1e-14, "x={x}");
        }
        // Tail keeps relative precision
        assert!((erfc(5.0) - 1.537_459_794_428_034_8e-12).abs() < 1e-24);
    }

    #[test]
    fn test_inverse_erf_roundtrip() {
        for &y in &[-0.999_999, -0.9, -0.5, -1e-6, 1e-6, 0.1, 0.5, 0.95, 0.999_999] {
            let z = inverse_erf(y);
            assert!((erf(z) - y).abs() < 1e-14, "y={y} z={z}");
        }
    }

    #[test]
    fn test_inverse_erf_edges() {
        assert_eq!(inverse_erf(0.0), 0.0);
        assert_eq!(inverse_erf(1.0), f64::INFINITY);
        assert_eq!(inverse_erf(-1.0), f64::NEG_INFINITY);
        assert!(inverse_erf(1.5).is_nan());
    }

    #[test]
    fn test_inverse_erfc_tail() {
        for &q in &[1e-15, 1e-9, 0.01, 0.3, 1.0, 1.7, 1.99, 2.0 - 1e-9] {
            let z = inverse_erfc(q);
            let back = erfc(z);
            assert!(((back - q) / q).abs() < 1e-12, "q={q} z={z} back={back}");
        }
        assert_eq!(inverse_erfc(0.0), f64::INFINITY);
        assert!(inverse_erfc(-0.1).is_nan());
    }

    #[test]
    fn test_initial_guess_is_close_on_both_branches() {
        // central branch (w < 5) and tail branch (w ≥ 5)
        for &y in &[0.5_f64, 0.9, 1.0 - 1e-4, 1.0 - 1e-10] {
            let w = -((1.0 - y) * (1.0 + y)).ln();
            let guess = giles_initial_guess(w) * y;
            let exact = inverse_erf(y);
            assert!(((guess - exact) / exact).abs() < 1e-6, "y={y} guess={guess}");
        }
    }

    #[test]
    fn test_standard_normal_quantile() {
        assert!((standard_normal_quantile(0.975) - 1.959_963_984_540_054).abs() < 1e-12);
        assert!(standard_normal_quantile(0.5).abs() < 1e-15);
        assert!((standard_normal_quantile(1e-10) + 6.361_340_902_404_056).abs() < 1e-9);
    }

    #[test]
    fn test_ln_gamma() {
        assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(0.5) - SQRT_PI.ln()).abs() < 1e-10);
        assert!((ln_factorial(10) - 3_628_800.0_f64.ln()).abs() < 1e-9);
        assert_eq!(ln_factorial(0), 0.0);
    }
}
