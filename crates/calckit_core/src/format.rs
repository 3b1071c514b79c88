//! Rendering of numeric results for display.

use crate::model::OutputFormat;

/// Largest denominator tried when approximating a fraction
pub const MAX_FRACTION_DENOMINATOR: u64 = 10_000;

/// Render `value` with `precision` decimal places in the requested form
pub fn format_value(value: f64, precision: u32, format: OutputFormat) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }
    let precision = precision.min(15) as usize;
    match format {
        OutputFormat::Decimal => format!("{value:.precision$}"),
        OutputFormat::Scientific => format_scientific(value, precision),
        OutputFormat::Fraction => format_fraction(value, precision),
    }
}

/// `1.23e+4` style; Rust's `{:e}` omits the exponent sign
fn format_scientific(value: f64, precision: usize) -> String {
    let raw = format!("{value:.precision$e}");
    match raw.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => raw,
    }
}

/// Best rational approximation with denominator ≤ [`MAX_FRACTION_DENOMINATOR`].
///
/// Values too large for exact integer arithmetic fall back to decimal.
fn format_fraction(value: f64, precision: usize) -> String {
    if value.abs() >= 1e15 {
        return format!("{value:.precision$}");
    }
    let (num, den) = approximate_fraction(value, MAX_FRACTION_DENOMINATOR);
    if den == 1 {
        num.to_string()
    } else {
        format!("{num}/{den}")
    }
}

/// Continued-fraction expansion of `value`, stopping before the denominator
/// exceeds `max_denominator`
pub fn approximate_fraction(value: f64, max_denominator: u64) -> (i64, u64) {
    let sign = if value < 0.0 { -1 } else { 1 };
    let x = value.abs();

    let (mut h_prev, mut h) = (0.0_f64, 1.0_f64);
    let (mut k_prev, mut k) = (1.0_f64, 0.0_f64);
    let mut rest = x;

    for _ in 0..64 {
        let a = rest.floor();
        let h_next = a * h + h_prev;
        let k_next = a * k + k_prev;
        if k_next > max_denominator as f64 {
            break;
        }
        (h_prev, h) = (h, h_next);
        (k_prev, k) = (k, k_next);

        let frac = rest - a;
        if frac < 1e-12 || (h / k - x).abs() < 1e-12 {
            break;
        }
        rest = 1.0 / frac;
    }

    if k == 0.0 {
        // max_denominator of 0: nothing representable but the integer part
        return (sign * x.round() as i64, 1);
    }
    (sign * h as i64, k as u64)
}

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Format a currency value, e.g. `$1,234.50`
pub fn format_currency(value: f64) -> String {
    let cents_total = (value.abs() * 100.0).round() as u64;
    let dollars = group_thousands(cents_total / 100);
    let cents = cents_total % 100;
    if value < 0.0 && cents_total > 0 {
        format!("-${dollars}.{cents:02}")
    } else {
        format!("${dollars}.{cents:02}")
    }
}

/// Compact number for derivation lines: integers without decimals, other
/// values trimmed to at most six decimals
pub fn format_compact(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{value:.0}");
    }
    let text = format!("{value:.6}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
