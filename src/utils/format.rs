//! Significant-digit float formatting.
//!
//! Growth values are printed with a fixed number of significant digits in
//! the shortest notation that preserves them: plain fixed-point notation for
//! magnitudes between 1e-4 and 10^digits, scientific notation outside that
//! window. Insignificant trailing zeros are dropped, but a fixed-point
//! result that would look like an integer gets a trailing `.0` so the value
//! still reads as a size measurement rather than a count.

/// Format `value` with `digits` significant digits.
///
/// Values of at least 10^digits (or smaller than 1e-4) switch to scientific
/// notation with a sign and at least two exponent digits (`1.5e+03`), the
/// mantissa stripped of insignificant trailing zeros. Fixed-point results
/// keep at least one digit after the decimal point (`5.0`, not `5`).
///
/// A `digits` of zero is treated as one significant digit. Non-finite
/// values render as `inf`, `-inf`, and `nan`.
#[must_use]
pub fn format_sig(value: f64, digits: usize) -> String {
    let digits = digits.max(1);

    if !value.is_finite() {
        return if value.is_nan() {
            "nan".to_string()
        } else if value.is_sign_negative() {
            "-inf".to_string()
        } else {
            "inf".to_string()
        };
    }

    // The exponent has to come from the already-rounded rendering: 99.95
    // rounds up to 1.0e2, which must print as scientific, not as "100.0".
    let rendered = format!("{value:.prec$e}", prec = digits - 1);
    let (mantissa, exponent) = split_scientific(&rendered);
    let max_fixed_exponent = i32::try_from(digits).unwrap_or(i32::MAX);

    if (-4..max_fixed_exponent).contains(&exponent) {
        format_fixed(value, max_fixed_exponent - 1 - exponent)
    } else {
        format_scientific(mantissa, exponent)
    }
}

/// Split Rust's `{:e}` rendering into mantissa and exponent.
fn split_scientific(rendered: &str) -> (&str, i32) {
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse().unwrap_or(0)),
        None => (rendered, 0),
    }
}

/// Fixed-point rendering with trailing zeros stripped and `.0` restored.
fn format_fixed(value: f64, precision: i32) -> String {
    let precision = usize::try_from(precision).unwrap_or(0);
    let mut out = format!("{value:.precision$}");

    if out.contains('.') {
        while out.ends_with('0') {
            out.pop();
        }
        if out.ends_with('.') {
            out.pop();
        }
    }

    if !out.contains('.') {
        out.push_str(".0");
    }

    out
}

/// Scientific rendering with a signed, zero-padded exponent.
fn format_scientific(mantissa: &str, exponent: i32) -> String {
    let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
    let sign = if exponent < 0 { '-' } else { '+' };

    format!("{mantissa}e{sign}{abs:02}", abs = exponent.abs())
}
