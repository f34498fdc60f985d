//! Locale-invariant float formatting/parsing for the XML codec.
//!
//! Per the XISF 1.0 specification's external interfaces section, `Float32`
//! is emitted with 9 significant digits, `Float64` with 17; decimal
//! separator is always `.` regardless of locale.
//! Parsing relies on Rust's `f32`/`f64::from_str`, which is already
//! locale-invariant (always expects `.`).

/// Render `value` with `sig_digits` significant decimal digits, `%g`-style:
/// fixed notation for "ordinary" magnitudes, scientific notation for very
/// large or very small ones, trailing zeros trimmed.
pub fn format_significant(value: f64, sig_digits: usize) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() { "-0".to_string() } else { "0".to_string() };
    }
    if !value.is_finite() {
        return if value.is_nan() {
            "nan".to_string()
        } else if value > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        };
    }

    let exponent = value.abs().log10().floor() as i32;

    // %g switches to scientific notation outside [-4, sig_digits).
    if exponent < -4 || exponent >= sig_digits as i32 {
        let mantissa_digits = sig_digits.saturating_sub(1);
        let formatted = format!("{value:.mantissa_digits$e}");
        return normalize_exponential(&formatted);
    }

    let decimals = (sig_digits as i32 - 1 - exponent).max(0) as usize;
    let formatted = format!("{value:.decimals$}");
    trim_trailing_zeros(&formatted)
}

fn trim_trailing_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    let trimmed = s.trim_end_matches('0');
    let trimmed = trimmed.trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Rust's `{:e}` renders as `<mantissa>e<exp>`; trim the mantissa's trailing
/// zeros and normalize to `e+NN`/`e-NN` (at least two exponent digits is not
/// required by XISF, but a sign is).
fn normalize_exponential(s: &str) -> String {
    let (mantissa, exp) = s.split_once('e').expect("format!(\"{:e}\") always contains 'e'");
    let mantissa = trim_trailing_zeros(mantissa);
    let exp: i32 = exp.parse().unwrap_or(0);
    format!("{mantissa}e{}{}", if exp >= 0 { "+" } else { "-" }, exp.abs())
}
