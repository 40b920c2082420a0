//! Lossy number rendering used for the display buffer and history lines.

const MAX_FRACTION_DIGITS: usize = 10;

/// Renders `value` for display.
///
/// Integral values have no decimal point. Other values are rounded to ten
/// fractional digits and then stripped of trailing zeros and of a trailing
/// lone point. Non-finite values fall back to their default text.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 {
        return format!("{value}");
    }

    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}
