//! Amount rounding and display helpers.
//!
//! Amounts are f64 in x1k units. Rounding goes through the decimal string
//! form so that ties resolve on the exact binary value (half-to-even), the
//! same way a spreadsheet or `printf("%.1f")` would show them.

/// Round to `dp` decimal places.
pub fn round_dp(value: f64, dp: usize) -> f64 {
    format!("{:.*}", dp, value).parse().unwrap_or(value)
}

/// Round to the ledger's single decimal of precision.
pub fn round1(value: f64) -> f64 {
    round_dp(value, 1)
}

/// Shortest display form that always carries a fractional part (`4.0`, `78.9`).
pub fn format_amount(value: f64) -> String {
    let s = value.to_string();
    if value.is_finite() && !s.contains('.') {
        format!("{s}.0")
    } else {
        s
    }
}

/// Percentage string: two decimals, trailing zeros and dot trimmed, `%` suffix.
pub fn format_percent(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    format!("{s}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round1() {
        assert_eq!(round1(78.6 + 0.3), 78.9);
        assert_eq!(round1(0.1 + 0.2), 0.3);
        assert_eq!(round1(4.0), 4.0);
        // 0.25 is exact in binary; ties go to even
        assert_eq!(round1(0.25), 0.2);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(4.0), "4.0");
        assert_eq!(format_amount(78.9), "78.9");
        assert_eq!(format_amount(0.3), "0.3");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(100.0), "100%");
        assert_eq!(format_percent(99.2761), "99.28%");
        assert_eq!(format_percent(0.7238), "0.72%");
        assert_eq!(format_percent(12.5), "12.5%");
        assert_eq!(format_percent(0.0), "0%");
    }
}
