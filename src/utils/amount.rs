//! Fiat amount input validation.

/// Accept empty input (the amount is optional) or a non-negative,
/// finite decimal number. Anything else is rejected so the field can
/// simply refuse to take the keystroke.
pub fn is_valid_fiat_amount(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    match value.parse::<f64>() {
        Ok(n) => n.is_finite() && n >= 0.0,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_empty_and_decimals() {
        assert!(is_valid_fiat_amount(""));
        assert!(is_valid_fiat_amount("0"));
        assert!(is_valid_fiat_amount("12.50"));
        assert!(is_valid_fiat_amount("100"));
    }

    #[test]
    fn rejects_negative_and_garbage() {
        assert!(!is_valid_fiat_amount("-1"));
        assert!(!is_valid_fiat_amount("-0.01"));
        assert!(!is_valid_fiat_amount("abc"));
        assert!(!is_valid_fiat_amount("1.2.3"));
        assert!(!is_valid_fiat_amount("12,50"));
        assert!(!is_valid_fiat_amount("NaN"));
        assert!(!is_valid_fiat_amount("inf"));
    }
}
