//! CLI argument validators.
//!
//! Shared validation functions for CLI argument parsing.

fn parse_number(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !value.is_finite() {
        return Err(format!("'{s}' is not a finite number"));
    }

    Ok(value)
}

/// Parse a finite number.
pub fn parse_finite(s: &str) -> Result<f64, String> {
    parse_number(s)
}

/// Parse a duration in seconds that must be greater than zero.
pub fn parse_positive_secs(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if value <= 0.0 {
        return Err(format!("duration must be greater than 0, got {value}"));
    }
    Ok(value)
}

/// Parse a duration in seconds that may be zero.
pub fn parse_non_negative_secs(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if value < 0.0 {
        return Err(format!("duration must not be negative, got {value}"));
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_secs() {
        assert_eq!(parse_positive_secs("1.5").ok(), Some(1.5));
        assert!(parse_positive_secs("0").is_err());
        assert!(parse_positive_secs("-2").is_err());
        assert!(parse_positive_secs("abc").is_err());
    }

    #[test]
    fn test_parse_non_negative_secs() {
        assert_eq!(parse_non_negative_secs("0").ok(), Some(0.0));
        assert!(parse_non_negative_secs("-0.1").is_err());
    }

    #[test]
    fn test_parse_finite() {
        assert_eq!(parse_finite("-12.5").ok(), Some(-12.5));
        assert!(parse_finite("inf").is_err());
        assert!(parse_finite("NaN").is_err());
    }
}
