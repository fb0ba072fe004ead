//! Input validation shared by request bodies.

use rust_decimal::Decimal;
use thiserror::Error;

use giftmart_core::Rate;

/// Largest value a `NUMERIC(12, 2)` column holds.
const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// A request body or query failed validation. The message is shown to the
/// client as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Trimmed, non-empty text.
///
/// # Errors
///
/// Returns `"<field> is required"` for missing or blank input.
pub fn required(field: &str, value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError(format!("{field} is required"))),
    }
}

/// Trimmed text, `None` when blank.
#[must_use]
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// A percentage in `0..=100`.
///
/// # Errors
///
/// Returns a message naming `field` when out of range.
pub fn rate(field: &str, value: Decimal) -> Result<Rate, ValidationError> {
    Rate::new(value).map_err(|_| ValidationError(format!("{field} must be between 0 and 100")))
}

/// A money amount that may be zero.
///
/// # Errors
///
/// Returns a message naming `field` when negative or not representable in
/// paise.
pub fn non_negative(field: &str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError(format!("{field} cannot be negative")));
    }
    money(field, value)
}

/// A money amount that must be above zero.
///
/// # Errors
///
/// Returns a message naming `field` when zero, negative or not representable
/// in paise.
pub fn positive(field: &str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError(format!("{field} must be greater than 0")));
    }
    money(field, value)
}

/// A 24-hour `HH:MM` clock time.
///
/// # Errors
///
/// Returns `"<field> must be HH:MM"` otherwise.
pub fn clock_time(field: &str, value: &str) -> Result<(), ValidationError> {
    let valid = |part: &str, max: u8| part.len() == 2 && part.parse::<u8>().is_ok_and(|n| n <= max);
    match value.split_once(':') {
        Some((h, m)) if valid(h, 23) && valid(m, 59) => Ok(()),
        _ => Err(ValidationError(format!("{field} must be HH:MM"))),
    }
}

/// Amounts must fit `NUMERIC(12, 2)` exactly: at most two decimal places and
/// ten integer digits.
fn money(field: &str, value: Decimal) -> Result<Decimal, ValidationError> {
    let value = value.normalize();
    if value.scale() > 2 {
        return Err(ValidationError(format!(
            "{field} cannot have more than 2 decimal places"
        )));
    }
    if value.abs() > MAX_AMOUNT {
        return Err(ValidationError(format!("{field} is too large")));
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("name", Some("  Roses ")), Ok("Roses".to_string()));
        assert_eq!(
            required("name", Some("   ")),
            Err(ValidationError::new("name is required"))
        );
        assert!(required("name", None).is_err());
    }

    #[test]
    fn test_optional_drops_blank() {
        assert_eq!(optional(Some(" ")), None);
        assert_eq!(optional(Some(" x ")), Some("x".to_string()));
    }

    #[test]
    fn test_amount_checks() {
        assert!(non_negative("price", Decimal::ZERO).is_ok());
        assert!(non_negative("price", Decimal::NEGATIVE_ONE).is_err());
        assert!(positive("amount", Decimal::ZERO).is_err());
        assert!(positive("amount", Decimal::ONE).is_ok());
        assert!(rate("commissionRate", Decimal::ONE_HUNDRED).is_ok());
        assert!(rate("commissionRate", Decimal::from(101)).is_err());
    }

    #[test]
    fn test_clock_time() {
        assert!(clock_time("time", "02:00").is_ok());
        assert!(clock_time("time", "23:59").is_ok());
        assert_eq!(
            clock_time("time", "24:00"),
            Err(ValidationError::new("time must be HH:MM"))
        );
        assert!(clock_time("time", "2:00").is_err());
        assert!(clock_time("time", "0200").is_err());
    }

    #[test]
    fn test_amounts_below_one_paisa_rejected() {
        let tiny: Decimal = "0.004".parse().unwrap();
        assert_eq!(
            positive("amount", tiny),
            Err(ValidationError::new("amount cannot have more than 2 decimal places"))
        );
        assert!(non_negative("minOrderAmount", "10.005".parse().unwrap()).is_err());
        assert!(non_negative("price", "0.001".parse().unwrap()).is_err());
    }

    #[test]
    fn test_trailing_zeros_are_not_extra_precision() {
        let amount = positive("amount", "125.5000".parse().unwrap()).unwrap();
        assert_eq!(amount, "125.50".parse::<Decimal>().unwrap());
        assert!(non_negative("codLimit", "0.000".parse().unwrap()).is_ok());
    }

    #[test]
    fn test_amount_upper_bound() {
        let largest: Decimal = "9999999999.99".parse().unwrap();
        assert_eq!(MAX_AMOUNT, largest);
        assert!(positive("amount", largest).is_ok());
        assert!(positive("amount", "10000000000".parse().unwrap()).is_err());
    }
}
