//! Decimal money helpers.
//!
//! Amounts are `rust_decimal::Decimal` in rupees with two decimal places.
//! Rounding is always half away from zero so commission lines add up the
//! way sellers check them by hand.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency symbol used in generated messages.
pub const RUPEE_SYMBOL: &str = "₹";

/// Round an amount to paise.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `part / whole × 100` to two decimals, or zero when `whole` is zero.
#[must_use]
pub fn percentage(part: i64, whole: i64) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    round_money(Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole))
}

/// Format an amount for human-facing text, e.g. `₹1499.00`.
#[must_use]
pub fn format_rupees(amount: Decimal) -> String {
    format!("{RUPEE_SYMBOL}{:.2}", round_money(amount))
}

/// Rejected percentage input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("percentage must be between 0 and 100 (got {0})")]
pub struct RateOutOfRange(pub Decimal);

/// A percentage in `0..=100`, used for commission and tax rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Rate(Decimal);

impl Rate {
    /// Commission charged when nothing more specific is configured.
    pub const DEFAULT_COMMISSION: Self = Self(Decimal::TEN);

    /// Validate a percentage.
    ///
    /// # Errors
    ///
    /// Returns [`RateOutOfRange`] for negative values or values above 100.
    pub fn new(value: Decimal) -> Result<Self, RateOutOfRange> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(RateOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// The raw percentage.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// This rate applied to `amount`, rounded to paise.
    #[must_use]
    pub fn of(self, amount: Decimal) -> Decimal {
        round_money(amount * self.0 / Decimal::ONE_HUNDRED)
    }
}

impl TryFrom<Decimal> for Rate {
    type Error = RateOutOfRange;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rate> for Decimal {
    fn from(rate: Rate) -> Self {
        rate.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_rate_bounds() {
        assert!(Rate::new(d("0")).is_ok());
        assert!(Rate::new(d("100")).is_ok());
        assert!(Rate::new(d("-0.01")).is_err());
        assert!(Rate::new(d("100.5")).is_err());
    }

    #[test]
    fn test_rate_of_rounds_half_away_from_zero() {
        let rate = Rate::new(d("12.5")).unwrap();
        // 12.5% of 10.10 = 1.2625 -> 1.26
        assert_eq!(rate.of(d("10.10")), d("1.26"));
        // 10% of 0.25 = 0.025 -> 0.03
        assert_eq!(Rate::new(d("10")).unwrap().of(d("0.25")), d("0.03"));
    }

    #[test]
    fn test_percentage_handles_zero_denominator() {
        assert_eq!(percentage(3, 0), Decimal::ZERO);
        assert_eq!(percentage(1, 3), d("33.33"));
        assert_eq!(percentage(2, 3), d("66.67"));
    }

    #[test]
    fn test_format_rupees() {
        assert_eq!(format_rupees(d("1499")), "₹1499.00");
        assert_eq!(format_rupees(d("12.345")), "₹12.35");
    }

    #[test]
    fn test_rate_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rate>("\"150\"").is_err());
        assert_eq!(
            serde_json::from_str::<Rate>("\"7.5\"").unwrap().value(),
            d("7.5")
        );
    }
}
