//! Decimal money amounts and discount rates.
//!
//! Both types wrap [`rust_decimal::Decimal`] so arithmetic stays exact, and
//! both serialize as plain JSON numbers (`99.99`, `0.1`) for API clients.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative amount of money in the store's single currency.
///
/// Used for unit prices as well as order subtotals, discounts, and totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount < Decimal::ZERO {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// This price multiplied by a line quantity, or `None` if the product
    /// does not fit in a [`Decimal`].
    #[must_use]
    pub fn checked_times(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Sum of two amounts, or `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Sum of two amounts, clamping at the largest representable value.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// The share of this amount taken by `rate`.
    ///
    /// A rate never exceeds one, so the result is at most `self`.
    #[must_use]
    pub fn portion(self, rate: DiscountRate) -> Self {
        Self(self.0.checked_mul(rate.as_decimal()).unwrap_or(self.0))
    }

    /// Subtract `other`, clamping at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - other.0)
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when constructing a [`DiscountRate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscountRateError {
    /// The rate is not between 0 and 1.
    #[error("discount rate must be between 0 and 1 (got {0})")]
    OutOfRange(Decimal),
    /// The input could not be parsed as a decimal.
    #[error("discount rate is not a number: {0}")]
    Parse(String),
}

/// A discount expressed as a fraction of the subtotal (`0.10` = 10% off).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiscountRate(Decimal);

impl DiscountRate {
    /// Create a rate, requiring `0 <= rate <= 1`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountRateError::OutOfRange`] outside that interval.
    pub fn new(rate: Decimal) -> Result<Self, DiscountRateError> {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(DiscountRateError::OutOfRange(rate));
        }
        Ok(Self(rate))
    }

    /// The rate as a decimal fraction.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        Self(Decimal::new(10, 2))
    }
}

impl FromStr for DiscountRate {
    type Err = DiscountRateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rate = Decimal::from_str(s.trim())
            .map_err(|e| DiscountRateError::Parse(e.to_string()))?;
        Self::new(rate)
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0 * Decimal::ONE_HUNDRED)
    }
}

impl Serialize for DiscountRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_price_rejects_negative() {
        assert!(matches!(
            Price::new(dec("-0.01")),
            Err(PriceError::Negative(_))
        ));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_price_arithmetic_is_exact() {
        let unit = Price::new(dec("19.99")).unwrap();
        let line = unit.checked_times(3).unwrap();
        assert_eq!(line.amount(), dec("59.97"));

        let rate = DiscountRate::new(dec("0.10")).unwrap();
        assert_eq!(line.portion(rate).amount(), dec("5.997"));
    }

    #[test]
    fn test_price_overflow_is_reported_not_panicked() {
        let huge = Price::new(dec("100000000000000000000")).unwrap();
        assert_eq!(huge.checked_times(u32::MAX), None);
        assert!(huge.checked_times(2).is_some());

        let max = Price::new(Decimal::MAX).unwrap();
        assert_eq!(max.checked_add(huge), None);
        assert_eq!(max.saturating_add(huge), max);
        assert!(max.portion(DiscountRate::default()) < max);
    }

    #[test]
    fn test_price_saturating_sub_clamps_at_zero() {
        let small = Price::new(dec("5")).unwrap();
        let large = Price::new(dec("8")).unwrap();
        assert_eq!(small.saturating_sub(large), Price::ZERO);
        assert_eq!(large.saturating_sub(small).amount(), dec("3"));
    }

    #[test]
    fn test_price_json_is_a_number() {
        let price: Price = serde_json::from_str("99.99").unwrap();
        assert_eq!(price.amount(), dec("99.99"));
        assert_eq!(serde_json::to_string(&price).unwrap(), "99.99");

        let whole: Price = serde_json::from_str("120").unwrap();
        assert_eq!(whole.amount(), dec("120"));

        assert!(serde_json::from_str::<Price>("-1").is_err());
    }

    #[test]
    fn test_discount_rate_bounds() {
        assert!(DiscountRate::new(dec("1.01")).is_err());
        assert!(DiscountRate::new(dec("-0.5")).is_err());
        assert!(DiscountRate::new(Decimal::ONE).is_ok());
        assert_eq!(DiscountRate::default().as_decimal(), dec("0.10"));
    }

    #[test]
    fn test_discount_rate_from_str() {
        let rate: DiscountRate = " 0.25 ".parse().unwrap();
        assert_eq!(rate.as_decimal(), dec("0.25"));
        assert_eq!(rate.to_string(), "25.00%");
        assert!(matches!(
            "ten".parse::<DiscountRate>(),
            Err(DiscountRateError::Parse(_))
        ));
    }
}
