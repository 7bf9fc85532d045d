//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are never floating point. Line totals are computed with
//! [`Price::line_total`] and order totals by summing line totals, so
//! `10.00 * 2 + 5.00` is exactly `25.00`.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::quantity::Quantity;

/// Number of fractional digits used when a price is created from scratch.
const CURRENCY_SCALE: u32 = 2;

/// A monetary amount in the store currency.
///
/// ```
/// use bookstore_core::{Price, Quantity};
/// use rust_decimal::Decimal;
///
/// let unit = Price::new(Decimal::new(1000, 2));
/// let line = unit.line_total(Quantity::new(2).unwrap());
/// assert_eq!(line.amount(), Decimal::new(2000, 2));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// A zero amount carrying the currency scale (`0.00`).
    #[must_use]
    pub fn zero() -> Self {
        Self(Decimal::new(0, CURRENCY_SCALE))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn line_total(self, quantity: Quantity) -> Self {
        Self(self.0 * Decimal::from(quantity.get()))
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Self> for Price {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(Self(<Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(s: &str) -> Price {
        Price::new(s.parse().unwrap())
    }

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    #[test]
    fn test_line_total_is_exact() {
        assert_eq!(price("10.00").line_total(qty(2)), price("20.00"));
        assert_eq!(price("0.10").line_total(qty(3)), price("0.30"));
        assert_eq!(price("19.99").line_total(qty(7)), price("139.93"));
    }

    #[test]
    fn test_sum_of_lines() {
        let total: Price = [price("20.00"), price("5.00")].into_iter().sum();
        assert_eq!(total, price("25.00"));
        assert_eq!(total.to_string(), "25.00");
    }

    #[test]
    fn test_empty_sum_is_zero_with_scale() {
        let total: Price = Vec::<Price>::new().into_iter().sum();
        assert_eq!(total, Price::zero());
        assert_eq!(total.to_string(), "0.00");
    }

    #[test]
    fn test_no_float_drift() {
        // 0.1 + 0.2 in f64 is 0.30000000000000004
        let total: Price = [price("0.1"), price("0.2")].iter().sum();
        assert_eq!(total, price("0.3"));
    }

    #[test]
    fn test_is_negative() {
        assert!(price("-0.01").is_negative());
        assert!(!Price::zero().is_negative());
        assert!(!price("3.50").is_negative());
    }
}
