//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are exact `rust_decimal::Decimal` amounts in the store's single
//! currency, so summing many line totals never drifts the way `f64` does.

use core::fmt;
use core::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Quantity;

/// A unit price in the store currency's standard unit (e.g. dollars, not cents).
///
/// Serializes as a string with two decimal places (`"25.50"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Number of fractional digits prices are displayed with.
    pub const SCALE: u32 = 2;

    /// The zero amount, at display scale.
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, Self::SCALE));

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: Quantity) -> Self {
        Self(self.0 * Decimal::from(quantity.get()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut amount = self.0.round_dp(Self::SCALE);
        amount.rescale(Self::SCALE);
        write!(f, "{amount}")
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.to_string()
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, price| Self(acc.0 + price.0))
    }
}

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
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
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
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_times() {
        let price = Price::new(dec!(5.50));
        let quantity = Quantity::new(3).unwrap();
        assert_eq!(price.times(quantity).amount(), dec!(16.50));
    }

    #[test]
    fn test_sum_is_exact() {
        let total: Price = std::iter::repeat_n(Price::new(dec!(0.10)), 30).sum();
        assert_eq!(total.amount(), dec!(3.00));
    }

    #[test]
    fn test_empty_sum_is_zero() {
        let total: Price = std::iter::empty().sum();
        assert_eq!(total, Price::ZERO);
        assert_eq!(total.to_string(), "0.00");
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::new(dec!(25.5)).to_string(), "25.50");
        assert_eq!(Price::new(dec!(10)).to_string(), "10.00");
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Price::new(dec!(25.5))).unwrap();
        assert_eq!(json, "\"25.50\"");

        let parsed: Price = serde_json::from_str("\"5.50\"").unwrap();
        assert_eq!(parsed.amount(), dec!(5.50));
    }
}
