//! Line-item quantities parsed from loosely-typed form input.

use core::fmt;
use core::num::{IntErrorKind, NonZeroU32};

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Quantity`] or [`QuantityChange`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The input is not an integer.
    #[error("quantity must be a whole number, got {0:?}")]
    NotANumber(String),
    /// The input is zero or negative where a positive quantity is required.
    #[error("quantity must be at least 1")]
    NotPositive,
    /// The value exceeds [`Quantity::MAX`].
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Maximum allowed quantity.
        max: u32,
    },
}

/// A positive line-item quantity.
///
/// Bounded by [`Quantity::MAX`] so it always fits a Postgres `INTEGER`.
///
/// ## Examples
///
/// ```
/// use sessioncart_core::Quantity;
///
/// assert_eq!(Quantity::parse(" 3 ").map(Quantity::get), Ok(3));
/// assert!(Quantity::parse("0").is_err());
/// assert!(Quantity::parse("1.5").is_err());
/// assert_eq!(Quantity::parse_or_default(None), Ok(Quantity::ONE));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// Largest accepted quantity.
    #[allow(clippy::cast_sign_loss)]
    pub const MAX: u32 = i32::MAX as u32;

    /// A quantity of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity from an integer.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is zero or greater than [`Quantity::MAX`].
    pub fn new(value: u32) -> Result<Self, QuantityError> {
        if value > Self::MAX {
            return Err(QuantityError::TooLarge { max: Self::MAX });
        }
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(QuantityError::NotPositive)
    }

    /// Parse a positive quantity from form input.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not an integer, is zero or negative,
    /// or exceeds [`Quantity::MAX`].
    pub fn parse(s: &str) -> Result<Self, QuantityError> {
        match parse_integer(s)? {
            Integer::Value(value) if value <= 0 => Err(QuantityError::NotPositive),
            Integer::Value(value) => u32::try_from(value)
                .map_err(|_| QuantityError::TooLarge { max: Self::MAX })
                .and_then(Self::new),
            Integer::BelowRange => Err(QuantityError::NotPositive),
            Integer::AboveRange => Err(QuantityError::TooLarge { max: Self::MAX }),
        }
    }

    /// Parse an optional form field, treating a missing value as one.
    ///
    /// A present but blank value is malformed, not missing.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Quantity::parse`] for a present value.
    pub fn parse_or_default(s: Option<&str>) -> Result<Self, QuantityError> {
        s.map_or(Ok(Self::ONE), Self::parse)
    }

    /// Add two quantities, failing if the sum exceeds [`Quantity::MAX`].
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::TooLarge` on overflow.
    pub fn checked_add(self, other: Self) -> Result<Self, QuantityError> {
        self.get()
            .checked_add(other.get())
            .ok_or(QuantityError::TooLarge { max: Self::MAX })
            .and_then(Self::new)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Get the value as an `i32` for storage.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn as_i32(self) -> i32 {
        // Bounded by MAX, so the cast never wraps.
        self.0.get() as i32
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map_err(|_| QuantityError::NotPositive)
            .and_then(Self::new)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

impl std::str::FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The outcome of parsing a cart update's quantity field.
///
/// A positive value sets the line quantity. Zero or any negative value
/// removes the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Set the line quantity to this value.
    Set(Quantity),
    /// Remove the line from the cart.
    Remove,
}

impl QuantityChange {
    /// Parse an update quantity from form input.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotANumber` if the input is not an integer and
    /// `QuantityError::TooLarge` if it exceeds [`Quantity::MAX`].
    pub fn parse(s: &str) -> Result<Self, QuantityError> {
        match parse_integer(s)? {
            Integer::Value(value) if value <= 0 => Ok(Self::Remove),
            Integer::BelowRange => Ok(Self::Remove),
            Integer::Value(_) | Integer::AboveRange => Quantity::parse(s).map(Self::Set),
        }
    }
}

/// An integer parsed from form input, with out-of-range values kept apart
/// from malformed ones.
enum Integer {
    Value(i64),
    BelowRange,
    AboveRange,
}

fn parse_integer(s: &str) -> Result<Integer, QuantityError> {
    let trimmed = s.trim();
    match trimmed.parse::<i64>() {
        Ok(value) => Ok(Integer::Value(value)),
        Err(e) => match e.kind() {
            IntErrorKind::NegOverflow => Ok(Integer::BelowRange),
            IntErrorKind::PosOverflow => Ok(Integer::AboveRange),
            _ => Err(QuantityError::NotANumber(trimmed.to_owned())),
        },
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Quantity {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Quantity {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::try_from(raw)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Quantity {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_i32(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Quantity::parse("1").unwrap().get(), 1);
        assert_eq!(Quantity::parse(" 12 ").unwrap().get(), 12);
        assert_eq!(Quantity::parse("+4").unwrap().get(), 4);
    }

    #[test]
    fn test_parse_not_a_number() {
        assert_eq!(
            Quantity::parse("abc"),
            Err(QuantityError::NotANumber("abc".to_string()))
        );
        assert!(matches!(
            Quantity::parse("1.5"),
            Err(QuantityError::NotANumber(_))
        ));
        assert!(matches!(
            Quantity::parse(""),
            Err(QuantityError::NotANumber(_))
        ));
    }

    #[test]
    fn test_parse_not_positive() {
        assert_eq!(Quantity::parse("0"), Err(QuantityError::NotPositive));
        assert_eq!(Quantity::parse("-3"), Err(QuantityError::NotPositive));
    }

    #[test]
    fn test_parse_too_large() {
        assert_eq!(
            Quantity::parse("2147483648"),
            Err(QuantityError::TooLarge { max: Quantity::MAX })
        );
        assert_eq!(
            Quantity::parse("99999999999999999999999"),
            Err(QuantityError::TooLarge { max: Quantity::MAX })
        );
        assert_eq!(Quantity::parse("2147483647").unwrap().get(), Quantity::MAX);
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(Quantity::parse_or_default(None), Ok(Quantity::ONE));
        assert_eq!(
            Quantity::parse_or_default(Some("  ")),
            Err(QuantityError::NotANumber(String::new()))
        );
        assert!(Quantity::parse_or_default(Some("")).is_err());
        assert_eq!(Quantity::parse_or_default(Some("2")).unwrap().get(), 2);
        assert!(Quantity::parse_or_default(Some("x")).is_err());
    }

    #[test]
    fn test_checked_add() {
        let two = Quantity::new(2).unwrap();
        let three = Quantity::new(3).unwrap();
        assert_eq!(two.checked_add(three).unwrap().get(), 5);

        let max = Quantity::new(Quantity::MAX).unwrap();
        assert_eq!(
            max.checked_add(Quantity::ONE),
            Err(QuantityError::TooLarge { max: Quantity::MAX })
        );
    }

    #[test]
    fn test_change_parse() {
        assert_eq!(
            QuantityChange::parse("4"),
            Ok(QuantityChange::Set(Quantity::new(4).unwrap()))
        );
        assert_eq!(QuantityChange::parse("0"), Ok(QuantityChange::Remove));
        assert_eq!(QuantityChange::parse("-5"), Ok(QuantityChange::Remove));
        assert_eq!(
            QuantityChange::parse("-99999999999999999999999"),
            Ok(QuantityChange::Remove)
        );
        assert!(matches!(
            QuantityChange::parse("four"),
            Err(QuantityError::NotANumber(_))
        ));
        assert!(matches!(
            QuantityChange::parse("99999999999999999999999"),
            Err(QuantityError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_serde_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::to_string(&Quantity::ONE).unwrap(), "1");
    }
}
