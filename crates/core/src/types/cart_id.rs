//! Opaque per-session cart identifier.

use core::fmt;

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Characters a generated cart identifier is drawn from (72 symbols).
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz1234567890!@#$%^&*()";

/// Errors that can occur when parsing a [`CartId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartIdError {
    /// The input string is empty.
    #[error("cart id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("cart id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// Identifier naming one visitor's cart.
///
/// Stored in the visitor's session and on every cart item row. Generated
/// identifiers are [`CartId::LENGTH`] characters drawn from a thread-local
/// CSPRNG, roughly 308 bits of entropy.
///
/// ## Examples
///
/// ```
/// use sessioncart_core::CartId;
///
/// let id = CartId::generate();
/// assert_eq!(id.as_str().len(), CartId::LENGTH);
///
/// assert!(CartId::parse("").is_err());
/// assert!(CartId::parse("abc").is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct CartId(String);

impl CartId {
    /// Length of a generated identifier, and the maximum accepted length.
    pub const LENGTH: usize = 50;

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let id = (0..Self::LENGTH)
            .filter_map(|_| ALPHABET.choose(&mut rng))
            .map(|&b| char::from(b))
            .collect();
        Self(id)
    }

    /// Parse a `CartId` read back from a session or the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or longer than
    /// [`CartId::LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, CartIdError> {
        if s.is_empty() {
            return Err(CartIdError::Empty);
        }

        if s.chars().count() > Self::LENGTH {
            return Err(CartIdError::TooLong { max: Self::LENGTH });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if every character belongs to the generation alphabet.
    #[must_use]
    pub fn is_generated_form(&self) -> bool {
        self.0.len() == Self::LENGTH && self.0.bytes().all(|b| ALPHABET.contains(&b))
    }
}

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CartId {
    type Error = CartIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CartId> for String {
    fn from(id: CartId) -> Self {
        id.0
    }
}

impl std::str::FromStr for CartId {
    type Err = CartIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CartId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CartId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CartId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CartId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_size() {
        assert_eq!(ALPHABET.len(), 72);
    }

    #[test]
    fn test_generate_length_and_alphabet() {
        let id = CartId::generate();
        assert_eq!(id.as_str().len(), CartId::LENGTH);
        assert!(id.as_str().bytes().all(|b| ALPHABET.contains(&b)));
        assert!(id.is_generated_form());
    }

    #[test]
    fn test_generate_is_random() {
        assert_ne!(CartId::generate(), CartId::generate());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(CartId::parse(""), Err(CartIdError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(CartId::LENGTH + 1);
        assert_eq!(
            CartId::parse(&long),
            Err(CartIdError::TooLong { max: CartId::LENGTH })
        );
    }

    #[test]
    fn test_parse_short_value_is_not_generated_form() {
        let id = CartId::parse("legacy").unwrap();
        assert_eq!(id.as_str(), "legacy");
        assert!(!id.is_generated_form());
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        assert!(serde_json::from_str::<CartId>("\"\"").is_err());

        let id: CartId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id.as_str(), "abc");
    }
}
