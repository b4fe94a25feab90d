//! Cart error types.

use thiserror::Error;

use sessioncart_core::{CartItemId, QuantityError};

use crate::db::RepositoryError;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No product has the requested slug.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// The item does not exist or belongs to another cart.
    #[error("cart item not found: {0}")]
    ItemNotFound(CartItemId),

    /// Quantity input could not be used.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl CartError {
    /// Returns true for the not-found kinds.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ProductNotFound(_) | Self::ItemNotFound(_))
    }

    /// Returns true when the caller's input was unusable.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidQuantity(_))
    }
}

impl From<RepositoryError> for CartError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::InvalidQuantity(e) => Self::InvalidQuantity(e),
            other => Self::Repository(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(CartError::ProductNotFound("hat".to_string()).is_not_found());
        assert!(CartError::ItemNotFound(CartItemId::new(1)).is_not_found());
        assert!(CartError::InvalidQuantity(QuantityError::NotPositive).is_invalid_input());
        assert!(!CartError::Repository(RepositoryError::NotFound).is_not_found());
    }

    #[test]
    fn test_repository_quantity_overflow_is_invalid_input() {
        let err = CartError::from(RepositoryError::InvalidQuantity(QuantityError::TooLarge {
            max: 10,
        }));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_display() {
        let err = CartError::ItemNotFound(CartItemId::new(9));
        assert_eq!(err.to_string(), "cart item not found: 9");
    }
}
