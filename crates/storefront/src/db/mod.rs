//! Database operations for the cart `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `storefront.product` - Catalog products (read-only to the cart)
//! - `storefront.cart_item` - Cart line items, unique per `(cart_id, product_id)`
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p sessioncart-cli -- migrate
//! ```

pub mod cart_items;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use sessioncart_core::QuantityError;

pub use cart_items::CartItemRepository;
pub use products::{NewProduct, ProductRepository};

/// `SQLSTATE` raised when an integer column overflows.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate slug).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A stored quantity would leave its valid range.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),
}

impl RepositoryError {
    /// Map a sqlx error, recognising quantity overflow.
    fn from_write(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE)
        {
            return Self::InvalidQuantity(QuantityError::TooLarge {
                max: sessioncart_core::Quantity::MAX,
            });
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
