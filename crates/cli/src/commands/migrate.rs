//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! cart-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CART_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! Applies the migrations in `crates/storefront/migrations/` (products and
//! cart items) and creates the tower-sessions table.

use tower_sessions_sqlx_store::PostgresStore;

use sessioncart_storefront::db;

use super::{CommandError, database_url};

/// Run all cart database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails or a
/// migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to cart database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running cart migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
