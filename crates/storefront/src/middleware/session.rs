//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The visitor's
//! cart lives exactly as long as their session.

use std::time::Duration;

use sqlx::PgPool;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::CartServerConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sc_session";

/// Create the session layer with `PostgreSQL` store.
///
/// The sessions table is created by `cart-cli migrate`.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &CartServerConfig,
) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone());
    session_layer(store, config.is_secure(), config.session_expiry)
}

/// Create a session layer over any store.
///
/// Cookies are `HttpOnly` and `SameSite=Lax`; `secure` should be set when the
/// site is served over HTTPS.
#[must_use]
pub fn session_layer<S>(store: S, secure: bool, expiry: Duration) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    let expiry_secs = i64::try_from(expiry.as_secs()).unwrap_or(i64::MAX);

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(expiry_secs),
        ))
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
