//! Cart session extractor.
//!
//! Bridges the tower-sessions `Session` and the explicit [`CartContext`] the
//! cart service works with.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::session_keys;
use crate::services::cart::CartContext;

/// The visitor's session together with their cart context.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(State(state): State<AppState>, mut cart: CartSession) -> Result<Response> {
///     let items = state.cart().list_items(cart.context()).await?;
///     cart.commit().await?;
///     Ok(Json(items).into_response())
/// }
/// ```
pub struct CartSession {
    session: Session,
    context: CartContext,
    stored: bool,
}

impl CartSession {
    /// Load the cart context stored in `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(session: Session) -> Result<Self, tower_sessions::session::Error> {
        let value: Option<String> = session.get(session_keys::CART_ID).await?;
        let context = CartContext::from_session_value(value.as_deref());
        Ok(Self {
            session,
            context,
            stored: false,
        })
    }

    /// The cart context to pass to cart operations.
    pub fn context(&mut self) -> &mut CartContext {
        &mut self.context
    }

    /// The cart context for an operation that writes items.
    ///
    /// The cart identifier is derived and stored in the session before it is
    /// handed out, so items are never written under an identifier the
    /// session does not hold.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn context_for_write(
        &mut self,
    ) -> Result<&mut CartContext, tower_sessions::session::Error> {
        self.context.derive_cart_id();
        self.commit().await?;
        Ok(&mut self.context)
    }

    /// Store a newly generated cart identifier in the session.
    ///
    /// Does nothing if the identifier already came from the session or has
    /// been stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn commit(&mut self) -> Result<(), tower_sessions::session::Error> {
        if self.stored || !self.context.is_generated() {
            return Ok(());
        }
        if let Some(cart_id) = self.context.cart_id() {
            self.session
                .insert(session_keys::CART_ID, cart_id.as_str())
                .await?;
            self.stored = true;
            tracing::debug!("new cart identifier stored in session");
        }
        Ok(())
    }
}

impl<S> FromRequestParts<S> for CartSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        Ok(Self::load(session).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use sessioncart_core::CartId;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_generated_id_is_committed() {
        let session = session();
        let mut cart = CartSession::load(session.clone()).await.unwrap();
        let cart_id = cart.context().derive_cart_id().clone();
        cart.commit().await.unwrap();

        let stored: Option<String> = session.get(session_keys::CART_ID).await.unwrap();
        assert_eq!(stored.as_deref(), Some(cart_id.as_str()));
    }

    #[tokio::test]
    async fn test_existing_id_is_reused() {
        let session = session();
        session
            .insert(session_keys::CART_ID, "existing-cart")
            .await
            .unwrap();

        let mut cart = CartSession::load(session).await.unwrap();
        assert_eq!(
            cart.context().derive_cart_id(),
            &CartId::parse("existing-cart").unwrap()
        );
        assert!(!cart.context().is_generated());
    }

    #[tokio::test]
    async fn test_untouched_context_writes_nothing() {
        let session = session();
        let mut cart = CartSession::load(session.clone()).await.unwrap();
        cart.commit().await.unwrap();

        let stored: Option<String> = session.get(session_keys::CART_ID).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_write_context_is_stored_before_use() {
        let session = session();
        let mut cart = CartSession::load(session.clone()).await.unwrap();
        let cart_id = cart.context_for_write().await.unwrap().derive_cart_id().clone();

        let stored: Option<String> = session.get(session_keys::CART_ID).await.unwrap();
        assert_eq!(stored.as_deref(), Some(cart_id.as_str()));
    }

    #[tokio::test]
    async fn test_write_context_keeps_existing_id() {
        let session = session();
        session
            .insert(session_keys::CART_ID, "existing-cart")
            .await
            .unwrap();

        let mut cart = CartSession::load(session.clone()).await.unwrap();
        let cart_id = cart.context_for_write().await.unwrap().derive_cart_id().clone();

        assert_eq!(cart_id.as_str(), "existing-cart");
        let stored: Option<String> = session.get(session_keys::CART_ID).await.unwrap();
        assert_eq!(stored.as_deref(), Some("existing-cart"));
    }
}
