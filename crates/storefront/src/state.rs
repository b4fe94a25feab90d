//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::CatalogCacheConfig;
use crate::db::{CartItemRepository, ProductRepository};
use crate::services::cart::{CachedCatalog, CartService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cart: CartService,
}

impl AppState {
    /// Create a new application state around a cart service.
    #[must_use]
    pub fn new(cart: CartService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cart }),
        }
    }

    /// Create application state backed by `PostgreSQL`.
    ///
    /// Product lookups go through a cache configured by `cache`.
    #[must_use]
    pub fn with_pool(pool: PgPool, cache: CatalogCacheConfig) -> Self {
        let products = Arc::new(ProductRepository::new(pool.clone()));
        let catalog = CachedCatalog::new(products, cache.ttl, cache.capacity);
        let items = CartItemRepository::new(pool);

        Self::new(CartService::new(Arc::new(catalog), Arc::new(items)))
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }
}
