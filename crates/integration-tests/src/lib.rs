//! Integration tests for `SessionCart`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sessioncart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_service` - Cart operations against the in-memory stores
//! - `cart_routes` - HTTP handlers driven through the router with an
//!   in-memory session store
//!
//! Neither needs a database; the `PostgreSQL` stores share the same port
//! traits as the in-memory ones.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use rust_decimal::Decimal;
use tower_sessions::MemoryStore;

use sessioncart_core::{Price, ProductId, Slug};
use sessioncart_storefront::middleware::session_layer;
use sessioncart_storefront::models::Product;
use sessioncart_storefront::services::cart::{CartService, MemoryCartItemStore, MemoryCatalog};
use sessioncart_storefront::state::AppState;

/// Build a catalog product.
///
/// # Panics
///
/// Panics if `slug` is not a valid slug.
#[must_use]
pub fn product(id: i32, slug: &str, name: &str, price: Decimal) -> Product {
    Product {
        id: ProductId::new(id),
        slug: Slug::parse(slug).expect("valid test slug"),
        name: name.to_string(),
        price: Price::new(price),
    }
}

/// Catalog used by every test: a hat at 10.00, a scarf at 5.50 and gloves
/// at 3.25.
#[must_use]
pub fn catalog() -> MemoryCatalog {
    MemoryCatalog::with_products([
        product(1, "hat", "Hat", Decimal::new(1000, 2)),
        product(2, "scarf", "Scarf", Decimal::new(550, 2)),
        product(3, "gloves", "Gloves", Decimal::new(325, 2)),
    ])
}

/// A cart service over fresh in-memory stores.
///
/// The item store is returned too so tests can inspect every cart at once.
#[must_use]
pub fn cart_service() -> (CartService, MemoryCartItemStore) {
    let (service, _, items) = cart_service_with_catalog();
    (service, items)
}

/// Like [`cart_service`], also returning the catalog so tests can change
/// products after they are in a cart.
#[must_use]
pub fn cart_service_with_catalog() -> (CartService, MemoryCatalog, MemoryCartItemStore) {
    let catalog = catalog();
    let items = MemoryCartItemStore::new(catalog.clone());
    let service = CartService::new(Arc::new(catalog.clone()), Arc::new(items.clone()));
    (service, catalog, items)
}

/// The full router with an in-memory session store.
#[must_use]
pub fn test_app() -> Router {
    let (service, _) = cart_service();
    sessioncart_storefront::app(AppState::new(service)).layer(session_layer(
        MemoryStore::default(),
        false,
        Duration::from_secs(60 * 60),
    ))
}
