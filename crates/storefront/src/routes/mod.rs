//! HTTP route handlers for the cart server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (cart store reachable)
//!
//! # Cart (form in, JSON out)
//! GET  /cart                   - Cart summary (items, count, quantity, subtotal)
//! GET  /cart/count             - Number of distinct items
//! GET  /cart/subtotal          - Subtotal
//! POST /cart/add               - Add to cart (returns the line, triggers cart-updated)
//! POST /cart/update            - Update quantity, <= 0 removes (returns summary)
//! POST /cart/remove            - Remove item (returns summary)
//! POST /cart/clear             - Remove all items (returns summary)
//! ```

pub mod cart;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/subtotal", get(cart::subtotal))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create all routes for the cart server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/cart", cart_routes())
}
