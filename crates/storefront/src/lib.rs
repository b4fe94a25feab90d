//! `SessionCart` storefront library.
//!
//! Session-scoped shopping cart: the cart service, its `PostgreSQL` and
//! in-memory stores, and the axum handlers that expose it. The binary in
//! `main.rs` wires these together; tests drive [`app`] directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Build the application router with all routes and state.
///
/// Session, tracing and Sentry layers are added by the caller.
pub fn app(state: AppState) -> Router {
    routes::routes().with_state(state)
}
