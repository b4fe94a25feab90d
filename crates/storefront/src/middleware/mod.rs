//! HTTP middleware stack for the cart server.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Handlers reach the visitor's cart through the [`CartSession`] extractor.

pub mod cart_session;
pub mod request_id;
pub mod session;

pub use cart_session::CartSession;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_layer};
