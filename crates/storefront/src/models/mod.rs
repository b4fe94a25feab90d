//! Domain models for the cart.

pub mod cart;
pub mod session;

pub use cart::{CartItem, CartSummary, Product};
pub use session::keys as session_keys;
