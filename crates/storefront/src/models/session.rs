//! Session-related types.

/// Session keys for cart data.
pub mod keys {
    /// Key for storing the visitor's cart identifier.
    pub const CART_ID: &str = "cart_id";
}
