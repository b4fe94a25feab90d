//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Session-scoped cart operations over a product catalog and a
//!   cart item store

pub mod cart;
