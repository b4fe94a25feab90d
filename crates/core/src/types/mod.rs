//! Core types for SessionCart.
//!
//! This module provides type-safe wrappers for cart domain concepts.

pub mod cart_id;
pub mod id;
pub mod price;
pub mod quantity;
pub mod slug;

pub use cart_id::{CartId, CartIdError};
pub use id::*;
pub use price::Price;
pub use quantity::{Quantity, QuantityChange, QuantityError};
pub use slug::{Slug, SlugError};
