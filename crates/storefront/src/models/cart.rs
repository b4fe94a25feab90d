//! Cart domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sessioncart_core::{CartId, CartItemId, Price, ProductId, Quantity, Slug};

/// A catalog product as seen by the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: Slug,
    pub name: String,
    pub price: Price,
}

/// One line in a cart.
///
/// The `cart_id` is the visitor's session token and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    #[serde(skip_serializing)]
    pub cart_id: CartId,
    pub product: Product,
    pub quantity: Quantity,
    pub date_added: DateTime<Utc>,
}

impl CartItem {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.product.price.times(self.quantity)
    }

    /// Product name shown for this line.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.product.name
    }
}

/// Snapshot of a cart for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub items: Vec<CartItem>,
    /// Number of distinct line items.
    pub count: usize,
    /// Sum of all line quantities.
    pub quantity: u64,
    pub subtotal: Price,
}

impl CartSummary {
    /// Build a summary from a list of line items.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let quantity = items.iter().map(|item| u64::from(item.quantity.get())).sum();
        let subtotal = items.iter().map(CartItem::total).sum();
        Self {
            count: items.len(),
            quantity,
            subtotal,
            items,
        }
    }

    /// Returns true if the cart has no line items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}
