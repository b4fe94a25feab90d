//! Collaborators the cart service depends on.
//!
//! Postgres implementations live in [`crate::db`]; in-memory ones in
//! [`super::memory`].

use async_trait::async_trait;

use sessioncart_core::{CartId, CartItemId, Quantity, Slug};

use crate::db::RepositoryError;
use crate::models::{CartItem, Product};

/// Read-only product lookup.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Find a product by slug.
    ///
    /// Returns `None` if no product has that slug.
    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError>;
}

/// Persistence for cart line items.
///
/// Implementations must keep at most one item per `(cart_id, product)`.
/// Items read back carry the product as it currently is in the catalog, not
/// as it was when added, so subtotals follow price changes.
#[async_trait]
pub trait CartItemStore: Send + Sync {
    /// All items in a cart, oldest first.
    async fn list_by_cart(&self, cart_id: &CartId) -> Result<Vec<CartItem>, RepositoryError>;

    /// Find an item by ID within a cart.
    ///
    /// Returns `None` if the item does not exist or belongs to another cart.
    async fn find(
        &self,
        id: CartItemId,
        cart_id: &CartId,
    ) -> Result<Option<CartItem>, RepositoryError>;

    /// Create an item for `product`, or add `quantity` to the existing one.
    ///
    /// Must be atomic: concurrent calls for the same product and cart end
    /// with a single item carrying the summed quantity.
    ///
    /// # Errors
    ///
    /// - `InvalidQuantity` if the summed quantity overflows
    /// - `Database` on persistence failure
    async fn add_or_merge(
        &self,
        cart_id: &CartId,
        product: &Product,
        quantity: Quantity,
    ) -> Result<CartItem, RepositoryError>;

    /// Persist the item's quantity.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the item no longer exists
    async fn save(&self, item: &CartItem) -> Result<(), RepositoryError>;

    /// Delete the item.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the item no longer exists
    async fn delete(&self, item: &CartItem) -> Result<(), RepositoryError>;

    /// Delete every item in a cart, returning how many were removed.
    async fn delete_all(&self, cart_id: &CartId) -> Result<u64, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}
