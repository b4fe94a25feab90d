//! Cart service.
//!
//! Maps a visitor's session to a cart identifier and manages the cart's
//! line items. Adding a product that is already in the cart increases that
//! line's quantity instead of creating a second line; the merge happens in
//! the [`CartItemStore`] so it holds under concurrent requests.
//!
//! The service does not log or talk to the visitor. Every failure is returned
//! as a [`CartError`] for the caller to report.

mod cache;
mod context;
mod error;
mod memory;
mod ports;

pub use cache::{CachedCatalog, DEFAULT_CAPACITY, DEFAULT_TTL};
pub use context::CartContext;
pub use error::CartError;
pub use memory::{MemoryCartItemStore, MemoryCatalog};
pub use ports::{CartItemStore, ProductCatalog};

use std::sync::Arc;

use rust_decimal::Decimal;

use sessioncart_core::{CartItemId, Price, Quantity, QuantityChange, Slug};

use crate::db::RepositoryError;
use crate::models::{CartItem, CartSummary, Product};

/// Result of [`CartService::update_cart`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartUpdate {
    /// The line now has the requested quantity.
    Updated(CartItem),
    /// The requested quantity was zero or negative, so the line was removed.
    Removed(CartItemId),
}

/// Cart service.
///
/// Cheap to clone; the catalog and store are shared.
#[derive(Clone)]
pub struct CartService {
    catalog: Arc<dyn ProductCatalog>,
    items: Arc<dyn CartItemStore>,
}

impl CartService {
    /// Create a new cart service.
    #[must_use]
    pub fn new(catalog: Arc<dyn ProductCatalog>, items: Arc<dyn CartItemStore>) -> Self {
        Self { catalog, items }
    }

    /// Check that the cart item store is reachable.
    ///
    /// # Errors
    ///
    /// Returns the store's error if it cannot be reached.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        self.items.ping().await
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Return all items in the visitor's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the store fails.
    pub async fn list_items(&self, ctx: &mut CartContext) -> Result<Vec<CartItem>, CartError> {
        let cart_id = ctx.derive_cart_id();
        Ok(self.items.list_by_cart(cart_id).await?)
    }

    /// Return the number of distinct items in the visitor's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the store fails.
    pub async fn count_items(&self, ctx: &mut CartContext) -> Result<usize, CartError> {
        Ok(self.list_items(ctx).await?.len())
    }

    /// Returns true if the visitor's cart has no items.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the store fails.
    pub async fn is_empty(&self, ctx: &mut CartContext) -> Result<bool, CartError> {
        Ok(self.count_items(ctx).await? == 0)
    }

    /// Get a single item from the visitor's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if no item with this ID belongs to
    /// the visitor's cart.
    pub async fn get_item(
        &self,
        ctx: &mut CartContext,
        item_id: CartItemId,
    ) -> Result<CartItem, CartError> {
        let cart_id = ctx.derive_cart_id();
        self.items
            .find(item_id, cart_id)
            .await?
            .ok_or(CartError::ItemNotFound(item_id))
    }

    /// Sum of price times quantity over the visitor's cart.
    ///
    /// Returns `0.00` for an empty cart. No tax, discount or shipping.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the store fails.
    pub async fn cart_subtotal(&self, ctx: &mut CartContext) -> Result<Decimal, CartError> {
        let items = self.list_items(ctx).await?;
        let subtotal: Price = items.iter().map(CartItem::total).sum();
        Ok(subtotal.amount())
    }

    /// Items, counts and subtotal from a single store read.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the store fails.
    pub async fn cart_summary(&self, ctx: &mut CartContext) -> Result<CartSummary, CartError> {
        Ok(CartSummary::from_items(self.list_items(ctx).await?))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a product to the visitor's cart.
    ///
    /// A missing `quantity` adds one. If the product is already in
    /// the cart its quantity is increased; otherwise a new line is created.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` if no product has this slug.
    /// Returns `CartError::InvalidQuantity` if `quantity` is not a positive
    /// integer or the merged quantity overflows.
    pub async fn add_to_cart(
        &self,
        ctx: &mut CartContext,
        product_slug: &str,
        quantity: Option<&str>,
    ) -> Result<CartItem, CartError> {
        let product = self.resolve_product(product_slug).await?;
        let quantity = Quantity::parse_or_default(quantity)?;

        let cart_id = ctx.derive_cart_id();
        Ok(self.items.add_or_merge(cart_id, &product, quantity).await?)
    }

    /// Set the quantity of an item in the visitor's cart.
    ///
    /// A quantity of zero or less removes the item.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the item is not in the visitor's
    /// cart.
    /// Returns `CartError::InvalidQuantity` if `quantity` is not an integer.
    pub async fn update_cart(
        &self,
        ctx: &mut CartContext,
        item_id: CartItemId,
        quantity: &str,
    ) -> Result<CartUpdate, CartError> {
        let item = self.get_item(ctx, item_id).await?;

        match QuantityChange::parse(quantity)? {
            QuantityChange::Set(quantity) => self.set_quantity(item, quantity).await,
            QuantityChange::Remove => self.delete_item(&item).await,
        }
    }

    /// Remove an item from the visitor's cart.
    ///
    /// Returns the removed item.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the item is not in the visitor's
    /// cart.
    pub async fn remove_from_cart(
        &self,
        ctx: &mut CartContext,
        item_id: CartItemId,
    ) -> Result<CartItem, CartError> {
        let item = self.get_item(ctx, item_id).await?;
        self.delete_item(&item).await?;
        Ok(item)
    }

    /// Remove every item from the visitor's cart.
    ///
    /// Returns the number of removed items.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the store fails.
    pub async fn empty_cart(&self, ctx: &mut CartContext) -> Result<u64, CartError> {
        let cart_id = ctx.derive_cart_id();
        Ok(self.items.delete_all(cart_id).await?)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn resolve_product(&self, product_slug: &str) -> Result<Product, CartError> {
        let not_found = || CartError::ProductNotFound(product_slug.to_owned());

        // A malformed slug can never match a catalog entry.
        let slug = Slug::parse(product_slug).map_err(|_| not_found())?;
        self.catalog
            .find_by_slug(&slug)
            .await?
            .ok_or_else(not_found)
    }

    async fn set_quantity(
        &self,
        mut item: CartItem,
        quantity: Quantity,
    ) -> Result<CartUpdate, CartError> {
        item.quantity = quantity;
        self.items
            .save(&item)
            .await
            .map_err(|e| missing_item(e, item.id))?;
        Ok(CartUpdate::Updated(item))
    }

    async fn delete_item(&self, item: &CartItem) -> Result<CartUpdate, CartError> {
        self.items
            .delete(item)
            .await
            .map_err(|e| missing_item(e, item.id))?;
        Ok(CartUpdate::Removed(item.id))
    }
}

/// An item that vanished between lookup and write is reported as not found.
fn missing_item(e: RepositoryError, item_id: CartItemId) -> CartError {
    match e {
        RepositoryError::NotFound => CartError::ItemNotFound(item_id),
        other => other.into(),
    }
}
