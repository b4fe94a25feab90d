//! In-memory catalog and cart item store.
//!
//! Useful for tests and local development without `PostgreSQL`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use sessioncart_core::{CartId, CartItemId, ProductId, Quantity, Slug};

use super::ports::{CartItemStore, ProductCatalog};
use crate::db::RepositoryError;
use crate::models::{CartItem, Product};

/// In-memory product catalog keyed by slug.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    products: Arc<RwLock<HashMap<Slug, Product>>>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding `products`.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products
            .into_iter()
            .map(|product| (product.slug.clone(), product))
            .collect();
        Self {
            products: Arc::new(RwLock::new(products)),
        }
    }

    /// Add or replace a product.
    pub async fn insert(&self, product: Product) {
        self.products
            .write()
            .await
            .insert(product.slug.clone(), product);
    }

    /// Get the number of products.
    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    /// Returns true if the catalog has no products.
    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }

    /// Snapshot of the catalog keyed by product ID.
    async fn by_id(&self) -> HashMap<ProductId, Product> {
        self.products
            .read()
            .await
            .values()
            .map(|product| (product.id, product.clone()))
            .collect()
    }
}

#[async_trait]
impl ProductCatalog for MemoryCatalog {
    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.read().await.get(slug).cloned())
    }
}

/// A stored line. Only the product ID is kept; the product itself is
/// resolved against the catalog on every read.
#[derive(Debug, Clone)]
struct StoredItem {
    id: CartItemId,
    cart_id: CartId,
    product_id: ProductId,
    quantity: Quantity,
    date_added: DateTime<Utc>,
}

impl StoredItem {
    fn with_product(&self, product: Product) -> CartItem {
        CartItem {
            id: self.id,
            cart_id: self.cart_id.clone(),
            product,
            quantity: self.quantity,
            date_added: self.date_added,
        }
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    last_id: i32,
    items: BTreeMap<CartItemId, StoredItem>,
}

impl StoreInner {
    fn position(&self, cart_id: &CartId, product_id: ProductId) -> Option<CartItemId> {
        self.items
            .values()
            .find(|item| &item.cart_id == cart_id && item.product_id == product_id)
            .map(|item| item.id)
    }

    fn next_id(&mut self) -> CartItemId {
        self.last_id += 1;
        CartItemId::new(self.last_id)
    }
}

/// In-memory cart item store.
///
/// Lines reference products by ID and are joined with `catalog` on read, so
/// a price change shows up in existing carts the same way it does in
/// `PostgreSQL`. Lines whose product has left the catalog are not listed.
///
/// Every write holds the lock for its whole read-modify-write, which gives
/// the same one-item-per-product guarantee as the database's unique key.
#[derive(Debug, Clone)]
pub struct MemoryCartItemStore {
    catalog: MemoryCatalog,
    inner: Arc<RwLock<StoreInner>>,
}

impl MemoryCartItemStore {
    /// Create an empty store whose lines resolve against `catalog`.
    #[must_use]
    pub fn new(catalog: MemoryCatalog) -> Self {
        Self {
            catalog,
            inner: Arc::default(),
        }
    }

    /// Get the number of items across all carts.
    pub async fn item_count(&self) -> usize {
        self.inner.read().await.items.len()
    }
}

#[async_trait]
impl CartItemStore for MemoryCartItemStore {
    async fn list_by_cart(&self, cart_id: &CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let inner = self.inner.read().await;
        let products = self.catalog.by_id().await;
        Ok(inner
            .items
            .values()
            .filter(|item| &item.cart_id == cart_id)
            .filter_map(|item| {
                products
                    .get(&item.product_id)
                    .map(|product| item.with_product(product.clone()))
            })
            .collect())
    }

    async fn find(
        &self,
        id: CartItemId,
        cart_id: &CartId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let stored = {
            let inner = self.inner.read().await;
            match inner.items.get(&id) {
                Some(item) if &item.cart_id == cart_id => item.clone(),
                _ => return Ok(None),
            }
        };
        let product = self.catalog.by_id().await.remove(&stored.product_id);
        Ok(product.map(|product| stored.with_product(product)))
    }

    async fn add_or_merge(
        &self,
        cart_id: &CartId,
        product: &Product,
        quantity: Quantity,
    ) -> Result<CartItem, RepositoryError> {
        let mut inner = self.inner.write().await;

        if let Some(id) = inner.position(cart_id, product.id)
            && let Some(item) = inner.items.get_mut(&id)
        {
            item.quantity = item.quantity.checked_add(quantity)?;
            return Ok(item.with_product(product.clone()));
        }

        let item = StoredItem {
            id: inner.next_id(),
            cart_id: cart_id.clone(),
            product_id: product.id,
            quantity,
            date_added: Utc::now(),
        };
        inner.items.insert(item.id, item.clone());
        Ok(item.with_product(product.clone()))
    }

    async fn save(&self, item: &CartItem) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .items
            .get_mut(&item.id)
            .filter(|stored| stored.cart_id == item.cart_id)
            .ok_or(RepositoryError::NotFound)?;
        stored.quantity = item.quantity;
        Ok(())
    }

    async fn delete(&self, item: &CartItem) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        match inner.items.get(&item.id) {
            Some(stored) if stored.cart_id == item.cart_id => {
                inner.items.remove(&item.id);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }

    async fn delete_all(&self, cart_id: &CartId) -> Result<u64, RepositoryError> {
        let mut inner = self.inner.write().await;
        let before = inner.items.len();
        inner.items.retain(|_, item| &item.cart_id != cart_id);
        Ok((before - inner.items.len()) as u64)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use sessioncart_core::Price;

    use super::*;

    fn product(id: i32, slug: &str) -> Product {
        Product {
            id: ProductId::new(id),
            slug: Slug::parse(slug).unwrap(),
            name: slug.to_string(),
            price: Price::new(dec!(1.00)),
        }
    }

    fn cart(id: &str) -> CartId {
        CartId::parse(id).unwrap()
    }

    fn store() -> (MemoryCatalog, MemoryCartItemStore) {
        let catalog = MemoryCatalog::with_products([product(1, "hat"), product(2, "boots")]);
        let store = MemoryCartItemStore::new(catalog.clone());
        (catalog, store)
    }

    #[tokio::test]
    async fn test_catalog_lookup() {
        let catalog = MemoryCatalog::with_products([product(1, "hat")]);
        let slug = Slug::parse("hat").unwrap();
        assert_eq!(
            catalog.find_by_slug(&slug).await.unwrap().map(|p| p.id),
            Some(ProductId::new(1))
        );

        let missing = Slug::parse("boots").unwrap();
        assert!(catalog.find_by_slug(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_or_merge_merges() {
        let (_, store) = store();
        let hat = product(1, "hat");
        let first = store
            .add_or_merge(&cart("a"), &hat, Quantity::new(2).unwrap())
            .await
            .unwrap();
        let second = store
            .add_or_merge(&cart("a"), &hat, Quantity::new(3).unwrap())
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity.get(), 5);
        assert_eq!(store.item_count().await, 1);
    }

    #[tokio::test]
    async fn test_same_product_in_two_carts() {
        let (_, store) = store();
        let hat = product(1, "hat");
        store
            .add_or_merge(&cart("a"), &hat, Quantity::ONE)
            .await
            .unwrap();
        store
            .add_or_merge(&cart("b"), &hat, Quantity::ONE)
            .await
            .unwrap();

        assert_eq!(store.list_by_cart(&cart("a")).await.unwrap().len(), 1);
        assert_eq!(store.list_by_cart(&cart("b")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_is_scoped_to_cart() {
        let (_, store) = store();
        let item = store
            .add_or_merge(&cart("a"), &product(1, "hat"), Quantity::ONE)
            .await
            .unwrap();

        assert!(store.find(item.id, &cart("a")).await.unwrap().is_some());
        assert!(store.find(item.id, &cart("b")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reads_use_current_catalog_price() {
        let (catalog, store) = store();
        let item = store
            .add_or_merge(&cart("a"), &product(1, "hat"), Quantity::new(2).unwrap())
            .await
            .unwrap();

        let mut repriced = product(1, "hat");
        repriced.price = Price::new(dec!(4.25));
        catalog.insert(repriced).await;

        let listed = store.list_by_cart(&cart("a")).await.unwrap();
        assert_eq!(listed[0].product.price.amount(), dec!(4.25));
        assert_eq!(listed[0].total().amount(), dec!(8.50));

        let found = store.find(item.id, &cart("a")).await.unwrap().unwrap();
        assert_eq!(found.product.price.amount(), dec!(4.25));
    }

    #[tokio::test]
    async fn test_lines_without_product_are_hidden() {
        let catalog = MemoryCatalog::new();
        let store = MemoryCartItemStore::new(catalog);
        let item = store
            .add_or_merge(&cart("a"), &product(9, "ghost"), Quantity::ONE)
            .await
            .unwrap();

        assert!(store.list_by_cart(&cart("a")).await.unwrap().is_empty());
        assert!(store.find(item.id, &cart("a")).await.unwrap().is_none());
        assert_eq!(store.item_count().await, 1);
    }

    #[tokio::test]
    async fn test_merge_overflow() {
        let (_, store) = store();
        let hat = product(1, "hat");
        store
            .add_or_merge(&cart("a"), &hat, Quantity::new(Quantity::MAX).unwrap())
            .await
            .unwrap();

        let err = store
            .add_or_merge(&cart("a"), &hat, Quantity::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidQuantity(_)));
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let (_, store) = store();
        let item = store
            .add_or_merge(&cart("a"), &product(1, "hat"), Quantity::ONE)
            .await
            .unwrap();
        store.delete(&item).await.unwrap();
        assert!(matches!(
            store.delete(&item).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_all() {
        let (_, store) = store();
        store
            .add_or_merge(&cart("a"), &product(1, "hat"), Quantity::ONE)
            .await
            .unwrap();
        store
            .add_or_merge(&cart("a"), &product(2, "boots"), Quantity::ONE)
            .await
            .unwrap();
        store
            .add_or_merge(&cart("b"), &product(1, "hat"), Quantity::ONE)
            .await
            .unwrap();

        assert_eq!(store.delete_all(&cart("a")).await.unwrap(), 2);
        assert_eq!(store.item_count().await, 1);
    }
}
