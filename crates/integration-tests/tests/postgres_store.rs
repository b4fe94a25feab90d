//! Cart item and product repositories against `PostgreSQL`.
//!
//! These tests require:
//! - A running `PostgreSQL` database reachable via `CART_DATABASE_URL`
//!   (or `DATABASE_URL`)
//! - Migrations applied (cargo run -p sessioncart-cli -- migrate)
//!
//! Run with: cargo test -p sessioncart-integration-tests -- --ignored
//!
//! Every test works in its own freshly generated cart and its own products,
//! so they can run in parallel against a shared database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use sqlx::PgPool;

use sessioncart_core::{CartId, CartItemId, Quantity, QuantityError, Slug};
use sessioncart_storefront::db::{
    CartItemRepository, NewProduct, ProductRepository, RepositoryError, create_pool,
};
use sessioncart_storefront::models::Product;
use sessioncart_storefront::services::cart::{CartContext, CartItemStore, CartService};

/// Connect to the test database.
async fn pool() -> PgPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("CART_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("CART_DATABASE_URL must be set");
    create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to database")
}

/// Insert or refresh a catalog product.
async fn product(pool: &PgPool, slug: &str, price: Decimal) -> Product {
    ProductRepository::new(pool.clone())
        .upsert(&NewProduct {
            slug: Slug::parse(slug).unwrap(),
            name: slug.to_string(),
            price,
        })
        .await
        .expect("Failed to upsert product")
}

fn quantity(value: u32) -> Quantity {
    Quantity::new(value).unwrap()
}

// ============================================================================
// Merge Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL with migrations applied"]
async fn test_add_or_merge_sums_quantities() {
    let pool = pool().await;
    let store = CartItemRepository::new(pool.clone());
    let hat = product(&pool, "pg-merge-hat", dec!(10.00)).await;
    let cart_id = CartId::generate();

    let first = store.add_or_merge(&cart_id, &hat, quantity(2)).await.unwrap();
    let second = store.add_or_merge(&cart_id, &hat, quantity(3)).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity.get(), 5);

    let items = store.list_by_cart(&cart_id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity.get(), 5);

    store.delete_all(&cart_id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL with migrations applied"]
async fn test_merge_overflow_is_invalid_quantity() {
    let pool = pool().await;
    let store = CartItemRepository::new(pool.clone());
    let hat = product(&pool, "pg-overflow-hat", dec!(1.00)).await;
    let cart_id = CartId::generate();

    store
        .add_or_merge(&cart_id, &hat, quantity(Quantity::MAX))
        .await
        .unwrap();
    let err = store
        .add_or_merge(&cart_id, &hat, Quantity::ONE)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RepositoryError::InvalidQuantity(QuantityError::TooLarge { .. })
    ));
    let items = store.list_by_cart(&cart_id).await.unwrap();
    assert_eq!(items[0].quantity.get(), Quantity::MAX);

    store.delete_all(&cart_id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL with migrations applied"]
async fn test_concurrent_adds_leave_one_row() {
    let pool = pool().await;
    let store = CartItemRepository::new(pool.clone());
    let hat = product(&pool, "pg-concurrent-hat", dec!(2.00)).await;
    let cart_id = CartId::generate();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            let hat = hat.clone();
            let cart_id = cart_id.clone();
            tokio::spawn(async move { store.add_or_merge(&cart_id, &hat, Quantity::ONE).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let items = store.list_by_cart(&cart_id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity.get(), 16);

    store.delete_all(&cart_id).await.unwrap();
}

// ============================================================================
// Cart Scoping Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL with migrations applied"]
async fn test_items_are_scoped_to_their_cart() {
    let pool = pool().await;
    let store = CartItemRepository::new(pool.clone());
    let hat = product(&pool, "pg-scope-hat", dec!(10.00)).await;
    let owner = CartId::generate();
    let other = CartId::generate();

    let item = store.add_or_merge(&owner, &hat, Quantity::ONE).await.unwrap();

    assert!(store.find(item.id, &owner).await.unwrap().is_some());
    assert!(store.find(item.id, &other).await.unwrap().is_none());
    assert!(store.list_by_cart(&other).await.unwrap().is_empty());

    // Writes through another cart's identifier touch nothing.
    let mut foreign = item.clone();
    foreign.cart_id = other.clone();
    foreign.quantity = quantity(7);
    assert!(matches!(
        store.save(&foreign).await,
        Err(RepositoryError::NotFound)
    ));
    assert!(matches!(
        store.delete(&foreign).await,
        Err(RepositoryError::NotFound)
    ));
    assert_eq!(store.delete_all(&other).await.unwrap(), 0);

    let stored = store.find(item.id, &owner).await.unwrap().unwrap();
    assert_eq!(stored.quantity.get(), 1);

    store.delete_all(&owner).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL with migrations applied"]
async fn test_missing_item_is_not_found() {
    let store = CartItemRepository::new(pool().await);

    let found = store
        .find(CartItemId::new(i32::MAX), &CartId::generate())
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL with migrations applied"]
async fn test_items_listed_in_insertion_order() {
    let pool = pool().await;
    let store = CartItemRepository::new(pool.clone());
    let cart_id = CartId::generate();
    let slugs = ["pg-order-c", "pg-order-a", "pg-order-b"];

    for slug in slugs {
        let line_product = product(&pool, slug, dec!(1.00)).await;
        store
            .add_or_merge(&cart_id, &line_product, Quantity::ONE)
            .await
            .unwrap();
    }

    let items = store.list_by_cart(&cart_id).await.unwrap();
    let listed: Vec<_> = items.iter().map(|item| item.product.slug.as_str()).collect();
    assert_eq!(listed, slugs);

    store.delete_all(&cart_id).await.unwrap();
}

// ============================================================================
// Service Tests
// ============================================================================

fn service(pool: &PgPool) -> CartService {
    CartService::new(
        Arc::new(ProductRepository::new(pool.clone())),
        Arc::new(CartItemRepository::new(pool.clone())),
    )
}

#[tokio::test]
#[ignore = "Requires PostgreSQL with migrations applied"]
async fn test_update_and_remove_through_service() {
    let pool = pool().await;
    let cart = service(&pool);
    product(&pool, "pg-service-hat", dec!(10.00)).await;
    let mut ctx = CartContext::new();

    let item = cart
        .add_to_cart(&mut ctx, "pg-service-hat", Some("2"))
        .await
        .unwrap();
    cart.update_cart(&mut ctx, item.id, "4").await.unwrap();
    assert_eq!(
        cart.get_item(&mut ctx, item.id).await.unwrap().quantity.get(),
        4
    );

    cart.update_cart(&mut ctx, item.id, "0").await.unwrap();
    assert!(cart.get_item(&mut ctx, item.id).await.unwrap_err().is_not_found());
    assert!(cart.is_empty(&mut ctx).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL with migrations applied"]
async fn test_subtotal_follows_catalog_price() {
    let pool = pool().await;
    let cart = service(&pool);
    product(&pool, "pg-reprice-hat", dec!(10.00)).await;
    let mut ctx = CartContext::new();

    cart.add_to_cart(&mut ctx, "pg-reprice-hat", Some("2"))
        .await
        .unwrap();
    assert_eq!(cart.cart_subtotal(&mut ctx).await.unwrap(), dec!(20.00));

    product(&pool, "pg-reprice-hat", dec!(99.00)).await;
    assert_eq!(cart.cart_subtotal(&mut ctx).await.unwrap(), dec!(198.00));

    cart.empty_cart(&mut ctx).await.unwrap();
    product(&pool, "pg-reprice-hat", dec!(10.00)).await;
}
