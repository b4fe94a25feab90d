//! Cart item repository.
//!
//! Line items are unique per `(cart_id, product_id)`. Adding a product that
//! is already in the cart goes through a single `INSERT ... ON CONFLICT`
//! statement, so concurrent adds merge instead of creating duplicate rows.
//!
//! Cart identifiers are session tokens and are kept out of tracing spans.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use sessioncart_core::{CartId, CartItemId, Price, ProductId, Quantity, Slug};

use super::RepositoryError;
use crate::models::{CartItem, Product};
use crate::services::cart::CartItemStore;

/// Cart item joined with its product.
#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: CartItemId,
    cart_id: CartId,
    quantity: Quantity,
    date_added: DateTime<Utc>,
    product_id: ProductId,
    product_slug: Slug,
    product_name: String,
    product_price: Price,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            cart_id: row.cart_id,
            product: Product {
                id: row.product_id,
                slug: row.product_slug,
                name: row.product_name,
                price: row.product_price,
            },
            quantity: row.quantity,
            date_added: row.date_added,
        }
    }
}

/// Cart item columns returned by writes.
#[derive(sqlx::FromRow)]
struct WrittenRow {
    id: CartItemId,
    cart_id: CartId,
    quantity: Quantity,
    date_added: DateTime<Utc>,
}

/// Repository for cart item database operations.
#[derive(Clone)]
pub struct CartItemRepository {
    pool: PgPool,
}

impl CartItemRepository {
    /// Create a new cart item repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartItemStore for CartItemRepository {
    #[instrument(skip(self, cart_id))]
    async fn list_by_cart(&self, cart_id: &CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT ci.id, ci.cart_id, ci.quantity, ci.date_added,
                   p.id AS product_id, p.slug AS product_slug,
                   p.name AS product_name, p.price AS product_price
            FROM storefront.cart_item ci
            JOIN storefront.product p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY ci.date_added, ci.id
            ",
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    #[instrument(skip(self, cart_id))]
    async fn find(
        &self,
        id: CartItemId,
        cart_id: &CartId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT ci.id, ci.cart_id, ci.quantity, ci.date_added,
                   p.id AS product_id, p.slug AS product_slug,
                   p.name AS product_name, p.price AS product_price
            FROM storefront.cart_item ci
            JOIN storefront.product p ON p.id = ci.product_id
            WHERE ci.id = $1 AND ci.cart_id = $2
            ",
        )
        .bind(id)
        .bind(cart_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CartItem::from))
    }

    #[instrument(skip(self, cart_id, product), fields(product_id = %product.id))]
    async fn add_or_merge(
        &self,
        cart_id: &CartId,
        product: &Product,
        quantity: Quantity,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, WrittenRow>(
            r"
            INSERT INTO storefront.cart_item (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = storefront.cart_item.quantity + EXCLUDED.quantity
            RETURNING id, cart_id, quantity, date_added
            ",
        )
        .bind(cart_id)
        .bind(product.id)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        Ok(CartItem {
            id: row.id,
            cart_id: row.cart_id,
            product: product.clone(),
            quantity: row.quantity,
            date_added: row.date_added,
        })
    }

    #[instrument(skip(self, item), fields(item_id = %item.id))]
    async fn save(&self, item: &CartItem) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.cart_item
            SET quantity = $1
            WHERE id = $2 AND cart_id = $3
            ",
        )
        .bind(item.quantity)
        .bind(item.id)
        .bind(&item.cart_id)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, item), fields(item_id = %item.id))]
    async fn delete(&self, item: &CartItem) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM storefront.cart_item
            WHERE id = $1 AND cart_id = $2
            ",
        )
        .bind(item.id)
        .bind(&item.cart_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, cart_id))]
    async fn delete_all(&self, cart_id: &CartId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.cart_item WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
