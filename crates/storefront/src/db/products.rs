//! Product repository for catalog lookups.
//!
//! The cart only reads products; `upsert` exists for catalog seeding.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use sessioncart_core::{Price, ProductId, Slug};

use super::RepositoryError;
use crate::models::Product;
use crate::services::cart::ProductCatalog;

/// Product row as stored in `storefront.product`.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    slug: Slug,
    name: String,
    price: Price,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            price: row.price,
        }
    }
}

/// Input for creating or refreshing a catalog product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub slug: Slug,
    pub name: String,
    pub price: Decimal,
}

/// Repository for product database operations.
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, slug, name, price
            FROM storefront.product
            WHERE slug = $1
            ",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Insert a product, or refresh name and price if the slug exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the price violates the table's
    /// check constraint.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(slug = %product.slug))]
    pub async fn upsert(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO storefront.product (slug, name, price)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug)
            DO UPDATE SET name = EXCLUDED.name, price = EXCLUDED.price, updated_at = now()
            RETURNING id, slug, name, price
            ",
        )
        .bind(&product.slug)
        .bind(&product.name)
        .bind(product.price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_check_violation()
            {
                return RepositoryError::Conflict(format!(
                    "invalid price for {}",
                    product.slug
                ));
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }
}

#[async_trait]
impl ProductCatalog for ProductRepository {
    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        self.get_by_slug(slug).await
    }
}
