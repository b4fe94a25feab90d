//! Seed the catalog with products from a YAML file.
//!
//! # File Format
//!
//! ```yaml
//! products:
//!   - slug: straw-hat
//!     name: Straw Hat
//!     price: "24.00"
//!   - slug: wool-scarf
//!     name: Wool Scarf
//!     price: "18.50"
//! ```
//!
//! Existing slugs get their name and price refreshed.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use sessioncart_core::Slug;
use sessioncart_storefront::db::{self, NewProduct, ProductRepository};

use super::{CommandError, database_url};

/// Top-level seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<ProductSeed>,
}

/// One product entry.
#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub slug: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

/// Check entries before touching the database.
///
/// Returns the products to upsert, or the first problem found.
fn validate(file: SeedFile) -> Result<Vec<NewProduct>, CommandError> {
    let mut seen = HashSet::new();
    let mut products = Vec::with_capacity(file.products.len());

    for entry in file.products {
        let invalid = |reason: String| CommandError::InvalidProduct {
            slug: entry.slug.clone(),
            reason,
        };

        let slug = Slug::parse(&entry.slug).map_err(|e| invalid(e.to_string()))?;
        if !seen.insert(slug.clone()) {
            return Err(invalid("duplicate slug".to_string()));
        }
        if entry.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        if entry.price.is_sign_negative() {
            return Err(invalid("price is negative".to_string()));
        }

        products.push(NewProduct {
            slug,
            name: entry.name.trim().to_string(),
            price: entry.price.round_dp(2),
        });
    }

    Ok(products)
}

/// Parse and validate a seed file's contents.
fn parse(content: &str) -> Result<Vec<NewProduct>, CommandError> {
    validate(serde_yaml::from_str(content)?)
}

/// Upsert every product in `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is invalid, or if a
/// database operation fails.
pub async fn products(file_path: &Path) -> Result<(), CommandError> {
    let content = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|source| CommandError::Read {
            path: file_path.display().to_string(),
            source,
        })?;

    let products = parse(&content)?;
    info!(path = %file_path.display(), count = products.len(), "Parsed seed file");

    let pool = db::create_pool(&database_url()?).await?;
    let repo = ProductRepository::new(pool);

    for product in &products {
        let saved = repo.upsert(product).await?;
        info!(id = %saved.id, slug = %saved.slug, price = %saved.price, "Seeded product");
    }

    info!("Seeding complete! {} products", products.len());
    Ok(())
}
