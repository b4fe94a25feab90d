//! Caching decorator for product lookups.
//!
//! Caches found products using `moka` (5-minute TTL by default). Misses are
//! not cached, so a newly added product is visible immediately.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use sessioncart_core::Slug;

use super::ports::ProductCatalog;
use crate::db::RepositoryError;
use crate::models::Product;

/// Default time-to-live for cached products.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default maximum number of cached products.
pub const DEFAULT_CAPACITY: u64 = 1000;

/// A [`ProductCatalog`] that caches another catalog's hits.
#[derive(Clone)]
pub struct CachedCatalog {
    inner: Arc<dyn ProductCatalog>,
    cache: Cache<Slug, Product>,
}

impl CachedCatalog {
    /// Wrap `inner` with a cache of the given TTL and capacity.
    #[must_use]
    pub fn new(inner: Arc<dyn ProductCatalog>, ttl: Duration, capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self { inner, cache }
    }

    /// Drop a cached product, e.g. after its price changed.
    pub async fn invalidate(&self, slug: &Slug) {
        self.cache.invalidate(slug).await;
    }
}

#[async_trait]
impl ProductCatalog for CachedCatalog {
    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        if let Some(product) = self.cache.get(slug).await {
            debug!(%slug, "product cache hit");
            return Ok(Some(product));
        }

        let found = self.inner.find_by_slug(slug).await?;
        if let Some(product) = &found {
            self.cache.insert(slug.clone(), product.clone()).await;
        }
        Ok(found)
    }
}
