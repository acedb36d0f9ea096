//! Product catalog.
//!
//! Read access to the catalog for the dashboard, cached with `moka`
//! (1-minute TTL). The catalog changes only through [`CatalogService::add`],
//! which drops the cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tracing::debug;

use crm_portal_core::ProductId;

use crate::db::{ProductStore, RepositoryError};
use crate::models::{NewProduct, Product};

/// Errors from the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product {0} not found")]
    NotFound(ProductId),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    List,
    Product(ProductId),
}

#[derive(Debug, Clone)]
enum CacheValue {
    List(Arc<Vec<Product>>),
    Product(Arc<Product>),
}

/// Cached catalog access.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    store: Arc<dyn ProductStore>,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    /// Cache lifetime for catalog reads.
    pub const TTL: Duration = Duration::from_secs(60);

    #[must_use]
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Self::TTL)
            .build();

        Self {
            inner: Arc::new(CatalogInner { store, cache }),
        }
    }

    /// All products ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        if let Some(CacheValue::List(products)) = self.inner.cache.get(&CacheKey::List).await {
            debug!("catalog list cache hit");
            return Ok(products);
        }

        let mut products = self.inner.store.list().await?;
        products.sort_by_key(|p| p.product_id);
        let products = Arc::new(products);

        self.inner
            .cache
            .insert(CacheKey::List, CacheValue::List(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no product has this ID.
    pub async fn get(&self, id: ProductId) -> Result<Arc<Product>, CatalogError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!(product_id = %id, "catalog product cache hit");
            return Ok(product);
        }

        let product = Arc::new(
            self.inner
                .store
                .get(id)
                .await?
                .ok_or(CatalogError::NotFound(id))?,
        );

        self.inner
            .cache
            .insert(key, CacheValue::Product(Arc::clone(&product)))
            .await;

        Ok(product)
    }

    /// Add a product and invalidate cached reads.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn add(&self, product: NewProduct) -> Result<Product, CatalogError> {
        let created = self.inner.store.insert(product).await?;

        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;

        tracing::info!(product_id = %created.product_id, name = %created.name, "product added");
        Ok(created)
    }
}
