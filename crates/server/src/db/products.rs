//! Product catalog storage.

use async_trait::async_trait;
use sqlx::PgPool;

use crm_portal_core::ProductId;

use super::RepositoryError;
use crate::models::{NewProduct, Product};

/// Storage operations on the product catalog.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products ordered by ID.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    /// A single product.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Add a product to the catalog.
    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError>;
}

/// `PostgreSQL` product store.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    /// Create a new product store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT product_id, name, description, price, original_price, category,
                   rating, reviews, image_url, in_stock, created_at
            FROM products
            ORDER BY product_id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT product_id, name, description, price, original_price, category,
                   rating, reviews, image_url, in_stock, created_at
            FROM products
            WHERE product_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let created = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO products (name, description, price, original_price, category,
                                  rating, reviews, image_url, in_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING product_id, name, description, price, original_price, category,
                      rating, reviews, image_url, in_stock, created_at
            ",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.original_price)
        .bind(&product.category)
        .bind(product.rating)
        .bind(product.reviews)
        .bind(&product.image_url)
        .bind(product.in_stock)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }
}
