//! Catalog product types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crm_portal_core::ProductId;

/// A catalog product as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub original_price: Option<Decimal>,
    pub category: String,
    pub rating: f64,
    pub reviews: i32,
    pub image_url: String,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for adding a product (CLI seeding).
///
/// Omitted fields take the same defaults as the database columns.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews: i32,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

fn default_category() -> String {
    "general".to_owned()
}

const fn default_in_stock() -> bool {
    true
}
