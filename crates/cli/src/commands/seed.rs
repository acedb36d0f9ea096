//! Seed the product catalog from a YAML file.
//!
//! The file holds a `products` list whose entries use the same fields as the
//! API's product objects, minus `product_id` and `created_at`:
//!
//! ```yaml
//! products:
//!   - name: Premium Headphones
//!     description: Wireless over-ear headphones
//!     price: "199.99"
//!     original_price: "249.99"
//!     category: Electronics
//!     rating: 4.5
//!     reviews: 128
//!     image_url: https://example.com/headphones.jpg
//!     in_stock: true
//! ```

use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info};

use crm_portal_server::db::{self, PgProductStore};
use crm_portal_server::models::NewProduct;
use crm_portal_server::services::CatalogService;

#[derive(Debug, Deserialize)]
struct ProductFile {
    products: Vec<NewProduct>,
}

/// Check every entry and describe each problem found.
fn validate(products: &[NewProduct]) -> Vec<String> {
    let mut errors = Vec::new();

    for (index, product) in products.iter().enumerate() {
        let label = if product.name.trim().is_empty() {
            errors.push(format!("product #{}: name is required", index + 1));
            format!("product #{}", index + 1)
        } else {
            product.name.clone()
        };

        if product.price < Decimal::ZERO {
            errors.push(format!("{label}: price must not be negative"));
        }
        if product
            .original_price
            .is_some_and(|original| original < product.price)
        {
            errors.push(format!("{label}: original_price is below price"));
        }
        if !(0.0..=5.0).contains(&product.rating) {
            errors.push(format!("{label}: rating must be between 0 and 5"));
        }
        if product.reviews < 0 {
            errors.push(format!("{label}: reviews must not be negative"));
        }
    }

    errors
}

/// Load products from `file_path` and add them to the catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any entry fails
/// validation, or a database operation fails.
pub async fn products(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let file: ProductFile = serde_yaml::from_str(&content)?;

    info!(products = file.products.len(), "Parsed product file");

    let errors = validate(&file.products);
    if !errors.is_empty() {
        error!("Product file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    if dry_run {
        info!("Dry run: product file is valid, nothing written");
        return Ok(());
    }

    let database_url = super::database_url().map_err(|var| format!("{var} not set"))?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let catalog = CatalogService::new(Arc::new(PgProductStore::new(pool)));
    let total = file.products.len();
    for product in file.products {
        catalog.add(product).await?;
    }

    info!("Seeding complete! Products inserted: {total}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
products:
  - name: Premium Headphones
    description: Wireless over-ear headphones
    price: "199.99"
    original_price: "249.99"
    category: Electronics
    rating: 4.5
    reviews: 128
    image_url: https://example.com/headphones.jpg
    in_stock: true
  - name: Desk Lamp
    price: "35.00"
"#;

    #[test]
    fn test_parses_sample_file() {
        let file: ProductFile = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(file.products.len(), 2);
        assert_eq!(file.products[0].price, Decimal::new(19999, 2));
        assert!(file.products[1].original_price.is_none());
        assert!(validate(&file.products).is_empty());
    }

    #[test]
    fn test_reports_every_problem() {
        let mut file: ProductFile = serde_yaml::from_str(SAMPLE).unwrap();
        file.products[0].rating = 7.0;
        file.products[1].name = "  ".to_owned();
        file.products[1].price = Decimal::new(-1, 0);

        let errors = validate(&file.products);
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("Premium Headphones"));
        assert_eq!(errors[1], "product #2: name is required");
        assert_eq!(errors[2], "product #2: price must not be negative");
    }
}
