//! Product catalog tests.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use rust_decimal::Decimal;

use crm_portal_integration_tests::TestApp;
use crm_portal_server::models::NewProduct;

fn product(name: &str, cents: i64) -> NewProduct {
    NewProduct {
        name: name.to_owned(),
        description: format!("{name} description"),
        price: Decimal::new(cents, 2),
        original_price: None,
        category: "Electronics".to_owned(),
        rating: 4.0,
        reviews: 3,
        image_url: String::new(),
        in_stock: true,
    }
}

#[tokio::test]
async fn test_empty_catalog() {
    let app = TestApp::new();

    let response = app.get("/api/products", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, serde_json::json!([]));
}

#[tokio::test]
async fn test_list_and_show_products() {
    let app = TestApp::new();
    let headphones = app
        .state
        .catalog()
        .add(product("Headphones", 19999))
        .await
        .unwrap();
    app.state
        .catalog()
        .add(product("Desk Lamp", 3500))
        .await
        .unwrap();

    let list = app.get("/api/products", None).await;
    assert_eq!(list.status, StatusCode::OK);
    let names: Vec<&str> = list
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Headphones", "Desk Lamp"]);

    let show = app
        .get(&format!("/api/products/{}", headphones.product_id), None)
        .await;
    assert_eq!(show.status, StatusCode::OK);
    assert_eq!(show.body["name"], "Headphones");
    assert_eq!(show.body["in_stock"], true);
}

#[tokio::test]
async fn test_unknown_product() {
    let app = TestApp::new();

    let response = app.get("/api/products/4040", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Product not found");

    let invalid = app.get("/api/products/not-a-number", None).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_catalog_is_read_only_over_http() {
    let app = TestApp::new();
    let body = serde_json::json!({
        "name": "Headphones",
        "description": "Over-ear",
        "price": "199.99",
        "category": "Electronics",
    });

    let response = app.post("/api/products", &body, None).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);

    let list = app.get("/api/products", None).await;
    assert_eq!(list.body, serde_json::json!([]));
}
