//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};

use crm_portal_core::ProductId;

use crate::error::Result;
use crate::state::AppState;

/// List all products.
pub async fn index(State(state): State<AppState>) -> Result<Response> {
    let products = state.catalog().list().await?;
    Ok(Json(products.as_slice()).into_response())
}

/// Show one product.
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Response> {
    let Path(id) = id?;

    let product = state.catalog().get(id).await?;
    Ok(Json(product.as_ref()).into_response())
}
