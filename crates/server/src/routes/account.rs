//! Account route handlers.
//!
//! These routes require a session.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Serialize;
use tower_sessions::Session;

use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, set_current_customer};
use crate::models::{CurrentCustomer, Customer};
use crate::services::{AuthError, ProfileInput};
use crate::state::AppState;

/// Dashboard sections the customer may open.
#[derive(Debug, Serialize)]
pub struct Sections {
    pub products: bool,
    pub services: bool,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub success: bool,
    pub user: Customer,
    pub sections: Sections,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: Customer,
}

/// Show the logged-in customer.
///
/// A session whose customer no longer exists is discarded.
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Json<AccountResponse>> {
    let customer = match state.auth().current(current.id).await {
        Ok(customer) => customer,
        Err(AuthError::UserNotFound) => {
            session.flush().await?;
            return Err(AppError::Unauthorized("Login required".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let sections = Sections {
        products: customer.customer_type.can_view_products(),
        services: customer.customer_type.can_view_services(),
    };

    Ok(Json(AccountResponse {
        success: true,
        user: customer,
        sections,
    }))
}

/// Edit the logged-in customer's profile.
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    payload: std::result::Result<Json<ProfileInput>, JsonRejection>,
) -> Result<Json<ProfileResponse>> {
    let Json(input) = payload?;

    let customer = state.auth().update_profile(current.id, &input).await?;
    set_current_customer(&session, &CurrentCustomer::from(&customer)).await?;

    Ok(Json(ProfileResponse {
        success: true,
        message: "Profile updated",
        user: customer,
    }))
}
