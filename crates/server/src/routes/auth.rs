//! Authentication route handlers.
//!
//! Registration and login both start a fresh session holding the customer;
//! logout deletes the session record server-side.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use tower_sessions::Session;

use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::set_current_customer;
use crate::models::{CurrentCustomer, Customer};
use crate::services::{LoginInput, RegisterInput};
use crate::state::AppState;

/// Body returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: Customer,
}

/// Generic success body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Bind a customer to the session under a new session ID.
async fn start_session(session: &Session, customer: &Customer) -> Result<()> {
    session.cycle_id().await?;
    set_current_customer(session, &CurrentCustomer::from(customer)).await?;
    set_sentry_user(&customer.id, Some(customer.email.as_str()));
    Ok(())
}

/// Handle registration.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let Json(input) = payload?;

    let customer = state.auth().register(&input).await?;
    start_session(&session, &customer).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Registration successful",
            user: customer,
        }),
    ))
}

/// Handle login.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(input) = payload?;

    let customer = state.auth().login(&input).await?;
    start_session(&session, &customer).await?;
    add_breadcrumb("auth", "Logged in", None);

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful",
        user: customer,
    }))
}

/// Handle logout.
///
/// Succeeds whether or not a customer was logged in.
pub async fn logout(session: Session) -> Result<Json<MessageResponse>> {
    session.flush().await?;
    clear_sentry_user();

    Ok(Json(MessageResponse {
        success: true,
        message: "Logged out",
    }))
}
