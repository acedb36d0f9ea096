//! Notification route handlers.
//!
//! Clients poll `GET /api/notifications` every 30 seconds; responses are
//! never cached.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::Serialize;

use crm_portal_core::NotificationId;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::Notification;
use crate::services::NotificationInput;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub message: &'static str,
    pub notification: Notification,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

/// List the notifications visible to the logged-in customer.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<Notification>>> {
    let notifications = state.notifications().list(Some(current.id)).await?;
    Ok(Json(notifications))
}

/// Create a portal-wide notification.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    payload: std::result::Result<Json<NotificationInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let Json(input) = payload?;

    let notification = state.notifications().create(&input, None).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            message: "Notification created",
            notification,
        }),
    ))
}

/// Mark a notification as read.
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    id: std::result::Result<Path<NotificationId>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;

    state.notifications().mark_read(id, Some(current.id)).await?;

    let id = id.to_string();
    add_breadcrumb(
        "notifications",
        "Marked notification read",
        Some(&[("id", id.as_str())]),
    );

    Ok(Json(MessageResponse {
        success: true,
        message: "Notification marked as read",
    }))
}
