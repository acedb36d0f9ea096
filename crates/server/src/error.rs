//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. `AppError` renders the single
//! JSON error shape used by the API:
//!
//! ```json
//! {"success": false, "message": "...", "errors": [{"field": "...", "message": "..."}]}
//! ```
//!
//! `errors` is only present for validation failures. Server errors are
//! captured to Sentry and answered with a generic message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, CatalogError, FieldError, NotificationError};

/// Application-level error type for the portal API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Notification operation failed.
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Caller is not logged in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
}

const INTERNAL: &str = "Internal server error";

impl AppError {
    /// HTTP status, client-facing message and field errors.
    fn parts(&self) -> (StatusCode, String, Option<&[FieldError]>) {
        match self {
            Self::Database(_) | Self::Session(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_owned(), None)
            }
            Self::Auth(AuthError::Validation(errors))
            | Self::Notification(NotificationError::Validation(errors)) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_owned(),
                Some(errors.errors()),
            ),
            Self::Auth(err) => match err {
                AuthError::UserNotFound => {
                    (StatusCode::NOT_FOUND, "Customer not found".to_owned(), None)
                }
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "Invalid password".to_owned(), None)
                }
                AuthError::UserAlreadyExists => {
                    (StatusCode::CONFLICT, "Email already registered".to_owned(), None)
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_owned(), None),
            },
            Self::Notification(err) => match err {
                NotificationError::NotFound(_) => (
                    StatusCode::NOT_FOUND,
                    "Notification not found".to_owned(),
                    None,
                ),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_owned(), None),
            },
            Self::Catalog(err) => match err {
                CatalogError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, "Product not found".to_owned(), None)
                }
                CatalogError::Repository(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_owned(), None)
                }
            },
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
        }
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = self.parts();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        let body = ErrorBody {
            success: false,
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with customers.
pub fn set_sentry_user(customer_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a customer action.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("notifications", "Marked notification read", Some(&[("id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use crm_portal_core::{NotificationId, ProductId};

    use super::*;
    use crate::services::ValidationErrors;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_display_names_the_layer() {
        let err = AppError::Unauthorized("Login required".to_string());
        assert_eq!(err.to_string(), "Unauthorized: Login required");

        let err = AppError::Notification(NotificationError::NotFound(NotificationId::new(9)));
        assert_eq!(err.to_string(), "Notification error: notification 9 not found");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::Auth(AuthError::UserAlreadyExists).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Auth(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Auth(AuthError::UserNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Notification(NotificationError::NotFound(NotificationId::new(1))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Catalog(CatalogError::NotFound(ProductId::new(1))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("test".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Database(RepositoryError::NotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::BadRequest("Invalid JSON".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("phone", "phone must be at least 10 characters");

        let (status, body) = body_json(AppError::Auth(AuthError::Validation(errors))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"][0]["field"], "phone");
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (status, body) =
            body_json(AppError::Database(RepositoryError::Database(sqlx::Error::PoolTimedOut))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("errors").is_none());
    }
}
