//! Authentication error types.

use thiserror::Error;

use super::password::PasswordError;
use crate::db::RepositoryError;
use crate::services::validation::ValidationErrors;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more input fields failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// No customer with this email (or ID).
    #[error("customer not found")]
    UserNotFound,

    /// Wrong password.
    #[error("invalid password")]
    InvalidCredentials,

    /// Email already registered.
    #[error("email already registered")]
    UserAlreadyExists,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),
}
