//! Business logic for the portal.
//!
//! # Services
//!
//! - `auth` - Registration, login and profile edits (Argon2id password hashing)
//! - `notifications` - The polled notification feed
//! - `catalog` - Cached read access to the product catalog
//! - `validation` - Field-level validation errors shared by the services
//!
//! Services borrow their stores from [`crate::state::AppState`] and return
//! `thiserror` enums; the HTTP layer maps those onto [`crate::error::AppError`].

pub mod auth;
pub mod catalog;
pub mod notifications;
pub mod validation;

pub use auth::{AuthError, AuthService, LoginInput, ProfileInput, RegisterInput};
pub use catalog::{CatalogError, CatalogService};
pub use notifications::{NotificationError, NotificationInput, NotificationService};
pub use validation::{FieldError, ValidationErrors};
