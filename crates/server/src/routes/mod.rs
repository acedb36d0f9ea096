//! HTTP route handlers for the portal API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness
//! GET  /health/ready                   - Readiness (store reachable)
//!
//! # Auth (rate limited)
//! POST /api/auth/register              - Create account, start session
//! POST /api/auth/login                 - Start session
//! POST /api/auth/logout                - Destroy session
//!
//! # Account (requires session)
//! GET  /api/account                    - Profile and visible dashboard sections
//! PUT  /api/account                    - Edit profile
//!
//! # Notifications (requires session)
//! GET  /api/notifications              - Feed, newest first
//! POST /api/notifications              - Create a portal-wide notification
//! PUT  /api/notifications/{id}/read    - Mark as read
//!
//! # Catalog
//! GET  /api/products                   - All products
//! GET  /api/products/{id}              - One product
//! ```
//!
//! Products are added with `portal-cli seed-products`; there is no HTTP
//! create endpoint.

pub mod account;
pub mod auth;
pub mod health;
pub mod notifications;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::{ClientIpKeyExtractor, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::index).post(notifications::create))
        .route("/{id}/read", put(notifications::mark_read))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create all routes for the portal.
///
/// With `auth_limit` set, the governor limiter keyed by that extractor sits in
/// front of `/api/auth`.
pub fn routes(auth_limit: Option<ClientIpKeyExtractor>) -> Router<AppState> {
    let auth = match auth_limit {
        Some(key) => auth_routes().layer(auth_rate_limiter(key)),
        None => auth_routes(),
    };

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/auth", auth)
        .route("/api/account", get(account::show).put(account::update))
        .nest("/api/notifications", notification_routes())
        .nest("/api/products", product_routes())
}
