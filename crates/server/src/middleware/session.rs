//! Session middleware configuration.
//!
//! The session record holds the logged-in customer; the browser only carries a
//! signed ID cookie. Production uses the `PostgreSQL` store from
//! `tower-sessions-sqlx-store`, memory mode and tests use `MemoryStore`.

use axum::Router;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore, cookie::Key};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "portal_session";

/// Session expiry after inactivity, in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Wrap `router` in a session layer backed by `store`.
///
/// Cookies are signed with `key`, `HttpOnly`, `SameSite=Lax`, and `Secure`
/// when `secure` is set.
pub fn with_sessions<S, T>(router: Router<T>, store: S, key: Key, secure: bool) -> Router<T>
where
    S: SessionStore + Clone,
    T: Clone + Send + Sync + 'static,
{
    let layer = SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key);

    router.layer(layer)
}
