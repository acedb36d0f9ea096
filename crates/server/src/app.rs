//! Router assembly.
//!
//! [`build_app`] is shared by the binary and the integration tests so both run
//! the same middleware stack; only the session store differs.

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, Method, header},
    middleware,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tower_sessions::{SessionStore, cookie::Key};

use crate::config::{ConfigError, PortalConfig};
use crate::middleware::{ClientIpKeyExtractor, request_id_middleware, with_sessions};
use crate::routes;
use crate::state::AppState;

/// HTTP-level settings for [`build_app`].
#[derive(Clone)]
pub struct AppOptions {
    /// Cookie signing key.
    pub session_key: Key,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
    /// Rate limit `/api/auth` per client IP.
    pub auth_rate_limit: bool,
    /// Key the rate limit on proxy headers instead of the peer address.
    pub trusted_proxy: bool,
    /// Allowed CORS origin; no CORS headers when `None`.
    pub cors_origin: Option<HeaderValue>,
}

impl AppOptions {
    /// Derive the HTTP settings from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the session secret can't be used as a key or
    /// the CORS origin is not a valid header value.
    pub fn from_config(config: &PortalConfig) -> Result<Self, ConfigError> {
        let cors_origin = config
            .cors_origin
            .as_deref()
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PORTAL_CORS_ORIGIN".to_string(), e.to_string())
            })?;

        Ok(Self {
            session_key: config.session_key()?,
            secure_cookies: config.secure_cookies(),
            auth_rate_limit: config.auth_rate_limit,
            trusted_proxy: config.trusted_proxy,
            cors_origin,
        })
    }
}

/// Build the portal router with its middleware stack.
pub fn build_app<S>(state: AppState, sessions: S, options: AppOptions) -> Router
where
    S: SessionStore + Clone,
{
    let router = with_sessions(
        routes::routes(options.auth_rate_limit.then_some(ClientIpKeyExtractor {
            trust_proxy: options.trusted_proxy,
        })),
        sessions,
        options.session_key,
        options.secure_cookies,
    );

    let router = router
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let router = match options.cors_origin {
        Some(origin) => router.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PUT])
                .allow_headers([header::CONTENT_TYPE])
                .allow_credentials(true),
        ),
        None => router,
    };

    router.with_state(state)
}
