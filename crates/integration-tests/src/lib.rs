//! Integration test harness for the customer portal.
//!
//! Tests drive the full router in-process: the same middleware stack the
//! server binary runs, over in-memory stores and an in-memory session store.
//! No database or network listener is needed.
//!
//! ```rust,ignore
//! let app = TestApp::new();
//! let registered = app.register("ana@example.com").await;
//! let account = app.get("/api/account", registered.cookie.as_deref()).await;
//! assert_eq!(account.status, StatusCode::OK);
//! ```

use std::net::SocketAddr;

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::{MemoryStore, cookie::Key};

use crm_portal_server::db::Stores;
use crm_portal_server::services::auth::{HashParams, PasswordHasher};
use crm_portal_server::state::AppState;
use crm_portal_server::{AppOptions, build_app};

/// Peer address the router sees for test requests.
pub const PEER_ADDR: ([u8; 4], u16) = ([192, 0, 2, 10], 40_000);

/// Password used by [`TestApp::register`].
pub const PASSWORD: &str = "hunter22";

/// Cheapest Argon2 settings the library accepts.
const TEST_HASH_PARAMS: HashParams = HashParams {
    memory_kib: 8,
    iterations: 1,
    parallelism: 1,
};

/// A running portal app with its state exposed for seeding.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

/// Status, parsed JSON body and session cookie of one response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// Parsed JSON, or `Value::Null` for non-JSON bodies.
    pub body: Value,
    /// Raw body text.
    pub text: String,
    /// `name=value` pair from `Set-Cookie`, if the response set one.
    pub cookie: Option<String>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// App without auth rate limiting.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rate_limit(false)
    }

    /// App with auth rate limiting switched on or off; proxy headers are not
    /// trusted.
    #[must_use]
    pub fn with_rate_limit(auth_rate_limit: bool) -> Self {
        Self::build(auth_rate_limit, false)
    }

    /// Rate-limited app that takes the client IP from proxy headers.
    #[must_use]
    pub fn behind_trusted_proxy() -> Self {
        Self::build(true, true)
    }

    /// # Panics
    ///
    /// Panics if the password hasher rejects the test parameters.
    fn build(auth_rate_limit: bool, trusted_proxy: bool) -> Self {
        let passwords =
            PasswordHasher::new(TEST_HASH_PARAMS).expect("Failed to create password hasher");
        let state = AppState::new(Stores::memory(), passwords);

        let options = AppOptions {
            session_key: Key::from([0x5a_u8; 64].as_slice()),
            secure_cookies: false,
            auth_rate_limit,
            trusted_proxy,
            cors_origin: None,
        };

        let router = build_app(state.clone(), MemoryStore::default(), options);
        Self { router, state }
    }

    /// Send a request built by the caller.
    ///
    /// Requests without a peer address get [`PEER_ADDR`], as if every test
    /// client connected from the same socket.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body cannot be read.
    pub async fn send(&self, mut request: Request<Body>) -> TestResponse {
        if request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .is_none()
        {
            request
                .extensions_mut()
                .insert(ConnectInfo(SocketAddr::from(PEER_ADDR)));
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_owned);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            text,
            cookie,
        }
    }

    /// Send a request with an optional JSON body and session cookie.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send(request).await
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, None, cookie).await
    }

    pub async fn post(&self, uri: &str, body: &Value, cookie: Option<&str>) -> TestResponse {
        self.request(Method::POST, uri, Some(body), cookie).await
    }

    pub async fn put(&self, uri: &str, body: Option<&Value>, cookie: Option<&str>) -> TestResponse {
        self.request(Method::PUT, uri, body, cookie).await
    }

    /// Register a product customer with [`PASSWORD`].
    ///
    /// # Panics
    ///
    /// Panics unless registration answers 201.
    pub async fn register(&self, email: &str) -> TestResponse {
        let response = self.post("/api/auth/register", &registration(email), None).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "registration failed: {}",
            response.text
        );
        response
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/api/auth/login",
            &json!({ "email": email, "password": password }),
            None,
        )
        .await
    }
}

/// A valid registration body for `email`.
#[must_use]
pub fn registration(email: &str) -> Value {
    json!({
        "name": "Ana Souza",
        "email": email,
        "phone": "11987654321",
        "address": "Rua A, 100",
        "password": PASSWORD,
        "customer_type": "product",
    })
}
