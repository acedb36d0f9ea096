//! Storage for the portal.
//!
//! # Tables (`PostgreSQL`)
//!
//! - `customers` - Registered customers, unique on the lower-cased `email`
//! - `notifications` - Polled notification feed
//! - `products` - Read-only catalog
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! Each table sits behind a store trait so the services can run against
//! `PostgreSQL` in production and against the in-memory backend in
//! development and tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p crm-portal-cli -- migrate
//! ```

pub mod customers;
pub mod memory;
pub mod notifications;
pub mod products;

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tokio::task::JoinHandle;
use tower_sessions::ExpiredDeletion;
use tower_sessions::session_store;
use tower_sessions_sqlx_store::PostgresStore;

pub use customers::{CustomerStore, PgCustomerStore};
pub use memory::{MemoryCustomerStore, MemoryNotificationStore, MemoryProductStore};
pub use notifications::{NotificationStore, PgNotificationStore};
pub use products::{PgProductStore, ProductStore};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// The set of stores the application runs against.
#[derive(Clone)]
pub struct Stores {
    pub customers: Arc<dyn CustomerStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub products: Arc<dyn ProductStore>,
}

impl Stores {
    /// Stores backed by a `PostgreSQL` pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            customers: Arc::new(PgCustomerStore::new(pool.clone())),
            notifications: Arc::new(PgNotificationStore::new(pool.clone())),
            products: Arc::new(PgProductStore::new(pool.clone())),
        }
    }

    /// Process-local stores; contents are lost on restart.
    #[must_use]
    pub fn memory() -> Self {
        Self {
            customers: Arc::new(MemoryCustomerStore::default()),
            notifications: Arc::new(MemoryNotificationStore::default()),
            products: Arc::new(MemoryProductStore::default()),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Spawn the task that purges expired sessions every `period`.
///
/// The sweeper only returns on a store error, which is logged before the
/// task ends.
pub fn spawn_session_sweeper(
    sessions: PostgresStore,
    period: Duration,
) -> JoinHandle<Result<(), session_store::Error>> {
    tokio::task::spawn(log_failure(
        "session sweeper",
        sessions.continuously_delete_expired(period),
    ))
}

async fn log_failure<E: Display>(
    task: &'static str,
    work: impl Future<Output = Result<(), E>>,
) -> Result<(), E> {
    work.await
        .inspect_err(|e| tracing::error!(task, error = %e, "Background task stopped"))
}
