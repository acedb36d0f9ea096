//! Database migration command.
//!
//! Applies the portal schema from `crates/server/migrations/` and then
//! creates the session table used by `tower-sessions-sqlx-store`. Both steps
//! are idempotent.
//!
//! ```
//! migrations/
//! ├── 20260101000001_create_customers.sql
//! ├── 20260101000002_create_notifications.sql
//! └── 20260101000003_create_products.sql
//! ```

use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

use crm_portal_server::db;

/// Errors from running migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all portal migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails, or
/// a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = super::database_url().map_err(MigrationError::MissingEnvVar)?;

    info!("Connecting to portal database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running portal migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    info!("Migrations complete!");
    Ok(())
}
