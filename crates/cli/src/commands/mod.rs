//! CLI command implementations.

pub mod migrate;
pub mod notify;
pub mod seed;

use secrecy::SecretString;

const DATABASE_URL_VAR: &str = "PORTAL_DATABASE_URL";

/// Database URL from `PORTAL_DATABASE_URL`, falling back to `DATABASE_URL`.
///
/// On failure returns the name of the variable that should be set.
fn database_url() -> Result<SecretString, &'static str> {
    dotenvy::dotenv().ok();

    std::env::var(DATABASE_URL_VAR)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| DATABASE_URL_VAR)
}
