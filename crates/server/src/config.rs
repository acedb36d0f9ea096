//! Portal configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PORTAL_BASE_URL` - Public URL of the portal (https enables secure cookies)
//! - `PORTAL_SESSION_SECRET` - Cookie signing secret (min 64 chars, high entropy)
//! - `PORTAL_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; only required with `PORTAL_STORAGE=postgres`)
//!
//! ## Optional
//! - `PORTAL_STORAGE` - `postgres` (default) or `memory`
//! - `PORTAL_HOST` - Bind address (default: 127.0.0.1)
//! - `PORTAL_PORT` - Listen port (default: 8080)
//! - `PORTAL_PASSWORD_MEMORY_KIB` - Argon2 memory cost (default: 19456)
//! - `PORTAL_PASSWORD_ITERATIONS` - Argon2 time cost (default: 2)
//! - `PORTAL_PASSWORD_PARALLELISM` - Argon2 lanes (default: 1)
//! - `PORTAL_CORS_ORIGIN` - Allowed cross-origin caller, e.g. the SPA dev server
//! - `PORTAL_AUTH_RATE_LIMIT` - Rate limit `/api/auth` per IP (default: true)
//! - `PORTAL_TRUSTED_PROXY` - Take the client IP from `X-Forwarded-For` /
//!   `X-Real-IP` (default: false). Only enable behind a proxy that overwrites
//!   those headers.
//! - `PORTAL_LOG_FORMAT` - `text` (default) or `json`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tower_sessions::cookie::Key;
use url::Url;

use crate::services::auth::HashParams;

const MIN_SESSION_SECRET_LENGTH: usize = 64;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Where customers, notifications and products are kept.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// `PostgreSQL`; sessions are stored in the same database.
    Postgres { database_url: SecretString },
    /// Process memory; everything is lost on restart.
    Memory,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected text or json, got {other:?}")),
        }
    }
}

/// Sentry settings.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
}

/// Portal application configuration.
#[derive(Clone)]
pub struct PortalConfig {
    pub storage: StorageBackend,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the portal
    pub base_url: Url,
    /// Session cookie signing secret
    pub session_secret: SecretString,
    /// Argon2id work factor for new password hashes
    pub password: HashParams,
    /// Allowed CORS origin, if any
    pub cors_origin: Option<String>,
    /// Whether `/api/auth` is rate limited
    pub auth_rate_limit: bool,
    /// Whether proxy headers identify the client
    pub trusted_proxy: bool,
    pub log_format: LogFormat,
    pub sentry: SentryConfig,
}

impl std::fmt::Debug for PortalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalConfig")
            .field("storage", &self.storage)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url.as_str())
            .field("session_secret", &"[REDACTED]")
            .field("password", &self.password)
            .field("cors_origin", &self.cors_origin)
            .field("auth_rate_limit", &self.auth_rate_limit)
            .field("trusted_proxy", &self.trusted_proxy)
            .field("log_format", &self.log_format)
            .field("sentry", &self.sentry)
            .finish()
    }
}

impl PortalConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let storage = match env.or_default("PORTAL_STORAGE", "postgres").as_str() {
            "postgres" => StorageBackend::Postgres {
                database_url: env.database_url("PORTAL_DATABASE_URL")?,
            },
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "PORTAL_STORAGE".to_string(),
                    format!("expected postgres or memory, got {other:?}"),
                ));
            }
        };

        let host = env.parsed("PORTAL_HOST", "127.0.0.1")?;
        let port = env.parsed("PORTAL_PORT", "8080")?;

        let base_url = Url::parse(&env.required("PORTAL_BASE_URL")?).map_err(|e| {
            ConfigError::InvalidEnvVar("PORTAL_BASE_URL".to_string(), e.to_string())
        })?;

        let session_secret = env.validated_secret("PORTAL_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "PORTAL_SESSION_SECRET")?;

        let password = HashParams {
            memory_kib: env.parsed("PORTAL_PASSWORD_MEMORY_KIB", "19456")?,
            iterations: env.parsed("PORTAL_PASSWORD_ITERATIONS", "2")?,
            parallelism: env.parsed("PORTAL_PASSWORD_PARALLELISM", "1")?,
        };

        let cors_origin = env.optional("PORTAL_CORS_ORIGIN");
        let auth_rate_limit = env.parsed("PORTAL_AUTH_RATE_LIMIT", "true")?;
        let trusted_proxy = env.parsed("PORTAL_TRUSTED_PROXY", "false")?;
        let log_format = env.parsed("PORTAL_LOG_FORMAT", "text")?;

        let sentry = SentryConfig {
            dsn: env.optional("SENTRY_DSN"),
            environment: env.optional("SENTRY_ENVIRONMENT"),
        };

        Ok(Self {
            storage,
            host,
            port,
            base_url,
            session_secret,
            password,
            cors_origin,
            auth_rate_limit,
            trusted_proxy,
            log_format,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Session cookies are only marked `Secure` when served over https.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.scheme() == "https"
    }

    /// Cookie signing key derived from the session secret.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InsecureSecret` if the secret is too short for a key.
    pub fn session_key(&self) -> Result<Key, ConfigError> {
        Key::try_from(self.session_secret.expose_secret().as_bytes()).map_err(|e| {
            ConfigError::InsecureSecret("PORTAL_SESSION_SECRET".to_string(), e.to_string())
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get a required environment variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        (self.0)(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional environment variable; empty counts as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get an environment variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        (self.0)(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse an environment variable, falling back to `default`.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        (self.0)(primary_key)
            .or_else(|| (self.0)("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }

    /// Load and validate a secret.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        validate_secret_strength(&value, key)?;
        Ok(SecretString::from(value))
    }
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const GOOD_SECRET: &str =
        "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6-dF8+gH1=jN2~kP4;qR6:sV8,wX0.yZ1?";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("PORTAL_STORAGE", "memory"),
            ("PORTAL_BASE_URL", "http://localhost:8080"),
            ("PORTAL_SESSION_SECRET", GOOD_SECRET),
        ]
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-session-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength(&"ab".repeat(40), "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("aB3$xY9!mK2@nL5#");
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_err());
    }

    #[test]
    fn test_defaults_with_memory_storage() {
        let config = PortalConfig::from_lookup(lookup(&minimal())).unwrap();

        assert!(matches!(config.storage, StorageBackend::Memory));
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.password, HashParams::default());
        assert!(config.auth_rate_limit);
        assert!(!config.trusted_proxy);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(!config.secure_cookies());
        assert!(config.session_key().is_ok());
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let mut vars = minimal();
        vars[0] = ("PORTAL_STORAGE", "postgres");

        let err = PortalConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "PORTAL_DATABASE_URL"));

        vars.push(("DATABASE_URL", "postgres://localhost/portal"));
        let config = PortalConfig::from_lookup(lookup(&vars)).unwrap();
        let StorageBackend::Postgres { database_url } = config.storage else {
            panic!("expected postgres storage");
        };
        assert_eq!(database_url.expose_secret(), "postgres://localhost/portal");
    }

    #[test]
    fn test_https_base_url_enables_secure_cookies() {
        let mut vars = minimal();
        vars[1] = ("PORTAL_BASE_URL", "https://portal.example.org");
        let config = PortalConfig::from_lookup(lookup(&vars)).unwrap();
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let mut vars = minimal();
        vars.push(("PORTAL_PORT", "eighty"));
        let err = PortalConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "PORTAL_PORT"));

        let mut vars = minimal();
        vars.push(("PORTAL_LOG_FORMAT", "xml"));
        assert!(PortalConfig::from_lookup(lookup(&vars)).is_err());

        let mut vars = minimal();
        vars[0] = ("PORTAL_STORAGE", "sqlite");
        assert!(PortalConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = PortalConfig::from_lookup(lookup(&minimal())).unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(GOOD_SECRET));
    }
}
