//! Shared configuration loader for the grocery recommendations services
//!
//! Provides environment-based configuration with typed parsing, validation,
//! and .env file support. All service-specific environment variables use the
//! `GROCERY_RECS_` prefix, with bare fallbacks (`DATABASE_URL`) for the
//! conventional names.
//!
//! # Example
//!
//! ```no_run
//! use grocery_recs_core::config::{load_dotenv, ConfigLoader, DatabaseConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! load_dotenv();
//!
//! let db_config = DatabaseConfig::from_env()?;
//! db_config.validate()?;
//! # Ok(())
//! # }
//! ```

use crate::error::RecsError;
use std::time::Duration;
use url::Url;

/// Configuration loader trait
///
/// Standardized methods for loading and validating configuration from
/// environment variables.
pub trait ConfigLoader: Sized {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if required variables are missing or
    /// values cannot be parsed.
    fn from_env() -> Result<Self, RecsError>;

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if any validation check fails.
    fn validate(&self) -> Result<(), RecsError>;
}

/// Database configuration
///
/// PostgreSQL connection settings consumed by
/// [`DatabasePool`](crate::database::DatabasePool).
///
/// # Environment Variables
///
/// - `GROCERY_RECS_DATABASE_URL` (required, falls back to `DATABASE_URL`):
///   PostgreSQL connection URL
/// - `GROCERY_RECS_DATABASE_MAX_CONNECTIONS` (optional): Maximum pool connections (default: 10)
/// - `GROCERY_RECS_DATABASE_MIN_CONNECTIONS` (optional): Minimum pool connections (default: 1)
/// - `GROCERY_RECS_DATABASE_CONNECT_TIMEOUT` (optional): Connection timeout in seconds (default: 30)
/// - `GROCERY_RECS_DATABASE_IDLE_TIMEOUT` (optional): Idle connection timeout in seconds (default: 600)
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections in the pool
    pub min_connections: u32,
    /// Connection acquire timeout
    pub connect_timeout: Duration,
    /// Idle connection timeout
    pub idle_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/grocery_recs".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl ConfigLoader for DatabaseConfig {
    fn from_env() -> Result<Self, RecsError> {
        let url = std::env::var("GROCERY_RECS_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .map_err(|_| RecsError::ConfigurationError {
                message: "DATABASE_URL or GROCERY_RECS_DATABASE_URL must be set".to_string(),
                key: Some("GROCERY_RECS_DATABASE_URL".to_string()),
            })?;

        let max_connections = parse_env_var(
            "GROCERY_RECS_DATABASE_MAX_CONNECTIONS",
            DatabaseConfig::default().max_connections,
        )?;

        let min_connections = parse_env_var(
            "GROCERY_RECS_DATABASE_MIN_CONNECTIONS",
            DatabaseConfig::default().min_connections,
        )?;

        let connect_timeout_secs = parse_env_var("GROCERY_RECS_DATABASE_CONNECT_TIMEOUT", 30u64)?;

        let idle_timeout_secs = parse_env_var("GROCERY_RECS_DATABASE_IDLE_TIMEOUT", 600u64)?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            idle_timeout: Duration::from_secs(idle_timeout_secs),
        })
    }

    fn validate(&self) -> Result<(), RecsError> {
        let parsed = Url::parse(&self.url).map_err(|e| RecsError::ConfigurationError {
            message: format!("Invalid DATABASE_URL: {}", e),
            key: Some("GROCERY_RECS_DATABASE_URL".to_string()),
        })?;

        if !matches!(parsed.scheme(), "postgres" | "postgresql") {
            return Err(RecsError::ConfigurationError {
                message: format!(
                    "DATABASE_URL must use the postgres scheme, got '{}'",
                    parsed.scheme()
                ),
                key: Some("GROCERY_RECS_DATABASE_URL".to_string()),
            });
        }

        if self.max_connections == 0 {
            return Err(RecsError::ConfigurationError {
                message: "max_connections must be greater than 0".to_string(),
                key: Some("GROCERY_RECS_DATABASE_MAX_CONNECTIONS".to_string()),
            });
        }

        if self.min_connections > self.max_connections {
            return Err(RecsError::ConfigurationError {
                message: format!(
                    "min_connections ({}) cannot exceed max_connections ({})",
                    self.min_connections, self.max_connections
                ),
                key: Some("GROCERY_RECS_DATABASE_MIN_CONNECTIONS".to_string()),
            });
        }

        if self.connect_timeout.as_secs() == 0 {
            return Err(RecsError::ConfigurationError {
                message: "connect_timeout must be greater than 0 seconds".to_string(),
                key: Some("GROCERY_RECS_DATABASE_CONNECT_TIMEOUT".to_string()),
            });
        }

        Ok(())
    }
}

/// Helper function to parse an environment variable with a default value
///
/// # Errors
///
/// Returns a `ConfigurationError` if the variable is set but cannot be parsed.
fn parse_env_var<T>(key: &str, default: T) -> Result<T, RecsError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|v| {
            v.parse::<T>().map_err(|e| RecsError::ConfigurationError {
                message: format!("Failed to parse {}: {}", key, e),
                key: Some(key.to_string()),
            })
        })
        .unwrap_or(Ok(default))
}

/// Load .env file if present
///
/// Convenience wrapper around dotenvy that stays quiet when no .env file
/// exists.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }
}
