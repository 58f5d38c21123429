//! Recommendations service configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::scoring::ScoringWeights;

/// Recommendations Service Configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseSettings,

    /// Hybrid scoring weights
    pub scoring: ScoringWeights,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port (default: 8083)
    pub port: u16,

    /// Worker threads
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Postgres connection URL
    pub url: String,

    /// Maximum pool connections
    pub max_connections: u32,

    /// Minimum pool connections
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub connect_timeout_sec: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseSettings::default(),
            scoring: ScoringWeights::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8083,
            workers: None,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/grocery_recs".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_sec: 30,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment and config file
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/recs").required(false))
            .add_source(config::Environment::with_prefix("RECS").separator("__"))
            .build()?;

        let config: EngineConfig = settings.try_deserialize()?;
        config.scoring.validate()?;
        Ok(config)
    }

    /// Map the database section onto the shared pool configuration
    pub fn database_config(&self) -> grocery_recs_core::DatabaseConfig {
        grocery_recs_core::DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            min_connections: self.database.min_connections,
            connect_timeout: Duration::from_secs(self.database.connect_timeout_sec),
            ..grocery_recs_core::DatabaseConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_usable() {
        let config = EngineConfig::default();
        assert_eq!(config.server.port, 8083);
        assert_eq!(config.database.max_connections, 10);
        assert!(config.scoring.validate().is_ok());
    }

    #[test]
    fn test_database_config_mapping() {
        let config = EngineConfig::default();
        let db = config.database_config();
        assert_eq!(db.url, config.database.url);
        assert_eq!(db.connect_timeout, Duration::from_secs(30));
    }
}
