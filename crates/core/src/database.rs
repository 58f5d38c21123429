//! Shared PostgreSQL connection pool for the grocery recommendations services

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::config::{ConfigLoader, DatabaseConfig};
use crate::error::RecsError;

/// Shared database connection pool
#[derive(Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Create a new database pool from the given configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self, RecsError> {
        info!(
            "Connecting to database with max {} connections",
            config.max_connections
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .idle_timeout(Some(config.idle_timeout))
            .acquire_timeout(config.connect_timeout)
            .connect(&config.url)
            .await?;

        info!("Database connection pool established");
        Ok(Self { pool })
    }

    /// Create a pool from environment variables
    pub async fn from_env() -> Result<Self, RecsError> {
        let config = DatabaseConfig::from_env()?;
        config.validate()?;
        Self::new(&config).await
    }

    /// Wrap an already constructed pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get reference to the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check if the pool is healthy
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
        }
    }
}

/// Pool statistics
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_pool_health_check() {
        let url = std::env::var("TEST_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("TEST_DATABASE_URL or DATABASE_URL must be set");
        let config = DatabaseConfig {
            url,
            max_connections: 2,
            ..DatabaseConfig::default()
        };

        let db = DatabasePool::new(&config).await.unwrap();
        assert!(db.is_healthy().await);
        assert!(db.stats().size > 0);
    }
}
