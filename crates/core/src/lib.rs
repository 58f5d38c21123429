//! # Grocery Recs Core
//!
//! Shared foundation for the grocery recommendations platform.
//!
//! This crate provides the building blocks used by the recommendation engine
//! and the training tooling: the unified error type, environment-based
//! configuration, the PostgreSQL connection pool wrapper, and request
//! validation.
//!
//! ## Modules
//!
//! - `error`: Error types and HTTP error mapping
//! - `config`: Configuration loading and validation
//! - `database`: Shared PostgreSQL connection pool
//! - `validation`: Request parameter validation

pub mod config;
pub mod database;
pub mod error;
pub mod validation;

// Re-export commonly used types
pub use config::{load_dotenv, ConfigLoader, DatabaseConfig};
pub use database::{DatabasePool, PoolStats};
pub use error::RecsError;
pub use validation::{validate_latitude, validate_limit, validate_longitude, validate_radius_km};

/// Result type alias for recommendation service operations
pub type Result<T> = std::result::Result<T, RecsError>;
