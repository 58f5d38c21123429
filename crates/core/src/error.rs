//! Error types shared across the grocery recommendations services

use actix_web::{HttpResponse, ResponseError};

/// Unified error type for recommendation services
#[derive(Debug, thiserror::Error)]
pub enum RecsError {
    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        field: Option<String>,
    },

    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
        key: Option<String>,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RecsError {
    /// Create a validation error without a field reference
    pub fn validation(message: impl Into<String>) -> Self {
        RecsError::ValidationError {
            message: message.into(),
            field: None,
        }
    }

    /// Create a validation error naming the offending field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        RecsError::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a configuration error, optionally naming the configuration key
    pub fn configuration(message: impl Into<String>, key: Option<&str>) -> Self {
        RecsError::ConfigurationError {
            message: message.into(),
            key: key.map(String::from),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        RecsError::Internal(message.into())
    }
}

impl From<sqlx::Error> for RecsError {
    fn from(err: sqlx::Error) -> Self {
        RecsError::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RecsError {
    fn from(err: anyhow::Error) -> Self {
        RecsError::Internal(err.to_string())
    }
}

impl ResponseError for RecsError {
    fn error_response(&self) -> HttpResponse {
        match self {
            RecsError::ValidationError { message, .. } => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "validation_error",
                    "error_description": message
                }))
            }
            RecsError::ConfigurationError { .. } => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "configuration_error",
                    "error_description": "Service configuration error"
                }))
            }
            RecsError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "database_error",
                    "error_description": "Database operation failed"
                }))
            }
            RecsError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "internal_error",
                    "error_description": "Internal server error"
                }))
            }
        }
    }
}

// ResponseError already provides From<RecsError> for actix_web::Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_maps_to_400() {
        let err = RecsError::validation_field("radius_km must be positive", "radius_km");
        assert_eq!(err.error_response().status(), 400);
    }

    #[test]
    fn test_database_error_maps_to_500() {
        let err = RecsError::Database("connection refused".to_string());
        assert_eq!(err.error_response().status(), 500);
    }

    #[test]
    fn test_from_sqlx_error() {
        let err: RecsError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, RecsError::Database(_)));
    }
}
