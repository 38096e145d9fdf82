//! services/api/src/error.rs
//!
//! Failures that stop the API from starting or serving. Request-level
//! failures never reach this type; handlers answer them with a status code.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connecting to PostgreSQL or applying the embedded migrations failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Binding the listener or serving connections failed.
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}
