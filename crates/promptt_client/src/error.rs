//! crates/promptt_client/src/error.rs

use crate::config::ConfigError;
use promptt_core::{ports::PortError, PromptError};

/// The primary error type for the client crate and the `promptt` binary.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The request never produced a usable HTTP response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    SessionFile(#[from] serde_json::Error),

    /// Rejected locally, before any request was sent.
    #[error("{0}")]
    InvalidPassword(String),

    #[error("Not signed in. Run `promptt login` first")]
    NotSignedIn,
}

pub type ClientResult<T> = Result<T, ClientError>;
