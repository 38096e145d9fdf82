//! crates/promptt_client/src/config.rs
//!
//! Client configuration, read from the environment (and a `.env` file when present).

use std::path::PathBuf;
use tracing::Level;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the Promptt API, without a trailing slash.
    pub api_url: String,
    pub session_file: PathBuf,
    /// Program (plus arguments) that receives copied text on stdin.
    pub clipboard_command: String,
    pub log_level: Level,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let api_url = std::env::var("PROMPTT_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "PROMPTT_API_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_url),
            ));
        }

        let session_file = std::env::var("PROMPTT_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_session_file());

        let clipboard_command = std::env::var("PROMPTT_CLIPBOARD_COMMAND")
            .ok()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| default_clipboard_command().to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "WARN".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_url,
            session_file,
            clipboard_command,
            log_level,
        })
    }
}

fn default_session_file() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".promptt").join("session.json"),
        None => PathBuf::from(".promptt-session.json"),
    }
}

fn default_clipboard_command() -> &'static str {
    if cfg!(target_os = "macos") {
        "pbcopy"
    } else if cfg!(target_os = "windows") {
        "clip"
    } else {
        "xclip -selection clipboard"
    }
}
