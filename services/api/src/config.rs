//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use promptt_core::FREE_DAILY_ALLOTMENT;
use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    /// Server-held credential. When absent the gateway needs a caller-supplied key.
    pub openai_api_key: Option<String>,
    pub openai_api_base: Option<String>,
    pub allow_client_api_key: bool,
    pub prompt_model: String,
    pub prompt_temperature: f32,
    pub prompt_max_tokens: u32,
    pub daily_prompt_limit: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Gateway Credentials (as optional) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let openai_api_base = std::env::var("OPENAI_API_BASE").ok();
        let allow_client_api_key = parse_var("ALLOW_CLIENT_API_KEY", false)?;

        // --- Load Generation Settings ---
        let prompt_model =
            std::env::var("PROMPT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let prompt_temperature = parse_var("PROMPT_TEMPERATURE", 0.7_f32)?;
        let prompt_max_tokens = parse_var("PROMPT_MAX_TOKENS", 800_u32)?;
        let daily_prompt_limit = parse_var("DAILY_PROMPT_LIMIT", FREE_DAILY_ALLOTMENT)?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openai_api_key,
            openai_api_base,
            allow_client_api_key,
            prompt_model,
            prompt_temperature,
            prompt_max_tokens,
            daily_prompt_limit,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
