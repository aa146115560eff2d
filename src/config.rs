//! Configuration management for the research agent.
//!
//! Configuration can be set via environment variables:
//! - `OPENAI_API_KEY` - Required. API key for the chat-completions endpoint.
//! - `OPENAI_BASE_URL` - Optional. Defaults to `https://api.openai.com/v1`.
//! - `AGENT_MODEL` - Optional. Chat model identifier. Defaults to `gpt-4o`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `MAX_ROUNDS` - Optional. Maximum chat/execute rounds per turn. Defaults to `16`.
//! - `APPROVAL_TIMEOUT_SECS` - Optional. Deadline for an outstanding approval
//!   request; a reply arriving later is treated as a denial. Unset means the
//!   conversation stays suspended indefinitely.
//! - `DATABASE_PATH` - Optional. SQLite file for conversation checkpoints.
//!   Unset selects the in-memory store.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the LLM endpoint
    pub api_key: String,

    /// Base URL of the OpenAI-compatible API
    pub base_url: String,

    /// Chat model identifier
    pub model: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Maximum chat/execute rounds within a single turn
    pub max_rounds: usize,

    /// Optional deadline for an outstanding approval request, in seconds.
    /// `None` suspends indefinitely.
    pub approval_timeout_secs: Option<u64>,

    /// Optional SQLite path for durable conversation checkpoints
    pub database_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let model = std::env::var("AGENT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = match std::env::var("PORT") {
            Ok(v) => v
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), e.to_string()))?,
            Err(_) => 3000,
        };

        let max_rounds = match std::env::var("MAX_ROUNDS") {
            Ok(v) => v
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidValue("MAX_ROUNDS".to_string(), e.to_string()))?,
            Err(_) => 16,
        };

        let approval_timeout_secs = match std::env::var("APPROVAL_TIMEOUT_SECS") {
            Ok(v) => Some(v.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("APPROVAL_TIMEOUT_SECS".to_string(), e.to_string())
            })?),
            Err(_) => None,
        };

        let database_path = std::env::var("DATABASE_PATH").ok().map(PathBuf::from);

        Ok(Self {
            api_key,
            base_url,
            model,
            host,
            port,
            max_rounds,
            approval_timeout_secs,
            database_path,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_rounds: 16,
            approval_timeout_secs: None,
            database_path: None,
        }
    }
}
