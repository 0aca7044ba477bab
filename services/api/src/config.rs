//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
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
    pub log_level: Level,
    pub generator_program: PathBuf,
    pub generator_args: Vec<String>,
    pub generator_workdir: Option<PathBuf>,
    pub artifact_root: PathBuf,
    pub generation_timeout: Duration,
    pub cors_allow_origin: Option<String>,
    pub max_body_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_allow_origin = lookup("CORS_ALLOW_ORIGIN").filter(|s| !s.trim().is_empty());

        let max_body_bytes = match lookup("MAX_BODY_BYTES") {
            Some(raw) => raw.parse::<usize>().map_err(|e| {
                ConfigError::InvalidValue("MAX_BODY_BYTES".to_string(), e.to_string())
            })?,
            None => 64 * 1024,
        };

        // --- Generator Settings ---
        let command = lookup("GENERATOR_COMMAND").unwrap_or_else(|| "./generate.sh".to_string());
        let mut parts = command.split_whitespace().map(str::to_string);
        let generator_program = parts
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingVar("GENERATOR_COMMAND".to_string()))?;
        let generator_args = parts.collect();

        let generator_workdir = lookup("GENERATOR_WORKDIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let artifact_root = lookup("ARTIFACT_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./temp"));

        let timeout_secs = match lookup("GENERATION_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("GENERATION_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            None => 900,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "GENERATION_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            log_level,
            generator_program,
            generator_args,
            generator_workdir,
            artifact_root,
            generation_timeout: Duration::from_secs(timeout_secs),
            cors_allow_origin,
            max_body_bytes,
        })
    }
}
