//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which key-value backend the service persists to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// The hosted document store, a `kv` table in PostgreSQL.
    Hosted { database_url: String },
    /// A JSON file on the local disk.
    Local { path: PathBuf },
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub storage: StorageBackend,
    pub cors_origin: String,
    /// Adds the `Secure` attribute to session cookies. Off only for plain-HTTP development.
    pub secure_cookies: bool,
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

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
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

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());

        let secure_cookies = match lookup("COOKIE_SECURE") {
            Some(v) => v.trim().to_lowercase().parse::<bool>().map_err(|_| {
                ConfigError::InvalidValue(
                    "COOKIE_SECURE".to_string(),
                    format!("'{}' is not true or false", v),
                )
            })?,
            None => true,
        };

        // --- Storage Backend ---
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        let backend = lookup("STORAGE_BACKEND").map(|v| v.trim().to_lowercase());
        let storage = match (backend.as_deref(), database_url) {
            (Some("hosted"), Some(database_url)) | (None, Some(database_url)) => {
                StorageBackend::Hosted { database_url }
            }
            (Some("hosted"), None) => {
                return Err(ConfigError::MissingVar("DATABASE_URL".to_string()))
            }
            (Some("local"), _) | (None, None) => StorageBackend::Local {
                path: lookup("LOCAL_STORE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./data/kv.json")),
            },
            (Some(other), _) => {
                return Err(ConfigError::InvalidValue(
                    "STORAGE_BACKEND".to_string(),
                    format!("'{}' is not one of 'hosted' or 'local'", other),
                ))
            }
        };

        Ok(Self {
            bind_address,
            log_level,
            storage,
            cors_origin,
            secure_cookies,
        })
    }
}
