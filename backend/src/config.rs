//! Configuration management for the store inventory service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with INV__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Record store configuration
    pub store: StoreConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// Which record store implementation to run against
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sheets,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// Spreadsheet holding the Users, Inward, Outward and Stock tabs
    pub spreadsheet_id: Option<String>,

    /// Path to the service account key file
    pub credentials_path: String,

    /// Sheets API base URL
    pub api_base_url: String,

    /// OAuth token endpoint override
    pub token_url: Option<String>,

    /// Per-request timeout for backend calls
    pub request_timeout_secs: u64,

    /// Password of the seeded "admin" user when running in memory
    pub memory_admin_password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("INV_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("store.backend", "sheets")?
            .set_default("store.credentials_path", "credentials.json")?
            .set_default("store.api_base_url", "https://sheets.googleapis.com/v4")?
            .set_default("store.request_timeout_secs", 15)?
            .set_default("store.memory_admin_password", "admin")?
            .set_default("jwt.access_token_expiry", 28800)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (INV_ prefix)
            .add_source(
                Environment::with_prefix("INV")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail later at request time
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".into()));
        }
        if self.jwt.access_token_expiry <= 0 {
            return Err(ConfigError::Message(
                "jwt.access_token_expiry must be positive".into(),
            ));
        }
        if self.store.backend == StoreBackend::Sheets && self.store.spreadsheet_id.is_none() {
            return Err(ConfigError::Message(
                "store.spreadsheet_id is required for the sheets backend".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            spreadsheet_id: None,
            credentials_path: "credentials.json".to_string(),
            api_base_url: "https://sheets.googleapis.com/v4".to_string(),
            token_url: None,
            request_timeout_secs: 15,
            memory_admin_password: "admin".to_string(),
        }
    }
}
