//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LEASEHOLD_DB_URL` - SurrealDB WebSocket address (e.g. `127.0.0.1:8000`)
//!
//! ## Optional
//! - `LEASEHOLD_DB_NAMESPACE` - Namespace (default: leasehold)
//! - `LEASEHOLD_DB_DATABASE` - Database (default: main)
//! - `LEASEHOLD_DB_USERNAME` - Root username (default: root)
//! - `LEASEHOLD_DB_PASSWORD` - Root password (default: root)
//! - `LEASEHOLD_COMPENSATE_FAILED_WRITES` - Undo committed steps of a
//!   failed multi-step write (default: true)
//! - `LEASEHOLD_DEFAULT_MAX_OCCUPANTS` - Capacity of apartments created
//!   without one (default: 3)

use leasehold_db::DbConfig;
use leasehold_tenancy::TenancyConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub tenancy: TenancyConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment, after loading a
    /// `.env` file if one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_defaults = DbConfig::default();
        let tenancy_defaults = TenancyConfig::default();

        let db = DbConfig {
            url: lookup("LEASEHOLD_DB_URL")
                .ok_or_else(|| ConfigError::MissingEnvVar("LEASEHOLD_DB_URL".to_string()))?,
            namespace: lookup("LEASEHOLD_DB_NAMESPACE").unwrap_or(db_defaults.namespace),
            database: lookup("LEASEHOLD_DB_DATABASE").unwrap_or(db_defaults.database),
            username: lookup("LEASEHOLD_DB_USERNAME").unwrap_or(db_defaults.username),
            password: lookup("LEASEHOLD_DB_PASSWORD").unwrap_or(db_defaults.password),
        };

        let compensate_failed_writes = match lookup("LEASEHOLD_COMPENSATE_FAILED_WRITES") {
            Some(value) => parse_bool("LEASEHOLD_COMPENSATE_FAILED_WRITES", &value)?,
            None => tenancy_defaults.compensate_failed_writes,
        };
        let default_max_occupants = match lookup("LEASEHOLD_DEFAULT_MAX_OCCUPANTS") {
            Some(value) => parse_capacity("LEASEHOLD_DEFAULT_MAX_OCCUPANTS", &value)?,
            None => tenancy_defaults.default_max_occupants,
        };

        Ok(Self {
            db,
            tenancy: TenancyConfig {
                compensate_failed_writes,
                default_max_occupants,
            },
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {other:?}"),
        )),
    }
}

fn parse_capacity(key: &str, value: &str) -> Result<u32, ConfigError> {
    let capacity = value
        .trim()
        .parse::<u32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if capacity == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be at least 1".to_string(),
        ));
    }
    Ok(capacity)
}
