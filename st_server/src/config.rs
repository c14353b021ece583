//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use social_tournament::db::{DatabaseConfig, config::parse_env_or};
use std::net::SocketAddr;
use std::time::Duration;

/// Bind address used when neither `--bind` nor `SERVER_BIND` is given
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Upper bound for a join or settlement transaction
    pub transaction_timeout: Duration,
    /// Prometheus scrape address; metrics are disabled when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Create the ledger tables at startup
    pub init_schema: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `init_schema_flag` - `--init-schema` was passed
    ///
    /// # Errors
    ///
    /// Returns error if an address variable is set but cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        init_schema_flag: bool,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_addr("SERVER_BIND")?.unwrap_or(default_bind()),
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database = database.with_url(url);
        }

        let transaction_timeout = Duration::from_secs(parse_env_or(
            "LEDGER_TRANSACTION_TIMEOUT_SECS",
            social_tournament::db::timeouts::DEFAULT_TRANSACTION_TIMEOUT.as_secs(),
        ));

        Ok(ServerConfig {
            bind,
            database,
            transaction_timeout,
            metrics_bind: parse_addr("METRICS_BIND")?,
            init_schema: init_schema_flag || parse_env_or("INIT_SCHEMA", false),
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            });
        }

        if self.transaction_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "LEDGER_TRANSACTION_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Read an optional socket address; a set but malformed value is an error
fn parse_addr(key: &str) -> Result<Option<SocketAddr>, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value
            .parse::<SocketAddr>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                var: key.to_string(),
                reason: e.to_string(),
            }),
        _ => Ok(None),
    }
}
