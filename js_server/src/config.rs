//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use jungle_speed::table::TableConfig;
use std::{net::SocketAddr, time::Duration};

/// Port used when neither `SERVER_BIND` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 3001;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Configuration for the single game table
    pub table: TableConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if `SERVER_BIND` or `PORT` is set but malformed
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => resolve_bind(
                std::env::var("SERVER_BIND").ok().as_deref(),
                std::env::var("PORT").ok().as_deref(),
            )?,
        };

        let defaults = TableConfig::default();
        let table = TableConfig {
            name: std::env::var("TABLE_NAME").unwrap_or(defaults.name),
            grab_cooldown: Duration::from_millis(parse_env_or(
                "GRAB_COOLDOWN_MS",
                defaults.grab_cooldown.as_millis() as u64,
            )),
            inbox_capacity: parse_env_or("TABLE_INBOX_CAPACITY", defaults.inbox_capacity),
        };

        Ok(ServerConfig { bind, table })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table.validate().map_err(|reason| ConfigError::Invalid {
            var: "TABLE".to_string(),
            reason,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            table: TableConfig::default(),
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Pick the bind address from `SERVER_BIND`, falling back to `PORT` on
/// localhost and finally to [`DEFAULT_PORT`].
fn resolve_bind(server_bind: Option<&str>, port: Option<&str>) -> Result<SocketAddr, ConfigError> {
    if let Some(addr) = server_bind {
        return addr.parse().map_err(|_| ConfigError::Invalid {
            var: "SERVER_BIND".to_string(),
            reason: format!("'{addr}' is not an IP:PORT address"),
        });
    }

    let port = match port {
        Some(port) => port.parse::<u16>().map_err(|_| ConfigError::Invalid {
            var: "PORT".to_string(),
            reason: format!("'{port}' is not a port number"),
        })?,
        None => DEFAULT_PORT,
    };

    Ok(SocketAddr::from(([127, 0, 0, 1], port)))
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
