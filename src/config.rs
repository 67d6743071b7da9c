//! Configuration types.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Service configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Path to the libSQL database file.
    pub db_path: PathBuf,
    /// How long issued session tokens stay valid.
    pub session_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".parse().expect("static addr parses"),
            db_path: PathBuf::from("./data/taskboard.db"),
            session_ttl: Duration::from_secs(7 * 24 * 3600), // 7 days
        }
    }
}

impl AppConfig {
    /// Build a config from environment variables, falling back to defaults.
    ///
    /// - `TASKBOARD_ADDR` — bind address, e.g. `0.0.0.0:8080`
    /// - `TASKBOARD_DB_PATH` — database file path
    /// - `TASKBOARD_SESSION_TTL_DAYS` — session lifetime in days
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("TASKBOARD_ADDR") {
            config.bind_addr = addr.parse().map_err(|e| ConfigError::InvalidValue {
                key: "TASKBOARD_ADDR".to_string(),
                message: format!("{e}"),
            })?;
        }

        if let Ok(path) = std::env::var("TASKBOARD_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Ok(days) = std::env::var("TASKBOARD_SESSION_TTL_DAYS") {
            let days: u64 = days.parse().map_err(|e| ConfigError::InvalidValue {
                key: "TASKBOARD_SESSION_TTL_DAYS".to_string(),
                message: format!("{e}"),
            })?;
            config.session_ttl = Duration::from_secs(days * 24 * 3600);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.session_ttl, Duration::from_secs(604_800));
    }
}
