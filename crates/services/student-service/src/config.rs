//! Student service configuration.

use std::env;

use common::DatabaseConfig;

/// Default tracing filter when neither `RUST_LOG` nor `LOG_LEVEL` is set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Student service configuration.
#[derive(Debug, Clone)]
pub struct StudentServiceConfig {
    /// Database connection settings
    pub database: DatabaseConfig,
    /// Tracing filter directive
    pub log_level: String,
}

impl StudentServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig::from_env("STUDENT_SERVICE"),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

impl Default for StudentServiceConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StudentServiceConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.database.max_connections, common::DEFAULT_MAX_CONNECTIONS);
    }
}
