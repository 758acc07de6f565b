//! Configuration for the convos service.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::convos::core::errors::ConfigError;

/// Environment variable holding the `SQLite` database path.
pub const DB_PATH_ENV: &str = "CONVOS_DB_PATH";
/// Environment variable holding the HTTP port.
pub const PORT_ENV: &str = "CONVOS_PORT";

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConvosConfig {
    /// Storage settings.
    pub storage: StorageConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
}

impl ConvosConfig {
    /// Build a configuration from the process environment, falling back to defaults.
    ///
    /// # Errors
    /// Returns an error if a variable is set but cannot be parsed, or if the
    /// resulting configuration is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            config.storage.sqlite_path = PathBuf::from(path);
        }

        if let Ok(raw) = std::env::var(PORT_ENV) {
            config.server.port = raw.parse().map_err(|_| ConfigError::InvalidEnv {
                name: PORT_ENV,
                value: raw.clone(),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.sqlite_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.sqlite_path must not be empty".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be > 0".to_string()));
        }

        Ok(())
    }
}

/// Storage settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `SQLite` database path. `:memory:` opens a private in-memory database.
    pub sqlite_path: PathBuf,
}

impl StorageConfig {
    /// Path value that selects an in-memory database.
    pub const IN_MEMORY: &'static str = ":memory:";

    /// Settings for a private in-memory database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            sqlite_path: PathBuf::from(Self::IN_MEMORY),
        }
    }

    /// True when the path selects an in-memory database.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.sqlite_path.as_os_str() == Self::IN_MEMORY
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("convos.sqlite"),
        }
    }
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}
