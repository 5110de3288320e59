//! Layered configuration for the platform services.
//!
//! Values from environment variables, `.env` files and JSON/TOML/env files
//! are merged into one key space (later loads win) and can be deserialized
//! into a typed, validated settings struct.
//!
//! ```
//! use platform_config::{ConfigManager, ConfigValidator, Validate};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Settings {
//!     db_server: String,
//! }
//!
//! impl Validate for Settings {
//!     fn validate(&self) -> platform_config::Result<()> {
//!         ConfigValidator::not_empty(&self.db_server, "db_server")
//!     }
//! }
//!
//! let manager = ConfigManager::new();
//! manager.set("db_server", "localhost").unwrap();
//! let settings: Settings = manager.load_validated().unwrap();
//! assert_eq!(settings.db_server, "localhost");
//! ```

pub mod config_service;
pub mod de;
pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use config_service::{ConfigService, ConfigServiceBuilder};
pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Thread-safe key/value configuration store.
#[derive(Clone, Default)]
pub struct ConfigManager {
    values: Arc<RwLock<BTreeMap<String, Value>>>,
    env_prefix: Option<String>,
}

impl ConfigManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager whose environment loads are restricted to `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            values: Arc::default(),
            env_prefix: Some(prefix.into()),
        }
    }

    /// Load matching environment variables.
    pub fn load_env(&self) -> Result<()> {
        let env_vars = EnvLoader::new(self.env_prefix.clone()).load();

        let mut values = self.values.write();
        for (key, value) in env_vars {
            values.insert(key, Value::String(value));
        }

        Ok(())
    }

    /// Load a `.env` file into the process environment, then reload variables.
    ///
    /// Without a path a missing `.env` in the working directory is ignored.
    pub fn load_dotenv(&self, path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::Load {
                    source_name: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        self.load_env()
    }

    /// Load a configuration file in the given format.
    ///
    /// Top-level keys are merged; nested objects are stored as-is.
    pub fn load_file(&self, path: impl AsRef<Path>, format: FileFormat) -> Result<()> {
        let data = ConfigLoader::new(format).load_file(path.as_ref())?;
        self.merge_value(data, &path.as_ref().display().to_string())
    }

    /// Load a configuration file, detecting its format from the extension.
    pub fn load_file_auto(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = ConfigLoader::auto(path.as_ref())?.load_file(path.as_ref())?;
        self.merge_value(data, &path.as_ref().display().to_string())
    }

    fn merge_value(&self, data: Value, source_name: &str) -> Result<()> {
        let Value::Object(map) = data else {
            return Err(ConfigError::Load {
                source_name: source_name.to_string(),
                reason: "top level is not a table".to_string(),
            });
        };

        self.values.write().extend(map);
        Ok(())
    }

    /// Set a configuration value
    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| ConfigError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        self.values.write().insert(key.to_string(), json_value);
        Ok(())
    }

    /// Get a typed configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .values
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value).map_err(|e| ConfigError::Deserialization(e.to_string()))
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Check if a key exists
    pub fn has(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    /// Get all configuration keys, sorted
    pub fn keys(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }

    /// Copy every value from `other`, overwriting existing keys.
    pub fn merge(&self, other: &ConfigManager) {
        if Arc::ptr_eq(&self.values, &other.values) {
            return;
        }
        let incoming = other.values.read().clone();
        self.values.write().extend(incoming);
    }

    /// Deserialize the whole key space into `T` and validate it.
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let object = Value::Object(self.values.read().clone().into_iter().collect());

        let settings: T = serde_json::from_value(object)
            .map_err(|e| ConfigError::Deserialization(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }
}
