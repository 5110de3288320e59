//! Platform database settings
//!
//! Loaded through `platform-config`, normally from `PLATFORM_*` environment
//! variables or a `.env` file:
//!
//! | Key                    | Meaning                               |
//! |------------------------|---------------------------------------|
//! | `db_type`              | `postgres`, `mysql` or `sqlite`       |
//! | `db_server`            | platform database server              |
//! | `db_user`              | platform database user                |
//! | `db_secret`            | platform database secret              |
//! | `db_name`              | platform database name                |
//! | `connect_timeout_secs` | optional resolution deadline, 1..=300 |

use crate::descriptor::ConnectionDescriptor;
use crate::error::TenancyError;
use crate::model::DatabaseType;
use platform_config::de::{lenient, lenient_option};
use platform_config::{ConfigManager, ConfigService, ConfigValidator, Validate};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Environment prefix for platform settings.
pub const ENV_PREFIX: &str = "PLATFORM";

/// Settings for the platform database and resolution deadline.
#[derive(Clone, Deserialize)]
pub struct TenancySettings {
    #[serde(default, deserialize_with = "lenient")]
    pub db_type: DatabaseType,
    pub db_server: String,
    #[serde(default)]
    pub db_user: String,
    #[serde(default)]
    pub db_secret: String,
    pub db_name: String,
    #[serde(default, deserialize_with = "lenient_option")]
    pub connect_timeout_secs: Option<u64>,
}

impl TenancySettings {
    /// Load from `PLATFORM_*` environment variables.
    pub fn from_env() -> Result<Self, TenancyError> {
        let service = ConfigService::builder()
            .with_prefix(ENV_PREFIX)
            .load_env()
            .build()?;
        Ok(service.settings()?)
    }

    /// Load from a `.env` file, then the process environment.
    pub fn from_dotenv(path: Option<PathBuf>) -> Result<Self, TenancyError> {
        let service = ConfigService::builder()
            .with_prefix(ENV_PREFIX)
            .load_dotenv(path)
            .build()?;
        Ok(service.settings()?)
    }

    /// Load from an already populated configuration.
    pub fn from_config(config: &ConfigManager) -> Result<Self, TenancyError> {
        Ok(config.load_validated()?)
    }

    /// Connection fields for the platform database.
    pub fn platform_props(&self) -> ConnectionDescriptor {
        ConnectionDescriptor::new(self.db_type, self.db_server.clone(), self.db_name.clone())
            .with_credentials(self.db_user.clone(), self.db_secret.clone())
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

impl Validate for TenancySettings {
    fn validate(&self) -> platform_config::Result<()> {
        ConfigValidator::not_empty(&self.db_server, "db_server")?;
        ConfigValidator::not_empty(&self.db_name, "db_name")?;
        if let Some(secs) = self.connect_timeout_secs {
            ConfigValidator::in_range(secs, 1, 300, "connect_timeout_secs")?;
        }
        Ok(())
    }
}

impl fmt::Debug for TenancySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenancySettings")
            .field("db_type", &self.db_type)
            .field("db_server", &self.db_server)
            .field("db_user", &self.db_user)
            .field("db_name", &self.db_name)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish_non_exhaustive()
    }
}
