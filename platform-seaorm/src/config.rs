//! Pool options for SeaORM connections.

use platform_config::de::lenient;
use platform_config::{ConfigError, EnvLoader};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment prefix read by [`ConnectionOptions::from_env`].
pub const ENV_PREFIX: &str = "DATABASE";

/// Pool settings applied to every database opened by
/// [`SeaOrmConnectionManager`](crate::SeaOrmConnectionManager).
///
/// Connection targets come from resolved descriptors, so there is no URL here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionOptions {
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections", deserialize_with = "lenient")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections", deserialize_with = "lenient")]
    pub min_connections: u32,

    /// Connection timeout.
    #[serde(default = "default_connect_timeout", with = "secs")]
    pub connect_timeout: Duration,

    /// Idle timeout for connections.
    #[serde(default = "default_idle_timeout", with = "secs")]
    pub idle_timeout: Duration,

    /// Maximum lifetime of a connection.
    #[serde(default = "default_max_lifetime", with = "secs")]
    pub max_lifetime: Duration,

    /// Enable SQLx statement logging.
    #[serde(default, deserialize_with = "lenient")]
    pub sqlx_logging: bool,

    /// Level for SQLx statement logging.
    #[serde(default = "default_sqlx_log_level")]
    pub sqlx_log_level: String,

    /// Search path (PostgreSQL only).
    #[serde(default)]
    pub schema: Option<String>,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_idle_timeout() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_max_lifetime() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_sqlx_log_level() -> String {
    "debug".to_string()
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout: default_connect_timeout(),
            idle_timeout: default_idle_timeout(),
            max_lifetime: default_max_lifetime(),
            sqlx_logging: false,
            sqlx_log_level: default_sqlx_log_level(),
            schema: None,
        }
    }
}

impl ConnectionOptions {
    /// Read options from the environment, defaulting anything unset.
    ///
    /// - `DATABASE_MAX_CONNECTIONS`: Max connections (default: 10)
    /// - `DATABASE_MIN_CONNECTIONS`: Min connections (default: 1)
    /// - `DATABASE_CONNECT_TIMEOUT`: Connect timeout in seconds
    /// - `DATABASE_IDLE_TIMEOUT`: Idle timeout in seconds
    /// - `DATABASE_MAX_LIFETIME`: Connection lifetime in seconds
    /// - `DATABASE_SQLX_LOGGING`: Enable SQLx logging (true/false)
    /// - `DATABASE_SCHEMA`: PostgreSQL search path
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_loader(&EnvLoader::new(Some(ENV_PREFIX.to_string())))
    }

    fn from_loader(env: &EnvLoader) -> Result<Self, ConfigError> {
        let mut options = Self::default();

        if let Ok(max) = env.load_var("max_connections") {
            options.max_connections = parse(&max, "max_connections")?;
        }
        if let Ok(min) = env.load_var("min_connections") {
            options.min_connections = parse(&min, "min_connections")?;
        }
        if let Ok(secs) = env.load_var("connect_timeout") {
            options.connect_timeout = Duration::from_secs(parse(&secs, "connect_timeout")?);
        }
        if let Ok(secs) = env.load_var("idle_timeout") {
            options.idle_timeout = Duration::from_secs(parse(&secs, "idle_timeout")?);
        }
        if let Ok(secs) = env.load_var("max_lifetime") {
            options.max_lifetime = Duration::from_secs(parse(&secs, "max_lifetime")?);
        }
        if let Ok(logging) = env.load_var("sqlx_logging") {
            options.sqlx_logging = logging == "true" || logging == "1";
        }
        if let Ok(schema) = env.load_var("schema") {
            options.schema = Some(schema).filter(|s| !s.is_empty());
        }

        if options.min_connections > options.max_connections {
            return Err(ConfigError::invalid(
                "min_connections",
                "cannot exceed max_connections",
            ));
        }
        Ok(options)
    }

    /// Set the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enable or disable SQLx logging.
    pub fn sqlx_logging(mut self, enabled: bool) -> Self {
        self.sqlx_logging = enabled;
        self
    }

    /// Set the schema search path (PostgreSQL).
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// SeaORM options for connecting to `url`.
    pub fn to_connect_options(&self, url: &str) -> sea_orm::ConnectOptions {
        let mut options = sea_orm::ConnectOptions::new(url);

        options
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .sqlx_logging(self.sqlx_logging)
            .sqlx_logging_level(
                self.sqlx_log_level
                    .parse()
                    .unwrap_or(log::LevelFilter::Debug),
            );

        if let Some(ref schema) = self.schema {
            options.set_schema_search_path(schema.clone());
        }

        options
    }
}

fn parse<T: std::str::FromStr>(value: &str, field: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(field, format!("{} is not a valid number", value)))
}

/// Durations as whole seconds.
mod secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        platform_config::de::lenient::<D, u64>(deserializer).map(Duration::from_secs)
    }
}
