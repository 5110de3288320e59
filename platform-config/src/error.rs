// Configuration errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration key not found: {0}")]
    KeyNotFound(String),

    #[error("failed to load {source_name}: {reason}")]
    Load { source_name: String, reason: String },

    #[error("failed to parse {format} configuration: {reason}")]
    Parse { format: &'static str, reason: String },

    #[error("invalid value for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("cannot serialize value for {key}: {reason}")]
    Serialization { key: String, reason: String },

    #[error("cannot deserialize configuration: {0}")]
    Deserialization(String),

    #[error("environment variable {key}: {source}")]
    Env {
        key: String,
        #[source]
        source: std::env::VarError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Shorthand for a validation failure on `field`.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
