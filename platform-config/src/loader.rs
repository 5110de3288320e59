// Configuration file loaders

use crate::{ConfigError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            FileFormat::Json => "JSON",
            FileFormat::Toml => "TOML",
            FileFormat::Env => "env",
        }
    }
}

/// Parses configuration files into a flat-or-nested JSON object.
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::Load {
                source_name: path.display().to_string(),
                reason: "no file extension".to_string(),
            })?;

        let format = FileFormat::from_extension(ext).ok_or_else(|| ConfigError::Load {
            source_name: path.display().to_string(),
            reason: format!("unsupported format: {}", ext),
        })?;

        Ok(Self::new(format))
    }

    /// Load configuration from file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Load {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        })?;

        self.parse(&content)
    }

    /// Parse configuration from string
    pub fn parse(&self, content: &str) -> Result<Value> {
        let parse_error = |reason: String| ConfigError::Parse {
            format: self.format.name(),
            reason,
        };

        match self.format {
            FileFormat::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
            FileFormat::Toml => {
                let table: toml::Table =
                    toml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
                serde_json::to_value(table).map_err(|e| parse_error(e.to_string()))
            }
            FileFormat::Env => Ok(parse_env(content)),
        }
    }
}

fn parse_env(content: &str) -> Value {
    let mut map = serde_json::Map::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            map.insert(
                key.trim().to_lowercase(),
                Value::String(value.to_string()),
            );
        }
    }

    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::new(FileFormat::Json);
        let result = loader
            .parse(r#"{"db_server": "localhost", "connect_timeout_secs": 5}"#)
            .unwrap();

        assert_eq!(result["db_server"], "localhost");
        assert_eq!(result["connect_timeout_secs"], 5);
    }

    #[test]
    fn test_parse_toml() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        let result = loader
            .parse(
                r#"
                db_type = "postgres"
                connect_timeout_secs = 10
            "#,
            )
            .unwrap();

        assert_eq!(result["db_type"], "postgres");
        assert_eq!(result["connect_timeout_secs"], 10);
    }

    #[test]
    fn test_parse_env() {
        let loader = ConfigLoader::new(FileFormat::Env);
        let result = loader
            .parse(
                r#"
                DB_SERVER=localhost
                # Comment
                DB_SECRET="quoted value"
            "#,
            )
            .unwrap();

        assert_eq!(result["db_server"], "localhost");
        assert_eq!(result["db_secret"], "quoted value");
    }

    #[test]
    fn test_parse_error_names_format() {
        let loader = ConfigLoader::new(FileFormat::Json);
        let err = loader.parse("{not json").unwrap_err();
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("env"), Some(FileFormat::Env));
        assert_eq!(FileFormat::from_extension("yaml"), None);
        assert!(ConfigLoader::auto("settings").is_err());
    }
}
