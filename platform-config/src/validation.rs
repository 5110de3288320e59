// Configuration validation

use crate::{ConfigError, Result};
use std::fmt::Display;

/// Implemented by typed settings loaded through
/// [`ConfigManager::load_validated`](crate::ConfigManager::load_validated).
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable field checks.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Reject empty or whitespace-only strings.
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::invalid(field, "cannot be empty"));
        }
        Ok(())
    }

    /// Require `min <= value <= max`.
    pub fn in_range<T: PartialOrd + Display>(value: T, min: T, max: T, field: &str) -> Result<()> {
        if value < min || value > max {
            return Err(ConfigError::invalid(
                field,
                format!("{} is outside {}..={}", value, min, max),
            ));
        }
        Ok(())
    }

    /// Require `value` to be one of `allowed`.
    pub fn one_of<T: PartialEq + Display>(value: &T, allowed: &[T], field: &str) -> Result<()> {
        if !allowed.contains(value) {
            return Err(ConfigError::invalid(field, format!("{} is not allowed", value)));
        }
        Ok(())
    }
}
