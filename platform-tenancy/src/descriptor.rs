//! Connection descriptors
//!
//! A [`ConnectionDescriptor`] is both the resolver's input (platform
//! connection fields plus an optional business id) and its output (the
//! tenant's physical database).

use crate::model::DatabaseType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything needed to open one database.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    #[serde(default, deserialize_with = "platform_config::de::lenient")]
    pub db_type: DatabaseType,
    /// Host (and port) of the server, or the directory holding SQLite files
    pub server: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub secret: String,
    /// Database name
    pub name: String,
    /// Present when the connection is tenant-scoped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_id: Option<String>,
}

impl ConnectionDescriptor {
    /// Descriptor with no credentials and no tenant scope.
    pub fn new(db_type: DatabaseType, server: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            db_type,
            server: server.into(),
            user: String::new(),
            secret: String::new(),
            name: name.into(),
            business_id: None,
        }
    }

    pub fn with_credentials(mut self, user: impl Into<String>, secret: impl Into<String>) -> Self {
        self.user = user.into();
        self.secret = secret.into();
        self
    }

    /// Scope the descriptor to a business.
    pub fn with_business_id(mut self, business_id: impl Into<String>) -> Self {
        self.business_id = Some(business_id.into());
        self
    }

    /// Whether resolution will look this business up.
    pub fn is_tenant_scoped(&self) -> bool {
        self.business_id.is_some()
    }

    /// `server/name`, safe to log.
    pub fn target(&self) -> String {
        format!("{}/{}", self.server, self.name)
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = if self.secret.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("ConnectionDescriptor")
            .field("db_type", &self.db_type)
            .field("server", &self.server)
            .field("user", &self.user)
            .field("secret", &secret)
            .field("name", &self.name)
            .field("business_id", &self.business_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let props = ConnectionDescriptor::new(DatabaseType::MySql, "s1:3306", "platformdb")
            .with_credentials("svc", "pw")
            .with_business_id("biz_abc");

        assert!(props.is_tenant_scoped());
        assert_eq!(props.target(), "s1:3306/platformdb");
        assert_eq!(props.business_id.as_deref(), Some("biz_abc"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let props = ConnectionDescriptor::new(DatabaseType::Postgres, "s1", "db").with_credentials("svc", "hunter2");
        let debug = format!("{:?}", props);

        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_deserialize_config_bag() {
        let props: ConnectionDescriptor = serde_json::from_value(json!({
            "db_type": "PostgreSQL",
            "server": "s1",
            "name": "platformdb",
            "business_id": "biz_abc"
        }))
        .unwrap();

        assert_eq!(props.db_type, DatabaseType::Postgres);
        assert_eq!(props.user, "");
        assert_eq!(props.business_id.as_deref(), Some("biz_abc"));

        let platform: ConnectionDescriptor =
            serde_json::from_value(json!({"server": "s1", "name": "platformdb"})).unwrap();
        assert!(!platform.is_tenant_scoped());
        assert_eq!(platform.db_type, DatabaseType::Postgres);
    }
}
