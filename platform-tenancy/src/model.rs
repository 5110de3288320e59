//! Directory records
//!
//! Regions carry the physical connection parameters. Businesses (tenants)
//! point at exactly one region and may ask for an isolated database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Database engine behind a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    Postgres,
    MySql,
    Sqlite,
}

impl DatabaseType {
    /// Canonical lowercase name, also used as the URL scheme.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "mysql" => Ok(Self::MySql),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown database type: {}", other)),
        }
    }
}

/// A deployment region and the database that serves it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Lowercase region identifier
    pub region_id: String,
    pub region_name: String,
    pub db_type: DatabaseType,
    pub db_server: String,
    pub db_user: String,
    pub db_secret: String,
    /// Base database name; tenant databases append `-<business_id>`
    pub db_name: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Region {
    /// Create a live region with empty connection parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use platform_tenancy::{DatabaseType, Region};
    ///
    /// let region = Region::new("eu-west", "Europe West", DatabaseType::Postgres)
    ///     .with_server("db.eu-west.internal")
    ///     .with_database("platformdb");
    /// assert_eq!(region.db_name, "platformdb");
    /// ```
    pub fn new(
        region_id: impl Into<String>,
        region_name: impl Into<String>,
        db_type: DatabaseType,
    ) -> Self {
        let now = Utc::now();
        Self {
            region_id: region_id.into().to_lowercase(),
            region_name: region_name.into(),
            db_type,
            db_server: String::new(),
            db_user: String::new(),
            db_secret: String::new(),
            db_name: String::new(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.db_server = server.into();
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, secret: impl Into<String>) -> Self {
        self.db_user = user.into();
        self.db_secret = secret.into();
        self
    }

    pub fn with_database(mut self, name: impl Into<String>) -> Self {
        self.db_name = name.into();
        self
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("region_id", &self.region_id)
            .field("region_name", &self.region_name)
            .field("db_type", &self.db_type)
            .field("db_server", &self.db_server)
            .field("db_user", &self.db_user)
            .field("db_secret", &"<redacted>")
            .field("db_name", &self.db_name)
            .field("is_deleted", &self.is_deleted)
            .finish_non_exhaustive()
    }
}

/// A tenant of the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    /// Lowercase business identifier
    pub business_id: String,
    pub business_name: String,
    /// Assigned region. Stored rows may lack it even though creation requires it.
    pub region_id: Option<String>,
    /// Whether the tenant's data lives in its own database
    pub is_tenant_db: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Business {
    /// Create a live business assigned to `region_id`.
    pub fn new(
        business_id: impl Into<String>,
        business_name: impl Into<String>,
        region_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            business_id: business_id.into().to_lowercase(),
            business_name: business_name.into(),
            region_id: Some(region_id.into().to_lowercase()),
            is_tenant_db: false,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_tenant_database(mut self, is_tenant_db: bool) -> Self {
        self.is_tenant_db = is_tenant_db;
        self
    }

    /// Region reference, if present and non-blank.
    pub fn region_ref(&self) -> Option<&str> {
        self.region_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Physical database name for a business in a region whose base database is `base`.
///
/// ```
/// use platform_tenancy::tenant_database_name;
///
/// assert_eq!(tenant_database_name("platformdb", "biz_abc", false), "platformdb");
/// assert_eq!(tenant_database_name("platformdb", "biz_abc", true), "platformdb-biz_abc");
/// ```
pub fn tenant_database_name(base: &str, business_id: &str, is_tenant_db: bool) -> String {
    if is_tenant_db {
        format!("{}-{}", base, business_id)
    } else {
        base.to_string()
    }
}
