//! # Platform SeaORM
//!
//! SeaORM backing for the tenancy seams: a [`ConnectionManager`] that opens
//! PostgreSQL, MySQL or SQLite databases from resolved descriptors, and a
//! directory store over the `regions` and `businesses` tables.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use platform_seaorm::{ConnectionOptions, SeaOrmConnectionManager, SeaOrmDirectory};
//! use platform_tenancy::{TenancySettings, TenantDatabaseResolver};
//!
//! let settings = TenancySettings::from_env()?;
//! let connections = Arc::new(SeaOrmConnectionManager::new(ConnectionOptions::from_env()?, logger.clone()));
//!
//! let resolver = TenantDatabaseResolver::new(connections, Arc::new(SeaOrmDirectory::new()), logger)
//!     .with_settings(&settings);
//!
//! let tenant = resolver
//!     .open_tenant_database(settings.platform_props().with_business_id("biz_abc"))
//!     .await?;
//! let invoices = invoice::Entity::find().all(tenant.handle()).await?;
//! resolver.close_tenant_database(tenant).await;
//! ```
//!
//! ## Schema
//!
//! ```rust,ignore
//! let platform = connections.open(&settings.platform_props()).await?;
//! platform_seaorm::create_directory_schema(&platform).await?;
//! ```
//!
//! [`ConnectionManager`]: platform_tenancy::ConnectionManager

#![warn(clippy::all)]

mod config;
mod connection;
mod directory;
pub mod entity;
mod error;
mod schema;
mod url;

pub use config::*;
pub use connection::*;
pub use directory::*;
pub use schema::*;
pub use url::*;

/// Re-export of SeaORM.
pub use sea_orm;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ConnectionOptions, SeaOrmConnectionManager, SeaOrmDirectory, create_directory_schema,
        database_url,
    };
    pub use sea_orm::{DatabaseConnection, EntityTrait};
}
