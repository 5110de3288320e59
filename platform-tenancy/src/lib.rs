//! Tenant Database Resolution
//!
//! Each business (tenant) on the platform belongs to a region, and each region
//! has its own database server. This crate turns a business id into the
//! connection parameters of that business's database, optionally giving the
//! business a dedicated database named `<base>-<business_id>`.
//!
//! # Features
//!
//! - 🔍 **Resolution** - [`TenantDatabaseResolver`] looks up business and region
//! - 🗄️ **Database Per Tenant** - opt-in isolated databases per business
//! - 🔌 **Pluggable Connections** - bring your own [`ConnectionManager`]
//! - 📝 **Directory Administration** - [`DirectoryManager`] for regions and businesses
//! - ⏱️ **Deadlines** - optional timeout across the whole resolution
//!
//! # Quick Start
//!
//! ## 1. Implement a connection manager (or use `platform-seaorm`)
//!
//! ```rust,ignore
//! use platform_tenancy::*;
//!
//! struct MyConnections { /* pool settings */ }
//!
//! #[async_trait]
//! impl ConnectionManager for MyConnections {
//!     type Handle = MyConnection;
//!
//!     async fn open(&self, descriptor: &ConnectionDescriptor) -> Result<MyConnection, TenancyError> {
//!         MyConnection::connect(descriptor)
//!             .await
//!             .map_err(|e| TenancyError::connection_failure(descriptor, e.to_string()))
//!     }
//!
//!     async fn close(&self, handle: MyConnection) {
//!         handle.shutdown().await;
//!     }
//! }
//! ```
//!
//! ## 2. Resolve and open tenant databases
//!
//! ```rust,ignore
//! let settings = TenancySettings::from_env()?;
//! let resolver = TenantDatabaseResolver::new(connections, directory, logger).with_settings(&settings);
//!
//! let props = settings.platform_props().with_business_id("biz_abc");
//! let tenant = resolver.open_tenant_database(props).await?;
//! // ... work with tenant.handle()
//! resolver.close_tenant_database(tenant).await;
//! ```

pub mod connection;
pub mod descriptor;
pub mod directory;
pub mod error;
pub mod management;
pub mod memory;
pub mod model;
pub mod resolver;
pub mod settings;

pub use connection::{ConnectionManager, TenantConnection};
pub use descriptor::ConnectionDescriptor;
pub use directory::{DirectoryFilter, DirectoryStore, ManagedDirectoryStore};
pub use error::{RecordKind, TenancyError};
pub use management::{
    CreateBusinessRequest, CreateRegionRequest, DirectoryManager, UpdateBusinessRequest,
    UpdateRegionRequest, generate_business_id,
};
pub use memory::InMemoryDirectory;
pub use model::{Business, DatabaseType, Region, tenant_database_name};
pub use resolver::TenantDatabaseResolver;
pub use settings::TenancySettings;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::connection::{ConnectionManager, TenantConnection};
    pub use crate::descriptor::ConnectionDescriptor;
    pub use crate::directory::{DirectoryFilter, DirectoryStore, ManagedDirectoryStore};
    pub use crate::error::TenancyError;
    pub use crate::management::{
        CreateBusinessRequest, CreateRegionRequest, DirectoryManager, UpdateBusinessRequest,
        UpdateRegionRequest,
    };
    pub use crate::model::{Business, DatabaseType, Region};
    pub use crate::resolver::TenantDatabaseResolver;
    pub use crate::settings::TenancySettings;
}
