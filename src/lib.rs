// Platform Services - region-based tenant database routing
//
// Each business (tenant) lives in a region with its own database server.
// This library resolves a business id to the database holding its data and
// opens it, with an explicit logger and typed errors at every step.

// Re-export the tenancy core
pub use platform_tenancy::*;

pub use platform_config;
pub use platform_log;
pub use platform_tenancy;

// Re-export optional crates
#[cfg(feature = "seaorm")]
pub use platform_seaorm;

#[cfg(feature = "testing")]
pub use platform_testing;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Business,
        ConnectionDescriptor,
        ConnectionManager,
        CreateBusinessRequest,
        CreateRegionRequest,
        DatabaseType,
        DirectoryFilter,
        DirectoryManager,
        DirectoryStore,
        ManagedDirectoryStore,
        Region,
        TenancyError,
        TenancySettings,
        TenantConnection,
        TenantDatabaseResolver,
    };
    pub use platform_log::{LogConfig, Logger};

    #[cfg(feature = "seaorm")]
    pub use platform_seaorm::{ConnectionOptions, SeaOrmConnectionManager, SeaOrmDirectory};
}
