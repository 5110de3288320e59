//! Testing utilities for the platform services.
//!
//! ## Features
//!
//! - 🎭 **RecordingConnectionManager** - Mock connections that record opens and closes
//! - 🗂️ **Fixtures** - Regions, businesses and a directory covering every resolution outcome
//! - ✅ **Assertions** - Leak and close-once checks
//!
//! ## Quick Start
//!
//! ```
//! use platform_testing::*;
//! use platform_tenancy::TenantDatabaseResolver;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let connections = RecordingConnectionManager::new();
//! let resolver = TenantDatabaseResolver::new(
//!     Arc::new(connections.clone()),
//!     Arc::new(seeded_directory()),
//!     platform_log::Logger::disabled(),
//! );
//!
//! let resolved = resolver
//!     .resolve_tenant_connection(platform_props().with_business_id("biz_iso"))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(resolved.name, "platformdb-biz_iso");
//! assert_opened(&connections, &["platformdb"]);
//! assert_no_leaked_connections(&connections);
//! # });
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock;

pub use assertions::*;
pub use fixtures::*;
pub use mock::*;
