//! Tenancy errors
//!
//! Every resolution failure has its own variant so callers can tell an
//! unknown tenant from a broken region reference or an unreachable server.

use crate::descriptor::ConnectionDescriptor;
use platform_config::ConfigError;

/// Kind of directory record, used in administrative errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A region record
    Region,
    /// A business (tenant) record
    Business,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Region => write!(f, "region"),
            Self::Business => write!(f, "business"),
        }
    }
}

/// Errors raised while resolving or administering tenant databases.
#[derive(Debug, thiserror::Error)]
pub enum TenancyError {
    /// The business identifier is not in the directory.
    #[error("invalid business_id: {business_id} does not exist")]
    InvalidBusinessId { business_id: String },

    /// The business record has no usable region reference.
    #[error("business {business_id} has no region reference")]
    RegionReferenceMissing { business_id: String },

    /// The region referenced by a business is not in the directory.
    #[error("invalid region_id: {region_id} (referenced by business {business_id}) does not exist")]
    InvalidRegionId {
        business_id: String,
        region_id: String,
    },

    /// Opening a platform or tenant database failed.
    #[error("cannot open database {database} on {server}: {reason}")]
    ConnectionFailure {
        server: String,
        database: String,
        reason: String,
    },

    /// A directory query itself failed.
    #[error("directory query failed: {0}")]
    Directory(String),

    /// An administrative request was rejected.
    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: RecordKind, id: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TenancyError {
    /// Connection failure against the database described by `target`.
    pub fn connection_failure(target: &ConnectionDescriptor, reason: impl Into<String>) -> Self {
        Self::ConnectionFailure {
            server: target.server.clone(),
            database: target.name.clone(),
            reason: reason.into(),
        }
    }

    /// Whether the error means the business cannot be used at all, as opposed
    /// to an infrastructure failure that may succeed later.
    pub fn is_tenant_unusable(&self) -> bool {
        matches!(
            self,
            Self::InvalidBusinessId { .. }
                | Self::RegionReferenceMissing { .. }
                | Self::InvalidRegionId { .. }
        )
    }
}
