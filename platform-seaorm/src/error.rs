//! Mapping SeaORM errors onto tenancy errors.

use platform_tenancy::{ConnectionDescriptor, TenancyError};
use sea_orm::DbErr;

/// A failed directory statement.
pub(crate) fn directory_error(operation: &str, err: DbErr) -> TenancyError {
    TenancyError::Directory(format!("{}: {}", operation, err))
}

/// A failed connect to `target`.
pub(crate) fn connection_error(target: &ConnectionDescriptor, err: DbErr) -> TenancyError {
    let reason = match err {
        DbErr::Conn(inner) => inner.to_string(),
        other => other.to_string(),
    };
    TenancyError::connection_failure(target, reason)
}

/// A stored value that does not fit the model.
pub(crate) fn corrupt_row(table: &str, id: &str, reason: impl std::fmt::Display) -> TenancyError {
    TenancyError::Directory(format!("invalid {} row {}: {}", table, id, reason))
}
