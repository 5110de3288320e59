//! Database URLs from connection descriptors.

use platform_tenancy::{ConnectionDescriptor, DatabaseType};

/// Build the SeaORM URL for `descriptor`.
///
/// SQLite treats `server` as the directory holding `<name>.db` and creates the
/// file on first use. Credentials are percent-encoded and omitted when empty.
///
/// ```
/// use platform_seaorm::database_url;
/// use platform_tenancy::{ConnectionDescriptor, DatabaseType};
///
/// let d = ConnectionDescriptor::new(DatabaseType::Postgres, "s1:5432", "platformdb-biz_abc")
///     .with_credentials("svc", "p@ss");
/// assert_eq!(database_url(&d), "postgres://svc:p%40ss@s1:5432/platformdb-biz_abc");
/// ```
pub fn database_url(descriptor: &ConnectionDescriptor) -> String {
    match descriptor.db_type {
        DatabaseType::Sqlite => {
            let dir = descriptor.server.trim_end_matches('/');
            if dir.is_empty() {
                format!("sqlite://{}.db?mode=rwc", descriptor.name)
            } else {
                format!("sqlite://{}/{}.db?mode=rwc", dir, descriptor.name)
            }
        }
        DatabaseType::Postgres | DatabaseType::MySql => format!(
            "{}://{}{}/{}",
            descriptor.db_type.as_str(),
            userinfo(descriptor),
            descriptor.server,
            descriptor.name
        ),
    }
}

fn userinfo(descriptor: &ConnectionDescriptor) -> String {
    match (descriptor.user.is_empty(), descriptor.secret.is_empty()) {
        (true, _) => String::new(),
        (false, true) => format!("{}@", urlencoding::encode(&descriptor.user)),
        (false, false) => format!(
            "{}:{}@",
            urlencoding::encode(&descriptor.user),
            urlencoding::encode(&descriptor.secret)
        ),
    }
}

/// [`database_url`] with the secret masked, for logs.
pub fn redacted_url(descriptor: &ConnectionDescriptor) -> String {
    if descriptor.secret.is_empty() {
        return database_url(descriptor);
    }
    let mut masked = descriptor.clone();
    masked.secret = "***".to_string();
    database_url(&masked)
}
