//! Directory table creation.

use crate::entity::{business, region};
use crate::error::directory_error;
use platform_tenancy::TenancyError;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Schema};

/// Create the `regions` and `businesses` tables if they do not exist.
pub async fn create_directory_schema(conn: &DatabaseConnection) -> Result<(), TenancyError> {
    create_table(conn, region::Entity).await?;
    create_table(conn, business::Entity).await
}

async fn create_table<E: EntityTrait>(conn: &DatabaseConnection, entity: E) -> Result<(), TenancyError> {
    let backend = conn.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(entity);
    statement.if_not_exists();

    conn.execute(backend.build(&statement))
        .await
        .map_err(|e| directory_error("create_directory_schema", e))?;
    Ok(())
}
