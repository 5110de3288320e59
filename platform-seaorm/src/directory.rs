//! Directory stored in the platform database.

use crate::entity::{business, region};
use crate::error::directory_error;
use async_trait::async_trait;
use platform_tenancy::{
    Business, DirectoryFilter, DirectoryStore, ManagedDirectoryStore, RecordKind, Region,
    TenancyError,
};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// [`ManagedDirectoryStore`] over the `regions` and `businesses` tables.
///
/// Identifiers are stored lowercase; lookups lowercase their argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeaOrmDirectory;

impl SeaOrmDirectory {
    pub fn new() -> Self {
        Self
    }
}

/// Case-insensitive substring match on region id or name.
fn region_search(search: &str) -> Condition {
    let search = search.to_lowercase();
    Condition::any()
        .add(region::Column::RegionId.contains(search.as_str()))
        .add(Expr::expr(Func::lower(Expr::col(region::Column::RegionName))).like(format!("%{}%", search)))
}

/// Case-insensitive substring match on business id or name.
fn business_search(search: &str) -> Condition {
    let search = search.to_lowercase();
    Condition::any()
        .add(business::Column::BusinessId.contains(search.as_str()))
        .add(Expr::expr(Func::lower(Expr::col(business::Column::BusinessName))).like(format!("%{}%", search)))
}

#[async_trait]
impl DirectoryStore<DatabaseConnection> for SeaOrmDirectory {
    async fn get_business(
        &self,
        conn: &DatabaseConnection,
        business_id: &str,
    ) -> Result<Option<Business>, TenancyError> {
        let model = business::Entity::find_by_id(business_id.to_lowercase())
            .one(conn)
            .await
            .map_err(|e| directory_error("get_business", e))?;
        Ok(model.map(Business::from))
    }

    async fn get_region(
        &self,
        conn: &DatabaseConnection,
        region_id: &str,
    ) -> Result<Option<Region>, TenancyError> {
        region::Entity::find_by_id(region_id.to_lowercase())
            .one(conn)
            .await
            .map_err(|e| directory_error("get_region", e))?
            .map(Region::try_from)
            .transpose()
    }
}

#[async_trait]
impl ManagedDirectoryStore<DatabaseConnection> for SeaOrmDirectory {
    async fn insert_region(&self, conn: &DatabaseConnection, region: &Region) -> Result<(), TenancyError> {
        if self.get_region(conn, &region.region_id).await?.is_some() {
            return Err(TenancyError::AlreadyExists {
                kind: RecordKind::Region,
                id: region.region_id.clone(),
            });
        }
        region::Entity::insert(region::ActiveModel::from(region))
            .exec_without_returning(conn)
            .await
            .map_err(|e| directory_error("insert_region", e))?;
        Ok(())
    }

    async fn update_region(&self, conn: &DatabaseConnection, region: &Region) -> Result<(), TenancyError> {
        let result = region::Entity::update_many()
            .set(region::ActiveModel::from(region))
            .filter(region::Column::RegionId.eq(region.region_id.as_str()))
            .exec(conn)
            .await
            .map_err(|e| directory_error("update_region", e))?;

        if result.rows_affected == 0 {
            return Err(TenancyError::NotFound {
                kind: RecordKind::Region,
                id: region.region_id.clone(),
            });
        }
        Ok(())
    }

    async fn delete_region(&self, conn: &DatabaseConnection, region_id: &str) -> Result<bool, TenancyError> {
        let result = region::Entity::delete_by_id(region_id.to_lowercase())
            .exec(conn)
            .await
            .map_err(|e| directory_error("delete_region", e))?;
        Ok(result.rows_affected > 0)
    }

    async fn list_regions(
        &self,
        conn: &DatabaseConnection,
        filter: &DirectoryFilter,
    ) -> Result<Vec<Region>, TenancyError> {
        let mut query = region::Entity::find();
        if !filter.include_deleted {
            query = query.filter(region::Column::IsDeleted.eq(false));
        }
        if let Some(ref search) = filter.search {
            query = query.filter(region_search(search));
        }

        query
            .order_by_asc(region::Column::RegionId)
            .offset(filter.offset)
            .limit(filter.limit)
            .all(conn)
            .await
            .map_err(|e| directory_error("list_regions", e))?
            .into_iter()
            .map(Region::try_from)
            .collect()
    }

    async fn insert_business(
        &self,
        conn: &DatabaseConnection,
        business: &Business,
    ) -> Result<(), TenancyError> {
        if self.get_business(conn, &business.business_id).await?.is_some() {
            return Err(TenancyError::AlreadyExists {
                kind: RecordKind::Business,
                id: business.business_id.clone(),
            });
        }
        business::Entity::insert(business::ActiveModel::from(business))
            .exec_without_returning(conn)
            .await
            .map_err(|e| directory_error("insert_business", e))?;
        Ok(())
    }

    async fn update_business(
        &self,
        conn: &DatabaseConnection,
        business: &Business,
    ) -> Result<(), TenancyError> {
        let result = business::Entity::update_many()
            .set(business::ActiveModel::from(business))
            .filter(business::Column::BusinessId.eq(business.business_id.as_str()))
            .exec(conn)
            .await
            .map_err(|e| directory_error("update_business", e))?;

        if result.rows_affected == 0 {
            return Err(TenancyError::NotFound {
                kind: RecordKind::Business,
                id: business.business_id.clone(),
            });
        }
        Ok(())
    }

    async fn delete_business(
        &self,
        conn: &DatabaseConnection,
        business_id: &str,
    ) -> Result<bool, TenancyError> {
        let result = business::Entity::delete_by_id(business_id.to_lowercase())
            .exec(conn)
            .await
            .map_err(|e| directory_error("delete_business", e))?;
        Ok(result.rows_affected > 0)
    }

    async fn list_businesses(
        &self,
        conn: &DatabaseConnection,
        filter: &DirectoryFilter,
    ) -> Result<Vec<Business>, TenancyError> {
        let mut query = business::Entity::find();
        if !filter.include_deleted {
            query = query.filter(business::Column::IsDeleted.eq(false));
        }
        if let Some(ref region_id) = filter.region_id {
            query = query.filter(business::Column::RegionId.eq(region_id.as_str()));
        }
        if let Some(ref search) = filter.search {
            query = query.filter(business_search(search));
        }

        let models = query
            .order_by_asc(business::Column::BusinessId)
            .offset(filter.offset)
            .limit(filter.limit)
            .all(conn)
            .await
            .map_err(|e| directory_error("list_businesses", e))?;

        Ok(models.into_iter().map(Business::from).collect())
    }
}
