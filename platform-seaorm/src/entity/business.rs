//! `businesses` table.

use platform_tenancy::Business;
use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "businesses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub business_id: String,
    pub business_name: String,
    pub region_id: Option<String>,
    pub is_tenant_db: bool,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Business {
    fn from(model: Model) -> Self {
        Business {
            business_id: model.business_id,
            business_name: model.business_name,
            region_id: model.region_id,
            is_tenant_db: model.is_tenant_db,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Business> for ActiveModel {
    fn from(business: &Business) -> Self {
        Self {
            business_id: Set(business.business_id.clone()),
            business_name: Set(business.business_name.clone()),
            region_id: Set(business.region_id.clone()),
            is_tenant_db: Set(business.is_tenant_db),
            is_deleted: Set(business.is_deleted),
            created_at: Set(business.created_at),
            updated_at: Set(business.updated_at),
        }
    }
}
