//! `regions` table.

use crate::error::corrupt_row;
use platform_tenancy::{Region, TenancyError};
use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "regions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub region_id: String,
    pub region_name: String,
    pub db_type: String,
    pub db_server: String,
    pub db_user: String,
    pub db_secret: String,
    pub db_name: String,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Region {
    type Error = TenancyError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let db_type = model
            .db_type
            .parse()
            .map_err(|e| corrupt_row("regions", &model.region_id, e))?;

        Ok(Region {
            region_id: model.region_id,
            region_name: model.region_name,
            db_type,
            db_server: model.db_server,
            db_user: model.db_user,
            db_secret: model.db_secret,
            db_name: model.db_name,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Region> for ActiveModel {
    fn from(region: &Region) -> Self {
        Self {
            region_id: Set(region.region_id.clone()),
            region_name: Set(region.region_name.clone()),
            db_type: Set(region.db_type.to_string()),
            db_server: Set(region.db_server.clone()),
            db_user: Set(region.db_user.clone()),
            db_secret: Set(region.db_secret.clone()),
            db_name: Set(region.db_name.clone()),
            is_deleted: Set(region.is_deleted),
            created_at: Set(region.created_at),
            updated_at: Set(region.updated_at),
        }
    }
}
