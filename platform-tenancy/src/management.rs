//! Directory Administration
//!
//! Create, read, update and delete regions and businesses in the platform
//! directory. A [`DirectoryManager`] holds one platform connection for its
//! whole lifetime; call [`DirectoryManager::end_service`] to release it.
//! Dropping the manager instead closes the connection in a background task.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! let manager = DirectoryManager::open(connections, store, &settings.platform_props(), logger).await?;
//!
//! manager
//!     .create_region(CreateRegionRequest::new("eu-west", "Europe West", DatabaseType::Postgres)
//!         .with_server("db.eu-west.internal")
//!         .with_database("platformdb"))
//!     .await?;
//!
//! let business = manager
//!     .create_business(CreateBusinessRequest::new("Acme").with_region("eu-west").with_tenant_database(true))
//!     .await?;
//!
//! manager.end_service().await;
//! ```

use crate::connection::{ConnectionManager, HandleGuard};
use crate::descriptor::ConnectionDescriptor;
use crate::directory::{DirectoryFilter, ManagedDirectoryStore};
use crate::error::{RecordKind, TenancyError};
use crate::model::{Business, DatabaseType, Region};
use chrono::Utc;
use platform_log::{Logger, debug, info, warn};
use serde::Deserialize;
use std::sync::Arc;

/// Prefix of generated business identifiers
pub const BUSINESS_ID_PREFIX: &str = "biz_";

/// Request to create a region
#[derive(Clone, Deserialize)]
pub struct CreateRegionRequest {
    pub region_id: String,
    pub region_name: String,
    pub db_type: DatabaseType,
    #[serde(default)]
    pub db_server: String,
    #[serde(default)]
    pub db_user: String,
    #[serde(default)]
    pub db_secret: String,
    #[serde(default)]
    pub db_name: String,
}

impl CreateRegionRequest {
    pub fn new(
        region_id: impl Into<String>,
        region_name: impl Into<String>,
        db_type: DatabaseType,
    ) -> Self {
        Self {
            region_id: region_id.into(),
            region_name: region_name.into(),
            db_type,
            db_server: String::new(),
            db_user: String::new(),
            db_secret: String::new(),
            db_name: String::new(),
        }
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.db_server = server.into();
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, secret: impl Into<String>) -> Self {
        self.db_user = user.into();
        self.db_secret = secret.into();
        self
    }

    pub fn with_database(mut self, name: impl Into<String>) -> Self {
        self.db_name = name.into();
        self
    }
}

/// Changes to a region. The id cannot change.
#[derive(Clone, Default, Deserialize)]
pub struct UpdateRegionRequest {
    pub region_name: Option<String>,
    pub db_type: Option<DatabaseType>,
    pub db_server: Option<String>,
    pub db_user: Option<String>,
    pub db_secret: Option<String>,
    pub db_name: Option<String>,
}

impl UpdateRegionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.region_name = Some(name.into());
        self
    }

    pub fn with_db_type(mut self, db_type: DatabaseType) -> Self {
        self.db_type = Some(db_type);
        self
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.db_server = Some(server.into());
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, secret: impl Into<String>) -> Self {
        self.db_user = Some(user.into());
        self.db_secret = Some(secret.into());
        self
    }

    pub fn with_database(mut self, name: impl Into<String>) -> Self {
        self.db_name = Some(name.into());
        self
    }

    fn apply(self, region: &mut Region) {
        if let Some(name) = self.region_name {
            region.region_name = name;
        }
        if let Some(db_type) = self.db_type {
            region.db_type = db_type;
        }
        if let Some(server) = self.db_server {
            region.db_server = server;
        }
        if let Some(user) = self.db_user {
            region.db_user = user;
        }
        if let Some(secret) = self.db_secret {
            region.db_secret = secret;
        }
        if let Some(name) = self.db_name {
            region.db_name = name;
        }
    }
}

/// Request to create a business
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBusinessRequest {
    /// Explicit id; generated when absent
    #[serde(default)]
    pub business_id: Option<String>,
    pub business_name: String,
    #[serde(default)]
    pub region_id: Option<String>,
    /// Give the business its own database
    #[serde(default)]
    pub is_tenant_db: bool,
}

impl CreateBusinessRequest {
    pub fn new(business_name: impl Into<String>) -> Self {
        Self {
            business_id: None,
            business_name: business_name.into(),
            region_id: None,
            is_tenant_db: false,
        }
    }

    pub fn with_id(mut self, business_id: impl Into<String>) -> Self {
        self.business_id = Some(business_id.into());
        self
    }

    pub fn with_region(mut self, region_id: impl Into<String>) -> Self {
        self.region_id = Some(region_id.into());
        self
    }

    pub fn with_tenant_database(mut self, is_tenant_db: bool) -> Self {
        self.is_tenant_db = is_tenant_db;
        self
    }
}

/// Changes to a business.
///
/// The id, region and tenant database flag are fixed at creation and have
/// no field here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBusinessRequest {
    pub business_name: Option<String>,
}

impl UpdateBusinessRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.business_name = Some(name.into());
        self
    }
}

/// Generate a business id: `biz_` followed by 20 hex characters.
pub fn generate_business_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("{}{}", BUSINESS_ID_PREFIX, &uuid[..20])
}

/// Administrative access to the region and business directory
///
/// Prefer [`end_service`](Self::end_service) over dropping: a dropped
/// manager can only schedule the close on the current Tokio runtime, and
/// nobody waits for it.
pub struct DirectoryManager<M: ConnectionManager + 'static, S> {
    store: Arc<S>,
    platform: HandleGuard<M>,
    logger: Logger,
}

impl<M, S> DirectoryManager<M, S>
where
    M: ConnectionManager + 'static,
    S: ManagedDirectoryStore<M::Handle>,
{
    /// Open the platform database described by `platform_props`.
    pub async fn open(
        connections: Arc<M>,
        store: Arc<S>,
        platform_props: &ConnectionDescriptor,
        logger: Logger,
    ) -> Result<Self, TenancyError> {
        let logger = logger.with_target("platform::tenancy::directory");
        let platform = connections.open(platform_props).await?;
        debug!(logger, "Directory service opened {}", platform_props.target());

        Ok(Self {
            store,
            platform: HandleGuard::new(connections, platform, logger.clone()),
            logger,
        })
    }

    /// Close the platform connection.
    pub async fn end_service(self) {
        let Self { platform, logger, .. } = self;
        platform.close().await;
        debug!(logger, "Directory service closed");
    }

    // ------------------------------------------------------------------------
    // Regions
    // ------------------------------------------------------------------------

    pub async fn create_region(&self, request: CreateRegionRequest) -> Result<Region, TenancyError> {
        let region_id = request.region_id.trim().to_lowercase();
        if region_id.is_empty() {
            return Err(TenancyError::Invalid("region_id is required".into()));
        }
        if request.region_name.trim().is_empty() {
            return Err(TenancyError::Invalid("region_name is required".into()));
        }

        if self.store.get_region(self.platform.handle(), &region_id).await?.is_some() {
            return Err(TenancyError::AlreadyExists {
                kind: RecordKind::Region,
                id: region_id,
            });
        }

        let region = Region::new(region_id, request.region_name, request.db_type)
            .with_server(request.db_server)
            .with_credentials(request.db_user, request.db_secret)
            .with_database(request.db_name);

        self.store.insert_region(self.platform.handle(), &region).await?;
        info!(self.logger, "Created region {}", region.region_id);
        Ok(region)
    }

    pub async fn get_region(&self, region_id: &str) -> Result<Option<Region>, TenancyError> {
        self.store
            .get_region(self.platform.handle(), &region_id.trim().to_lowercase())
            .await
    }

    pub async fn list_regions(&self, filter: &DirectoryFilter) -> Result<Vec<Region>, TenancyError> {
        self.store.list_regions(self.platform.handle(), filter).await
    }

    pub async fn update_region(
        &self,
        region_id: &str,
        request: UpdateRegionRequest,
    ) -> Result<Region, TenancyError> {
        let mut region = self.require_region(region_id).await?;
        request.apply(&mut region);
        if region.region_name.trim().is_empty() {
            return Err(TenancyError::Invalid("region_name cannot be empty".into()));
        }
        region.updated_at = Utc::now();

        self.store.update_region(self.platform.handle(), &region).await?;
        info!(self.logger, "Updated region {}", region.region_id);
        Ok(region)
    }

    /// Delete a region, soft unless `permanent`.
    ///
    /// Businesses still assigned to the region are left alone; their
    /// resolutions will fail with `InvalidRegionId`.
    pub async fn delete_region(&self, region_id: &str, permanent: bool) -> Result<(), TenancyError> {
        let mut region = self.require_region(region_id).await?;

        let referencing = self
            .store
            .list_businesses(
                self.platform.handle(),
                &DirectoryFilter::new()
                    .with_region(&region.region_id)
                    .with_pagination(0, 1),
            )
            .await?;
        if !referencing.is_empty() {
            warn!(
                self.logger,
                "Deleting region {} while businesses still reference it", region.region_id
            );
        }

        if permanent {
            self.store.delete_region(self.platform.handle(), &region.region_id).await?;
        } else {
            region.is_deleted = true;
            region.updated_at = Utc::now();
            self.store.update_region(self.platform.handle(), &region).await?;
        }

        info!(
            self.logger,
            "Deleted region {} (permanent: {})", region.region_id, permanent
        );
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Businesses
    // ------------------------------------------------------------------------

    pub async fn create_business(
        &self,
        request: CreateBusinessRequest,
    ) -> Result<Business, TenancyError> {
        if request.business_name.trim().is_empty() {
            return Err(TenancyError::Invalid("business_name is required".into()));
        }

        let business_id = match request.business_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_lowercase(),
            _ => generate_business_id(),
        };

        if self
            .store
            .get_business(self.platform.handle(), &business_id)
            .await?
            .is_some()
        {
            return Err(TenancyError::AlreadyExists {
                kind: RecordKind::Business,
                id: business_id,
            });
        }

        let region_id = request
            .region_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| TenancyError::Invalid("region_id is required".into()))?
            .to_lowercase();

        let region_usable = self
            .store
            .get_region(self.platform.handle(), &region_id)
            .await?
            .is_some_and(|r| !r.is_deleted);
        if !region_usable {
            return Err(TenancyError::InvalidRegionId {
                business_id,
                region_id,
            });
        }

        let business = Business::new(business_id, request.business_name, region_id)
            .with_tenant_database(request.is_tenant_db);

        self.store.insert_business(self.platform.handle(), &business).await?;
        info!(
            self.logger,
            "Created business {} in region {}",
            business.business_id,
            business.region_ref().unwrap_or_default()
        );
        Ok(business)
    }

    pub async fn get_business(&self, business_id: &str) -> Result<Option<Business>, TenancyError> {
        self.store
            .get_business(self.platform.handle(), &business_id.trim().to_lowercase())
            .await
    }

    pub async fn list_businesses(
        &self,
        filter: &DirectoryFilter,
    ) -> Result<Vec<Business>, TenancyError> {
        self.store.list_businesses(self.platform.handle(), filter).await
    }

    pub async fn update_business(
        &self,
        business_id: &str,
        request: UpdateBusinessRequest,
    ) -> Result<Business, TenancyError> {
        let mut business = self.require_business(business_id).await?;
        if let Some(name) = request.business_name {
            if name.trim().is_empty() {
                return Err(TenancyError::Invalid("business_name cannot be empty".into()));
            }
            business.business_name = name;
        }
        business.updated_at = Utc::now();

        self.store.update_business(self.platform.handle(), &business).await?;
        info!(self.logger, "Updated business {}", business.business_id);
        Ok(business)
    }

    /// Delete a business, soft unless `permanent`.
    ///
    /// A tenant database created for the business is not dropped.
    pub async fn delete_business(
        &self,
        business_id: &str,
        permanent: bool,
    ) -> Result<(), TenancyError> {
        let mut business = self.require_business(business_id).await?;

        if permanent {
            self.store
                .delete_business(self.platform.handle(), &business.business_id)
                .await?;
        } else {
            business.is_deleted = true;
            business.updated_at = Utc::now();
            self.store.update_business(self.platform.handle(), &business).await?;
        }

        info!(
            self.logger,
            "Deleted business {} (permanent: {})", business.business_id, permanent
        );
        Ok(())
    }

    async fn require_region(&self, region_id: &str) -> Result<Region, TenancyError> {
        self.get_region(region_id)
            .await?
            .ok_or_else(|| TenancyError::NotFound {
                kind: RecordKind::Region,
                id: region_id.to_lowercase(),
            })
    }

    async fn require_business(&self, business_id: &str) -> Result<Business, TenancyError> {
        self.get_business(business_id)
            .await?
            .ok_or_else(|| TenancyError::NotFound {
                kind: RecordKind::Business,
                id: business_id.to_lowercase(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_business_id() {
        let id = generate_business_id();

        assert!(id.starts_with(BUSINESS_ID_PREFIX));
        assert_eq!(id.len(), BUSINESS_ID_PREFIX.len() + 20);
        assert_eq!(id, id.to_lowercase());
        assert_ne!(id, generate_business_id());
    }

    #[test]
    fn test_update_region_request_applies_only_set_fields() {
        let mut region = Region::new("r1", "One", DatabaseType::Postgres)
            .with_server("s1")
            .with_database("platformdb");

        UpdateRegionRequest::new()
            .with_server("s2")
            .apply(&mut region);

        assert_eq!(region.db_server, "s2");
        assert_eq!(region.db_name, "platformdb");
        assert_eq!(region.region_name, "One");
    }

    #[test]
    fn test_create_business_request_from_json() {
        let request: CreateBusinessRequest = serde_json::from_value(serde_json::json!({
            "business_name": "Acme",
            "region_id": "r1",
            "is_tenant_db": true
        }))
        .unwrap();

        assert_eq!(request.business_id, None);
        assert!(request.is_tenant_db);
    }
}
