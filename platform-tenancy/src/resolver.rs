//! Tenant Database Resolution
//!
//! Turns a configuration bag that may carry a business id into the
//! connection descriptor of that business's database.
//!
//! Resolution opens one platform connection, reads the business and its
//! region, and closes the platform connection again before returning,
//! whether or not the lookups succeeded. A cancelled call still closes it,
//! in a background task.

use crate::connection::{ConnectionManager, HandleGuard, TenantConnection};
use crate::descriptor::ConnectionDescriptor;
use crate::directory::DirectoryStore;
use crate::error::TenancyError;
use crate::model::{Business, Region, tenant_database_name};
use crate::settings::TenancySettings;
use platform_log::{Logger, debug, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Resolves and opens tenant databases.
///
/// # Examples
///
/// ```
/// use platform_log::Logger;
/// use platform_tenancy::{
///     Business, ConnectionDescriptor, ConnectionManager, DatabaseType, InMemoryDirectory, Region,
///     TenancyError, TenantDatabaseResolver,
/// };
/// use std::sync::Arc;
///
/// struct NoopConnections;
///
/// #[async_trait::async_trait]
/// impl ConnectionManager for NoopConnections {
///     type Handle = ();
///     async fn open(&self, _: &ConnectionDescriptor) -> Result<(), TenancyError> { Ok(()) }
///     async fn close(&self, _: ()) {}
/// }
///
/// # tokio_test::block_on(async {
/// let directory = InMemoryDirectory::new()
///     .with_region(Region::new("r1", "One", DatabaseType::Postgres).with_server("s1").with_database("platformdb"))
///     .with_business(Business::new("biz_abc", "Acme", "r1").with_tenant_database(true));
///
/// let resolver = TenantDatabaseResolver::new(Arc::new(NoopConnections), Arc::new(directory), Logger::disabled());
///
/// let props = ConnectionDescriptor::new(DatabaseType::Postgres, "s0", "platformdb").with_business_id("biz_abc");
/// let resolved = resolver.resolve_tenant_connection(props).await.unwrap();
/// assert_eq!(resolved.name, "platformdb-biz_abc");
/// # });
/// ```
pub struct TenantDatabaseResolver<M, D> {
    connections: Arc<M>,
    directory: Arc<D>,
    logger: Logger,
    timeout: Option<Duration>,
}

impl<M, D> TenantDatabaseResolver<M, D>
where
    M: ConnectionManager + 'static,
    D: DirectoryStore<M::Handle>,
{
    pub fn new(connections: Arc<M>, directory: Arc<D>, logger: Logger) -> Self {
        Self {
            connections,
            directory,
            logger: logger.with_target("platform::tenancy::resolver"),
            timeout: None,
        }
    }

    /// Bound each call (platform open, both lookups, tenant open) by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Apply the deadline from `settings`, if any.
    pub fn with_settings(mut self, settings: &TenancySettings) -> Self {
        self.timeout = settings.connect_timeout();
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn connections(&self) -> &Arc<M> {
        &self.connections
    }

    /// Resolve the descriptor for the business named in `props`.
    ///
    /// Without a business id, `props` is returned unchanged and the directory
    /// is not touched.
    pub async fn resolve_tenant_connection(
        &self,
        props: ConnectionDescriptor,
    ) -> Result<ConnectionDescriptor, TenancyError> {
        self.resolve_before(props, self.deadline()).await
    }

    /// Resolve `props`, then open the resulting database.
    ///
    /// Resolution errors are returned as-is and nothing is opened.
    pub async fn open_tenant_database(
        &self,
        props: ConnectionDescriptor,
    ) -> Result<TenantConnection<M::Handle>, TenancyError> {
        let deadline = self.deadline();
        let descriptor = self.resolve_before(props, deadline).await?;

        let handle = self
            .within(deadline, &descriptor, self.connections.open(&descriptor))
            .await
            .inspect_err(|e| warn!(self.logger, "Cannot open tenant database: {}", e))?;

        debug!(self.logger, "Opened database {}", descriptor.target());
        Ok(TenantConnection::new(handle, descriptor))
    }

    /// Close a connection returned by [`open_tenant_database`](Self::open_tenant_database).
    pub async fn close_tenant_database(&self, connection: TenantConnection<M::Handle>) {
        let (handle, descriptor) = connection.into_parts();
        self.connections.close(handle).await;
        debug!(self.logger, "Closed database {}", descriptor.target());
    }

    /// A timeout too large to represent means no deadline.
    fn deadline(&self) -> Option<Instant> {
        self.timeout.and_then(|timeout| Instant::now().checked_add(timeout))
    }

    async fn resolve_before(
        &self,
        props: ConnectionDescriptor,
        deadline: Option<Instant>,
    ) -> Result<ConnectionDescriptor, TenancyError> {
        let Some(business_id) = props.business_id.clone() else {
            debug!(self.logger, "No business_id, using {}", props.target());
            return Ok(props);
        };

        let lookup_id = business_id.trim().to_lowercase();
        if lookup_id.is_empty() {
            warn!(self.logger, "Rejecting blank business_id");
            return Err(TenancyError::InvalidBusinessId { business_id });
        }

        debug!(self.logger, "Resolving database for business {}", lookup_id);

        let platform = self
            .within(deadline, &props, self.connections.open(&props))
            .await
            .inspect_err(|e| warn!(self.logger, "Cannot open platform database: {}", e))?;
        let platform = HandleGuard::new(Arc::clone(&self.connections), platform, self.logger.clone());

        let lookup = self
            .within(deadline, &props, self.lookup(platform.handle(), &lookup_id))
            .await;
        platform.close().await;

        let (business, region) = lookup?;
        let name = tenant_database_name(&region.db_name, &business.business_id, business.is_tenant_db);

        debug!(
            self.logger,
            "Business {} resolved to region {} database {}/{}",
            business.business_id,
            region.region_id,
            region.db_server,
            name
        );

        Ok(ConnectionDescriptor {
            db_type: region.db_type,
            server: region.db_server,
            user: region.db_user,
            secret: region.db_secret,
            name,
            business_id: Some(business_id),
        })
    }

    async fn lookup(
        &self,
        platform: &M::Handle,
        business_id: &str,
    ) -> Result<(Business, Region), TenancyError> {
        let business = self
            .directory
            .get_business(platform, business_id)
            .await?
            .filter(|b| !b.is_deleted)
            .ok_or_else(|| {
                warn!(self.logger, "Unknown business {}", business_id);
                TenancyError::InvalidBusinessId {
                    business_id: business_id.to_string(),
                }
            })?;

        let region_id = business
            .region_ref()
            .ok_or_else(|| {
                warn!(self.logger, "Business {} has no region", business.business_id);
                TenancyError::RegionReferenceMissing {
                    business_id: business.business_id.clone(),
                }
            })?
            .to_lowercase();

        let region = self
            .directory
            .get_region(platform, &region_id)
            .await?
            .filter(|r| !r.is_deleted)
            .ok_or_else(|| {
                warn!(
                    self.logger,
                    "Business {} references unknown region {}", business.business_id, region_id
                );
                TenancyError::InvalidRegionId {
                    business_id: business.business_id.clone(),
                    region_id: region_id.clone(),
                }
            })?;

        Ok((business, region))
    }

    async fn within<T, F>(
        &self,
        deadline: Option<Instant>,
        target: &ConnectionDescriptor,
        fut: F,
    ) -> Result<T, TenancyError>
    where
        F: Future<Output = Result<T, TenancyError>>,
    {
        match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, fut).await {
                Ok(result) => result,
                Err(_) => Err(TenancyError::connection_failure(target, "timed out")),
            },
            None => fut.await,
        }
    }
}
