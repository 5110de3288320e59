//! SeaORM connection manager.

use crate::config::ConnectionOptions;
use crate::error::connection_error;
use crate::url::{database_url, redacted_url};
use async_trait::async_trait;
use platform_log::{Logger, debug, info, warn};
use platform_tenancy::{ConnectionDescriptor, ConnectionManager, TenancyError};
use sea_orm::{ConnectionTrait, DatabaseConnection};

/// Opens one SeaORM pool per descriptor.
#[derive(Clone)]
pub struct SeaOrmConnectionManager {
    options: ConnectionOptions,
    logger: Logger,
}

impl SeaOrmConnectionManager {
    pub fn new(options: ConnectionOptions, logger: Logger) -> Self {
        Self {
            options,
            logger: logger.with_target("platform::seaorm"),
        }
    }

    /// Options read from `DATABASE_*` variables.
    pub fn from_env(logger: Logger) -> Result<Self, TenancyError> {
        Ok(Self::new(ConnectionOptions::from_env()?, logger))
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }
}

#[async_trait]
impl ConnectionManager for SeaOrmConnectionManager {
    type Handle = DatabaseConnection;

    async fn open(&self, descriptor: &ConnectionDescriptor) -> Result<DatabaseConnection, TenancyError> {
        debug!(self.logger, "Connecting to {}", redacted_url(descriptor));

        let options = self.options.to_connect_options(&database_url(descriptor));
        let conn = sea_orm::Database::connect(options)
            .await
            .map_err(|e| connection_error(descriptor, e))?;

        info!(
            self.logger,
            "Connected to {} ({})",
            descriptor.target(),
            descriptor.db_type
        );
        Ok(conn)
    }

    async fn close(&self, handle: DatabaseConnection) {
        let backend = handle.get_database_backend();
        match handle.close().await {
            Ok(()) => debug!(self.logger, "Closed {:?} connection", backend),
            Err(e) => warn!(self.logger, "Error closing {:?} connection: {}", backend, e),
        }
    }
}
