//! Connection manager seam

use crate::descriptor::ConnectionDescriptor;
use crate::error::TenancyError;
use async_trait::async_trait;
use platform_log::{Logger, debug, warn};
use std::sync::Arc;

/// Opens and closes database handles.
///
/// `close` takes the handle by value, so a handle cannot be closed twice.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    /// Live connection handle.
    type Handle: Send + Sync + 'static;

    /// Open the database described by `descriptor`.
    ///
    /// Failures should be reported as [`TenancyError::ConnectionFailure`].
    async fn open(&self, descriptor: &ConnectionDescriptor) -> Result<Self::Handle, TenancyError>;

    /// Release a handle. Errors while closing are the manager's to report.
    async fn close(&self, handle: Self::Handle);
}

/// An open tenant database and the descriptor it was opened with.
#[derive(Debug)]
pub struct TenantConnection<H> {
    handle: H,
    descriptor: ConnectionDescriptor,
}

impl<H> TenantConnection<H> {
    pub fn new(handle: H, descriptor: ConnectionDescriptor) -> Self {
        Self { handle, descriptor }
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Descriptor used to open the handle.
    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    pub fn business_id(&self) -> Option<&str> {
        self.descriptor.business_id.as_deref()
    }

    pub fn into_parts(self) -> (H, ConnectionDescriptor) {
        (self.handle, self.descriptor)
    }
}

/// Owns an open handle and closes it exactly once.
///
/// [`close`](Self::close) releases the handle in place. If the guard is
/// dropped first (the owning future was cancelled, say), the close is
/// spawned onto the current Tokio runtime.
pub(crate) struct HandleGuard<M: ConnectionManager + 'static> {
    connections: Arc<M>,
    handle: Option<M::Handle>,
    logger: Logger,
}

impl<M: ConnectionManager + 'static> HandleGuard<M> {
    pub(crate) fn new(connections: Arc<M>, handle: M::Handle, logger: Logger) -> Self {
        Self {
            connections,
            handle: Some(handle),
            logger,
        }
    }

    pub(crate) fn handle(&self) -> &M::Handle {
        match self.handle {
            Some(ref handle) => handle,
            // only `close` and `drop` take the handle, and both consume the guard
            None => unreachable!("handle guard used after release"),
        }
    }

    pub(crate) async fn close(mut self) {
        if let Some(handle) = self.handle.take() {
            self.connections.close(handle).await;
        }
    }
}

impl<M: ConnectionManager + 'static> Drop for HandleGuard<M> {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                debug!(self.logger, "Closing abandoned connection in the background");
                let connections = Arc::clone(&self.connections);
                runtime.spawn(async move {
                    connections.close(handle).await;
                });
            }
            Err(_) => warn!(self.logger, "No runtime to close an abandoned connection, handle dropped"),
        }
    }
}
