// Mock connection manager for testing

use async_trait::async_trait;
use parking_lot::Mutex;
use platform_tenancy::{ConnectionDescriptor, ConnectionManager, TenancyError};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Handle returned by [`RecordingConnectionManager`].
///
/// Deliberately not `Clone`: one open, one close.
#[derive(Debug, PartialEq, Eq)]
pub struct MockConnection {
    pub id: u64,
    pub descriptor: ConnectionDescriptor,
}

impl MockConnection {
    /// Database this connection points at.
    pub fn database(&self) -> &str {
        &self.descriptor.name
    }
}

/// Something that happened to a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Opened { id: u64, database: String },
    OpenFailed { database: String },
    Closed { id: u64, database: String },
}

#[derive(Default)]
struct Recorder {
    next_id: AtomicU64,
    events: Mutex<Vec<ConnectionEvent>>,
    live: Mutex<BTreeMap<u64, String>>,
    failing: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
}

/// Connection manager that records every open and close.
///
/// Clones share the same record, so a test can keep one clone and hand
/// another to the code under test.
#[derive(Clone, Default)]
pub struct RecordingConnectionManager {
    inner: Arc<Recorder>,
}

impl RecordingConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make opens of database `name` fail with `ConnectionFailure`.
    pub fn fail_opens_for(self, name: impl Into<String>) -> Self {
        self.inner.failing.lock().insert(name.into());
        self
    }

    /// Sleep for `delay` before each open.
    pub fn with_open_delay(self, delay: Duration) -> Self {
        *self.inner.delay.lock() = Some(delay);
        self
    }

    /// Number of successful opens
    pub fn open_count(&self) -> usize {
        self.count(|e| matches!(e, ConnectionEvent::Opened { .. }))
    }

    /// Number of failed opens
    pub fn failed_open_count(&self) -> usize {
        self.count(|e| matches!(e, ConnectionEvent::OpenFailed { .. }))
    }

    pub fn close_count(&self) -> usize {
        self.count(|e| matches!(e, ConnectionEvent::Closed { .. }))
    }

    /// Databases successfully opened, in order.
    pub fn opened_databases(&self) -> Vec<String> {
        self.inner
            .events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ConnectionEvent::Opened { database, .. } => Some(database.clone()),
                _ => None,
            })
            .collect()
    }

    /// Databases of connections opened and not yet closed.
    pub fn open_connections(&self) -> Vec<String> {
        self.inner.live.lock().values().cloned().collect()
    }

    pub fn events(&self) -> Vec<ConnectionEvent> {
        self.inner.events.lock().clone()
    }

    /// Forget all recorded events. Failure and delay settings are kept.
    pub fn reset(&self) {
        self.inner.events.lock().clear();
        self.inner.live.lock().clear();
    }

    fn count(&self, pred: impl Fn(&ConnectionEvent) -> bool) -> usize {
        self.inner.events.lock().iter().filter(|e| pred(*e)).count()
    }
}

#[async_trait]
impl ConnectionManager for RecordingConnectionManager {
    type Handle = MockConnection;

    async fn open(&self, descriptor: &ConnectionDescriptor) -> Result<MockConnection, TenancyError> {
        let delay = *self.inner.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.inner.failing.lock().contains(&descriptor.name) {
            self.inner.events.lock().push(ConnectionEvent::OpenFailed {
                database: descriptor.name.clone(),
            });
            return Err(TenancyError::connection_failure(descriptor, "connection refused"));
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.live.lock().insert(id, descriptor.name.clone());
        self.inner.events.lock().push(ConnectionEvent::Opened {
            id,
            database: descriptor.name.clone(),
        });

        Ok(MockConnection {
            id,
            descriptor: descriptor.clone(),
        })
    }

    async fn close(&self, handle: MockConnection) {
        self.inner.live.lock().remove(&handle.id);
        self.inner.events.lock().push(ConnectionEvent::Closed {
            id: handle.id,
            database: handle.descriptor.name,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform_tenancy::DatabaseType;

    fn props(name: &str) -> ConnectionDescriptor {
        ConnectionDescriptor::new(DatabaseType::Postgres, "s1", name)
    }

    #[tokio::test]
    async fn test_records_open_and_close() {
        let manager = RecordingConnectionManager::new();

        let conn = manager.open(&props("platformdb")).await.unwrap();
        assert_eq!(conn.database(), "platformdb");
        assert_eq!(manager.open_connections(), vec!["platformdb".to_string()]);

        manager.close(conn).await;
        assert_eq!(manager.open_count(), 1);
        assert_eq!(manager.close_count(), 1);
        assert!(manager.open_connections().is_empty());
    }

    #[tokio::test]
    async fn test_failing_database() {
        let manager = RecordingConnectionManager::new().fail_opens_for("broken");

        let err = manager.open(&props("broken")).await.unwrap_err();
        assert!(matches!(err, TenancyError::ConnectionFailure { .. }));
        assert_eq!(manager.failed_open_count(), 1);
        assert_eq!(manager.open_count(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_record() {
        let manager = RecordingConnectionManager::new();
        let clone = manager.clone();

        let conn = clone.open(&props("a")).await.unwrap();
        clone.close(conn).await;

        assert_eq!(
            manager.events(),
            vec![
                ConnectionEvent::Opened { id: 1, database: "a".into() },
                ConnectionEvent::Closed { id: 1, database: "a".into() },
            ]
        );

        manager.reset();
        assert!(clone.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_delay() {
        let manager = RecordingConnectionManager::new().with_open_delay(Duration::from_secs(3));
        let started = tokio::time::Instant::now();

        let conn = manager.open(&props("slow")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(3));
        manager.close(conn).await;
    }
}
