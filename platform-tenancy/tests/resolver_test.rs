//! Resolution against the seeded directory and a recording connection manager.

use async_trait::async_trait;
use platform_log::Logger;
use platform_tenancy::*;
use platform_testing::*;
use std::sync::Arc;
use std::time::Duration;

fn setup() -> (
    RecordingConnectionManager,
    Arc<InMemoryDirectory>,
    TenantDatabaseResolver<RecordingConnectionManager, InMemoryDirectory>,
) {
    let connections = RecordingConnectionManager::new();
    let directory = Arc::new(seeded_directory());
    let resolver = TenantDatabaseResolver::new(
        Arc::new(connections.clone()),
        directory.clone(),
        Logger::disabled(),
    );
    (connections, directory, resolver)
}

fn tenant_props(business_id: &str) -> ConnectionDescriptor {
    platform_props().with_business_id(business_id)
}

#[tokio::test]
async fn test_shared_database_uses_region_base_name() {
    let (connections, _, resolver) = setup();

    let resolved = resolver
        .resolve_tenant_connection(tenant_props("biz_abc"))
        .await
        .unwrap();

    assert_eq!(resolved.server, REGION_SERVER);
    assert_eq!(resolved.name, "platformdb");
    assert_eq!(resolved.secret, REGION_SECRET);
    assert_eq!(resolved.business_id.as_deref(), Some("biz_abc"));

    assert_opened(&connections, &[PLATFORM_DB]);
    assert_closed_exactly_once(&connections);
}

#[tokio::test]
async fn test_isolated_database_appends_business_id() {
    let (connections, _, resolver) = setup();

    let resolved = resolver
        .resolve_tenant_connection(tenant_props("biz_iso"))
        .await
        .unwrap();

    assert_eq!(resolved.name, "platformdb-biz_iso");
    assert_eq!(connections.open_count(), 1);
    assert_eq!(connections.close_count(), 1);
}

#[tokio::test]
async fn test_business_id_lookup_is_case_insensitive() {
    let (_, _, resolver) = setup();

    let resolved = resolver
        .resolve_tenant_connection(tenant_props("BIZ_ISO"))
        .await
        .unwrap();

    assert_eq!(resolved.name, "platformdb-biz_iso");
    assert_eq!(resolved.business_id.as_deref(), Some("BIZ_ISO"));
}

#[tokio::test]
async fn test_unknown_business_skips_region_lookup() {
    let (connections, directory, resolver) = setup();

    let err = resolver
        .resolve_tenant_connection(tenant_props("biz_missing"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TenancyError::InvalidBusinessId { ref business_id } if business_id == "biz_missing"
    ));
    assert_eq!(directory.business_lookups(), 1);
    assert_eq!(directory.region_lookups(), 0);
    assert_opened(&connections, &[PLATFORM_DB]);
    assert_closed_exactly_once(&connections);
    assert_no_leaked_connections(&connections);
}

#[tokio::test]
async fn test_soft_deleted_business_is_invalid() {
    let (_, _, resolver) = setup();

    let err = resolver
        .resolve_tenant_connection(tenant_props("biz_gone"))
        .await
        .unwrap_err();

    assert!(matches!(err, TenancyError::InvalidBusinessId { .. }));
}

#[tokio::test]
async fn test_missing_region_reference() {
    let (connections, directory, resolver) = setup();

    let err = resolver
        .resolve_tenant_connection(tenant_props("biz_noregion"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TenancyError::RegionReferenceMissing { ref business_id } if business_id == "biz_noregion"
    ));
    assert_eq!(directory.region_lookups(), 0);
    assert_no_leaked_connections(&connections);
}

#[tokio::test]
async fn test_unknown_region() {
    let (connections, _, resolver) = setup();

    let err = resolver
        .resolve_tenant_connection(tenant_props("biz_orphan"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TenancyError::InvalidRegionId { ref region_id, .. } if region_id == "r9"
    ));
    assert!(err.is_tenant_unusable());
    assert_closed_exactly_once(&connections);
}

#[tokio::test]
async fn test_soft_deleted_region_is_invalid() {
    let (_, _, resolver) = setup();

    let err = resolver
        .resolve_tenant_connection(tenant_props("biz_stale"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TenancyError::InvalidRegionId { ref region_id, .. } if region_id == "r_old"
    ));
}

#[tokio::test]
async fn test_platform_props_pass_through_untouched() {
    let (connections, directory, resolver) = setup();

    let resolved = resolver.resolve_tenant_connection(platform_props()).await.unwrap();

    assert_eq!(resolved, platform_props());
    assert_eq!(connections.open_count(), 0);
    assert_eq!(directory.business_lookups(), 0);
}

#[tokio::test]
async fn test_platform_open_failure() {
    let connections = RecordingConnectionManager::new().fail_opens_for(PLATFORM_DB);
    let directory = Arc::new(seeded_directory());
    let resolver =
        TenantDatabaseResolver::new(Arc::new(connections.clone()), directory.clone(), Logger::disabled());

    let err = resolver
        .resolve_tenant_connection(tenant_props("biz_abc"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TenancyError::ConnectionFailure { ref database, .. } if database == PLATFORM_DB
    ));
    assert_eq!(directory.business_lookups(), 0);
    assert_eq!(connections.close_count(), 0);
}

#[tokio::test]
async fn test_open_tenant_database() {
    let (connections, _, resolver) = setup();

    let tenant = resolver
        .open_tenant_database(tenant_props("biz_iso"))
        .await
        .unwrap();

    assert_eq!(tenant.handle().database(), "platformdb-biz_iso");
    assert_eq!(tenant.descriptor().name, "platformdb-biz_iso");
    assert_eq!(connections.open_connections(), vec!["platformdb-biz_iso".to_string()]);

    resolver.close_tenant_database(tenant).await;
    assert_opened(&connections, &[PLATFORM_DB, "platformdb-biz_iso"]);
    assert_closed_exactly_once(&connections);
    assert_no_leaked_connections(&connections);
}

#[tokio::test]
async fn test_open_tenant_database_without_business_opens_platform() {
    let (connections, _, resolver) = setup();

    let conn = resolver.open_tenant_database(platform_props()).await.unwrap();

    assert_eq!(conn.business_id(), None);
    assert_opened(&connections, &[PLATFORM_DB]);
    resolver.close_tenant_database(conn).await;
}

#[tokio::test]
async fn test_open_is_not_attempted_after_resolution_failure() {
    let (connections, _, resolver) = setup();

    let err = resolver
        .open_tenant_database(tenant_props("biz_orphan"))
        .await
        .unwrap_err();

    assert!(matches!(err, TenancyError::InvalidRegionId { .. }));
    assert_opened(&connections, &[PLATFORM_DB]);
}

#[tokio::test]
async fn test_tenant_open_failure_propagates() {
    let connections = RecordingConnectionManager::new().fail_opens_for("platformdb-biz_iso");
    let resolver = TenantDatabaseResolver::new(
        Arc::new(connections.clone()),
        Arc::new(seeded_directory()),
        Logger::disabled(),
    );

    let err = resolver
        .open_tenant_database(tenant_props("biz_iso"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TenancyError::ConnectionFailure { ref server, .. } if server == REGION_SERVER
    ));
    assert_eq!(connections.failed_open_count(), 1);
    assert_no_leaked_connections(&connections);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_on_slow_platform_open() {
    let connections = RecordingConnectionManager::new().with_open_delay(Duration::from_secs(10));
    let resolver = TenantDatabaseResolver::new(
        Arc::new(connections.clone()),
        Arc::new(seeded_directory()),
        Logger::disabled(),
    )
    .with_timeout(Duration::from_secs(2));

    let err = resolver
        .resolve_tenant_connection(tenant_props("biz_abc"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TenancyError::ConnectionFailure { ref reason, .. } if reason == "timed out"
    ));
    assert_eq!(connections.open_count(), 0);
    assert_no_leaked_connections(&connections);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_covers_tenant_open() {
    // Each open takes 3s: the platform open fits in 5s, the tenant open does not.
    let connections = RecordingConnectionManager::new().with_open_delay(Duration::from_secs(3));
    let resolver = TenantDatabaseResolver::new(
        Arc::new(connections.clone()),
        Arc::new(seeded_directory()),
        Logger::disabled(),
    )
    .with_timeout(Duration::from_secs(5));

    let err = resolver
        .open_tenant_database(tenant_props("biz_iso"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TenancyError::ConnectionFailure { ref database, .. } if database == "platformdb-biz_iso"
    ));
    assert_opened(&connections, &[PLATFORM_DB]);
    assert_closed_exactly_once(&connections);
}

/// Directory whose business lookups stall for `delay`.
struct StallingDirectory {
    inner: InMemoryDirectory,
    delay: Duration,
}

#[async_trait]
impl DirectoryStore<MockConnection> for StallingDirectory {
    async fn get_business(
        &self,
        conn: &MockConnection,
        business_id: &str,
    ) -> Result<Option<Business>, TenancyError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get_business(conn, business_id).await
    }

    async fn get_region(&self, conn: &MockConnection, region_id: &str) -> Result<Option<Region>, TenancyError> {
        self.inner.get_region(conn, region_id).await
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_resolution_still_closes_platform_connection() {
    let connections = RecordingConnectionManager::new();
    let resolver = TenantDatabaseResolver::new(
        Arc::new(connections.clone()),
        Arc::new(StallingDirectory {
            inner: seeded_directory(),
            delay: Duration::from_secs(10),
        }),
        Logger::disabled(),
    );

    let outcome = tokio::time::timeout(
        Duration::from_secs(1),
        resolver.resolve_tenant_connection(tenant_props("biz_abc")),
    )
    .await;
    assert!(outcome.is_err());

    // the close runs on a spawned task
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_opened(&connections, &[PLATFORM_DB]);
    assert_closed_exactly_once(&connections);
    assert_no_leaked_connections(&connections);
}

#[tokio::test(start_paused = true)]
async fn test_aborted_open_task_still_closes_platform_connection() {
    let connections = RecordingConnectionManager::new();
    let resolver = Arc::new(TenantDatabaseResolver::new(
        Arc::new(connections.clone()),
        Arc::new(StallingDirectory {
            inner: seeded_directory(),
            delay: Duration::from_secs(10),
        }),
        Logger::disabled(),
    ));

    let task = {
        let resolver = resolver.clone();
        tokio::spawn(async move { resolver.open_tenant_database(tenant_props("biz_iso")).await })
    };
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(connections.open_connections(), vec![PLATFORM_DB.to_string()]);

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(connections.open_count(), 1);
    assert_no_leaked_connections(&connections);
}

#[tokio::test]
async fn test_unrepresentable_timeout_means_no_deadline() {
    let connections = RecordingConnectionManager::new();
    let resolver = TenantDatabaseResolver::new(
        Arc::new(connections.clone()),
        Arc::new(seeded_directory()),
        Logger::disabled(),
    )
    .with_timeout(Duration::MAX);

    let resolved = resolver
        .resolve_tenant_connection(tenant_props("biz_abc"))
        .await
        .unwrap();

    assert_eq!(resolved.name, "platformdb");
    assert_closed_exactly_once(&connections);
}

#[tokio::test]
async fn test_concurrent_resolutions_each_close_their_platform_connection() {
    let (connections, _, resolver) = setup();
    let resolver = Arc::new(resolver);

    let mut tasks = Vec::new();
    for id in ["biz_abc", "biz_iso", "biz_missing", "biz_orphan"].into_iter().cycle().take(20) {
        let resolver = resolver.clone();
        tasks.push(tokio::spawn(async move {
            resolver.resolve_tenant_connection(tenant_props(id)).await
        }));
    }

    let mut ok = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            ok += 1;
        }
    }

    assert_eq!(ok, 10);
    assert_eq!(connections.open_count(), 20);
    assert_closed_exactly_once(&connections);
    assert_no_leaked_connections(&connections);
}

#[tokio::test]
async fn test_logs_never_contain_secrets() {
    let connections = RecordingConnectionManager::new();
    let (logger, capture) = capture_logger();
    let resolver = TenantDatabaseResolver::new(
        Arc::new(connections.clone()),
        Arc::new(seeded_directory()),
        logger,
    );

    for id in ["biz_abc", "biz_iso", "biz_orphan", "biz_missing"] {
        let _ = resolver.open_tenant_database(tenant_props(id)).await;
    }

    assert!(!capture.is_empty());
    assert!(capture.contains("biz_orphan"));
    for line in capture.lines() {
        assert!(!line.contains(PLATFORM_SECRET), "secret leaked: {}", line);
        assert!(!line.contains(REGION_SECRET), "secret leaked: {}", line);
    }
}

#[test]
fn test_settings_drive_the_timeout() {
    let config = platform_config::ConfigManager::new();
    config.set("db_server", PLATFORM_SERVER).unwrap();
    config.set("db_name", PLATFORM_DB).unwrap();
    config.set("connect_timeout_secs", 7).unwrap();
    let settings = TenancySettings::from_config(&config).unwrap();

    let resolver = TenantDatabaseResolver::new(
        Arc::new(RecordingConnectionManager::new()),
        Arc::new(InMemoryDirectory::new()),
        Logger::disabled(),
    )
    .with_settings(&settings);

    assert_eq!(resolver.timeout(), Some(Duration::from_secs(7)));
    assert_eq!(settings.platform_props().name, PLATFORM_DB);
}
