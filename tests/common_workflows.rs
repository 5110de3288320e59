//! Integration tests for common platform workflows.
//!
//! These tests wire settings, logging, the directory and the resolver
//! together the way a service would at startup.

use platform::platform_config::ConfigManager;
use platform::platform_log::{Format, LogConfig, Logger};
use platform::prelude::*;
use platform_testing::*;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Startup
// =============================================================================

fn settings() -> TenancySettings {
    let config = ConfigManager::new();
    config.set("db_type", "postgres").unwrap();
    config.set("db_server", PLATFORM_SERVER).unwrap();
    config.set("db_user", "platform_user").unwrap();
    config.set("db_secret", PLATFORM_SECRET).unwrap();
    config.set("db_name", PLATFORM_DB).unwrap();
    config.set("connect_timeout_secs", "5").unwrap();
    TenancySettings::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_provision_then_resolve() {
    let settings = settings();
    let connections = RecordingConnectionManager::new();
    let directory = Arc::new(platform::InMemoryDirectory::new());
    let (logger, capture) = Logger::capture(LogConfig::default().with_format(Format::Compact));

    // Provision a region and two businesses
    let admin = DirectoryManager::open(
        Arc::new(connections.clone()),
        directory.clone(),
        &settings.platform_props(),
        logger.clone(),
    )
    .await
    .unwrap();

    admin
        .create_region(
            CreateRegionRequest::new("eu-west", "Europe West", DatabaseType::Postgres)
                .with_server("db.eu-west.internal")
                .with_credentials("tenant_user", REGION_SECRET)
                .with_database("platformdb"),
        )
        .await
        .unwrap();
    let shared = admin
        .create_business(CreateBusinessRequest::new("Acme").with_region("eu-west"))
        .await
        .unwrap();
    let isolated = admin
        .create_business(
            CreateBusinessRequest::new("Globex")
                .with_region("EU-WEST")
                .with_tenant_database(true),
        )
        .await
        .unwrap();
    admin.end_service().await;

    // Resolve both through the same entry point
    let resolver = TenantDatabaseResolver::new(Arc::new(connections.clone()), directory, logger)
        .with_settings(&settings);
    assert_eq!(resolver.timeout(), Some(Duration::from_secs(5)));

    let conn = resolver
        .open_tenant_database(settings.platform_props().with_business_id(&shared.business_id))
        .await
        .unwrap();
    assert_eq!(conn.descriptor().server, "db.eu-west.internal");
    assert_eq!(conn.descriptor().name, "platformdb");
    resolver.close_tenant_database(conn).await;

    let conn = resolver
        .open_tenant_database(settings.platform_props().with_business_id(&isolated.business_id))
        .await
        .unwrap();
    assert_eq!(
        conn.descriptor().name,
        format!("platformdb-{}", isolated.business_id)
    );
    resolver.close_tenant_database(conn).await;

    // Platform connections: admin + one per resolution
    assert_eq!(
        connections
            .opened_databases()
            .iter()
            .filter(|db| db.as_str() == PLATFORM_DB)
            .count(),
        3
    );
    assert_closed_exactly_once(&connections);
    assert_no_leaked_connections(&connections);

    assert!(capture.contains("Created region eu-west"));
    for line in capture.lines() {
        assert!(!line.contains(PLATFORM_SECRET));
        assert!(!line.contains(REGION_SECRET));
    }
}

#[tokio::test]
async fn test_platform_service_uses_same_entry_point() {
    let settings = settings();
    let connections = RecordingConnectionManager::new();
    let resolver = TenantDatabaseResolver::new(
        Arc::new(connections.clone()),
        Arc::new(seeded_directory()),
        Logger::disabled(),
    );

    let conn = resolver
        .open_tenant_database(settings.platform_props())
        .await
        .unwrap();

    assert_eq!(conn.descriptor(), &settings.platform_props());
    assert_eq!(conn.business_id(), None);
    resolver.close_tenant_database(conn).await;
    assert_opened(&connections, &[PLATFORM_DB]);
}

#[tokio::test]
async fn test_resolution_failure_aborts_the_operation() {
    let connections = RecordingConnectionManager::new();
    let resolver = TenantDatabaseResolver::new(
        Arc::new(connections.clone()),
        Arc::new(seeded_directory()),
        Logger::disabled(),
    );

    for business_id in ["biz_missing", "biz_noregion", "biz_orphan", "biz_stale", "biz_gone"] {
        let err = resolver
            .open_tenant_database(platform_props().with_business_id(business_id))
            .await
            .unwrap_err();
        assert!(err.is_tenant_unusable(), "{}: {}", business_id, err);
    }

    // Only platform connections were ever opened
    assert!(connections.opened_databases().iter().all(|db| db == PLATFORM_DB));
    assert_closed_exactly_once(&connections);
    assert_no_leaked_connections(&connections);
}
