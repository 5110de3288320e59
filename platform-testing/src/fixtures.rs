//! Directory fixtures
//!
//! [`seeded_directory`] holds one record per resolution outcome:
//!
//! | Business            | Region           | Outcome                    |
//! |---------------------|------------------|----------------------------|
//! | `biz_abc`           | `r1`             | shared `platformdb`        |
//! | `biz_iso`           | `r1`             | isolated `platformdb-biz_iso` |
//! | `biz_orphan`        | `r9` (missing)   | `InvalidRegionId`          |
//! | `biz_noregion`      | none             | `RegionReferenceMissing`   |
//! | `biz_stale`         | `r_old` (deleted)| `InvalidRegionId`          |
//! | `biz_gone` (deleted)| `r1`             | `InvalidBusinessId`        |

use platform_log::{Level, LogCapture, LogConfig, Logger};
use platform_tenancy::{Business, ConnectionDescriptor, DatabaseType, InMemoryDirectory, Region};

pub const PLATFORM_SERVER: &str = "platform-host";
pub const PLATFORM_DB: &str = "platformdb";
pub const PLATFORM_SECRET: &str = "platform-secret";
pub const REGION_SERVER: &str = "s1";
pub const REGION_SECRET: &str = "region-secret";

/// A live Postgres region on [`REGION_SERVER`] with base database `base_db`.
pub fn region(id: &str, base_db: &str) -> Region {
    Region::new(id, format!("Region {}", id), DatabaseType::Postgres)
        .with_server(REGION_SERVER)
        .with_credentials("tenant_user", REGION_SECRET)
        .with_database(base_db)
}

/// A live business assigned to `region`.
pub fn business(id: &str, region: &str, is_tenant_db: bool) -> Business {
    Business::new(id, format!("Business {}", id), region).with_tenant_database(is_tenant_db)
}

/// Connection fields of the platform database, without a business id.
pub fn platform_props() -> ConnectionDescriptor {
    ConnectionDescriptor::new(DatabaseType::Postgres, PLATFORM_SERVER, PLATFORM_DB)
        .with_credentials("platform_user", PLATFORM_SECRET)
}

/// Directory covering every resolution outcome. See the module table.
pub fn seeded_directory() -> InMemoryDirectory {
    let mut stale_region = region("r_old", "legacydb");
    stale_region.is_deleted = true;

    let mut gone = business("biz_gone", "r1", false);
    gone.is_deleted = true;

    let mut no_region = business("biz_noregion", "r1", false);
    no_region.region_id = None;

    InMemoryDirectory::new()
        .with_region(region("r1", PLATFORM_DB))
        .with_region(stale_region)
        .with_business(business("biz_abc", "r1", false))
        .with_business(business("biz_iso", "r1", true))
        .with_business(business("biz_orphan", "r9", false))
        .with_business(business("biz_stale", "r_old", false))
        .with_business(no_region)
        .with_business(gone)
}

/// Logger that records everything down to trace level.
pub fn capture_logger() -> (Logger, LogCapture) {
    Logger::capture(LogConfig::default().with_level(Level::Trace))
}
