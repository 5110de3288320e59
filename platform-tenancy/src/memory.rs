//! In-memory directory

use crate::directory::{DirectoryFilter, DirectoryStore, ManagedDirectoryStore};
use crate::error::{RecordKind, TenancyError};
use crate::model::{Business, Region};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Directory held in process memory, for tests and single-node setups.
///
/// It ignores the platform handle, so it works with any connection manager.
/// Lookups are counted to let callers check which records were read.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    regions: RwLock<HashMap<String, Region>>,
    businesses: RwLock<HashMap<String, Business>>,
    business_lookups: AtomicUsize,
    region_lookups: AtomicUsize,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a region, replacing any with the same id.
    pub fn with_region(self, region: Region) -> Self {
        self.regions
            .write()
            .insert(region.region_id.to_lowercase(), region);
        self
    }

    /// Seed a business, replacing any with the same id.
    pub fn with_business(self, business: Business) -> Self {
        self.businesses
            .write()
            .insert(business.business_id.to_lowercase(), business);
        self
    }

    /// Number of `get_business` calls served.
    pub fn business_lookups(&self) -> usize {
        self.business_lookups.load(Ordering::SeqCst)
    }

    /// Number of `get_region` calls served.
    pub fn region_lookups(&self) -> usize {
        self.region_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<H: Send + Sync> DirectoryStore<H> for InMemoryDirectory {
    async fn get_business(&self, _conn: &H, business_id: &str) -> Result<Option<Business>, TenancyError> {
        self.business_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .businesses
            .read()
            .get(&business_id.to_lowercase())
            .cloned())
    }

    async fn get_region(&self, _conn: &H, region_id: &str) -> Result<Option<Region>, TenancyError> {
        self.region_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.regions.read().get(&region_id.to_lowercase()).cloned())
    }
}

#[async_trait]
impl<H: Send + Sync> ManagedDirectoryStore<H> for InMemoryDirectory {
    async fn insert_region(&self, _conn: &H, region: &Region) -> Result<(), TenancyError> {
        let mut regions = self.regions.write();
        if regions.contains_key(&region.region_id) {
            return Err(TenancyError::AlreadyExists {
                kind: RecordKind::Region,
                id: region.region_id.clone(),
            });
        }
        regions.insert(region.region_id.clone(), region.clone());
        Ok(())
    }

    async fn update_region(&self, _conn: &H, region: &Region) -> Result<(), TenancyError> {
        let mut regions = self.regions.write();
        match regions.get_mut(&region.region_id) {
            Some(existing) => {
                *existing = region.clone();
                Ok(())
            }
            None => Err(TenancyError::NotFound {
                kind: RecordKind::Region,
                id: region.region_id.clone(),
            }),
        }
    }

    async fn delete_region(&self, _conn: &H, region_id: &str) -> Result<bool, TenancyError> {
        Ok(self.regions.write().remove(region_id).is_some())
    }

    async fn list_regions(&self, _conn: &H, filter: &DirectoryFilter) -> Result<Vec<Region>, TenancyError> {
        let mut results: Vec<_> = self
            .regions
            .read()
            .values()
            .filter(|r| filter.matches_region(r))
            .cloned()
            .collect();
        results.sort_by(|a, b| a.region_id.cmp(&b.region_id));
        Ok(filter.page(results))
    }

    async fn insert_business(&self, _conn: &H, business: &Business) -> Result<(), TenancyError> {
        let mut businesses = self.businesses.write();
        if businesses.contains_key(&business.business_id) {
            return Err(TenancyError::AlreadyExists {
                kind: RecordKind::Business,
                id: business.business_id.clone(),
            });
        }
        businesses.insert(business.business_id.clone(), business.clone());
        Ok(())
    }

    async fn update_business(&self, _conn: &H, business: &Business) -> Result<(), TenancyError> {
        let mut businesses = self.businesses.write();
        match businesses.get_mut(&business.business_id) {
            Some(existing) => {
                *existing = business.clone();
                Ok(())
            }
            None => Err(TenancyError::NotFound {
                kind: RecordKind::Business,
                id: business.business_id.clone(),
            }),
        }
    }

    async fn delete_business(&self, _conn: &H, business_id: &str) -> Result<bool, TenancyError> {
        Ok(self.businesses.write().remove(business_id).is_some())
    }

    async fn list_businesses(
        &self,
        _conn: &H,
        filter: &DirectoryFilter,
    ) -> Result<Vec<Business>, TenancyError> {
        let mut results: Vec<_> = self
            .businesses
            .read()
            .values()
            .filter(|b| filter.matches_business(b))
            .cloned()
            .collect();
        results.sort_by(|a, b| a.business_id.cmp(&b.business_id));
        Ok(filter.page(results))
    }
}
