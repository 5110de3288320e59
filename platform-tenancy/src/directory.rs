//! Region and business directory seams
//!
//! The directory lives in the platform database, so every call receives the
//! open platform handle `H` it should query through.

use crate::error::TenancyError;
use crate::model::{Business, Region};
use async_trait::async_trait;

/// Read access used during resolution.
#[async_trait]
pub trait DirectoryStore<H: Send + Sync>: Send + Sync {
    /// Look up a business by its lowercase identifier.
    async fn get_business(&self, conn: &H, business_id: &str) -> Result<Option<Business>, TenancyError>;

    /// Look up a region by its lowercase identifier.
    async fn get_region(&self, conn: &H, region_id: &str) -> Result<Option<Region>, TenancyError>;
}

/// Write access used by [`DirectoryManager`](crate::DirectoryManager).
///
/// `insert_*` fails with `AlreadyExists`, `update_*` with `NotFound`.
/// `delete_*` removes the row and reports whether it existed.
#[async_trait]
pub trait ManagedDirectoryStore<H: Send + Sync>: DirectoryStore<H> {
    async fn insert_region(&self, conn: &H, region: &Region) -> Result<(), TenancyError>;

    async fn update_region(&self, conn: &H, region: &Region) -> Result<(), TenancyError>;

    async fn delete_region(&self, conn: &H, region_id: &str) -> Result<bool, TenancyError>;

    /// Regions matching `filter`, ordered by id.
    async fn list_regions(&self, conn: &H, filter: &DirectoryFilter) -> Result<Vec<Region>, TenancyError>;

    async fn insert_business(&self, conn: &H, business: &Business) -> Result<(), TenancyError>;

    async fn update_business(&self, conn: &H, business: &Business) -> Result<(), TenancyError>;

    async fn delete_business(&self, conn: &H, business_id: &str) -> Result<bool, TenancyError>;

    /// Businesses matching `filter`, ordered by id.
    async fn list_businesses(
        &self,
        conn: &H,
        filter: &DirectoryFilter,
    ) -> Result<Vec<Business>, TenancyError>;
}

/// Filter for listing directory records
#[derive(Debug, Clone)]
pub struct DirectoryFilter {
    /// Case-insensitive substring of the id or name
    pub search: Option<String>,
    /// Only businesses assigned to this region
    pub region_id: Option<String>,
    /// Include soft-deleted records
    pub include_deleted: bool,
    /// Pagination offset
    pub offset: u64,
    /// Pagination limit
    pub limit: u64,
}

impl Default for DirectoryFilter {
    fn default() -> Self {
        Self {
            search: None,
            region_id: None,
            include_deleted: false,
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

impl DirectoryFilter {
    /// Page size when none is given
    pub const DEFAULT_LIMIT: u64 = 50;

    /// Create new filter with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into().to_lowercase());
        self
    }

    pub fn with_region(mut self, region_id: impl Into<String>) -> Self {
        self.region_id = Some(region_id.into().to_lowercase());
        self
    }

    pub fn include_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    /// Set pagination
    pub fn with_pagination(mut self, offset: u64, limit: u64) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    pub fn matches_region(&self, region: &Region) -> bool {
        if region.is_deleted && !self.include_deleted {
            return false;
        }
        self.matches_search(&region.region_id, &region.region_name)
    }

    pub fn matches_business(&self, business: &Business) -> bool {
        if business.is_deleted && !self.include_deleted {
            return false;
        }
        if let Some(ref region_id) = self.region_id {
            if business.region_ref() != Some(region_id.as_str()) {
                return false;
            }
        }
        self.matches_search(&business.business_id, &business.business_name)
    }

    fn matches_search(&self, id: &str, name: &str) -> bool {
        match self.search {
            Some(ref search) => {
                let search = search.to_lowercase();
                id.contains(&search) || name.to_lowercase().contains(&search)
            }
            None => true,
        }
    }

    /// Apply offset and limit to an already ordered list.
    pub fn page<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DatabaseType;

    #[test]
    fn test_filter_defaults() {
        let filter = DirectoryFilter::new();
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.offset, 0);
        assert!(!filter.include_deleted);
    }

    #[test]
    fn test_default_matches_new() {
        let filter = DirectoryFilter::default();
        assert_eq!(filter.limit, DirectoryFilter::DEFAULT_LIMIT);
        assert_eq!(filter.page(vec![1, 2, 3]), vec![1, 2, 3]);
    }

    #[test]
    fn test_soft_deleted_hidden_by_default() {
        let mut region = Region::new("r1", "One", DatabaseType::Postgres);
        region.is_deleted = true;

        assert!(!DirectoryFilter::new().matches_region(&region));
        assert!(DirectoryFilter::new().include_deleted().matches_region(&region));
    }

    #[test]
    fn test_search_and_region() {
        let business = Business::new("biz_abc", "Acme Corp", "r1");

        assert!(DirectoryFilter::new().with_search("ACME").matches_business(&business));
        assert!(DirectoryFilter::new().with_search("abc").matches_business(&business));
        assert!(!DirectoryFilter::new().with_search("globex").matches_business(&business));
        assert!(DirectoryFilter::new().with_region("R1").matches_business(&business));
        assert!(!DirectoryFilter::new().with_region("r2").matches_business(&business));
    }

    #[test]
    fn test_page() {
        let filter = DirectoryFilter::new().with_pagination(1, 2);
        assert_eq!(filter.page(vec![1, 2, 3, 4]), vec![2, 3]);
    }
}
