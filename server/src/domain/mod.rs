//! Domain services for the EduShare portal
//!
//! - `permissions` - per-school subject/grade permission matrix
//! - `engagement` - view, download and like counters with their fact rows
//! - `access` - access gate in front of engagement
//! - `catalog` - scoped resource listings
//! - `activity` - aggregated activity feed, school feed and dashboard summary

pub mod access;
pub mod activity;
pub mod catalog;
pub mod engagement;
pub mod permissions;

pub use access::{AccessGate, AccessPolicy};
pub use activity::{ActivityPage, ActivityService, DashboardSummary, SchoolActivityPage};
pub use catalog::{CatalogService, ResourcePage};
pub use engagement::{DownloadTicket, EngagementService};
pub use permissions::{PermissionMatrix, SchoolPermissions};

/// Where a request came from, as recorded in fact rows and audit entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Number of pages needed for `total` items
pub fn page_count(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}
