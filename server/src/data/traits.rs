//! Repository trait for the portal store
//!
//! Domain services talk to the store only through [`PortalRepository`]; the
//! SQLite backend implements it for `Arc<SqliteService>`.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::types::{
    ActivityEvent, ActivityFilter, ActivityKind, AdminActivitySummary, EngagementFact, GrantRef,
    GrantRow, Interaction, LikeToggle, ListActivityParams, ListResourcesParams, ListSchoolActivityParams,
    NewLogEntry, ResourceRow, ResourceStats, ResourceSummary, SchoolActivityFilter,
    SchoolActivityRow, UserRow,
};

#[async_trait]
pub trait PortalRepository: Send + Sync {
    // ==================== Users ====================

    async fn get_user(&self, id: i64) -> Result<Option<UserRow>, DataError>;

    /// `(role, count)` pairs
    async fn count_users_by_role(&self) -> Result<Vec<(String, i64)>, DataError>;

    // ==================== Resources ====================

    async fn get_resource(&self, id: i64) -> Result<Option<ResourceRow>, DataError>;

    async fn list_resources(
        &self,
        params: &ListResourcesParams,
    ) -> Result<(Vec<ResourceSummary>, u64), DataError>;

    async fn resource_stats(&self, id: i64) -> Result<Option<ResourceStats>, DataError>;

    /// `(status, count)` pairs
    async fn count_resources_by_status(&self) -> Result<Vec<(String, i64)>, DataError>;

    // ==================== Permission grants ====================

    async fn list_grants(&self, school_id: i64) -> Result<Vec<GrantRow>, DataError>;

    async fn has_grant(&self, school_id: i64, grant: GrantRef) -> Result<bool, DataError>;

    /// Replace the full grant set in one transaction
    async fn replace_grants(
        &self,
        school_id: i64,
        grants: &[GrantRef],
        audit: &NewLogEntry,
    ) -> Result<u64, DataError>;

    /// Idempotent union with the existing grant set
    async fn add_grants(
        &self,
        school_id: i64,
        grants: &[GrantRef],
        audit: &NewLogEntry,
    ) -> Result<u64, DataError>;

    async fn remove_grants(
        &self,
        school_id: i64,
        grants: &[GrantRef],
        audit: &NewLogEntry,
    ) -> Result<u64, DataError>;

    // ==================== Engagement ====================

    async fn record_view(&self, interaction: &Interaction) -> Result<i64, DataError>;

    async fn record_download(&self, interaction: &Interaction) -> Result<i64, DataError>;

    async fn toggle_like(&self, resource_id: i64, user_id: i64) -> Result<LikeToggle, DataError>;

    async fn count_facts(&self, fact: EngagementFact) -> Result<i64, DataError>;

    // ==================== Activity ====================

    /// First `window` events of one source in feed order
    async fn list_activity_source(
        &self,
        kind: ActivityKind,
        params: &ListActivityParams,
        window: u64,
    ) -> Result<Vec<ActivityEvent>, DataError>;

    async fn count_activity_source(
        &self,
        kind: ActivityKind,
        filter: &ActivityFilter,
    ) -> Result<u64, DataError>;

    async fn list_school_activity(
        &self,
        params: &ListSchoolActivityParams,
    ) -> Result<Vec<SchoolActivityRow>, DataError>;

    async fn count_school_activity(&self, filter: &SchoolActivityFilter)
    -> Result<u64, DataError>;

    async fn admin_activity(&self, admin_id: i64) -> Result<AdminActivitySummary, DataError>;
}
