//! PortalRepository implementation for SQLite
//!
//! Delegates to the repository functions and converts `SqliteError` into the
//! unified `DataError`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::PortalRepository;
use crate::data::types::{
    ActivityEvent, ActivityFilter, ActivityKind, AdminActivitySummary, EngagementFact, GrantRef,
    GrantRow, Interaction, LikeToggle, ListActivityParams, ListResourcesParams, ListSchoolActivityParams,
    NewLogEntry, ResourceRow, ResourceStats, ResourceSummary, SchoolActivityFilter,
    SchoolActivityRow, UserRow,
};

use super::SqliteService;
use super::repositories::{
    activity, engagement, permission, resource, school_activity, summary, user,
};

#[async_trait]
impl PortalRepository for Arc<SqliteService> {
    // ==================== Users ====================

    async fn get_user(&self, id: i64) -> Result<Option<UserRow>, DataError> {
        user::get_user(self.pool(), id).await.map_err(Into::into)
    }

    async fn count_users_by_role(&self) -> Result<Vec<(String, i64)>, DataError> {
        user::count_by_role(self.pool()).await.map_err(Into::into)
    }

    // ==================== Resources ====================

    async fn get_resource(&self, id: i64) -> Result<Option<ResourceRow>, DataError> {
        resource::get_resource(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn list_resources(
        &self,
        params: &ListResourcesParams,
    ) -> Result<(Vec<ResourceSummary>, u64), DataError> {
        resource::list_resources(self.pool(), params)
            .await
            .map_err(Into::into)
    }

    async fn resource_stats(&self, id: i64) -> Result<Option<ResourceStats>, DataError> {
        resource::resource_stats(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn count_resources_by_status(&self) -> Result<Vec<(String, i64)>, DataError> {
        resource::count_by_status(self.pool())
            .await
            .map_err(Into::into)
    }

    // ==================== Permission grants ====================

    async fn list_grants(&self, school_id: i64) -> Result<Vec<GrantRow>, DataError> {
        permission::list_grants(self.pool(), school_id)
            .await
            .map_err(Into::into)
    }

    async fn has_grant(&self, school_id: i64, grant: GrantRef) -> Result<bool, DataError> {
        permission::has_grant(self.pool(), school_id, grant)
            .await
            .map_err(Into::into)
    }

    async fn replace_grants(
        &self,
        school_id: i64,
        grants: &[GrantRef],
        audit: &NewLogEntry,
    ) -> Result<u64, DataError> {
        permission::replace_grants(self.pool(), school_id, grants, audit)
            .await
            .map_err(Into::into)
    }

    async fn add_grants(
        &self,
        school_id: i64,
        grants: &[GrantRef],
        audit: &NewLogEntry,
    ) -> Result<u64, DataError> {
        permission::add_grants(self.pool(), school_id, grants, audit)
            .await
            .map_err(Into::into)
    }

    async fn remove_grants(
        &self,
        school_id: i64,
        grants: &[GrantRef],
        audit: &NewLogEntry,
    ) -> Result<u64, DataError> {
        permission::remove_grants(self.pool(), school_id, grants, audit)
            .await
            .map_err(Into::into)
    }

    // ==================== Engagement ====================

    async fn record_view(&self, interaction: &Interaction) -> Result<i64, DataError> {
        engagement::record_view(self.pool(), interaction)
            .await
            .map_err(Into::into)
    }

    async fn record_download(&self, interaction: &Interaction) -> Result<i64, DataError> {
        engagement::record_download(self.pool(), interaction)
            .await
            .map_err(Into::into)
    }

    async fn toggle_like(&self, resource_id: i64, user_id: i64) -> Result<LikeToggle, DataError> {
        engagement::toggle_like(self.pool(), resource_id, user_id)
            .await
            .map_err(Into::into)
    }

    async fn count_facts(&self, fact: EngagementFact) -> Result<i64, DataError> {
        summary::count_facts(self.pool(), fact)
            .await
            .map_err(Into::into)
    }

    // ==================== Activity ====================

    async fn list_activity_source(
        &self,
        kind: ActivityKind,
        params: &ListActivityParams,
        window: u64,
    ) -> Result<Vec<ActivityEvent>, DataError> {
        activity::list_source(self.pool(), kind, params, window)
            .await
            .map_err(Into::into)
    }

    async fn count_activity_source(
        &self,
        kind: ActivityKind,
        filter: &ActivityFilter,
    ) -> Result<u64, DataError> {
        activity::count_source(self.pool(), kind, filter)
            .await
            .map_err(Into::into)
    }

    async fn list_school_activity(
        &self,
        params: &ListSchoolActivityParams,
    ) -> Result<Vec<SchoolActivityRow>, DataError> {
        school_activity::list(self.pool(), params)
            .await
            .map_err(Into::into)
    }

    async fn count_school_activity(
        &self,
        filter: &SchoolActivityFilter,
    ) -> Result<u64, DataError> {
        school_activity::count(self.pool(), filter)
            .await
            .map_err(Into::into)
    }

    async fn admin_activity(&self, admin_id: i64) -> Result<AdminActivitySummary, DataError> {
        summary::admin_activity(self.pool(), admin_id)
            .await
            .map_err(Into::into)
    }
}
