//! Admin dashboard summary
//!
//! Every count and listing runs on its own. A failing query is logged,
//! replaced by zero or empty, and named in `degraded`, so a deployment
//! without the audit tables still gets a dashboard.

use std::future::Future;

use serde::Serialize;

use super::{ActivityService, feed};
use crate::core::constants::DASHBOARD_RECENT_EVENTS;
use crate::data::DataError;
use crate::data::types::{
    ActivityEvent, ActivityFilter, ActivityKind, ActivitySortField, AdminActivitySummary,
    DashboardTotals, EngagementFact, ListActivityParams, SortOrder,
};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub totals: DashboardTotals,
    pub recent_activity: Vec<ActivityEvent>,
    pub admin_activity: AdminActivitySummary,
    /// Sources that failed and were replaced by defaults
    pub degraded: Vec<&'static str>,
}

/// Run one dashboard query, substituting the default on failure
async fn attempt<T, F>(source: &'static str, degraded: &mut Vec<&'static str>, query: F) -> T
where
    T: Default,
    F: Future<Output = Result<T, DataError>>,
{
    match query.await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(source, kind = ?e.kind(), error = %e, "Dashboard source degraded");
            degraded.push(source);
            T::default()
        }
    }
}

impl ActivityService {
    pub async fn dashboard(&self, admin_id: i64) -> DashboardSummary {
        let repo = self.database.repository();
        let mut degraded = Vec::new();
        let mut totals = DashboardTotals::default();

        let roles = attempt("users", &mut degraded, repo.count_users_by_role()).await;
        for (role, count) in roles {
            totals.users += count;
            match role.as_str() {
                "admin" => totals.admins = count,
                "school" => totals.schools = count,
                _ => {}
            }
        }

        let statuses = attempt("resources", &mut degraded, repo.count_resources_by_status()).await;
        for (status, count) in statuses {
            totals.resources += count;
            match status.as_str() {
                "published" => totals.published = count,
                "draft" => totals.drafts = count,
                "archived" => totals.archived = count,
                _ => {}
            }
        }

        for fact in EngagementFact::ALL {
            let count = attempt(fact.as_str(), &mut degraded, repo.count_facts(fact)).await;
            match fact {
                EngagementFact::Views => totals.views = count,
                EngagementFact::Downloads => totals.downloads = count,
                EngagementFact::Likes => totals.likes = count,
            }
        }

        let params = ListActivityParams {
            filter: ActivityFilter::default(),
            sort: ActivitySortField::CreatedAt,
            order: SortOrder::Desc,
            page: 1,
            limit: DASHBOARD_RECENT_EVENTS,
        };
        let window = u64::from(DASHBOARD_RECENT_EVENTS);
        let mut windows = Vec::with_capacity(ActivityKind::ALL.len());
        for kind in ActivityKind::ALL {
            windows.push(
                attempt(
                    kind.as_str(),
                    &mut degraded,
                    repo.list_activity_source(kind, &params, window),
                )
                .await,
            );
        }
        let recent_activity = feed::merge_page(
            windows,
            params.sort,
            params.order,
            0,
            DASHBOARD_RECENT_EVENTS,
        );

        let mut admin_activity =
            attempt("admin_activity", &mut degraded, repo.admin_activity(admin_id)).await;
        admin_activity.admin_id = admin_id;

        DashboardSummary {
            totals,
            recent_activity,
            admin_activity,
            degraded,
        }
    }
}
