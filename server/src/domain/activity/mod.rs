//! Activity aggregation
//!
//! Five sources (logins, downloads, views, uploads and the audit log) are
//! projected onto one event shape. The per-source counts under the filter
//! are taken first; their sum is the total. A page is then built by fetching
//! the first `offset + limit` events (capped by the count) of every source
//! that can match, merging them under the feed's total order and slicing.

mod dashboard;
mod feed;

#[cfg(test)]
mod tests;

pub use dashboard::DashboardSummary;

use std::sync::Arc;

use futures::future::try_join_all;

use crate::data::traits::PortalRepository;
use crate::data::types::{
    ActivityEvent, ActivityKind, ListActivityParams, ListSchoolActivityParams, SchoolActivityRow,
};
use crate::data::{DataError, Database};

#[derive(Debug, Clone)]
pub struct ActivityPage {
    pub events: Vec<ActivityEvent>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct SchoolActivityPage {
    pub logs: Vec<SchoolActivityRow>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

#[derive(Clone)]
pub struct ActivityService {
    database: Arc<Database>,
}

impl ActivityService {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// One page of the aggregated feed with the total under the same filter
    pub async fn list(&self, params: &ListActivityParams) -> Result<ActivityPage, DataError> {
        let repo = self.database.repository();
        let sources = params.filter.sources();

        let counts = try_join_all(sources.iter().map(|&kind| {
            let repo = repo.as_ref();
            async move {
                repo.count_activity_source(kind, &params.filter)
                    .await
                    .inspect_err(|e| {
                        tracing::warn!(step = "count_source", source = kind.as_str(), error = %e, "Activity count failed")
                    })
            }
        }))
        .await?;
        let total: u64 = counts.iter().sum();

        let sizes = window_sizes(&counts, params.offset(), params.limit);
        let windows = try_join_all(
            sources
                .iter()
                .zip(sizes)
                .filter(|(_, size)| *size > 0)
                .map(|(&kind, size)| source_window(repo.as_ref(), kind, params, size)),
        )
        .await?;

        let events = feed::merge_page(
            windows,
            params.sort,
            params.order,
            params.offset(),
            params.limit,
        );

        Ok(ActivityPage {
            events,
            page: params.page,
            limit: params.limit,
            total,
        })
    }

    /// One page of the school activity log
    pub async fn school_feed(
        &self,
        params: &ListSchoolActivityParams,
    ) -> Result<SchoolActivityPage, DataError> {
        let repo = self.database.repository();

        let logs = repo.list_school_activity(params).await.inspect_err(|e| {
            tracing::warn!(step = "list_school_activity", error = %e, "School activity listing failed")
        })?;
        let total = repo
            .count_school_activity(&params.filter)
            .await
            .inspect_err(|e| {
                tracing::warn!(step = "count_school_activity", error = %e, "School activity count failed")
            })?;

        Ok(SchoolActivityPage {
            logs,
            page: params.page,
            limit: params.limit,
            total,
        })
    }
}

/// Rows to fetch from each source for one page.
///
/// A source never yields more than its count, and a page that starts past
/// the total needs no rows at all.
fn window_sizes(counts: &[u64], offset: u64, limit: u32) -> Vec<u64> {
    let total: u64 = counts.iter().sum();
    if offset >= total {
        return vec![0; counts.len()];
    }
    let window = offset.saturating_add(u64::from(limit));
    counts.iter().map(|&count| count.min(window)).collect()
}

async fn source_window(
    repo: &(dyn PortalRepository + Send + Sync),
    kind: ActivityKind,
    params: &ListActivityParams,
    window: u64,
) -> Result<Vec<ActivityEvent>, DataError> {
    repo.list_activity_source(kind, params, window)
        .await
        .inspect_err(|e| {
            tracing::warn!(step = "list_source", source = kind.as_str(), error = %e, "Activity source failed")
        })
}
