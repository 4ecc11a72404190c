//! Dashboard summary types

use serde::Serialize;

use crate::utils::time::serialize_opt_secs;

/// Engagement fact tables counted on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementFact {
    Views,
    Downloads,
    Likes,
}

impl EngagementFact {
    pub const ALL: [EngagementFact; 3] = [Self::Views, Self::Downloads, Self::Likes];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Views => "views",
            Self::Downloads => "downloads",
            Self::Likes => "likes",
        }
    }
}

/// Portal-wide totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardTotals {
    pub users: i64,
    pub schools: i64,
    pub admins: i64,
    pub resources: i64,
    pub published: i64,
    pub drafts: i64,
    pub archived: i64,
    pub views: i64,
    pub downloads: i64,
    pub likes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionCount {
    pub action: String,
    pub count: i64,
}

/// Actions one administrator performed, from the audit log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdminActivitySummary {
    pub admin_id: i64,
    pub total_actions: i64,
    #[serde(serialize_with = "serialize_opt_secs")]
    pub last_action_at: Option<i64>,
    pub actions: Vec<ActionCount>,
}
