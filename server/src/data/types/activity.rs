//! Activity feed types: synthetic events, the school log and their queries

use serde::Serialize;
use serde_json::{Map, Value};

use super::enums::{ActivityKind, SchoolActivityType, SortOrder};
use crate::utils::time::serialize_secs;

// ============================================================================
// Aggregated activity
// ============================================================================

/// Raw projection row shared by every activity source
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityRow {
    pub event_id: String,
    pub action: String,
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_role: Option<String>,
    pub organization: Option<String>,
    pub resource_id: Option<i64>,
    pub resource_title: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: i64,
    pub details: Option<String>,
}

/// Who performed an event. Anonymous views and downloads have no user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityActor {
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub organization: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityResource {
    pub id: i64,
    pub title: Option<String>,
}

/// One normalized entry of the aggregated feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEvent {
    /// Source-qualified id, e.g. `view-12` or `login-3-1704067200`
    pub id: String,
    pub kind: ActivityKind,
    pub action: String,
    pub actor: ActivityActor,
    pub resource: Option<ActivityResource>,
    pub ip_address: Option<String>,
    #[serde(serialize_with = "serialize_secs")]
    pub created_at: i64,
    pub details: Map<String, Value>,
}

impl ActivityEvent {
    /// Normalize a projection row. `kind` is supplied by the source that
    /// produced the row.
    pub fn from_row(kind: ActivityKind, row: ActivityRow) -> Self {
        let details = match row.details.as_deref() {
            Some(raw) => serde_json::from_str::<Map<String, Value>>(raw).unwrap_or_else(|e| {
                tracing::warn!(event_id = %row.event_id, error = %e, "Unparseable activity details");
                Map::new()
            }),
            None => Map::new(),
        };
        Self {
            id: row.event_id,
            kind,
            action: row.action,
            actor: ActivityActor {
                user_id: row.user_id,
                name: row.user_name,
                email: row.user_email,
                role: row.user_role,
                organization: row.organization,
            },
            resource: row.resource_id.map(|id| ActivityResource {
                id,
                title: row.resource_title,
            }),
            ip_address: row.ip_address,
            created_at: row.created_at,
            details,
        }
    }
}

/// Predicate applied uniformly to every source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub user_id: Option<i64>,
    pub action: Option<String>,
    /// Inclusive lower bound, unix seconds
    pub from: Option<i64>,
    /// Inclusive upper bound, unix seconds
    pub to: Option<i64>,
}

impl ActivityFilter {
    /// Sources that can produce rows matching this filter
    pub fn sources(&self) -> Vec<ActivityKind> {
        match self.action.as_deref() {
            None => ActivityKind::ALL.to_vec(),
            Some(action) => ActivityKind::ALL
                .into_iter()
                .filter(|kind| match kind.fixed_action() {
                    Some(fixed) => fixed == action,
                    // Audit rows may carry any action name
                    None => true,
                })
                .collect(),
        }
    }
}

/// Whitelisted sort fields for the aggregated feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivitySortField {
    #[default]
    CreatedAt,
    Action,
    UserName,
}

impl ActivitySortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created_at" | "timestamp" => Some(Self::CreatedAt),
            "action" => Some(Self::Action),
            "user_name" => Some(Self::UserName),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Action => "action",
            Self::UserName => "user_name",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListActivityParams {
    pub filter: ActivityFilter,
    pub sort: ActivitySortField,
    pub order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl ListActivityParams {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

// ============================================================================
// School activity log
// ============================================================================

/// Row of the school feed with the composed `resource_details` label
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SchoolActivityRow {
    pub id: i64,
    pub school_id: i64,
    pub school_name: String,
    pub organization: Option<String>,
    pub email: String,
    pub activity_type: String,
    pub resource_id: Option<i64>,
    pub resource_name: Option<String>,
    pub resource_type: Option<String>,
    pub file_size: Option<i64>,
    pub file_extension: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[serde(serialize_with = "serialize_secs")]
    pub created_at: i64,
    pub resource_details: String,
}

#[derive(Debug, Clone, Default)]
pub struct SchoolActivityFilter {
    pub school_id: Option<i64>,
    /// Substring match on the school's name or organization
    pub school_name: Option<String>,
    pub activity_type: Option<SchoolActivityType>,
    pub from: Option<i64>,
    pub to: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchoolActivitySortField {
    #[default]
    CreatedAt,
    ActivityType,
    SchoolName,
    FileSize,
}

impl SchoolActivitySortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created_at" | "timestamp" => Some(Self::CreatedAt),
            "activity_type" => Some(Self::ActivityType),
            "school_name" => Some(Self::SchoolName),
            "file_size" => Some(Self::FileSize),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "sal.created_at",
            Self::ActivityType => "sal.activity_type",
            Self::SchoolName => "u.name",
            Self::FileSize => "sal.file_size",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListSchoolActivityParams {
    pub filter: SchoolActivityFilter,
    pub sort: SchoolActivitySortField,
    pub order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl ListSchoolActivityParams {
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

// ============================================================================
// Writes
// ============================================================================

/// Audit entry appended to `activity_logs`
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub user_id: Option<i64>,
    pub action: String,
    pub resource_id: Option<i64>,
    pub details: Value,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Row appended to `school_activity_logs`
#[derive(Debug, Clone)]
pub struct NewSchoolActivity {
    pub school_id: i64,
    pub activity_type: SchoolActivityType,
    pub resource_id: Option<i64>,
    pub file_size: Option<i64>,
    pub file_extension: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A view or download of one resource
#[derive(Debug, Clone)]
pub struct Interaction {
    pub resource_id: i64,
    pub actor_id: Option<i64>,
    /// Also append to the school activity log (actor is a school)
    pub log_school_activity: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Outcome of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeToggle {
    pub resource_id: i64,
    pub liked: bool,
    pub likes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(details: Option<&str>) -> ActivityRow {
        ActivityRow {
            event_id: "view-9".to_string(),
            action: "resource_view".to_string(),
            user_id: None,
            user_name: None,
            user_email: None,
            user_role: None,
            organization: None,
            resource_id: Some(3),
            resource_title: Some("Fractions".to_string()),
            ip_address: Some("10.0.0.1".to_string()),
            created_at: 1_704_067_200,
            details: details.map(str::to_string),
        }
    }

    #[test]
    fn test_event_from_row_parses_details() {
        let event = ActivityEvent::from_row(
            ActivityKind::ResourceView,
            row(Some(r#"{"user_agent":"curl/8"}"#)),
        );
        assert_eq!(event.id, "view-9");
        assert_eq!(event.details["user_agent"], "curl/8");
        assert_eq!(event.resource.as_ref().map(|r| r.id), Some(3));
        assert!(event.actor.user_id.is_none());
    }

    #[test]
    fn test_event_from_row_tolerates_bad_details() {
        let event = ActivityEvent::from_row(ActivityKind::ResourceView, row(Some("not json")));
        assert!(event.details.is_empty());
    }

    #[test]
    fn test_event_serializes_kind_and_time() {
        let event = ActivityEvent::from_row(ActivityKind::ResourceView, row(None));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "resource_view");
        assert_eq!(json["created_at"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_filter_sources_without_action() {
        assert_eq!(ActivityFilter::default().sources().len(), 5);
    }

    #[test]
    fn test_filter_sources_for_reserved_action() {
        let filter = ActivityFilter {
            action: Some("resource_download".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filter.sources(),
            vec![ActivityKind::ResourceDownload, ActivityKind::ActivityLog]
        );
    }

    #[test]
    fn test_filter_sources_for_log_action() {
        let filter = ActivityFilter {
            action: Some("permissions_set".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.sources(), vec![ActivityKind::ActivityLog]);
    }

    #[test]
    fn test_sort_field_whitelist() {
        assert_eq!(
            ActivitySortField::parse("user_name"),
            Some(ActivitySortField::UserName)
        );
        assert_eq!(ActivitySortField::parse("1; DROP TABLE users"), None);
        assert_eq!(
            SchoolActivitySortField::parse("file_size").map(|f| f.column()),
            Some("sal.file_size")
        );
    }
}
