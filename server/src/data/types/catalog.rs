//! Users, resources and listing parameters

use serde::Serialize;

use super::enums::{ResourceStatus, UserRole, UserStatus};
use crate::utils::time::{serialize_opt_secs, serialize_secs};

/// Separator used when tags are folded into one column
pub const TAG_SEPARATOR: char = '\u{1f}';

// ============================================================================
// Users
// ============================================================================

/// User row from database
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub organization: Option<String>,
    #[serde(serialize_with = "serialize_opt_secs")]
    pub last_login: Option<i64>,
    #[serde(serialize_with = "serialize_secs")]
    pub created_at: i64,
}

/// Authenticated caller, resolved from the users table on every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: UserRole,
    pub status: UserStatus,
    pub name: String,
    pub organization: Option<String>,
}

impl Actor {
    /// Build an actor from a stored user. Unknown role or status yields `None`.
    pub fn from_row(row: &UserRow) -> Option<Self> {
        Some(Self {
            id: row.id,
            role: UserRole::parse(&row.role)?,
            status: UserStatus::parse(&row.status)?,
            name: row.name.clone(),
            organization: row.organization.clone(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

// ============================================================================
// Resources
// ============================================================================

/// Full resource row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResourceRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub subject_id: i64,
    pub grade_id: i64,
    pub type_id: Option<i64>,
    pub status: String,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub file_extension: Option<String>,
    pub created_by: i64,
    pub view_count: i64,
    pub download_count: i64,
    pub likes: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ResourceRow {
    pub fn status(&self) -> Option<ResourceStatus> {
        ResourceStatus::parse(&self.status)
    }

    pub fn is_published(&self) -> bool {
        self.status() == Some(ResourceStatus::Published)
    }
}

/// Listing entry with catalog names joined in (file path never exposed)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ResourceSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub subject_id: i64,
    pub subject_name: String,
    pub grade_id: i64,
    pub grade_name: String,
    pub type_id: Option<i64>,
    pub type_name: Option<String>,
    pub status: String,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub file_extension: Option<String>,
    pub created_by: i64,
    pub view_count: i64,
    pub download_count: i64,
    pub likes: i64,
    #[serde(serialize_with = "serialize_tags")]
    pub tags: Option<String>,
    #[serde(serialize_with = "serialize_secs")]
    pub created_at: i64,
    #[serde(serialize_with = "serialize_secs")]
    pub updated_at: i64,
}

fn serialize_tags<S>(tags: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;
    let items: Vec<&str> = tags
        .as_deref()
        .map(|t| t.split(TAG_SEPARATOR).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let mut seq = serializer.serialize_seq(Some(items.len()))?;
    for item in items {
        seq.serialize_element(item)?;
    }
    seq.end()
}

/// Counters next to the live fact-row counts backing them
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResourceStats {
    pub resource_id: i64,
    pub view_count: i64,
    pub download_count: i64,
    pub likes: i64,
    pub view_rows: i64,
    pub download_rows: i64,
    pub like_rows: i64,
}

impl ResourceStats {
    pub fn is_consistent(&self) -> bool {
        self.view_count == self.view_rows
            && self.download_count == self.download_rows
            && self.likes == self.like_rows
    }
}

/// Who a listing is produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceScope {
    /// Published resources, no grant check
    Public,
    /// Every status, optionally narrowed to one
    Admin { status: Option<ResourceStatus> },
    /// Published resources inside the school's effective grant set
    School { school_id: i64 },
}

/// Parameters for listing resources
#[derive(Debug, Clone, Default)]
pub struct ListResourcesParams {
    pub status: Option<ResourceStatus>,
    pub granted_to: Option<i64>,
    pub subject_id: Option<i64>,
    pub grade_id: Option<i64>,
    pub type_id: Option<i64>,
    pub search: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl ListResourcesParams {
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}
