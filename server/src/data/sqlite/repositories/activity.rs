//! Activity sources for the aggregated feed
//!
//! Each source is a fixed projection onto the same column set. The caller's
//! filter and ordering are applied on top of one projection at a time; the
//! domain layer merges the per-source windows.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{ActivityEvent, ActivityFilter, ActivityKind, ActivityRow, ListActivityParams};

const LOGIN_SOURCE: &str = r#"
    SELECT 'login-' || u.id || '-' || u.last_login AS event_id,
           'user_login' AS action,
           u.id AS user_id, u.name AS user_name, u.email AS user_email,
           u.role AS user_role, u.organization AS organization,
           NULL AS resource_id, NULL AS resource_title,
           u.last_login_ip AS ip_address,
           u.last_login AS created_at,
           json_object('status', u.status) AS details
    FROM users u
    WHERE u.last_login IS NOT NULL
"#;

const DOWNLOAD_SOURCE: &str = r#"
    SELECT 'download-' || d.id AS event_id,
           'resource_download' AS action,
           d.user_id AS user_id, u.name AS user_name, u.email AS user_email,
           u.role AS user_role, u.organization AS organization,
           d.resource_id AS resource_id, r.title AS resource_title,
           d.ip_address AS ip_address,
           d.created_at AS created_at,
           json_object('user_agent', d.user_agent, 'file_name', r.file_name,
                       'file_size', r.file_size) AS details
    FROM resource_downloads d
    LEFT JOIN users u ON u.id = d.user_id
    LEFT JOIN resources r ON r.id = d.resource_id
"#;

const VIEW_SOURCE: &str = r#"
    SELECT 'view-' || v.id AS event_id,
           'resource_view' AS action,
           v.user_id AS user_id, u.name AS user_name, u.email AS user_email,
           u.role AS user_role, u.organization AS organization,
           v.resource_id AS resource_id, r.title AS resource_title,
           v.ip_address AS ip_address,
           v.created_at AS created_at,
           json_object('user_agent', v.user_agent) AS details
    FROM resource_views v
    LEFT JOIN users u ON u.id = v.user_id
    LEFT JOIN resources r ON r.id = v.resource_id
"#;

const UPLOAD_SOURCE: &str = r#"
    SELECT 'upload-' || r.id AS event_id,
           'resource_upload' AS action,
           r.created_by AS user_id, u.name AS user_name, u.email AS user_email,
           u.role AS user_role, u.organization AS organization,
           r.id AS resource_id, r.title AS resource_title,
           NULL AS ip_address,
           r.created_at AS created_at,
           json_object('status', r.status, 'file_name', r.file_name,
                       'file_size', r.file_size, 'file_extension', r.file_extension) AS details
    FROM resources r
    LEFT JOIN users u ON u.id = r.created_by
"#;

// Every audit row is an event, including rows named like a derived kind
const LOG_SOURCE: &str = r#"
    SELECT 'log-' || l.id AS event_id,
           l.action AS action,
           l.user_id AS user_id, u.name AS user_name, u.email AS user_email,
           u.role AS user_role, u.organization AS organization,
           l.resource_id AS resource_id, r.title AS resource_title,
           l.ip_address AS ip_address,
           l.created_at AS created_at,
           COALESCE(l.details, '{}') AS details
    FROM activity_logs l
    LEFT JOIN users u ON u.id = l.user_id
    LEFT JOIN resources r ON r.id = l.resource_id
"#;

/// ?1 actor, ?2 action, ?3 from, ?4 to (inclusive)
const EVENT_FILTER: &str = r#"
    WHERE (?1 IS NULL OR e.user_id = ?1)
      AND (?2 IS NULL OR e.action = ?2)
      AND (?3 IS NULL OR e.created_at >= ?3)
      AND (?4 IS NULL OR e.created_at <= ?4)
"#;

fn projection(kind: ActivityKind) -> &'static str {
    match kind {
        ActivityKind::UserLogin => LOGIN_SOURCE,
        ActivityKind::ResourceDownload => DOWNLOAD_SOURCE,
        ActivityKind::ResourceView => VIEW_SOURCE,
        ActivityKind::ResourceUpload => UPLOAD_SOURCE,
        ActivityKind::ActivityLog => LOG_SOURCE,
    }
}

/// First `window` events of one source under the requested filter and order.
///
/// Rows are ordered by the sort column, then by event id in the same
/// direction, which is the total order the merged feed uses.
pub async fn list_source(
    pool: &SqlitePool,
    kind: ActivityKind,
    params: &ListActivityParams,
    window: u64,
) -> Result<Vec<ActivityEvent>, SqliteError> {
    let dir = params.order.as_sql();
    let sql = format!(
        "SELECT * FROM ({source}) AS e {filter} ORDER BY e.{column} {dir}, e.event_id {dir} LIMIT ?5",
        source = projection(kind),
        filter = EVENT_FILTER,
        column = params.sort.column(),
        dir = dir,
    );

    let filter = &params.filter;
    let rows = sqlx::query_as::<_, ActivityRow>(&sql)
        .bind(filter.user_id)
        .bind(filter.action.as_deref())
        .bind(filter.from)
        .bind(filter.to)
        .bind(i64::try_from(window).unwrap_or(i64::MAX))
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| ActivityEvent::from_row(kind, row))
        .collect())
}

/// Number of events one source contributes under the filter
pub async fn count_source(
    pool: &SqlitePool,
    kind: ActivityKind,
    filter: &ActivityFilter,
) -> Result<u64, SqliteError> {
    let sql = format!(
        "SELECT COUNT(*) FROM ({}) AS e {}",
        projection(kind),
        EVENT_FILTER
    );

    let total: i64 = sqlx::query_scalar(&sql)
        .bind(filter.user_id)
        .bind(filter.action.as_deref())
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(pool)
        .await?;

    Ok(total.max(0) as u64)
}
