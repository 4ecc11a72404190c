//! School activity log repository (`school_activity_logs`)

use sqlx::{SqliteConnection, SqlitePool};

use crate::data::sqlite::SqliteError;
use crate::data::types::{
    ListSchoolActivityParams, NewSchoolActivity, SchoolActivityFilter, SchoolActivityRow,
};
use crate::utils::time::now_secs;

/// ?1 school id, ?2 school name substring, ?3 activity type, ?4 from, ?5 to
const FEED_FILTER: &str = r#"
    FROM school_activity_logs sal
    JOIN users u ON u.id = sal.school_id
    LEFT JOIN resources r ON r.id = sal.resource_id
    LEFT JOIN resource_types rt ON rt.id = r.type_id
    WHERE (?1 IS NULL OR sal.school_id = ?1)
      AND (?2 IS NULL OR u.name LIKE '%' || ?2 || '%' OR u.organization LIKE '%' || ?2 || '%')
      AND (?3 IS NULL OR sal.activity_type = ?3)
      AND (?4 IS NULL OR sal.created_at >= ?4)
      AND (?5 IS NULL OR sal.created_at <= ?5)
"#;

/// Append a school activity entry
pub async fn append(
    conn: &mut SqliteConnection,
    activity: &NewSchoolActivity,
) -> Result<(), SqliteError> {
    sqlx::query(
        r#"
        INSERT INTO school_activity_logs
            (school_id, activity_type, resource_id, file_size, file_extension, ip_address, user_agent, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(activity.school_id)
    .bind(activity.activity_type.as_str())
    .bind(activity.resource_id)
    .bind(activity.file_size)
    .bind(activity.file_extension.as_deref())
    .bind(activity.ip_address.as_deref())
    .bind(activity.user_agent.as_deref())
    .bind(now_secs())
    .execute(conn)
    .await?;

    Ok(())
}

/// Append unless the table has not been provisioned. Returns `false` when
/// skipped.
pub async fn append_if_provisioned(
    conn: &mut SqliteConnection,
    activity: &NewSchoolActivity,
) -> Result<bool, SqliteError> {
    match append(conn, activity).await {
        Ok(()) => Ok(true),
        Err(e) if e.is_missing_table() => {
            tracing::warn!(
                school_id = activity.school_id,
                activity_type = activity.activity_type.as_str(),
                "school_activity_logs not provisioned, entry skipped"
            );
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// One page of the school feed
pub async fn list(
    pool: &SqlitePool,
    params: &ListSchoolActivityParams,
) -> Result<Vec<SchoolActivityRow>, SqliteError> {
    let dir = params.order.as_sql();
    let sql = format!(
        r#"
        SELECT sal.id, sal.school_id, u.name AS school_name, u.organization, u.email,
               sal.activity_type, sal.resource_id,
               r.title AS resource_name, rt.name AS resource_type,
               sal.file_size, sal.file_extension, sal.ip_address, sal.user_agent, sal.created_at,
               CASE WHEN r.id IS NULL THEN 'Login Activity'
                    ELSE r.title || ' (' || COALESCE(rt.name, 'Unknown') || ')'
               END AS resource_details
        {filter}
        ORDER BY {column} {dir}, sal.id {dir}
        LIMIT ?6 OFFSET ?7
        "#,
        filter = FEED_FILTER,
        column = params.sort.column(),
        dir = dir,
    );

    let filter = &params.filter;
    let rows = sqlx::query_as::<_, SchoolActivityRow>(&sql)
        .bind(filter.school_id)
        .bind(school_name(filter))
        .bind(filter.activity_type.map(|t| t.as_str()))
        .bind(filter.from)
        .bind(filter.to)
        .bind(i64::from(params.limit))
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Number of rows the feed can return across all pages
pub async fn count(pool: &SqlitePool, filter: &SchoolActivityFilter) -> Result<u64, SqliteError> {
    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {}", FEED_FILTER))
        .bind(filter.school_id)
        .bind(school_name(filter))
        .bind(filter.activity_type.map(|t| t.as_str()))
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(pool)
        .await?;

    Ok(total.max(0) as u64)
}

fn school_name(filter: &SchoolActivityFilter) -> Option<&str> {
    filter
        .school_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
