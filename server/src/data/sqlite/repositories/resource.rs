//! Resource repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{ListResourcesParams, ResourceRow, ResourceStats, ResourceSummary};

/// Shared predicate for listing and counting.
///
/// ?1 status, ?2 school whose grants must cover the resource, ?3 subject,
/// ?4 grade, ?5 type, ?6 title substring.
const LISTING_FILTER: &str = r#"
    FROM resources r
    JOIN subjects s ON s.id = r.subject_id
    JOIN grades g ON g.id = r.grade_id
    LEFT JOIN resource_types t ON t.id = r.type_id
    WHERE (?1 IS NULL OR r.status = ?1)
      AND (?2 IS NULL OR EXISTS (
            SELECT 1 FROM school_subject_permissions p
            WHERE p.school_id = ?2 AND p.subject_id = r.subject_id AND p.grade_id = r.grade_id))
      AND (?3 IS NULL OR r.subject_id = ?3)
      AND (?4 IS NULL OR r.grade_id = ?4)
      AND (?5 IS NULL OR r.type_id = ?5)
      AND (?6 IS NULL OR r.title LIKE '%' || ?6 || '%')
"#;

/// Get a resource by ID
pub async fn get_resource(pool: &SqlitePool, id: i64) -> Result<Option<ResourceRow>, SqliteError> {
    let row = sqlx::query_as::<_, ResourceRow>(
        r#"
        SELECT id, title, description, subject_id, grade_id, type_id, status,
               file_path, file_name, file_size, file_extension, created_by,
               view_count, download_count, likes, created_at, updated_at
        FROM resources
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// List resources, newest first, with the total matching count
pub async fn list_resources(
    pool: &SqlitePool,
    params: &ListResourcesParams,
) -> Result<(Vec<ResourceSummary>, u64), SqliteError> {
    let status = params.status.map(|s| s.as_str());
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {}", LISTING_FILTER))
        .bind(status)
        .bind(params.granted_to)
        .bind(params.subject_id)
        .bind(params.grade_id)
        .bind(params.type_id)
        .bind(search)
        .fetch_one(pool)
        .await?;

    let sql = format!(
        r#"
        SELECT r.id, r.title, r.description,
               r.subject_id, s.name AS subject_name,
               r.grade_id, g.name AS grade_name,
               r.type_id, t.name AS type_name,
               r.status, r.file_name, r.file_size, r.file_extension, r.created_by,
               r.view_count, r.download_count, r.likes,
               (SELECT GROUP_CONCAT(rt.tag, char(31)) FROM resource_tags rt
                WHERE rt.resource_id = r.id) AS tags,
               r.created_at, r.updated_at
        {}
        ORDER BY r.created_at DESC, r.id DESC
        LIMIT ?7 OFFSET ?8
        "#,
        LISTING_FILTER
    );

    let rows = sqlx::query_as::<_, ResourceSummary>(&sql)
        .bind(status)
        .bind(params.granted_to)
        .bind(params.subject_id)
        .bind(params.grade_id)
        .bind(params.type_id)
        .bind(search)
        .bind(i64::from(params.limit))
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

    Ok((rows, total.max(0) as u64))
}

/// Counters alongside live fact-row counts
pub async fn resource_stats(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<ResourceStats>, SqliteError> {
    let row: Option<(i64, i64, i64, i64, i64, i64, i64)> = sqlx::query_as(
        r#"
        SELECT r.id, r.view_count, r.download_count, r.likes,
               (SELECT COUNT(*) FROM resource_views v WHERE v.resource_id = r.id),
               (SELECT COUNT(*) FROM resource_downloads d WHERE d.resource_id = r.id),
               (SELECT COUNT(*) FROM resource_likes l WHERE l.resource_id = r.id)
        FROM resources r
        WHERE r.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(
        |(resource_id, view_count, download_count, likes, view_rows, download_rows, like_rows)| {
            ResourceStats {
                resource_id,
                view_count,
                download_count,
                likes,
                view_rows,
                download_rows,
                like_rows,
            }
        },
    ))
}

/// Count resources grouped by status
pub async fn count_by_status(pool: &SqlitePool) -> Result<Vec<(String, i64)>, SqliteError> {
    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM resources GROUP BY status ORDER BY status")
            .fetch_all(pool)
            .await?;
    Ok(rows)
}
