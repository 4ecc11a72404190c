//! Permission grant repository for SQLite operations
//!
//! Every mutation runs in one transaction together with its audit entry, so a
//! failed validation leaves the previous grant set untouched.

use std::collections::HashSet;

use sqlx::{SqliteConnection, SqlitePool};

use super::{activity_log, catalog};
use crate::data::sqlite::SqliteError;
use crate::data::types::{GrantRef, GrantRow, NewLogEntry};
use crate::utils::time::now_secs;

/// List a school's grants ordered by subject name, then grade level
pub async fn list_grants(pool: &SqlitePool, school_id: i64) -> Result<Vec<GrantRow>, SqliteError> {
    let rows: Vec<(i64, String, i64, String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT p.subject_id, s.name, p.grade_id, g.name, g.level, p.created_at
        FROM school_subject_permissions p
        JOIN subjects s ON s.id = p.subject_id
        JOIN grades g ON g.id = p.grade_id
        WHERE p.school_id = ?
        ORDER BY s.name, s.id, g.level, g.id
        "#,
    )
    .bind(school_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(subject_id, subject_name, grade_id, grade_name, grade_level, created_at)| GrantRow {
                subject_id,
                subject_name,
                grade_id,
                grade_name,
                grade_level,
                created_at,
            },
        )
        .collect())
}

/// Check whether a school holds a grant
pub async fn has_grant(
    pool: &SqlitePool,
    school_id: i64,
    grant: GrantRef,
) -> Result<bool, SqliteError> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM school_subject_permissions
            WHERE school_id = ? AND subject_id = ? AND grade_id = ?
        )
        "#,
    )
    .bind(school_id)
    .bind(grant.subject_id)
    .bind(grant.grade_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Replace the full grant set atomically. Returns the number of grants held
/// afterwards.
pub async fn replace_grants(
    pool: &SqlitePool,
    school_id: i64,
    grants: &[GrantRef],
    audit: &NewLogEntry,
) -> Result<u64, SqliteError> {
    let mut tx = pool.begin().await?;

    ensure_school(&mut tx, school_id).await?;

    sqlx::query("DELETE FROM school_subject_permissions WHERE school_id = ?")
        .bind(school_id)
        .execute(&mut *tx)
        .await?;

    validate_grants(&mut tx, grants).await?;
    let inserted = insert_grants(&mut tx, school_id, grants).await?;

    activity_log::append_if_provisioned(&mut tx, audit).await?;
    tx.commit().await?;

    tracing::debug!(school_id, grants = inserted, "Replaced school permissions");
    Ok(inserted)
}

/// Add grants, leaving existing triples untouched. Returns how many were new.
pub async fn add_grants(
    pool: &SqlitePool,
    school_id: i64,
    grants: &[GrantRef],
    audit: &NewLogEntry,
) -> Result<u64, SqliteError> {
    let mut tx = pool.begin().await?;

    ensure_school(&mut tx, school_id).await?;
    validate_grants(&mut tx, grants).await?;
    let inserted = insert_grants(&mut tx, school_id, grants).await?;

    activity_log::append_if_provisioned(&mut tx, audit).await?;
    tx.commit().await?;

    tracing::debug!(school_id, added = inserted, "Added school permissions");
    Ok(inserted)
}

/// Remove the named grants. Missing triples are ignored. Returns how many
/// were deleted.
pub async fn remove_grants(
    pool: &SqlitePool,
    school_id: i64,
    grants: &[GrantRef],
    audit: &NewLogEntry,
) -> Result<u64, SqliteError> {
    let mut tx = pool.begin().await?;

    ensure_school(&mut tx, school_id).await?;

    let mut removed = 0;
    for grant in grants {
        let result = sqlx::query(
            r#"
            DELETE FROM school_subject_permissions
            WHERE school_id = ? AND subject_id = ? AND grade_id = ?
            "#,
        )
        .bind(school_id)
        .bind(grant.subject_id)
        .bind(grant.grade_id)
        .execute(&mut *tx)
        .await?;
        removed += result.rows_affected();
    }

    activity_log::append_if_provisioned(&mut tx, audit).await?;
    tx.commit().await?;

    tracing::debug!(school_id, removed, "Removed school permissions");
    Ok(removed)
}

/// Fail with `NotFound` unless the id belongs to a school account
async fn ensure_school(conn: &mut SqliteConnection, school_id: i64) -> Result<(), SqliteError> {
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = ?")
        .bind(school_id)
        .fetch_optional(conn)
        .await?;

    match role.as_deref() {
        Some("school") => Ok(()),
        _ => Err(SqliteError::not_found("school", school_id)),
    }
}

/// Check every subject and grade against the catalogs
async fn validate_grants(
    conn: &mut SqliteConnection,
    grants: &[GrantRef],
) -> Result<(), SqliteError> {
    let mut subjects = HashSet::new();
    let mut grades = HashSet::new();

    for grant in grants {
        if subjects.insert(grant.subject_id)
            && !catalog::subject_exists(conn, grant.subject_id).await?
        {
            return Err(SqliteError::invalid_reference("subject", grant.subject_id));
        }
        if grades.insert(grant.grade_id) && !catalog::grade_exists(conn, grant.grade_id).await? {
            return Err(SqliteError::invalid_reference("grade", grant.grade_id));
        }
    }
    Ok(())
}

async fn insert_grants(
    conn: &mut SqliteConnection,
    school_id: i64,
    grants: &[GrantRef],
) -> Result<u64, SqliteError> {
    let now = now_secs();
    let mut inserted = 0;

    for grant in grants {
        let result = sqlx::query(
            r#"
            INSERT INTO school_subject_permissions (school_id, subject_id, grade_id, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (school_id, subject_id, grade_id) DO NOTHING
            "#,
        )
        .bind(school_id)
        .bind(grant.subject_id)
        .bind(grant.grade_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}
