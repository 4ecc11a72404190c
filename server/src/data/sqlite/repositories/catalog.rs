//! Subject and grade catalog lookups

use sqlx::SqliteConnection;

use crate::data::sqlite::SqliteError;

/// Check that a subject exists
pub async fn subject_exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, SqliteError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM subjects WHERE id = ?)")
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(exists)
}

/// Check that a grade exists
pub async fn grade_exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, SqliteError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM grades WHERE id = ?)")
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(exists)
}
