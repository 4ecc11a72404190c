//! Audit log writes (`activity_logs`)

use sqlx::SqliteConnection;

use crate::data::sqlite::SqliteError;
use crate::data::types::NewLogEntry;
use crate::utils::time::now_secs;

/// Append an audit entry
pub async fn append(conn: &mut SqliteConnection, entry: &NewLogEntry) -> Result<(), SqliteError> {
    sqlx::query(
        r#"
        INSERT INTO activity_logs (user_id, action, resource_id, details, ip_address, user_agent, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.user_id)
    .bind(&entry.action)
    .bind(entry.resource_id)
    .bind(entry.details.to_string())
    .bind(entry.ip_address.as_deref())
    .bind(entry.user_agent.as_deref())
    .bind(now_secs())
    .execute(conn)
    .await?;

    Ok(())
}

/// Append an audit entry unless the audit table has not been provisioned.
///
/// Returns `false` when the entry was skipped. The caller's transaction
/// stays usable in that case.
pub async fn append_if_provisioned(
    conn: &mut SqliteConnection,
    entry: &NewLogEntry,
) -> Result<bool, SqliteError> {
    match append(conn, entry).await {
        Ok(()) => Ok(true),
        Err(e) if e.is_missing_table() => {
            tracing::warn!(action = %entry.action, "activity_logs not provisioned, audit entry skipped");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
