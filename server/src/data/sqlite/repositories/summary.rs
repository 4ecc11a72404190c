//! Dashboard aggregate queries

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{ActionCount, AdminActivitySummary, EngagementFact};

fn count_sql(fact: EngagementFact) -> &'static str {
    match fact {
        EngagementFact::Views => "SELECT COUNT(*) FROM resource_views",
        EngagementFact::Downloads => "SELECT COUNT(*) FROM resource_downloads",
        EngagementFact::Likes => "SELECT COUNT(*) FROM resource_likes",
    }
}

/// Rows in one engagement fact table
pub async fn count_facts(pool: &SqlitePool, fact: EngagementFact) -> Result<i64, SqliteError> {
    let total: i64 = sqlx::query_scalar(count_sql(fact)).fetch_one(pool).await?;
    Ok(total)
}

/// Audit actions performed by one user
pub async fn admin_activity(
    pool: &SqlitePool,
    admin_id: i64,
) -> Result<AdminActivitySummary, SqliteError> {
    let (total_actions, last_action_at): (i64, Option<i64>) =
        sqlx::query_as("SELECT COUNT(*), MAX(created_at) FROM activity_logs WHERE user_id = ?")
            .bind(admin_id)
            .fetch_one(pool)
            .await?;

    let actions: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT action, COUNT(*) AS n
        FROM activity_logs
        WHERE user_id = ?
        GROUP BY action
        ORDER BY n DESC, action
        "#,
    )
    .bind(admin_id)
    .fetch_all(pool)
    .await?;

    Ok(AdminActivitySummary {
        admin_id,
        total_actions,
        last_action_at,
        actions: actions
            .into_iter()
            .map(|(action, count)| ActionCount { action, count })
            .collect(),
    })
}
