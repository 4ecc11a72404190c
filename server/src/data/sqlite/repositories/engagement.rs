//! Engagement repository: fact rows and the counters they back
//!
//! Each write runs in one transaction that bumps the counter, inserts the fact
//! row and (for schools) appends to the school activity log. The counter
//! update is issued first so the transaction takes the write lock before
//! reading anything.

use sqlx::SqlitePool;

use super::school_activity;
use crate::data::sqlite::SqliteError;
use crate::data::types::{Interaction, LikeToggle, NewSchoolActivity, SchoolActivityType};
use crate::utils::time::now_secs;

#[derive(Debug, Clone, Copy)]
enum Fact {
    View,
    Download,
}

impl Fact {
    fn bump_sql(self) -> &'static str {
        match self {
            Self::View => {
                "UPDATE resources SET view_count = view_count + 1 WHERE id = ? RETURNING view_count, file_size, file_extension"
            }
            Self::Download => {
                "UPDATE resources SET download_count = download_count + 1 WHERE id = ? RETURNING download_count, file_size, file_extension"
            }
        }
    }

    fn insert_sql(self) -> &'static str {
        match self {
            Self::View => {
                "INSERT INTO resource_views (resource_id, user_id, ip_address, user_agent, created_at) VALUES (?, ?, ?, ?, ?)"
            }
            Self::Download => {
                "INSERT INTO resource_downloads (resource_id, user_id, ip_address, user_agent, created_at) VALUES (?, ?, ?, ?, ?)"
            }
        }
    }

    fn activity_type(self) -> SchoolActivityType {
        match self {
            Self::View => SchoolActivityType::View,
            Self::Download => SchoolActivityType::Download,
        }
    }
}

/// Record a view. Returns the new `view_count`.
pub async fn record_view(pool: &SqlitePool, interaction: &Interaction) -> Result<i64, SqliteError> {
    record(pool, interaction, Fact::View).await
}

/// Record a download. Returns the new `download_count`.
///
/// The backing file is checked by the caller before this runs.
pub async fn record_download(
    pool: &SqlitePool,
    interaction: &Interaction,
) -> Result<i64, SqliteError> {
    record(pool, interaction, Fact::Download).await
}

async fn record(
    pool: &SqlitePool,
    interaction: &Interaction,
    fact: Fact,
) -> Result<i64, SqliteError> {
    let mut tx = pool.begin().await?;

    let bumped: Option<(i64, Option<i64>, Option<String>)> = sqlx::query_as(fact.bump_sql())
        .bind(interaction.resource_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some((count, file_size, file_extension)) = bumped else {
        return Err(SqliteError::not_found("resource", interaction.resource_id));
    };

    sqlx::query(fact.insert_sql())
        .bind(interaction.resource_id)
        .bind(interaction.actor_id)
        .bind(interaction.ip_address.as_deref())
        .bind(interaction.user_agent.as_deref())
        .bind(now_secs())
        .execute(&mut *tx)
        .await?;

    if interaction.log_school_activity
        && let Some(school_id) = interaction.actor_id
    {
        let downloads = matches!(fact, Fact::Download);
        let activity = NewSchoolActivity {
            school_id,
            activity_type: fact.activity_type(),
            resource_id: Some(interaction.resource_id),
            file_size: if downloads { file_size } else { None },
            file_extension: if downloads { file_extension } else { None },
            ip_address: interaction.ip_address.clone(),
            user_agent: interaction.user_agent.clone(),
        };
        school_activity::append_if_provisioned(&mut tx, &activity).await?;
    }

    tx.commit().await?;
    Ok(count)
}

/// Toggle a like. Deletes the pair if present, inserts it otherwise, and
/// moves `likes` by one in the same transaction.
///
/// A concurrent insert of the same pair surfaces as a unique violation.
pub async fn toggle_like(
    pool: &SqlitePool,
    resource_id: i64,
    user_id: i64,
) -> Result<LikeToggle, SqliteError> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM resource_likes WHERE resource_id = ? AND user_id = ?")
        .bind(resource_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let toggle = if removed > 0 {
        let likes: i64 =
            sqlx::query_scalar("UPDATE resources SET likes = likes - 1 WHERE id = ? RETURNING likes")
                .bind(resource_id)
                .fetch_one(&mut *tx)
                .await?;
        LikeToggle {
            resource_id,
            liked: false,
            likes,
        }
    } else {
        let likes: Option<i64> =
            sqlx::query_scalar("UPDATE resources SET likes = likes + 1 WHERE id = ? RETURNING likes")
                .bind(resource_id)
                .fetch_optional(&mut *tx)
                .await?;
        let likes = likes.ok_or_else(|| SqliteError::not_found("resource", resource_id))?;

        sqlx::query("INSERT INTO resource_likes (resource_id, user_id, created_at) VALUES (?, ?, ?)")
            .bind(resource_id)
            .bind(user_id)
            .bind(now_secs())
            .execute(&mut *tx)
            .await?;
        LikeToggle {
            resource_id,
            liked: true,
            likes,
        }
    };

    tx.commit().await?;
    Ok(toggle)
}
