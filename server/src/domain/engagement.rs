//! Engagement counters: views, downloads and likes
//!
//! Every counter change is paired with its fact row inside one store
//! transaction. This service adds the checks that need the filesystem or a
//! retry loop around the store call.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use super::ClientInfo;
use crate::data::types::{Actor, Interaction, LikeToggle, ResourceRow, UserRole};
use crate::data::{DataError, Database, ErrorKind};
use crate::utils::file::resolve_upload_path;
use crate::utils::retry::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, retry_async};

/// What the caller needs to stream a recorded download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadTicket {
    pub resource_id: i64,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    #[serde(skip)]
    pub path: PathBuf,
    pub download_count: i64,
}

#[derive(Clone)]
pub struct EngagementService {
    database: Arc<Database>,
    uploads_dir: PathBuf,
}

impl EngagementService {
    pub fn new(database: Arc<Database>, uploads_dir: PathBuf) -> Self {
        Self {
            database,
            uploads_dir,
        }
    }

    /// Record a view. Returns the new `view_count`.
    pub async fn record_view(
        &self,
        resource_id: i64,
        actor: Option<&Actor>,
        client: &ClientInfo,
    ) -> Result<i64, DataError> {
        let interaction = interaction(resource_id, actor, client);
        let count = self
            .database
            .repository()
            .record_view(&interaction)
            .await
            .inspect_err(|e| {
                tracing::warn!(step = "record_view", resource_id, error = %e, "View not recorded")
            })?;

        tracing::debug!(resource_id, actor_id = ?interaction.actor_id, view_count = count, "View recorded");
        Ok(count)
    }

    /// Record a download of `resource`.
    ///
    /// Fails with `NotFound` for entity `file`, without touching the store,
    /// when the backing file is missing.
    pub async fn record_download(
        &self,
        resource: &ResourceRow,
        actor: Option<&Actor>,
        client: &ClientInfo,
    ) -> Result<DownloadTicket, DataError> {
        let path = self.backing_file(resource).await?;

        let interaction = interaction(resource.id, actor, client);
        let count = self
            .database
            .repository()
            .record_download(&interaction)
            .await
            .inspect_err(|e| {
                tracing::warn!(step = "record_download", resource_id = resource.id, error = %e, "Download not recorded")
            })?;

        tracing::debug!(
            resource_id = resource.id,
            actor_id = ?interaction.actor_id,
            download_count = count,
            "Download recorded"
        );
        Ok(DownloadTicket {
            resource_id: resource.id,
            file_name: resource.file_name.clone(),
            file_size: resource.file_size,
            path,
            download_count: count,
        })
    }

    /// Like or unlike a resource for `user_id`.
    ///
    /// A unique-constraint conflict means a concurrent toggle won the race;
    /// the toggle is retried against the fresh state.
    pub async fn toggle_like(&self, resource_id: i64, user_id: i64) -> Result<LikeToggle, DataError> {
        let repo = self.database.repository();
        let toggle = retry_async(
            DEFAULT_MAX_ATTEMPTS,
            DEFAULT_BASE_DELAY_MS,
            lost_like_race,
            || repo.toggle_like(resource_id, user_id),
        )
        .await
        .inspect_err(|e| {
            tracing::warn!(step = "toggle_like", resource_id, user_id, error = %e, "Like toggle failed")
        })?;

        tracing::debug!(resource_id, user_id, liked = toggle.liked, likes = toggle.likes, "Like toggled");
        Ok(toggle)
    }

    async fn backing_file(&self, resource: &ResourceRow) -> Result<PathBuf, DataError> {
        let missing = || DataError::not_found("file", resource.id);

        let path = resource
            .file_path
            .as_deref()
            .and_then(|stored| resolve_upload_path(&self.uploads_dir, stored))
            .ok_or_else(missing)?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(missing()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(missing()),
            Err(e) => Err(e.into()),
        }
    }
}

/// A concurrent toggle for the same pair committed first
fn lost_like_race(e: &DataError) -> bool {
    e.kind() == ErrorKind::Conflict
}

fn interaction(resource_id: i64, actor: Option<&Actor>, client: &ClientInfo) -> Interaction {
    Interaction {
        resource_id,
        actor_id: actor.map(|a| a.id),
        log_school_activity: actor.is_some_and(|a| a.role == UserRole::School),
        ip_address: client.ip_address.clone(),
        user_agent: client.user_agent.clone(),
    }
}
