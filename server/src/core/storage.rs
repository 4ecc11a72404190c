//! Platform-aware data storage directory management
//!
//! ## Platform Paths
//!
//! | Type | Windows | macOS | Linux |
//! |------|---------|-------|-------|
//! | Data | `%APPDATA%\EduShare\` | `~/Library/Application Support/EduShare/` | `$XDG_DATA_HOME/edushare/` |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

use super::config::AppConfig;
use super::constants::{APP_DOT_FOLDER, APP_NAME, ENV_DATA_DIR};
use crate::utils::file::expand_path;

/// Data subdirectories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSubdir {
    Sqlite,
    Uploads,
}

impl DataSubdir {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DataSubdir::Sqlite => "sqlite",
            DataSubdir::Uploads => "uploads",
        }
    }
}

/// Application storage manager
#[derive(Debug, Clone)]
pub struct AppStorage {
    data_dir: PathBuf,
    uploads_dir: PathBuf,
}

impl AppStorage {
    /// Initialize storage with platform-appropriate data directory
    pub async fn init(config: &AppConfig) -> Result<Self> {
        let data_dir = Self::resolve_data_dir();
        let uploads_dir = config
            .storage
            .uploads_dir
            .as_deref()
            .map(expand_path)
            .unwrap_or_else(|| data_dir.join(DataSubdir::Uploads.as_str()));

        for dir in [data_dir.join(DataSubdir::Sqlite.as_str()), uploads_dir.clone()] {
            create_dir(&dir).await?;
        }

        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);
        let uploads_dir = uploads_dir.canonicalize().unwrap_or(uploads_dir);

        tracing::debug!(
            data_dir = %data_dir.display(),
            uploads_dir = %uploads_dir.display(),
            "Storage initialized"
        );

        if config.debug {
            tracing::warn!("Debug mode enabled");
        }

        Ok(Self {
            data_dir,
            uploads_dir,
        })
    }

    /// Resolve data directory from env var or platform default
    pub fn resolve_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            return expand_path(&dir);
        }

        if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
            return proj_dirs.data_dir().to_path_buf();
        }

        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        cwd.join(APP_DOT_FOLDER)
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Root directory resource files are stored under
    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Get path to a subdirectory of the data directory
    pub fn subdir(&self, subdir: DataSubdir) -> PathBuf {
        let path = self.data_dir.join(subdir.as_str());
        path.canonicalize().unwrap_or(path)
    }

    /// Create AppStorage for testing with a specific data directory
    #[cfg(test)]
    pub fn init_for_test(data_dir: PathBuf) -> Self {
        let uploads_dir = data_dir.join(DataSubdir::Uploads.as_str());
        Self {
            data_dir,
            uploads_dir,
        }
    }
}

async fn create_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}
