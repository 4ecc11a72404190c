//! Data storage layer
//!
//! - `sqlite` - connection pool, schema, migrations and repositories
//! - `types` - row, parameter and result types shared with the domain layer
//! - `traits` - the repository seam domain services depend on
//! - `error` - unified error type with the caller-facing error kinds

pub mod error;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::{DataError, ErrorKind};
pub use sqlite::SqliteService;
pub use traits::PortalRepository;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::storage::AppStorage;

/// Process-wide handle to the relational store
///
/// Initialized once at startup, injected into every service, and closed at
/// shutdown.
pub struct Database {
    sqlite: Arc<SqliteService>,
}

impl Database {
    pub async fn init(storage: &AppStorage, max_connections: u32) -> Result<Self, DataError> {
        let service = SqliteService::init(storage, max_connections).await?;
        Ok(Self {
            sqlite: Arc::new(service),
        })
    }

    /// Wrap an existing pool (tests)
    #[cfg(test)]
    pub fn from_pool(pool: sqlx::SqlitePool) -> Self {
        Self {
            sqlite: Arc::new(SqliteService::from_pool(pool)),
        }
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        self.sqlite.pool()
    }

    /// Run a WAL checkpoint
    pub async fn checkpoint(&self) -> Result<(), DataError> {
        self.sqlite.checkpoint().await.map_err(Into::into)
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.sqlite.close().await
    }

    pub fn start_checkpoint_task(&self, shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        self.sqlite.start_checkpoint_task(shutdown_rx)
    }

    /// Get the repository trait object for data operations
    pub fn repository(&self) -> Box<dyn PortalRepository + Send + Sync> {
        Box::new(Arc::clone(&self.sqlite))
    }
}
