//! Unified error type for the data layer
//!
//! Every store failure surfaces as one of a small set of kinds so callers
//! (domain services, HTTP handlers) can react without inspecting driver
//! errors.

use thiserror::Error;

use crate::data::sqlite::SqliteError;

/// Classification callers can match on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidReference,
    Forbidden,
    Conflict,
    StoreUnavailable,
    Internal,
}

/// Unified error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// Referenced entity does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A write referenced a catalog entity that does not exist
    #[error("Invalid reference: {entity} {id} does not exist")]
    InvalidReference { entity: &'static str, id: i64 },

    /// Actor is not allowed to perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Write lost a race against a concurrent writer
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backing table or connection is not available
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Any other SQLite failure
    #[error("SQLite error: {0}")]
    Sqlite(sqlx::Error),

    /// Migration failed
    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Classify a driver error.
    ///
    /// Unique violations become `Conflict`; missing tables and pool failures
    /// become `StoreUnavailable`.
    pub fn from_sqlite(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.message().contains("no such table") => {
                Self::StoreUnavailable(db.message().to_string())
            }
            sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
                Self::StoreUnavailable(e.to_string())
            }
            _ => Self::Sqlite(e),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidReference { .. } => ErrorKind::InvalidReference,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            Self::Sqlite(_) | Self::MigrationFailed { .. } | Self::Config(_) | Self::Io(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Check if retrying the same operation may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Conflict(_) => true,
            Self::Sqlite(e) => matches!(e, sqlx::Error::Io(_)),
            _ => false,
        }
    }
}

impl From<sqlx::Error> for DataError {
    fn from(e: sqlx::Error) -> Self {
        Self::from_sqlite(e)
    }
}

impl From<SqliteError> for DataError {
    fn from(e: SqliteError) -> Self {
        match e {
            SqliteError::Database(e) => Self::from_sqlite(e),
            SqliteError::MigrationFailed {
                version,
                name,
                error,
            } => Self::MigrationFailed {
                version,
                name,
                error,
            },
            SqliteError::Io(e) => Self::Io(e),
            SqliteError::NotFound { entity, id } => Self::NotFound { entity, id },
            SqliteError::InvalidReference { entity, id } => Self::InvalidReference { entity, id },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = DataError::not_found("school", 7);
        assert_eq!(err.to_string(), "school 7 not found");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_sqlite_error_mapping_preserves_kind() {
        let err: DataError = SqliteError::invalid_reference("subject", 3).into();
        assert_eq!(err.kind(), ErrorKind::InvalidReference);

        let err: DataError = SqliteError::not_found("resource", 1).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_pool_closed_is_store_unavailable() {
        let err = DataError::from_sqlite(sqlx::Error::PoolClosed);
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    }

    #[test]
    fn test_is_transient() {
        assert!(DataError::Conflict("unique".into()).is_transient());
        assert!(!DataError::forbidden("no grant").is_transient());
        assert!(!DataError::Config("bad".into()).is_transient());
    }

    #[tokio::test]
    async fn test_missing_table_is_store_unavailable() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        // SqliteRow is not Debug, so unwrap_err is unavailable here
        let err: DataError = match sqlx::query("SELECT COUNT(*) FROM school_activity_logs")
            .fetch_one(&pool)
            .await
        {
            Ok(_) => panic!("query against a missing table succeeded"),
            Err(e) => e.into(),
        };
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    }
}
