//! SQLite error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{entity} {id} does not exist")]
    InvalidReference { entity: &'static str, id: i64 },
}

impl SqliteError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn invalid_reference(entity: &'static str, id: i64) -> Self {
        Self::InvalidReference { entity, id }
    }

    /// True when a statement referenced a table that has not been provisioned.
    ///
    /// SQLite reports this at prepare time, so an open transaction is still
    /// usable after this error.
    pub fn is_missing_table(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db)) => db.message().contains("no such table"),
            _ => false,
        }
    }

    /// True when a UNIQUE or PRIMARY KEY constraint rejected a write
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_failed_error_display() {
        let err = SqliteError::MigrationFailed {
            version: 2,
            name: "audit_logs".to_string(),
            error: "syntax error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Migration 2 (audit_logs) failed: syntax error"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = SqliteError::not_found("resource", 42);
        assert_eq!(err.to_string(), "resource 42 not found");
    }

    #[test]
    fn test_invalid_reference_display() {
        let err = SqliteError::invalid_reference("grade", 9);
        assert_eq!(err.to_string(), "grade 9 does not exist");
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let sqlite_err: SqliteError = io_err.into();
        assert!(sqlite_err.to_string().contains("file not found"));
        assert!(!sqlite_err.is_missing_table());
    }

    #[tokio::test]
    async fn test_missing_table_detected() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        let err: SqliteError = sqlx::query("SELECT * FROM activity_logs")
            .execute(&pool)
            .await
            .unwrap_err()
            .into();
        assert!(err.is_missing_table());
        assert!(!err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_unique_violation_detected() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::query("CREATE TABLE t (id INTEGER PRIMARY KEY)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO t (id) VALUES (1)")
            .execute(&pool)
            .await
            .unwrap();
        let err: SqliteError = sqlx::query("INSERT INTO t (id) VALUES (1)")
            .execute(&pool)
            .await
            .unwrap_err()
            .into();
        assert!(err.is_unique_violation());
    }
}
