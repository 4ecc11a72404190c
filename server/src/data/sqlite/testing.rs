//! In-memory store fixtures shared by repository, domain and API tests

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use super::schema::{AUDIT_SCHEMA, SCHEMA};

/// Single-connection in-memory pool.
///
/// Every connection to `sqlite::memory:` opens a separate database, so the
/// pool is pinned to one connection that never expires.
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

/// Pool with the full schema applied
pub async fn setup_test_pool() -> SqlitePool {
    let pool = setup_core_pool().await;
    sqlx::query(AUDIT_SCHEMA).execute(&pool).await.unwrap();
    pool
}

/// Pool with only the version 1 tables (audit tables not provisioned)
pub async fn setup_core_pool() -> SqlitePool {
    let pool = memory_pool().await;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(SCHEMA).execute(&pool).await.unwrap();
    pool
}

pub async fn insert_user(
    pool: &SqlitePool,
    name: &str,
    role: &str,
    organization: Option<&str>,
) -> i64 {
    sqlx::query(
        "INSERT INTO users (name, email, role, organization, created_at, updated_at) VALUES (?, ?, ?, ?, 1000, 1000)",
    )
    .bind(name)
    .bind(format!("{}@edushare.test", name.to_lowercase().replace(' ', ".")))
    .bind(role)
    .bind(organization)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

pub async fn insert_subject(pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query("INSERT INTO subjects (name, created_at) VALUES (?, 1000)")
        .bind(name)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

pub async fn insert_grade(pool: &SqlitePool, name: &str, level: i64) -> i64 {
    sqlx::query("INSERT INTO grades (name, level, created_at) VALUES (?, ?, 1000)")
        .bind(name)
        .bind(level)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

pub async fn insert_resource_type(pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query("INSERT INTO resource_types (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

/// Insert a resource owned by `owner`, created at `created_at`
pub async fn insert_resource(
    pool: &SqlitePool,
    title: &str,
    subject_id: i64,
    grade_id: i64,
    owner: i64,
    status: &str,
    created_at: i64,
) -> i64 {
    sqlx::query(
        r#"
        INSERT INTO resources (title, subject_id, grade_id, status, created_by, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(title)
    .bind(subject_id)
    .bind(grade_id)
    .bind(status)
    .bind(owner)
    .bind(created_at)
    .bind(created_at)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

pub async fn set_resource_file(pool: &SqlitePool, resource_id: i64, path: &str, size: i64) {
    let extension = path.rsplit_once('.').map(|(_, ext)| ext.to_string());
    sqlx::query(
        "UPDATE resources SET file_path = ?, file_name = ?, file_size = ?, file_extension = ? WHERE id = ?",
    )
    .bind(path)
    .bind(path.rsplit('/').next())
    .bind(size)
    .bind(extension)
    .bind(resource_id)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}
