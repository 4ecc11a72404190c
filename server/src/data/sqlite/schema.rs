//! SQLite schema definitions
//!
//! Version 1 holds the catalog, engagement and permission tables. Version 2
//! provisions the audit tables, which older deployments may not have yet.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Initial schema (version 1)
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Users (admins and school accounts)
-- =============================================================================
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    email TEXT NOT NULL UNIQUE CHECK(length(email) >= 3),
    role TEXT NOT NULL CHECK(role IN ('admin', 'school')),
    status TEXT NOT NULL DEFAULT 'active' CHECK(status IN ('active', 'inactive')),
    organization TEXT,
    last_login INTEGER,
    last_login_ip TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);
CREATE INDEX IF NOT EXISTS idx_users_last_login ON users(last_login);

-- =============================================================================
-- 2. Catalogs
-- =============================================================================
CREATE TABLE IF NOT EXISTS subjects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS grades (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    level INTEGER NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS resource_types (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

-- =============================================================================
-- 3. Resources (owned by a user, counters kept beside the fact tables)
-- =============================================================================
CREATE TABLE IF NOT EXISTS resources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL CHECK(length(title) >= 1),
    description TEXT,
    subject_id INTEGER NOT NULL REFERENCES subjects(id),
    grade_id INTEGER NOT NULL REFERENCES grades(id),
    type_id INTEGER REFERENCES resource_types(id),
    status TEXT NOT NULL DEFAULT 'draft' CHECK(status IN ('draft', 'published', 'archived')),
    file_path TEXT,
    file_name TEXT,
    file_size INTEGER,
    file_extension TEXT,
    created_by INTEGER NOT NULL REFERENCES users(id),
    view_count INTEGER NOT NULL DEFAULT 0 CHECK(view_count >= 0),
    download_count INTEGER NOT NULL DEFAULT 0 CHECK(download_count >= 0),
    likes INTEGER NOT NULL DEFAULT 0 CHECK(likes >= 0),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_resources_subject_grade ON resources(subject_id, grade_id);
CREATE INDEX IF NOT EXISTS idx_resources_status ON resources(status);
CREATE INDEX IF NOT EXISTS idx_resources_created_by ON resources(created_by);
CREATE INDEX IF NOT EXISTS idx_resources_created_at ON resources(created_at DESC);

CREATE TABLE IF NOT EXISTS resource_tags (
    resource_id INTEGER NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
    tag TEXT NOT NULL,
    PRIMARY KEY (resource_id, tag)
);

-- =============================================================================
-- 4. Engagement fact tables
-- =============================================================================
CREATE TABLE IF NOT EXISTS resource_views (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    resource_id INTEGER NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    ip_address TEXT,
    user_agent TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_resource_views_resource ON resource_views(resource_id);
CREATE INDEX IF NOT EXISTS idx_resource_views_user ON resource_views(user_id);
CREATE INDEX IF NOT EXISTS idx_resource_views_created ON resource_views(created_at DESC);

CREATE TABLE IF NOT EXISTS resource_downloads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    resource_id INTEGER NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    ip_address TEXT,
    user_agent TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_resource_downloads_resource ON resource_downloads(resource_id);
CREATE INDEX IF NOT EXISTS idx_resource_downloads_user ON resource_downloads(user_id);
CREATE INDEX IF NOT EXISTS idx_resource_downloads_created ON resource_downloads(created_at DESC);

CREATE TABLE IF NOT EXISTS resource_likes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    resource_id INTEGER NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at INTEGER NOT NULL,
    UNIQUE (resource_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_resource_likes_user ON resource_likes(user_id);

-- =============================================================================
-- 5. Permission grants (school x subject x grade)
-- =============================================================================
CREATE TABLE IF NOT EXISTS school_subject_permissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    school_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    subject_id INTEGER NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
    grade_id INTEGER NOT NULL REFERENCES grades(id) ON DELETE CASCADE,
    created_at INTEGER NOT NULL,
    UNIQUE (school_id, subject_id, grade_id)
);

CREATE INDEX IF NOT EXISTS idx_permissions_subject_grade ON school_subject_permissions(subject_id, grade_id);
"#;

/// Audit tables (version 2)
pub const AUDIT_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS activity_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    action TEXT NOT NULL,
    resource_id INTEGER REFERENCES resources(id) ON DELETE SET NULL,
    details TEXT,
    ip_address TEXT,
    user_agent TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_activity_logs_user ON activity_logs(user_id);
CREATE INDEX IF NOT EXISTS idx_activity_logs_action ON activity_logs(action);
CREATE INDEX IF NOT EXISTS idx_activity_logs_created ON activity_logs(created_at DESC);

CREATE TABLE IF NOT EXISTS school_activity_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    school_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    activity_type TEXT NOT NULL CHECK(activity_type IN ('login', 'view', 'download', 'upload')),
    resource_id INTEGER REFERENCES resources(id) ON DELETE SET NULL,
    file_size INTEGER,
    file_extension TEXT,
    ip_address TEXT,
    user_agent TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_school_activity_school ON school_activity_logs(school_id);
CREATE INDEX IF NOT EXISTS idx_school_activity_type ON school_activity_logs(activity_type);
CREATE INDEX IF NOT EXISTS idx_school_activity_created ON school_activity_logs(created_at DESC);
"#;
