// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "EduShare";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".edushare";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "edushare.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "EDUSHARE_CONFIG";

// =============================================================================
// Environment Variables - Debug
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "EDUSHARE_DEBUG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "EDUSHARE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "EDUSHARE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "EDUSHARE_LOG";

/// Default log filter when neither EDUSHARE_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "info,edushare=info";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5480;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "EDUSHARE_DATA_DIR";

/// Environment variable for the uploads directory
pub const ENV_UPLOADS_DIR: &str = "EDUSHARE_UPLOADS_DIR";

// =============================================================================
// Environment Variables - Auth & Access
// =============================================================================

/// Environment variable for the HS256 token secret
pub const ENV_JWT_SECRET: &str = "EDUSHARE_JWT_SECRET";

/// Environment variable for grant enforcement on published resources
pub const ENV_REQUIRE_GRANT_FOR_PUBLISHED: &str = "EDUSHARE_REQUIRE_GRANT_FOR_PUBLISHED";

/// Environment variable for the connection pool size
pub const ENV_DB_MAX_CONNECTIONS: &str = "EDUSHARE_DB_MAX_CONNECTIONS";

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "edushare.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 8;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// Pages written before SQLite checkpoints the WAL on its own
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// Interval between background WAL checkpoints
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Activity Feed
// =============================================================================

/// Events shown in the dashboard's recent activity list
pub const DASHBOARD_RECENT_EVENTS: u32 = 10;

// =============================================================================
// Shutdown
// =============================================================================

/// Max time to wait for background tasks on shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// HTTP
// =============================================================================

/// Request body limit for API routes (permission batches are the largest)
pub const DEFAULT_BODY_LIMIT: usize = 256 * 1024;
