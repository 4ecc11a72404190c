use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_DB_MAX_CONNECTIONS, ENV_DEBUG, ENV_HOST, ENV_JWT_SECRET, ENV_PORT,
    ENV_REQUIRE_GRANT_FOR_PUBLISHED, ENV_UPLOADS_DIR,
};

#[derive(Parser)]
#[command(name = "edushare")]
#[command(version, about = "EduShare resource portal server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug mode
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Maximum SQLite pool connections
    #[arg(long, global = true, env = ENV_DB_MAX_CONNECTIONS)]
    pub db_max_connections: Option<u32>,

    /// Directory resource files are stored under
    #[arg(long, global = true, env = ENV_UPLOADS_DIR)]
    pub uploads_dir: Option<String>,

    /// HS256 secret used to verify bearer tokens
    #[arg(long, global = true, env = ENV_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Require a subject/grade grant before schools can open published resources
    #[arg(long, global = true, env = ENV_REQUIRE_GRANT_FOR_PUBLISHED)]
    pub require_grant_for_published: Option<bool>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub db_max_connections: Option<u32>,
    pub uploads_dir: Option<String>,
    pub jwt_secret: Option<String>,
    pub require_grant_for_published: Option<bool>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        debug: cli.debug,
        config: cli.config,
        db_max_connections: cli.db_max_connections,
        uploads_dir: cli.uploads_dir,
        jwt_secret: cli.jwt_secret,
        require_grant_for_published: cli.require_grant_for_published,
    };
    (config, cli.command)
}
