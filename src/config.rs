//! Configuration handling for the MySQL MCP Server.
//!
//! Settings come from command line arguments with environment variable
//! fallbacks. A `.env` file is loaded by the binary before parsing.

use crate::models::{ConnectionConfig, PoolOptions};
use crate::tools::sql_validator::QueryMode;
use clap::Parser;
use thiserror::Error;

pub const DEFAULT_MYSQL_PORT: u16 = 3306;
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Pool configuration defaults
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Invalid configuration detected at startup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("MYSQL_MAX_CONNECTIONS must be at least 1")]
    EmptyPool,

    #[error(
        "MYSQL_MIN_CONNECTIONS ({min}) must not exceed MYSQL_MAX_CONNECTIONS ({max})"
    )]
    PoolBounds { min: u32, max: u32 },
}

/// Configuration for the MySQL MCP Server.
#[derive(Clone, Parser)]
#[command(
    name = "mysql-mcp-server",
    about = "MCP server exposing guarded MySQL table listing, table inspection and query execution",
    version,
    author
)]
pub struct Config {
    /// MySQL server host
    #[arg(long, env = "MYSQL_HOST")]
    pub mysql_host: String,

    /// MySQL server port
    #[arg(long, default_value_t = DEFAULT_MYSQL_PORT, env = "MYSQL_PORT")]
    pub mysql_port: u16,

    /// MySQL user name
    #[arg(long, env = "MYSQL_USER")]
    pub mysql_user: String,

    /// MySQL password
    #[arg(long, env = "MYSQL_PASSWORD", hide_env_values = true)]
    pub mysql_password: String,

    /// Database (schema) to operate on
    #[arg(long, env = "MYSQL_DATABASE")]
    pub mysql_database: String,

    /// Statement classes accepted by execute-query
    #[arg(
        long,
        value_enum,
        default_value = "strict",
        env = "MYSQL_QUERY_MODE"
    )]
    pub query_mode: QueryMode,

    /// Maximum connections held by the pool
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_CONNECTIONS,
        env = "MYSQL_MAX_CONNECTIONS"
    )]
    pub max_connections: u32,

    /// Connections kept open while idle
    #[arg(
        long,
        default_value_t = DEFAULT_MIN_CONNECTIONS,
        env = "MYSQL_MIN_CONNECTIONS"
    )]
    pub min_connections: u32,

    /// Seconds to wait for a free connection before failing
    #[arg(
        long,
        default_value_t = DEFAULT_ACQUIRE_TIMEOUT_SECS,
        env = "MYSQL_ACQUIRE_TIMEOUT"
    )]
    pub acquire_timeout: u64,

    /// Seconds an idle connection is kept before being closed
    #[arg(
        long,
        default_value_t = DEFAULT_IDLE_TIMEOUT_SECS,
        env = "MYSQL_IDLE_TIMEOUT"
    )]
    pub idle_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = DEFAULT_LOG_LEVEL, env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            mysql_host: "localhost".to_string(),
            mysql_port: DEFAULT_MYSQL_PORT,
            mysql_user: "root".to_string(),
            mysql_password: String::new(),
            mysql_database: String::new(),
            query_mode: QueryMode::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT_SECS,
            idle_timeout: DEFAULT_IDLE_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
        }
    }

    /// Check the settings clap cannot express: non-blank credentials and sane pool bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("MYSQL_HOST", &self.mysql_host),
            ("MYSQL_USER", &self.mysql_user),
            ("MYSQL_PASSWORD", &self.mysql_password),
            ("MYSQL_DATABASE", &self.mysql_database),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }

        if self.max_connections == 0 {
            return Err(ConfigError::EmptyPool);
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::PoolBounds {
                min: self.min_connections,
                max: self.max_connections,
            });
        }

        Ok(())
    }

    /// Pool settings derived from the command line.
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            acquire_timeout_secs: self.acquire_timeout,
            idle_timeout_secs: self.idle_timeout,
            ..PoolOptions::default()
        }
    }

    /// Connection settings handed to the connection provider.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.mysql_host.clone(),
            port: self.mysql_port,
            user: self.mysql_user.clone(),
            password: self.mysql_password.clone(),
            database: self.mysql_database.clone(),
            pool_options: self.pool_options(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

// Hand-written so the password never reaches a log line.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("mysql_host", &self.mysql_host)
            .field("mysql_port", &self.mysql_port)
            .field("mysql_user", &self.mysql_user)
            .field("mysql_password", &"***")
            .field("mysql_database", &self.mysql_database)
            .field("query_mode", &self.query_mode)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .field("log_level", &self.log_level)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}
