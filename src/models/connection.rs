//! Connection-related data models.
//!
//! This module defines the settings used to open the MySQL connection pool.

use crate::config::{
    DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MIN_CONNECTIONS, DEFAULT_MYSQL_PORT,
};
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlConnectOptions;
use std::time::Duration;

/// Connection pool configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolOptions {
    /// Maximum connections in pool (default: 10)
    pub max_connections: u32,
    /// Minimum connections in pool (default: 1)
    pub min_connections: u32,
    /// Connection acquire timeout in seconds (default: 30)
    pub acquire_timeout_secs: u64,
    /// Idle timeout in seconds (default: 600)
    pub idle_timeout_secs: u64,
    /// Whether to ping connections before handing them out (default: true)
    pub test_before_acquire: bool,
}

impl PoolOptions {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            test_before_acquire: true,
        }
    }
}

/// Configuration for the MySQL connection pool.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    /// Contains sensitive data - never log
    #[serde(skip_serializing)]
    pub password: String,
    pub database: String,
    #[serde(default)]
    pub pool_options: PoolOptions,
}

fn default_port() -> u16 {
    DEFAULT_MYSQL_PORT
}

impl ConnectionConfig {
    /// Driver connect options for this configuration.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .charset("utf8mb4")
    }

    /// Display-safe endpoint description (no credentials).
    pub fn endpoint(&self) -> String {
        format!("{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"****")
            .field("database", &self.database)
            .field("pool_options", &self.pool_options)
            .finish()
    }
}
