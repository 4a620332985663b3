//! Connection pool management.
//!
//! Executors never see the pool directly. They ask a [`ConnectionProvider`]
//! for a [`Connection`] handle, use it for one operation and let it go. The
//! handle is an RAII lease: dropping it, on any path including errors and
//! cancellation, returns the physical connection to the pool.

use crate::db::executor;
use crate::error::{DbError, DbResult};
use crate::models::{ConnectionConfig, Row, StatementOutcome};
use sqlx::MySqlPool;
use sqlx::mysql::{MySql, MySqlPoolOptions};
use sqlx::pool::PoolConnection;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// A leased database connection, owned by exactly one in-flight operation.
pub trait Connection: Send {
    /// Run a statement with bound string parameters and return its rows.
    fn fetch_all(
        &mut self,
        sql: &str,
        params: &[&str],
    ) -> impl Future<Output = DbResult<Vec<Row>>> + Send;

    /// Run caller-supplied SQL exactly as given.
    fn execute_raw(&mut self, sql: &str) -> impl Future<Output = DbResult<StatementOutcome>> + Send;

    /// Hand the connection back to its pool. Dropping the handle does the same.
    fn release(self)
    where
        Self: Sized,
    {
        drop(self)
    }
}

/// Source of scoped connections, shared by all executors.
pub trait ConnectionProvider: Send + Sync {
    type Connection: Connection;

    /// Lease a connection, waiting while the pool is exhausted.
    fn acquire(&self) -> impl Future<Output = DbResult<Self::Connection>> + Send;

    /// Close the pool at shutdown. Leases still held are closed on return.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// Snapshot of pool usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub size: u32,
    pub idle: usize,
}

/// Connection provider backed by an sqlx MySQL pool.
#[derive(Debug, Clone)]
pub struct MySqlConnectionProvider {
    pool: MySqlPool,
    acquire_timeout: Duration,
}

impl MySqlConnectionProvider {
    /// Open the pool and verify the server is reachable.
    pub async fn connect(config: &ConnectionConfig) -> DbResult<Self> {
        let pool_opts = &config.pool_options;

        info!(
            endpoint = %config.endpoint(),
            max_connections = pool_opts.max_connections,
            "Connecting to database"
        );

        let pool = MySqlPoolOptions::new()
            .min_connections(pool_opts.min_connections)
            .max_connections(pool_opts.max_connections)
            .acquire_timeout(pool_opts.acquire_timeout())
            .idle_timeout(Some(pool_opts.idle_timeout()))
            .test_before_acquire(pool_opts.test_before_acquire)
            .connect_with(config.connect_options())
            .await
            .map_err(|e| {
                DbError::connection(format!("Failed to connect: {}", e), connection_suggestion(&e))
            })?;

        let provider = Self::from_pool(pool, pool_opts.acquire_timeout());
        let server_version = provider.server_version().await;
        info!(server_version = ?server_version, "Connected successfully");

        Ok(provider)
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: MySqlPool, acquire_timeout: Duration) -> Self {
        Self {
            pool,
            acquire_timeout,
        }
    }

    /// Current pool usage.
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
        }
    }

    /// Get the server version from the connected database.
    async fn server_version(&self) -> Option<String> {
        match sqlx::query_scalar::<_, String>("SELECT version()")
            .fetch_one(&self.pool)
            .await
        {
            Ok(version) => {
                debug!(version = %version, "Got server version");
                Some(version)
            }
            Err(e) => {
                warn!(error = %e, "Failed to get server version");
                None
            }
        }
    }
}

impl ConnectionProvider for MySqlConnectionProvider {
    type Connection = PooledConnection;

    async fn acquire(&self) -> DbResult<PooledConnection> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| acquire_error(e, self.acquire_timeout))?;

        let status = self.status();
        trace!(
            pool_size = status.size,
            idle = status.idle,
            "Connection acquired"
        );
        Ok(PooledConnection { inner: conn })
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Connection pool closed");
    }
}

/// A connection leased from [`MySqlConnectionProvider`].
///
/// Returns to the pool when dropped.
#[derive(Debug)]
pub struct PooledConnection {
    inner: PoolConnection<MySql>,
}

impl Connection for PooledConnection {
    async fn fetch_all(&mut self, sql: &str, params: &[&str]) -> DbResult<Vec<Row>> {
        executor::fetch_all(&mut self.inner, sql, params).await
    }

    async fn execute_raw(&mut self, sql: &str) -> DbResult<StatementOutcome> {
        executor::execute_raw(&mut self.inner, sql).await
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        trace!("Connection returned to pool");
    }
}

/// Generate a helpful suggestion for connection errors.
fn connection_suggestion(error: &sqlx::Error) -> String {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") {
        return "Check that the MySQL server is running and accessible".to_string();
    }

    if error_str.contains("access denied")
        || error_str.contains("authentication")
        || error_str.contains("password")
    {
        return "Verify MYSQL_USER and MYSQL_PASSWORD".to_string();
    }

    if error_str.contains("unknown database") {
        return "Check that MYSQL_DATABASE names an existing database".to_string();
    }

    if error_str.contains("tls") || error_str.contains("ssl") {
        return "Check TLS/SSL configuration or try disabling it".to_string();
    }

    "Verify MYSQL_HOST and MYSQL_PORT point at a MySQL-compatible server".to_string()
}

/// Maps a pool acquire failure, reporting timeouts with the configured wait.
fn acquire_error(err: sqlx::Error, acquire_timeout: Duration) -> DbError {
    match err {
        sqlx::Error::PoolTimedOut => {
            DbError::timeout("connection pool acquire", acquire_timeout.as_secs())
        }
        other => DbError::from(other),
    }
}
