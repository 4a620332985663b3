//! Stdio transport for the MCP server.
//!
//! This transport uses standard input/output for communication,
//! which is the standard mode for CLI-based MCP integrations.

use crate::db::ConnectionProvider;
use crate::error::{DbError, DbResult};
use crate::mcp::DbService;
use crate::tools::sql_validator::QueryMode;
use crate::transport::Transport;
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Stdio transport implementation.
///
/// Reads JSON-RPC messages from stdin and writes responses to stdout. The
/// connection provider is closed when the transport stops.
pub struct StdioTransport<P> {
    provider: Arc<P>,
    mode: QueryMode,
}

impl<P: ConnectionProvider + 'static> StdioTransport<P> {
    pub fn new(provider: Arc<P>, mode: QueryMode) -> Self {
        Self { provider, mode }
    }
}

impl<P: ConnectionProvider + 'static> Transport for StdioTransport<P> {
    async fn run(&self) -> DbResult<()> {
        info!(mode = %self.mode, "Starting MCP server with stdio transport");

        let service = DbService::new(Arc::clone(&self.provider), self.mode);

        let running_service = service
            .serve(stdio())
            .await
            .map_err(|e| DbError::internal(format!("Failed to start stdio transport: {}", e)))?;

        let shutdown_requested = tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(_quit_reason) => {
                        info!("Stdio transport completed normally");
                    }
                    Err(e) => {
                        warn!(error = %e, "Stdio transport error");
                        self.provider.close().await;
                        return Err(DbError::internal(format!("Stdio transport error: {}", e)));
                    }
                }
                false
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                true
            }
        };

        if shutdown_requested {
            tokio::spawn(async {
                wait_for_signal().await;
                warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });
        }

        info!("Closing connection pool");
        self.provider.close().await;

        if shutdown_requested {
            // stdin may still be blocked in a read that select! cannot interrupt
            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
///
/// A handler that cannot be installed never fires.
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }
}
