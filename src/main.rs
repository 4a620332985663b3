//! MySQL MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to list tables, inspect tables and run guarded queries on MySQL.

use mysql_mcp_server::config::Config;
use mysql_mcp_server::db::{ConnectionProvider, MySqlConnectionProvider};
use mysql_mcp_server::transport::{StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries the protocol.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is not an error
    dotenv::dotenv().ok();

    let config = Config::parse_args();

    init_tracing(&config);

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        eprintln!("Error: {}", e);
        eprintln!();
        eprintln!("Set MYSQL_HOST, MYSQL_USER, MYSQL_PASSWORD and MYSQL_DATABASE");
        eprintln!("(environment, .env file or the matching --mysql-* flags).");
        return Err(e.into());
    }

    info!(
        query_mode = %config.query_mode,
        "Starting MySQL MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let provider = match MySqlConnectionProvider::connect(&config.connection_config()).await {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            error!(error = %e, suggestion = ?e.suggestion(), "Failed to connect to MySQL");
            return Err(e.into());
        }
    };

    let transport = StdioTransport::new(Arc::clone(&provider), config.query_mode);
    info!(transport = transport.name(), "Using stdio transport");

    if let Err(e) = transport.run().await {
        error!(error = %e, "Server error");
        provider.close().await;
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
