//! Transport layer for the MCP server.
//!
//! Only the stdio transport is provided; it is the standard mode for
//! CLI-launched MCP servers.

pub mod stdio;

pub use stdio::StdioTransport;

use crate::error::DbResult;
use std::future::Future;

/// Trait for MCP transport implementations.
pub trait Transport: Send + Sync {
    /// Start the transport and serve requests until shutdown.
    fn run(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Get the name of this transport for logging.
    fn name(&self) -> &'static str;
}
