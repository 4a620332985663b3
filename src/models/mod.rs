//! Data models for the MySQL MCP Server.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod query;
pub mod schema;

// Re-export commonly used types
pub use connection::{ConnectionConfig, PoolOptions};
pub use query::{
    NO_AFFECTED_ROWS, QueryPayload, QueryResultSet, Row, StatementOutcome, WriteSummary,
};
pub use schema::{ListTablesPayload, SAMPLE_ROW_LIMIT, TableInfoPayload};
