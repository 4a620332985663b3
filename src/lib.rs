//! MySQL MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools that let AI
//! assistants list tables, inspect a table and run guarded queries against a
//! MySQL-compatible database.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::{DbError, ToolError};
pub use mcp::DbService;
