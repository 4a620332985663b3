//! MCP tool implementations.
//!
//! This module contains the database tool handlers:
//! - `schema`: `list-tables` and `get-table-info`
//! - `query`: `execute-query`
//! - `sql_validator`: statement classification per query mode
//! - `format`: the uniform response envelope
//! - `dispatch`: argument parsing and routing by tool name

pub mod dispatch;
pub mod format;
pub mod query;
pub mod schema;
pub mod sql_validator;

pub use dispatch::{ToolArguments, ToolDispatcher, ToolName, ToolRequest};
pub use format::{ContentBlock, Envelope, format_payload};
pub use query::{ExecuteQueryInput, QueryToolHandler};
pub use schema::{GetTableInfoInput, ListTablesInput, SchemaToolHandler};
pub use sql_validator::{QueryClassifier, QueryMode, StatementKind};
