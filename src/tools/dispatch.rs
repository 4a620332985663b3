//! Tool dispatch.
//!
//! Incoming calls carry a tool name and an untyped argument object. They are
//! parsed into a [`ToolRequest`] first; unknown names and arguments that do
//! not fit the tool's input type fail with [`ToolError::MalformedRequest`]
//! before any database work starts.

use crate::db::ConnectionProvider;
use crate::error::{ToolError, ToolResult};
use crate::tools::format::{Envelope, format_payload};
use crate::tools::query::{ExecuteQueryInput, QueryToolHandler};
use crate::tools::schema::{GetTableInfoInput, ListTablesInput, SchemaToolHandler};
use crate::tools::sql_validator::{QueryClassifier, QueryMode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Untyped argument object of a tool call.
pub type ToolArguments = Map<String, JsonValue>;

/// The tools this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ListTables,
    GetTableInfo,
    ExecuteQuery,
}

impl ToolName {
    pub const ALL: [ToolName; 3] = [Self::ListTables, Self::GetTableInfo, Self::ExecuteQuery];

    /// Prefix of the legacy tool names, still accepted on input.
    const LEGACY_PREFIX: &'static str = "mysql-";

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListTables => "list-tables",
            Self::GetTableInfo => "get-table-info",
            Self::ExecuteQuery => "execute-query",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::ListTables => "List all tables in the MySQL database",
            Self::GetTableInfo => {
                "Get the column definitions of a table and up to 3 sample rows"
            }
            Self::ExecuteQuery => {
                "Execute a SQL query against the MySQL database.\n\
                 Allowed statements depend on the server's query mode (SELECT only by default)."
            }
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let bare = name.strip_prefix(Self::LEGACY_PREFIX).unwrap_or(name);
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == bare)
            .ok_or_else(|| ToolError::malformed(format!("Unknown tool: {}", name)))
    }
}

/// A tool call whose arguments have been checked against the tool's input type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    ListTables,
    GetTableInfo { table: String },
    ExecuteQuery { query: String },
}

impl ToolRequest {
    /// Parse a tool name and its raw arguments.
    ///
    /// Omitted arguments are treated as an empty object.
    pub fn parse(name: &str, arguments: Option<ToolArguments>) -> ToolResult<Self> {
        let tool: ToolName = name.parse()?;
        let arguments = JsonValue::Object(arguments.unwrap_or_default());

        match tool {
            ToolName::ListTables => {
                let ListTablesInput {} = decode_input(tool, arguments)?;
                Ok(Self::ListTables)
            }
            ToolName::GetTableInfo => {
                let input: GetTableInfoInput = decode_input(tool, arguments)?;
                Ok(Self::GetTableInfo {
                    table: require_non_empty(tool, "table", input.table)?,
                })
            }
            ToolName::ExecuteQuery => {
                let input: ExecuteQueryInput = decode_input(tool, arguments)?;
                Ok(Self::ExecuteQuery {
                    query: require_non_empty(tool, "query", input.query)?,
                })
            }
        }
    }

    pub fn tool(&self) -> ToolName {
        match self {
            Self::ListTables => ToolName::ListTables,
            Self::GetTableInfo { .. } => ToolName::GetTableInfo,
            Self::ExecuteQuery { .. } => ToolName::ExecuteQuery,
        }
    }
}

fn decode_input<T: DeserializeOwned>(tool: ToolName, arguments: JsonValue) -> ToolResult<T> {
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::malformed(format!("Invalid arguments for {}: {}", tool, e)))
}

fn require_non_empty(tool: ToolName, field: &str, value: String) -> ToolResult<String> {
    if value.trim().is_empty() {
        return Err(ToolError::malformed(format!(
            "{} requires a non-empty `{}` string",
            tool, field
        )));
    }
    Ok(value)
}

/// Routes parsed requests to the tool handlers.
pub struct ToolDispatcher<P> {
    schema: SchemaToolHandler<P>,
    query: QueryToolHandler<P>,
}

impl<P> Clone for ToolDispatcher<P> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            query: self.query.clone(),
        }
    }
}

impl<P: ConnectionProvider> ToolDispatcher<P> {
    pub fn new(provider: Arc<P>, mode: QueryMode) -> Self {
        Self {
            schema: SchemaToolHandler::new(Arc::clone(&provider)),
            query: QueryToolHandler::new(provider, QueryClassifier::new(mode)),
        }
    }

    /// Parse and run one tool call.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<ToolArguments>,
    ) -> ToolResult<Envelope> {
        let request = ToolRequest::parse(name, arguments)?;
        debug!(tool = %request.tool(), "Dispatching tool call");
        self.execute(request).await
    }

    /// Run an already parsed request.
    pub async fn execute(&self, request: ToolRequest) -> ToolResult<Envelope> {
        match request {
            ToolRequest::ListTables => format_payload(&self.schema.list_tables().await?),
            ToolRequest::GetTableInfo { table } => {
                format_payload(&self.schema.get_table_info(&table).await?)
            }
            ToolRequest::ExecuteQuery { query } => {
                format_payload(&self.query.execute_query(&query).await?)
            }
        }
    }
}
