//! MCP service implementation using rmcp.
//!
//! [`DbService`] advertises the tool catalog and forwards every `tools/call`
//! to the [`ToolDispatcher`]. Dispatcher errors are converted into protocol
//! errors here; successful calls return the dispatcher's envelope unchanged.

use crate::db::ConnectionProvider;
use crate::tools::sql_validator::QueryMode;
use crate::tools::{
    ExecuteQueryInput, GetTableInfoInput, ListTablesInput, ToolArguments, ToolDispatcher, ToolName,
};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Implementation, JsonObject, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
};
use schemars::JsonSchema;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{info, warn};

pub struct DbService<P> {
    dispatcher: ToolDispatcher<P>,
    mode: QueryMode,
}

impl<P> Clone for DbService<P> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            mode: self.mode,
        }
    }
}

impl<P: ConnectionProvider> DbService<P> {
    /// Create a new DbService instance.
    ///
    /// # Arguments
    ///
    /// * `provider` - Shared connection provider for database operations
    /// * `mode` - Query mode enforced by the execute-query tool
    pub fn new(provider: Arc<P>, mode: QueryMode) -> Self {
        Self {
            dispatcher: ToolDispatcher::new(provider, mode),
            mode,
        }
    }

    /// Run one tool call and convert the outcome for the protocol.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<ToolArguments>,
    ) -> Result<CallToolResult, McpError> {
        match self.dispatcher.dispatch(name, arguments).await {
            Ok(envelope) => Ok(envelope.into()),
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool call failed");
                Err(e.into())
            }
        }
    }
}

/// Declarations of every tool, with JSON schemas for their arguments.
pub fn tool_catalog() -> Vec<Tool> {
    ToolName::ALL
        .into_iter()
        .map(|tool| {
            let schema = match tool {
                ToolName::ListTables => input_schema::<ListTablesInput>(),
                ToolName::GetTableInfo => input_schema::<GetTableInfoInput>(),
                ToolName::ExecuteQuery => input_schema::<ExecuteQueryInput>(),
            };
            Tool::new(tool.as_str(), tool.description(), schema)
        })
        .collect()
}

fn input_schema<T: JsonSchema>() -> Arc<JsonObject> {
    match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(JsonValue::Object(map)) => Arc::new(map),
        _ => {
            let mut map = JsonObject::new();
            map.insert("type".to_string(), JsonValue::from("object"));
            Arc::new(map)
        }
    }
}

impl<P: ConnectionProvider + 'static> ServerHandler for DbService<P> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mysql-mcp-server".to_owned(),
                title: Some("MySQL MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(format!(
                "Tools for exploring and querying one MySQL database.\n\
                \n\
                ## Workflow\n\
                1. Call `list-tables` to see the tables of the database\n\
                2. Call `get-table-info` with a `table` to see its columns and 3 sample rows\n\
                3. Call `execute-query` with a `query` to run SQL\n\
                \n\
                ## Query mode: {}\n\
                - strict: SELECT only\n\
                - moderate: SELECT and INSERT; statements mentioning UPDATE, DELETE or DROP are rejected\n\
                - permissive: SELECT and INSERT; statements mentioning DROP are rejected\n\
                \n\
                Keywords are matched anywhere in the statement, including inside string literals.",
                self.mode
            )),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(tool_catalog()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        info!(tool = %request.name, "Tool call");
        self.call(&request.name, request.arguments).await
    }
}
