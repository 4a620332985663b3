//! Error types for the MySQL MCP Server.
//!
//! Two layers are defined here:
//! - [`DbError`]: failures reported by the driver or the connection pool.
//! - [`ToolError`]: the error taxonomy seen by callers of the tool dispatcher
//!   (malformed request, rejected query, failed operation).
//!
//! Both carry actionable messages so that an AI assistant can understand and
//! recover from the condition.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42S02" for unknown table
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Schema error: {message} (object: {object})")]
    Schema { message: String, object: String },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u64,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Create a schema error.
    pub fn schema(message: impl Into<String>, object: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
            object: object.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Database { suggestion, .. } => Some(suggestion),
            Self::Schema { .. } => Some("Call list-tables to see the available tables"),
            Self::Timeout { .. } => Some(
                "The connection pool is exhausted; retry later or raise MYSQL_MAX_CONNECTIONS",
            ),
            Self::Internal { .. } => None,
        }
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check the MYSQL_HOST, MYSQL_PORT, MYSQL_USER and MYSQL_DATABASE settings",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::database(
                    db_err.message(),
                    code,
                    "Check the SQL syntax and referenced objects",
                )
            }
            sqlx::Error::RowNotFound => DbError::database(
                "No rows returned",
                None,
                "Verify the query conditions match existing data",
            ),
            sqlx::Error::PoolTimedOut => DbError::timeout("connection pool acquire", 0),
            sqlx::Error::PoolClosed => {
                DbError::connection("Connection pool is closed", "Restart the server")
            }
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::TypeNotFound { type_name } => DbError::schema(
                format!("Type not found: {}", type_name),
                type_name.to_string(),
            ),
            sqlx::Error::ColumnNotFound(col) => {
                DbError::schema(format!("Column not found: {}", col), col.to_string())
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => DbError::internal(format!(
                "Column index {} out of bounds (len: {})",
                index, len
            )),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => DbError::internal("Database worker crashed"),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors surfaced by the tool dispatcher.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Unknown tool name or arguments that do not match the tool's schema.
    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    /// The query classifier denied the submitted SQL.
    #[error("Query rejected: {reason}")]
    QueryRejected { reason: String },

    /// The database failed while an operation held a connection.
    #[error("{context}: {source}")]
    OperationFailed { context: String, source: DbError },

    #[error("Failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Create a malformed request error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }

    /// Create a query rejected error.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::QueryRejected {
            reason: reason.into(),
        }
    }

    /// Wrap a driver error with the context of the operation that failed.
    pub fn operation_failed(context: impl Into<String>, source: DbError) -> Self {
        Self::OperationFailed {
            context: context.into(),
            source,
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::MalformedRequest { .. } => {
                Some("Call tools/list to see the available tools and their argument schemas")
            }
            Self::QueryRejected { .. } => {
                Some("Submit a statement permitted by the server's query mode")
            }
            Self::OperationFailed { source, .. } => source.suggestion(),
            Self::Serialization(_) => None,
        }
    }
}

/// Result type alias for tool dispatch.
pub type ToolResult<T> = Result<T, ToolError>;

/// Build suggestion data as JSON value.
fn suggestion_data(suggestion: Option<&str>) -> Option<serde_json::Value> {
    suggestion.map(|s| serde_json::json!({ "suggestion": s }))
}

/// Convert ToolError to MCP ErrorData for semantic error categorization.
/// Includes the suggestion field in the `data` object when available.
impl From<ToolError> for rmcp::ErrorData {
    fn from(err: ToolError) -> Self {
        let data = suggestion_data(err.suggestion());
        match &err {
            ToolError::MalformedRequest { .. } | ToolError::QueryRejected { .. } => {
                rmcp::ErrorData::invalid_params(err.to_string(), data)
            }

            // SQL mistakes are the caller's to fix
            ToolError::OperationFailed {
                context,
                source:
                    DbError::Database {
                        message, sql_state, ..
                    },
            } => {
                let msg = match sql_state {
                    Some(code) => format!("{}: {} (SQLSTATE: {})", context, message, code),
                    None => format!("{}: {}", context, message),
                };
                rmcp::ErrorData::invalid_params(msg, data)
            }
            ToolError::OperationFailed {
                source: DbError::Schema { .. },
                ..
            } => rmcp::ErrorData::invalid_params(err.to_string(), data),

            // Connection, Timeout, Internal
            ToolError::OperationFailed { .. } | ToolError::Serialization(_) => {
                rmcp::ErrorData::internal_error(err.to_string(), data)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DbError::connection("Failed to connect", "Check credentials");
        assert!(err.to_string().contains("Connection failed"));
    }

    #[test]
    fn test_error_suggestion() {
        let err = DbError::database(
            "Syntax error",
            Some("42000".to_string()),
            "Check SQL syntax",
        );
        assert_eq!(err.suggestion(), Some("Check SQL syntax"));
    }

    #[test]
    fn test_operation_failed_names_context_and_cause() {
        let err = ToolError::operation_failed(
            "Failed to get table info for orders",
            DbError::database("Table 'shop.orders' doesn't exist", None, "check"),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to get table info for orders: "));
        assert!(msg.contains("doesn't exist"));
    }

    #[test]
    fn test_operation_failed_keeps_source() {
        let err = ToolError::operation_failed("Failed to list tables", DbError::internal("boom"));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Internal error: boom"));
    }

    // Tests for From<ToolError> for rmcp::ErrorData

    #[test]
    fn test_malformed_request_maps_to_invalid_params() {
        let mcp_err: rmcp::ErrorData = ToolError::malformed("Unknown tool: drop-database").into();
        // invalid_params uses -32602
        assert_eq!(mcp_err.code.0, -32602);
        assert!(mcp_err.message.contains("drop-database"));
    }

    #[test]
    fn test_query_rejected_maps_to_invalid_params() {
        let mcp_err: rmcp::ErrorData = ToolError::rejected("DROP is not allowed").into();
        assert_eq!(mcp_err.code.0, -32602);
    }

    #[test]
    fn test_database_failure_includes_sql_state() {
        let err = ToolError::operation_failed(
            "Query execution failed",
            DbError::database("syntax error", Some("42000".to_string()), "check syntax"),
        );
        let mcp_err: rmcp::ErrorData = err.into();
        assert_eq!(mcp_err.code.0, -32602);
        assert!(mcp_err.message.contains("42000"));
        assert!(mcp_err.message.starts_with("Query execution failed"));
    }

    #[test]
    fn test_connection_failure_maps_to_internal_error() {
        let err = ToolError::operation_failed(
            "Failed to list tables",
            DbError::connection("refused", "try reconnecting"),
        );
        let mcp_err: rmcp::ErrorData = err.into();
        // internal_error uses -32603
        assert_eq!(mcp_err.code.0, -32603);
        let data = mcp_err.data.unwrap();
        assert_eq!(data["suggestion"], "try reconnecting");
    }

    #[test]
    fn test_timeout_maps_to_internal_error() {
        let err = ToolError::operation_failed(
            "Failed to list tables",
            DbError::timeout("connection pool acquire", 30),
        );
        let mcp_err: rmcp::ErrorData = err.into();
        assert_eq!(mcp_err.code.0, -32603);
    }

    #[test]
    fn test_schema_failure_maps_to_invalid_params() {
        let err = ToolError::operation_failed(
            "Failed to get table info for ghosts",
            DbError::schema("Table 'ghosts' doesn't exist", "ghosts"),
        );
        let mcp_err: rmcp::ErrorData = err.into();
        assert_eq!(mcp_err.code.0, -32602);
    }
}
