//! Schema introspection tools.
//!
//! This module implements the `list-tables` and `get-table-info` MCP tools.

use crate::db::{Connection, ConnectionProvider, quote_identifier};
use crate::error::{DbError, DbResult, ToolError, ToolResult};
use crate::models::{ListTablesPayload, Row, SAMPLE_ROW_LIMIT, TableInfoPayload};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, info};

const SHOW_TABLES_SQL: &str = "SHOW TABLES";

/// DESCRIBE-shaped column listing for one table of the current database.
const TABLE_COLUMNS_SQL: &str = r#"
    SELECT
        COLUMN_NAME AS `Field`,
        COLUMN_TYPE AS `Type`,
        IS_NULLABLE AS `Null`,
        COLUMN_KEY AS `Key`,
        COLUMN_DEFAULT AS `Default`,
        EXTRA AS `Extra`
    FROM information_schema.COLUMNS
    WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION
"#;

/// Input for the list-tables tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListTablesInput {}

/// Input for the get-table-info tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetTableInfoInput {
    /// Name of the table to describe
    pub table: String,
}

/// Handler for schema tools.
pub struct SchemaToolHandler<P> {
    provider: Arc<P>,
}

impl<P> Clone for SchemaToolHandler<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: ConnectionProvider> SchemaToolHandler<P> {
    /// Create a new schema tool handler.
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// List the tables of the configured database.
    pub async fn list_tables(&self) -> ToolResult<ListTablesPayload> {
        let tables = self
            .fetch_table_names()
            .await
            .map_err(|e| ToolError::operation_failed("Failed to list tables", e))?;

        info!(table_count = tables.len(), "Listed tables");
        Ok(ListTablesPayload { tables })
    }

    /// Describe a table and return a few sample rows.
    pub async fn get_table_info(&self, table: &str) -> ToolResult<TableInfoPayload> {
        let (schema, sample_data) = self.fetch_table_info(table).await.map_err(|e| {
            ToolError::operation_failed(format!("Failed to get table info for {}", table), e)
        })?;

        info!(
            table = %table,
            column_count = schema.len(),
            sample_rows = sample_data.len(),
            "Described table"
        );

        Ok(TableInfoPayload {
            table: table.to_string(),
            schema,
            sample_data,
        })
    }

    async fn fetch_table_names(&self) -> DbResult<Vec<String>> {
        let mut conn = self.provider.acquire().await?;
        let rows = conn.fetch_all(SHOW_TABLES_SQL, &[]).await?;
        conn.release();

        Ok(rows.into_iter().filter_map(first_column_text).collect())
    }

    async fn fetch_table_info(&self, table: &str) -> DbResult<(Vec<Row>, Vec<Row>)> {
        let mut conn = self.provider.acquire().await?;

        let schema = conn.fetch_all(TABLE_COLUMNS_SQL, &[table]).await?;
        if schema.is_empty() {
            return Err(DbError::schema(
                format!("Table '{}' doesn't exist", table),
                table,
            ));
        }

        // Only reached for a name the server just confirmed as a table
        let sample_sql = format!(
            "SELECT * FROM {} LIMIT {}",
            quote_identifier(table),
            SAMPLE_ROW_LIMIT
        );
        let mut sample_data = conn.fetch_all(&sample_sql, &[]).await?;
        conn.release();

        sample_data.truncate(SAMPLE_ROW_LIMIT);
        debug!(table = %table, sql = %sample_sql, "Fetched sample rows");
        Ok((schema, sample_data))
    }
}

/// Project a row onto the text of its first column.
fn first_column_text(row: Row) -> Option<String> {
    row.into_iter().next().map(|(_, value)| match value {
        JsonValue::String(s) => s,
        other => other.to_string(),
    })
}
