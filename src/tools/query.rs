//! Query execution tool.
//!
//! This module implements the `execute-query` MCP tool. Every statement is
//! classified before a connection is acquired; rejected statements never
//! reach the database.

use crate::db::{Connection, ConnectionProvider};
use crate::error::{DbResult, ToolError, ToolResult};
use crate::models::{QueryPayload, QueryResultSet, StatementOutcome, WriteSummary};
use crate::tools::sql_validator::{QueryClassifier, StatementKind};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Longest query excerpt quoted in error messages and logs.
const QUERY_EXCERPT_CHARS: usize = 80;

/// Input for the execute-query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExecuteQueryInput {
    /// SQL statement to execute. Which statements are accepted depends on the server's query mode.
    pub query: String,
}

/// Handler for the execute-query tool.
pub struct QueryToolHandler<P> {
    provider: Arc<P>,
    classifier: QueryClassifier,
}

impl<P> Clone for QueryToolHandler<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            classifier: self.classifier,
        }
    }
}

impl<P: ConnectionProvider> QueryToolHandler<P> {
    /// Create a new query tool handler.
    pub fn new(provider: Arc<P>, classifier: QueryClassifier) -> Self {
        Self {
            provider,
            classifier,
        }
    }

    /// Handle the execute-query tool call.
    pub async fn execute_query(&self, query: &str) -> ToolResult<QueryPayload> {
        let kind = self.classifier.classify(query).inspect_err(|e| {
            warn!(
                mode = %self.classifier.mode(),
                query = %excerpt(query),
                error = %e,
                "Query rejected"
            );
        })?;

        let start = Instant::now();
        let outcome = self.run(query).await.map_err(|e| {
            ToolError::operation_failed(
                format!("Query execution failed for `{}`", excerpt(query)),
                e,
            )
        })?;

        let payload = self.shape_payload(kind, outcome);

        info!(
            kind = ?kind,
            row_count = payload.row_count(),
            affected_rows = ?payload.affected_rows,
            execution_time_ms = start.elapsed().as_millis() as u64,
            "Query executed"
        );

        Ok(payload)
    }

    async fn run(&self, query: &str) -> DbResult<StatementOutcome> {
        let mut conn = self.provider.acquire().await?;
        let outcome = conn.execute_raw(query).await?;
        conn.release();
        Ok(outcome)
    }

    fn shape_payload(&self, kind: StatementKind, outcome: StatementOutcome) -> QueryPayload {
        if !self.classifier.mode().reports_affected_rows() {
            return QueryPayload::rows(outcome.rows);
        }

        let result = match kind {
            StatementKind::Select => QueryResultSet::Rows(outcome.rows),
            StatementKind::Insert => QueryResultSet::Write(WriteSummary {
                affected_rows: outcome.rows_affected,
                insert_id: outcome.last_insert_id,
            }),
        };
        QueryPayload::with_affected_rows(result, outcome.rows_affected)
    }
}

/// Collapse whitespace and cut the query to a short single-line excerpt.
fn excerpt(query: &str) -> String {
    let collapsed = query.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= QUERY_EXCERPT_CHARS {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(QUERY_EXCERPT_CHARS).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_short_query_unchanged() {
        assert_eq!(excerpt("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_excerpt_collapses_whitespace() {
        assert_eq!(excerpt("SELECT\n  *\tFROM t"), "SELECT * FROM t");
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let long = format!("SELECT '{}'", "é".repeat(200));
        let cut = excerpt(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), QUERY_EXCERPT_CHARS + 3);
    }
}
