//! Query-related data models.
//!
//! This module defines the row representation shared by every executor and
//! the payload returned by the execute-query tool.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A result row as an ordered column → value map.
pub type Row = serde_json::Map<String, JsonValue>;

/// `affectedRows` reported when the driver result carries none (SELECT).
pub const NO_AFFECTED_ROWS: u64 = 0;

/// Everything the driver reported for one raw statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementOutcome {
    pub rows: Vec<Row>,
    pub rows_affected: u64,
    pub last_insert_id: u64,
}

/// Summary returned in place of a row set for INSERT statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteSummary {
    pub affected_rows: u64,
    pub insert_id: u64,
}

/// The `result` member of an execute-query payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResultSet {
    Rows(Vec<Row>),
    Write(WriteSummary),
}

/// Payload of the execute-query tool.
///
/// `affectedRows` is only present when the active query mode admits writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPayload {
    pub result: QueryResultSet,
    #[serde(
        rename = "affectedRows",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub affected_rows: Option<u64>,
}

impl QueryPayload {
    /// Read-only shape: `{ "result": [...] }`.
    pub fn rows(rows: Vec<Row>) -> Self {
        Self {
            result: QueryResultSet::Rows(rows),
            affected_rows: None,
        }
    }

    /// Shape used when writes are permitted: `{ "result": ..., "affectedRows": n }`.
    pub fn with_affected_rows(result: QueryResultSet, affected_rows: u64) -> Self {
        Self {
            result,
            affected_rows: Some(affected_rows),
        }
    }

    /// Number of rows in the result set, zero for write summaries.
    pub fn row_count(&self) -> usize {
        match &self.result {
            QueryResultSet::Rows(rows) => rows.len(),
            QueryResultSet::Write(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_only_payload_omits_affected_rows() {
        let mut row = Row::new();
        row.insert("id".to_string(), json!(1));
        let payload = QueryPayload::rows(vec![row]);

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({ "result": [{ "id": 1 }] }));
    }

    #[test]
    fn test_write_payload_shape() {
        let payload = QueryPayload::with_affected_rows(
            QueryResultSet::Write(WriteSummary {
                affected_rows: 2,
                insert_id: 41,
            }),
            2,
        );

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "result": { "affectedRows": 2, "insertId": 41 },
                "affectedRows": 2
            })
        );
        assert_eq!(payload.row_count(), 0);
    }

    #[test]
    fn test_untagged_result_parses_both_shapes() {
        let rows: QueryPayload =
            serde_json::from_str(r#"{"result":[{"a":"x"}],"affectedRows":0}"#).unwrap();
        assert_eq!(rows.row_count(), 1);
        assert_eq!(rows.affected_rows, Some(NO_AFFECTED_ROWS));

        let write: QueryPayload =
            serde_json::from_str(r#"{"result":{"affectedRows":1,"insertId":7}}"#).unwrap();
        assert!(matches!(write.result, QueryResultSet::Write(s) if s.insert_id == 7));
        assert_eq!(write.affected_rows, None);
    }
}
