//! Schema-related data models.
//!
//! Payloads of the list-tables and get-table-info tools.

use crate::models::Row;
use serde::{Deserialize, Serialize};

/// Number of sample rows returned by get-table-info.
pub const SAMPLE_ROW_LIMIT: usize = 3;

/// Payload of the list-tables tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTablesPayload {
    pub tables: Vec<String>,
}

/// Payload of the get-table-info tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfoPayload {
    pub table: String,
    /// One row per column, shaped like `DESCRIBE` output
    /// (`Field`, `Type`, `Null`, `Key`, `Default`, `Extra`).
    pub schema: Vec<Row>,
    /// At most [`SAMPLE_ROW_LIMIT`] rows.
    pub sample_data: Vec<Row>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_info_field_names() {
        let payload = TableInfoPayload {
            table: "orders".to_string(),
            schema: Vec::new(),
            sample_data: Vec::new(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({ "table": "orders", "schema": [], "sample_data": [] })
        );
    }
}
