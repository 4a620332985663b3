//! Statement execution on a single MySQL connection.
//!
//! Two execution paths exist:
//! - [`fetch_all`]: prepared statement with bound parameters, used for the
//!   fixed introspection queries.
//! - [`execute_raw`]: caller-supplied SQL sent as-is over the text protocol,
//!   collecting every row and the affected-row counters the server reports.

use crate::db::params::bind_mysql_params;
use crate::db::types::RowToJson;
use crate::error::DbResult;
use crate::models::{Row, StatementOutcome};
use futures_util::TryStreamExt;
use sqlx::mysql::MySqlConnection;
use sqlx::{Either, Executor};
use std::time::Instant;
use tracing::debug;

/// Run a parameterized statement and return its rows as JSON maps.
pub async fn fetch_all(
    conn: &mut MySqlConnection,
    sql: &str,
    params: &[&str],
) -> DbResult<Vec<Row>> {
    let start = Instant::now();
    let query = bind_mysql_params(sqlx::query(sql), params);
    let rows = query.fetch_all(&mut *conn).await?;

    debug!(
        sql = %sql,
        params = params.len(),
        row_count = rows.len(),
        execution_time_ms = start.elapsed().as_millis() as u64,
        "Executed statement"
    );

    Ok(rows.iter().map(RowToJson::to_json_map).collect())
}

/// Run raw SQL without preparing it.
///
/// Rows from every result set are concatenated; affected rows are summed and
/// the last non-zero insert id wins.
pub async fn execute_raw(conn: &mut MySqlConnection, sql: &str) -> DbResult<StatementOutcome> {
    let start = Instant::now();
    let mut outcome = StatementOutcome::default();

    let mut stream = (&mut *conn).fetch_many(sql);
    while let Some(step) = stream.try_next().await? {
        match step {
            Either::Left(done) => {
                outcome.rows_affected += done.rows_affected();
                if done.last_insert_id() != 0 {
                    outcome.last_insert_id = done.last_insert_id();
                }
            }
            Either::Right(row) => outcome.rows.push(row.to_json_map()),
        }
    }

    debug!(
        row_count = outcome.rows.len(),
        rows_affected = outcome.rows_affected,
        execution_time_ms = start.elapsed().as_millis() as u64,
        "Executed raw statement"
    );

    Ok(outcome)
}
