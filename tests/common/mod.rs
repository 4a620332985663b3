//! In-memory connection provider for driving the tools without a server.
//!
//! The fake answers the handful of statements the tools issue (SHOW TABLES,
//! the information_schema column lookup, `SELECT * FROM ... LIMIT n`) from a
//! scripted table set, and records every statement with its parameters.
//! Acquisitions and releases are counted so tests can assert that no
//! connection is touched or leaked.

#![allow(dead_code)]

use mysql_mcp_server::db::{Connection, ConnectionProvider, quote_identifier};
use mysql_mcp_server::error::{DbError, DbResult};
use mysql_mcp_server::models::{Row, StatementOutcome};
use serde_json::{Value as JsonValue, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone)]
pub struct FakeTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl FakeTable {
    /// A table whose first column is an integer key and the others are text.
    pub fn generated(name: &str, columns: &[&str], row_count: usize) -> Self {
        let rows = (1..=row_count)
            .map(|i| {
                let mut row = Row::new();
                for (idx, col) in columns.iter().enumerate() {
                    let value = if idx == 0 {
                        json!(i)
                    } else {
                        json!(format!("{}-{}", col, i))
                    };
                    row.insert(col.to_string(), value);
                }
                row
            })
            .collect();

        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    fn describe(&self) -> Vec<Row> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let mut row = Row::new();
                row.insert("Field".to_string(), json!(col));
                row.insert(
                    "Type".to_string(),
                    json!(if idx == 0 { "int" } else { "varchar(255)" }),
                );
                row.insert("Null".to_string(), json!(if idx == 0 { "NO" } else { "YES" }));
                row.insert("Key".to_string(), json!(if idx == 0 { "PRI" } else { "" }));
                row.insert("Default".to_string(), JsonValue::Null);
                row.insert("Extra".to_string(), json!(""));
                row
            })
            .collect()
    }
}

/// One statement as seen by a fake connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub sql: String,
    pub params: Vec<String>,
}

/// Gate that parks connection operations until the test opens it.
#[derive(Debug, Default)]
pub struct Gate {
    pub entered: Notify,
    pub open: Notify,
}

#[derive(Debug, Default)]
pub struct FakeState {
    acquired: AtomicUsize,
    released: AtomicUsize,
    in_use: AtomicUsize,
    peak_in_use: AtomicUsize,
    recorded: Mutex<Vec<Recorded>>,
}

impl FakeState {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn peak_in_use(&self) -> usize {
        self.peak_in_use.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone, Default)]
struct Script {
    tables: Vec<FakeTable>,
    failure: Option<String>,
    outcome: Option<StatementOutcome>,
    gate: Option<Arc<Gate>>,
}

/// Scripted [`ConnectionProvider`].
#[derive(Debug, Default)]
pub struct FakeProvider {
    state: Arc<FakeState>,
    script: Script,
    permits: Option<Arc<Semaphore>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `shop` fixture: an `orders` table with 5 columns and 10 rows.
    pub fn shop() -> Self {
        Self::new()
            .with_table(FakeTable::generated(
                "orders",
                &["id", "customer", "status", "total", "created_at"],
                10,
            ))
            .with_table(FakeTable::generated("customers", &["id", "name"], 2))
    }

    pub fn with_table(mut self, table: FakeTable) -> Self {
        self.script.tables.push(table);
        self
    }

    /// Every statement fails with a SQL error carrying `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.script.failure = Some(message.to_string());
        self
    }

    /// Result returned for raw statements.
    pub fn with_outcome(mut self, outcome: StatementOutcome) -> Self {
        self.script.outcome = Some(outcome);
        self
    }

    /// Park every statement on `gate` until it is opened.
    pub fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.script.gate = Some(gate);
        self
    }

    /// Bound the number of simultaneously leased connections.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.permits = Some(Arc::new(Semaphore::new(size)));
        self
    }

    pub fn state(&self) -> Arc<FakeState> {
        Arc::clone(&self.state)
    }
}

impl ConnectionProvider for FakeProvider {
    type Connection = FakeConnection;

    async fn acquire(&self) -> DbResult<FakeConnection> {
        let permit = match &self.permits {
            Some(sem) => Some(
                Arc::clone(sem)
                    .acquire_owned()
                    .await
                    .map_err(|_| DbError::connection("Connection pool is closed", "Restart"))?,
            ),
            None => None,
        };

        self.state.acquired.fetch_add(1, Ordering::SeqCst);
        let in_use = self.state.in_use.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.peak_in_use.fetch_max(in_use, Ordering::SeqCst);

        Ok(FakeConnection {
            state: Arc::clone(&self.state),
            script: self.script.clone(),
            _permit: permit,
        })
    }

    async fn close(&self) {
        if let Some(sem) = &self.permits {
            sem.close();
        }
    }
}

pub struct FakeConnection {
    state: Arc<FakeState>,
    script: Script,
    _permit: Option<OwnedSemaphorePermit>,
}

impl FakeConnection {
    async fn enter(&self, sql: &str, params: &[&str]) -> DbResult<()> {
        self.state.recorded.lock().unwrap().push(Recorded {
            sql: sql.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        });

        if let Some(gate) = &self.script.gate {
            gate.entered.notify_one();
            gate.open.notified().await;
        }
        // Let other tasks interleave like real I/O would
        tokio::task::yield_now().await;

        match &self.script.failure {
            Some(message) => Err(DbError::database(
                message.clone(),
                Some("42000".to_string()),
                "Check the SQL syntax and referenced objects",
            )),
            None => Ok(()),
        }
    }

    fn table_by_name(&self, name: &str) -> Option<&FakeTable> {
        self.script.tables.iter().find(|t| t.name == name)
    }

    fn table_in_identifier_position(&self, sql: &str) -> Option<&FakeTable> {
        self.script
            .tables
            .iter()
            .find(|t| sql.contains(&format!("FROM {} ", quote_identifier(&t.name))))
    }
}

fn limit_of(sql: &str) -> Option<usize> {
    let (_, tail) = sql.rsplit_once(" LIMIT ")?;
    tail.trim().parse().ok()
}

impl Connection for FakeConnection {
    async fn fetch_all(&mut self, sql: &str, params: &[&str]) -> DbResult<Vec<Row>> {
        self.enter(sql, params).await?;

        if sql.trim() == "SHOW TABLES" {
            return Ok(self
                .script
                .tables
                .iter()
                .map(|t| {
                    let mut row = Row::new();
                    row.insert("Tables_in_shop".to_string(), json!(t.name));
                    row
                })
                .collect());
        }

        if sql.contains("information_schema.COLUMNS") {
            let name = params.first().copied().unwrap_or_default();
            return Ok(self
                .table_by_name(name)
                .map(FakeTable::describe)
                .unwrap_or_default());
        }

        if let Some(table) = self.table_in_identifier_position(sql) {
            let limit = limit_of(sql).unwrap_or(table.rows.len());
            return Ok(table.rows.iter().take(limit).cloned().collect());
        }

        Err(DbError::database(
            format!("Unexpected statement: {}", sql),
            Some("42000".to_string()),
            "Check the SQL syntax and referenced objects",
        ))
    }

    async fn execute_raw(&mut self, sql: &str) -> DbResult<StatementOutcome> {
        self.enter(sql, &[]).await?;
        Ok(self.script.outcome.clone().unwrap_or_default())
    }
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.state.released.fetch_add(1, Ordering::SeqCst);
        self.state.in_use.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Build an argument object from a JSON literal.
pub fn args(value: JsonValue) -> Option<serde_json::Map<String, JsonValue>> {
    match value {
        JsonValue::Object(map) => Some(map),
        _ => None,
    }
}

pub fn row(pairs: &[(&str, JsonValue)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
