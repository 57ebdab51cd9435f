use crate::store::{parse_timestamp, Store, StoreError};
use codex_core::{ExecutionRecord, Outcome};
use rusqlite::params;
use std::sync::Arc;

/// Append-only log of execution attempts.
pub struct ExecutionLog {
    store: Arc<Store>,
}

impl ExecutionLog {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn append(&self, record: &ExecutionRecord) -> Result<i64, StoreError> {
        let arguments = serde_json::to_string(&record.arguments)?;

        self.store.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tool_executions
                 (tool_id, method, arguments, status, error, duration, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.tool_id,
                    record.method,
                    arguments,
                    record.outcome.as_str(),
                    record.error_message,
                    record.duration_seconds,
                    record.timestamp.to_rfc3339(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Most recent records first.
    pub fn recent(&self, limit: usize) -> Result<Vec<ExecutionRecord>, StoreError> {
        type RawRecord = (String, String, String, String, Option<String>, f64, String);

        let raws: Vec<RawRecord> = self.store.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT tool_id, method, arguments, status, error, duration, timestamp
                 FROM tool_executions ORDER BY id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit as i64], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            })?;

            let mut raws = Vec::new();
            for row in rows {
                raws.push(row?);
            }
            Ok(raws)
        })?;

        raws.into_iter()
            .map(|(tool_id, method, arguments, status, error_message, duration, timestamp)| -> Result<ExecutionRecord, StoreError> {
                let outcome = match status.as_str() {
                    "success" => Outcome::Success,
                    "failure" => Outcome::Failure,
                    other => return Err(StoreError::Corrupt(format!("unknown outcome {:?}", other))),
                };
                Ok(ExecutionRecord {
                    tool_id,
                    method,
                    arguments: serde_json::from_str(&arguments)?,
                    outcome,
                    error_message,
                    duration_seconds: duration,
                    timestamp: parse_timestamp(&timestamp)?,
                })
            })
            .collect()
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        self.store.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM tool_executions", [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }
}
