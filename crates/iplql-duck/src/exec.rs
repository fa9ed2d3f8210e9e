//! Query executor: runs SQL against the store and materializes the result

use chrono::{DateTime, NaiveDate};
use duckdb::types::ValueRef;
use duckdb::Connection;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info, warn};

use crate::error::QueryExecutionError;
use crate::store::StoreHandle;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Fully materialized query result; rows are positional and aligned to `columns`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
}

impl QueryResult {
    /// Render as a plain text table: a header line, then one line per row.
    pub fn to_text_table(&self) -> String {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(display_cell).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                cells
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(cells.len() + 1);
        lines.push(render_line(self.columns.iter().map(String::as_str), &widths));
        for row in &cells {
            lines.push(render_line(row.iter().map(String::as_str), &widths));
        }
        lines.join("\n")
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text_table())
    }
}

/// Run `sql` exactly as given against the store.
///
/// No statement-type filtering and no row limit: the whole result set is
/// materialized before returning.
pub fn execute(sql: &str, handle: &StoreHandle) -> Result<QueryResult, QueryExecutionError> {
    debug!(sql = %sql, "Executing query");

    match materialize(handle.connection(), sql) {
        Ok(result) => {
            info!(rows = result.row_count, columns = result.columns.len(), "Query executed");
            Ok(result)
        }
        Err(e) => {
            warn!(error = %e, "Query execution failed");
            Err(QueryExecutionError::from(e))
        }
    }
}

pub(crate) fn materialize(conn: &Connection, sql: &str) -> duckdb::Result<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;

    // Column metadata is only available once the statement has run
    let columns: Vec<String> = rows
        .as_ref()
        .map(|stmt| stmt.column_names())
        .unwrap_or_default();

    let mut result_rows = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            values.push(value_to_json(row.get_ref(idx)?));
        }
        result_rows.push(values);
    }

    let row_count = result_rows.len();
    Ok(QueryResult {
        columns,
        rows: result_rows,
        row_count,
    })
}

/// Convert a DuckDB cell to JSON
fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(i) => Value::from(i),
        ValueRef::SmallInt(i) => Value::from(i),
        ValueRef::Int(i) => Value::from(i),
        ValueRef::BigInt(i) => Value::from(i),
        ValueRef::HugeInt(i) => i64::try_from(i)
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(i.to_string())),
        ValueRef::UTinyInt(i) => Value::from(i),
        ValueRef::USmallInt(i) => Value::from(i),
        ValueRef::UInt(i) => Value::from(i),
        ValueRef::UBigInt(i) => Value::from(i),
        ValueRef::Float(f) => Value::from(f),
        ValueRef::Double(f) => Value::from(f),
        ValueRef::Decimal(d) => {
            let text = d.to_string();
            text.parse::<f64>()
                .map(Value::from)
                .unwrap_or(Value::String(text))
        }
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<blob {} bytes>", b.len())),
        ValueRef::Date32(days) => days
            .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
        ValueRef::Timestamp(unit, raw) => DateTime::from_timestamp_micros(unit.to_micros(raw))
            .map(|ts| Value::String(ts.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string()))
            .unwrap_or(Value::Null),
        other => Value::String(format!("{:?}", other.to_owned())),
    }
}

fn render_line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    values
        .zip(widths)
        .map(|(value, width)| format!("{:>width$}", value, width = *width))
        .collect::<Vec<_>>()
        .join("  ")
}

fn display_cell(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
