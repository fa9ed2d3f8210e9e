//! Schema context document used to ground the language model

use iplql_schema::RecordSchema;
use tracing::info;

use crate::error::StoreError;
use crate::exec::materialize;
use crate::store::StoreHandle;

/// Number of sample rows rendered into the context document
pub const SAMPLE_ROWS: usize = 3;

/// Render the schema description, live table shape and a few sample rows.
///
/// Reads the store on every call. The sample query has no ORDER BY, so the
/// sample block is only as stable as DuckDB's scan order; the header, field
/// listing and shape line are deterministic for an unchanged table.
pub fn describe(schema: &RecordSchema, handle: &StoreHandle) -> Result<String, StoreError> {
    let table = handle.table();
    let columns = live_columns(handle)?;

    let mut lines = vec![format!(
        "The DuckDB table '{}' contains {} with the following columns:\n",
        table,
        schema.description()
    )];

    for field in schema.fields() {
        lines.push(format!(
            "- {} ({}): {}",
            field.name, field.semantic_type, field.description
        ));
    }

    let rows = row_count(handle)?;
    lines.push(format!("\nTable shape: ({} rows, {} columns)", rows, columns.len()));

    let sample = materialize(
        handle.connection(),
        &format!("SELECT * FROM {} LIMIT {}", table, SAMPLE_ROWS),
    )?;
    lines.push(format!("\nSample data:\n{}", sample.to_text_table()));

    info!(table = %table, rows, "Generated schema description");
    Ok(lines.join("\n"))
}

/// Live `(column_name, data_type)` pairs of the table, in ordinal order
pub fn live_columns(handle: &StoreHandle) -> Result<Vec<(String, String)>, StoreError> {
    let mut stmt = handle.connection().prepare(
        "SELECT column_name, data_type \
         FROM information_schema.columns \
         WHERE table_schema = 'main' AND lower(table_name) = lower(?) \
         ORDER BY ordinal_position",
    )?;

    let columns = stmt
        .query_map([handle.table().as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<duckdb::Result<Vec<_>>>()?;

    if columns.is_empty() {
        return Err(StoreError::TableNotFound(handle.table().to_string()));
    }

    Ok(columns)
}

pub fn row_count(handle: &StoreHandle) -> Result<u64, StoreError> {
    if !handle.table_exists()? {
        return Err(StoreError::TableNotFound(handle.table().to_string()));
    }

    let count: i64 = handle.connection().query_row(
        &format!("SELECT COUNT(*) FROM {}", handle.table()),
        [],
        |row| row.get(0),
    )?;
    Ok(count.max(0) as u64)
}

/// Check that the materialized table matches the record schema name-for-name
pub fn verify_schema(schema: &RecordSchema, handle: &StoreHandle) -> Result<(), StoreError> {
    let columns = live_columns(handle)?;
    schema
        .check_columns(&columns)
        .map_err(|source| StoreError::SchemaMismatch {
            table: handle.table().to_string(),
            source,
        })
}
