//! Table loader: CSV sources into a persistent DuckDB table

use duckdb::Connection;
use iplql_schema::TableName;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::error::StoreError;

/// Whether [`ensure_table`] may keep an existing table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Keep the table if it already exists, build it only when absent
    Reuse,
    /// Drop and recreate the table from the source files
    Rebuild,
}

impl LoadMode {
    pub fn from_flag(rebuild: bool) -> Self {
        if rebuild {
            LoadMode::Rebuild
        } else {
            LoadMode::Reuse
        }
    }
}

/// Open connection to the store plus the validated name of the ingested table.
///
/// Acquired once and shared read-only by the context generator and executor.
pub struct StoreHandle {
    conn: Connection,
    table: TableName,
}

impl StoreHandle {
    /// Connect to (or create) the store file without touching any table
    pub fn open<P: AsRef<Path>>(path: P, table: TableName) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "Connected to DuckDB database");

        Ok(Self { conn, table })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    /// DuckDB resolves identifiers case-insensitively, so the lookup does too
    pub fn table_exists(&self) -> Result<bool, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = 'main' AND lower(table_name) = lower(?)",
            [self.table.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Replace the table with the union-by-name of `files`.
    ///
    /// Drop and create share one transaction: on failure the previous table
    /// is left as it was.
    fn rebuild_from(&mut self, files: &[PathBuf]) -> Result<(), StoreError> {
        let select = files
            .iter()
            .map(|_| "SELECT * FROM read_csv_auto(?, header = true)")
            .collect::<Vec<_>>()
            .join(" UNION ALL BY NAME ");
        let create = format!("CREATE TABLE {} AS {}", self.table, select);
        let paths: Vec<String> = files
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", self.table))?;
        info!(table = %self.table, "Dropped existing table (if any)");
        tx.execute(&create, duckdb::params_from_iter(paths.iter()))?;
        tx.commit()?;

        info!(table = %self.table, files = files.len(), "Created table from CSV files");
        Ok(())
    }
}

/// Make sure `table_name` exists in the store at `store_path` and return a handle to it.
///
/// With [`LoadMode::Reuse`] an existing table is returned untouched. Otherwise
/// every `*.csv` file in `source_dir` is merged by column name into a fresh table.
pub fn ensure_table<P, Q>(
    table_name: &str,
    store_path: P,
    source_dir: Q,
    mode: LoadMode,
) -> Result<StoreHandle, StoreError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let store_path = store_path.as_ref();
    let source_dir = source_dir.as_ref();

    let table = TableName::parse(table_name).map_err(|e| {
        error!("{}", e);
        StoreError::from(e)
    })?;

    let existing = if mode == LoadMode::Reuse && store_path.exists() {
        let handle = StoreHandle::open(store_path, table.clone())?;
        if handle.table_exists()? {
            info!(table = %table, "Reusing existing table");
            return Ok(handle);
        }
        info!(table = %table, "Table not found in store, creating it");
        Some(handle)
    } else {
        None
    };

    let files = discover_sources(source_dir)?;

    let mut handle = match existing {
        Some(handle) => handle,
        None => StoreHandle::open(store_path, table)?,
    };
    info!(table = %handle.table(), "Recreating table...");
    handle.rebuild_from(&files)?;

    Ok(handle)
}

/// `*.csv` files directly inside `dir`, sorted by path
fn discover_sources(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!(dir = %dir.display(), "Source directory does not exist");
            return Err(StoreError::NoSourceData(dir.to_path_buf()));
        }
        Err(source) => {
            return Err(StoreError::SourceDir {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| StoreError::SourceDir {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }

    if files.is_empty() {
        error!(dir = %dir.display(), "No CSV files found in directory");
        return Err(StoreError::NoSourceData(dir.to_path_buf()));
    }

    files.sort();
    Ok(files)
}
