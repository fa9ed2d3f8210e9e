use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] iplql_schema::IdentifierError),

    #[error("No CSV files found in directory: {}", .0.display())]
    NoSourceData(PathBuf),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table '{table}' does not match the record schema: {source}")]
    SchemaMismatch {
        table: String,
        #[source]
        source: iplql_schema::SchemaError,
    },

    #[error("Failed to read source directory {}: {source}", .path.display())]
    SourceDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),
}

/// The translated SQL failed to execute. Carries DuckDB's diagnostic verbatim.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct QueryExecutionError {
    message: String,
}

impl QueryExecutionError {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<duckdb::Error> for QueryExecutionError {
    fn from(err: duckdb::Error) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}
