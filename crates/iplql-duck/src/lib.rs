//! DuckDB store for the ingested match table
//!
//! - [`ensure_table`] loads the CSV sources into a persistent table
//! - [`describe`] renders the schema context document used to ground the model
//! - [`execute`] runs model-authored SQL and materializes the result

mod context;
mod error;
mod exec;
mod store;

pub use context::{describe, live_columns, row_count, verify_schema, SAMPLE_ROWS};
pub use error::{QueryExecutionError, StoreError};
pub use exec::{execute, QueryResult};
pub use store::{ensure_table, LoadMode, StoreHandle};
