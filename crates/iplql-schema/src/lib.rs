//! Record schema for the IPL ball-by-ball dataset
//!
//! Declares the fields of one source row, the identifier rules applied to
//! table names before they are spliced into SQL text, and the type
//! compatibility rules used to check a materialized table against the schema.

pub mod ident;
pub mod ipl;
pub mod types;

pub use ident::{IdentifierError, TableName};
pub use ipl::match_data;
pub use types::{FieldSpec, RecordSchema, SchemaError, SemanticType};
