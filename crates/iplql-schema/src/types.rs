//! Type system for the record schema

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    #[error("Field '{0}' is declared in the schema but missing from the table")]
    MissingColumn(String),

    #[error("Column '{0}' exists in the table but is not declared in the schema")]
    UndeclaredColumn(String),

    #[error("Column '{column}' has store type {store_type}, which is not compatible with {declared}")]
    IncompatibleType {
        column: String,
        declared: SemanticType,
        store_type: String,
    },
}

/// Semantic type of a field, independent of the store's physical type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    String,
    Integer,
    Float,
}

impl SemanticType {
    /// Whether a DuckDB column type can hold values of this semantic type.
    ///
    /// The store may widen numeric types (a float column whose values are all
    /// whole numbers is sniffed as BIGINT), so compatibility is looser than
    /// equality. A string field accepts any scalar column: identifiers such as
    /// `season` or `match_id` are sniffed as numbers or dates.
    pub fn accepts(&self, store_type: &str) -> bool {
        let upper = store_type.trim().to_ascii_uppercase();
        let base = upper.split('(').next().unwrap_or_default().trim();

        let integer = matches!(
            base,
            "TINYINT"
                | "SMALLINT"
                | "INTEGER"
                | "BIGINT"
                | "HUGEINT"
                | "UTINYINT"
                | "USMALLINT"
                | "UINTEGER"
                | "UBIGINT"
                | "UHUGEINT"
        );

        let float = integer || matches!(base, "FLOAT" | "DOUBLE" | "DECIMAL" | "REAL");

        match self {
            SemanticType::Integer => integer,
            SemanticType::Float => float,
            SemanticType::String => {
                float
                    || matches!(base, "VARCHAR" | "BOOLEAN" | "UUID")
                    || base.starts_with("DATE")
                    || base.starts_with("TIME")
            }
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::String => "string",
            SemanticType::Integer => "integer",
            SemanticType::Float => "float",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub semantic_type: SemanticType,
    pub description: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            description: description.into(),
        }
    }
}

/// Ordered description of one source row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// What the rows represent, e.g. "IPL ball-by-ball match data"
    pub(crate) description: String,
    pub(crate) fields: Vec<FieldSpec>,
}

impl RecordSchema {
    pub fn new(description: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }

        Ok(Self {
            description: description.into(),
            fields,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check a live column listing `(name, store_type)` against the schema.
    ///
    /// Names must match one-for-one; types only need to be compatible.
    pub fn check_columns(&self, columns: &[(String, String)]) -> Result<(), SchemaError> {
        for field in &self.fields {
            match columns.iter().find(|(name, _)| *name == field.name) {
                None => return Err(SchemaError::MissingColumn(field.name.clone())),
                Some((_, store_type)) if !field.semantic_type.accepts(store_type) => {
                    return Err(SchemaError::IncompatibleType {
                        column: field.name.clone(),
                        declared: field.semantic_type,
                        store_type: store_type.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        if let Some((name, _)) = columns.iter().find(|(name, _)| self.find_field(name).is_none()) {
            return Err(SchemaError::UndeclaredColumn(name.clone()));
        }

        Ok(())
    }
}
