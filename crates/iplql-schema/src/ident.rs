//! SQL identifier validation
//!
//! Table names come from operator configuration and are the only values this
//! crate family ever interpolates into SQL text. A [`TableName`] can only be
//! built from a string matching `^[A-Za-z_][A-Za-z0-9_]*$`.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is a valid regex")
});

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unsafe table name: {0:?}")]
pub struct IdentifierError(pub String);

/// A table name that is safe to splice into SQL text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableName(String);

impl TableName {
    pub fn parse(name: &str) -> Result<Self, IdentifierError> {
        if is_safe_identifier(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(IdentifierError(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_safe_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["ipl", "_staging", "IPL_2025", "a1"] {
            assert!(TableName::parse(name).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in [
            "",
            "1ipl",
            "ipl-2025",
            "ipl;DROP TABLE ipl",
            "ipl ",
            "\"ipl\"",
            "main.ipl",
            "ipl\n",
        ] {
            assert_eq!(
                TableName::parse(name),
                Err(IdentifierError(name.to_string())),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_is_raw_name() {
        let name = TableName::parse("ipl").unwrap();
        assert_eq!(format!("SELECT COUNT(*) FROM {name}"), "SELECT COUNT(*) FROM ipl");
    }
}
