//! Column references.

use serde::{Deserialize, Serialize};

/// Reference to a column, possibly qualified by a relation name or alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Optional qualifier (relation name or alias).
    pub qualifier: Option<String>,
    /// Column name.
    pub name: String,
}

impl ColumnRef {
    /// Create a new column reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            name: name.into(),
        }
    }

    /// Create a new qualified column reference.
    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }

    /// Parse a column reference from a string.
    ///
    /// Supports formats:
    /// - `"column"` -> unqualified
    /// - `"relation.column"` -> qualified
    pub fn parse(s: &str) -> Self {
        if let Some((qualifier, name)) = s.split_once('.') {
            Self::qualified(qualifier, name)
        } else {
            Self::new(s)
        }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{q}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
