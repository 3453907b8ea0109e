//! Subqueries appearing inside expressions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{BinaryOp, Expr};
use crate::Query;

/// How a sublink consumes its subquery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubLinkKind {
    /// `EXISTS (subquery)`: true if the subquery returns at least one row.
    Exists,
    /// `test op ANY (subquery)`, also used for `IN`.
    Any(BinaryOp),
    /// `test op ALL (subquery)`.
    All(BinaryOp),
    /// Scalar subquery returning one value.
    Expr,
    /// `ARRAY(subquery)`.
    Array,
}

/// The body of a sublink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubSelect {
    /// An analyzed query.
    Query(Arc<Query>),
    /// A statement the analyzer did not turn into a query (kept as text).
    Unresolved(String),
}

/// A subquery used as an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubLink {
    /// Sublink kind.
    pub kind: SubLinkKind,
    /// Left-hand operand for ANY / ALL.
    pub test_expr: Option<Box<Expr>>,
    /// The subquery. `None` only in malformed trees.
    pub subselect: Option<SubSelect>,
}

impl SubLink {
    /// Create an `EXISTS` sublink.
    pub fn exists(query: Arc<Query>) -> Self {
        Self {
            kind: SubLinkKind::Exists,
            test_expr: None,
            subselect: Some(SubSelect::Query(query)),
        }
    }

    /// Create an `ANY` sublink comparing `test` against the subquery.
    pub fn any(test: Expr, op: BinaryOp, query: Arc<Query>) -> Self {
        Self {
            kind: SubLinkKind::Any(op),
            test_expr: Some(Box::new(test)),
            subselect: Some(SubSelect::Query(query)),
        }
    }

    /// Create a scalar subquery.
    pub fn scalar(query: Arc<Query>) -> Self {
        Self {
            kind: SubLinkKind::Expr,
            test_expr: None,
            subselect: Some(SubSelect::Query(query)),
        }
    }

    /// Whether this is an existence test, well-formed or not.
    pub fn is_exists(&self) -> bool {
        self.kind == SubLinkKind::Exists
    }

    /// The analyzed subquery, if present.
    pub fn query(&self) -> Option<&Arc<Query>> {
        match &self.subselect {
            Some(SubSelect::Query(query)) => Some(query),
            _ => None,
        }
    }

    /// The subquery of a well-formed existence test.
    pub fn existence_query(&self) -> Option<&Arc<Query>> {
        if self.is_exists() { self.query() } else { None }
    }

    /// Copy of this sublink pointing at a different subquery.
    pub fn with_query(&self, query: Arc<Query>) -> Self {
        Self {
            kind: self.kind,
            test_expr: self.test_expr.clone(),
            subselect: Some(SubSelect::Query(query)),
        }
    }

    /// SQL-ish keyword for display.
    pub fn keyword(&self) -> String {
        match self.kind {
            SubLinkKind::Exists => "EXISTS".to_string(),
            SubLinkKind::Any(op) => format!("{op} ANY"),
            SubLinkKind::All(op) => format!("{op} ALL"),
            SubLinkKind::Expr => "SUBQUERY".to_string(),
            SubLinkKind::Array => "ARRAY".to_string(),
        }
    }
}

impl std::fmt::Display for SubLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(test) = &self.test_expr {
            write!(f, "{test} ")?;
        }
        match &self.subselect {
            Some(SubSelect::Query(query)) => write!(f, "{} ({query})", self.keyword()),
            Some(SubSelect::Unresolved(text)) => write!(f, "{} (<unresolved: {text}>)", self.keyword()),
            None => write!(f, "{} (<missing>)", self.keyword()),
        }
    }
}
