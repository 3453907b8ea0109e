//! Fluent construction of query trees.

use std::sync::Arc;

use crate::{BinaryOp, BoolOp, Expr, Query, RangeItem, SubLink, TargetEntry, Value};

/// Builder for constructing queries fluently.
///
/// ```rust
/// use fencepost_logical::{QueryBuilder, col, exists, lit};
///
/// // SELECT * FROM a WHERE x > 1 AND EXISTS (SELECT 1 FROM b WHERE b.id = a.id)
/// let inner = QueryBuilder::table("b")
///     .select(lit(1i64))
///     .filter(col("b.id").eq(col("a.id")))
///     .build();
/// let query = QueryBuilder::table("a")
///     .filter(col("x").gt(lit(1i64)))
///     .filter(exists(inner))
///     .build();
///
/// assert_eq!(query.existence_test_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Start building from a base relation.
    pub fn table(relation: impl Into<String>) -> Self {
        Self {
            query: Query {
                from: vec![RangeItem::Relation {
                    name: relation.into(),
                    alias: None,
                }],
                ..Query::default()
            },
        }
    }

    /// Start building from an aliased base relation.
    pub fn table_alias(relation: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            query: Query {
                from: vec![RangeItem::Relation {
                    name: relation.into(),
                    alias: Some(alias.into()),
                }],
                ..Query::default()
            },
        }
    }

    /// Add another base relation to the FROM list.
    pub fn join(mut self, relation: impl Into<String>) -> Self {
        self.query.from.push(RangeItem::Relation {
            name: relation.into(),
            alias: None,
        });
        self
    }

    /// Add a derived table to the FROM list.
    pub fn join_subquery(mut self, query: Arc<Query>, alias: impl Into<String>) -> Self {
        self.query.from.push(RangeItem::Subquery {
            query,
            alias: alias.into(),
        });
        self
    }

    /// Add an output expression.
    pub fn select(mut self, expr: Expr) -> Self {
        self.query.targets.push(TargetEntry { expr, name: None });
        self
    }

    /// AND a predicate into the WHERE clause.
    pub fn filter(mut self, predicate: Expr) -> Self {
        self.query.quals = Some(match self.query.quals.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    /// Replace the WHERE clause with exactly `predicate`.
    pub fn with_quals(mut self, predicate: Expr) -> Self {
        self.query.quals = Some(predicate);
        self
    }

    /// Add an OFFSET clause.
    pub fn offset(mut self, rows: i64) -> Self {
        self.query.limit_offset = Some(lit(rows));
        self
    }

    /// Add a LIMIT clause.
    pub fn limit(mut self, rows: i64) -> Self {
        self.query.limit_count = Some(lit(rows));
        self
    }

    /// Build the final query.
    pub fn build(self) -> Arc<Query> {
        Arc::new(self.query)
    }
}

/// Column reference, `"col"` or `"relation.col"`.
pub fn col(name: &str) -> Expr {
    Expr::column(name)
}

/// Literal constant.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::literal(value)
}

/// Bound parameter `$index`.
pub fn param(index: usize) -> Expr {
    Expr::Param(index)
}

/// `EXISTS (query)`.
pub fn exists(query: Arc<Query>) -> Expr {
    Expr::SubLink(SubLink::exists(query))
}

/// `NOT EXISTS (query)`.
pub fn not_exists(query: Arc<Query>) -> Expr {
    exists(query).not()
}

/// Scalar subquery.
pub fn scalar(query: Arc<Query>) -> Expr {
    Expr::SubLink(SubLink::scalar(query))
}

/// `test op ANY (query)`.
pub fn any_sublink(test: Expr, op: BinaryOp, query: Arc<Query>) -> Expr {
    Expr::SubLink(SubLink::any(test, op, query))
}

/// AND of all predicates, kept as one n-ary node even for a single input.
pub fn and_all(predicates: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Bool {
        op: BoolOp::And,
        args: predicates.into_iter().collect(),
    }
}
