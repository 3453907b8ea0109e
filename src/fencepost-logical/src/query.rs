//! Query nodes.
//!
//! A [`Query`] is produced by an external analyzer and is never mutated in
//! place afterwards. Rewrites build a new root that shares every untouched
//! subquery through its `Arc`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Expr;
use crate::visit::{QueryVisitor, walk_sublink};
use crate::{SubLink, TreePath};

/// An entry in a query's FROM list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RangeItem {
    /// A base relation.
    Relation {
        /// Relation name.
        name: String,
        /// Optional alias.
        alias: Option<String>,
    },
    /// A derived table.
    Subquery {
        /// The subquery.
        query: Arc<Query>,
        /// Alias the derived table is exposed under.
        alias: String,
    },
}

impl RangeItem {
    /// Name used to refer to this item.
    pub fn ref_name(&self) -> &str {
        match self {
            Self::Relation { name, alias } => alias.as_deref().unwrap_or(name),
            Self::Subquery { alias, .. } => alias,
        }
    }
}

/// An output column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetEntry {
    /// The computed expression.
    pub expr: Expr,
    /// Output column name.
    pub name: Option<String>,
}

/// One (sub)query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    /// FROM list.
    pub from: Vec<RangeItem>,
    /// Target list; empty means `*`.
    pub targets: Vec<TargetEntry>,
    /// WHERE predicate.
    pub quals: Option<Expr>,
    /// OFFSET clause (the row-skip marker).
    pub limit_offset: Option<Expr>,
    /// LIMIT clause.
    pub limit_count: Option<Expr>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an OFFSET clause is present.
    pub fn has_row_skip(&self) -> bool {
        self.limit_offset.is_some()
    }

    /// Copy of this query with a different WHERE predicate.
    pub fn with_quals(&self, quals: Expr) -> Self {
        Self {
            from: self.from.clone(),
            targets: self.targets.clone(),
            quals: Some(quals),
            limit_offset: self.limit_offset.clone(),
            limit_count: self.limit_count.clone(),
        }
    }

    /// Copy of this query with an OFFSET clause.
    pub fn with_limit_offset(&self, offset: Expr) -> Self {
        Self {
            from: self.from.clone(),
            targets: self.targets.clone(),
            quals: self.quals.clone(),
            limit_offset: Some(offset),
            limit_count: self.limit_count.clone(),
        }
    }

    /// Reference name of the first FROM item.
    pub fn primary_relation(&self) -> Option<&str> {
        self.from.first().map(RangeItem::ref_name)
    }

    /// Number of well-formed existence tests anywhere in the tree.
    pub fn existence_test_count(&self) -> usize {
        struct Counter(usize);

        impl QueryVisitor for Counter {
            fn visit_sublink(
                &mut self,
                sublink: &SubLink,
                path: &TreePath,
            ) -> common_error::FenceResult<()> {
                if sublink.existence_query().is_some() {
                    self.0 += 1;
                }
                walk_sublink(self, sublink, path)
            }
        }

        let mut counter = Counter(0);
        // The counter never fails.
        let _ = counter.visit_query(self, &TreePath::root());
        counter.0
    }

    /// Paths of every non-root subquery that carries an OFFSET clause.
    pub fn row_skip_paths(&self) -> Vec<TreePath> {
        struct Collector(Vec<TreePath>);

        impl QueryVisitor for Collector {
            fn visit_query(
                &mut self,
                query: &Query,
                path: &TreePath,
            ) -> common_error::FenceResult<()> {
                if query.has_row_skip() && !path.is_root() {
                    self.0.push(path.clone());
                }
                crate::visit::walk_query(self, query, path)
            }
        }

        let mut collector = Collector(Vec::new());
        let _ = collector.visit_query(self, &TreePath::root());
        collector.0
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SELECT ")?;
        if self.targets.is_empty() {
            write!(f, "*")?;
        } else {
            let targets: Vec<String> = self.targets.iter().map(|t| t.expr.to_string()).collect();
            write!(f, "{}", targets.join(", "))?;
        }

        if !self.from.is_empty() {
            let from: Vec<String> = self
                .from
                .iter()
                .map(|item| match item {
                    RangeItem::Relation { name, alias: None } => name.clone(),
                    RangeItem::Relation {
                        name,
                        alias: Some(alias),
                    } => format!("{name} {alias}"),
                    RangeItem::Subquery { query, alias } => format!("({query}) {alias}"),
                })
                .collect();
            write!(f, " FROM {}", from.join(", "))?;
        }

        if let Some(quals) = &self.quals {
            write!(f, " WHERE {quals}")?;
        }
        if let Some(count) = &self.limit_count {
            write!(f, " LIMIT {count}")?;
        }
        if let Some(offset) = &self.limit_offset {
            write!(f, " OFFSET {offset}")?;
        }
        Ok(())
    }
}
