//! Addressing subqueries inside a query tree, and rebuilding along a path.

use std::sync::Arc;

use common_error::{FenceError, FenceResult};
use serde::{Deserialize, Serialize};

use crate::{Expr, Query, RangeItem, TargetEntry};

/// One step from a node to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    /// From a query into its `i`-th target expression.
    Target(usize),
    /// From a query into the derived table at FROM position `i`.
    From(usize),
    /// From a query into its WHERE predicate.
    Quals,
    /// From an expression into its `i`-th child (see [`Expr::children`]).
    Child(usize),
    /// From a sublink expression into its subquery.
    SubSelect,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target(i) => write!(f, "target:{i}"),
            Self::From(i) => write!(f, "from:{i}"),
            Self::Quals => write!(f, "quals"),
            Self::Child(i) => write!(f, "{i}"),
            Self::SubSelect => write!(f, "subselect"),
        }
    }
}

/// A path from the root query to a node below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreePath(Vec<Step>);

impl TreePath {
    /// The empty path, addressing the root query.
    pub fn root() -> Self {
        Self::default()
    }

    /// This path extended by one step.
    #[must_use]
    pub fn child(&self, step: Step) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The steps of this path.
    pub fn steps(&self) -> &[Step] {
        &self.0
    }
}

impl std::fmt::Display for TreePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for step in &self.0 {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}

impl Query {
    /// Look up the query addressed by `path`.
    pub fn resolve(&self, path: &TreePath) -> Option<&Query> {
        let mut query = self;
        let mut expr: Option<&Expr> = None;

        for step in path.steps() {
            match (*step, expr) {
                (Step::Target(i), None) => expr = Some(&query.targets.get(i)?.expr),
                (Step::From(i), None) => match query.from.get(i)? {
                    RangeItem::Subquery { query: derived, .. } => query = Arc::as_ref(derived),
                    RangeItem::Relation { .. } => return None,
                },
                (Step::Quals, None) => expr = Some(query.quals.as_ref()?),
                (Step::Child(i), Some(current)) => {
                    expr = Some(*current.children().get(i)?);
                }
                (Step::SubSelect, Some(current)) => {
                    query = Arc::as_ref(current.as_sublink()?.query()?);
                    expr = None;
                }
                _ => return None,
            }
        }

        if expr.is_some() { None } else { Some(query) }
    }

    /// Build a new root in which the query at `path` is `replacement`.
    ///
    /// Only the nodes on the path are copied; every other subquery is shared
    /// with `self`. `self` is left untouched.
    pub fn replace_at(&self, path: &TreePath, replacement: Arc<Query>) -> FenceResult<Arc<Query>> {
        replace_in_query(self, path.steps(), replacement)
            .map_err(|e| FenceError::malformed_tree(format!("{e} (path {path})")))
    }
}

fn replace_in_query(query: &Query, steps: &[Step], replacement: Arc<Query>) -> Result<Arc<Query>, String> {
    match steps.split_first() {
        None => Ok(replacement),
        Some((Step::Quals, rest)) => {
            let quals = query
                .quals
                .as_ref()
                .ok_or_else(|| "query has no predicate".to_string())?;
            let quals = replace_in_expr(quals, rest, replacement)?;
            Ok(Arc::new(query.with_quals(quals)))
        }
        Some((Step::Target(index), rest)) => {
            let target = query
                .targets
                .get(*index)
                .ok_or_else(|| format!("query has no target {index}"))?;
            let expr = replace_in_expr(&target.expr, rest, replacement)?;
            let mut rebuilt = query.clone();
            rebuilt.targets[*index] = TargetEntry {
                expr,
                name: target.name.clone(),
            };
            Ok(Arc::new(rebuilt))
        }
        Some((Step::From(index), rest)) => {
            let Some(RangeItem::Subquery { query: derived, alias }) = query.from.get(*index) else {
                return Err(format!("FROM item {index} is not a derived table"));
            };
            let derived = replace_in_query(derived, rest, replacement)?;
            let mut rebuilt = query.clone();
            rebuilt.from[*index] = RangeItem::Subquery {
                query: derived,
                alias: alias.clone(),
            };
            Ok(Arc::new(rebuilt))
        }
        Some((step, _)) => Err(format!("step '{step}' cannot start at a query")),
    }
}

fn replace_in_expr(expr: &Expr, steps: &[Step], replacement: Arc<Query>) -> Result<Expr, String> {
    match steps.split_first() {
        None => Err("path ends at an expression, not a query".to_string()),
        Some((Step::Child(index), rest)) => {
            let child = expr
                .children()
                .get(*index)
                .copied()
                .ok_or_else(|| format!("expression has no child {index}"))?;
            let child = replace_in_expr(child, rest, replacement)?;
            expr.with_child(*index, child)
                .ok_or_else(|| format!("expression has no child {index}"))
        }
        Some((Step::SubSelect, rest)) => {
            let sublink = expr
                .as_sublink()
                .ok_or_else(|| "subselect step on a non-sublink expression".to_string())?;
            let query = sublink
                .query()
                .ok_or_else(|| "sublink has no analyzed subquery".to_string())?;
            let query = replace_in_query(query, rest, replacement)?;
            Ok(Expr::SubLink(sublink.with_query(query)))
        }
        Some((step @ (Step::Quals | Step::Target(_) | Step::From(_)), _)) => {
            Err(format!("step '{step}' cannot start at an expression"))
        }
    }
}
