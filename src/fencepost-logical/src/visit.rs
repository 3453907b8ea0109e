//! Visitor over query trees.
//!
//! The default methods recurse structurally through every expression
//! variant, so an implementation only overrides the nodes it interprets.
//! Traversal order is depth-first, children left to right. Within a query
//! the target list comes first, then derived tables in the FROM list, then
//! the WHERE predicate. Every node is visited exactly once.

use common_error::FenceResult;

use crate::{Expr, Query, RangeItem, Step, SubLink, TreePath};

/// A visitor over queries, expressions and sublinks.
///
/// `path` always addresses the node being visited, relative to the root
/// the traversal started from.
pub trait QueryVisitor {
    /// Visit a query node.
    fn visit_query(&mut self, query: &Query, path: &TreePath) -> FenceResult<()> {
        walk_query(self, query, path)
    }

    /// Visit an expression node.
    fn visit_expr(&mut self, expr: &Expr, path: &TreePath) -> FenceResult<()> {
        walk_expr(self, expr, path)
    }

    /// Visit a sublink expression.
    fn visit_sublink(&mut self, sublink: &SubLink, path: &TreePath) -> FenceResult<()> {
        walk_sublink(self, sublink, path)
    }
}

/// Recurse into a query's targets, derived tables and predicate.
pub fn walk_query<V: QueryVisitor + ?Sized>(
    visitor: &mut V,
    query: &Query,
    path: &TreePath,
) -> FenceResult<()> {
    for (i, target) in query.targets.iter().enumerate() {
        visitor.visit_expr(&target.expr, &path.child(Step::Target(i)))?;
    }
    for (i, item) in query.from.iter().enumerate() {
        if let RangeItem::Subquery { query: derived, .. } = item {
            visitor.visit_query(derived, &path.child(Step::From(i)))?;
        }
    }
    match &query.quals {
        Some(quals) => visitor.visit_expr(quals, &path.child(Step::Quals)),
        None => Ok(()),
    }
}

/// Recurse into an expression's children, dispatching sublinks.
pub fn walk_expr<V: QueryVisitor + ?Sized>(
    visitor: &mut V,
    expr: &Expr,
    path: &TreePath,
) -> FenceResult<()> {
    if let Expr::SubLink(sublink) = expr {
        return visitor.visit_sublink(sublink, path);
    }

    for (i, child) in expr.children().into_iter().enumerate() {
        visitor.visit_expr(child, &path.child(Step::Child(i)))?;
    }
    Ok(())
}

/// Recurse into a sublink's test expression, then its subquery.
pub fn walk_sublink<V: QueryVisitor + ?Sized>(
    visitor: &mut V,
    sublink: &SubLink,
    path: &TreePath,
) -> FenceResult<()> {
    if let Some(test) = &sublink.test_expr {
        visitor.visit_expr(test, &path.child(Step::Child(0)))?;
    }
    if let Some(query) = sublink.query() {
        visitor.visit_query(query, &path.child(Step::SubSelect))?;
    }
    Ok(())
}
