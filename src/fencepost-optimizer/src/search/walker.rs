//! Depth-first walk that tries one mutation per existence test.
//!
//! The walk covers target lists, derived tables and predicates at every
//! level.
//!
//! Nested existence tests are tried before the one enclosing them. Every
//! candidate is built from the original tree, so mutations never compose:
//! a query with `E` mutable existence tests costs exactly `E` replans.

use common_error::FenceResult;
use fencepost_logical::visit::walk_sublink;
use fencepost_logical::{Query, QueryVisitor, Step, SubLink, TreePath};
use log::{debug, trace, warn};

use super::context::SearchContext;
use crate::Planner;
use crate::rules::SubqueryMutation;

/// Visits every sublink in the query and replans a candidate for each
/// well-formed existence test the mutation applies to.
pub struct MutationWalker<'w, 'a, P: Planner + ?Sized> {
    context: &'w mut SearchContext<'a, P>,
    mutation: &'w dyn SubqueryMutation,
}

impl<'w, 'a, P: Planner + ?Sized> MutationWalker<'w, 'a, P> {
    /// Create a walker over the context's original query.
    pub fn new(context: &'w mut SearchContext<'a, P>, mutation: &'w dyn SubqueryMutation) -> Self {
        Self { context, mutation }
    }

    /// Walk the whole original query.
    pub fn run(mut self) -> FenceResult<()> {
        let original: &Query = self.context.original();
        self.visit_query(original, &TreePath::root())
    }

    fn try_site(&mut self, site: TreePath, subquery: &std::sync::Arc<Query>) {
        let mutated = self.mutation.apply(subquery);
        if !mutated.changed {
            trace!("{} left {site} unchanged", self.mutation.name());
            return;
        }

        match self.context.original().replace_at(&site, mutated.value) {
            Ok(candidate) => self.context.try_candidate(site, candidate),
            Err(err) => warn!("cannot splice {} at {site}: {err}", self.mutation.name()),
        }
    }
}

impl<P: Planner + ?Sized> QueryVisitor for MutationWalker<'_, '_, P> {
    fn visit_sublink(&mut self, sublink: &SubLink, path: &TreePath) -> FenceResult<()> {
        walk_sublink(self, sublink, path)?;

        if !sublink.is_exists() {
            return Ok(());
        }
        match sublink.existence_query() {
            Some(subquery) => self.try_site(path.child(Step::SubSelect), subquery),
            None => debug!("skipping existence test at {path} with no analyzed subquery"),
        }
        Ok(())
    }
}
