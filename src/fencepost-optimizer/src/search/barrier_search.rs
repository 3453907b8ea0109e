//! The barrier search pass.

use std::sync::Arc;

use common_config::BarrierSearchConfig;
use common_display::truncate_string;
use common_error::FenceResult;
use fencepost_logical::Query;
use log::debug;

use super::context::SearchContext;
use super::outcome::{Decision, SearchOutcome};
use super::policy::DecisionPolicy;
use super::walker::MutationWalker;
use crate::rules::OffsetBarrier;
use crate::{Plan, PlanRequest, Planner};

/// Longest query text echoed into a log line.
const LOGGED_QUERY_LEN: usize = 64;

/// A planner that tries an `OFFSET 0` barrier in each existence test and
/// keeps the result when it is sufficiently cheaper.
///
/// `next` does the actual planning. It is called once for the untouched
/// query and once per mutable existence test, so a pass costs `1 + E`
/// planner calls.
///
/// ```rust
/// use std::sync::Arc;
///
/// use fencepost_optimizer::testing::{BarrierCostPlanner, semi_join_query};
/// use fencepost_optimizer::{BarrierSearch, Decision, PlanRequest};
///
/// let next = Arc::new(BarrierCostPlanner::new(100.0).with_cost(&["b"], 40.0));
/// let search = BarrierSearch::new(Arc::clone(&next));
///
/// let outcome = search.search(&semi_join_query(), &PlanRequest::default()).unwrap();
/// assert_eq!(outcome.decision, Decision::Mutated);
/// assert_eq!(outcome.plan().total_cost, 40.0);
/// assert_eq!(next.calls(), 2);
/// ```
#[derive(Debug)]
pub struct BarrierSearch<P> {
    next: P,
    config: BarrierSearchConfig,
    mutation: OffsetBarrier,
}

impl<P: Planner> BarrierSearch<P> {
    /// Create a search with the default configuration.
    pub fn new(next: P) -> Self {
        Self::with_config(next, BarrierSearchConfig::default())
    }

    /// Create a search with a custom configuration.
    pub fn with_config(next: P, config: BarrierSearchConfig) -> Self {
        Self {
            next,
            config,
            mutation: OffsetBarrier::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &BarrierSearchConfig {
        &self.config
    }

    /// The planner every call is delegated to.
    pub fn next(&self) -> &P {
        &self.next
    }

    /// Run one pass over `query`.
    ///
    /// A failure planning the untouched query is returned as is. Failures
    /// planning candidates are absorbed and counted.
    pub fn search(&self, query: &Arc<Query>, request: &PlanRequest) -> FenceResult<SearchOutcome> {
        let baseline = self.next.plan(query, request)?;

        if !self.config.enabled {
            debug!("barrier search disabled, returning the baseline plan");
            return Ok(SearchOutcome::disabled(baseline));
        }

        let mut context =
            SearchContext::new(&self.next, request, query, baseline, self.config.trace);
        MutationWalker::new(&mut context, &self.mutation).run()?;

        let policy = DecisionPolicy::from(&self.config);
        let baseline_cost = context.baseline().total_cost;
        let best_cost = context.best().map(|best| best.plan.total_cost);
        let decision = policy.choose(baseline_cost, best_cost);

        let text = request
            .query_text
            .as_deref()
            .map(|text| truncate_string(text, LOGGED_QUERY_LEN))
            .unwrap_or_default();
        match (decision, best_cost) {
            (Decision::Mutated, Some(best)) => debug!(
                "injected an OFFSET 0 ({:.2} -> {:.2}, ratio {:.3}) {}",
                baseline_cost,
                best,
                DecisionPolicy::cost_ratio(baseline_cost, best),
                text
            ),
            (_, Some(best)) => debug!(
                "kept the pristine plan ({:.2} vs {:.2}, ratio {:.3}) {}",
                baseline_cost,
                best,
                DecisionPolicy::cost_ratio(baseline_cost, best),
                text
            ),
            (_, None) => debug!("kept the pristine plan (no candidates) {text}"),
        }

        Ok(context.into_outcome(decision))
    }
}

impl<P: Planner> Planner for BarrierSearch<P> {
    fn plan(&self, query: &Arc<Query>, request: &PlanRequest) -> FenceResult<Plan> {
        self.search(query, request).map(SearchOutcome::into_plan)
    }
}
