//! Mutable state for one barrier search pass.

use std::sync::Arc;

use common_error::FenceError;
use fencepost_logical::{Query, TreePath};
use log::{trace, warn};

use super::outcome::{
    Candidate, CandidateOutcome, CandidateTrace, Decision, SearchOutcome, SearchStats,
};
use crate::{Plan, PlanRequest, Planner};

/// State threaded through one pass.
///
/// Holds the baseline (query, plan) pair, at most one best candidate and
/// the planning parameters, so every candidate is planned exactly like
/// the original call. A context belongs to a single pass and is never
/// shared.
pub struct SearchContext<'a, P: Planner + ?Sized> {
    planner: &'a P,
    request: &'a PlanRequest,
    original: &'a Arc<Query>,
    baseline: Plan,
    best: Option<Candidate>,
    stats: SearchStats,
    trace: Option<Vec<CandidateTrace>>,
}

impl<'a, P: Planner + ?Sized> SearchContext<'a, P> {
    /// Create a context for a pass whose baseline has already been planned.
    pub fn new(
        planner: &'a P,
        request: &'a PlanRequest,
        original: &'a Arc<Query>,
        baseline: Plan,
        enable_trace: bool,
    ) -> Self {
        Self {
            planner,
            request,
            original,
            baseline,
            best: None,
            stats: SearchStats {
                planner_calls: 1,
                failed_candidates: 0,
            },
            trace: enable_trace.then(Vec::new),
        }
    }

    /// The untouched query.
    pub fn original(&self) -> &'a Arc<Query> {
        self.original
    }

    /// The plan for the untouched query.
    pub fn baseline(&self) -> &Plan {
        &self.baseline
    }

    /// The cheapest candidate so far.
    pub fn best(&self) -> Option<&Candidate> {
        self.best.as_ref()
    }

    /// Planner usage so far.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Plan `candidate` and keep it if it is at least as cheap as the best
    /// so far. Ties go to the later candidate.
    ///
    /// A planning failure, or a cost that is negative or not finite,
    /// discards the candidate and leaves the best untouched.
    pub fn try_candidate(&mut self, site: TreePath, candidate: Arc<Query>) {
        self.stats.planner_calls += 1;

        let planned = self.planner.plan(&candidate, self.request).and_then(|plan| {
            let cost = plan.total_cost;
            if cost.is_finite() && cost >= 0.0 {
                Ok(plan)
            } else {
                Err(FenceError::planning(format!("unusable plan cost {cost}")))
            }
        });

        match planned {
            Ok(plan) => {
                let cost = plan.total_cost;
                let replaces = self
                    .best
                    .as_ref()
                    .is_none_or(|best| cost <= best.plan.total_cost);

                trace!(
                    "barrier candidate at {site}: cost={cost:.2}, {}",
                    if replaces { "new best" } else { "rejected" }
                );

                let outcome = if replaces {
                    CandidateOutcome::NewBest
                } else {
                    CandidateOutcome::Rejected
                };
                self.record(&site, Some(cost), outcome);

                if replaces {
                    self.best = Some(Candidate {
                        site,
                        query: candidate,
                        plan,
                    });
                }
            }
            Err(err) => {
                warn!("discarding barrier candidate at {site}: {err}");
                self.stats.failed_candidates += 1;
                self.record(&site, None, CandidateOutcome::Failed(err.to_string()));
            }
        }
    }

    fn record(&mut self, site: &TreePath, cost: Option<f64>, outcome: CandidateOutcome) {
        if let Some(trace) = &mut self.trace {
            trace.push(CandidateTrace::new(site.clone(), cost, outcome));
        }
    }

    /// Finish the pass with `decision`.
    pub fn into_outcome(self, decision: Decision) -> SearchOutcome {
        SearchOutcome {
            decision,
            baseline: self.baseline,
            best: self.best,
            stats: self.stats,
            trace: self.trace.unwrap_or_default(),
        }
    }
}
