//! Results of one barrier search pass.

use std::fmt;
use std::sync::Arc;

use fencepost_logical::{Query, TreePath};

use crate::Plan;

/// Which plan a pass returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// The search was switched off; the baseline plan was returned untouched.
    Disabled,
    /// No candidate cleared the threshold.
    Baseline,
    /// The best mutated plan cleared the threshold.
    Mutated,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Baseline => write!(f, "baseline"),
            Self::Mutated => write!(f, "mutated"),
        }
    }
}

/// A mutated query together with the plan produced for it.
///
/// The plan always comes from a single planner call on exactly `query`.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Path of the mutated subquery within the original query.
    pub site: TreePath,
    /// The full candidate query.
    pub query: Arc<Query>,
    /// The plan produced for `query`.
    pub plan: Plan,
}

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    /// The candidate became the best so far.
    NewBest,
    /// The candidate cost more than the best so far.
    Rejected,
    /// Planning the candidate failed; the message is the planner's error.
    Failed(String),
}

/// One trace entry per replanned candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateTrace {
    /// Path of the mutated subquery.
    pub site: TreePath,
    /// Cost of the candidate plan, if planning succeeded.
    pub cost: Option<f64>,
    /// What the search did with the candidate.
    pub outcome: CandidateOutcome,
}

impl CandidateTrace {
    /// Create a new trace entry.
    pub fn new(site: TreePath, cost: Option<f64>, outcome: CandidateOutcome) -> Self {
        Self {
            site,
            cost,
            outcome,
        }
    }
}

/// Planner usage for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Planner invocations, baseline included.
    pub planner_calls: usize,
    /// Candidates whose planning failed and were discarded.
    pub failed_candidates: usize,
}

/// The result of a barrier search pass.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Which plan was chosen.
    pub decision: Decision,
    /// The plan for the untouched query.
    pub baseline: Plan,
    /// The cheapest candidate found, whether or not it was chosen.
    pub best: Option<Candidate>,
    /// Planner usage.
    pub stats: SearchStats,
    /// Per-candidate trace (empty unless tracing was enabled).
    pub trace: Vec<CandidateTrace>,
}

impl SearchOutcome {
    /// Outcome of a pass that never searched.
    pub fn disabled(baseline: Plan) -> Self {
        Self {
            decision: Decision::Disabled,
            baseline,
            best: None,
            stats: SearchStats {
                planner_calls: 1,
                failed_candidates: 0,
            },
            trace: Vec::new(),
        }
    }

    /// The chosen plan.
    pub fn plan(&self) -> &Plan {
        match (self.decision, &self.best) {
            (Decision::Mutated, Some(best)) => &best.plan,
            _ => &self.baseline,
        }
    }

    /// Consume the outcome, keeping only the chosen plan.
    pub fn into_plan(self) -> Plan {
        match (self.decision, self.best) {
            (Decision::Mutated, Some(best)) => best.plan,
            _ => self.baseline,
        }
    }

    /// Cost of the cheapest candidate, if any was planned.
    pub fn best_cost(&self) -> Option<f64> {
        self.best.as_ref().map(|best| best.plan.total_cost)
    }

    /// The mutated query, when it was chosen.
    pub fn mutated_query(&self) -> Option<&Arc<Query>> {
        match (self.decision, &self.best) {
            (Decision::Mutated, Some(best)) => Some(&best.query),
            _ => None,
        }
    }

    /// Format the trace as a human-readable string.
    pub fn format_trace(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Barrier search chose the {} plan after {} planner calls ({} failed)\n",
            self.decision, self.stats.planner_calls, self.stats.failed_candidates
        ));
        output.push_str(&format!("Baseline cost: {:.2}\n", self.baseline.total_cost));

        if self.trace.is_empty() {
            output.push_str("  (no trace available)\n");
            return output;
        }

        for (i, entry) in self.trace.iter().enumerate() {
            let cost = entry
                .cost
                .map_or_else(|| "-".to_string(), |cost| format!("{cost:.2}"));
            let outcome = match &entry.outcome {
                CandidateOutcome::NewBest => "new best".to_string(),
                CandidateOutcome::Rejected => "rejected".to_string(),
                CandidateOutcome::Failed(message) => format!("failed: {message}"),
            };
            output.push_str(&format!(
                "  {}. {} cost={} {}\n",
                i + 1,
                entry.site,
                cost,
                outcome
            ));
        }

        output
    }
}
