//! Heuristic plan-space search in front of a cost-based planner.
//!
//! [`BarrierSearch`] wraps any [`Planner`]. For each `EXISTS` subquery it
//! replans the query with an `OFFSET 0` barrier inside that subquery, and
//! returns the mutated plan only when it beats the untouched plan by the
//! configured cost ratio.

mod plan;
mod planner;
mod rules;
mod search;
pub mod testing;

pub use plan::{Plan, PlanNode};
pub use planner::{CursorOptions, FnPlanner, ParamList, PlanRequest, Planner};
pub use rules::{OffsetBarrier, SubqueryMutation, Transformed};
pub use search::{
    BarrierSearch, Candidate, CandidateOutcome, CandidateTrace, Decision, DecisionPolicy,
    MutationWalker, SearchContext, SearchOutcome, SearchStats,
};
