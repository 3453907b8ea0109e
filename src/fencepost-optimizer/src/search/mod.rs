//! Plan-space search over `OFFSET 0` barriers.
//!
//! A pass plans the untouched query, walks it trying one barrier per
//! existence test, and lets [`DecisionPolicy`] pick the winner.

mod barrier_search;
mod context;
mod outcome;
mod policy;
mod walker;

pub use barrier_search::BarrierSearch;
pub use context::SearchContext;
pub use outcome::{
    Candidate, CandidateOutcome, CandidateTrace, Decision, SearchOutcome, SearchStats,
};
pub use policy::DecisionPolicy;
pub use walker::MutationWalker;
