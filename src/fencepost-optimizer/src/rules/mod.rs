//! Subquery mutations tried by the barrier search.
//!
//! A mutation is a local, purely syntactic rewrite of one subquery. The
//! search applies one mutation site at a time and lets the planner judge
//! the result by cost.

mod offset_barrier;
mod rule;

pub use offset_barrier::OffsetBarrier;
pub use rule::{SubqueryMutation, Transformed};
