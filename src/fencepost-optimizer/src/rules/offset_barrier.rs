//! The OFFSET 0 barrier.
//!
//! `OFFSET 0` skips no rows, but a subquery that carries any OFFSET cannot
//! be pulled up into its parent. Adding one to the body of an `EXISTS`
//! therefore keeps it from being flattened into a semi-join, which
//! sometimes lets the planner pick a cheaper nested strategy.

use std::sync::Arc;

use fencepost_logical::{Expr, Query, Value};

use super::rule::{SubqueryMutation, Transformed};

/// Installs a zero-valued OFFSET on a subquery that has none.
///
/// # Legal When
///
/// - The subquery has no OFFSET of its own. A user-written OFFSET is never
///   replaced.
#[derive(Debug, Clone)]
pub struct OffsetBarrier {
    marker: Expr,
}

impl OffsetBarrier {
    /// Create the barrier with its shared `OFFSET 0` marker.
    pub fn new() -> Self {
        Self {
            marker: Expr::Const(Value::Int64(0)),
        }
    }
}

impl Default for OffsetBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl SubqueryMutation for OffsetBarrier {
    fn name(&self) -> &'static str {
        "OffsetBarrier"
    }

    fn apply(&self, subquery: &Arc<Query>) -> Transformed<Arc<Query>> {
        if subquery.has_row_skip() {
            return Transformed::no(Arc::clone(subquery));
        }
        Transformed::yes(Arc::new(subquery.with_limit_offset(self.marker.clone())))
    }
}
