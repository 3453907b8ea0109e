//! The planner interface the barrier search drives.
//!
//! A [`Planner`] is the black-box cost-based optimizer: it maps a query to
//! one costed plan. The search calls it once for the untouched query and
//! once per candidate, always with the same [`PlanRequest`].

use std::sync::Arc;

use common_error::FenceResult;
use fencepost_logical::{Query, Value};
use serde::{Deserialize, Serialize};

use crate::Plan;

/// Cursor options passed through to the planner untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CursorOptions(u32);

impl CursorOptions {
    /// Cursor may scroll backwards.
    pub const SCROLL: Self = Self(0x0001);
    /// Cursor may not scroll backwards.
    pub const NO_SCROLL: Self = Self(0x0002);
    /// Cursor is insensitive to concurrent updates.
    pub const INSENSITIVE: Self = Self(0x0004);
    /// Cursor outlives its transaction.
    pub const HOLD: Self = Self(0x0008);
    /// Prefer a fast-start plan.
    pub const FAST_PLAN: Self = Self(0x0020);

    /// Options from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two option sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Values bound to `$n` parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParamList {
    /// Parameter values, `$1` first.
    pub values: Vec<Value>,
}

impl ParamList {
    /// Create a parameter list.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Value bound to `$index` (1-based).
    pub fn get(&self, index: usize) -> Option<&Value> {
        index.checked_sub(1).and_then(|i| self.values.get(i))
    }
}

/// Everything besides the query that a planner invocation needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanRequest {
    /// Cursor options.
    pub cursor_options: CursorOptions,
    /// Bound parameters, if any.
    pub bound_params: Option<Arc<ParamList>>,
    /// Source text of the query, when the host provides it.
    pub query_text: Option<String>,
}

impl PlanRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cursor options.
    #[must_use]
    pub fn with_cursor_options(mut self, options: CursorOptions) -> Self {
        self.cursor_options = options;
        self
    }

    /// Set the bound parameters.
    #[must_use]
    pub fn with_params(mut self, params: ParamList) -> Self {
        self.bound_params = Some(Arc::new(params));
        self
    }

    /// Set the query text.
    #[must_use]
    pub fn with_query_text(mut self, text: impl Into<String>) -> Self {
        self.query_text = Some(text.into());
        self
    }
}

/// A cost-based planner.
///
/// Implementations must be deterministic for a fixed catalog state: the
/// same query shape yields the same cost. Calls may be expensive and are
/// made repeatedly within one search.
pub trait Planner: Send + Sync {
    /// Produce a costed plan for `query`.
    fn plan(&self, query: &Arc<Query>, request: &PlanRequest) -> FenceResult<Plan>;
}

impl<P: Planner + ?Sized> Planner for &P {
    fn plan(&self, query: &Arc<Query>, request: &PlanRequest) -> FenceResult<Plan> {
        (**self).plan(query, request)
    }
}

impl<P: Planner + ?Sized> Planner for Box<P> {
    fn plan(&self, query: &Arc<Query>, request: &PlanRequest) -> FenceResult<Plan> {
        (**self).plan(query, request)
    }
}

impl<P: Planner + ?Sized> Planner for Arc<P> {
    fn plan(&self, query: &Arc<Query>, request: &PlanRequest) -> FenceResult<Plan> {
        (**self).plan(query, request)
    }
}

/// Adapts a closure into a [`Planner`].
pub struct FnPlanner<F>(F);

impl<F> FnPlanner<F>
where
    F: Fn(&Arc<Query>, &PlanRequest) -> FenceResult<Plan> + Send + Sync,
{
    /// Wrap a planning closure.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Planner for FnPlanner<F>
where
    F: Fn(&Arc<Query>, &PlanRequest) -> FenceResult<Plan> + Send + Sync,
{
    fn plan(&self, query: &Arc<Query>, request: &PlanRequest) -> FenceResult<Plan> {
        (self.0)(query, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlanNode;
    use fencepost_logical::QueryBuilder;

    #[test]
    fn test_cursor_options() {
        let options = CursorOptions::SCROLL.union(CursorOptions::HOLD);
        assert!(options.contains(CursorOptions::SCROLL));
        assert!(!options.contains(CursorOptions::FAST_PLAN));
        assert_eq!(options.bits(), 0x0009);
        assert_eq!(CursorOptions::from_bits(0x0009), options);
    }

    #[test]
    fn test_param_list_is_one_based() {
        let params = ParamList::new(vec![Value::Int64(7), Value::from("x")]);
        assert_eq!(params.get(1), Some(&Value::Int64(7)));
        assert_eq!(params.get(2), Some(&Value::from("x")));
        assert_eq!(params.get(0), None);
        assert_eq!(params.get(3), None);
    }

    #[test]
    fn test_fn_planner_sees_request() {
        let planner = FnPlanner::new(|query: &Arc<Query>, request: &PlanRequest| {
            let cost = if request.cursor_options.contains(CursorOptions::FAST_PLAN) {
                1.0
            } else {
                query.from.len() as f64 * 10.0
            };
            Ok(Plan::new(PlanNode::new("Result", cost)))
        });

        let query = QueryBuilder::table("a").join("b").build();
        let slow = PlanRequest::new().with_query_text("SELECT * FROM a, b");
        let fast = slow.clone().with_cursor_options(CursorOptions::FAST_PLAN);

        assert_eq!(planner.plan(&query, &slow).unwrap().total_cost, 20.0);
        assert_eq!(planner.plan(&query, &fast).unwrap().total_cost, 1.0);

        let shared: Arc<dyn Planner> = Arc::new(planner);
        assert_eq!(shared.plan(&query, &slow).unwrap().total_cost, 20.0);
    }
}
