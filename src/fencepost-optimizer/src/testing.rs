//! Test doubles and fixtures for exercising the barrier search.
//!
//! [`BarrierCostPlanner`] prices a query by which subqueries carry an
//! OFFSET, so tests can script the cost of every candidate without a real
//! cost model.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use common_error::{FenceError, FenceResult};
use fencepost_logical::{Query, QueryBuilder, col, exists, lit};

use crate::{Plan, PlanNode, PlanRequest, Planner};

/// A scripted planner keyed by the set of barrier-carrying subqueries.
///
/// The key of a query is the sorted list of primary relations of every
/// non-root subquery with an OFFSET. Unknown keys cost the baseline.
#[derive(Debug, Default)]
pub struct BarrierCostPlanner {
    baseline_cost: f64,
    costs: HashMap<Vec<String>, f64>,
    failing: HashSet<Vec<String>>,
    calls: AtomicUsize,
    planned: Mutex<Vec<Arc<Query>>>,
}

impl BarrierCostPlanner {
    /// Create a planner that prices everything at `baseline_cost`.
    pub fn new(baseline_cost: f64) -> Self {
        Self {
            baseline_cost,
            ..Self::default()
        }
    }

    /// Price queries whose barriers sit exactly on `relations`.
    pub fn with_cost(mut self, relations: &[&str], cost: f64) -> Self {
        self.costs.insert(key_of(relations), cost);
        self
    }

    /// Fail to plan queries whose barriers sit exactly on `relations`.
    /// An empty list fails the untouched query.
    pub fn failing_on(mut self, relations: &[&str]) -> Self {
        self.failing.insert(key_of(relations));
        self
    }

    /// Number of `plan` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every query handed to `plan`, in call order.
    pub fn planned_queries(&self) -> Vec<Arc<Query>> {
        self.planned
            .lock()
            .map(|planned| planned.clone())
            .unwrap_or_default()
    }

    /// The key of every query handed to `plan`, in call order.
    pub fn seen_keys(&self) -> Vec<Vec<String>> {
        self.planned_queries()
            .iter()
            .map(|query| barrier_key(query))
            .collect()
    }
}

impl Planner for BarrierCostPlanner {
    fn plan(&self, query: &Arc<Query>, _request: &PlanRequest) -> FenceResult<Plan> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut planned) = self.planned.lock() {
            planned.push(Arc::clone(query));
        }

        let key = barrier_key(query);
        if self.failing.contains(&key) {
            return Err(FenceError::planning(format!(
                "no plan for barriers on {key:?}"
            )));
        }

        let cost = self.costs.get(&key).copied().unwrap_or(self.baseline_cost);
        let mut root = PlanNode::new("Result", cost);
        if let Some(relation) = query.primary_relation() {
            root = root.with_child(PlanNode::new("Seq Scan", cost).with_detail(relation));
        }
        Ok(Plan::new(root))
    }
}

/// Sorted primary relations of the subqueries in `query` that carry an
/// OFFSET.
pub fn barrier_key(query: &Query) -> Vec<String> {
    let mut key: Vec<String> = query
        .row_skip_paths()
        .iter()
        .filter_map(|path| query.resolve(path))
        .filter_map(Query::primary_relation)
        .map(str::to_string)
        .collect();
    key.sort();
    key
}

fn key_of(relations: &[&str]) -> Vec<String> {
    let mut key: Vec<String> = relations.iter().map(|r| (*r).to_string()).collect();
    key.sort();
    key
}

/// `SELECT * FROM a WHERE x > 1 AND EXISTS (SELECT 1 FROM b WHERE b.id = a.id)`
pub fn semi_join_query() -> Arc<Query> {
    let inner = QueryBuilder::table("b")
        .select(lit(1i64))
        .filter(col("b.id").eq(col("a.id")))
        .build();
    QueryBuilder::table("a")
        .filter(col("x").gt(lit(1i64)))
        .filter(exists(inner))
        .build()
}

/// `SELECT * FROM a WHERE EXISTS (SELECT 1 FROM b WHERE b.id = a.id AND
/// EXISTS (SELECT 1 FROM c WHERE c.id = b.id))`
pub fn nested_exists_query() -> Arc<Query> {
    let innermost = QueryBuilder::table("c")
        .select(lit(1i64))
        .filter(col("c.id").eq(col("b.id")))
        .build();
    let inner = QueryBuilder::table("b")
        .select(lit(1i64))
        .filter(col("b.id").eq(col("a.id")))
        .filter(exists(innermost))
        .build();
    QueryBuilder::table("a").filter(exists(inner)).build()
}
