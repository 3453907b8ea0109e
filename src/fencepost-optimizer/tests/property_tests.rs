//! Property-based tests for the barrier search.

use std::sync::{Arc, Mutex};

use common_config::BarrierSearchConfig;
use common_error::FenceResult;
use fencepost_logical::{BoolOp, Expr, Query, QueryBuilder, col, exists, lit, scalar};
use fencepost_optimizer::testing::barrier_key;
use fencepost_optimizer::{BarrierSearch, Decision, Plan, PlanNode, PlanRequest, Planner};
use proptest::prelude::*;

// =========================================================================
// Query shapes
// =========================================================================

/// User OFFSET carried by pre-marked subqueries.
const USER_OFFSET: i64 = 3;

/// A predicate shape with enough structure to place existence tests
/// anywhere in the tree.
#[derive(Debug, Clone)]
enum Shape {
    Compare(u8),
    Exists {
        relation: u8,
        offset: bool,
        body: Vec<Shape>,
    },
    Not(Box<Shape>),
    Or(Vec<Shape>),
    Scalar(Box<Shape>),
}

impl Shape {
    fn to_expr(&self) -> Expr {
        match self {
            Self::Compare(n) => col(&format!("r{n}.x")).gt(lit(i64::from(*n))),
            Self::Exists {
                relation,
                offset,
                body,
            } => {
                let mut builder = QueryBuilder::table(format!("r{relation}"));
                for shape in body {
                    builder = builder.filter(shape.to_expr());
                }
                if *offset {
                    builder = builder.offset(USER_OFFSET);
                }
                exists(builder.build())
            }
            Self::Not(inner) => inner.to_expr().not(),
            Self::Or(args) => Expr::Bool {
                op: BoolOp::Or,
                args: args.iter().map(Shape::to_expr).collect(),
            },
            Self::Scalar(inner) => col("x").gt(scalar(
                QueryBuilder::table("s").with_quals(inner.to_expr()).build(),
            )),
        }
    }

    /// Existence tests without a user OFFSET.
    fn mutable_sites(&self) -> usize {
        match self {
            Self::Compare(_) => 0,
            Self::Exists { offset, body, .. } => {
                usize::from(!*offset) + body.iter().map(Shape::mutable_sites).sum::<usize>()
            }
            Self::Not(inner) | Self::Scalar(inner) => inner.mutable_sites(),
            Self::Or(args) => args.iter().map(Shape::mutable_sites).sum(),
        }
    }
}

/// Where a top-level shape is placed in the root query.
#[derive(Debug, Clone, Copy)]
enum Placement {
    Where,
    Target,
    DerivedTable,
}

fn build_query(shapes: &[(Placement, Shape)]) -> Arc<Query> {
    shapes
        .iter()
        .enumerate()
        .fold(QueryBuilder::table("root"), |builder, (i, (placement, shape))| {
            match placement {
                Placement::Where => builder.filter(shape.to_expr()),
                Placement::Target => builder.select(shape.to_expr()),
                Placement::DerivedTable => builder.join_subquery(
                    QueryBuilder::table("derived").filter(shape.to_expr()).build(),
                    format!("d{i}"),
                ),
            }
        })
        .build()
}

fn arb_placement() -> impl Strategy<Value = Placement> {
    prop_oneof![
        2 => Just(Placement::Where),
        1 => Just(Placement::Target),
        1 => Just(Placement::DerivedTable),
    ]
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    let leaf = (0u8..8).prop_map(Shape::Compare);
    leaf.prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            3 => (0u8..8, prop::bool::weighted(0.25), prop::collection::vec(inner.clone(), 0..3))
                .prop_map(|(relation, offset, body)| Shape::Exists {
                    relation,
                    offset,
                    body,
                }),
            1 => inner.clone().prop_map(|shape| Shape::Not(Box::new(shape))),
            1 => prop::collection::vec(inner.clone(), 1..3).prop_map(Shape::Or),
            1 => inner.prop_map(|shape| Shape::Scalar(Box::new(shape))),
        ]
    })
}

/// Shapes without any existence test.
fn arb_plain_shape() -> impl Strategy<Value = Shape> {
    let leaf = (0u8..8).prop_map(Shape::Compare);
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|shape| Shape::Not(Box::new(shape))),
            prop::collection::vec(inner.clone(), 1..3).prop_map(Shape::Or),
            inner.prop_map(|shape| Shape::Scalar(Box::new(shape))),
        ]
    })
}

fn arb_query() -> impl Strategy<Value = (Arc<Query>, usize)> {
    prop::collection::vec((arb_placement(), arb_shape()), 0..4).prop_map(|shapes| {
        let sites = shapes.iter().map(|(_, shape)| shape.mutable_sites()).sum();
        (build_query(&shapes), sites)
    })
}

/// Per-relation cost deltas applied for each barrier.
fn arb_deltas() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-60.0f64..60.0, 8)
}

// =========================================================================
// Planner double
// =========================================================================

/// Deterministic planner: the baseline costs 100 and every barrier-marked
/// subquery shifts the cost by its relation's delta.
struct DeltaPlanner {
    deltas: Vec<f64>,
    planned: Mutex<Vec<Arc<Query>>>,
}

impl DeltaPlanner {
    fn new(deltas: Vec<f64>) -> Self {
        Self {
            deltas,
            planned: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.planned.lock().unwrap().len()
    }

    fn planned(&self) -> Vec<Arc<Query>> {
        self.planned.lock().unwrap().clone()
    }
}

impl Planner for DeltaPlanner {
    fn plan(&self, query: &Arc<Query>, _request: &PlanRequest) -> FenceResult<Plan> {
        self.planned.lock().unwrap().push(Arc::clone(query));

        let shift: f64 = barrier_key(query)
            .iter()
            .filter_map(|relation| relation.strip_prefix('r'))
            .filter_map(|index| index.parse::<usize>().ok())
            .filter_map(|index| self.deltas.get(index))
            .sum();
        Ok(Plan::new(PlanNode::new("Result", (100.0 + shift).max(0.0))))
    }
}

fn search_with(
    deltas: &[f64],
    config: BarrierSearchConfig,
) -> BarrierSearch<DeltaPlanner> {
    BarrierSearch::with_config(DeltaPlanner::new(deltas.to_vec()), config)
}

// =========================================================================
// Properties
// =========================================================================

proptest! {
    #[test]
    fn prop_disabled_is_passthrough((query, _) in arb_query(), deltas in arb_deltas()) {
        let request = PlanRequest::default();
        let direct = DeltaPlanner::new(deltas.clone()).plan(&query, &request).unwrap();
        let search = search_with(&deltas, BarrierSearchConfig::default().with_enabled(false));

        let plan = search.plan(&query, &request).unwrap();

        prop_assert_eq!(plan, direct);
        prop_assert_eq!(search.next().calls(), 1);
    }

    #[test]
    fn prop_no_existence_tests_is_passthrough(
        shapes in prop::collection::vec((arb_placement(), arb_plain_shape()), 0..4),
        deltas in arb_deltas(),
    ) {
        let query = build_query(&shapes);
        let request = PlanRequest::default();
        let direct = DeltaPlanner::new(deltas.clone()).plan(&query, &request).unwrap();
        let search = search_with(&deltas, BarrierSearchConfig::default());

        let outcome = search.search(&query, &request).unwrap();

        prop_assert_eq!(outcome.decision, Decision::Baseline);
        prop_assert_eq!(outcome.into_plan(), direct);
        prop_assert_eq!(search.next().calls(), 1);
    }

    #[test]
    fn prop_user_offsets_are_never_altered((query, _) in arb_query(), deltas in arb_deltas()) {
        let marked = query.row_skip_paths();
        let search = search_with(&deltas, BarrierSearchConfig::default());

        search.search(&query, &PlanRequest::default()).unwrap();

        for planned in search.next().planned() {
            for path in &marked {
                let subquery = planned.resolve(path).unwrap();
                prop_assert_eq!(subquery.limit_offset.clone(), Some(lit(USER_OFFSET)));
            }
        }
    }

    #[test]
    fn prop_never_worse_than_baseline(
        (query, _) in arb_query(),
        deltas in arb_deltas(),
        threshold in 1.0f64..20.0,
    ) {
        let config = BarrierSearchConfig::default().with_threshold(threshold);
        let outcome = search_with(&deltas, config)
            .search(&query, &PlanRequest::default())
            .unwrap();

        prop_assert!(outcome.plan().total_cost <= outcome.baseline.total_cost);
    }

    #[test]
    fn prop_raising_threshold_only_reverts_to_baseline(
        (query, _) in arb_query(),
        deltas in arb_deltas(),
        low in 0.0f64..10.0,
        raise in 0.0f64..10.0,
    ) {
        let request = PlanRequest::default();
        let low_outcome = search_with(&deltas, BarrierSearchConfig::default().with_threshold(low))
            .search(&query, &request)
            .unwrap();
        let high_outcome =
            search_with(&deltas, BarrierSearchConfig::default().with_threshold(low + raise))
                .search(&query, &request)
                .unwrap();

        if high_outcome.decision == Decision::Mutated {
            prop_assert_eq!(low_outcome.decision, Decision::Mutated);
        }
        prop_assert_eq!(low_outcome.best_cost(), high_outcome.best_cost());
    }

    #[test]
    fn prop_one_replan_per_existence_test((query, sites) in arb_query(), deltas in arb_deltas()) {
        let search = search_with(&deltas, BarrierSearchConfig::default());

        let outcome = search.search(&query, &PlanRequest::default()).unwrap();

        prop_assert_eq!(search.next().calls(), 1 + sites);
        prop_assert_eq!(outcome.stats.planner_calls, 1 + sites);
        prop_assert_eq!(outcome.stats.failed_candidates, 0);
    }
}
