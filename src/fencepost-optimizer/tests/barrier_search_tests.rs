//! End-to-end behavior of the barrier search.

use std::sync::Arc;

use common_config::BarrierSearchConfig;
use common_error::FenceError;
use fencepost_logical::{QueryBuilder, Step, TreePath, col, exists, lit};
use fencepost_optimizer::testing::{BarrierCostPlanner, nested_exists_query, semi_join_query};
use fencepost_optimizer::{
    BarrierSearch, CandidateOutcome, CursorOptions, Decision, FnPlanner, ParamList, Plan,
    PlanNode, PlanRequest, Planner,
};

fn outer_site() -> TreePath {
    TreePath::root().child(Step::Quals).child(Step::SubSelect)
}

fn inner_site() -> TreePath {
    outer_site()
        .child(Step::Quals)
        .child(Step::Child(1))
        .child(Step::SubSelect)
}

#[test]
fn test_mutated_plan_wins_at_default_threshold() {
    // baseline 100, candidate 40, ratio 2.5 > 1.0
    let search = BarrierSearch::new(BarrierCostPlanner::new(100.0).with_cost(&["b"], 40.0));

    let outcome = search
        .search(&semi_join_query(), &PlanRequest::default())
        .unwrap();

    assert_eq!(outcome.decision, Decision::Mutated);
    assert_eq!(outcome.baseline.total_cost, 100.0);
    assert_eq!(outcome.plan().total_cost, 40.0);
}

#[test]
fn test_baseline_wins_under_higher_threshold() {
    // ratio 1.25 <= 2.0
    let search = BarrierSearch::with_config(
        BarrierCostPlanner::new(100.0).with_cost(&["b"], 80.0),
        BarrierSearchConfig::default().with_threshold(2.0),
    );

    let outcome = search
        .search(&semi_join_query(), &PlanRequest::default())
        .unwrap();

    assert_eq!(outcome.decision, Decision::Baseline);
    assert_eq!(outcome.best_cost(), Some(80.0));
    assert_eq!(outcome.plan().total_cost, 100.0);
    assert!(outcome.mutated_query().is_none());
}

#[test]
fn test_nested_inner_candidate_is_best() {
    let search = BarrierSearch::with_config(
        BarrierCostPlanner::new(100.0)
            .with_cost(&["c"], 30.0)
            .with_cost(&["b"], 50.0),
        BarrierSearchConfig::default().with_trace(true),
    );

    let outcome = search
        .search(&nested_exists_query(), &PlanRequest::default())
        .unwrap();

    let best = outcome.best.as_ref().unwrap();
    assert_eq!(best.site, inner_site());
    assert_eq!(best.plan.total_cost, 30.0);
    assert_eq!(outcome.decision, Decision::Mutated);
    assert_eq!(outcome.stats.planner_calls, 3);

    let sites: Vec<_> = outcome.trace.iter().map(|t| t.site.clone()).collect();
    assert_eq!(sites, vec![inner_site(), outer_site()]);

    // Only the inner subquery carries the barrier.
    let mutated = outcome.mutated_query().unwrap();
    assert_eq!(
        mutated.resolve(&inner_site()).unwrap().limit_offset,
        Some(lit(0i64))
    );
    assert!(mutated.resolve(&outer_site()).unwrap().limit_offset.is_none());
}

#[test]
fn test_equal_costs_prefer_later_candidate() {
    let search = BarrierSearch::new(
        BarrierCostPlanner::new(100.0)
            .with_cost(&["c"], 60.0)
            .with_cost(&["b"], 60.0),
    );

    let outcome = search
        .search(&nested_exists_query(), &PlanRequest::default())
        .unwrap();

    assert_eq!(outcome.best.unwrap().site, outer_site());
}

#[test]
fn test_candidate_failure_is_absorbed() {
    let search = BarrierSearch::with_config(
        BarrierCostPlanner::new(100.0)
            .with_cost(&["c"], 45.0)
            .failing_on(&["b"]),
        BarrierSearchConfig::default().with_trace(true),
    );

    let outcome = search
        .search(&nested_exists_query(), &PlanRequest::default())
        .unwrap();

    assert_eq!(outcome.decision, Decision::Mutated);
    assert_eq!(outcome.plan().total_cost, 45.0);
    assert_eq!(outcome.stats.planner_calls, 3);
    assert_eq!(outcome.stats.failed_candidates, 1);
    assert!(matches!(
        outcome.trace[1].outcome,
        CandidateOutcome::Failed(_)
    ));
}

#[test]
fn test_nan_candidate_does_not_block_later_candidates() {
    let search = BarrierSearch::new(
        BarrierCostPlanner::new(100.0)
            .with_cost(&["c"], f64::NAN)
            .with_cost(&["b"], 10.0),
    );

    let outcome = search
        .search(&nested_exists_query(), &PlanRequest::default())
        .unwrap();

    assert_eq!(outcome.decision, Decision::Mutated);
    assert_eq!(outcome.best.as_ref().unwrap().site, outer_site());
    assert_eq!(outcome.plan().total_cost, 10.0);
    assert_eq!(outcome.stats.failed_candidates, 1);
}

#[test]
fn test_every_candidate_failing_returns_baseline() {
    let search = BarrierSearch::new(
        BarrierCostPlanner::new(100.0)
            .failing_on(&["b"])
            .failing_on(&["c"]),
    );

    let plan = search
        .plan(&nested_exists_query(), &PlanRequest::default())
        .unwrap();

    assert_eq!(plan.total_cost, 100.0);
}

#[test]
fn test_baseline_failure_is_returned_unmodified() {
    let search = BarrierSearch::new(FnPlanner::new(|_: &Arc<_>, _: &PlanRequest| {
        Err(FenceError::planning("relation \"a\" does not exist"))
    }));

    let err = search
        .plan(&semi_join_query(), &PlanRequest::default())
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "PlanningError: relation \"a\" does not exist"
    );
}

#[test]
fn test_request_is_forwarded_to_every_call() {
    let request = PlanRequest::new()
        .with_cursor_options(CursorOptions::FAST_PLAN)
        .with_params(ParamList::new(vec![1i64.into()]))
        .with_query_text("SELECT * FROM a WHERE EXISTS (...)");
    let expected = request.clone();

    let planner = FnPlanner::new(move |_: &Arc<_>, seen: &PlanRequest| {
        assert_eq!(*seen, expected);
        Ok(Plan::new(PlanNode::new("Result", 1.0)))
    });
    let search = BarrierSearch::new(planner);

    let outcome = search.search(&nested_exists_query(), &request).unwrap();
    assert_eq!(outcome.stats.planner_calls, 3);
}

#[test]
fn test_user_offset_is_preserved() {
    let inner = QueryBuilder::table("b")
        .filter(col("b.id").eq(col("a.id")))
        .offset(10)
        .build();
    let query = QueryBuilder::table("a").filter(exists(inner)).build();
    let next = Arc::new(BarrierCostPlanner::new(100.0));
    let search = BarrierSearch::new(Arc::clone(&next));

    let outcome = search.search(&query, &PlanRequest::default()).unwrap();

    assert_eq!(outcome.decision, Decision::Baseline);
    assert_eq!(next.calls(), 1);
    assert_eq!(
        query.resolve(&outer_site()).unwrap().limit_offset,
        Some(lit(10i64))
    );
}
