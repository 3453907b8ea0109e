//! Choosing between the baseline plan and the best mutated plan.

use common_config::BarrierSearchConfig;

use super::outcome::Decision;
use crate::Plan;

/// Threshold rule over the baseline/mutated cost ratio.
///
/// A mutated plan wins only when `baseline / mutated` is strictly greater
/// than the threshold. With the default threshold of 1.0 any strict
/// improvement is accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPolicy {
    threshold: f64,
}

impl DecisionPolicy {
    /// Create a policy with the given threshold.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// The configured threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// `baseline / mutated`, defined for a zero-cost mutated plan.
    ///
    /// A zero mutated cost gives infinity against a positive baseline and
    /// 1.0 against a zero baseline.
    pub fn cost_ratio(baseline_cost: f64, mutated_cost: f64) -> f64 {
        if mutated_cost == 0.0 {
            if baseline_cost > 0.0 { f64::INFINITY } else { 1.0 }
        } else {
            baseline_cost / mutated_cost
        }
    }

    /// Decide from costs alone. `best_cost` is `None` when no candidate
    /// was planned.
    pub fn choose(&self, baseline_cost: f64, best_cost: Option<f64>) -> Decision {
        match best_cost {
            // NaN ratios compare false and keep the baseline.
            Some(best) if Self::cost_ratio(baseline_cost, best) > self.threshold => {
                Decision::Mutated
            }
            _ => Decision::Baseline,
        }
    }

    /// Return whichever plan wins.
    pub fn decide(&self, baseline: Plan, best: Option<Plan>) -> Plan {
        let best_cost = best.as_ref().map(|plan| plan.total_cost);
        match (self.choose(baseline.total_cost, best_cost), best) {
            (Decision::Mutated, Some(best)) => best,
            _ => baseline,
        }
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self::new(BarrierSearchConfig::default().threshold)
    }
}

impl From<&BarrierSearchConfig> for DecisionPolicy {
    fn from(config: &BarrierSearchConfig) -> Self {
        Self::new(config.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlanNode;

    fn plan(cost: f64) -> Plan {
        Plan::new(PlanNode::new("Seq Scan", cost))
    }

    #[test]
    fn test_cost_ratio() {
        assert_eq!(DecisionPolicy::cost_ratio(100.0, 40.0), 2.5);
        assert_eq!(DecisionPolicy::cost_ratio(100.0, 0.0), f64::INFINITY);
        assert_eq!(DecisionPolicy::cost_ratio(0.0, 0.0), 1.0);
        assert_eq!(DecisionPolicy::cost_ratio(0.0, 10.0), 0.0);
    }

    #[test]
    fn test_no_candidate_keeps_baseline() {
        let policy = DecisionPolicy::default();
        assert_eq!(policy.threshold(), 1.0);
        assert_eq!(policy.choose(100.0, None), Decision::Baseline);
        assert_eq!(policy.decide(plan(100.0), None).total_cost, 100.0);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let policy = DecisionPolicy::new(2.5);
        assert_eq!(policy.choose(100.0, Some(40.0)), Decision::Baseline);
        assert_eq!(policy.choose(100.0, Some(39.0)), Decision::Mutated);
    }

    #[test]
    fn test_default_threshold() {
        let policy = DecisionPolicy::default();
        assert_eq!(policy.decide(plan(100.0), Some(plan(40.0))).total_cost, 40.0);
        assert_eq!(policy.decide(plan(100.0), Some(plan(100.0))).total_cost, 100.0);
        assert_eq!(policy.decide(plan(100.0), Some(plan(120.0))).total_cost, 100.0);
    }

    #[test]
    fn test_higher_threshold_requires_larger_margin() {
        let policy = DecisionPolicy::new(2.0);
        assert_eq!(policy.choose(100.0, Some(80.0)), Decision::Baseline);
        assert_eq!(policy.choose(100.0, Some(40.0)), Decision::Mutated);
    }

    #[test]
    fn test_zero_costs() {
        let policy = DecisionPolicy::default();
        assert_eq!(policy.choose(5.0, Some(0.0)), Decision::Mutated);
        assert_eq!(policy.choose(0.0, Some(0.0)), Decision::Baseline);
        assert_eq!(DecisionPolicy::new(1e4).choose(5.0, Some(0.0)), Decision::Mutated);
    }

    #[test]
    fn test_nan_cost_keeps_baseline() {
        let policy = DecisionPolicy::new(0.0);
        assert_eq!(policy.choose(100.0, Some(f64::NAN)), Decision::Baseline);
    }

    #[test]
    fn test_from_config() {
        let config = BarrierSearchConfig::default().with_threshold(3.0);
        assert_eq!(DecisionPolicy::from(&config).threshold(), 3.0);
    }
}
