//! Costed plans returned by a [`crate::Planner`].

use common_display::{DisplayTree, TreeNode};
use serde::{Deserialize, Serialize};

/// A node of an executable plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanNode {
    /// Operator name, e.g. `Hash Semi Join`.
    pub name: String,
    /// Estimated total cost of this subtree.
    pub total_cost: f64,
    /// Free-form operator detail.
    pub detail: Option<String>,
    /// Input nodes.
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    /// Create a leaf node.
    pub fn new(name: impl Into<String>, total_cost: f64) -> Self {
        Self {
            name: name.into(),
            total_cost,
            detail: None,
            children: Vec::new(),
        }
    }

    /// Attach operator detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add an input node.
    #[must_use]
    pub fn with_child(mut self, child: PlanNode) -> Self {
        self.children.push(child);
        self
    }
}

impl TreeNode for PlanNode {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn children(&self) -> Vec<&dyn TreeNode> {
        self.children.iter().map(|c| c as &dyn TreeNode).collect()
    }

    fn details(&self) -> Option<String> {
        Some(match &self.detail {
            Some(detail) => format!("{detail}, cost={:.2}", self.total_cost),
            None => format!("cost={:.2}", self.total_cost),
        })
    }
}

/// An immutable costed plan.
///
/// `total_cost` is non-negative and only comparable between plans produced
/// against the same catalog state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Estimated total cost; lower is better.
    pub total_cost: f64,
    /// Root execution node.
    pub root: PlanNode,
}

impl Plan {
    /// Create a plan whose cost is the root node's total cost.
    pub fn new(root: PlanNode) -> Self {
        Self {
            total_cost: root.total_cost,
            root,
        }
    }

    /// Generate a tree-formatted explanation of the plan.
    pub fn explain(&self) -> String {
        DisplayTree::new(&self.root).to_string()
    }
}
