//! Tree-formatted explain output for queries.

use common_display::{DisplayTree, TreeNode};

use crate::{Expr, Query, RangeItem, SubSelect};

impl TreeNode for Query {
    fn label(&self) -> String {
        "Query".to_string()
    }

    fn children(&self) -> Vec<&dyn TreeNode> {
        let targets = self.targets.iter().map(|t| &t.expr as &dyn TreeNode);
        let derived = self.from.iter().filter_map(|item| match item {
            RangeItem::Subquery { query, .. } => Some(query.as_ref() as &dyn TreeNode),
            RangeItem::Relation { .. } => None,
        });
        let quals = self.quals.iter().map(|q| q as &dyn TreeNode);
        targets.chain(derived).chain(quals).collect()
    }

    fn details(&self) -> Option<String> {
        let from: Vec<&str> = self.from.iter().map(RangeItem::ref_name).collect();
        let mut details = format!("from={}", from.join(","));
        if let Some(offset) = &self.limit_offset {
            details.push_str(&format!(", offset={offset}"));
        }
        if let Some(count) = &self.limit_count {
            details.push_str(&format!(", limit={count}"));
        }
        Some(details)
    }
}

impl TreeNode for Expr {
    fn label(&self) -> String {
        match self {
            Self::Bool { op, .. } => op.to_string(),
            Self::Binary { op, .. } => op.to_string(),
            Self::Func { name, .. } => format!("{name}()"),
            Self::Cast { type_name, .. } => format!("CAST AS {type_name}"),
            Self::SubLink(sublink) => sublink.keyword(),
            leaf => leaf.to_string(),
        }
    }

    fn children(&self) -> Vec<&dyn TreeNode> {
        let mut children: Vec<&dyn TreeNode> = Expr::children(self)
            .into_iter()
            .map(|c| c as &dyn TreeNode)
            .collect();
        if let Self::SubLink(sublink) = self {
            if let Some(query) = sublink.query() {
                children.push(query.as_ref() as &dyn TreeNode);
            }
        }
        children
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::SubLink(sublink) => match &sublink.subselect {
                Some(SubSelect::Query(_)) => None,
                Some(SubSelect::Unresolved(text)) => Some(format!("unresolved: {text}")),
                None => Some("missing subquery".to_string()),
            },
            _ => None,
        }
    }
}

impl Query {
    /// Generate a tree-formatted explanation of the query.
    pub fn explain(&self) -> String {
        DisplayTree::new(self).to_string()
    }
}
