//! Tree display utilities for query trees and plans.

use std::fmt;

/// A node in a display tree.
pub trait TreeNode {
    /// Get the display label of this node.
    fn label(&self) -> String;

    /// Get child nodes.
    fn children(&self) -> Vec<&dyn TreeNode>;

    /// Get additional details to display.
    fn details(&self) -> Option<String> {
        None
    }
}

/// Helper for displaying tree structures.
pub struct DisplayTree<'a> {
    root: &'a dyn TreeNode,
}

impl<'a> DisplayTree<'a> {
    /// Create a new display tree.
    pub fn new(root: &'a dyn TreeNode) -> Self {
        Self { root }
    }

    fn fmt_node(
        f: &mut fmt::Formatter<'_>,
        node: &dyn TreeNode,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let connector = if is_last { "└─ " } else { "├─ " };

        write!(f, "{prefix}{connector}{}", node.label())?;
        if let Some(details) = node.details() {
            write!(f, " ({details})")?;
        }
        writeln!(f)?;

        let children = node.children();
        let child_prefix = format!("{prefix}{}", if is_last { "   " } else { "│  " });

        for (i, child) in children.iter().enumerate() {
            Self::fmt_node(f, *child, &child_prefix, i + 1 == children.len())?;
        }

        Ok(())
    }
}

impl fmt::Display for DisplayTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.label())?;
        if let Some(details) = self.root.details() {
            write!(f, " ({details})")?;
        }
        writeln!(f)?;

        let children = self.root.children();
        for (i, child) in children.iter().enumerate() {
            Self::fmt_node(f, *child, "", i + 1 == children.len())?;
        }

        Ok(())
    }
}
