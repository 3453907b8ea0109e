//! Display utilities for Fencepost.
//!
//! Renders query trees and plans as indented ASCII trees.

mod tree;

pub use tree::{DisplayTree, TreeNode};

/// Shorten a string for log output, keeping it on a char boundary.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
