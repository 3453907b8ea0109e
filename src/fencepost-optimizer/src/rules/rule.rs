//! Subquery mutation trait and its result type.

use std::sync::Arc;

use fencepost_logical::Query;

/// A local rewrite of one subquery.
///
/// A mutation never edits its input in place. It either returns a new
/// subquery or reports that it does not apply.
pub trait SubqueryMutation: Send + Sync {
    /// Get the name of this mutation.
    fn name(&self) -> &'static str;

    /// Apply this mutation to `subquery`.
    fn apply(&self, subquery: &Arc<Query>) -> Transformed<Arc<Query>>;
}

/// The result of applying a mutation.
#[derive(Debug, Clone)]
pub struct Transformed<T> {
    /// The (potentially transformed) value.
    pub value: T,
    /// Whether the value was actually changed.
    pub changed: bool,
}

impl<T> Transformed<T> {
    /// Create a new transformed result indicating the value was changed.
    pub fn yes(value: T) -> Self {
        Self {
            value,
            changed: true,
        }
    }

    /// Create a new transformed result indicating the value was unchanged.
    pub fn no(value: T) -> Self {
        Self {
            value,
            changed: false,
        }
    }
}
