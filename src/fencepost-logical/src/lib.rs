//! Query tree data model for Fencepost.
//!
//! `fencepost-logical` holds the analyzed form of a query as the barrier
//! search sees it: a [`Query`] with a WHERE predicate built from [`Expr`]
//! nodes, where [`SubLink`] expressions nest further queries.
//!
//! # Overview
//!
//! - **Queries** are immutable once built and shared through `Arc`.
//! - **Expressions** form a closed enum; [`QueryVisitor`] walks every
//!   variant structurally so callers override only what they interpret.
//! - **Tree paths** address a subquery from the root, and
//!   [`Query::replace_at`] rebuilds a new root along that path while sharing
//!   every other subtree.
//!
//! # Example
//!
//! ```rust
//! use fencepost_logical::{QueryBuilder, col, exists, lit};
//!
//! let inner = QueryBuilder::table("b").filter(col("b.id").eq(col("a.id"))).build();
//! let query = QueryBuilder::table("a")
//!     .filter(col("x").gt(lit(1i64)))
//!     .filter(exists(inner))
//!     .build();
//!
//! println!("{}", query.explain());
//! ```

pub mod expr;
mod builder;
mod explain;
mod path;
mod query;
mod value;
pub mod visit;

pub use builder::{QueryBuilder, and_all, any_sublink, col, exists, lit, not_exists, param, scalar};
pub use expr::{BinaryOp, BoolOp, ColumnRef, Expr, SubLink, SubLinkKind, SubSelect};
pub use path::{Step, TreePath};
pub use query::{Query, RangeItem, TargetEntry};
pub use value::Value;
pub use visit::QueryVisitor;
