//! Expression trees for query predicates.

mod binary;
mod column;
mod expr;
mod sublink;

pub use binary::BinaryOp;
pub use column::ColumnRef;
pub use expr::{BoolOp, Expr};
pub use sublink::{SubLink, SubLinkKind, SubSelect};
