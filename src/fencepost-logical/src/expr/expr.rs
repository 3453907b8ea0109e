//! Predicate and scalar expression tree.

use serde::{Deserialize, Serialize};

use super::{BinaryOp, ColumnRef, SubLink};
use crate::Value;

/// Boolean connective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolOp {
    /// Logical AND over all arguments.
    And,
    /// Logical OR over all arguments.
    Or,
    /// Logical NOT of a single argument.
    Not,
}

impl std::fmt::Display for BoolOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::Not => write!(f, "NOT"),
        }
    }
}

/// An expression inside a query's predicate or target list.
///
/// The set of variants is closed. Only [`Expr::Bool`] conjunctions and
/// [`Expr::SubLink`] existence tests carry meaning for the barrier search;
/// every other variant is walked structurally through [`Expr::children`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A literal constant.
    Const(Value),
    /// A column reference.
    Column(ColumnRef),
    /// A bound parameter (`$n`, 1-based).
    Param(usize),
    /// AND / OR / NOT over argument expressions.
    Bool { op: BoolOp, args: Vec<Expr> },
    /// A binary operation.
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// A function call.
    Func { name: String, args: Vec<Expr> },
    /// A type cast.
    Cast { expr: Box<Expr>, type_name: String },
    /// A subquery used as an expression (EXISTS, IN/ANY, ALL, scalar, ARRAY).
    SubLink(SubLink),
}

impl Expr {
    /// Create a literal expression.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Const(value.into())
    }

    /// Create a column reference expression.
    pub fn column(name: impl AsRef<str>) -> Self {
        Self::Column(ColumnRef::parse(name.as_ref()))
    }

    /// Create a binary expression.
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a function call.
    pub fn func(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Func {
            name: name.into(),
            args,
        }
    }

    /// Create a type cast.
    pub fn cast(expr: Expr, type_name: impl Into<String>) -> Self {
        Self::Cast {
            expr: Box::new(expr),
            type_name: type_name.into(),
        }
    }

    // Comparison operators

    /// Equality comparison.
    pub fn eq(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Eq, other)
    }

    /// Inequality comparison.
    pub fn not_eq(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::NotEq, other)
    }

    /// Greater than comparison.
    pub fn gt(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Gt, other)
    }

    /// Less than comparison.
    pub fn lt(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Lt, other)
    }

    // Logical operators

    /// Logical AND. Nested conjunctions are flattened into one node.
    pub fn and(self, other: Expr) -> Self {
        let mut args = match self {
            Self::Bool {
                op: BoolOp::And,
                args,
            } => args,
            other => vec![other],
        };
        match other {
            Self::Bool {
                op: BoolOp::And,
                args: rest,
            } => args.extend(rest),
            other => args.push(other),
        }
        Self::Bool {
            op: BoolOp::And,
            args,
        }
    }

    /// Logical OR.
    pub fn or(self, other: Expr) -> Self {
        Self::Bool {
            op: BoolOp::Or,
            args: vec![self, other],
        }
    }

    /// Logical NOT.
    pub fn not(self) -> Self {
        Self::Bool {
            op: BoolOp::Not,
            args: vec![self],
        }
    }

    /// Whether this is an AND node.
    pub fn is_conjunction(&self) -> bool {
        matches!(
            self,
            Self::Bool {
                op: BoolOp::And,
                ..
            }
        )
    }

    /// The sublink, if this expression is one.
    pub fn as_sublink(&self) -> Option<&SubLink> {
        match self {
            Self::SubLink(sublink) => Some(sublink),
            _ => None,
        }
    }

    /// Direct child expressions, in a stable order.
    ///
    /// Indices into this list are the `Child(i)` steps of a
    /// [`crate::TreePath`]. Subqueries are not expressions and are reached
    /// through the `SubSelect` step instead.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Self::Const(_) | Self::Column(_) | Self::Param(_) => vec![],
            Self::Bool { args, .. } | Self::Func { args, .. } => args.iter().collect(),
            Self::Binary { left, right, .. } => vec![&**left, &**right],
            Self::Cast { expr, .. } => vec![&**expr],
            Self::SubLink(sublink) => sublink.test_expr.iter().map(|test| &**test).collect(),
        }
    }

    /// Copy of this node with child `index` replaced.
    ///
    /// Returns `None` if the node has no such child.
    pub fn with_child(&self, index: usize, child: Expr) -> Option<Expr> {
        let mut rebuilt = self.clone();
        let slot = match &mut rebuilt {
            Self::Const(_) | Self::Column(_) | Self::Param(_) => None,
            Self::Bool { args, .. } | Self::Func { args, .. } => args.get_mut(index),
            Self::Binary { left, right, .. } => match index {
                0 => Some(&mut **left),
                1 => Some(&mut **right),
                _ => None,
            },
            Self::Cast { expr, .. } => (index == 0).then_some(&mut **expr),
            Self::SubLink(sublink) => sublink
                .test_expr
                .as_mut()
                .filter(|_| index == 0)
                .map(|test| &mut **test),
        }?;
        *slot = child;
        Some(rebuilt)
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Const(value) => write!(f, "{value}"),
            Self::Column(col) => write!(f, "{col}"),
            Self::Param(index) => write!(f, "${index}"),
            Self::Bool {
                op: BoolOp::Not,
                args,
            } => match args.as_slice() {
                [arg] => write!(f, "NOT {arg}"),
                _ => write!(f, "NOT(<{} args>)", args.len()),
            },
            Self::Bool { op, args } => {
                let parts: Vec<String> = args.iter().map(ToString::to_string).collect();
                let separator = format!(" {op} ");
                write!(f, "({})", parts.join(separator.as_str()))
            }
            Self::Binary { left, op, right } => write!(f, "{left} {op} {right}"),
            Self::Func { name, args } => {
                let parts: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{name}({})", parts.join(", "))
            }
            Self::Cast { expr, type_name } => write!(f, "CAST({expr} AS {type_name})"),
            Self::SubLink(sublink) => write!(f, "{sublink}"),
        }
    }
}
