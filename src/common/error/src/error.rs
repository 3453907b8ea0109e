//! Core error types for Fencepost.

use thiserror::Error;

/// Result type alias using `FenceError`.
pub type FenceResult<T> = std::result::Result<T, FenceError>;

/// Core error type for Fencepost operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FenceError {
    /// The planner could not produce a plan for a query.
    #[error("PlanningError: {0}")]
    PlanningError(String),

    /// A tree path or node did not have the expected shape.
    #[error("MalformedTree: {0}")]
    MalformedTree(String),

    /// Configuration could not be loaded or failed validation.
    #[error("ConfigError: {0}")]
    ConfigError(String),

    /// Invalid parameter provided.
    #[error("InvalidParameter: {0}")]
    InvalidParameter(String),

    /// Internal error (bug in Fencepost).
    #[error("InternalError: {0}")]
    InternalError(String),

    /// IO error.
    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TomlError: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl FenceError {
    /// Create a new `PlanningError`.
    pub fn planning<S: Into<String>>(msg: S) -> Self {
        Self::PlanningError(msg.into())
    }

    /// Create a new `MalformedTree` error.
    pub fn malformed_tree<S: Into<String>>(msg: S) -> Self {
        Self::MalformedTree(msg.into())
    }

    /// Create a new `ConfigError`.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a new `InvalidParameter` error.
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a new `InternalError`.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::InternalError(msg.into())
    }
}

/// Ensure a condition holds, returning an `InternalError` if not.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $variant:ident: $($msg:tt)*) => {
        if !$cond {
            return Err($crate::FenceError::$variant(format!($($msg)*)));
        }
    };
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::FenceError::InternalError($msg.to_string()));
        }
    };
}
