//! Error types and result aliases for Fencepost.
//!
//! Every crate in the workspace reports failures through [`FenceError`].

mod error;

pub use error::{FenceError, FenceResult};
