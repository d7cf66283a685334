//! Walk module - Copy-on-visit traversal of value trees.
//!
//! The walker visits every field and element of a tree with caller-supplied
//! condition and transform callbacks, rebuilding containers as it returns.

mod context;
mod walker;

pub use context::VisitContext;
pub use walker::{ConditionFn, TransformFn, Walker};
