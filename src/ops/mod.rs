//! Ops module - whole-tree operations built on the walker.
//!
//! Accessors collect values out of a tree, mutators rebuild it, and
//! `replace_async` resolves transform futures as one batch before the
//! rebuild.

mod future;
mod mutate;
mod read;


pub use future::*;
pub use mutate::*;
pub use read::*;
