//! Reconcile module - ordering, grouping and merging sequences of Mappings.
//!
//! Everything operates on identity keys: fields (or dotted paths) whose
//! values make two elements "the same" across two versions of a sequence.

mod group;
mod merge;
mod sort;


pub use group::*;
pub use merge::*;
pub use sort::*;
