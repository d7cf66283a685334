//! # Treepath
//!
//! Path-addressable traversal, transformation and sequence reconciliation
//! for dynamic YAML/JSON trees.
//!
//! Trees are untyped [`value::Value`]s; behavior is driven entirely by
//! caller-supplied conditions, transforms, selector chains and identity
//! keys. Nothing here mutates its input: every operation rebuilds the tree
//! and returns the new version, so callers can hold any number of versions
//! side by side.
//!
//! ## Modules
//!
//! - [`value`] - In-memory representation of YAML/JSON trees
//! - [`walk`] - Copy-on-visit traversal with condition/transform callbacks
//! - [`ops`] - Whole-tree accessors and mutators built on the walker
//! - [`path`] - Notation chains addressing positions inside trees
//! - [`reconcile`] - Ordering, grouping and merging sequences of Mappings
//! - [`error`] - Crate-wide error type

pub mod error;
pub mod ops;
pub mod path;
pub mod reconcile;
pub mod value;
pub mod walk;

pub use error::Error;
pub use ops::{KeyedTransform, TransformSet};
pub use path::{Selector, DEFAULT_ELEMENT_KEY};
pub use reconcile::{MergeSpec, SortDirection};
pub use value::{Map, Value};
pub use walk::{VisitContext, Walker};
