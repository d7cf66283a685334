//! Value module - In-memory representation of YAML/JSON trees.
//!
//! This module provides the tagged value type the rest of the crate
//! traverses, merges, and rebuilds.

mod value;

pub use value::*;
