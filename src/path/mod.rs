//! Path module - notation chains addressing positions inside trees.
//!
//! A chain like `["fields:id:3", "options", "id:a"]` addresses one
//! position; reads, writes and removals all resolve it the same way.

mod selector;
mod traverse;


pub use selector::*;
pub use traverse::*;
