//! Visit context threaded through every walker callback.

use crate::value::Value;

/// VisitContext describes where the walker currently stands in a tree.
///
/// Sequence elements are visited under their decimal index: the index shows
/// up in `key` and `absolute_path` but never extends `key_path`, so dotted
/// key lookups match across sequences transparently.
#[derive(Debug, Clone, Copy)]
pub struct VisitContext<'a> {
    /// Key (or decimal index, inside a Sequence) of the visited value.
    /// None when the root itself is being tested.
    pub key: Option<&'a str>,
    /// The containing Map or List value. None at the root.
    pub parent: Option<&'a Value>,
    /// Chain of named keys from the root, current key included.
    pub key_path: &'a [String],
    /// Chain of all keys from the root, sequence indices included.
    pub absolute_path: &'a [String],
    /// Depth of the containing value; entries of the root sit at 0.
    pub level: usize,
}

impl VisitContext<'_> {
    /// Dotted rendering of the absolute key chain.
    pub fn absolute_path_string(&self) -> String {
        self.absolute_path.join(".")
    }

    /// True when the named key chain ends with the given components.
    /// An empty suffix never matches.
    pub fn path_ends_with(&self, suffix: &[&str]) -> bool {
        if suffix.is_empty() || suffix.len() > self.key_path.len() {
            return false;
        }
        self.key_path[self.key_path.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(part, wanted)| part == wanted)
    }
}
