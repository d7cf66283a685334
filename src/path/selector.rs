//! Selector notation parsing.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Selector is one parsed segment of a path chain.
///
/// The notation forms are `key`, `key:value`, and `key:arrayKey:value`.
/// `key` always names the addressed field. With no `element_value` the
/// segment is a plain field descent. With an `element_value` the segment
/// addresses the element of the sequence at `key` whose field
/// `element_key` equals the value, or the element that *is* the value
/// (identity) when `element_key` is absent. Consumed against a value that
/// is already a Sequence, `key` itself is the matcher field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Selector {
    pub key: String,
    pub element_key: Option<String>,
    pub element_value: Option<String>,
}

impl Selector {
    /// Creates a plain field-descent selector.
    pub fn field(key: impl Into<String>) -> Self {
        Selector {
            key: key.into(),
            element_key: None,
            element_value: None,
        }
    }

    /// Creates a `key:value` selector (identity or in-sequence match).
    pub fn matching(key: impl Into<String>, value: impl Into<String>) -> Self {
        Selector {
            key: key.into(),
            element_key: None,
            element_value: Some(value.into()),
        }
    }

    /// Creates a `key:arrayKey:value` selector.
    pub fn element(
        key: impl Into<String>,
        element_key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Selector {
            key: key.into(),
            element_key: Some(element_key.into()),
            element_value: Some(value.into()),
        }
    }

    /// Parses one notation segment. Empty components and more than three
    /// parts are usage errors.
    pub fn parse(segment: &str) -> Result<Selector, Error> {
        let parts: Vec<&str> = segment.split(':').collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(Error::malformed_selector(segment));
        }
        match parts.as_slice() {
            [key] => Ok(Selector::field(*key)),
            [key, value] => Ok(Selector::matching(*key, *value)),
            [key, element_key, value] => Ok(Selector::element(*key, *element_key, *value)),
            _ => Err(Error::malformed_selector(segment)),
        }
    }

    /// True when the segment is a plain field descent.
    pub fn is_field(&self) -> bool {
        self.element_value.is_none()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.element_key, &self.element_value) {
            (Some(element_key), Some(value)) => {
                write!(f, "{}:{}:{}", self.key, element_key, value)
            }
            (None, Some(value)) => write!(f, "{}:{}", self.key, value),
            _ => write!(f, "{}", self.key),
        }
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

/// Parses a whole chain of notation segments. An empty chain is a usage
/// error.
pub fn parse_chain(segments: &[&str]) -> Result<Vec<Selector>, Error> {
    if segments.is_empty() {
        return Err(Error::EmptySelectorChain);
    }
    segments.iter().map(|s| Selector::parse(s)).collect()
}

/// True iff the chain is non-empty and every segment is a plain field
/// descent, which lets writes take the nested-set fast path.
pub fn is_field_chain(chain: &[Selector]) -> bool {
    !chain.is_empty() && chain.iter().all(Selector::is_field)
}
