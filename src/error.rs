//! Usage errors raised by the public API.

use thiserror::Error;

/// Error represents a misuse of the API detected at the call boundary.
///
/// Absence of a key, path, or matching element is never an error; reads
/// report it as `None`/empty results and writes create the missing
/// containers instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("selector chain must not be empty")]
    EmptySelectorChain,

    #[error("malformed selector segment {segment:?}: expected `key`, `key:value`, or `key:arrayKey:value`")]
    MalformedSelector { segment: String },

    #[error("{operation}: identity keys must not be empty")]
    MissingIdentityKeys { operation: String },

    #[error("group_by: group keys must not be empty")]
    MissingGroupKeys,
}

impl Error {
    /// Creates a malformed selector error.
    pub fn malformed_selector(segment: impl Into<String>) -> Self {
        Error::MalformedSelector {
            segment: segment.into(),
        }
    }

    /// Creates a missing identity keys error for the named operation.
    pub fn missing_identity_keys(operation: impl Into<String>) -> Self {
        Error::MissingIdentityKeys {
            operation: operation.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::EmptySelectorChain.to_string(),
            "selector chain must not be empty"
        );
        assert_eq!(
            Error::malformed_selector("a:b:c:d").to_string(),
            "malformed selector segment \"a:b:c:d\": expected `key`, `key:value`, or `key:arrayKey:value`"
        );
        assert_eq!(
            Error::missing_identity_keys("merge_by_keys").to_string(),
            "merge_by_keys: identity keys must not be empty"
        );
    }
}
