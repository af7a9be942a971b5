//! Error types for navigation and writes
//!
//! None of these are fatal: a request that names a field the value does not
//! have is an ordinary outcome and is handed back to the caller.

use crate::path::PathError;
use thiserror::Error;

/// Result type for the combined read/write entry points
pub type ReflectResult<T> = std::result::Result<T, ReflectError>;

/// A path that does not fit the shape of the value it is applied to
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// Name step on something that is neither a struct nor a map, or a
    /// struct without that field
    #[error("invalid field access: {0}")]
    InvalidField(String),

    /// Bracket on a list that is not a valid in-bounds index
    #[error("invalid slice index: {0}")]
    InvalidIndex(String),

    /// Key not present in a map
    #[error("invalid map key: {0}")]
    InvalidKey(String),

    /// Bracket applied to something that is neither a list nor a map
    #[error("invalid index access (not a slice or map): {0}")]
    InvalidAccess(String),
}

impl From<PathError> for NavigationError {
    fn from(e: PathError) -> Self {
        NavigationError::InvalidField(e.to_string())
    }
}

/// Rejected mutation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// Reference is absent, hidden, or was resolved read-only
    #[error("field is not settable")]
    NotSettable,

    /// Lists and maps are never replaced as a whole
    #[error("cannot set value of slice or map directly: {0}")]
    CollectionNotDirectlyWritable(String),

    /// Incoming value cannot be converted to the field's type
    #[error("cannot set field: value type {found} is not convertible to {expected}")]
    TypeMismatch { expected: String, found: String },
}

impl WriteError {
    pub(crate) fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        WriteError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Either half of the taxonomy, returned by [`crate::get_field`] and
/// [`crate::set_field`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl From<PathError> for ReflectError {
    fn from(e: PathError) -> Self {
        ReflectError::Navigation(e.into())
    }
}
