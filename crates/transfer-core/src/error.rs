//! Codec error types shared by the BSON and JSON conversion crates.
//!
//! Conversions never fall back to a default value: every value without a
//! defined mapping is reported together with the path where it was found.

use crate::path::{FieldPath, PathSegment};
use thiserror::Error;

/// Errors raised while converting a single value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Native value with no portable representation.
    #[error("BSON {bson_type} has no portable representation")]
    UnsupportedType { bson_type: &'static str },

    /// `$oid` or `$date` marker whose payload does not parse.
    #[error("Malformed {marker} marker payload '{payload}': {reason}")]
    MalformedMarker {
        marker: &'static str,
        payload: String,
        reason: String,
    },

    /// A value of the wrong JSON kind where a document was required.
    #[error("Expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },
}

/// A [`CodecError`] together with the location of the offending value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{cause} (at field '{path}')")]
pub struct FieldError {
    pub path: FieldPath,
    pub cause: CodecError,
}

impl FieldError {
    /// Error located at the value currently being converted.
    pub fn here(cause: CodecError) -> Self {
        Self {
            path: FieldPath::new(),
            cause,
        }
    }

    /// Add the enclosing field name while unwinding.
    pub fn in_field(self, key: &str) -> Self {
        Self {
            path: self.path.prepend(PathSegment::Key(key.to_string())),
            cause: self.cause,
        }
    }

    /// Add the enclosing array position while unwinding.
    pub fn in_element(self, index: usize) -> Self {
        Self {
            path: self.path.prepend(PathSegment::Index(index)),
            cause: self.cause,
        }
    }
}

impl From<CodecError> for FieldError {
    fn from(cause: CodecError) -> Self {
        Self::here(cause)
    }
}

pub type Result<T> = std::result::Result<T, FieldError>;
