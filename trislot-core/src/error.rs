//! Core error types (deterministic only)

use core::fmt;

use crate::shape::Shape;

/// Reasons a record's words cannot be decoded
///
/// Every one of these is a programming error: a record built through the
/// public constructors always decodes. The decoding entry points of
/// [`Record`](crate::Record) panic with this error's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The tag word has the tag bit set but names no known shape
    UnknownTag {
        /// The offending tag word
        word: usize,
    },
    /// The words match neither a success, a failure nor the zero record
    Malformed,
    /// The record holds a success of a different shape than the payload type
    ShapeMismatch {
        /// Shape of the payload type
        expected: Shape,
        /// Shape found in the record
        found: Shape,
    },
    /// A dynamic-type tag collides with the reserved tag space
    ReservedTypeTag {
        /// The offending type tag
        word: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownTag { word } => write!(f, "unknown shape tag {word:#x}"),
            DecodeError::Malformed => write!(f, "record words match no known encoding"),
            DecodeError::ShapeMismatch { expected, found } => {
                write!(f, "expected a {expected} payload, found {found}")
            }
            DecodeError::ReservedTypeTag { word } => {
                write!(f, "dynamic type tag {word:#x} collides with shape tags")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// Result type for core operations
pub type Result<T> = core::result::Result<T, DecodeError>;
