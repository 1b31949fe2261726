//! API error types

use std::fmt;

use thiserror::Error;
use trislot_core::{DecodeError, Failure, Payload, Record};

/// API-level errors
#[derive(Error, Debug)]
pub enum Error {
    /// A record's words could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Plain message
    #[error("{0}")]
    Message(String),

    /// A failure with added context
    #[error("{context}: {source}")]
    Context {
        /// What was being done
        context: String,
        /// The wrapped failure
        source: Cause,
    },

    /// Serialization error
    #[cfg(feature = "serde")]
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A wrapped [`Failure`] kept as an error source
///
/// Displays as the failure and continues the `source()` chain from it.
#[derive(Clone)]
pub struct Cause(Failure);

impl Cause {
    /// The wrapped failure
    pub fn failure(&self) -> &Failure {
        &self.0
    }

    /// Unwrap into the failure
    pub fn into_failure(self) -> Failure {
        self.0
    }
}

impl From<Failure> for Cause {
    fn from(failure: Failure) -> Self {
        Self(failure)
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Cause {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.as_error().source()
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, Error>;

/// A failure carrying just a message
pub fn msg(message: impl Into<String>) -> Failure {
    Failure::new(Error::Message(message.into()))
}

/// Build a [`Failure`] from a format string
///
/// ```rust
/// use trislot::{failure, Record};
///
/// let record: Record<u32> = Record::err(failure!("missing key {}", "id"));
/// assert_eq!(record.unwrap_err().to_string(), "missing key id");
/// ```
#[macro_export]
macro_rules! failure {
    ($($arg:tt)*) => {
        $crate::msg(::std::format!($($arg)*))
    };
}

/// Attach context to the failure held by a record
pub trait Context<T: Payload> {
    /// Wrap a held failure in [`Error::Context`]; successes pass through
    fn context<C: fmt::Display>(self, context: C) -> Record<T>;

    /// Like [`Context::context`], computing the context only on failure
    fn with_context<C: fmt::Display, F: FnOnce() -> C>(self, f: F) -> Record<T>;
}

impl<T: Payload> Context<T> for Record<T> {
    fn context<C: fmt::Display>(self, context: C) -> Record<T> {
        self.with_context(|| context)
    }

    fn with_context<C: fmt::Display, F: FnOnce() -> C>(self, f: F) -> Record<T> {
        match self.into_result() {
            Ok(value) => Record::ok(value),
            Err(failure) => Record::err(Error::Context {
                context: f().to_string(),
                source: Cause(failure),
            }),
        }
    }
}
