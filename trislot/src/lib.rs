//! Public API for the trislot three-word result record
//!
//! This crate re-exports the core [`Record`] type and adds the pieces that
//! need `std`: message failures, context, and payload classification
//! reports.
//!
//! ```rust
//! use trislot::prelude::*;
//!
//! fn parse(input: &str) -> Record<u16> {
//!     input.parse::<u16>().into()
//! }
//!
//! assert_eq!(parse("8080").unwrap(), 8080);
//! let failed = parse("http").context("reading port");
//! assert!(failed.is_err());
//! assert!(failed.unwrap_err().to_string().starts_with("reading port: "));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod report;

// Re-export key types
pub use error::{msg, Cause, Context, Error, Result};
pub use report::{describe, ShapeReport};
pub use trislot_core::{
    classify, composite, DecodeError, Dynamic, Failure, Kind, Parts, Payload, Record, Shape,
    Variant, WORD,
};

/// Commonly used items
pub mod prelude {
    pub use crate::error::Context;
    pub use crate::{failure, msg};
    pub use trislot_core::{composite, Dynamic, Failure, Payload, Record};
}

// Convenience functions

/// A success holding `value`
pub fn ok<T: Payload>(value: T) -> Record<T> {
    Record::ok(value)
}

/// A failure holding `error`
pub fn err<T: Payload>(error: impl Into<Failure>) -> Record<T> {
    Record::err(error)
}

/// A failure when `error` is present, otherwise a success holding `value`
pub fn make<T: Payload, E: Into<Failure>>(value: T, error: Option<E>) -> Record<T> {
    Record::from_pair(value, error)
}
