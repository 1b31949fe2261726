//! Three-word success-or-error record
//!
//! This crate implements [`Record<T>`], a container that holds either a
//! value of type `T` or a [`Failure`], and always occupies exactly three
//! machine words no matter what `T` is. Payloads are stored in place whenever
//! their physical shape allows it; only payloads that cannot be laid out
//! inside the three words are moved to the heap.
//!
//! # Architecture
//!
//! - **Shape classifier** ([`shape`]): maps a payload type to a [`Shape`] at
//!   compile time, through the [`Payload`] trait's associated constants.
//! - **Record codec** ([`codec`]): packs values and failures into the record
//!   words and reads them back, re-deriving the shape from the tag words.
//! - **Payload catalogue** ([`payload`]): the [`Payload`] impls for primitives,
//!   pointers, text, buffers and the polymorphic types.
//!
//! # Example
//!
//! ```rust
//! use trislot_core::{Failure, Record};
//!
//! let ok: Record<Vec<u32>> = Record::ok(vec![1, 2, 3]);
//! assert!(ok.is_ok());
//! assert_eq!(ok.unwrap(), vec![1, 2, 3]);
//!
//! let err: Record<u64> = Record::err(core::fmt::Error);
//! assert!(err.is_err());
//! assert!(err.unwrap_err().is::<core::fmt::Error>());
//!
//! let zero: Record<&str> = Record::from_failure(None::<Failure>);
//! assert_eq!(zero.unwrap(), "");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod codec;
pub mod dynamic;
pub mod error;
pub mod failure;
mod erased;
mod macros;
pub mod payload;
mod raw;
pub mod record;
pub mod shape;
pub mod tag;

pub use codec::Variant;
pub use dynamic::Dynamic;
pub use error::{DecodeError, Result};
pub use failure::Failure;
pub use payload::{Parts, Payload};
pub use record::Record;
pub use shape::{classify, Kind, Shape, WORD};

// Only 64-bit (or wider) targets are supported.
const _: () = assert!(WORD >= 8, "trislot requires a machine word of at least 8 bytes");

const _: () = assert!(core::mem::size_of::<Record<u8>>() == 3 * WORD);
const _: () = assert!(core::mem::size_of::<Record<[u8; 64]>>() == 3 * WORD);
