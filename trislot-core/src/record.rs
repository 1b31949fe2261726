//! The three-word record

use core::any;
use core::fmt;
use core::marker::PhantomData;
use core::mem::ManuallyDrop;

use crate::codec::{self, Variant};
use crate::error::Result;
use crate::failure::Failure;
use crate::payload::Payload;
use crate::raw::Words;
use crate::shape::Shape;

/// Either a value of type `T` or a [`Failure`], in exactly three words
///
/// A record owns its payload the way [`Result`](core::result::Result)
/// does. Borrowed payloads such as `&'a str` keep their lifetime in the
/// record's type.
///
/// The all-zero record ([`Record::default`]) is a success holding
/// [`Payload::zero`].
#[repr(C)]
pub struct Record<T: Payload> {
    words: Words,
    _marker: PhantomData<T>,
}

// SAFETY: a record owns a `T` or a `Failure`, and failures are `Send + Sync`.
unsafe impl<T: Payload + Send> Send for Record<T> {}
unsafe impl<T: Payload + Sync> Sync for Record<T> {}

impl<T: Payload> Record<T> {
    fn from_words(words: Words) -> Self {
        Self {
            words,
            _marker: PhantomData,
        }
    }

    /// A success holding `value`
    ///
    /// # Panics
    ///
    /// Buffers store their length and capacity below the top bit of a word,
    /// so a buffer with `isize::MAX + 1` or more elements panics. Only
    /// zero-sized element types can reach that length.
    #[track_caller]
    pub fn ok(value: T) -> Self {
        Self::from_words(codec::encode_ok(value))
    }

    /// A failure holding `error`
    pub fn err(error: impl Into<Failure>) -> Self {
        Self::from_words(codec::encode_failure(error.into()))
    }

    /// A failure holding `error`, or, when there is no error, a success
    /// holding the zero value
    pub fn from_failure<E: Into<Failure>>(error: Option<E>) -> Self {
        match error {
            Some(error) => Self::err(error),
            None => Self::zero(),
        }
    }

    /// A success holding `value` unless `error` is present
    ///
    /// `value` is dropped when `error` is present.
    pub fn from_pair<E: Into<Failure>>(value: T, error: Option<E>) -> Self {
        match error {
            Some(error) => Self::err(error),
            None => Self::ok(value),
        }
    }

    /// A success holding the zero value, encoded like any other success
    pub fn zero() -> Self {
        Self::ok(T::zero())
    }

    /// Whether `T` payloads are moved into a heap box
    pub const fn allocates() -> bool {
        matches!(T::SHAPE, Shape::Allocated)
    }

    /// Decode the record's variant without panicking
    pub fn validate(&self) -> Result<Variant> {
        codec::decode::<T>(&self.words)
    }

    #[track_caller]
    fn variant(&self) -> Variant {
        match self.validate() {
            Ok(variant) => variant,
            Err(error) => codec::fatal("invalid record", &error),
        }
    }

    /// Whether the record holds a value
    #[track_caller]
    pub fn is_ok(&self) -> bool {
        self.variant().is_ok()
    }

    /// Whether the record holds a failure
    #[track_caller]
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }

    /// Shape of the held value; `None` for a failure
    #[track_caller]
    pub fn shape(&self) -> Option<Shape> {
        match self.variant() {
            Variant::Ok(shape) => Some(shape),
            Variant::Zero => Some(T::SHAPE),
            Variant::Err => None,
        }
    }

    /// A shared copy of the held failure
    #[track_caller]
    pub fn failure(&self) -> Option<Failure> {
        match self.variant() {
            Variant::Err => {
                // SAFETY: the variant was just decoded; the view is cloned
                // and released before `self` can be dropped.
                let view = unsafe { codec::peek_failure(&self.words) };
                Some(Failure::clone(&view))
            }
            _ => None,
        }
    }

    fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        match self.variant() {
            Variant::Ok(shape) => {
                // SAFETY: the shape was checked against `T`; the view is
                // released before `self` can be dropped.
                let value = unsafe { codec::peek::<T>(&self.words, shape) };
                Some(f(&*value))
            }
            Variant::Zero => Some(f(&T::zero())),
            Variant::Err => None,
        }
    }

    /// Decode the record, giving up ownership of its words
    #[track_caller]
    fn into_result_inner(self) -> core::result::Result<T, Failure> {
        let variant = self.variant();
        let this = ManuallyDrop::new(self);
        // SAFETY: the variant was just decoded, and `this` is never dropped,
        // so the payload is moved out exactly once.
        unsafe {
            match variant {
                Variant::Ok(shape) => Ok(codec::take::<T>(&this.words, shape)),
                Variant::Zero => Ok(T::zero()),
                Variant::Err => Err(codec::take_failure(&this.words)),
            }
        }
    }

    /// The held value
    ///
    /// # Panics
    ///
    /// Panics if the record holds a failure.
    #[track_caller]
    pub fn unwrap(self) -> T {
        match self.into_result_inner() {
            Ok(value) => value,
            Err(failure) => codec::fatal("called `Record::unwrap()` on an `Err` value", &failure),
        }
    }

    /// The held failure
    ///
    /// # Panics
    ///
    /// Panics if the record holds a value.
    #[track_caller]
    pub fn unwrap_err(self) -> Failure {
        match self.into_result_inner() {
            Ok(_) => codec::fatal(
                "called `Record::unwrap_err()` on an `Ok` value",
                &any::type_name::<T>(),
            ),
            Err(failure) => failure,
        }
    }

    /// The held value, or `default` on failure
    pub fn unwrap_or(self, default: T) -> T {
        self.into_result_inner().unwrap_or(default)
    }

    /// The held value, or one computed from the failure
    pub fn unwrap_or_else(self, f: impl FnOnce(Failure) -> T) -> T {
        self.into_result_inner().unwrap_or_else(f)
    }

    /// The held value, or the zero value on failure
    pub fn unwrap_or_zero(self) -> T {
        self.into_result_inner().unwrap_or_else(|_| T::zero())
    }

    /// The held value and no failure, or the zero value and the failure
    pub fn into_pair(self) -> (T, Option<Failure>) {
        match self.into_result_inner() {
            Ok(value) => (value, None),
            Err(failure) => (T::zero(), Some(failure)),
        }
    }

    /// The held value and `true`, or the zero value and `false`
    pub fn into_pair_with_flag(self) -> (T, bool) {
        match self.into_result_inner() {
            Ok(value) => (value, true),
            Err(_) => (T::zero(), false),
        }
    }

    /// The held value, if any
    pub fn into_value(self) -> Option<T> {
        self.into_result_inner().ok()
    }

    /// The held failure, if any
    pub fn into_failure(self) -> Option<Failure> {
        self.into_result_inner().err()
    }

    /// Convert into a standard [`Result`](core::result::Result)
    pub fn into_result(self) -> core::result::Result<T, Failure> {
        self.into_result_inner()
    }
}

impl<T: Payload> Default for Record<T> {
    fn default() -> Self {
        Self::from_words(Words::zeroed())
    }
}

impl<T: Payload> Drop for Record<T> {
    fn drop(&mut self) {
        // SAFETY: the variant was just decoded and the words are never used
        // again. Invalid words are leaked.
        unsafe {
            match codec::decode::<T>(&self.words) {
                Ok(Variant::Ok(shape)) => drop(codec::take::<T>(&self.words, shape)),
                Ok(Variant::Err) => drop(codec::take_failure(&self.words)),
                Ok(Variant::Zero) | Err(_) => {}
            }
        }
    }
}

impl<T: Payload + Clone> Clone for Record<T> {
    fn clone(&self) -> Self {
        match self.variant() {
            Variant::Zero => Self::default(),
            Variant::Err => match self.failure() {
                Some(failure) => Self::err(failure),
                None => Self::default(),
            },
            Variant::Ok(_) => match self.with_value(T::clone) {
                Some(value) => Self::ok(value),
                None => Self::default(),
            },
        }
    }
}

impl<T: Payload, E: Into<Failure>> From<core::result::Result<T, E>> for Record<T> {
    fn from(result: core::result::Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(error) => Self::err(error),
        }
    }
}

impl<T: Payload> From<Record<T>> for core::result::Result<T, Failure> {
    fn from(record: Record<T>) -> Self {
        record.into_result()
    }
}

impl<T: Payload + fmt::Debug> fmt::Debug for Record<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.with_value(|value| f.debug_tuple("Ok").field(value).finish()) {
            Some(result) => result,
            None => match self.failure() {
                Some(failure) => f.debug_tuple("Err").field(&failure).finish(),
                None => Ok(()),
            },
        }
    }
}

impl<T: Payload + fmt::Display> fmt::Display for Record<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.with_value(|value| write!(f, "Ok({value})")) {
            Some(result) => result,
            None => match self.failure() {
                Some(failure) => write!(f, "Err({failure})"),
                None => Ok(()),
            },
        }
    }
}
