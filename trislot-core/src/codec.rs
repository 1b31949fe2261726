//! Record codec
//!
//! Encoding dispatches on the payload type's static [`Shape`]; decoding
//! re-derives the shape from the record's own tag words and checks it
//! against the static one. The layout of every shape:
//!
//! | shape           | a                | b                     | c                  |
//! |-----------------|------------------|-----------------------|--------------------|
//! | pointer-like    | pointer          | 0                     | [`Tag::Pointer`]   |
//! | polymorphic     | data pointer     | dynamic-type tag      | [`Tag::Polymorphic`] |
//! | text            | data pointer     | length                | [`Tag::Text`]      |
//! | buffer          | data pointer     | length \| [`TAG_BIT`] | capacity           |
//! | inline scalar   | value bits (a+b) |                       | [`Tag::Scalar`]    |
//! | inline detached | value bits (a+b) |                       | [`Tag::Detached`]  |
//! | allocated       | box pointer      | 0                     | [`Tag::Allocated`] |
//! | failure         | data pointer     | 0                     | dynamic-type tag   |
//! | zero            | null             | 0                     | 0                  |
//!
//! [`TAG_BIT`]: crate::tag::TAG_BIT

use alloc::boxed::Box;
use core::any;
use core::fmt;
use core::mem::{self, ManuallyDrop};
use core::ptr::{self, NonNull};

use crate::error::{DecodeError, Result};
use crate::failure::Failure;
use crate::payload::{Parts, Payload};
use crate::raw::{self, Words};
use crate::shape::Shape;
use crate::tag::{self, Tag, TAG_BIT};

/// What a record holds, as read from its words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// A success value of the given shape
    Ok(Shape),
    /// The all-zero record: success holding the zero value
    Zero,
    /// A failure
    Err,
}

impl Variant {
    /// Whether the record is a success (including the zero record)
    pub const fn is_ok(self) -> bool {
        !matches!(self, Variant::Err)
    }
}

/// Abort on a programming error
///
/// Emits an `error` event before panicking, so the reason reaches any
/// installed subscriber even when the panic is caught.
#[cold]
#[track_caller]
pub(crate) fn fatal(operation: &str, reason: &dyn fmt::Display) -> ! {
    tracing::error!(operation, %reason, "fatal record misuse");
    panic!("{operation}: {reason}")
}

/// Read the variant from a record's words
pub(crate) fn inspect(words: &Words) -> Result<Variant> {
    if tag::is_tagged(words.c) {
        return Tag::from_word(words.c)
            .map(|tag| Variant::Ok(tag.shape()))
            .ok_or(DecodeError::UnknownTag { word: words.c });
    }

    // SAFETY: with an untagged third word, the first two words were written
    // as a pointer and an integer (buffer, failure or zero layouts).
    let (a, b) = unsafe { (words.a(), words.b()) };
    if tag::is_tagged(b) {
        return Ok(Variant::Ok(Shape::Buffer));
    }
    match (words.c, b) {
        (0, 0) if a.is_null() => Ok(Variant::Zero),
        (0, _) => Err(DecodeError::Malformed),
        (_, 0) if !a.is_null() => Ok(Variant::Err),
        _ => Err(DecodeError::Malformed),
    }
}

/// Read the variant and check a success against the payload type's shape
pub(crate) fn decode<T: Payload>(words: &Words) -> Result<Variant> {
    match inspect(words)? {
        Variant::Ok(found) if found != T::SHAPE => Err(DecodeError::ShapeMismatch {
            expected: T::SHAPE,
            found,
        }),
        variant => Ok(variant),
    }
}

/// Encode a success value
pub(crate) fn encode_ok<T: Payload>(value: T) -> Words {
    match T::SHAPE {
        Shape::InlineScalar => raw::pack(value, Tag::Scalar.word()),
        Shape::InlineDetached => raw::pack(value, Tag::Detached.word()),
        Shape::Allocated => {
            tracing::trace!(
                payload = any::type_name::<T>(),
                size = mem::size_of::<T>(),
                "boxing payload"
            );
            let boxed = Box::into_raw(Box::new(value));
            Words::new(boxed.cast(), 0, Tag::Allocated.word())
        }
        shape => encode_parts(value.into_parts(), shape),
    }
}

fn encode_parts<T>(parts: Parts<T>, shape: Shape) -> Words {
    match (parts, shape) {
        (Parts::Pointer(ptr), Shape::PointerLike) => Words::new(ptr, 0, Tag::Pointer.word()),
        (Parts::Polymorphic { tag, data }, Shape::Polymorphic) => {
            Words::new(data, tag, Tag::Polymorphic.word())
        }
        (Parts::Text { ptr, len }, Shape::Text) => Words::new(ptr, len, Tag::Text.word()),
        (Parts::Buffer { ptr, len, cap }, Shape::Buffer) => {
            if tag::is_tagged(len) || tag::is_tagged(cap) {
                fatal("encode", &format_args!("buffer of {len} elements is too long"));
            }
            Words::new(ptr, len | TAG_BIT, cap)
        }
        (parts, shape) => fatal(
            "encode",
            &format_args!("{} parts for a {shape} payload", parts.name()),
        ),
    }
}

/// Encode a failure
pub(crate) fn encode_failure(failure: Failure) -> Words {
    let type_tag = failure.type_tag();
    if tag::is_tagged(type_tag) {
        fatal("encode", &DecodeError::ReservedTypeTag { word: type_tag });
    }
    let (type_tag, data) = failure.into_raw();
    Words::new(data.as_ptr(), 0, type_tag)
}

/// # Safety
///
/// `words` must hold a success of the given non-inline, non-allocated shape.
unsafe fn parts_of<T>(words: &Words, shape: Shape) -> Parts<T> {
    unsafe {
        match shape {
            Shape::PointerLike => Parts::Pointer(words.a()),
            Shape::Polymorphic => Parts::Polymorphic {
                tag: words.b(),
                data: words.a(),
            },
            Shape::Text => Parts::Text {
                ptr: words.a(),
                len: words.b(),
            },
            Shape::Buffer => Parts::Buffer {
                ptr: words.a(),
                len: words.b() & !TAG_BIT,
                cap: words.c,
            },
            shape => fatal("decode", &format_args!("{shape} payloads have no parts")),
        }
    }
}

/// Move the success value out of the words
///
/// # Safety
///
/// `words` must hold a success of shape `shape == T::SHAPE`, and must not be
/// decoded (or dropped) again.
pub(crate) unsafe fn take<T: Payload>(words: &Words, shape: Shape) -> T {
    unsafe {
        match shape {
            Shape::InlineScalar | Shape::InlineDetached => raw::unpack(words),
            Shape::Allocated => *Box::from_raw(words.a().cast::<T>()),
            shape => T::from_parts(parts_of(words, shape)),
        }
    }
}

/// Bitwise view of the success value, leaving the words the owner
///
/// # Safety
///
/// `words` must hold a success of shape `shape == T::SHAPE`, and the view
/// must not outlive them.
pub(crate) unsafe fn peek<T: Payload>(words: &Words, shape: Shape) -> ManuallyDrop<T> {
    unsafe {
        ManuallyDrop::new(match shape {
            Shape::InlineScalar | Shape::InlineDetached => raw::unpack(words),
            Shape::Allocated => ptr::read(words.a().cast::<T>()),
            shape => T::from_parts(parts_of(words, shape)),
        })
    }
}

/// Move the failure out of the words
///
/// # Safety
///
/// `words` must hold a failure, and must not be decoded (or dropped) again.
pub(crate) unsafe fn take_failure(words: &Words) -> Failure {
    ManuallyDrop::into_inner(unsafe { peek_failure(words) })
}

/// Bitwise view of the failure, leaving the words the owner
///
/// # Safety
///
/// `words` must hold a failure, and the view must not outlive them.
pub(crate) unsafe fn peek_failure(words: &Words) -> ManuallyDrop<Failure> {
    unsafe {
        let data = NonNull::new_unchecked(words.a());
        ManuallyDrop::new(Failure::from_raw(words.c, data))
    }
}
