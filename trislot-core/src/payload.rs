//! Payload types
//!
//! [`Payload`] is how a type tells the codec its [`Kind`] (and therefore its
//! [`Shape`]), its zero value, and, for the pointer-carrying shapes, how to
//! split itself into raw [`Parts`] and rebuild itself from them.
//!
//! Inline and allocated shapes need nothing beyond `KIND` and `zero`: the
//! codec moves such values as opaque bytes or boxes them.

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet, BinaryHeap, LinkedList, VecDeque};
use alloc::rc::Rc;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem::{self, ManuallyDrop};
use core::ptr::{self, NonNull};
use core::time::Duration;
use core::{array, slice, str};
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

use crate::codec;
use crate::dynamic::Dynamic;
use crate::failure::Failure;
use crate::shape::{classify, Kind, Shape};

/// A payload split into raw words
///
/// The variant must agree with the payload's shape: `Pointer` for
/// [`Shape::PointerLike`], `Polymorphic` for [`Shape::Polymorphic`], and so
/// on. Inline and allocated payloads stay `Opaque`.
#[derive(Debug)]
pub enum Parts<T> {
    /// A single, possibly null, pointer
    Pointer(*mut ()),
    /// Dynamic-type tag (0 for nil) and data pointer
    Polymorphic {
        /// Dynamic-type tag; never has the tag bit set
        tag: usize,
        /// Data pointer
        data: *mut (),
    },
    /// Pointer and length of immutable data
    Text {
        /// Data pointer
        ptr: *mut (),
        /// Length in elements
        len: usize,
    },
    /// Pointer, length and capacity of a growable buffer
    Buffer {
        /// Data pointer
        ptr: *mut (),
        /// Length in elements
        len: usize,
        /// Capacity in elements
        cap: usize,
    },
    /// The value itself, for shapes the codec stores without help
    Opaque(T),
}

impl<T> Parts<T> {
    /// Name of the variant
    pub fn name(&self) -> &'static str {
        match self {
            Parts::Pointer(_) => "pointer",
            Parts::Polymorphic { .. } => "polymorphic",
            Parts::Text { .. } => "text",
            Parts::Buffer { .. } => "buffer",
            Parts::Opaque(_) => "opaque",
        }
    }
}

/// A type that can be stored in a [`Record`](crate::Record)
///
/// # Safety
///
/// - `KIND` must describe the type truthfully; in particular a
///   [`Kind::Composite`] size must equal `size_of::<Self>()`.
/// - For the pointer, polymorphic, text and buffer kinds, `into_parts` must
///   return the matching [`Parts`] variant, and `from_parts` must rebuild the
///   exact value (taking back ownership of whatever `into_parts` gave up).
/// - Polymorphic tags must be 0 or the address of a `'static` item.
pub unsafe trait Payload: Sized {
    /// What the type declares about its layout
    const KIND: Kind;

    /// Physical shape, derived from [`Payload::KIND`]
    const SHAPE: Shape = classify(Self::KIND);

    /// The value an all-zero record decodes to
    fn zero() -> Self;

    /// Split the value into raw parts, giving up ownership
    fn into_parts(self) -> Parts<Self> {
        Parts::Opaque(self)
    }

    /// Rebuild a value from the parts [`Payload::into_parts`] produced
    ///
    /// # Safety
    ///
    /// `parts` must come from `into_parts` on a value of this type that has
    /// not been rebuilt since, unless the result is never dropped.
    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Opaque(value) => value,
            other => unexpected(other, Self::SHAPE),
        }
    }
}

#[cold]
fn unexpected<T>(parts: Parts<T>, shape: Shape) -> ! {
    codec::fatal(
        "decode",
        &format_args!("{} parts for a {shape} payload", parts.name()),
    )
}

macro_rules! scalar_payload {
    ($($ty:ty),* $(,)?) => {
        $(
            unsafe impl Payload for $ty {
                const KIND: Kind = Kind::Scalar;

                fn zero() -> Self {
                    <$ty>::default()
                }
            }

            unsafe impl Payload for Option<$ty> {
                const KIND: Kind = Kind::Composite {
                    size: mem::size_of::<Self>(),
                    refs: &[],
                };

                fn zero() -> Self {
                    None
                }
            }
        )*
    };
}

scalar_payload!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
);

// Structural payloads

/// Reference layout of a composite whose members are known only by shape
///
/// Members that are not inline scalars may hold references in any word, so
/// the composite is declared with references in both, which boxes it once
/// it reaches a word.
const fn member_refs(all_scalar: bool) -> &'static [usize] {
    if all_scalar {
        &[]
    } else {
        &[0, 1]
    }
}

const fn is_scalar<T: Payload>() -> bool {
    matches!(T::SHAPE, Shape::InlineScalar)
}

unsafe impl<T: Payload, const N: usize> Payload for [T; N] {
    const KIND: Kind = Kind::Composite {
        size: mem::size_of::<Self>(),
        refs: member_refs(is_scalar::<T>()),
    };

    fn zero() -> Self {
        array::from_fn(|_| T::zero())
    }
}

macro_rules! tuple_payload {
    ($($name:ident),+) => {
        unsafe impl<$($name: Payload),+> Payload for ($($name,)+) {
            const KIND: Kind = Kind::Composite {
                size: mem::size_of::<Self>(),
                refs: member_refs(true $(&& is_scalar::<$name>())+),
            };

            fn zero() -> Self {
                ($(<$name as Payload>::zero(),)+)
            }
        }
    };
}

tuple_payload!(A);
tuple_payload!(A, B);
tuple_payload!(A, B, C);
tuple_payload!(A, B, C, D);
tuple_payload!(A, B, C, D, E);
tuple_payload!(A, B, C, D, E, F);

unsafe impl Payload for Duration {
    const KIND: Kind = Kind::Composite {
        size: mem::size_of::<Self>(),
        refs: &[],
    };

    fn zero() -> Self {
        Duration::ZERO
    }
}

// Collections own heap memory through several words and are always boxed
macro_rules! collection_payload {
    ($(impl<$($param:ident $(: $bound:ident)?),+> for $ty:ty;)+) => {
        $(
            unsafe impl<$($param $(: $bound)?),+> Payload for $ty {
                const KIND: Kind = Kind::Composite {
                    size: mem::size_of::<Self>(),
                    refs: &[0, 1],
                };

                fn zero() -> Self {
                    <$ty>::default()
                }
            }
        )+
    };
}

collection_payload! {
    impl<K, V> for BTreeMap<K, V>;
    impl<T> for BTreeSet<T>;
    impl<T: Ord> for BinaryHeap<T>;
    impl<T> for LinkedList<T>;
    impl<T> for VecDeque<T>;
}

#[cfg(feature = "std")]
collection_payload! {
    impl<K, V, S: Default> for HashMap<K, V, S>;
    impl<T, S: Default> for HashSet<T, S>;
}

// Pointer-like payloads

unsafe impl<T> Payload for *const T {
    const KIND: Kind = Kind::Pointer;

    fn zero() -> Self {
        ptr::null()
    }

    fn into_parts(self) -> Parts<Self> {
        Parts::Pointer(self.cast_mut().cast())
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Pointer(ptr) => ptr.cast_const().cast(),
            other => unexpected(other, Self::SHAPE),
        }
    }
}

unsafe impl<T> Payload for *mut T {
    const KIND: Kind = Kind::Pointer;

    fn zero() -> Self {
        ptr::null_mut()
    }

    fn into_parts(self) -> Parts<Self> {
        Parts::Pointer(self.cast())
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Pointer(ptr) => ptr.cast(),
            other => unexpected(other, Self::SHAPE),
        }
    }
}

unsafe impl<T> Payload for Option<NonNull<T>> {
    const KIND: Kind = Kind::Pointer;

    fn zero() -> Self {
        None
    }

    fn into_parts(self) -> Parts<Self> {
        Parts::Pointer(self.map_or(ptr::null_mut(), |ptr| ptr.as_ptr().cast()))
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Pointer(ptr) => NonNull::new(ptr.cast()),
            other => unexpected(other, Self::SHAPE),
        }
    }
}

unsafe impl<'a, T> Payload for Option<&'a T> {
    const KIND: Kind = Kind::Pointer;

    fn zero() -> Self {
        None
    }

    fn into_parts(self) -> Parts<Self> {
        Parts::Pointer(self.map_or(ptr::null_mut(), |value| {
            (value as *const T).cast_mut().cast()
        }))
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Pointer(ptr) => unsafe { ptr.cast_const().cast::<T>().as_ref() },
            other => unexpected(other, Self::SHAPE),
        }
    }
}

unsafe impl<'a, T> Payload for Option<&'a mut T> {
    const KIND: Kind = Kind::Pointer;

    fn zero() -> Self {
        None
    }

    fn into_parts(self) -> Parts<Self> {
        Parts::Pointer(self.map_or(ptr::null_mut(), |value| (value as *mut T).cast()))
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Pointer(ptr) => unsafe { ptr.cast::<T>().as_mut() },
            other => unexpected(other, Self::SHAPE),
        }
    }
}

unsafe impl<T> Payload for Option<Box<T>> {
    const KIND: Kind = Kind::Pointer;

    fn zero() -> Self {
        None
    }

    fn into_parts(self) -> Parts<Self> {
        Parts::Pointer(self.map_or(ptr::null_mut(), |value| Box::into_raw(value).cast()))
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Pointer(ptr) => {
                NonNull::new(ptr.cast::<T>()).map(|ptr| unsafe { Box::from_raw(ptr.as_ptr()) })
            }
            other => unexpected(other, Self::SHAPE),
        }
    }
}

unsafe impl<T> Payload for Option<Arc<T>> {
    const KIND: Kind = Kind::Pointer;

    fn zero() -> Self {
        None
    }

    fn into_parts(self) -> Parts<Self> {
        Parts::Pointer(self.map_or(ptr::null_mut(), |value| {
            Arc::into_raw(value).cast_mut().cast()
        }))
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Pointer(ptr) => NonNull::new(ptr.cast::<T>())
                .map(|ptr| unsafe { Arc::from_raw(ptr.as_ptr().cast_const()) }),
            other => unexpected(other, Self::SHAPE),
        }
    }
}

unsafe impl<T> Payload for Option<Rc<T>> {
    const KIND: Kind = Kind::Pointer;

    fn zero() -> Self {
        None
    }

    fn into_parts(self) -> Parts<Self> {
        Parts::Pointer(self.map_or(ptr::null_mut(), |value| {
            Rc::into_raw(value).cast_mut().cast()
        }))
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Pointer(ptr) => NonNull::new(ptr.cast::<T>())
                .map(|ptr| unsafe { Rc::from_raw(ptr.as_ptr().cast_const()) }),
            other => unexpected(other, Self::SHAPE),
        }
    }
}

macro_rules! fn_pointer_payload {
    ($($arg:ident),*) => {
        unsafe impl<R, $($arg),*> Payload for Option<fn($($arg),*) -> R> {
            const KIND: Kind = Kind::Pointer;

            fn zero() -> Self {
                None
            }

            fn into_parts(self) -> Parts<Self> {
                Parts::Pointer(self.map_or(ptr::null_mut(), |f| f as *const () as *mut ()))
            }

            unsafe fn from_parts(parts: Parts<Self>) -> Self {
                match parts {
                    Parts::Pointer(ptr) if ptr.is_null() => None,
                    // SAFETY: the pointer was produced from a function of
                    // exactly this signature.
                    Parts::Pointer(ptr) => {
                        Some(unsafe { mem::transmute_copy::<*mut (), fn($($arg),*) -> R>(&ptr) })
                    }
                    other => unexpected(other, Self::SHAPE),
                }
            }
        }
    };
}

fn_pointer_payload!();
fn_pointer_payload!(A);
fn_pointer_payload!(A, B);
fn_pointer_payload!(A, B, C);

// Polymorphic payloads

unsafe impl Payload for Dynamic {
    const KIND: Kind = Kind::Polymorphic;

    fn zero() -> Self {
        Dynamic::nil()
    }

    fn into_parts(self) -> Parts<Self> {
        let (tag, data) = self.into_raw();
        Parts::Polymorphic { tag, data }
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Polymorphic { tag, data } => unsafe { Dynamic::from_raw(tag, data) },
            other => unexpected(other, Self::SHAPE),
        }
    }
}

unsafe impl Payload for Option<Failure> {
    const KIND: Kind = Kind::Polymorphic;

    fn zero() -> Self {
        None
    }

    fn into_parts(self) -> Parts<Self> {
        match self {
            Some(failure) => {
                let (tag, data) = failure.into_raw();
                Parts::Polymorphic {
                    tag,
                    data: data.as_ptr(),
                }
            }
            None => Parts::Polymorphic {
                tag: 0,
                data: ptr::null_mut(),
            },
        }
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Polymorphic { tag: 0, .. } => None,
            Parts::Polymorphic { tag, data } => {
                NonNull::new(data).map(|data| unsafe { Failure::from_raw(tag, data) })
            }
            other => unexpected(other, Self::SHAPE),
        }
    }
}

// Text payloads

unsafe impl<'a> Payload for &'a str {
    const KIND: Kind = Kind::Text;

    fn zero() -> Self {
        ""
    }

    fn into_parts(self) -> Parts<Self> {
        Parts::Text {
            ptr: self.as_ptr().cast_mut().cast(),
            len: self.len(),
        }
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Text { ptr, len } => unsafe {
                str::from_utf8_unchecked(slice::from_raw_parts(ptr.cast_const().cast::<u8>(), len))
            },
            other => unexpected(other, Self::SHAPE),
        }
    }
}

unsafe impl<'a, T> Payload for &'a [T] {
    const KIND: Kind = Kind::Text;

    fn zero() -> Self {
        &[]
    }

    fn into_parts(self) -> Parts<Self> {
        Parts::Text {
            ptr: self.as_ptr().cast_mut().cast(),
            len: self.len(),
        }
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Text { ptr, len } => unsafe {
                slice::from_raw_parts(ptr.cast_const().cast::<T>(), len)
            },
            other => unexpected(other, Self::SHAPE),
        }
    }
}

unsafe impl Payload for Box<str> {
    const KIND: Kind = Kind::Text;

    fn zero() -> Self {
        Box::default()
    }

    fn into_parts(self) -> Parts<Self> {
        let len = self.len();
        Parts::Text {
            ptr: Box::into_raw(self).cast::<u8>().cast(),
            len,
        }
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Text { ptr, len } => unsafe {
                Box::from_raw(ptr::slice_from_raw_parts_mut(ptr.cast::<u8>(), len) as *mut str)
            },
            other => unexpected(other, Self::SHAPE),
        }
    }
}

unsafe impl<T> Payload for Box<[T]> {
    const KIND: Kind = Kind::Text;

    fn zero() -> Self {
        Box::default()
    }

    fn into_parts(self) -> Parts<Self> {
        let len = self.len();
        Parts::Text {
            ptr: Box::into_raw(self).cast::<T>().cast(),
            len,
        }
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Text { ptr, len } => unsafe {
                Box::from_raw(ptr::slice_from_raw_parts_mut(ptr.cast::<T>(), len))
            },
            other => unexpected(other, Self::SHAPE),
        }
    }
}

// Buffer payloads

unsafe impl<T> Payload for Vec<T> {
    const KIND: Kind = Kind::Buffer;

    fn zero() -> Self {
        Vec::new()
    }

    fn into_parts(self) -> Parts<Self> {
        let mut buffer = ManuallyDrop::new(self);
        // Zero-sized elements report `usize::MAX`, which has the tag bit set.
        // Store 0 and restore it when decoding.
        let cap = if mem::size_of::<T>() == 0 {
            0
        } else {
            buffer.capacity()
        };
        Parts::Buffer {
            ptr: buffer.as_mut_ptr().cast(),
            len: buffer.len(),
            cap,
        }
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Buffer { ptr, len, cap } => {
                let cap = if mem::size_of::<T>() == 0 {
                    usize::MAX
                } else {
                    cap
                };
                unsafe { Vec::from_raw_parts(ptr.cast::<T>(), len, cap) }
            }
            other => unexpected(other, Self::SHAPE),
        }
    }
}

unsafe impl Payload for String {
    const KIND: Kind = Kind::Buffer;

    fn zero() -> Self {
        String::new()
    }

    fn into_parts(self) -> Parts<Self> {
        match Payload::into_parts(self.into_bytes()) {
            Parts::Buffer { ptr, len, cap } => Parts::Buffer { ptr, len, cap },
            other => unexpected(other, Self::SHAPE),
        }
    }

    unsafe fn from_parts(parts: Parts<Self>) -> Self {
        match parts {
            Parts::Buffer { ptr, len, cap } => unsafe {
                String::from_raw_parts(ptr.cast::<u8>(), len, cap)
            },
            other => unexpected(other, Self::SHAPE),
        }
    }
}
