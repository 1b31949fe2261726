//! Record words and in-place value storage
//!
//! This module is the only place where a payload's bytes are reinterpreted.
//! Inline shapes copy the value, byte for byte, over the first two words of
//! [`Words`]; the copy keeps pointer provenance because the destination is
//! untyped (`MaybeUninit`) memory. Both directions check that the value fits
//! in two words.

use core::mem::{self, MaybeUninit};
use core::ptr;

use crate::shape::WORD;

/// The three words of a record
///
/// `a` and `b` may hold the raw bytes of an inline payload, including
/// padding, so they are only read as integers when the tag in `c` says
/// they were written as integers.
#[derive(Clone, Copy)]
#[repr(C)]
pub(crate) struct Words {
    pub(crate) a: MaybeUninit<*mut ()>,
    pub(crate) b: MaybeUninit<usize>,
    pub(crate) c: usize,
}

impl Words {
    /// All-zero words: the implicit "success with zero value" record
    pub(crate) const fn zeroed() -> Self {
        Self {
            a: MaybeUninit::new(ptr::null_mut()),
            b: MaybeUninit::new(0),
            c: 0,
        }
    }

    /// Words that are integers (or a pointer) throughout
    pub(crate) const fn new(a: *mut (), b: usize, c: usize) -> Self {
        Self {
            a: MaybeUninit::new(a),
            b: MaybeUninit::new(b),
            c,
        }
    }

    /// # Safety
    ///
    /// The first word must have been written as a pointer.
    #[inline]
    pub(crate) unsafe fn a(&self) -> *mut () {
        unsafe { self.a.assume_init() }
    }

    /// # Safety
    ///
    /// The second word must have been written as an integer.
    #[inline]
    pub(crate) unsafe fn b(&self) -> usize {
        unsafe { self.b.assume_init() }
    }
}

/// Copy `value` over the first two words, with `tag` in the third
pub(crate) fn pack<T>(value: T, tag: usize) -> Words {
    assert!(
        mem::size_of::<T>() <= 2 * WORD,
        "inline payload exceeds two words"
    );
    let mut words = Words {
        a: MaybeUninit::uninit(),
        b: MaybeUninit::uninit(),
        c: tag,
    };
    // SAFETY: `Words` is `repr(C)` with `a` and `b` adjacent at offset 0, and
    // the value fits in them; the write is unaligned-tolerant.
    unsafe { ptr::write_unaligned(ptr::addr_of_mut!(words).cast::<T>(), value) };
    words
}

/// Read a value back from the first two words
///
/// # Safety
///
/// `words` must have been produced by [`pack::<T>`], and the value must not
/// be read out (and then dropped) more than once.
pub(crate) unsafe fn unpack<T>(words: &Words) -> T {
    assert!(
        mem::size_of::<T>() <= 2 * WORD,
        "inline payload exceeds two words"
    );
    unsafe { ptr::read_unaligned(ptr::addr_of!(*words).cast::<T>()) }
}
