//! Shared plumbing for the type-erased values ([`Failure`], [`Dynamic`])
//!
//! Both are a `'static` vtable reference plus a data pointer obtained from
//! `Arc::into_raw`. The vtable's address doubles as the dynamic-type tag
//! stored in records.
//!
//! [`Failure`]: crate::Failure
//! [`Dynamic`]: crate::Dynamic

use alloc::sync::Arc;
use core::ptr::NonNull;

/// Dynamic-type tag of a vtable: its address
#[inline]
pub(crate) fn tag_of<V>(vtable: &'static V) -> usize {
    vtable as *const V as usize
}

/// # Safety
///
/// `tag` must come from [`tag_of::<V>`].
#[inline]
pub(crate) unsafe fn vtable_at<V>(tag: usize) -> &'static V {
    unsafe { &*(tag as *const V) }
}

/// Hand an `Arc` over to a type-erased owner
pub(crate) fn into_data<X>(value: Arc<X>) -> NonNull<()> {
    // SAFETY: `Arc::into_raw` never returns null.
    unsafe { NonNull::new_unchecked(Arc::into_raw(value).cast_mut().cast()) }
}

/// # Safety
///
/// `data` must come from [`into_data::<X>`] and still own a strong count.
pub(crate) unsafe fn arc_clone<X>(data: NonNull<()>) {
    unsafe { Arc::increment_strong_count(data.as_ptr().cast_const().cast::<X>()) }
}

/// # Safety
///
/// `data` must come from [`into_data::<X>`]; this gives up one strong count.
pub(crate) unsafe fn arc_drop<X>(data: NonNull<()>) {
    drop(unsafe { Arc::from_raw(data.as_ptr().cast_const().cast::<X>()) });
}

/// # Safety
///
/// `data` must come from [`into_data::<X>`] and outlive `'a`.
#[inline]
pub(crate) unsafe fn deref<'a, X>(data: NonNull<()>) -> &'a X {
    unsafe { data.cast::<X>().as_ref() }
}
