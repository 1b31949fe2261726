//! Type-erased failures
//!
//! A [`Failure`] is what an `Err` record carries. It is two words: a
//! `'static` vtable for the concrete error type (its address is the
//! dynamic-type tag) and a pointer to the reference-counted error value.
//! Cloning a failure shares the error; identity survives any number of
//! round trips through records and can be checked with [`Failure::ptr_eq`].

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any;
use core::error::Error;
use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;
use core::ptr::NonNull;

use crate::erased;

type DynError = dyn Error + Send + Sync + 'static;
type BoxedError = Box<DynError>;

pub(crate) struct FailureVTable {
    as_error: fn(NonNull<()>) -> *const DynError,
    clone: unsafe fn(NonNull<()>),
    drop: unsafe fn(NonNull<()>),
    type_name: fn() -> &'static str,
}

struct VTableOf<E>(PhantomData<E>);

impl<E: Error + Send + Sync + 'static> VTableOf<E> {
    const VTABLE: &'static FailureVTable = &FailureVTable {
        as_error: as_error::<E>,
        clone: erased::arc_clone::<E>,
        drop: erased::arc_drop::<E>,
        type_name: any::type_name::<E>,
    };
}

fn as_error<E: Error + Send + Sync + 'static>(data: NonNull<()>) -> *const DynError {
    data.as_ptr().cast_const().cast::<E>() as *const DynError
}

static BOXED_VTABLE: FailureVTable = FailureVTable {
    as_error: boxed_as_error,
    clone: erased::arc_clone::<BoxedError>,
    drop: erased::arc_drop::<BoxedError>,
    type_name: any::type_name::<BoxedError>,
};

fn boxed_as_error(data: NonNull<()>) -> *const DynError {
    // SAFETY: only reachable through `BOXED_VTABLE`, whose data is an
    // `Arc<BoxedError>` kept alive by the calling `Failure`.
    let boxed: &BoxedError = unsafe { erased::deref(data) };
    &**boxed as *const DynError
}

/// A type-erased, reference-counted error
pub struct Failure {
    vtable: &'static FailureVTable,
    data: NonNull<()>,
}

// SAFETY: every constructor requires the error to be `Send + Sync`, and the
// value is shared through an `Arc`.
unsafe impl Send for Failure {}
unsafe impl Sync for Failure {}

impl Failure {
    /// Wrap an error value
    pub fn new<E: Error + Send + Sync + 'static>(error: E) -> Self {
        Self::from_arc(Arc::new(error))
    }

    /// Wrap an already shared error value without copying it
    pub fn from_arc<E: Error + Send + Sync + 'static>(error: Arc<E>) -> Self {
        Self {
            vtable: VTableOf::<E>::VTABLE,
            data: erased::into_data(error),
        }
    }

    /// Wrap a boxed error; downcasting still reaches the boxed type
    pub fn from_boxed(error: BoxedError) -> Self {
        Self {
            vtable: &BOXED_VTABLE,
            data: erased::into_data(Arc::new(error)),
        }
    }

    /// The error as a trait object
    pub fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        // SAFETY: the vtable matches the data, which lives as long as `self`.
        unsafe { &*(self.vtable.as_error)(self.data) }
    }

    /// Borrow the error as a concrete type
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.as_error().downcast_ref::<E>()
    }

    /// Whether the error is of type `E`
    pub fn is<E: Error + 'static>(&self) -> bool {
        self.as_error().is::<E>()
    }

    /// Name of the wrapped type, for diagnostics
    pub fn type_name(&self) -> &'static str {
        (self.vtable.type_name)()
    }

    /// The dynamic-type tag stored in records
    pub fn type_tag(&self) -> usize {
        erased::tag_of(self.vtable)
    }

    /// Whether both failures share the same error value
    pub fn ptr_eq(this: &Failure, other: &Failure) -> bool {
        this.data == other.data
    }

    /// Give up ownership as `(type tag, data pointer)`
    pub(crate) fn into_raw(self) -> (usize, NonNull<()>) {
        let this = core::mem::ManuallyDrop::new(self);
        (erased::tag_of(this.vtable), this.data)
    }

    /// # Safety
    ///
    /// Both parts must come from one [`Failure::into_raw`] call, and be
    /// reclaimed once.
    pub(crate) unsafe fn from_raw(tag: usize, data: NonNull<()>) -> Self {
        Self {
            vtable: unsafe { erased::vtable_at::<FailureVTable>(tag) },
            data,
        }
    }
}

impl Clone for Failure {
    fn clone(&self) -> Self {
        // SAFETY: `self` holds a strong count on `data`.
        unsafe { (self.vtable.clone)(self.data) };
        Self {
            vtable: self.vtable,
            data: self.data,
        }
    }
}

impl Drop for Failure {
    fn drop(&mut self) {
        // SAFETY: `self` owns exactly one strong count on `data`.
        unsafe { (self.vtable.drop)(self.data) }
    }
}

impl Deref for Failure {
    type Target = dyn Error + Send + Sync + 'static;

    fn deref(&self) -> &Self::Target {
        self.as_error()
    }
}

impl AsRef<dyn Error + Send + Sync + 'static> for Failure {
    fn as_ref(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.as_error()
    }
}

impl<E: Error + Send + Sync + 'static> From<E> for Failure {
    fn from(error: E) -> Self {
        Failure::new(error)
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_error(), f)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_error(), f)
    }
}
