//! Dynamically typed values
//!
//! [`Dynamic`] is the polymorphic success payload: any `Debug + Send + Sync`
//! value behind a reference count, or nil. Its two words are a `'static`
//! vtable reference (the dynamic-type tag, absent for nil) and the data
//! pointer.

use alloc::sync::Arc;
use core::any::{self, Any};
use core::fmt;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};

use crate::erased;

type DynAny = dyn Any + Send + Sync + 'static;

pub(crate) struct DynamicVTable {
    as_any: fn(NonNull<()>) -> *const DynAny,
    debug: unsafe fn(NonNull<()>, &mut fmt::Formatter<'_>) -> fmt::Result,
    clone: unsafe fn(NonNull<()>),
    drop: unsafe fn(NonNull<()>),
    type_name: fn() -> &'static str,
}

struct VTableOf<V>(PhantomData<V>);

impl<V: Any + fmt::Debug + Send + Sync> VTableOf<V> {
    const VTABLE: &'static DynamicVTable = &DynamicVTable {
        as_any: as_any::<V>,
        debug: debug::<V>,
        clone: erased::arc_clone::<V>,
        drop: erased::arc_drop::<V>,
        type_name: any::type_name::<V>,
    };
}

fn as_any<V: Any + Send + Sync>(data: NonNull<()>) -> *const DynAny {
    data.as_ptr().cast_const().cast::<V>() as *const DynAny
}

unsafe fn debug<V: fmt::Debug>(data: NonNull<()>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(unsafe { erased::deref::<V>(data) }, f)
}

/// A reference-counted value of any type, or nil
pub struct Dynamic {
    vtable: Option<&'static DynamicVTable>,
    data: *mut (),
}

// SAFETY: `Dynamic::new` requires `Send + Sync` and shares through an `Arc`.
unsafe impl Send for Dynamic {}
unsafe impl Sync for Dynamic {}

impl Dynamic {
    /// Wrap a value
    pub fn new<V: Any + fmt::Debug + Send + Sync>(value: V) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an already shared value
    pub fn from_arc<V: Any + fmt::Debug + Send + Sync>(value: Arc<V>) -> Self {
        Self {
            vtable: Some(VTableOf::<V>::VTABLE),
            data: erased::into_data(value).as_ptr(),
        }
    }

    /// The nil value
    pub const fn nil() -> Self {
        Self {
            vtable: None,
            data: ptr::null_mut(),
        }
    }

    /// Whether this is the nil value
    pub fn is_nil(&self) -> bool {
        self.vtable.is_none()
    }

    fn parts(&self) -> Option<(&'static DynamicVTable, NonNull<()>)> {
        let vtable = self.vtable?;
        NonNull::new(self.data).map(|data| (vtable, data))
    }

    /// The value as `dyn Any`; `None` for nil
    pub fn as_any(&self) -> Option<&(dyn Any + Send + Sync + 'static)> {
        let (vtable, data) = self.parts()?;
        // SAFETY: the vtable matches the data, which lives as long as `self`.
        Some(unsafe { &*(vtable.as_any)(data) })
    }

    /// Borrow the value as a concrete type
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.as_any()?.downcast_ref::<V>()
    }

    /// Whether the value is of type `V`
    pub fn is<V: Any>(&self) -> bool {
        self.as_any().is_some_and(|value| value.is::<V>())
    }

    /// Name of the wrapped type; `None` for nil
    pub fn type_name(&self) -> Option<&'static str> {
        self.vtable.map(|vtable| (vtable.type_name)())
    }

    /// Whether both values share the same allocation (two nils are equal)
    pub fn ptr_eq(this: &Dynamic, other: &Dynamic) -> bool {
        this.data == other.data
    }

    /// Give up ownership as `(type tag, data pointer)`; nil is `(0, null)`
    pub(crate) fn into_raw(self) -> (usize, *mut ()) {
        let this = core::mem::ManuallyDrop::new(self);
        (this.vtable.map_or(0, erased::tag_of), this.data)
    }

    /// # Safety
    ///
    /// Both parts must come from one [`Dynamic::into_raw`] call, and be
    /// reclaimed once.
    pub(crate) unsafe fn from_raw(tag: usize, data: *mut ()) -> Self {
        if tag == 0 {
            return Self::nil();
        }
        Self {
            vtable: Some(unsafe { erased::vtable_at::<DynamicVTable>(tag) }),
            data,
        }
    }
}

impl Default for Dynamic {
    fn default() -> Self {
        Self::nil()
    }
}

impl Clone for Dynamic {
    fn clone(&self) -> Self {
        if let Some((vtable, data)) = self.parts() {
            // SAFETY: `self` holds a strong count on `data`.
            unsafe { (vtable.clone)(data) };
        }
        Self {
            vtable: self.vtable,
            data: self.data,
        }
    }
}

impl Drop for Dynamic {
    fn drop(&mut self) {
        if let Some((vtable, data)) = self.parts() {
            // SAFETY: `self` owns exactly one strong count on `data`.
            unsafe { (vtable.drop)(data) }
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parts() {
            // SAFETY: the vtable matches the data.
            Some((vtable, data)) => unsafe { (vtable.debug)(data, f) },
            None => f.write_str("nil"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;

    #[test]
    fn test_nil() {
        let nil = Dynamic::nil();
        assert!(nil.is_nil());
        assert!(nil.as_any().is_none());
        assert!(!nil.is::<i32>());
        assert_eq!(nil.type_name(), None);
        assert_eq!(format!("{nil:?}"), "nil");
        assert_eq!(nil.into_raw(), (0, ptr::null_mut()));
    }

    #[test]
    fn test_downcast() {
        let value = Dynamic::new(String::from("foo"));
        assert!(value.is::<String>());
        assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("foo"));
        assert!(value.downcast_ref::<&str>().is_none());
        assert_eq!(format!("{value:?}"), "\"foo\"");
    }

    #[test]
    fn test_clone_and_drop_counts() {
        let shared = Arc::new(7u8);
        let value = Dynamic::from_arc(Arc::clone(&shared));
        let copy = value.clone();
        assert_eq!(Arc::strong_count(&shared), 3);
        assert!(Dynamic::ptr_eq(&value, &copy));
        drop(value);
        drop(copy);
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    #[test]
    fn test_raw_round_trip() {
        let value = Dynamic::new(false);
        let (tag, data) = value.into_raw();
        assert_ne!(tag, 0);
        let back = unsafe { Dynamic::from_raw(tag, data) };
        assert_eq!(back.downcast_ref::<bool>(), Some(&false));
    }
}
