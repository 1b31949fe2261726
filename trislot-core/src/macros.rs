/// Implement [`Payload`](crate::Payload) for a composite type
///
/// The type must implement `Default`, which provides its zero value.
/// `refs` lists the word offsets at which the type holds owned references;
/// it decides between inline and boxed storage.
///
/// ```rust
/// use trislot_core::{composite, Record, Shape};
///
/// #[derive(Debug, Default, Clone, Copy, PartialEq)]
/// struct Point {
///     x: i64,
///     y: i64,
/// }
/// composite!(Point);
///
/// #[derive(Debug, Default, PartialEq)]
/// #[repr(C)]
/// struct Counted {
///     count: Option<Box<u64>>,
///     id: u64,
/// }
/// composite!(Counted, refs = [0]);
///
/// assert_eq!(Record::ok(Point { x: 1, y: 2 }).shape(), Some(Shape::InlineScalar));
/// assert_eq!(Record::<Counted>::default().shape(), Some(Shape::InlineDetached));
/// assert!(!Record::<Counted>::allocates());
/// ```
#[macro_export]
macro_rules! composite {
    ($ty:ty) => {
        $crate::composite!($ty, refs = []);
    };
    ($ty:ty, refs = [$($offset:expr),* $(,)?]) => {
        // SAFETY: the size is measured, and composites are only ever moved
        // bitwise or boxed.
        unsafe impl $crate::Payload for $ty {
            const KIND: $crate::Kind = $crate::Kind::Composite {
                size: ::core::mem::size_of::<$ty>(),
                refs: &[$($offset),*],
            };

            fn zero() -> Self {
                <$ty as ::core::default::Default>::default()
            }
        }
    };
}
