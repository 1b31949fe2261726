//! Shape classification
//!
//! A [`Shape`] is the physical layout class of a payload type. It is a
//! property of the type, never of a value, so it is computed once per type
//! by the `const fn` [`classify`] and stored in [`Payload::SHAPE`].
//!
//! [`Payload::SHAPE`]: crate::Payload::SHAPE

use core::fmt;

/// Size of a machine word in bytes
pub const WORD: usize = core::mem::size_of::<usize>();

/// Physical layout class of a payload type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A single nullable pointer (raw, owning, shared or function pointer)
    PointerLike,
    /// A dynamic-type tag paired with a data pointer
    Polymorphic,
    /// Immutable pointer + length pair
    Text,
    /// Growable pointer + length + capacity triple
    Buffer,
    /// Raw bits stored in place; no owned references
    InlineScalar,
    /// Raw bits stored in place; one owned reference in the first word
    InlineDetached,
    /// Moved into a fresh heap box
    Allocated,
}

impl Shape {
    /// Every shape, in classification priority order
    pub const ALL: [Shape; 7] = [
        Shape::PointerLike,
        Shape::Polymorphic,
        Shape::InlineScalar,
        Shape::Text,
        Shape::Buffer,
        Shape::InlineDetached,
        Shape::Allocated,
    ];

    /// Stable lowercase name of the shape
    pub const fn name(self) -> &'static str {
        match self {
            Shape::PointerLike => "pointer-like",
            Shape::Polymorphic => "polymorphic",
            Shape::Text => "text",
            Shape::Buffer => "buffer",
            Shape::InlineScalar => "inline-scalar",
            Shape::InlineDetached => "inline-detached",
            Shape::Allocated => "allocated",
        }
    }

    /// Whether values of this shape are stored without any heap allocation
    /// made by the record itself
    pub const fn is_inline(self) -> bool {
        matches!(self, Shape::InlineScalar | Shape::InlineDetached)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a payload type declares about itself
///
/// The classifier turns a `Kind` into a [`Shape`]. Only composites need any
/// layout detail: their size and the word offsets at which they hold owned
/// references (boxes, `Arc`s, references, raw pointers to owned memory).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Raw, owning, shared or function pointer that may be null
    Pointer,
    /// Dynamically typed value
    Polymorphic,
    /// Boolean, character or numeric primitive
    Scalar,
    /// Immutable pointer + length value
    Text,
    /// Growable pointer + length + capacity value
    Buffer,
    /// Any other type
    Composite {
        /// `size_of` the type in bytes
        size: usize,
        /// Word offsets of owned references, in ascending order
        refs: &'static [usize],
    },
}

/// Classify a payload kind
///
/// Priority order: pointers, polymorphic values, scalars, text, buffers,
/// then composites by size and reference layout.
pub const fn classify(kind: Kind) -> Shape {
    match kind {
        Kind::Pointer => Shape::PointerLike,
        Kind::Polymorphic => Shape::Polymorphic,
        Kind::Scalar => Shape::InlineScalar,
        Kind::Text => Shape::Text,
        Kind::Buffer => Shape::Buffer,
        Kind::Composite { size, refs } => classify_composite(size, refs),
    }
}

/// Classify a composite type from its size and reference word offsets
///
/// Only a reference in the first word can be kept inline: the first word is
/// the record's pointer-typed slot. Any other layout within two words, and
/// everything larger, is boxed.
pub const fn classify_composite(size: usize, refs: &[usize]) -> Shape {
    if size < WORD {
        return Shape::InlineScalar;
    }
    if size > 2 * WORD {
        return Shape::Allocated;
    }
    match refs.len() {
        0 => Shape::InlineScalar,
        1 if refs[0] == 0 => Shape::InlineDetached,
        _ => Shape::Allocated,
    }
}
