//! Tag words
//!
//! Every success shape except [`Shape::Buffer`] stores one of the [`Tag`]
//! values below in the record's third word. All of them have [`TAG_BIT`] set.
//! Nothing else that can land in that word ever has it set:
//!
//! - buffer capacities are at most `isize::MAX`,
//! - dynamic-type tags are addresses of `'static` vtables, which live in the
//!   lower half of the address space (checked when a failure is encoded),
//! - the all-zero record has a zero third word.
//!
//! The buffer shape marks its *second* word (the length) with `TAG_BIT`
//! instead, since its third word holds the capacity.

use crate::shape::Shape;

/// Most significant bit of a word; set in every shape tag
pub const TAG_BIT: usize = 1 << (usize::BITS - 1);

/// Shape tag stored in the record's third word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Tag {
    /// [`Shape::PointerLike`]
    Pointer = TAG_BIT | 1,
    /// [`Shape::Polymorphic`] success
    Polymorphic = TAG_BIT | 2,
    /// [`Shape::Text`]
    Text = TAG_BIT | 3,
    /// [`Shape::InlineScalar`]
    Scalar = TAG_BIT | 4,
    /// [`Shape::InlineDetached`]
    Detached = TAG_BIT | 5,
    /// [`Shape::Allocated`]
    Allocated = TAG_BIT | 6,
}

impl Tag {
    /// Raw word value of the tag
    pub const fn word(self) -> usize {
        self as usize
    }

    /// Parse a tag word
    pub const fn from_word(word: usize) -> Option<Tag> {
        match word {
            w if w == Tag::Pointer as usize => Some(Tag::Pointer),
            w if w == Tag::Polymorphic as usize => Some(Tag::Polymorphic),
            w if w == Tag::Text as usize => Some(Tag::Text),
            w if w == Tag::Scalar as usize => Some(Tag::Scalar),
            w if w == Tag::Detached as usize => Some(Tag::Detached),
            w if w == Tag::Allocated as usize => Some(Tag::Allocated),
            _ => None,
        }
    }

    /// Tag for a shape; `None` for [`Shape::Buffer`], which is marked by the
    /// length word instead
    pub const fn for_shape(shape: Shape) -> Option<Tag> {
        match shape {
            Shape::PointerLike => Some(Tag::Pointer),
            Shape::Polymorphic => Some(Tag::Polymorphic),
            Shape::Text => Some(Tag::Text),
            Shape::InlineScalar => Some(Tag::Scalar),
            Shape::InlineDetached => Some(Tag::Detached),
            Shape::Allocated => Some(Tag::Allocated),
            Shape::Buffer => None,
        }
    }

    /// Shape announced by the tag
    pub const fn shape(self) -> Shape {
        match self {
            Tag::Pointer => Shape::PointerLike,
            Tag::Polymorphic => Shape::Polymorphic,
            Tag::Text => Shape::Text,
            Tag::Scalar => Shape::InlineScalar,
            Tag::Detached => Shape::InlineDetached,
            Tag::Allocated => Shape::Allocated,
        }
    }
}

/// Whether a word has the tag bit set
#[inline]
pub const fn is_tagged(word: usize) -> bool {
    word & TAG_BIT != 0
}
