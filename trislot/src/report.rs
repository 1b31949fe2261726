//! Payload classification report (serializable DTO)

use std::any;
use std::fmt;
use std::mem;

use trislot_core::{Payload, Record, Shape};

/// How a payload type is stored in a record
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeReport {
    /// Name of the payload type
    pub type_name: String,
    /// `size_of` the payload type in bytes
    pub size: usize,
    /// Shape name, as given by [`Shape::name`]
    pub shape: String,
    /// Whether storing a value moves it into a heap box
    pub allocates: bool,
}

impl ShapeReport {
    /// Report for payload type `T`
    pub fn of<T: Payload>() -> Self {
        Self {
            type_name: any::type_name::<T>().to_string(),
            size: mem::size_of::<T>(),
            shape: T::SHAPE.name().to_string(),
            allocates: Record::<T>::allocates(),
        }
    }

    /// Parsed shape, if the name is known
    pub fn shape(&self) -> Option<Shape> {
        Shape::ALL.into_iter().find(|shape| shape.name() == self.shape)
    }

    /// Serialize to JSON
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for ShapeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} bytes): {}{}",
            self.type_name,
            self.size,
            self.shape,
            if self.allocates { ", boxed" } else { "" }
        )
    }
}

/// Report how payload type `T` is stored
pub fn describe<T: Payload>() -> ShapeReport {
    let report = ShapeReport::of::<T>();
    tracing::debug!(
        payload = %report.type_name,
        shape = %report.shape,
        allocates = report.allocates,
        "described payload"
    );
    report
}
