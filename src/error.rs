use crate::debug::Color;
use std::fmt;

/// Heap invariant violations reported by [`crate::Arena::verify`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GcError {
    /// A header's `prev` link does not point back at its predecessor.
    BrokenLink { addr: usize },
    /// A header sits in a list whose color it does not carry.
    ColorMismatch { addr: usize, expected: Color },
    /// The black list still holds objects outside of a collection.
    BlackListNotEmpty { len: usize },
    /// Walking the lists found a different number of objects than the arena
    /// has accounted for.
    CountMismatch { counted: usize, expected: usize },
}

impl fmt::Display for GcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GcError::BrokenLink { addr } => {
                write!(f, "broken list link at {:#x}", addr)
            }
            GcError::ColorMismatch { addr, expected } => {
                write!(f, "object at {:#x} is not {}", addr, expected)
            }
            GcError::BlackListNotEmpty { len } => {
                write!(f, "black list holds {} objects outside of a collection", len)
            }
            GcError::CountMismatch { counted, expected } => {
                write!(f, "counted {} objects, expected {}", counted, expected)
            }
        }
    }
}

impl std::error::Error for GcError {}
