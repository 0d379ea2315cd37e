use std::fmt;

/// The color of an object as seen from outside a collection.
///
/// Outside of [`crate::Arena::collect`] every object is white; black only
/// shows up for objects proven reachable while a collection is running.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Color {
    White,
    Black,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// One line of an arena dump.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ObjectInfo {
    pub addr: usize,
    pub type_name: &'static str,
    pub size: usize,
    pub color: Color,
}

impl fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#x} {} ({}, {} bytes)",
            self.addr, self.color, self.type_name, self.size
        )
    }
}
