use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Identifier for a node in a [`crate::tree::Tree`].
///
/// This is an index into the tree's arena, and is only meaningful within
/// the lifetime of a given `Tree` instance.
pub type NodeId = usize;

/// An RGB colour used when a node's boundary is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const WHITE: Colour = Colour::new(255, 255, 255);
    pub const BLACK: Colour = Colour::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Colour {
    fn default() -> Self {
        Colour::WHITE
    }
}

/// A circular region: where a node sits and how much room it has.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    pub const fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }
}
