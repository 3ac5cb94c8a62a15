//! Owned, nested descriptions of trees.
//!
//! A [`Shape`] is a plain value: cloning one is how a sub-assembly (a leg,
//! an eye) is reused several times. [`Tree::graft`] turns it into arena nodes.

use rand::Rng;

use crate::error::LayoutResult;
use crate::tree::{Tree, check_weight};
use crate::types::{Colour, NodeId};

#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub children: Vec<Shape>,
    pub weight: f64,
    pub colour: Colour,
}

impl Default for Shape {
    fn default() -> Self {
        Self::leaf()
    }
}

impl Shape {
    pub fn leaf() -> Self {
        Self {
            children: Vec::new(),
            weight: 1.0,
            colour: Colour::default(),
        }
    }

    pub fn group(children: impl IntoIterator<Item = Shape>) -> Self {
        Self {
            children: children.into_iter().collect(),
            ..Self::leaf()
        }
    }

    /// `count` copies of `shape` under one parent.
    pub fn repeat(shape: &Shape, count: usize) -> Self {
        Self::group(std::iter::repeat_n(shape.clone(), count))
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = colour;
        self
    }

    fn check_weights(&self) -> LayoutResult<()> {
        check_weight(self.weight)?;
        self.children.iter().try_for_each(Shape::check_weights)
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Shape::node_count).sum::<usize>()
    }

    /// A random tree at most `depth` levels below the root, each inner node
    /// having between 1 and `max_children` children. Leaves appear early
    /// with probability 1/3 so branches end at uneven depths.
    pub fn random(rng: &mut impl Rng, depth: usize, max_children: usize) -> Self {
        if depth == 0 || max_children == 0 {
            return Self::leaf();
        }
        let count = rng.random_range(1..=max_children);
        let children = (0..count)
            .map(|_| {
                if rng.random_bool(1.0 / 3.0) {
                    Self::leaf()
                } else {
                    Self::random(rng, depth - 1, max_children)
                }
            })
            .collect::<Vec<_>>();
        Self::group(children)
    }
}

impl Tree {
    /// Builds `shape` into the arena bottom-up and returns its root.
    ///
    /// Every weight in `shape` is checked before the first node is added, so
    /// a rejected shape leaves the arena exactly as it was.
    ///
    /// ### Errors
    /// [`crate::LayoutError::InvalidWeight`] for the first bad weight found.
    pub fn graft(&mut self, shape: &Shape) -> LayoutResult<NodeId> {
        shape.check_weights()?;
        Ok(self.insert(shape))
    }

    fn insert(&mut self, shape: &Shape) -> NodeId {
        let children = shape
            .children
            .iter()
            .map(|child| self.insert(child))
            .collect();
        self.push(children, shape.weight, shape.colour)
    }
}
