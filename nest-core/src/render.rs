//! What a drawing backend has to provide, and how a spread tree maps onto it.
//!
//! The core never touches pixels. A backend implements [`Canvas`]; the
//! orchestrator polls a [`StopSignal`] between steps when it drives a live
//! loop.

use glam::DVec2;

use crate::error::LayoutResult;
use crate::partition::partition_points;
use crate::tree::{Node, Tree};
use crate::types::{Circle, Colour, NodeId};

pub trait Canvas {
    fn clear(&mut self, colour: Colour);
    fn circle(&mut self, center: DVec2, radius: f64, colour: Colour);
    /// Closed outline through `corners`.
    fn polygon(&mut self, corners: &[DVec2], colour: Colour);
    fn present(&mut self);
}

/// External "please stop" request, checked once per iteration.
pub trait StopSignal {
    fn stop_requested(&mut self) -> bool;
}

impl<F: FnMut() -> bool> StopSignal for F {
    fn stop_requested(&mut self) -> bool {
        self()
    }
}

/// A signal that never fires.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverStop;

impl StopSignal for NeverStop {
    fn stop_requested(&mut self) -> bool {
        false
    }
}

/// Outline of a placed node.
#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    Circle(Circle),
    /// One corner per child, on the node's own radius.
    Polygon(Vec<DVec2>),
}

/// Circle for nodes with up to two children, polygon otherwise. Corners are
/// recomputed from the current placement every time.
pub fn boundary(node: &Node, placement: Circle) -> Boundary {
    let n = node.children.len();
    if n > 2 {
        Boundary::Polygon(partition_points(placement.center, placement.radius, n))
    } else {
        Boundary::Circle(placement)
    }
}

/// Draws `id` and everything below it, children before parents.
///
/// Every placement in the subtree is checked before the first draw call, so
/// an unspread tree fails with [`crate::LayoutError::UnlaidOutNode`] instead
/// of leaving a half-drawn frame.
pub fn draw_node(tree: &Tree, id: NodeId, canvas: &mut dyn Canvas) -> LayoutResult<()> {
    let order = tree.subtree(id)?;
    let shapes = order
        .iter()
        .map(|&id| -> LayoutResult<(Boundary, Colour)> {
            let node = tree.get(id)?;
            Ok((boundary(node, tree.placement(id)?), node.colour))
        })
        .collect::<LayoutResult<Vec<_>>>()?;

    // Reverse pre-order puts every child ahead of its parent.
    for (shape, colour) in shapes.iter().rev() {
        match shape {
            Boundary::Circle(c) => canvas.circle(c.center, c.radius, *colour),
            Boundary::Polygon(corners) => canvas.polygon(corners, *colour),
        }
    }
    Ok(())
}

/// Clears to `background`, draws the tree under `root`, presents the frame.
pub fn draw_frame(
    tree: &Tree,
    root: NodeId,
    background: Colour,
    canvas: &mut dyn Canvas,
) -> LayoutResult<()> {
    // Validate before clearing so a failure leaves the previous frame up.
    tree.subtree(root)?
        .into_iter()
        .try_for_each(|id| tree.placement(id).map(|_| ()))?;
    canvas.clear(background);
    draw_node(tree, root, canvas)?;
    canvas.present();
    Ok(())
}
