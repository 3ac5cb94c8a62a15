//! Hierarchical force-directed layout for nested circles.
//!
//! Main components:
//! - [`vector`] — distances and direction-preserving rescaling.
//! - [`tree`] — the node arena, construction API and lineage table.
//! - [`shape`] — owned nested tree descriptions.
//! - [`partition`] — one-time spatial subdivision of a region among children.
//! - [`force_buffer`] — per-node velocity accumulator for a step.
//! - [`phases`] — gathering, repulsion and integration.
//! - [`layout`] — the simulation context and the arrangement loop.
//! - [`render`] — the drawing and stop-signal contracts for frontends.
//! - [`config`] — tuning constants.
//! - [`error`] — the error type.
//! - [`types`] — shared ids and small value types.
//!
//! ```no_run
//! use glam::DVec2;
//! use nest_core::{Circle, Layout, LayoutConfig, NeverStop, Shape, Tree};
//!
//! let mut tree = Tree::new();
//! tree.graft(&Shape::repeat(&Shape::leaf(), 4)).unwrap();
//! let mut layout = Layout::new(tree, LayoutConfig::default()).unwrap();
//! let done = layout
//!     .arrange(Circle::new(DVec2::ZERO, 200.0), None, &mut NeverStop)
//!     .unwrap();
//! println!("{:?} after {} steps", done.outcome, done.iterations);
//! ```

pub mod config;
pub mod error;
pub mod force_buffer;
pub mod layout;
pub mod partition;
pub mod phases;
pub mod render;
pub mod shape;
pub mod tree;
pub mod types;
pub mod vector;

pub use config::LayoutConfig;
pub use error::{LayoutError, LayoutResult};
pub use layout::{Arrangement, Layout, Outcome};
pub use render::{Canvas, NeverStop, StopSignal};
pub use shape::Shape;
pub use tree::Tree;
pub use types::{Circle, Colour, NodeId};
