use glam::DVec2;
use thiserror::Error;

use crate::types::NodeId;

/// Every way a layout run can fail.
///
/// All of these are contract violations by the caller or numeric blow-ups;
/// none of them is worth retrying.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Position/radius read before the tree was spread.
    #[error("node {0} has not been laid out; spread the tree before stepping or drawing")]
    UnlaidOutNode(NodeId),

    /// A non-finite velocity reached the integration phase.
    #[error("node {node} accumulated a non-finite velocity {velocity}")]
    DegenerateVector { node: NodeId, velocity: DVec2 },

    #[error("tree has no root node")]
    EmptyTree,

    /// Some arena nodes are not below the layout root, so they would never
    /// be spread.
    #[error("root {root} reaches only {reachable} of {total} nodes")]
    DetachedNodes {
        root: NodeId,
        reachable: usize,
        total: usize,
    },

    #[error("unknown node id {0}")]
    UnknownNode(NodeId),

    /// The node is already the child of another node.
    #[error("node {0} already has a parent")]
    AlreadyAttached(NodeId),

    #[error("weight must be positive and finite, got {0}")]
    InvalidWeight(f64),

    /// Partitioning ran out of room before reaching this node.
    #[error("region for node {node} collapsed to radius {radius}")]
    RegionTooSmall { node: NodeId, radius: f64 },

    #[error("config error: {0}")]
    Config(String),
}

pub type LayoutResult<T> = Result<T, LayoutError>;
