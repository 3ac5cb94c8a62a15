//! The three phases of one solver step.
//!
//! The step looks like:
//! 1. [`gathering_phase`] — every child is pulled toward its parent's centre,
//!    accumulating velocity in a [`ForceBuffer`].
//! 2. [`repulsion_phase`] — every pair of unrelated nodes pushes apart.
//! 3. [`integration_phase`] — velocities are applied to positions in one
//!    batch and the kinetic energy is returned.
//!
//! Phases 1 and 2 only read placements; phase 3 is the only writer.

use glam::DVec2;

use crate::{
    config::LayoutConfig,
    error::{LayoutError, LayoutResult},
    force_buffer::ForceBuffer,
    tree::{Ancestry, Tree},
    types::NodeId,
    vector::{distance, distance_squared, scale_to_length},
};

/// Strength of the pull on a child whose boundary distance is
/// `distance_to_edge`, before `gather_proportion` and weight are applied.
///
/// Saturates at `max_gather_force` near (or past) the parent's edge and
/// weakens toward the centre.
pub fn gather_amount(distance_to_edge: f64, cfg: &LayoutConfig) -> f64 {
    if distance_to_edge <= 0.0 {
        cfg.max_gather_force
    } else {
        (cfg.gather_base + 1.0 / distance_to_edge).min(cfg.max_gather_force)
    }
}

/// Velocity that `outer` imparts on `inner`: inverse-square in the distance,
/// capped at `max_repulsion_force`, divided by `inner_weight`, pointing from
/// `outer` to `inner`.
pub fn repulsion(
    outer_pos: DVec2,
    outer_weight: f64,
    inner_pos: DVec2,
    inner_weight: f64,
    cfg: &LayoutConfig,
) -> DVec2 {
    let d2 = distance_squared(outer_pos, inner_pos);
    let magnitude =
        (outer_weight * cfg.force_proportion / d2).min(cfg.max_repulsion_force) / inner_weight;
    scale_to_length(inner_pos - outer_pos, magnitude)
}

/// Pulls every child below `root` toward its parent's centre.
///
/// Walks the tree root-down. For each parent/child pair the distance from
/// the child's centre to the parent's boundary picks a [`gather_amount`];
/// the child's slot in `acc` receives a vector toward the parent of length
/// `amount * gather_proportion / child.weight`.
///
/// ### Parameters
/// - `tree` - The spread tree; only read access is required.
/// - `root` - Where the walk starts. Nodes outside this subtree are not gathered.
/// - `cfg` - Gathering constants.
/// - `acc` - Velocity accumulator, indexed by node id.
///
/// ### Errors
/// [`LayoutError::UnlaidOutNode`] if any node in the subtree has no placement.
pub fn gathering_phase(
    tree: &Tree,
    root: NodeId,
    cfg: &LayoutConfig,
    acc: &mut ForceBuffer,
) -> LayoutResult<()> {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let parent = tree.placement(id)?;
        for &child_id in &tree.get(id)?.children {
            let child = tree.placement(child_id)?;
            let distance_to_edge = parent.radius - distance(child.center, parent.center);
            let amount = gather_amount(distance_to_edge, cfg);
            let length = amount * cfg.gather_proportion / tree.get(child_id)?.weight();
            acc.add(child_id, scale_to_length(parent.center - child.center, length));
            stack.push(child_id);
        }
    }
    Ok(())
}

/// Pushes every pair of unrelated nodes apart.
///
/// For every ordered pair `(outer, inner)` where the two are distinct and
/// neither is an ancestor of the other, `inner` receives [`repulsion`] from
/// `outer`. Positions are snapshotted first, so the pass sees one
/// consistent state regardless of visit order.
///
/// ### Parameters
/// - `tree` - The spread tree; every node must have a placement.
/// - `ancestry` - Lineage table built from the same tree.
/// - `cfg` - Repulsion constants.
/// - `acc` - Velocity accumulator, indexed by node id.
///
/// ### Errors
/// [`LayoutError::UnlaidOutNode`] for the first node without a placement.
pub fn repulsion_phase(
    tree: &Tree,
    ancestry: &Ancestry,
    cfg: &LayoutConfig,
    acc: &mut ForceBuffer,
) -> LayoutResult<()> {
    let bodies = (0..tree.len())
        .map(|id| -> LayoutResult<(DVec2, f64)> {
            Ok((tree.placement(id)?.center, tree.nodes()[id].weight()))
        })
        .collect::<LayoutResult<Vec<_>>>()?;

    for (inner, &(inner_pos, inner_weight)) in bodies.iter().enumerate() {
        for (outer, &(outer_pos, outer_weight)) in bodies.iter().enumerate() {
            if outer == inner || ancestry.related(outer, inner) {
                continue;
            }
            acc.add(
                inner,
                repulsion(outer_pos, outer_weight, inner_pos, inner_weight, cfg),
            );
        }
    }
    Ok(())
}

/// Moves every node by its accumulated velocity and clears `acc`.
///
/// All velocities are checked before anything moves, so a failing call
/// leaves the tree exactly as it was.
///
/// ### Returns
/// The kinetic energy of the step: the sum of squared velocities applied.
///
/// ### Errors
/// - [`LayoutError::DegenerateVector`] if any velocity is NaN or infinite.
/// - [`LayoutError::UnlaidOutNode`] if a node with velocity has no placement.
pub fn integration_phase(tree: &mut Tree, acc: &mut ForceBuffer) -> LayoutResult<f64> {
    if let Some((node, velocity)) = acc.first_non_finite() {
        return Err(LayoutError::DegenerateVector { node, velocity });
    }
    for id in 0..tree.len() {
        tree.placement(id)?;
    }

    let energy = acc.kinetic_energy();
    for (id, velocity) in acc.iter() {
        tree.translate(id, velocity);
    }
    acc.clear();
    Ok(energy)
}
