//! One-time spatial subdivision that gives every node its starting placement.
//!
//! A node with `n > 1` children splits its circle into `n` equal angular
//! sectors; child `i` is centred halfway to the boundary on the `i`-th
//! sector line. A single child takes the whole region minus the gap.

use std::f64::consts::TAU;

use glam::DVec2;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::tree::Tree;
use crate::types::{Circle, NodeId};

/// Share of the parent radius given to a child with `child_count` children
/// among `sibling_count` siblings.
///
/// Busy children (more than two children) get the larger matched share when
/// they branch exactly like their parent; everything else is drawn as a
/// circle and gets the circle share.
pub fn child_radius_proportion(
    child_count: usize,
    sibling_count: usize,
    cfg: &LayoutConfig,
) -> f64 {
    if child_count > 2 {
        if child_count == sibling_count {
            cfg.matched_radius_proportion
        } else {
            cfg.unmatched_radius_proportion
        }
    } else {
        cfg.circle_radius_proportion
    }
}

/// `count` points evenly spaced on the circle `(center, radius)`, the first
/// at angle 0, going counter-clockwise.
pub fn partition_points(center: DVec2, radius: f64, count: usize) -> Vec<DVec2> {
    let step = TAU / count as f64;
    (0..count)
        .map(|i| center + radius * DVec2::from_angle(i as f64 * step))
        .collect()
}

/// Default root region for a `width` x `height` drawing surface.
pub fn fit_region(width: f64, height: f64, cfg: &LayoutConfig) -> Circle {
    Circle::new(
        DVec2::new(width / 2.0, height / 2.0),
        cfg.size_proportion * width.min(height),
    )
}

/// Assigns a placement to `root` and every node below it.
///
/// Fails with [`LayoutError::RegionTooSmall`] when a nested region ends up
/// with no positive radius. Placements are only written once the whole
/// subtree fits, so a failure leaves the tree as it was.
pub fn spread(
    tree: &mut Tree,
    root: NodeId,
    region: Circle,
    cfg: &LayoutConfig,
) -> LayoutResult<()> {
    tree.get(root)?;

    let mut placements = Vec::new();
    let mut stack = vec![(root, region)];
    while let Some((id, region)) = stack.pop() {
        if !(region.radius > 0.0) {
            return Err(LayoutError::RegionTooSmall {
                node: id,
                radius: region.radius,
            });
        }
        placements.push((id, region));

        let children = &tree.nodes()[id].children;
        let max_child_radius = region.radius - cfg.min_gap;
        match children.len() {
            0 => {}
            1 => stack.push((children[0], Circle::new(region.center, max_child_radius))),
            n => {
                let points = partition_points(region.center, region.radius / 2.0, n);
                // Reversed so children pop off the stack in order.
                for (&child, &center) in children.iter().zip(&points).rev() {
                    let proportion =
                        child_radius_proportion(tree.nodes()[child].children.len(), n, cfg);
                    let radius = (proportion * region.radius).min(max_child_radius);
                    stack.push((child, Circle::new(center, radius)));
                }
            }
        }
    }

    let placed = placements.len();
    for (id, circle) in placements {
        tree.place(id, circle);
    }
    debug!(root, placed, radius = region.radius, "spread tree");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use rstest::rstest;

    const EPS: f64 = 1e-9;

    fn spread_shape(shape: &Shape, region: Circle) -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let root = tree.graft(shape).unwrap();
        spread(&mut tree, root, region, &LayoutConfig::default()).unwrap();
        (tree, root)
    }

    #[test]
    fn single_leaf_child_fills_region_minus_gap() {
        let shape = Shape::group([Shape::leaf()]);
        let (tree, root) = spread_shape(&shape, Circle::new(DVec2::new(400.0, 400.0), 100.0));

        let child = tree.get(root).unwrap().children[0];
        let placement = tree.placement(child).unwrap();
        assert_eq!(placement.center, DVec2::new(400.0, 400.0));
        assert_eq!(placement.radius, 97.0);
    }

    #[test]
    fn four_leaves_sit_on_half_radius_at_right_angles() {
        let shape = Shape::repeat(&Shape::leaf(), 4);
        let (tree, root) = spread_shape(&shape, Circle::new(DVec2::ZERO, 200.0));

        let expected = [
            DVec2::new(100.0, 0.0),
            DVec2::new(0.0, 100.0),
            DVec2::new(-100.0, 0.0),
            DVec2::new(0.0, -100.0),
        ];
        for (&child, want) in tree.get(root).unwrap().children.iter().zip(expected) {
            let placement = tree.placement(child).unwrap();
            assert!(
                placement.center.distance(want) < EPS,
                "{} != {want}",
                placement.center
            );
            assert_eq!(placement.radius, 50.0);
        }
    }

    #[rstest]
    #[case(0, 4, 0.25)]
    #[case(2, 4, 0.25)]
    #[case(4, 4, 0.5)]
    #[case(3, 4, 0.285)]
    #[case(5, 3, 0.285)]
    fn radius_proportion_table(
        #[case] child_count: usize,
        #[case] siblings: usize,
        #[case] want: f64,
    ) {
        let cfg = LayoutConfig::default();
        assert_eq!(child_radius_proportion(child_count, siblings, &cfg), want);
    }

    #[test]
    fn busy_child_with_other_branching_gets_unmatched_share() {
        let shape = Shape::group([Shape::repeat(&Shape::leaf(), 3), Shape::leaf()]);
        let (tree, root) = spread_shape(&shape, Circle::new(DVec2::ZERO, 200.0));

        let children = &tree.get(root).unwrap().children;
        assert!((tree.placement(children[0]).unwrap().radius - 57.0).abs() < EPS);
        assert_eq!(tree.placement(children[1]).unwrap().radius, 50.0);
    }

    #[test]
    fn child_radius_is_capped_by_gap() {
        let cfg = LayoutConfig {
            min_gap: 9.0,
            ..LayoutConfig::default()
        };
        let mut tree = Tree::new();
        let root = tree.graft(&Shape::repeat(&Shape::leaf(), 2)).unwrap();
        spread(&mut tree, root, Circle::new(DVec2::ZERO, 10.0), &cfg).unwrap();

        for &child in &tree.get(root).unwrap().children {
            assert_eq!(tree.placement(child).unwrap().radius, 1.0);
        }
    }

    #[test]
    fn partition_invariant_holds_for_nested_tree() {
        let cfg = LayoutConfig::default();
        let leg = Shape::repeat(&Shape::leaf(), 4);
        let shape = Shape::group([
            Shape::repeat(&leg, 4),
            Shape::group([Shape::leaf(), Shape::leaf()]),
            Shape::group([Shape::repeat(&Shape::leaf(), 3)]),
            Shape::leaf(),
        ]);
        let (tree, root) = spread_shape(&shape, Circle::new(DVec2::new(10.0, -20.0), 360.0));

        for id in tree.subtree(root).unwrap() {
            let parent = tree.placement(id).unwrap();
            let children = &tree.get(id).unwrap().children;
            let n = children.len();
            for (i, &child) in children.iter().enumerate() {
                let placement = tree.placement(child).unwrap();
                assert!(placement.radius <= parent.radius - cfg.min_gap + EPS);
                if n > 1 {
                    let offset = placement.center - parent.center;
                    assert!((offset.length() - parent.radius / 2.0).abs() < EPS);
                    let want = DVec2::from_angle(i as f64 * TAU / n as f64);
                    assert!(offset.normalize().distance(want) < EPS);
                } else {
                    assert_eq!(placement.center, parent.center);
                }
            }
        }
    }

    #[test]
    fn spread_places_only_the_named_subtree() {
        let mut tree = Tree::new();
        let stray = tree.leaf();
        let leaf = tree.leaf();
        let root = tree.node([leaf]).unwrap();

        spread(&mut tree, root, Circle::new(DVec2::ZERO, 10.0), &LayoutConfig::default()).unwrap();

        assert!(tree.placement(root).is_ok());
        assert!(tree.placement(leaf).is_ok());
        assert_eq!(tree.placement(stray), Err(LayoutError::UnlaidOutNode(stray)));
    }

    #[test]
    fn deep_chain_runs_out_of_room() {
        let mut shape = Shape::leaf();
        for _ in 0..5 {
            shape = Shape::group([shape]);
        }
        let mut tree = Tree::new();
        let root = tree.graft(&shape).unwrap();

        let err = spread(&mut tree, root, Circle::new(DVec2::ZERO, 10.0), &LayoutConfig::default())
            .unwrap_err();
        assert!(matches!(err, LayoutError::RegionTooSmall { .. }));
        assert_eq!(tree.placement(root), Err(LayoutError::UnlaidOutNode(root)));
    }

    #[test]
    fn fit_region_uses_smaller_dimension() {
        let cfg = LayoutConfig::default();
        let region = fit_region(800.0, 600.0, &cfg);
        assert_eq!(region.center, DVec2::new(400.0, 300.0));
        assert!((region.radius - 270.0).abs() < EPS);
    }

    #[test]
    fn partition_points_start_at_angle_zero() {
        let points = partition_points(DVec2::new(1.0, 1.0), 2.0, 2);
        assert!(points[0].distance(DVec2::new(3.0, 1.0)) < EPS);
        assert!(points[1].distance(DVec2::new(-1.0, 1.0)) < EPS);
    }
}
