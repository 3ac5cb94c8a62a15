use crate::error::{LayoutError, LayoutResult};
use crate::types::{Circle, Colour, NodeId};
use glam::DVec2;

/// One circle of the layout.
///
/// ### Fields
/// - `children` - Owned child ids, in construction order.
/// - `parent` - Back-reference set when the node is handed to [`Tree::node`].
/// - `placement` - Centre and radius; `None` until the tree has been spread.
/// - `colour` - Outline colour used when drawing.
#[derive(Debug, Clone)]
pub struct Node {
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub placement: Option<Circle>,
    pub colour: Colour,
    weight: f64,
}

/// Arena of every node built for one layout run, in construction order.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Node {
    fn new(children: Vec<NodeId>, weight: f64, colour: Colour) -> Self {
        Self {
            children,
            parent: None,
            placement: None,
            colour,
            weight,
        }
    }

    /// Inertia of the node: divides the gathering pull on it and scales the
    /// push it gives others.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn position(&self) -> Option<DVec2> {
        self.placement.map(|c| c.center)
    }

    pub fn radius(&self) -> Option<f64> {
        self.placement.map(|c| c.radius)
    }
}

pub(crate) fn check_weight(weight: f64) -> LayoutResult<f64> {
    if weight.is_finite() && weight > 0.0 {
        Ok(weight)
    } else {
        Err(LayoutError::InvalidWeight(weight))
    }
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever added.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, indexed by [`NodeId`].
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Looks up a node.
    ///
    /// ### Errors
    /// [`LayoutError::UnknownNode`] if `id` was never handed out by this tree.
    pub fn get(&self, id: NodeId) -> LayoutResult<&Node> {
        self.nodes.get(id).ok_or(LayoutError::UnknownNode(id))
    }

    fn get_mut(&mut self, id: NodeId) -> LayoutResult<&mut Node> {
        self.nodes.get_mut(id).ok_or(LayoutError::UnknownNode(id))
    }

    /// Adds a white, unit-weight node without children.
    pub fn leaf(&mut self) -> NodeId {
        self.push(Vec::new(), 1.0, Colour::default())
    }

    /// Adds a node owning `children`, in order.
    ///
    /// Every child must already exist and must not have a parent yet, which
    /// keeps the arena a forest: a node can never become its own ancestor.
    ///
    /// ### Parameters
    /// - `children` - Ids of parentless nodes; the order is kept.
    ///
    /// ### Returns
    /// The id of the new node, which is always `len() - 1`.
    ///
    /// ### Errors
    /// - [`LayoutError::UnknownNode`] for an id this tree never handed out.
    /// - [`LayoutError::AlreadyAttached`] for a child that already has a
    ///   parent or is listed twice.
    ///
    /// Nothing is added when an error is returned.
    pub fn node(&mut self, children: impl IntoIterator<Item = NodeId>) -> LayoutResult<NodeId> {
        let children: Vec<NodeId> = children.into_iter().collect();
        for (i, &child) in children.iter().enumerate() {
            if self.get(child)?.parent.is_some() || children[..i].contains(&child) {
                return Err(LayoutError::AlreadyAttached(child));
            }
        }
        Ok(self.push(children, 1.0, Colour::default()))
    }

    /// Appends a node and links `children` back to it. The caller has already
    /// checked that every child exists, is parentless and appears once.
    pub(crate) fn push(&mut self, children: Vec<NodeId>, weight: f64, colour: Colour) -> NodeId {
        let id = self.nodes.len();
        for &child in &children {
            self.nodes[child].parent = Some(id);
        }
        self.nodes.push(Node::new(children, weight, colour));
        id
    }

    /// Changes the weight of `id`.
    ///
    /// ### Errors
    /// - [`LayoutError::InvalidWeight`] unless `weight` is finite and positive.
    /// - [`LayoutError::UnknownNode`] if `id` does not exist.
    pub fn set_weight(&mut self, id: NodeId, weight: f64) -> LayoutResult<()> {
        let weight = check_weight(weight)?;
        self.get_mut(id)?.weight = weight;
        Ok(())
    }

    pub fn set_colour(&mut self, id: NodeId, colour: Colour) -> LayoutResult<()> {
        self.get_mut(id)?.colour = colour;
        Ok(())
    }

    /// The most recently constructed node without a parent, `None` for an
    /// empty arena.
    pub fn root(&self) -> Option<NodeId> {
        self.nodes.iter().rposition(|n| n.parent.is_none())
    }

    /// Every parentless node, oldest first.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(id, n)| if n.parent.is_none() { Some(id) } else { None })
    }

    /// Placement of `id`, or [`LayoutError::UnlaidOutNode`] if it was never spread.
    pub fn placement(&self, id: NodeId) -> LayoutResult<Circle> {
        self.get(id)?
            .placement
            .ok_or(LayoutError::UnlaidOutNode(id))
    }

    pub(crate) fn place(&mut self, id: NodeId, region: Circle) {
        self.nodes[id].placement = Some(region);
    }

    pub(crate) fn translate(&mut self, id: NodeId, delta: DVec2) {
        if let Some(c) = self.nodes[id].placement.as_mut() {
            c.center += delta;
        }
    }

    /// Collects a subtree.
    ///
    /// ### Parameters
    /// - `id` - Top of the subtree.
    ///
    /// ### Returns
    /// `id` followed by all of its descendants, parents before children and
    /// siblings in construction order.
    pub fn subtree(&self, id: NodeId) -> LayoutResult<Vec<NodeId>> {
        self.get(id)?;
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.nodes[current].children.iter().rev());
        }
        Ok(order)
    }
}

/// Precomputed ancestor/descendant relation for a frozen [`Tree`].
///
/// Each node gets an `[enter, exit)` interval from a depth-first walk; `a`
/// is an ancestor of `b` exactly when `b`'s interval nests inside `a`'s.
#[derive(Debug, Clone)]
pub struct Ancestry {
    enter: Vec<u32>,
    exit: Vec<u32>,
}

impl Ancestry {
    pub fn build(tree: &Tree) -> Self {
        let n = tree.len();
        let mut enter = vec![0; n];
        let mut exit = vec![0; n];
        let mut clock = 0u32;

        // (node, children already pushed)
        let mut stack: Vec<(NodeId, bool)> = Vec::new();
        for root in tree.roots() {
            stack.push((root, false));
            while let Some((id, expanded)) = stack.pop() {
                if expanded {
                    exit[id] = clock;
                    continue;
                }
                enter[id] = clock;
                clock += 1;
                stack.push((id, true));
                for &child in tree.nodes[id].children.iter().rev() {
                    stack.push((child, false));
                }
            }
        }

        Self { enter, exit }
    }

    #[inline]
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor != node
            && self.enter[ancestor] <= self.enter[node]
            && self.exit[node] <= self.exit[ancestor]
    }

    /// `true` when one node is an ancestor of the other, in either direction.
    #[inline]
    pub fn related(&self, a: NodeId, b: NodeId) -> bool {
        self.is_ancestor(a, b) || self.is_ancestor(b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root -> (a -> (b, c), d)
    fn sample() -> (Tree, [NodeId; 5]) {
        let mut tree = Tree::new();
        let b = tree.leaf();
        let c = tree.leaf();
        let a = tree.node([b, c]).unwrap();
        let d = tree.leaf();
        let root = tree.node([a, d]).unwrap();
        (tree, [root, a, b, c, d])
    }

    /// Walks parent links from `node` upwards looking for `ancestor`.
    fn has_ancestor(tree: &Tree, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = tree.nodes[node].parent;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = tree.nodes[id].parent;
        }
        false
    }

    #[test]
    fn node_links_children_to_parent() {
        let (tree, [root, a, b, c, d]) = sample();

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.get(root).unwrap().children, vec![a, d]);
        assert_eq!(tree.get(a).unwrap().children, vec![b, c]);
        assert_eq!(tree.get(b).unwrap().parent, Some(a));
        assert_eq!(tree.get(a).unwrap().parent, Some(root));
        assert!(tree.get(root).unwrap().parent.is_none());
        assert!(tree.get(d).unwrap().is_leaf());
    }

    #[test]
    fn new_nodes_are_unplaced_white_and_unit_weight() {
        let mut tree = Tree::new();
        let id = tree.leaf();
        let node = tree.get(id).unwrap();

        assert!(node.placement.is_none());
        assert_eq!(node.weight(), 1.0);
        assert_eq!(node.colour, Colour::WHITE);
        assert_eq!(tree.placement(id), Err(LayoutError::UnlaidOutNode(id)));
    }

    #[test]
    fn root_is_latest_parentless_node() {
        let (mut tree, [root, ..]) = sample();
        assert_eq!(tree.root(), Some(root));

        let stray = tree.leaf();
        assert_eq!(tree.root(), Some(stray));
        assert_eq!(tree.roots().collect::<Vec<_>>(), vec![root, stray]);

        assert_eq!(Tree::new().root(), None);
    }

    #[test]
    fn node_rejects_attached_duplicate_and_unknown_children() {
        let (mut tree, [_, a, b, ..]) = sample();

        assert_eq!(tree.node([b]), Err(LayoutError::AlreadyAttached(b)));
        assert_eq!(tree.node([a]), Err(LayoutError::AlreadyAttached(a)));

        let x = tree.leaf();
        assert_eq!(tree.node([x, x]), Err(LayoutError::AlreadyAttached(x)));
        assert_eq!(tree.node([99]), Err(LayoutError::UnknownNode(99)));

        // Failed calls leave no trace.
        assert_eq!(tree.len(), 6);
        assert!(tree.get(x).unwrap().parent.is_none());
    }

    #[test]
    fn set_weight_validates() {
        let (mut tree, [root, ..]) = sample();

        tree.set_weight(root, 4.0).unwrap();
        assert_eq!(tree.get(root).unwrap().weight(), 4.0);

        assert_eq!(tree.set_weight(root, 0.0), Err(LayoutError::InvalidWeight(0.0)));
        assert!(tree.set_weight(root, f64::NAN).is_err());
        assert_eq!(tree.set_weight(42, 1.0), Err(LayoutError::UnknownNode(42)));
        assert_eq!(tree.get(root).unwrap().weight(), 4.0);
    }

    #[test]
    fn subtree_is_pre_order() {
        let (tree, [root, a, b, c, d]) = sample();
        assert_eq!(tree.subtree(root).unwrap(), vec![root, a, b, c, d]);
        assert_eq!(tree.subtree(a).unwrap(), vec![a, b, c]);
        assert_eq!(tree.subtree(d).unwrap(), vec![d]);
    }

    #[test]
    fn ancestry_matches_parent_walk_for_every_pair() {
        let (mut tree, _) = sample();
        // A second tree in the same arena.
        let x = tree.leaf();
        let y = tree.node([x]).unwrap();
        let _z = tree.node([y]).unwrap();

        let ancestry = Ancestry::build(&tree);
        for a in 0..tree.len() {
            for b in 0..tree.len() {
                assert_eq!(
                    ancestry.is_ancestor(a, b),
                    has_ancestor(&tree, b, a),
                    "is_ancestor({a}, {b})"
                );
                assert_eq!(ancestry.related(a, b), ancestry.related(b, a));
            }
        }
    }

    #[test]
    fn ancestry_relates_only_lineage() {
        let (tree, [root, a, b, c, d]) = sample();
        let ancestry = Ancestry::build(&tree);

        assert!(ancestry.related(root, b));
        assert!(ancestry.related(c, a));
        assert!(!ancestry.related(b, c));
        assert!(!ancestry.related(a, d));
        assert!(!ancestry.related(d, b));
        assert!(!ancestry.related(a, a));
    }
}
