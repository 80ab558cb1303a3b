//! Arena-backed child/next-sibling forest used while a tree is being laid out.

use super::contour::{Contour, Line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineId(pub(super) usize);

/// One vertex of the tree.
///
/// Sizes are oriented: `height` is the extent along the growth axis, `width` the extent across
/// it. `offset_x`/`offset_y` are the along/across offsets relative to the previous sibling (or
/// to the parent for a first child).
#[derive(Debug, Clone)]
pub(crate) struct TreeNode<C> {
    pub cell: C,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub contour: Contour,
    pub child: Option<NodeId>,
    pub next: Option<NodeId>,
}

#[derive(Debug)]
pub(crate) struct Forest<C> {
    pub(super) nodes: Vec<TreeNode<C>>,
    pub(super) lines: Vec<Line>,
}

impl<C: Copy> Forest<C> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            lines: Vec::new(),
        }
    }

    pub(crate) fn add_node(&mut self, cell: C, width: f64, height: f64) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            cell,
            x: 0.0,
            y: 0.0,
            width,
            height,
            offset_x: 0.0,
            offset_y: 0.0,
            contour: Contour::default(),
            child: None,
            next: None,
        });
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node(&self, id: NodeId) -> &TreeNode<C> {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TreeNode<C> {
        &mut self.nodes[id.0]
    }

    /// Appends `child` to the sibling chain after `prev`, or as first child of `parent`.
    pub(crate) fn link(&mut self, parent: NodeId, prev: Option<NodeId>, child: NodeId) {
        match prev {
            None => self.node_mut(parent).child = Some(child),
            Some(p) => self.node_mut(p).next = Some(child),
        }
    }

    pub(crate) fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.node(id).child;
        while let Some(c) = cur {
            out.push(c);
            cur = self.node(c).next;
        }
        out
    }

    /// Nodes below (and including) `root`, parents before children, siblings in chain order.
    pub(crate) fn pre_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let children = self.children(id);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// `pre_order` paired with each node's depth below `root`.
    pub(crate) fn pre_order_with_depth(&self, root: NodeId) -> Vec<(NodeId, usize)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            out.push((id, depth));
            let children = self.children(id);
            stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
        }
        out
    }

    /// Raises every node's along-axis size to the largest one found on its rank.
    pub(crate) fn align_ranks(&mut self, root: NodeId) {
        let order = self.pre_order_with_depth(root);
        let mut max_rank_height: Vec<f64> = Vec::new();
        for &(id, depth) in &order {
            if max_rank_height.len() <= depth {
                max_rank_height.resize(depth + 1, 0.0);
            }
            max_rank_height[depth] = max_rank_height[depth].max(self.node(id).height);
        }
        for (id, depth) in order {
            let n = self.node_mut(id);
            n.height = n.height.max(max_rank_height[depth]);
        }
    }
}
