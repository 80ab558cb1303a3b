//! Top-down resolution of relative offsets into absolute coordinates.

use super::node::{Forest, NodeId, TreeNode};
use crate::graph::Rect;

/// Resolves absolute positions below `root`, which lands at `anchor`.
///
/// `apply` is called once per node right after its position is known and returns the node's
/// resulting bounds; the union of all of them is returned.
pub(crate) fn resolve<C, F>(
    forest: &mut Forest<C>,
    root: NodeId,
    anchor: (f64, f64),
    horizontal: bool,
    apply: &mut F,
) -> Option<Rect>
where
    C: Copy,
    F: FnMut(&TreeNode<C>) -> Option<Rect>,
{
    let mut bounds: Option<Rect> = None;
    let mut stack = vec![(root, anchor.0, anchor.1)];

    while let Some((id, ox, oy)) = stack.pop() {
        let node = forest.node_mut(id);
        if horizontal {
            node.x += ox + node.offset_x;
            node.y += oy + node.offset_y;
        } else {
            node.x += ox + node.offset_y;
            node.y += oy + node.offset_x;
        }
        bounds = union(bounds, apply(forest.node(id)));

        let node = forest.node(id);
        let Some(first) = node.child else {
            continue;
        };
        let (x, y) = (node.x, node.y);
        let head = forest.node(first);

        let mut pending = vec![(first, x, y)];
        let mut sibling = head.next;
        if horizontal {
            let mut cursor = y + head.offset_y;
            while let Some(s) = sibling {
                pending.push((s, x + head.offset_x, cursor));
                let n = forest.node(s);
                cursor += n.offset_y;
                sibling = n.next;
            }
        } else {
            let mut cursor = x + head.offset_y;
            while let Some(s) = sibling {
                pending.push((s, cursor, y + head.offset_x));
                let n = forest.node(s);
                cursor += n.offset_y;
                sibling = n.next;
            }
        }
        stack.extend(pending.into_iter().rev());
    }

    bounds
}

/// Shifts every node below `root` by `(dx, dy)` and re-applies it.
pub(crate) fn translate<C, F>(forest: &mut Forest<C>, root: NodeId, dx: f64, dy: f64, apply: &mut F)
where
    C: Copy,
    F: FnMut(&TreeNode<C>) -> Option<Rect>,
{
    for id in forest.pre_order(root) {
        let node = forest.node_mut(id);
        node.x += dx;
        node.y += dy;
        apply(forest.node(id));
    }
}

fn union(acc: Option<Rect>, next: Option<Rect>) -> Option<Rect> {
    match (acc, next) {
        (Some(a), Some(b)) => Some(a.union(&b)),
        (a, b) => a.or(b),
    }
}
