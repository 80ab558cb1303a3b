//! Depth-first conversion of a rooted part of the model into a [`Forest`].

use rustc_hash::FxHashSet;

use super::CompactTreeOptions;
use super::node::{Forest, NodeId};
use crate::contract::{Layout, is_vertex_hidden, vertex_bounds};
use crate::graph::GraphModel;

struct Frame<C> {
    node: NodeId,
    edges: Vec<C>,
    next: usize,
    prev: Option<NodeId>,
}

/// Builds the spanning tree reachable from `root` through edges in the growth direction.
///
/// Each vertex is taken once, on first encounter; edges leading back to a visited vertex are
/// skipped. Edge waypoints are cleared on the way according to `reset_edges` and
/// `edge_routing`. Returns `None` when `root` is hidden or has no geometry.
pub(crate) fn build<L, M>(
    layout: &L,
    model: &mut M,
    options: &CompactTreeOptions,
    parent: M::Cell,
    root: M::Cell,
) -> Option<(Forest<M::Cell>, NodeId)>
where
    L: Layout,
    M: GraphModel,
{
    if is_vertex_hidden(model, root) {
        return None;
    }

    let mut forest = Forest::new();
    let mut visited = FxHashSet::default();

    let tree_root = add_node(&mut forest, model, options, parent, root)?;
    visited.insert(root);

    let mut stack = vec![Frame {
        node: tree_root,
        edges: growth_edges(model, options, parent, root),
        next: 0,
        prev: None,
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(&edge) = frame.edges.get(frame.next) else {
            stack.pop();
            continue;
        };
        frame.next += 1;
        let (node, prev) = (frame.node, frame.prev);

        if layout.is_edge_ignored(model, edge) {
            continue;
        }
        if options.reset_edges {
            model.set_edge_points(edge, None);
        }
        if options.edge_routing {
            model.set_edge_style_enabled(edge, false);
            model.set_edge_points(edge, None);
        }

        let Some(target) = model.terminal(edge, options.invert) else {
            continue;
        };
        if visited.contains(&target) || layout.is_vertex_ignored(model, target) {
            continue;
        }
        let Some(child) = add_node(&mut forest, model, options, parent, target) else {
            continue;
        };
        visited.insert(target);
        forest.link(node, prev, child);
        if let Some(frame) = stack.last_mut() {
            frame.prev = Some(child);
        }

        tracing::trace!(cell = ?target, depth = stack.len(), "tree node");
        stack.push(Frame {
            node: child,
            edges: growth_edges(model, options, parent, target),
            next: 0,
            prev: None,
        });
    }

    Some((forest, tree_root))
}

fn add_node<M: GraphModel>(
    forest: &mut Forest<M::Cell>,
    model: &M,
    options: &CompactTreeOptions,
    parent: M::Cell,
    cell: M::Cell,
) -> Option<NodeId> {
    let bounds = vertex_bounds(model, cell, parent)?;
    let node = if options.horizontal {
        forest.add_node(cell, bounds.height, bounds.width)
    } else {
        forest.add_node(cell, bounds.width, bounds.height)
    };
    Some(node)
}

/// Outgoing (inverted: incoming) non-loop edges of `cell` ending anywhere below `parent`.
fn growth_edges<M: GraphModel>(
    model: &M,
    options: &CompactTreeOptions,
    parent: M::Cell,
    cell: M::Cell,
) -> Vec<M::Cell> {
    let invert = options.invert;
    let mut edges = model.edges(cell, Some(parent), invert, !invert, false, true);
    if options.sort_edges {
        let mut keyed: Vec<(Vec<usize>, M::Cell)> = edges
            .into_iter()
            .map(|e| {
                let path = model
                    .terminal(e, invert)
                    .map(|t| model.cell_path(t))
                    .unwrap_or_default();
                (path, e)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        edges = keyed.into_iter().map(|(_, e)| e).collect();
    }
    edges
}
