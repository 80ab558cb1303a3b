//! Compact tree layout.
//!
//! Builds a spanning tree from a root vertex, packs sibling subtrees as tightly as their
//! silhouettes allow, then writes absolute positions back to the model. Optional passes
//! route tree edges through orthogonal jetties and grow enclosing groups to fit.

mod builder;
mod contour;
mod node;
mod place;
mod route;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::contract::{
    GroupPadding, Layout, UpdateGuard, arrange_groups, is_vertex_hidden, set_vertex_location,
    vertex_bounds,
};
use crate::graph::{GraphModel, Point, Rect};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompactTreeOptions {
    /// Minimum gap between sibling subtrees.
    pub node_distance: f64,
    /// Gap between a parent and its children along the growth axis.
    pub level_distance: f64,
    /// Grow the groups containing moved vertices so they enclose their children.
    pub resize_parent: bool,
    /// Keep the layout parent's origin when it is resized.
    pub maintain_parent_location: bool,
    pub group_padding: f64,
    pub group_padding_top: f64,
    pub group_padding_right: f64,
    pub group_padding_bottom: f64,
    pub group_padding_left: f64,
    /// Replace tree edge waypoints with orthogonal jetties.
    pub edge_routing: bool,
    /// Clear waypoints of traversed edges.
    pub reset_edges: bool,
    /// Order children by document position instead of edge order.
    pub sort_edges: bool,
    /// Give every node on a rank the along-axis size of the largest one.
    pub align_ranks: bool,
    /// Anchor the root at `origin` instead of its current position.
    pub move_tree: bool,
    pub origin: Point,
    /// Grow left to right (`true`) or top to bottom.
    pub horizontal: bool,
    /// Follow incoming instead of outgoing edges.
    pub invert: bool,
    pub pref_hoz_edge_sep: f64,
    pub pref_vert_edge_off: f64,
    pub min_edge_jetty: f64,
}

impl Default for CompactTreeOptions {
    fn default() -> Self {
        Self {
            node_distance: 20.0,
            level_distance: 10.0,
            resize_parent: false,
            maintain_parent_location: false,
            group_padding: 10.0,
            group_padding_top: 0.0,
            group_padding_right: 0.0,
            group_padding_bottom: 0.0,
            group_padding_left: 0.0,
            edge_routing: true,
            reset_edges: true,
            sort_edges: false,
            align_ranks: false,
            move_tree: false,
            origin: Point::new(10.0, 10.0),
            horizontal: true,
            invert: false,
            pref_hoz_edge_sep: 5.0,
            pref_vert_edge_off: 4.0,
            min_edge_jetty: 8.0,
        }
    }
}

impl CompactTreeOptions {
    fn group_padding(&self) -> GroupPadding {
        GroupPadding {
            border: self.group_padding,
            top: self.group_padding_top,
            right: self.group_padding_right,
            bottom: self.group_padding_bottom,
            left: self.group_padding_left,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompactTreeLayout {
    pub options: CompactTreeOptions,
}

impl CompactTreeLayout {
    pub fn new(options: CompactTreeOptions) -> Self {
        Self { options }
    }

    /// The layout parent itself when it has edges in the growth direction towards its
    /// siblings, otherwise the first usable tree root among its children.
    fn find_root<M: GraphModel>(&self, model: &M, parent: M::Cell) -> Option<M::Cell> {
        let invert = self.options.invert;
        if !model
            .edges(parent, model.parent(parent), invert, !invert, false, false)
            .is_empty()
        {
            return Some(parent);
        }

        model
            .find_tree_roots(parent, true, invert)
            .into_iter()
            .find(|&r| {
                !self.is_vertex_ignored(model, r)
                    && !model.edges(r, None, invert, !invert, false, false).is_empty()
            })
    }
}

impl Layout for CompactTreeLayout {
    fn execute<M: GraphModel>(&self, model: &mut M, parent: M::Cell, root: Option<M::Cell>) {
        let started = std::time::Instant::now();
        let options = &self.options;
        let mut model = UpdateGuard::new(model);

        let root = match root {
            Some(r) if is_vertex_hidden(&*model, r) => {
                tracing::debug!(root = ?r, "explicit root is not a visible vertex");
                return;
            }
            Some(r) => r,
            None => match self.find_root(&*model, parent) {
                Some(r) => r,
                None => {
                    tracing::debug!(?parent, "no tree root found");
                    return;
                }
            },
        };

        let parent_origin = model.geometry(parent).map(|g| (g.x, g.y));

        let Some((mut forest, tree_root)) = builder::build(self, &mut *model, options, parent, root)
        else {
            tracing::debug!(?root, "root has no geometry");
            return;
        };

        if options.align_ranks {
            forest.align_ranks(tree_root);
        }

        let nd = options.node_distance;
        for id in forest.pre_order(tree_root).into_iter().rev() {
            match forest.node(id).child {
                Some(first) => {
                    let height = forest.join(id, first, nd);
                    forest.attach_parent(id, first, height, nd, options.level_distance);
                }
                None => forest.layout_leaf(id, nd),
            }
        }

        let anchor = if options.move_tree {
            options.origin
        } else {
            vertex_bounds(&*model, root, parent)
                .map(|b| Point::new(b.x, b.y))
                .unwrap_or(options.origin)
        };

        let mut changed_groups: IndexSet<M::Cell> = IndexSet::new();
        {
            let mut apply = |tn: &node::TreeNode<M::Cell>| -> Option<Rect> {
                if !self.is_vertex_movable(&*model, tn.cell) {
                    return vertex_bounds(&*model, tn.cell, parent);
                }
                let placed = set_vertex_location(&mut *model, tn.cell, parent, tn.x, tn.y)?;
                if options.resize_parent {
                    let mut cur = model.parent(tn.cell);
                    while let Some(p) = cur {
                        changed_groups.insert(p);
                        if p == parent {
                            break;
                        }
                        cur = model.parent(p);
                    }
                }
                Some(placed)
            };

            let bounds = place::resolve(
                &mut forest,
                tree_root,
                (anchor.x, anchor.y),
                options.horizontal,
                &mut apply,
            );

            if let Some(b) = bounds {
                let dx = if b.x < 0.0 { (anchor.x - b.x).abs() } else { 0.0 };
                let dy = if b.y < 0.0 { (anchor.y - b.y).abs() } else { 0.0 };
                if dx != 0.0 || dy != 0.0 {
                    place::translate(&mut forest, tree_root, dx, dy, &mut apply);
                }
            }
        }

        if options.resize_parent && !changed_groups.is_empty() {
            let groups: Vec<M::Cell> = changed_groups.into_iter().collect();
            arrange_groups(&mut *model, &groups, options.group_padding());

            if options.maintain_parent_location {
                if let (Some((x, y)), Some(g)) = (parent_origin, model.geometry(parent)) {
                    model.set_geometry(parent, Rect { x, y, ..g });
                }
            }
        }

        // Routing reads the final vertex bounds.
        if options.edge_routing {
            route::route_edges(&mut *model, &forest, tree_root, parent, options);
        }

        tracing::debug!(
            nodes = forest.len(),
            elapsed = ?started.elapsed(),
            "compact tree layout"
        );
    }
}

/// Runs a [`CompactTreeLayout`] with `options` on the children of `parent`.
pub fn layout<M: GraphModel>(
    model: &mut M,
    parent: M::Cell,
    root: Option<M::Cell>,
    options: &CompactTreeOptions,
) {
    CompactTreeLayout::new(options.clone()).execute(model, parent, root);
}
