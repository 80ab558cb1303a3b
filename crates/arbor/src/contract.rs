//! Operations every layout needs from the model.
//!
//! Layouts work in the coordinate space of the *layout parent*: vertices nested in groups
//! below it are reported with the group origins added, and written back with them removed.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::graph::{GraphModel, Point, Rect};

/// A layout algorithm.
///
/// `execute` lays out the descendants of `parent` inside a single model update. It never
/// fails: when there is nothing to lay out it returns without touching the model.
pub trait Layout {
    fn execute<M: GraphModel>(&self, model: &mut M, parent: M::Cell, root: Option<M::Cell>);

    fn is_vertex_ignored<M: GraphModel>(&self, model: &M, vertex: M::Cell) -> bool {
        is_vertex_ignored(model, vertex)
    }

    fn is_vertex_movable<M: GraphModel>(&self, model: &M, vertex: M::Cell) -> bool {
        model.is_movable(vertex)
    }

    fn is_edge_ignored<M: GraphModel>(&self, model: &M, edge: M::Cell) -> bool {
        is_edge_ignored(model, edge)
    }
}

/// Not a vertex, or not visible.
pub fn is_vertex_hidden<M: GraphModel>(model: &M, vertex: M::Cell) -> bool {
    !model.is_vertex(vertex) || !model.is_visible(vertex)
}

/// Hidden, or without any (non-loop) connection.
pub fn is_vertex_ignored<M: GraphModel>(model: &M, vertex: M::Cell) -> bool {
    is_vertex_hidden(model, vertex) || model.connections(vertex, None).is_empty()
}

pub fn is_edge_ignored<M: GraphModel>(model: &M, edge: M::Cell) -> bool {
    !model.is_edge(edge)
        || !model.is_visible(edge)
        || model.terminal(edge, true).is_none()
        || model.terminal(edge, false).is_none()
}

/// Sum of the origins of `parent` and its ancestors below `layout_parent`.
///
/// Zero when `parent` is not inside `layout_parent`.
pub fn parent_offset<M: GraphModel>(
    model: &M,
    parent: M::Cell,
    layout_parent: M::Cell,
) -> Point {
    let mut offset = Point::default();
    if !model.is_ancestor(layout_parent, parent) {
        return offset;
    }
    let mut cur = Some(parent);
    while let Some(c) = cur {
        if c == layout_parent {
            break;
        }
        if let Some(g) = model.geometry(c) {
            offset.x += g.x;
            offset.y += g.y;
        }
        cur = model.parent(c);
    }
    offset
}

/// Bounds of `cell` in layout-parent space.
pub fn vertex_bounds<M: GraphModel>(
    model: &M,
    cell: M::Cell,
    layout_parent: M::Cell,
) -> Option<Rect> {
    let g = model.geometry(cell)?;
    match model.parent(cell) {
        Some(p) if p != layout_parent => {
            let o = parent_offset(model, p, layout_parent);
            Some(g.translated(o.x, o.y))
        }
        _ => Some(g),
    }
}

/// Moves `cell` so its top-left lands at `(x, y)` in layout-parent space.
///
/// Returns the new bounds in layout-parent space; the model is only touched when the
/// location actually changes.
pub fn set_vertex_location<M: GraphModel>(
    model: &mut M,
    cell: M::Cell,
    layout_parent: M::Cell,
    x: f64,
    y: f64,
) -> Option<Rect> {
    let g = model.geometry(cell)?;
    let result = Rect::new(x, y, g.width, g.height);

    let (mut lx, mut ly) = (x, y);
    match model.parent(cell) {
        Some(p) if p != layout_parent => {
            let o = parent_offset(model, p, layout_parent);
            lx -= o.x;
            ly -= o.y;
        }
        _ => {}
    }

    if g.x != lx || g.y != ly {
        model.set_geometry(cell, Rect { x: lx, y: ly, ..g });
    }
    Some(result)
}

/// Padding applied around children when a group is resized to fit them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupPadding {
    pub border: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Resizes each group to enclose its child vertices plus padding, deepest groups first.
///
/// Children keep their absolute position: the group origin moves and the children are
/// shifted back by the same amount.
pub fn arrange_groups<M: GraphModel>(model: &mut M, groups: &[M::Cell], padding: GroupPadding) {
    let mut ordered: Vec<(Vec<usize>, M::Cell)> =
        groups.iter().map(|&g| (model.cell_path(g), g)).collect();
    ordered.sort_by(|a, b| a.0.cmp(&b.0));

    for (_, group) in ordered.into_iter().rev() {
        let Some(geo) = model.geometry(group) else {
            continue;
        };
        let children = model.child_vertices(group);
        let Some(bounds) = Rect::union_all(children.iter().filter_map(|&c| model.geometry(c)))
        else {
            continue;
        };
        if bounds.width <= 0.0 || bounds.height <= 0.0 {
            continue;
        }

        let left = padding.border + padding.left;
        let top = padding.border + padding.top;
        let resized = Rect::new(
            geo.x + bounds.x - left,
            geo.y + bounds.y - top,
            bounds.width + left + padding.border + padding.right,
            bounds.height + top + padding.border + padding.bottom,
        );
        tracing::trace!(?group, ?resized, "resizing group to fit children");
        model.set_geometry(group, resized);
        model.move_cells(&children, left - bounds.x, top - bounds.y);
    }
}

/// Scoped model transaction: `begin_update` on creation, `end_update` on drop.
///
/// Dropping also happens while unwinding, so the update level stays balanced even if a
/// layout step panics.
pub struct UpdateGuard<'a, M: GraphModel> {
    model: &'a mut M,
}

impl<'a, M: GraphModel> UpdateGuard<'a, M> {
    pub fn new(model: &'a mut M) -> Self {
        model.begin_update();
        Self { model }
    }
}

impl<M: GraphModel> Deref for UpdateGuard<'_, M> {
    type Target = M;

    fn deref(&self) -> &M {
        self.model
    }
}

impl<M: GraphModel> DerefMut for UpdateGuard<'_, M> {
    fn deref_mut(&mut self) -> &mut M {
        self.model
    }
}

impl<M: GraphModel> Drop for UpdateGuard<'_, M> {
    fn drop(&mut self) {
        self.model.end_update();
    }
}

/// Cooperative stop switch shared between a running layout and whoever wants to stop it.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
