//! The graph-model interface consumed by the layouts.
//!
//! Implementors supply a handful of topology and geometry primitives; the derived queries
//! (`edges`, `connections`, `find_tree_roots`, ...) are provided methods that a model may
//! override with faster versions.

use std::fmt::Debug;
use std::hash::Hash;

use crate::geometry::{Point, Rect};

pub trait GraphModel {
    /// Opaque, cheap cell handle. Must stay stable for the duration of a layout call.
    type Cell: Copy + Eq + Hash + Debug;

    fn is_vertex(&self, cell: Self::Cell) -> bool;

    fn is_edge(&self, cell: Self::Cell) -> bool;

    fn is_visible(&self, _cell: Self::Cell) -> bool {
        true
    }

    fn is_movable(&self, _cell: Self::Cell) -> bool {
        true
    }

    fn parent(&self, cell: Self::Cell) -> Option<Self::Cell>;

    /// Children in model order.
    fn children(&self, cell: Self::Cell) -> Vec<Self::Cell>;

    /// Every edge with `cell` as source or target (loops listed once).
    fn incident_edges(&self, cell: Self::Cell) -> Vec<Self::Cell>;

    fn terminal(&self, edge: Self::Cell, source: bool) -> Option<Self::Cell>;

    /// Geometry relative to the parent's origin.
    fn geometry(&self, cell: Self::Cell) -> Option<Rect>;

    fn set_geometry(&mut self, cell: Self::Cell, geometry: Rect);

    fn set_edge_points(&mut self, edge: Self::Cell, points: Option<Vec<Point>>);

    fn set_edge_style_enabled(&mut self, edge: Self::Cell, enabled: bool);

    fn begin_update(&mut self);

    fn end_update(&mut self);

    /// True if `child` is `parent` or lies anywhere below it.
    fn is_ancestor(&self, parent: Self::Cell, child: Self::Cell) -> bool {
        let mut cur = Some(child);
        while let Some(c) = cur {
            if c == parent {
                return true;
            }
            cur = self.parent(c);
        }
        false
    }

    /// Child indices from the root down to `cell`. Orders cells by document position.
    fn cell_path(&self, cell: Self::Cell) -> Vec<usize> {
        let mut path = Vec::new();
        let mut cur = cell;
        while let Some(p) = self.parent(cur) {
            let idx = self
                .children(p)
                .iter()
                .position(|&c| c == cur)
                .unwrap_or(0);
            path.push(idx);
            cur = p;
        }
        path.reverse();
        path
    }

    fn child_vertices(&self, parent: Self::Cell) -> Vec<Self::Cell> {
        self.children(parent)
            .into_iter()
            .filter(|&c| self.is_vertex(c))
            .collect()
    }

    /// Edges of `cell`, filtered by direction.
    ///
    /// With a `parent`, only edges whose opposite terminal is a child of `parent` (or any
    /// descendant when `recurse` is set) are returned.
    fn edges(
        &self,
        cell: Self::Cell,
        parent: Option<Self::Cell>,
        incoming: bool,
        outgoing: bool,
        include_loops: bool,
        recurse: bool,
    ) -> Vec<Self::Cell> {
        let valid_other = |other: Option<Self::Cell>| match parent {
            None => true,
            Some(p) => other.is_some_and(|o| {
                if recurse {
                    self.is_ancestor(p, o)
                } else {
                    self.parent(o) == Some(p)
                }
            }),
        };

        let mut out = Vec::new();
        for edge in self.incident_edges(cell) {
            let source = self.terminal(edge, true);
            let target = self.terminal(edge, false);
            let is_loop = source == target;
            let keep = if is_loop {
                include_loops
            } else {
                (incoming && target == Some(cell) && valid_other(source))
                    || (outgoing && source == Some(cell) && valid_other(target))
            };
            if keep {
                out.push(edge);
            }
        }
        out
    }

    /// Incoming and outgoing edges of `cell`, loops excluded.
    fn connections(&self, cell: Self::Cell, parent: Option<Self::Cell>) -> Vec<Self::Cell> {
        self.edges(cell, parent, true, true, false, false)
    }

    /// The other end of `edge` as seen from `terminal`; `None` for loops and dangling edges.
    fn opposite(&self, edge: Self::Cell, terminal: Self::Cell) -> Option<Self::Cell> {
        let source = self.terminal(edge, true);
        let target = self.terminal(edge, false);
        if source == Some(terminal) && target != Some(terminal) {
            target
        } else if target == Some(terminal) && source != Some(terminal) {
            source
        } else {
            None
        }
    }

    fn edges_between(&self, a: Self::Cell, b: Self::Cell, directed: bool) -> Vec<Self::Cell> {
        self.incident_edges(a)
            .into_iter()
            .filter(|&e| {
                let source = self.terminal(e, true);
                let target = self.terminal(e, false);
                (source == Some(a) && target == Some(b))
                    || (!directed && source == Some(b) && target == Some(a))
            })
            .collect()
    }

    /// Translates every cell with a geometry by `(dx, dy)`.
    fn move_cells(&mut self, cells: &[Self::Cell], dx: f64, dy: f64) {
        for &cell in cells {
            if let Some(g) = self.geometry(cell) {
                self.set_geometry(cell, g.translated(dx, dy));
            }
        }
    }

    /// Children of `parent` that look like tree roots: no incoming edges and at least one
    /// outgoing edge (reversed with `invert`). Falls back to the child with the largest fan
    /// difference. With `isolate`, only edges inside `parent` are counted.
    fn find_tree_roots(&self, parent: Self::Cell, isolate: bool, invert: bool) -> Vec<Self::Cell> {
        let mut roots = Vec::new();
        let mut best = None;
        let mut max_diff = 0i64;

        for cell in self.children(parent) {
            if !self.is_vertex(cell) || !self.is_visible(cell) {
                continue;
            }
            let conns = self.connections(cell, isolate.then_some(parent));
            let mut fan_out = 0i64;
            let mut fan_in = 0i64;
            for c in conns {
                if self.terminal(c, true) == Some(cell) {
                    fan_out += 1;
                } else {
                    fan_in += 1;
                }
            }

            if (invert && fan_out == 0 && fan_in > 0) || (!invert && fan_in == 0 && fan_out > 0) {
                roots.push(cell);
            }

            let diff = if invert {
                fan_in - fan_out
            } else {
                fan_out - fan_in
            };
            if diff > max_diff {
                max_diff = diff;
                best = Some(cell);
            }
        }

        if roots.is_empty() {
            roots.extend(best);
        }
        roots
    }
}
