//! Orthogonal "jetty" waypoints for tree edges.
//!
//! Every parent spreads the anchors of its outgoing edges evenly along the border facing its
//! children. Each edge leaves its anchor, runs out a short jetty, turns towards the child's
//! centre line and enters it head-on. Jetties grow for the outer children and shrink again
//! past the middle so neighbouring edges do not run on top of each other.

use super::CompactTreeOptions;
use super::node::{Forest, NodeId};
use crate::contract::{parent_offset, vertex_bounds};
use crate::graph::{GraphModel, Point};

pub(crate) fn route_edges<M: GraphModel>(
    model: &mut M,
    forest: &Forest<M::Cell>,
    root: NodeId,
    parent: M::Cell,
    options: &CompactTreeOptions,
) {
    for id in forest.pre_order(root) {
        let children = forest.children(id);
        if children.is_empty() {
            continue;
        }
        route_outgoing(model, forest, id, &children, parent, options);
    }
}

fn route_outgoing<M: GraphModel>(
    model: &mut M,
    forest: &Forest<M::Cell>,
    node: NodeId,
    children: &[NodeId],
    parent: M::Cell,
    options: &CompactTreeOptions,
) {
    let sep = options.pref_hoz_edge_sep;
    let horizontal = options.horizontal;
    let cell = forest.node(node).cell;
    let Some(pb) = vertex_bounds(model, cell, parent) else {
        return;
    };

    let mut sorted: Vec<_> = children.iter().map(|&c| forest.node(c)).collect();
    if horizontal {
        sorted.sort_by(|a, b| a.y.total_cmp(&b.y));
    } else {
        sorted.sort_by(|a, b| a.x.total_cmp(&b.x));
    }

    let count = sorted.len();
    let half = count as f64 / 2.0;
    let (available, mut along) = anchor_run(forest.node(node).width, count, sep);
    let spacing = available / count as f64;
    let mut jetty = options.min_edge_jetty - options.pref_vert_edge_off;

    for (j, child) in sorted.into_iter().enumerate() {
        let Some(cb) = vertex_bounds(model, child.cell, parent) else {
            continue;
        };
        for edge in model.edges_between(cell, child.cell, false) {
            let mut points = if horizontal {
                let x = pb.right();
                let y = pb.y + along;
                vec![
                    Point::new(x, y),
                    Point::new(x + jetty, y),
                    Point::new(x + jetty, cb.y + cb.height / 2.0),
                ]
            } else {
                let x = pb.x + along;
                let y = pb.bottom();
                vec![
                    Point::new(x, y),
                    Point::new(x, y + jetty),
                    Point::new(cb.x + cb.width / 2.0, y + jetty),
                ]
            };
            // Points are stored relative to the edge's own parent.
            if let Some(ep) = model.parent(edge).filter(|&ep| ep != parent) {
                let o = parent_offset(model, ep, parent);
                for pt in &mut points {
                    pt.x -= o.x;
                    pt.y -= o.y;
                }
            }
            tracing::trace!(?edge, ?points, "routing tree edge");
            model.set_edge_points(edge, Some(points));
        }

        let j = j as f64;
        if j < half {
            jetty += options.pref_vert_edge_off;
        } else if j > half {
            jetty -= options.pref_vert_edge_off;
        }
        along += spacing;
    }
}

/// Length of border available to `count` anchors and the offset of the first one.
///
/// The run is inset by `sep` at both ends when the border is wide enough to afford it.
fn anchor_run(width: f64, count: usize, sep: f64) -> (f64, f64) {
    let required = (count + 1) as f64 * sep;
    let inset = width > required + 2.0 * sep;
    let available = if inset { width - 2.0 * sep } else { width };
    let spacing = available / count as f64;
    let first = spacing / 2.0 + if inset { sep } else { 0.0 };
    (available, first)
}
