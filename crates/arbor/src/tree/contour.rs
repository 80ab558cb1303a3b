//! Subtree silhouettes and how they pack.
//!
//! A contour is a pair of polylines made of relative segments `(dx, dy)`: `dx` runs along the
//! growth axis, `dy` across it. The upper line traces the top edge of a subtree; the lower line
//! traces its bottom edge extended by the sibling spacing. Packing two siblings means walking
//! the lower line of the left one against the upper line of the right one and finding the
//! smallest across-axis shift that keeps the first above the second everywhere.

use super::node::{Forest, LineId, NodeId};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Line {
    pub dx: f64,
    pub dy: f64,
    pub next: Option<LineId>,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Contour {
    pub upper_head: Option<LineId>,
    pub upper_tail: Option<LineId>,
    pub lower_head: Option<LineId>,
    pub lower_tail: Option<LineId>,
}

impl<C: Copy> Forest<C> {
    pub(crate) fn line(&self, id: LineId) -> Line {
        self.lines[id.0]
    }

    fn create_line(&mut self, dx: f64, dy: f64, next: Option<LineId>) -> LineId {
        let id = LineId(self.lines.len());
        self.lines.push(Line { dx, dy, next });
        id
    }

    /// Trivial contour of a childless node, padded by twice the node distance.
    pub(crate) fn layout_leaf(&mut self, node: NodeId, node_distance: f64) {
        let dist = 2.0 * node_distance;
        let (width, height) = {
            let n = self.node(node);
            (n.width, n.height)
        };
        let upper = self.create_line(height + dist, 0.0, None);
        let lower_tail = self.create_line(0.0, -width - dist, None);
        let lower_head = self.create_line(height + dist, 0.0, Some(lower_tail));
        self.node_mut(node).contour = Contour {
            upper_head: Some(upper),
            upper_tail: Some(upper),
            lower_head: Some(lower_head),
            lower_tail: Some(lower_tail),
        };
    }

    /// Merges the contours of `node`'s children in sibling order, recording each sibling's
    /// offset from the previous one. Returns the across-axis extent of the packed children.
    pub(crate) fn join(&mut self, node: NodeId, first: NodeId, node_distance: f64) -> f64 {
        let dist = 2.0 * node_distance;
        let mut contour = self.node(first).contour;
        let mut h = self.node(first).width + dist;
        let mut sum = h;

        let mut child = self.node(first).next;
        while let Some(c) = child {
            let other = self.node(c).contour;
            let d = self.merge(&mut contour, &other);
            let n = self.node_mut(c);
            n.offset_y = d + h;
            n.offset_x = 0.0;
            h = n.width + dist;
            sum += d + h;
            child = n.next;
        }

        self.node_mut(node).contour = contour;
        sum
    }

    /// Hangs the packed children below `node`: prepends the node's own extent and the
    /// level-distance run to the merged contour, and centres the children block on the node.
    pub(crate) fn attach_parent(
        &mut self,
        node: NodeId,
        first: NodeId,
        height: f64,
        node_distance: f64,
        level_distance: f64,
    ) {
        let x = level_distance;
        let (width, along) = {
            let n = self.node(node);
            (n.width, n.height)
        };
        let y2 = (height - width) / 2.0 - node_distance;
        let y1 = y2 + width + 2.0 * node_distance - height;

        {
            let c = self.node_mut(first);
            c.offset_x = x + along;
            c.offset_y = y1;
        }

        let contour = self.node(node).contour;
        let upper = self.create_line(x, y1, contour.upper_head);
        let upper = self.create_line(along, 0.0, Some(upper));
        let lower = self.create_line(x, y2, contour.lower_head);
        let lower = self.create_line(along, 0.0, Some(lower));

        let c = &mut self.node_mut(node).contour;
        c.upper_head = Some(upper);
        c.lower_head = Some(lower);
    }

    /// Packs `p2` against `p1` and splices the result into `p1`. Returns the across-axis shift
    /// `p2` needs on top of the default sibling spacing.
    pub(crate) fn merge(&mut self, p1: &mut Contour, p2: &Contour) -> f64 {
        let mut x = 0.0;
        let mut y = 0.0;
        let mut total = 0.0;
        let mut upper = p1.lower_head;
        let mut lower = p2.upper_head;

        while let (Some(l), Some(u)) = (lower, upper) {
            let lo = self.line(l);
            let up = self.line(u);
            let d = offset(x, y, lo.dx, lo.dy, up.dx, up.dy);
            y += d;
            total += d;

            if x + lo.dx <= up.dx {
                x += lo.dx;
                y += lo.dy;
                lower = lo.next;
            } else {
                x -= up.dx;
                y -= up.dy;
                upper = up.next;
            }
        }

        if let Some(l) = lower {
            if let Some(tail) = p1.upper_tail {
                let b = self.bridge(tail, 0.0, 0.0, l, x, y);
                p1.upper_tail = if self.line(b).next.is_some() {
                    p2.upper_tail
                } else {
                    Some(b)
                };
            }
            p1.lower_tail = p2.lower_tail;
        } else if let (Some(u), Some(tail)) = (upper, p2.lower_tail) {
            let b = self.bridge(tail, x, y, u, 0.0, 0.0);
            if self.line(b).next.is_none() {
                p1.lower_tail = Some(b);
            }
        }

        p1.lower_head = p2.lower_head;
        total
    }

    /// Links `line1` to the remainder of `line2` with a segment covering exactly the residual
    /// gap between the two walk positions.
    fn bridge(
        &mut self,
        line1: LineId,
        x1: f64,
        y1: f64,
        line2: LineId,
        x2: f64,
        y2: f64,
    ) -> LineId {
        let l2 = self.line(line2);
        let dx = x2 + l2.dx - x1;
        let dy = if l2.dx == 0.0 {
            l2.dy
        } else {
            dx * l2.dy / l2.dx
        };
        let r = self.create_line(dx, dy, l2.next);
        let link = self.create_line(0.0, y2 + l2.dy - dy - y1, Some(r));
        self.lines[line1.0].next = Some(link);
        r
    }
}

/// Minimum across-axis shift separating segment `a` (starting at `(p1, p2)`) from segment `b`
/// (starting at the origin). Zero when the segments do not share any along-axis extent.
pub(crate) fn offset(p1: f64, p2: f64, a1: f64, a2: f64, b1: f64, b2: f64) -> f64 {
    if b1 <= p1 || p1 + a1 <= 0.0 {
        return 0.0;
    }

    let t = b1 * a2 - a1 * b2;
    let d = if t > 0.0 {
        if p1 < 0.0 {
            p1 * a2 / a1 - p2
        } else if p1 > 0.0 {
            p1 * b2 / b1 - p2
        } else {
            -p2
        }
    } else if b1 < p1 + a1 {
        b2 - (p2 + (b1 - p1) * a2 / a1)
    } else if b1 > p1 + a1 {
        (a1 + p1) * b2 / b1 - (p2 + a2)
    } else {
        b2 - (p2 + a2)
    };

    d.max(0.0)
}
