//! Change records collected while a diagram is being updated.

use super::CellId;
use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Geometry {
        cell: CellId,
        previous: Option<Rect>,
        current: Rect,
    },
    EdgePoints {
        cell: CellId,
        previous: Option<Vec<Point>>,
        current: Option<Vec<Point>>,
    },
    EdgeStyle {
        cell: CellId,
        enabled: bool,
    },
}

impl Change {
    pub fn cell(&self) -> CellId {
        match self {
            Change::Geometry { cell, .. }
            | Change::EdgePoints { cell, .. }
            | Change::EdgeStyle { cell, .. } => *cell,
        }
    }
}

/// Everything mutated inside one outermost `begin_update`/`end_update` pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub changes: Vec<Change>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Cells touched by this change set, in first-touch order.
    pub fn cells(&self) -> Vec<CellId> {
        let mut out: Vec<CellId> = Vec::new();
        for c in &self.changes {
            let cell = c.cell();
            if !out.contains(&cell) {
                out.push(cell);
            }
        }
        out
    }
}
