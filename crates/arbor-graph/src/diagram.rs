//! In-memory diagram model.
//!
//! A `Diagram` is a tree of cells (root → layers → vertices, with edges attached anywhere in
//! the hierarchy). Geometry is stored relative to the parent cell's origin. Cell handles are
//! interned integers; the string ids only matter at the interchange boundary.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::model::GraphModel;

mod changes;
mod document;

pub use changes::{Change, ChangeSet};
pub use document::{CellDocument, DiagramDocument};

pub const ROOT_ID: &str = "0";
pub const DEFAULT_LAYER_ID: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u32);

impl CellId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Root,
    Layer,
    Vertex,
    Edge,
}

#[derive(Debug, Clone)]
pub struct Cell {
    id: String,
    kind: CellKind,
    parent: Option<CellId>,
    children: Vec<CellId>,
    geometry: Option<Rect>,
    source: Option<CellId>,
    target: Option<CellId>,
    // Edges that use this cell as a terminal.
    edges: Vec<CellId>,
    points: Option<Vec<Point>>,
    edge_style_enabled: bool,
    visible: bool,
    movable: bool,
}

impl Cell {
    fn new(id: String, kind: CellKind, parent: Option<CellId>) -> Self {
        Self {
            id,
            kind,
            parent,
            children: Vec::new(),
            geometry: None,
            source: None,
            target: None,
            edges: Vec::new(),
            points: None,
            edge_style_enabled: true,
            visible: true,
            movable: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn parent(&self) -> Option<CellId> {
        self.parent
    }

    pub fn children(&self) -> &[CellId] {
        &self.children
    }

    pub fn geometry(&self) -> Option<Rect> {
        self.geometry
    }

    pub fn source(&self) -> Option<CellId> {
        self.source
    }

    pub fn target(&self) -> Option<CellId> {
        self.target
    }

    pub fn points(&self) -> Option<&[Point]> {
        self.points.as_deref()
    }

    pub fn edge_style_enabled(&self) -> bool {
        self.edge_style_enabled
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn movable(&self) -> bool {
        self.movable
    }
}

#[derive(Debug, Clone)]
pub struct Diagram {
    cells: Vec<Cell>,
    index: FxHashMap<String, CellId>,
    root: CellId,
    default_parent: CellId,

    update_level: usize,
    pending: Vec<Change>,
    history: Vec<ChangeSet>,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagram {
    /// A diagram holding only the root cell and its default layer.
    pub fn new() -> Self {
        let mut d = Self {
            cells: Vec::new(),
            index: FxHashMap::default(),
            root: CellId(0),
            default_parent: CellId(0),
            update_level: 0,
            pending: Vec::new(),
            history: Vec::new(),
        };
        d.root = d.push_cell(Cell::new(ROOT_ID.to_string(), CellKind::Root, None));
        d.default_parent = d.push_cell(Cell::new(
            DEFAULT_LAYER_ID.to_string(),
            CellKind::Layer,
            Some(d.root),
        ));
        d
    }

    pub fn root(&self) -> CellId {
        self.root
    }

    pub fn default_parent(&self) -> CellId {
        self.default_parent
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, cell: CellId) -> &Cell {
        &self.cells[cell.index()]
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, c)| (CellId(idx as u32), c))
    }

    pub fn lookup(&self, id: &str) -> Option<CellId> {
        self.index.get(id).copied()
    }

    pub fn require(&self, id: &str) -> Result<CellId> {
        self.lookup(id).ok_or_else(|| Error::UnknownCell { id: id.to_string() })
    }

    pub fn id_of(&self, cell: CellId) -> &str {
        &self.cells[cell.index()].id
    }

    pub fn insert_layer(&mut self, id: impl Into<String>) -> Result<CellId> {
        let id = id.into();
        self.ensure_unique(&id)?;
        let root = self.root;
        Ok(self.push_cell(Cell::new(id, CellKind::Layer, Some(root))))
    }

    pub fn insert_vertex(
        &mut self,
        parent: CellId,
        id: impl Into<String>,
        geometry: Rect,
    ) -> Result<CellId> {
        let id = id.into();
        self.ensure_unique(&id)?;
        self.ensure_container(parent)?;
        let mut cell = Cell::new(id, CellKind::Vertex, Some(parent));
        cell.geometry = Some(geometry);
        Ok(self.push_cell(cell))
    }

    pub fn insert_edge(
        &mut self,
        parent: CellId,
        id: impl Into<String>,
        source: CellId,
        target: CellId,
    ) -> Result<CellId> {
        let id = id.into();
        self.ensure_unique(&id)?;
        self.ensure_container(parent)?;
        for end in [source, target] {
            if self.cells.get(end.index()).map(|c| c.kind) != Some(CellKind::Vertex) {
                return Err(Error::MissingEndpoint { edge_id: id });
            }
        }

        let mut cell = Cell::new(id, CellKind::Edge, Some(parent));
        cell.source = Some(source);
        cell.target = Some(target);
        let edge = self.push_cell(cell);
        self.cells[source.index()].edges.push(edge);
        if target != source {
            self.cells[target.index()].edges.push(edge);
        }
        Ok(edge)
    }

    pub fn set_movable(&mut self, cell: CellId, movable: bool) {
        self.cells[cell.index()].movable = movable;
    }

    pub fn set_visible(&mut self, cell: CellId, visible: bool) {
        self.cells[cell.index()].visible = visible;
    }

    /// Geometry of `cell` in absolute diagram coordinates.
    pub fn absolute_geometry(&self, cell: CellId) -> Option<Rect> {
        let mut g = self.cells[cell.index()].geometry?;
        let mut cur = self.cells[cell.index()].parent;
        while let Some(p) = cur {
            if let Some(pg) = self.cells[p.index()].geometry {
                g = g.translated(pg.x, pg.y);
            }
            cur = self.cells[p.index()].parent;
        }
        Some(g)
    }

    pub fn update_level(&self) -> usize {
        self.update_level
    }

    /// Change sets committed so far, one per outermost update.
    pub fn history(&self) -> &[ChangeSet] {
        &self.history
    }

    pub fn take_history(&mut self) -> Vec<ChangeSet> {
        std::mem::take(&mut self.history)
    }

    fn ensure_unique(&self, id: &str) -> Result<()> {
        if self.index.contains_key(id) {
            return Err(Error::DuplicateId { id: id.to_string() });
        }
        Ok(())
    }

    fn ensure_container(&self, parent: CellId) -> Result<()> {
        match self.cells.get(parent.index()) {
            None => Err(Error::UnknownCell {
                id: format!("#{}", parent.index()),
            }),
            Some(c) if c.kind == CellKind::Edge => Err(Error::InvalidParent { id: c.id.clone() }),
            Some(_) => Ok(()),
        }
    }

    fn push_cell(&mut self, cell: Cell) -> CellId {
        let id = CellId(self.cells.len() as u32);
        self.index.insert(cell.id.clone(), id);
        if let Some(p) = cell.parent {
            self.cells[p.index()].children.push(id);
        }
        self.cells.push(cell);
        id
    }

    fn record(&mut self, change: Change) {
        if self.update_level == 0 {
            self.history.push(ChangeSet {
                changes: vec![change],
            });
        } else {
            self.pending.push(change);
        }
    }
}

impl GraphModel for Diagram {
    type Cell = CellId;

    fn is_vertex(&self, cell: CellId) -> bool {
        self.cells[cell.index()].kind == CellKind::Vertex
    }

    fn is_edge(&self, cell: CellId) -> bool {
        self.cells[cell.index()].kind == CellKind::Edge
    }

    fn is_visible(&self, cell: CellId) -> bool {
        self.cells[cell.index()].visible
    }

    fn is_movable(&self, cell: CellId) -> bool {
        self.cells[cell.index()].movable
    }

    fn parent(&self, cell: CellId) -> Option<CellId> {
        self.cells[cell.index()].parent
    }

    fn children(&self, cell: CellId) -> Vec<CellId> {
        self.cells[cell.index()].children.clone()
    }

    fn incident_edges(&self, cell: CellId) -> Vec<CellId> {
        self.cells[cell.index()].edges.clone()
    }

    fn terminal(&self, edge: CellId, source: bool) -> Option<CellId> {
        let c = &self.cells[edge.index()];
        if source { c.source } else { c.target }
    }

    fn geometry(&self, cell: CellId) -> Option<Rect> {
        self.cells[cell.index()].geometry
    }

    fn set_geometry(&mut self, cell: CellId, geometry: Rect) {
        let previous = self.cells[cell.index()].geometry.replace(geometry);
        self.record(Change::Geometry {
            cell,
            previous,
            current: geometry,
        });
    }

    fn set_edge_points(&mut self, edge: CellId, points: Option<Vec<Point>>) {
        let previous = std::mem::replace(&mut self.cells[edge.index()].points, points.clone());
        if previous == points {
            return;
        }
        self.record(Change::EdgePoints {
            cell: edge,
            previous,
            current: points,
        });
    }

    fn set_edge_style_enabled(&mut self, edge: CellId, enabled: bool) {
        let slot = &mut self.cells[edge.index()].edge_style_enabled;
        if *slot == enabled {
            return;
        }
        *slot = enabled;
        self.record(Change::EdgeStyle {
            cell: edge,
            enabled,
        });
    }

    fn begin_update(&mut self) {
        self.update_level += 1;
    }

    fn end_update(&mut self) {
        self.update_level = self.update_level.saturating_sub(1);
        if self.update_level == 0 && !self.pending.is_empty() {
            let changes = std::mem::take(&mut self.pending);
            self.history.push(ChangeSet { changes });
        }
    }

    fn cell_path(&self, cell: CellId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut cur = cell;
        while let Some(p) = self.cells[cur.index()].parent {
            let idx = self.cells[p.index()]
                .children
                .iter()
                .position(|&c| c == cur)
                .unwrap_or(0);
            path.push(idx);
            cur = p;
        }
        path.reverse();
        path
    }
}
