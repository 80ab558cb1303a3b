//! JSON interchange form of a [`Diagram`].
//!
//! The root cell and the default layer are implicit: cells without a `parent` land on the
//! default layer (layers always hang off the root). Edges may reference vertices declared later
//! in the document.

use serde::{Deserialize, Serialize};

use super::{CellKind, DEFAULT_LAYER_ID, Diagram, ROOT_ID};
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::model::GraphModel;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagramDocument {
    pub cells: Vec<CellDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellDocument {
    pub id: String,
    pub kind: CellKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub edge_style_enabled: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub visible: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub movable: bool,
}

fn default_true() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

impl Diagram {
    pub fn from_json(s: &str) -> Result<Self> {
        let doc: DiagramDocument = serde_json::from_str(s)?;
        Self::from_document(&doc)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let doc = self.to_document();
        let out = if pretty {
            serde_json::to_string_pretty(&doc)?
        } else {
            serde_json::to_string(&doc)?
        };
        Ok(out)
    }

    pub fn from_document(doc: &DiagramDocument) -> Result<Self> {
        let mut d = Diagram::new();
        let mut edges: Vec<&CellDocument> = Vec::new();

        for c in &doc.cells {
            let cell = match c.kind {
                CellKind::Root => {
                    return Err(Error::RootInDocument { id: c.id.clone() });
                }
                CellKind::Layer => d.insert_layer(c.id.clone())?,
                CellKind::Vertex => {
                    let parent = d.resolve_parent(c.parent.as_deref())?;
                    d.insert_vertex(parent, c.id.clone(), c.geometry.unwrap_or_default())?
                }
                CellKind::Edge => {
                    edges.push(c);
                    continue;
                }
            };
            d.apply_flags(cell, c);
        }

        for c in edges {
            let parent = d.resolve_parent(c.parent.as_deref())?;
            let endpoint = |id: Option<&str>| {
                id.and_then(|id| d.lookup(id))
                    .ok_or_else(|| Error::MissingEndpoint {
                        edge_id: c.id.clone(),
                    })
            };
            let source = endpoint(c.source.as_deref())?;
            let target = endpoint(c.target.as_deref())?;
            let edge = d.insert_edge(parent, c.id.clone(), source, target)?;
            d.cells[edge.index()].points = c.points.clone();
            d.cells[edge.index()].edge_style_enabled = c.edge_style_enabled;
            d.apply_flags(edge, c);
        }

        Ok(d)
    }

    pub fn to_document(&self) -> DiagramDocument {
        let mut cells = Vec::new();
        for (id, c) in self.cells() {
            if id == self.root || id == self.default_parent {
                continue;
            }
            let parent = match c.parent {
                Some(p) if p == self.default_parent || p == self.root => None,
                Some(p) => Some(self.id_of(p).to_string()),
                None => None,
            };
            cells.push(CellDocument {
                id: c.id.clone(),
                kind: c.kind,
                parent,
                geometry: c.geometry,
                source: c.source.map(|s| self.id_of(s).to_string()),
                target: c.target.map(|t| self.id_of(t).to_string()),
                points: c.points.clone(),
                edge_style_enabled: c.edge_style_enabled,
                visible: c.visible,
                movable: c.movable,
            });
        }
        DiagramDocument { cells }
    }

    fn resolve_parent(&self, parent: Option<&str>) -> Result<super::CellId> {
        match parent {
            None => Ok(self.default_parent),
            Some(ROOT_ID) => Err(Error::InvalidParent {
                id: ROOT_ID.to_string(),
            }),
            Some(DEFAULT_LAYER_ID) => Ok(self.default_parent),
            Some(id) => self.require(id),
        }
    }

    fn apply_flags(&mut self, cell: super::CellId, c: &CellDocument) {
        self.set_visible(cell, c.visible);
        if self.is_vertex(cell) || self.is_edge(cell) {
            self.set_movable(cell, c.movable);
        }
    }
}
