#![forbid(unsafe_code)]

//! Graph-model interface and in-memory diagram model used by `arbor`.
//!
//! The layouts only ever talk to a model through [`GraphModel`]; [`Diagram`] is the reference
//! implementation used by the CLI and the test suites.

pub mod diagram;
pub mod error;
pub mod geometry;
pub mod model;

pub use diagram::{
    Cell, CellDocument, CellId, CellKind, Change, ChangeSet, DEFAULT_LAYER_ID, Diagram,
    DiagramDocument, ROOT_ID,
};
pub use error::{Error, Result};
pub use geometry::{Point, Rect};
pub use model::GraphModel;
