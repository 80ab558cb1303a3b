//! Force-directed ("organic") layout.
//!
//! Every pair of movable vertices repels, every connected pair attracts, and a linearly
//! cooling temperature caps how far a vertex may move per iteration. Vertices are treated as
//! discs with half their smaller side as radius.

mod model;
mod rng;

use serde::{Deserialize, Serialize};

use crate::contract::{CancelFlag, Layout, UpdateGuard, vertex_bounds};
use crate::graph::{GraphModel, Point, Rect};
use model::ForceModel;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrganicOptions {
    /// Ideal edge length. Values below `0.001` are raised to it.
    pub force_constant: f64,
    /// Repulsion gaps below this are clamped to it.
    pub min_distance_limit: f64,
    /// Pairs further apart than this do not repel.
    pub max_distance_limit: f64,
    pub initial_temp: f64,
    /// Defaults to `20 * sqrt(n)` when unset.
    pub max_iterations: Option<usize>,
    /// Offset the result by the input bounding box origin.
    pub use_input_origin: bool,
    pub disable_edge_style: bool,
    pub reset_edges: bool,
    /// Seed for the overlap jitter. Runs are only reproducible when set.
    pub random_seed: Option<u64>,
    #[serde(skip)]
    pub cancel: CancelFlag,
}

impl Default for OrganicOptions {
    fn default() -> Self {
        Self {
            force_constant: 50.0,
            min_distance_limit: 2.0,
            max_distance_limit: 500.0,
            initial_temp: 200.0,
            max_iterations: None,
            use_input_origin: true,
            disable_edge_style: true,
            reset_edges: true,
            random_seed: None,
            cancel: CancelFlag::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrganicLayout {
    pub options: OrganicOptions,
}

impl OrganicLayout {
    pub fn new(options: OrganicOptions) -> Self {
        Self { options }
    }

    /// Stops a running `execute` at the next checkpoint. Nothing is written back.
    pub fn cancel(&self) {
        self.options.cancel.cancel();
    }
}

impl Layout for OrganicLayout {
    fn execute<M: GraphModel>(&self, model: &mut M, parent: M::Cell, _root: Option<M::Cell>) {
        let started = std::time::Instant::now();
        let options = &self.options;
        let mut model = UpdateGuard::new(model);

        let mut sim = ForceModel::seed(self, &mut *model, parent, options);
        if sim.len() == 0 {
            tracing::debug!(?parent, "no vertices to lay out");
            return;
        }

        let origin = if options.use_input_origin {
            Rect::union_all(
                sim.cells
                    .iter()
                    .filter_map(|&c| vertex_bounds(&*model, c, parent)),
            )
            .map(|b| Point::new(b.x, b.y))
        } else {
            None
        };

        if !sim.run(&options.cancel) {
            tracing::debug!(iteration = sim.iteration, "organic layout cancelled");
            return;
        }

        sim.write_back(&mut *model, parent, origin);

        tracing::debug!(
            vertices = sim.len(),
            iterations = sim.params().max_iterations,
            elapsed = ?started.elapsed(),
            "organic layout"
        );
    }
}

/// Runs an [`OrganicLayout`] with `options` on the children of `parent`.
pub fn layout<M: GraphModel>(model: &mut M, parent: M::Cell, options: &OrganicOptions) {
    OrganicLayout::new(options.clone()).execute(model, parent, None);
}
