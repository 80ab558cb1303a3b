#![forbid(unsafe_code)]

//! Automatic layout for diagram models.
//!
//! Two algorithms are provided: a compact tidy-tree layout that packs subtrees by their
//! silhouettes, and a force-directed organic layout. Both work against any model
//! implementing [`graph::GraphModel`] and mutate it inside a single update.

pub use arbor_graph as graph;

pub mod contract;
pub mod organic;
pub mod tree;

pub use contract::{CancelFlag, Layout};
pub use organic::{OrganicLayout, OrganicOptions};
pub use tree::{CompactTreeLayout, CompactTreeOptions};

use graph::GraphModel;

#[derive(Debug, Clone)]
pub enum Algorithm {
    /// Tidy tree with contour packing and optional edge jetties.
    CompactTree(CompactTreeOptions),
    /// Force-directed layout for arbitrary topology.
    Organic(OrganicOptions),
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::CompactTree(CompactTreeOptions::default())
    }
}

/// Lays out the children of `parent`. `root` is only used by the tree layout.
pub fn execute<M: GraphModel>(
    model: &mut M,
    parent: M::Cell,
    root: Option<M::Cell>,
    algorithm: &Algorithm,
) {
    match algorithm {
        Algorithm::CompactTree(opts) => tree::layout(model, parent, root, opts),
        Algorithm::Organic(opts) => organic::layout(model, parent, opts),
    }
}
