//! Dense simulation state for one organic layout run.

use std::hash::Hash;

use nalgebra::Vector2;
use rustc_hash::FxHashMap;

use super::OrganicOptions;
use super::rng::XorShift64Star;
use crate::contract::{CancelFlag, Layout, set_vertex_location, vertex_bounds};
use crate::graph::{GraphModel, Point};

/// Minimum displacement length used when normalising a step direction.
const MIN_STEP: f64 = 0.001;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Params {
    pub force_constant: f64,
    pub force_constant_squared: f64,
    pub min_distance_limit: f64,
    pub min_distance_limit_squared: f64,
    pub max_distance_limit: f64,
    pub initial_temp: f64,
    pub max_iterations: usize,
}

impl Params {
    pub(crate) fn new(options: &OrganicOptions, vertex_count: usize) -> Self {
        let force_constant = options.force_constant.max(0.001);
        let max_iterations = options
            .max_iterations
            .unwrap_or_else(|| (20.0 * (vertex_count as f64).sqrt()).ceil() as usize);
        Self {
            force_constant,
            force_constant_squared: force_constant * force_constant,
            min_distance_limit: options.min_distance_limit,
            min_distance_limit_squared: options.min_distance_limit * options.min_distance_limit,
            max_distance_limit: options.max_distance_limit,
            initial_temp: options.initial_temp,
            max_iterations,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ForceModel<C> {
    pub cells: Vec<C>,
    pub location: Vec<Vector2<f64>>,
    disp: Vec<Vector2<f64>>,
    half_size: Vec<Vector2<f64>>,
    radius: Vec<f64>,
    radius_squared: Vec<f64>,
    movable: Vec<bool>,
    neighbours: Vec<Vec<usize>>,
    params: Params,
    pub temperature: f64,
    pub iteration: usize,
    rng: XorShift64Star,
}

impl<C: Copy + Eq + Hash> ForceModel<C> {
    /// Seeds state from the non-ignored child vertices of `parent`.
    ///
    /// Connections of every vertex are reset and/or have their style disabled on the way,
    /// according to `options`.
    pub(crate) fn seed<L, M>(layout: &L, model: &mut M, parent: C, options: &OrganicOptions) -> Self
    where
        L: Layout,
        M: GraphModel<Cell = C>,
    {
        let mut cells = Vec::new();
        let mut bounds = Vec::new();
        for v in model.child_vertices(parent) {
            if layout.is_vertex_ignored(model, v) {
                continue;
            }
            if let Some(b) = vertex_bounds(model, v, parent) {
                cells.push(v);
                bounds.push(b);
            }
        }

        let n = cells.len();
        let index: FxHashMap<C, usize> = cells.iter().enumerate().map(|(i, &c)| (c, i)).collect();

        let mut location = Vec::with_capacity(n);
        let mut half_size = Vec::with_capacity(n);
        let mut radius = Vec::with_capacity(n);
        let mut radius_squared = Vec::with_capacity(n);
        for b in &bounds {
            let center = b.center();
            location.push(Vector2::new(center.x, center.y));
            half_size.push(Vector2::new(b.width / 2.0, b.height / 2.0));
            let r = b.width.min(b.height) / 2.0;
            radius.push(r);
            radius_squared.push(r * r);
        }

        let mut movable = Vec::with_capacity(n);
        let mut neighbours = Vec::with_capacity(n);
        for (i, &v) in cells.iter().enumerate() {
            movable.push(layout.is_vertex_movable(model, v));

            let mut adjacent = Vec::new();
            for edge in model.connections(v, Some(parent)) {
                if options.reset_edges {
                    model.set_edge_points(edge, None);
                }
                if options.disable_edge_style {
                    model.set_edge_style_enabled(edge, false);
                }
                let j = model
                    .opposite(edge, v)
                    .and_then(|o| index.get(&o).copied())
                    .unwrap_or(i);
                adjacent.push(j);
            }
            neighbours.push(adjacent);
        }

        let params = Params::new(options, n);
        Self {
            cells,
            location,
            disp: vec![Vector2::zeros(); n],
            half_size,
            radius,
            radius_squared,
            movable,
            neighbours,
            params,
            temperature: params.initial_temp,
            iteration: 0,
            rng: XorShift64Star::from_seed(options.random_seed),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn params(&self) -> &Params {
        &self.params
    }

    /// Iterates until `max_iterations` is reached. Returns `false` when cancelled.
    pub(crate) fn run(&mut self, cancel: &CancelFlag) -> bool {
        while self.iteration < self.params.max_iterations {
            if cancel.is_cancelled() || !self.step(cancel) {
                return false;
            }
        }
        true
    }

    /// One repulsion/attraction/move/cool round. Returns `false` when cancelled midway.
    pub(crate) fn step(&mut self, cancel: &CancelFlag) -> bool {
        if !self.calc_repulsion(cancel) {
            return false;
        }
        self.calc_attraction();
        self.calc_positions();
        self.reduce_temperature();
        true
    }

    fn calc_repulsion(&mut self, cancel: &CancelFlag) -> bool {
        let n = self.len();
        let p = self.params;
        for i in 0..n {
            if cancel.is_cancelled() {
                return false;
            }
            if !self.movable[i] {
                continue;
            }
            for j in (i + 1)..n {
                if !self.movable[j] {
                    continue;
                }
                let mut delta = self.location[i] - self.location[j];
                if delta.x == 0.0 {
                    delta.x = 0.01 + self.rng.next_f64_unit();
                }
                if delta.y == 0.0 {
                    delta.y = 0.01 + self.rng.next_f64_unit();
                }
                let len = delta.norm();
                let mut gap = len - self.radius[i] - self.radius[j];
                if gap > p.max_distance_limit {
                    continue;
                }
                if gap < p.min_distance_limit {
                    gap = p.min_distance_limit;
                }
                let force = p.force_constant_squared / gap;
                let d = delta / len * force;
                self.disp[i] += d;
                self.disp[j] -= d;
            }
        }
        true
    }

    fn calc_attraction(&mut self) {
        let p = self.params;
        for i in 0..self.len() {
            for k in 0..self.neighbours[i].len() {
                let j = self.neighbours[i][k];
                if i == j || !self.movable[i] || !self.movable[j] {
                    continue;
                }
                let delta = self.location[i] - self.location[j];
                let mut dist_squared =
                    delta.norm_squared() - self.radius_squared[i] - self.radius_squared[j];
                if dist_squared < p.min_distance_limit_squared {
                    dist_squared = p.min_distance_limit_squared;
                }
                let force = dist_squared / p.force_constant;
                let d = delta / dist_squared.sqrt() * force;
                self.disp[i] -= d;
                self.disp[j] += d;
            }
        }
    }

    fn calc_positions(&mut self) {
        for i in 0..self.len() {
            if self.movable[i] {
                let len = self.disp[i].norm().max(MIN_STEP);
                let step = self.disp[i] / len * len.min(self.temperature);
                self.location[i] += step;
            }
            self.disp[i] = Vector2::zeros();
        }
    }

    fn reduce_temperature(&mut self) {
        self.iteration += 1;
        let progress = self.iteration as f64 / self.params.max_iterations as f64;
        self.temperature = (self.params.initial_temp * (1.0 - progress)).max(0.0);
    }

    /// Writes centres back as top-left locations and shifts the movable batch so its minimum
    /// lands at `(1, 1)` plus `origin`.
    pub(crate) fn write_back<M>(&self, model: &mut M, parent: C, origin: Option<Point>)
    where
        M: GraphModel<Cell = C>,
    {
        let mut moved = Vec::new();
        let mut min: Option<Point> = None;
        for (i, &cell) in self.cells.iter().enumerate() {
            if !self.movable[i] {
                continue;
            }
            let top_left = self.location[i] - self.half_size[i];
            let Some(placed) = set_vertex_location(model, cell, parent, top_left.x, top_left.y)
            else {
                continue;
            };
            min = Some(match min {
                Some(m) => Point::new(m.x.min(placed.x), m.y.min(placed.y)),
                None => Point::new(placed.x, placed.y),
            });
            moved.push(cell);
        }

        let min = min.unwrap_or_default();
        let mut dx = 1.0 - min.x;
        let mut dy = 1.0 - min.y;
        if let Some(o) = origin {
            dx += o.x;
            dy += o.y;
        }
        if !moved.is_empty() {
            model.move_cells(&moved, dx, dy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ForceModel;
    use crate::contract::CancelFlag;
    use crate::graph::{Diagram, Rect};
    use crate::organic::{OrganicLayout, OrganicOptions};

    fn triangle() -> Diagram {
        let mut d = Diagram::new();
        let p = d.default_parent();
        let a = d.insert_vertex(p, "a", Rect::new(0.0, 0.0, 40.0, 20.0)).unwrap();
        let b = d.insert_vertex(p, "b", Rect::new(100.0, 0.0, 40.0, 20.0)).unwrap();
        let c = d.insert_vertex(p, "c", Rect::new(50.0, 80.0, 40.0, 20.0)).unwrap();
        d.insert_edge(p, "ab", a, b).unwrap();
        d.insert_edge(p, "bc", b, c).unwrap();
        d.insert_edge(p, "ca", c, a).unwrap();
        d.insert_edge(p, "ab2", a, b).unwrap();
        d
    }

    fn seeded(d: &mut Diagram, options: OrganicOptions) -> ForceModel<crate::graph::CellId> {
        let p = d.default_parent();
        let layout = OrganicLayout::new(options.clone());
        ForceModel::seed(&layout, d, p, &options)
    }

    #[test]
    fn seed_uses_centres_and_half_min_side_radius() {
        let mut d = triangle();
        let options = OrganicOptions {
            random_seed: Some(7),
            ..Default::default()
        };
        let m = seeded(&mut d, options);
        assert_eq!(m.len(), 3);
        assert_eq!(m.location[0].x, 20.0);
        assert_eq!(m.location[0].y, 10.0);
        assert_eq!(m.radius[0], 10.0);
        assert_eq!(m.half_size[1].x, 20.0);
    }

    #[test]
    fn every_parallel_edge_is_a_neighbour_entry() {
        let mut d = triangle();
        let m = seeded(&mut d, OrganicOptions::default());
        let a = d.lookup("a").unwrap();
        let i = m.cells.iter().position(|&c| c == a).unwrap();
        assert_eq!(m.neighbours[i].len(), 3);
    }

    fn pair(edges: usize) -> Diagram {
        let mut d = Diagram::new();
        let p = d.default_parent();
        let a = d.insert_vertex(p, "a", Rect::new(0.0, 0.0, 20.0, 20.0)).unwrap();
        let b = d.insert_vertex(p, "b", Rect::new(100.0, 0.0, 20.0, 20.0)).unwrap();
        for k in 0..edges {
            d.insert_edge(p, format!("ab{k}"), a, b).unwrap();
        }
        d
    }

    #[test]
    fn parallel_edges_add_up_attraction() {
        let options = OrganicOptions {
            random_seed: Some(1),
            ..Default::default()
        };
        let mut single = pair(1);
        let mut single = seeded(&mut single, options.clone());
        single.calc_attraction();
        let mut double = pair(2);
        let mut double = seeded(&mut double, options);
        double.calc_attraction();

        assert!(single.disp[0].x > 0.0);
        assert!((double.disp[0].x - 2.0 * single.disp[0].x).abs() < 1e-9);
        assert!((double.disp[1].x - 2.0 * single.disp[1].x).abs() < 1e-9);
    }

    #[test]
    fn default_iteration_budget_scales_with_sqrt_n() {
        let mut d = triangle();
        let m = seeded(&mut d, OrganicOptions::default());
        // ceil(20 * sqrt(3)) = ceil(34.64)
        assert_eq!(m.params().max_iterations, 35);
    }

    #[test]
    fn temperature_reaches_zero_and_stays_there() {
        let mut d = triangle();
        let options = OrganicOptions {
            random_seed: Some(3),
            max_iterations: Some(10),
            ..Default::default()
        };
        let mut m = seeded(&mut d, options);
        let cancel = CancelFlag::new();
        let mut last = m.temperature;
        while m.iteration < 10 {
            assert!(m.step(&cancel));
            assert!(m.temperature <= last);
            last = m.temperature;
        }
        assert_eq!(m.temperature, 0.0);

        let before = m.location.clone();
        assert!(m.step(&cancel));
        assert_eq!(m.location, before);
    }

    #[test]
    fn displacement_is_bounded_by_temperature() {
        let mut d = triangle();
        let options = OrganicOptions {
            random_seed: Some(11),
            ..Default::default()
        };
        let mut m = seeded(&mut d, options);
        let cancel = CancelFlag::new();
        for _ in 0..5 {
            let temperature = m.temperature;
            let before = m.location.clone();
            m.step(&cancel);
            for (a, b) in before.iter().zip(&m.location) {
                assert!((b - a).norm() <= temperature + 1e-9);
            }
        }
    }

    #[test]
    fn cancelled_flag_stops_the_run() {
        let mut d = triangle();
        let mut m = seeded(&mut d, OrganicOptions::default());
        let cancel = CancelFlag::new();
        cancel.cancel();
        assert!(!m.run(&cancel));
        assert_eq!(m.iteration, 0);
    }

    #[test]
    fn fixed_vertices_do_not_move() {
        let mut d = triangle();
        let a = d.lookup("a").unwrap();
        d.set_movable(a, false);
        let options = OrganicOptions {
            random_seed: Some(5),
            ..Default::default()
        };
        let mut m = seeded(&mut d, options);
        let i = m.cells.iter().position(|&c| c == a).unwrap();
        let before = m.location[i];
        assert!(m.run(&CancelFlag::new()));
        assert_eq!(m.location[i], before);
    }
}
