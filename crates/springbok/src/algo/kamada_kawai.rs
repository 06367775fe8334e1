//! Kamada-Kawai spring-energy minimizer.
//!
//! Each connected component is solved on its own. Every pair of nodes is joined by a spring whose
//! rest length is proportional to their graph-theoretic distance and whose stiffness falls off with
//! the square of that distance. The node with the steepest energy gradient is moved with 2×2
//! Newton-Raphson steps until it settles, then the next steepest node is picked, under a
//! convergence threshold that decays until it reaches `min_epsilon`.
//!
//! Components are not packed against each other, so after the shared rescale their regions may
//! overlap.

use crate::algo::KamadaKawaiOptions;
use crate::display::Display;
use crate::geometry::{ANIMATION_STEPS, animate, circle_positions, rescale_to_fit};
use crate::graph::{LayoutNode, Topology, Unweighted, commit, snapshot};
use crate::layout::{Canvas, Layout, LayoutBase, LayoutReport, delegate_layout_base};
use nalgebra::{DMatrix, Matrix2, Vector2};

const MIN_IMPROVEMENT: f64 = 0.1;

#[derive(Debug)]
pub struct KamadaKawai<N, T = Unweighted> {
    base: LayoutBase<N>,
    opts: KamadaKawaiOptions,
    topology: T,
}

impl<N: LayoutNode> KamadaKawai<N> {
    pub fn new(nodes: Vec<N>, canvas: Canvas) -> Self {
        Self {
            base: LayoutBase::new(nodes, canvas),
            opts: KamadaKawaiOptions::default(),
            topology: Unweighted,
        }
    }
}

impl<N: LayoutNode, T: Topology> KamadaKawai<N, T> {
    pub fn with_options(mut self, opts: KamadaKawaiOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn with_display(mut self, display: Display) -> Self {
        self.base.display = Some(display);
        self
    }

    /// Swaps the component/distance provider.
    pub fn with_topology<U: Topology>(self, topology: U) -> KamadaKawai<N, U> {
        KamadaKawai {
            base: self.base,
            opts: self.opts,
            topology,
        }
    }

    pub fn options(&self) -> &KamadaKawaiOptions {
        &self.opts
    }

    pub fn options_mut(&mut self) -> &mut KamadaKawaiOptions {
        &mut self.opts
    }

    fn place_on_circle(&mut self) {
        let (xs, ys) = circle_positions(
            self.base.nodes.len(),
            self.base.canvas.width(),
            self.base.canvas.height(),
            self.opts.pad,
        );
        commit(&mut self.base.nodes, &xs, &ys);
    }

    fn run(&mut self) -> LayoutReport {
        let mut report = LayoutReport::default();

        if self.base.first_call || self.opts.circle_layout_each_time {
            self.place_on_circle();
            self.base.first_call = false;
        }

        let components = self.topology.components(&self.base.nodes);
        let mut budget = SubPassBudget::new(self.opts.max_passes);
        for members in components.iter().filter(|c| c.len() > 1) {
            if self.base.cancelled() || budget.exhausted {
                break;
            }
            self.run_on_component(members, &mut budget, &mut report);
            report.components += 1;
        }
        if budget.exhausted {
            tracing::warn!(
                max_passes = budget.max,
                "kamada-kawai sub-pass budget exhausted; stopping this call"
            );
        }
        report.cancelled = self.base.cancelled() || budget.exhausted;

        tracing::debug!(
            nodes = self.base.nodes.len(),
            components = components.len(),
            minimized = report.components,
            passes = report.passes,
            sub_passes = report.sub_passes,
            cancelled = report.cancelled,
            "kamada-kawai pass finished"
        );

        if self.opts.rescale_on_completion {
            let (mut xs, mut ys) = snapshot(&self.base.nodes);
            rescale_to_fit(
                &mut self.base,
                &mut xs,
                &mut ys,
                self.opts.pad,
                self.opts.animate_transitions,
            );
        }

        report
    }

    fn run_on_component(
        &mut self,
        members: &[usize],
        budget: &mut SubPassBudget,
        report: &mut LayoutReport,
    ) {
        let m = members.len();
        let distances = self.topology.distance_matrix(&self.base.nodes, members);
        let diameter = distances.max();
        let canvas = self.base.canvas;
        let unit = canvas.width().min(canvas.height()) / diameter.max(1.0);
        let springs = Springs::new(&distances, self.opts.spring_constant, unit);

        let mut xs: Vec<f64> = members.iter().map(|&i| self.base.nodes[i].x()).collect();
        let mut ys: Vec<f64> = members.iter().map(|&i| self.base.nodes[i].y()).collect();

        let mut epsilon = springs.energy(&xs, &ys) / m as f64;
        let mut delta_m: Vec<f64> = (0..m).map(|i| springs.delta_m(i, &xs, &ys)).collect();
        let (mut max_idx, mut max_delta_m) = steepest(&delta_m);

        tracing::trace!(
            size = m,
            diameter,
            unit,
            epsilon,
            max_delta_m,
            "kamada-kawai component start"
        );

        let every = self.opts.update_every_n_passes;
        'outer: while epsilon > self.opts.min_epsilon {
            if self.base.cancelled() || budget.exhausted {
                break;
            }

            let mut previous = max_delta_m + 1.0;
            while max_delta_m > epsilon && previous - max_delta_m > MIN_IMPROVEMENT {
                if self.base.cancelled() || budget.exhausted {
                    break 'outer;
                }
                previous = max_delta_m;
                report.passes += 1;

                let mut node_delta = delta_m[max_idx];
                while node_delta >= epsilon && budget.take() {
                    report.sub_passes += 1;
                    let Some((dx, dy)) = springs.newton_step(max_idx, &xs, &ys) else {
                        break;
                    };
                    xs[max_idx] += dx;
                    ys[max_idx] += dy;
                    node_delta = springs.delta_m(max_idx, &xs, &ys);
                }

                for (i, d) in delta_m.iter_mut().enumerate() {
                    *d = springs.delta_m(i, &xs, &ys);
                }
                (max_idx, max_delta_m) = steepest(&delta_m);

                if every > 0 && report.passes.is_multiple_of(every) {
                    self.write_back(members, &xs, &ys);
                    self.base.refresh();
                }
            }

            epsilon -= epsilon / 4.0;
        }

        let (mut target_xs, mut target_ys) = snapshot(&self.base.nodes);
        for (local, &global) in members.iter().enumerate() {
            target_xs[global] = xs[local];
            target_ys[global] = ys[local];
        }
        if self.opts.animate_transitions {
            animate(&mut self.base, &target_xs, &target_ys, ANIMATION_STEPS);
        } else {
            commit(&mut self.base.nodes, &target_xs, &target_ys);
        }
    }

    fn write_back(&mut self, members: &[usize], xs: &[f64], ys: &[f64]) {
        for (local, &global) in members.iter().enumerate() {
            self.base.nodes[global].set_position(xs[local], ys[local]);
        }
    }
}

impl<N: LayoutNode, T: Topology> Layout for KamadaKawai<N, T> {
    type Node = N;

    delegate_layout_base!();

    fn update_layout(&mut self) -> LayoutReport {
        if !self.base.enabled {
            return LayoutReport::default();
        }
        let report = if self.base.nodes.len() < 2 {
            LayoutReport::default()
        } else {
            self.run()
        };
        self.base.consume_cancel();
        report
    }
}

/// Newton-Raphson sub-passes shared by every component of one call.
///
/// `exhausted` flips as soon as the last sub-pass is handed out, so no further pass or component
/// starts once the budget is spent.
#[derive(Debug)]
struct SubPassBudget {
    used: usize,
    max: usize,
    exhausted: bool,
}

impl SubPassBudget {
    fn new(max: usize) -> Self {
        Self {
            used: 0,
            max,
            exhausted: max == 0,
        }
    }

    fn take(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        self.used += 1;
        self.exhausted = self.used >= self.max;
        true
    }
}

/// Stiffness `K` and rest-length `L` for every pair of one component.
#[derive(Debug)]
struct Springs {
    k: DMatrix<f64>,
    l: DMatrix<f64>,
}

impl Springs {
    fn new(distances: &DMatrix<f64>, spring_constant: f64, unit: f64) -> Self {
        let n = distances.nrows();
        let mut k = DMatrix::<f64>::zeros(n, n);
        let mut l = DMatrix::<f64>::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                let d = distances[(i, j)];
                if i == j || !(d.is_finite() && d > 0.0) {
                    continue;
                }
                k[(i, j)] = spring_constant / (d * d);
                l[(i, j)] = unit * d;
            }
        }
        Self { k, l }
    }

    fn len(&self) -> usize {
        self.k.nrows()
    }

    fn energy(&self, xs: &[f64], ys: &[f64]) -> f64 {
        let n = self.len();
        let mut e = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = xs[i] - xs[j];
                let dy = ys[i] - ys[j];
                let l = self.l[(i, j)];
                let dist = dx.hypot(dy);
                e += 0.5 * self.k[(i, j)] * (dx * dx + dy * dy + l * l - 2.0 * l * dist);
            }
        }
        e
    }

    /// Partial derivatives of the energy with respect to node `m`'s x and y.
    fn gradient(&self, m: usize, xs: &[f64], ys: &[f64]) -> (f64, f64) {
        let mut gx = 0.0;
        let mut gy = 0.0;
        for i in 0..self.len() {
            let k = self.k[(m, i)];
            if i == m || k == 0.0 {
                continue;
            }
            let dx = xs[m] - xs[i];
            let dy = ys[m] - ys[i];
            let dist = dx.hypot(dy);
            if dist == 0.0 {
                continue;
            }
            let l = self.l[(m, i)];
            gx += k * (dx - l * dx / dist);
            gy += k * (dy - l * dy / dist);
        }
        (gx, gy)
    }

    fn delta_m(&self, m: usize, xs: &[f64], ys: &[f64]) -> f64 {
        let (gx, gy) = self.gradient(m, xs, ys);
        gx.hypot(gy)
    }

    /// Solves the 2×2 Newton system for node `m`. `None` when the Hessian is singular.
    fn newton_step(&self, m: usize, xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
        let mut gx = 0.0;
        let mut gy = 0.0;
        let mut hxx = 0.0;
        let mut hxy = 0.0;
        let mut hyy = 0.0;
        for i in 0..self.len() {
            let k = self.k[(m, i)];
            if i == m || k == 0.0 {
                continue;
            }
            let dx = xs[m] - xs[i];
            let dy = ys[m] - ys[i];
            let dist = dx.hypot(dy);
            if dist == 0.0 {
                continue;
            }
            let l = self.l[(m, i)];
            let dist3 = dist * dist * dist;
            gx += k * (dx - l * dx / dist);
            gy += k * (dy - l * dy / dist);
            hxx += k * (1.0 - l * dy * dy / dist3);
            hxy += k * l * dx * dy / dist3;
            hyy += k * (1.0 - l * dx * dx / dist3);
        }

        let hessian = Matrix2::new(hxx, hxy, hxy, hyy);
        let step = hessian.try_inverse()? * Vector2::new(-gx, -gy);
        (step.x.is_finite() && step.y.is_finite()).then_some((step.x, step.y))
    }
}

fn steepest(delta_m: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, &d) in delta_m.iter().enumerate() {
        if d > best.1 {
            best = (i, d);
        }
    }
    best
}
