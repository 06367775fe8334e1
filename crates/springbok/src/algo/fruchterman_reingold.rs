//! Fruchterman-Reingold spring embedder.
//!
//! Every pair of nodes repels with `k² / d`, every edge attracts with `d² / k`, and the per-pass
//! displacement of a node is capped by a temperature that cools geometrically once the initial
//! iterations are spent. `k` is the optimal distance derived from the canvas area.

use crate::algo::FruchtermanReingoldOptions;
use crate::display::Display;
use crate::geometry::{ANIMATION_STEPS, animate, rescale_to_fit};
use crate::graph::{LayoutNode, NodeIndex, Topology, Unweighted, commit, edge_pairs, snapshot};
use crate::layout::{Canvas, Layout, LayoutBase, LayoutReport, delegate_layout_base};
use crate::rng::XorShift64Star;

const OPTIMAL_DISTANCE_FACTOR: f64 = 0.46;
const ZERO_EDGE_LENGTH: f64 = 0.001;

#[derive(Debug)]
pub struct FruchtermanReingold<N> {
    base: LayoutBase<N>,
    opts: FruchtermanReingoldOptions,
}

impl<N: LayoutNode> FruchtermanReingold<N> {
    pub fn new(nodes: Vec<N>, canvas: Canvas) -> Self {
        Self {
            base: LayoutBase::new(nodes, canvas),
            opts: FruchtermanReingoldOptions::default(),
        }
    }

    pub fn with_options(mut self, opts: FruchtermanReingoldOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn with_display(mut self, display: Display) -> Self {
        self.base.display = Some(display);
        self
    }

    pub fn options(&self) -> &FruchtermanReingoldOptions {
        &self.opts
    }

    pub fn options_mut(&mut self) -> &mut FruchtermanReingoldOptions {
        &mut self.opts
    }

    /// `0.46 * sqrt(area / (n + 1))` for the current node list.
    pub fn optimal_distance(&self) -> f64 {
        let area = self.base.canvas.width() * self.base.canvas.height();
        OPTIMAL_DISTANCE_FACTOR * (area / (self.base.nodes.len() as f64 + 1.0)).sqrt()
    }

    /// Uniform placement in `[0, width - pad] × [0, height]`.
    ///
    /// The vertical bound is deliberately not pad-reduced; the final rescale insets both axes.
    fn randomize(&mut self) {
        let mut rng = XorShift64Star::from_seed_or_clock(self.opts.random_seed);
        let w = self.base.canvas.width() - self.opts.pad;
        let h = self.base.canvas.height();
        for n in &mut self.base.nodes {
            let x = rng.next_f64_below(w);
            let y = rng.next_f64_below(h);
            n.set_position(x, y);
        }
    }

    fn run(&mut self) -> LayoutReport {
        let mut report = LayoutReport::default();
        let n = self.base.nodes.len();
        let k = self.optimal_distance();
        let mut cooling = Cooling::new(self.base.canvas.width(), self.opts.initial_iterations);

        if self.base.first_call {
            self.randomize();
            self.base.first_call = false;
        }

        let (mut xs, mut ys) = snapshot(&self.base.nodes);
        let index = NodeIndex::build(&self.base.nodes);
        let mut edges = edge_pairs(&self.base.nodes, &index);
        // A self-loop has zero length and no direction; it never contributes attraction.
        if Unweighted.has_self_loops(&self.base.nodes) {
            edges.retain(|&(a, b)| a != b);
        }

        let mut disp: Vec<(f64, f64)> = vec![(0.0, 0.0); n];
        let mut pass = 0usize;
        while cooling.is_hot() && pass < self.opts.max_passes {
            if self.base.cancelled() {
                report.cancelled = true;
                break;
            }

            disp.iter_mut().for_each(|d| *d = (0.0, 0.0));
            accumulate_repulsion(&xs, &ys, k, &mut disp);
            accumulate_attraction(&xs, &ys, &edges, k, &mut disp);

            let t = cooling.temperature();
            for (i, &(dx, dy)) in disp.iter().enumerate() {
                let m = dx.hypot(dy);
                if !m.is_finite() || m == 0.0 {
                    continue;
                }
                let scale = if m > t { t / m } else { 1.0 };
                xs[i] += dx * scale;
                ys[i] += dy * scale;
            }

            cooling.cool(pass);

            let every = self.opts.update_every_n_passes;
            if every > 0 && pass.is_multiple_of(every) {
                commit(&mut self.base.nodes, &xs, &ys);
                self.base.refresh();
            }

            pass += 1;
        }
        report.passes = pass;

        tracing::debug!(
            nodes = n,
            edges = edges.len(),
            passes = pass,
            temperature = cooling.temperature(),
            optimal_distance = k,
            cancelled = report.cancelled,
            "fruchterman-reingold pass finished"
        );

        if self.opts.rescale_on_completion {
            rescale_to_fit(
                &mut self.base,
                &mut xs,
                &mut ys,
                self.opts.pad,
                self.opts.animate_transitions,
            );
        } else if self.opts.animate_transitions {
            animate(&mut self.base, &xs, &ys, ANIMATION_STEPS);
        } else {
            commit(&mut self.base.nodes, &xs, &ys);
            self.base.refresh();
        }

        report
    }
}

impl<N: LayoutNode> Layout for FruchtermanReingold<N> {
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

/// Temperature schedule: constant for the initial iterations, then divided by 1.1 per pass.
#[derive(Debug, Clone, Copy)]
struct Cooling {
    temperature: f64,
    initial_iterations: usize,
}

impl Cooling {
    const FACTOR: f64 = 1.1;

    fn new(width: f64, initial_iterations: usize) -> Self {
        Self {
            temperature: width / 10.0,
            initial_iterations,
        }
    }

    fn temperature(&self) -> f64 {
        self.temperature
    }

    fn is_hot(&self) -> bool {
        self.temperature > 1.0
    }

    fn cool(&mut self, pass: usize) {
        if pass > self.initial_iterations {
            self.temperature /= Self::FACTOR;
        }
    }
}

/// Pairwise repulsion, each unordered pair visited once.
///
/// Exactly coincident nodes are skipped; the other forces separate them.
fn accumulate_repulsion(xs: &[f64], ys: &[f64], k: f64, disp: &mut [(f64, f64)]) {
    let k2 = k * k;
    let n = xs.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = xs[i] - xs[j];
            let dy = ys[i] - ys[j];
            if dx == 0.0 && dy == 0.0 {
                continue;
            }
            let d = dx.hypot(dy);
            let f = k2 / d;
            let fx = dx / d * f;
            let fy = dy / d * f;
            disp[i].0 += fx;
            disp[i].1 += fy;
            disp[j].0 -= fx;
            disp[j].1 -= fy;
        }
    }
}

fn accumulate_attraction(
    xs: &[f64],
    ys: &[f64],
    edges: &[(usize, usize)],
    k: f64,
    disp: &mut [(f64, f64)],
) {
    for &(a, b) in edges {
        let dx = xs[a] - xs[b];
        let dy = ys[a] - ys[b];
        let mut d = dx.hypot(dy);
        if d == 0.0 {
            d = ZERO_EDGE_LENGTH;
        }
        let f = d * d / k;
        let fx = dx / d * f;
        let fy = dy / d * f;
        disp[a].0 -= fx;
        disp[a].1 -= fy;
        disp[b].0 += fx;
        disp[b].1 += fy;
    }
}
