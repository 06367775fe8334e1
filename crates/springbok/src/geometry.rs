//! Rescale, animate and circular placement shared by both engines.

use crate::graph::{LayoutNode, commit, snapshot};
use crate::layout::LayoutBase;

pub(crate) const ANIMATION_STEPS: usize = 8;

/// Maps `values` linearly onto `[0, extent]`.
///
/// A collapsed axis (`max == min`) is widened to `[0, 2 * max]`, which puts every value in the
/// middle of the extent. An axis collapsed at zero is placed at the middle directly.
pub(crate) fn fit_axis(values: &mut [f64], extent: f64) {
    if values.is_empty() {
        return;
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values.iter() {
        min = min.min(v);
        max = max.max(v);
    }
    if max == min {
        min = 0.0;
        max *= 2.0;
    }
    let span = max - min;
    if span == 0.0 || !span.is_finite() {
        values.iter_mut().for_each(|v| *v = extent / 2.0);
        return;
    }
    for v in values.iter_mut() {
        *v = (*v - min) / span * extent;
    }
}

/// Rescales the position arrays into the canvas inset by `pad`, then commits them.
pub(crate) fn rescale_to_fit<N: LayoutNode>(
    base: &mut LayoutBase<N>,
    xs: &mut [f64],
    ys: &mut [f64],
    pad: f64,
    animate_transition: bool,
) {
    fit_axis(xs, base.canvas.width() - pad);
    fit_axis(ys, base.canvas.height() - pad);
    if animate_transition {
        animate(base, xs, ys, ANIMATION_STEPS);
    } else {
        commit(&mut base.nodes, xs, ys);
        base.refresh();
    }
}

/// Glides every node from its current position to its target over `steps` refreshes.
///
/// The final sub-frame writes the targets exactly. Without a visible display there is nothing to
/// watch, so the targets are committed straight away.
pub(crate) fn animate<N: LayoutNode>(
    base: &mut LayoutBase<N>,
    target_xs: &[f64],
    target_ys: &[f64],
    steps: usize,
) {
    if steps == 0 || !base.display_visible() {
        commit(&mut base.nodes, target_xs, target_ys);
        base.refresh();
        return;
    }

    let (start_xs, start_ys) = snapshot(&base.nodes);
    for step in 1..=steps {
        if step == steps {
            commit(&mut base.nodes, target_xs, target_ys);
        } else {
            let t = step as f64 / steps as f64;
            for (i, n) in base.nodes.iter_mut().enumerate() {
                n.set_position(
                    start_xs[i] + (target_xs[i] - start_xs[i]) * t,
                    start_ys[i] + (target_ys[i] - start_ys[i]) * t,
                );
            }
        }
        base.refresh();
    }
}

/// Evenly spaced positions on a circle centred in the canvas.
///
/// The radius is `min(width, height) / 2 - 2 * pad`, floored at an eighth of the smaller
/// dimension so a large pad cannot collapse every node onto the centre.
pub(crate) fn circle_positions(
    n: usize,
    width: f64,
    height: f64,
    pad: f64,
) -> (Vec<f64>, Vec<f64>) {
    let short = width.min(height);
    let radius = (short / 2.0 - 2.0 * pad).max(short / 8.0);
    let (cx, cy) = (width / 2.0, height / 2.0);
    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    for i in 0..n {
        let angle = std::f64::consts::TAU * (i as f64) / (n as f64);
        xs.push(cx + radius * angle.cos());
        ys.push(cy + radius * angle.sin());
    }
    (xs, ys)
}
