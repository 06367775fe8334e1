//! The contract shared by every layout engine, and the state they all carry.

use crate::display::Display;
use crate::error::{Error, Result};
use crate::graph::LayoutNode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Target drawing area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    width: f64,
    height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(Error::InvalidCanvas { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Cooperative cancellation flag.
///
/// Clones share the same flag, so a host can keep one and call [`CancelToken::cancel`] from any
/// thread while `update_layout` runs elsewhere. Engines poll it only between iterations; a call
/// that observed the flag clears it on return, otherwise the request carries over to the next call.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Outcome of one `update_layout` call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutReport {
    /// Main-loop iterations (Fruchterman-Reingold passes, Kamada-Kawai middle-loop passes).
    pub passes: usize,
    /// Kamada-Kawai Newton-Raphson sub-passes.
    pub sub_passes: usize,
    /// Components that went through minimization.
    pub components: usize,
    /// Set when the call stopped early, by request or because a budget was exhausted.
    pub cancelled: bool,
}

pub trait Layout {
    type Node: LayoutNode;

    fn set_node_list(&mut self, nodes: Vec<Self::Node>);

    fn append_nodes(&mut self, nodes: impl IntoIterator<Item = Self::Node>);

    fn append_node(&mut self, node: Self::Node) {
        self.append_nodes(std::iter::once(node));
    }

    fn nodes(&self) -> &[Self::Node];

    fn nodes_mut(&mut self) -> &mut [Self::Node];

    fn into_nodes(self) -> Vec<Self::Node>;

    /// Runs one full layout pass. A no-op while updates are disabled.
    fn update_layout(&mut self) -> LayoutReport;

    fn width(&self) -> f64;

    fn height(&self) -> f64;

    fn set_update(&mut self, enabled: bool);

    fn signal_cancel(&self);

    fn cancel_token(&self) -> CancelToken;
}

/// State every engine embeds.
#[derive(Debug)]
pub(crate) struct LayoutBase<N> {
    pub(crate) nodes: Vec<N>,
    pub(crate) canvas: Canvas,
    pub(crate) enabled: bool,
    pub(crate) cancel: CancelToken,
    pub(crate) display: Option<Display>,
    pub(crate) first_call: bool,
    cancel_observed: bool,
}

impl<N: LayoutNode> LayoutBase<N> {
    pub(crate) fn new(nodes: Vec<N>, canvas: Canvas) -> Self {
        Self {
            nodes,
            canvas,
            enabled: true,
            cancel: CancelToken::default(),
            display: None,
            first_call: true,
            cancel_observed: false,
        }
    }

    pub(crate) fn cancelled(&mut self) -> bool {
        let cancelled = self.cancel.is_cancelled();
        self.cancel_observed |= cancelled;
        cancelled
    }

    /// Clears the token only if this call actually stopped on it.
    ///
    /// A request that lands after the last poll stays pending for the next call.
    pub(crate) fn consume_cancel(&mut self) {
        if std::mem::take(&mut self.cancel_observed) {
            self.cancel.reset();
        }
    }

    pub(crate) fn refresh(&mut self) {
        if let Some(display) = self.display.as_mut() {
            display.push(&self.nodes);
        }
    }

    pub(crate) fn display_visible(&self) -> bool {
        self.display.as_ref().is_some_and(Display::is_visible)
    }
}

/// Forwards the boilerplate half of [`Layout`] to an engine's `base` field.
macro_rules! delegate_layout_base {
    () => {
        fn set_node_list(&mut self, nodes: Vec<Self::Node>) {
            self.base.nodes = nodes;
        }

        fn append_nodes(&mut self, nodes: impl IntoIterator<Item = Self::Node>) {
            self.base.nodes.extend(nodes);
        }

        fn nodes(&self) -> &[Self::Node] {
            &self.base.nodes
        }

        fn nodes_mut(&mut self) -> &mut [Self::Node] {
            &mut self.base.nodes
        }

        fn into_nodes(self) -> Vec<Self::Node> {
            self.base.nodes
        }

        fn width(&self) -> f64 {
            self.base.canvas.width()
        }

        fn height(&self) -> f64 {
            self.base.canvas.height()
        }

        fn set_update(&mut self, enabled: bool) {
            self.base.enabled = enabled;
        }

        fn signal_cancel(&self) {
            self.base.cancel.cancel();
        }

        fn cancel_token(&self) -> $crate::layout::CancelToken {
            self.base.cancel.clone()
        }
    };
}

pub(crate) use delegate_layout_base;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    #[test]
    fn canvas_rejects_degenerate_dimensions() {
        assert!(Canvas::new(100.0, 50.0).is_ok());
        assert!(matches!(
            Canvas::new(0.0, 50.0),
            Err(Error::InvalidCanvas { .. })
        ));
        assert!(Canvas::new(100.0, f64::NAN).is_err());
        assert!(Canvas::new(-1.0, 10.0).is_err());
    }

    #[test]
    fn unobserved_cancellation_carries_over() {
        let mut base = LayoutBase::new(vec![Node::new("a")], Canvas::new(10.0, 10.0).unwrap());
        base.cancel.cancel();
        base.consume_cancel();
        assert!(base.cancel.is_cancelled());

        assert!(base.cancelled());
        base.consume_cancel();
        assert!(!base.cancel.is_cancelled());
    }

    #[test]
    fn cancel_token_clones_share_the_flag() {
        let token = CancelToken::default();
        let other = token.clone();
        other.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!other.is_cancelled());
    }
}
