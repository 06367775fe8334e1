//! Optional display feedback: pushes intermediate positions to a rendering surface while a layout
//! call converges.
//!
//! The numerical core only ever calls [`Display::push`]. How the frame reaches the renderer is
//! decided by the caller when the display is constructed:
//!
//! - [`Display::direct`] invokes the surface synchronously on the layout's thread;
//! - [`Display::queued`] sends owned [`Frame`]s over a channel so a UI-owned thread can drain
//!   them at its own pace.

use crate::graph::{LayoutNode, Point};
use std::sync::mpsc::{Receiver, Sender, channel};

/// Snapshot of every node position at one refresh point.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub positions: Vec<Point>,
}

impl Frame {
    pub(crate) fn capture<N: LayoutNode>(nodes: &[N]) -> Self {
        Self {
            positions: nodes
                .iter()
                .map(|n| Point { x: n.x(), y: n.y() })
                .collect(),
        }
    }
}

pub trait DisplaySurface: Send {
    fn request_refresh(&mut self, frame: &Frame);

    /// Hidden surfaces skip cosmetic animation sub-frames.
    fn is_visible(&self) -> bool {
        true
    }
}

impl<F> DisplaySurface for F
where
    F: FnMut(&Frame) + Send,
{
    fn request_refresh(&mut self, frame: &Frame) {
        self(frame)
    }
}

enum Delivery {
    Direct(Box<dyn DisplaySurface>),
    Queued(Sender<Frame>),
}

pub struct Display {
    delivery: Delivery,
}

impl Display {
    pub fn direct(surface: impl DisplaySurface + 'static) -> Self {
        Self {
            delivery: Delivery::Direct(Box::new(surface)),
        }
    }

    /// Returns the display together with the receiving end the UI thread should drain.
    pub fn queued() -> (Self, Receiver<Frame>) {
        let (tx, rx) = channel();
        (
            Self {
                delivery: Delivery::Queued(tx),
            },
            rx,
        )
    }

    pub fn is_visible(&self) -> bool {
        match &self.delivery {
            Delivery::Direct(surface) => surface.is_visible(),
            Delivery::Queued(_) => true,
        }
    }

    pub(crate) fn push<N: LayoutNode>(&mut self, nodes: &[N]) {
        let frame = Frame::capture(nodes);
        match &mut self.delivery {
            Delivery::Direct(surface) => surface.request_refresh(&frame),
            Delivery::Queued(tx) => {
                if tx.send(frame).is_err() {
                    tracing::debug!("display receiver dropped; frame discarded");
                }
            }
        }
    }
}

impl std::fmt::Debug for Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.delivery {
            Delivery::Direct(_) => "direct",
            Delivery::Queued(_) => "queued",
        };
        f.debug_struct("Display").field("delivery", &mode).finish()
    }
}
