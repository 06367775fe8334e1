#![forbid(unsafe_code)]

//! Headless force-directed graph layout engines.
//!
//! Two classical algorithms mutate node positions in place:
//!
//! - [`FruchtermanReingold`]: a spring embedder with pairwise repulsion, edge attraction and a
//!   cooling schedule;
//! - [`KamadaKawai`]: a per-component spring-energy minimizer driven by graph-theoretic distances.
//!
//! Both implement the [`Layout`] contract so a host can call `update_layout` once per tick, toggle
//! execution with `set_update`, and interrupt an in-flight call through a [`CancelToken`].
//! Intermediate positions can be streamed to a renderer through an optional [`Display`].

pub mod algo;
pub mod display;
pub mod error;
mod geometry;
pub mod graph;
pub mod layout;
mod rng;

pub use algo::{
    Algorithm, FruchtermanReingold, FruchtermanReingoldOptions, KamadaKawai, KamadaKawaiOptions,
};
pub use display::{Display, DisplaySurface, Frame};
pub use error::{Error, Result};
pub use graph::{Edge, LayoutNode, Node, Point, Topology, Unweighted};
pub use layout::{Canvas, CancelToken, Layout, LayoutReport};

/// Headless entry point: runs one `update_layout` with the chosen algorithm and returns the
/// repositioned nodes.
pub fn layout<N: LayoutNode>(
    nodes: Vec<N>,
    canvas: Canvas,
    algorithm: Algorithm,
) -> Result<Vec<N>> {
    match algorithm {
        Algorithm::FruchtermanReingold(opts) => {
            opts.validate()?;
            let mut engine = FruchtermanReingold::new(nodes, canvas).with_options(opts);
            engine.update_layout();
            Ok(engine.into_nodes())
        }
        Algorithm::KamadaKawai(opts) => {
            opts.validate()?;
            let mut engine = KamadaKawai::new(nodes, canvas).with_options(opts);
            engine.update_layout();
            Ok(engine.into_nodes())
        }
    }
}
