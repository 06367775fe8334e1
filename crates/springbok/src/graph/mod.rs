//! Graph model accessors consumed by the layout engines.
//!
//! The engines never own graph semantics: a node only has to expose its identity, a mutable
//! position, its size, and its outgoing edges. Everything else (labels, colors, borders) stays on
//! the caller's side of [`LayoutNode`].

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use std::fmt::Debug;
use std::hash::Hash;

pub mod alg;

pub use alg::{Topology, Unweighted};

/// Accessors a layout engine needs from a node.
pub trait LayoutNode {
    type Id: Clone + Eq + Hash + Debug;

    fn id(&self) -> Self::Id;
    fn x(&self) -> f64;
    fn y(&self) -> f64;
    fn set_position(&mut self, x: f64, y: f64);
    /// Used for sizing only; forces treat nodes as points.
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn out_edges(&self) -> &[Edge<Self::Id>];
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge<Id> {
    pub from: Id,
    pub to: Id,
}

impl<Id: PartialEq> Edge<Id> {
    pub fn new(from: Id, to: Id) -> Self {
        Self { from, to }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Ready-made node keyed by a string id.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub out_edges: Vec<Edge<String>>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            out_edges: Vec::new(),
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Adds an outgoing edge to `to`.
    pub fn link(&mut self, to: impl Into<String>) {
        let to = to.into();
        self.out_edges.push(Edge::new(self.id.clone(), to));
    }

    pub fn position(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }
}

impl LayoutNode for Node {
    type Id = String;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn out_edges(&self) -> &[Edge<String>] {
        &self.out_edges
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Dense per-call mapping from node identity to `0..n`.
///
/// Built fresh for every layout pass; never stored on an engine. Ids must be unique within the
/// node list, since position `i` of every per-pass array belongs to `nodes[i]`.
#[derive(Debug)]
pub(crate) struct NodeIndex<Id> {
    ids: IndexSet<Id, FxBuildHasher>,
}

impl<Id: Clone + Eq + Hash> NodeIndex<Id> {
    pub(crate) fn build<N: LayoutNode<Id = Id>>(nodes: &[N]) -> Self {
        let mut ids: IndexSet<Id, FxBuildHasher> = IndexSet::default();
        ids.reserve(nodes.len());
        for n in nodes {
            ids.insert(n.id());
        }
        debug_assert_eq!(ids.len(), nodes.len(), "duplicate node ids in the node list");
        Self { ids }
    }

    pub(crate) fn get(&self, id: &Id) -> Option<usize> {
        self.ids.get_index_of(id)
    }
}

/// Index pairs for the union of every node's outgoing edges.
///
/// Edges with an endpoint outside `nodes` are dropped. Self-loops are kept; callers decide whether
/// they matter.
pub(crate) fn edge_pairs<N: LayoutNode>(
    nodes: &[N],
    index: &NodeIndex<N::Id>,
) -> Vec<(usize, usize)> {
    let mut out: Vec<(usize, usize)> = Vec::new();
    for n in nodes {
        for e in n.out_edges() {
            let Some(a) = index.get(&e.from) else {
                continue;
            };
            let Some(b) = index.get(&e.to) else {
                continue;
            };
            out.push((a, b));
        }
    }
    out
}

pub(crate) fn snapshot<N: LayoutNode>(nodes: &[N]) -> (Vec<f64>, Vec<f64>) {
    let xs: Vec<f64> = nodes.iter().map(|n| n.x()).collect();
    let ys: Vec<f64> = nodes.iter().map(|n| n.y()).collect();
    (xs, ys)
}

pub(crate) fn commit<N: LayoutNode>(nodes: &mut [N], xs: &[f64], ys: &[f64]) {
    for (i, n) in nodes.iter_mut().enumerate() {
        n.set_position(xs[i], ys[i]);
    }
}
