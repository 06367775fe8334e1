//! Graph-theoretic services the engines consume: connected components, shortest-path distances
//! and self-loop detection.

use super::{LayoutNode, NodeIndex, edge_pairs};
use nalgebra::DMatrix;
use std::collections::VecDeque;

/// Topology queries used by the layout engines.
///
/// Components are returned as disjoint lists of indices into `nodes`. Distance matrices have one
/// row/column per entry of `members`, in the order given.
pub trait Topology {
    fn components<N: LayoutNode>(&self, nodes: &[N]) -> Vec<Vec<usize>>;

    fn distance_matrix<N: LayoutNode>(&self, nodes: &[N], members: &[usize]) -> DMatrix<f64>;

    fn has_self_loops<N: LayoutNode>(&self, nodes: &[N]) -> bool {
        nodes.iter().any(|n| n.out_edges().iter().any(|e| e.is_self_loop()))
    }
}

/// Unweighted topology: every edge has length 1 and direction is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unweighted;

impl Topology for Unweighted {
    fn components<N: LayoutNode>(&self, nodes: &[N]) -> Vec<Vec<usize>> {
        let adjacency = undirected_adjacency(nodes);
        let mut seen: Vec<bool> = vec![false; nodes.len()];
        let mut out: Vec<Vec<usize>> = Vec::new();

        for start in 0..nodes.len() {
            if seen[start] {
                continue;
            }
            seen[start] = true;
            let mut comp: Vec<usize> = Vec::new();
            let mut q: VecDeque<usize> = VecDeque::new();
            q.push_back(start);
            while let Some(v) = q.pop_front() {
                comp.push(v);
                for &w in &adjacency[v] {
                    if !seen[w] {
                        seen[w] = true;
                        q.push_back(w);
                    }
                }
            }
            out.push(comp);
        }

        out
    }

    fn distance_matrix<N: LayoutNode>(&self, nodes: &[N], members: &[usize]) -> DMatrix<f64> {
        let adjacency = undirected_adjacency(nodes);
        let m = members.len();
        // Unreachable pairs cannot occur inside a component; bound them anyway.
        let unreachable = m as f64;

        let mut local: Vec<Option<usize>> = vec![None; nodes.len()];
        for (i, &v) in members.iter().enumerate() {
            local[v] = Some(i);
        }

        let mut d = DMatrix::<f64>::from_element(m, m, unreachable);
        let mut hops: Vec<Option<usize>> = vec![None; nodes.len()];
        let mut q: VecDeque<usize> = VecDeque::new();
        for (row, &source) in members.iter().enumerate() {
            hops.iter_mut().for_each(|h| *h = None);
            q.clear();
            hops[source] = Some(0);
            q.push_back(source);
            while let Some(v) = q.pop_front() {
                let Some(h) = hops[v] else {
                    continue;
                };
                if let Some(col) = local[v] {
                    d[(row, col)] = h as f64;
                }
                for &w in &adjacency[v] {
                    if hops[w].is_none() {
                        hops[w] = Some(h + 1);
                        q.push_back(w);
                    }
                }
            }
        }

        d
    }
}

fn undirected_adjacency<N: LayoutNode>(nodes: &[N]) -> Vec<Vec<usize>> {
    let index = NodeIndex::build(nodes);
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (a, b) in edge_pairs(nodes, &index) {
        if a == b {
            continue;
        }
        if !adjacency[a].contains(&b) {
            adjacency[a].push(b);
        }
        if !adjacency[b].contains(&a) {
            adjacency[b].push(a);
        }
    }
    adjacency
}
