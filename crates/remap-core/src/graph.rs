//! Simple graph model over integer-identified vertices.
//!
//! # Overview
//!
//! A [`Graph`] is a tagged variant over an undirected or directed
//! `petgraph` adjacency map. Both variants expose the same surface:
//! vertex/edge mutation, ordered adjacency queries, connected-component
//! extraction, and randomized BFS subsampling (`export`). Graphs are
//! simple: no parallel edges, and self-loops are silently skipped on
//! insert.

use std::collections::{BTreeSet, VecDeque};

use petgraph::Direction::{Incoming, Outgoing};
use petgraph::graphmap::{DiGraphMap, UnGraphMap};
use rand::Rng;
use rand::seq::SliceRandom;

/// Which adjacency variant a [`Graph`] was constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Undirected,
    Directed,
}

/// A simple graph with `u32` vertex identifiers.
#[derive(Debug, Clone)]
pub enum Graph {
    Undirected(UnGraphMap<u32, ()>),
    Directed(DiGraphMap<u32, ()>),
}

impl Graph {
    /// Create an empty graph of the given kind.
    #[must_use]
    pub fn new(kind: GraphKind) -> Self {
        match kind {
            GraphKind::Undirected => Self::Undirected(UnGraphMap::new()),
            GraphKind::Directed => Self::Directed(DiGraphMap::new()),
        }
    }

    #[must_use]
    pub fn new_undirected() -> Self {
        Self::new(GraphKind::Undirected)
    }

    #[must_use]
    pub fn new_directed() -> Self {
        Self::new(GraphKind::Directed)
    }

    #[must_use]
    pub fn kind(&self) -> GraphKind {
        match self {
            Self::Undirected(_) => GraphKind::Undirected,
            Self::Directed(_) => GraphKind::Directed,
        }
    }

    #[must_use]
    pub fn is_directed(&self) -> bool {
        matches!(self, Self::Directed(_))
    }

    pub fn add_vertex(&mut self, v: u32) {
        match self {
            Self::Undirected(g) => {
                g.add_node(v);
            }
            Self::Directed(g) => {
                g.add_node(v);
            }
        }
    }

    /// Add an edge between two existing vertices.
    ///
    /// Returns `false` without mutating when either endpoint is absent,
    /// when the edge is a self-loop, or when the edge already exists.
    pub fn add_edge(&mut self, a: u32, b: u32) -> bool {
        if a == b || !self.contains_vertex(a) || !self.contains_vertex(b) || self.contains_edge(a, b)
        {
            return false;
        }
        match self {
            Self::Undirected(g) => {
                g.add_edge(a, b, ());
            }
            Self::Directed(g) => {
                g.add_edge(a, b, ());
            }
        }
        true
    }

    pub fn remove_vertex(&mut self, v: u32) {
        match self {
            Self::Undirected(g) => {
                g.remove_node(v);
            }
            Self::Directed(g) => {
                g.remove_node(v);
            }
        }
    }

    #[must_use]
    pub fn contains_vertex(&self, v: u32) -> bool {
        match self {
            Self::Undirected(g) => g.contains_node(v),
            Self::Directed(g) => g.contains_node(v),
        }
    }

    /// Edge membership; directional for directed graphs.
    #[must_use]
    pub fn contains_edge(&self, a: u32, b: u32) -> bool {
        match self {
            Self::Undirected(g) => g.contains_edge(a, b),
            Self::Directed(g) => g.contains_edge(a, b),
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        match self {
            Self::Undirected(g) => g.node_count(),
            Self::Directed(g) => g.node_count(),
        }
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        match self {
            Self::Undirected(g) => g.edge_count(),
            Self::Directed(g) => g.edge_count(),
        }
    }

    /// All vertex ids in ascending order.
    #[must_use]
    pub fn sorted_vertices(&self) -> Vec<u32> {
        let mut vs: Vec<u32> = match self {
            Self::Undirected(g) => g.nodes().collect(),
            Self::Directed(g) => g.nodes().collect(),
        };
        vs.sort_unstable();
        vs
    }

    /// All edges as `(source, target)` pairs (arbitrary orientation for
    /// undirected graphs).
    #[must_use]
    pub fn edges(&self) -> Vec<(u32, u32)> {
        match self {
            Self::Undirected(g) => g.all_edges().map(|(a, b, ())| (a, b)).collect(),
            Self::Directed(g) => g.all_edges().map(|(a, b, ())| (a, b)).collect(),
        }
    }

    /// Vertex degree. For directed graphs this is in-degree + out-degree.
    #[must_use]
    pub fn degree_of(&self, v: u32) -> usize {
        match self {
            Self::Undirected(g) => g.neighbors(v).count(),
            Self::Directed(g) => {
                g.neighbors_directed(v, Incoming).count() + g.neighbors_directed(v, Outgoing).count()
            }
        }
    }

    /// Adjacent vertices as an ordered set. For directed graphs this is the
    /// union of in- and out-neighbors.
    #[must_use]
    pub fn neighbors_of(&self, v: u32) -> BTreeSet<u32> {
        match self {
            Self::Undirected(g) => g.neighbors(v).collect(),
            Self::Directed(g) => g
                .neighbors_directed(v, Incoming)
                .chain(g.neighbors_directed(v, Outgoing))
                .collect(),
        }
    }

    /// In-neighbors; identical to [`Self::neighbors_of`] for undirected graphs.
    #[must_use]
    pub fn in_neighbors_of(&self, v: u32) -> BTreeSet<u32> {
        match self {
            Self::Undirected(g) => g.neighbors(v).collect(),
            Self::Directed(g) => g.neighbors_directed(v, Incoming).collect(),
        }
    }

    /// Out-neighbors; identical to [`Self::neighbors_of`] for undirected graphs.
    #[must_use]
    pub fn out_neighbors_of(&self, v: u32) -> BTreeSet<u32> {
        match self {
            Self::Undirected(g) => g.neighbors(v).collect(),
            Self::Directed(g) => g.neighbors_directed(v, Outgoing).collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Components
    // -----------------------------------------------------------------------

    /// Vertex set of the largest connected component (weak connectivity for
    /// directed graphs).
    #[must_use]
    pub fn largest_connected_component(&self) -> BTreeSet<u32> {
        let mut visited: BTreeSet<u32> = BTreeSet::new();
        let mut best: BTreeSet<u32> = BTreeSet::new();
        for v in self.sorted_vertices() {
            if visited.contains(&v) {
                continue;
            }
            let mut component = BTreeSet::new();
            let mut queue = VecDeque::new();
            component.insert(v);
            queue.push_back(v);
            while let Some(u) = queue.pop_front() {
                for n in self.neighbors_of(u) {
                    if component.insert(n) {
                        queue.push_back(n);
                    }
                }
            }
            visited.extend(component.iter().copied());
            if component.len() > best.len() {
                best = component;
            }
        }
        best
    }

    /// Remove every vertex outside the largest connected component.
    ///
    /// Run after each perturbation step so both derived graphs stay
    /// connected.
    pub fn retain_largest_connected_component(&mut self) {
        let keep = self.largest_connected_component();
        let doomed: Vec<u32> = self
            .sorted_vertices()
            .into_iter()
            .filter(|v| !keep.contains(v))
            .collect();
        for v in doomed {
            self.remove_vertex(v);
        }
    }

    /// Induced subgraph on the given vertex set.
    #[must_use]
    pub fn induced_subgraph(&self, keep: &BTreeSet<u32>) -> Self {
        let mut sub = Self::new(self.kind());
        for v in self.sorted_vertices() {
            if keep.contains(&v) {
                sub.add_vertex(v);
            }
        }
        for (a, b) in self.edges() {
            if keep.contains(&a) && keep.contains(&b) {
                sub.add_edge(a, b);
            }
        }
        sub
    }

    // -----------------------------------------------------------------------
    // Sampling
    // -----------------------------------------------------------------------

    /// Randomized BFS subsample: starting from a random vertex, discover
    /// roughly `n` additional vertices and induce all edges among them.
    ///
    /// The final BFS layer is admitted whole, so the result may slightly
    /// overshoot `n + 1` vertices. Returns `None` for an empty graph.
    pub fn export<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Option<Self> {
        let vertices = self.sorted_vertices();
        if vertices.is_empty() {
            return None;
        }
        let start = vertices[rng.gen_range(0..vertices.len())];

        let mut sampled: BTreeSet<u32> = BTreeSet::new();
        sampled.insert(start);
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(v) = queue.pop_front() {
            if sampled.len() > n {
                break;
            }
            let mut nbrs: Vec<u32> = self.neighbors_of(v).into_iter().collect();
            nbrs.shuffle(rng);
            for nbr in nbrs {
                if sampled.insert(nbr) {
                    queue.push_back(nbr);
                }
            }
        }

        Some(self.induced_subgraph(&sampled))
    }

    /// The top fraction of vertices by descending degree (ties broken by
    /// ascending id). `percent` is truncated against the vertex count, so
    /// e.g. `0.1` on 25 vertices yields 2.
    #[must_use]
    pub fn top_degree_subset(&self, percent: f64) -> Vec<u32> {
        let mut vs = self.sorted_vertices();
        vs.sort_by_key(|&v| std::cmp::Reverse(self.degree_of(v)));
        let take = ((vs.len() as f64) * percent) as usize;
        vs.truncate(take.min(vs.len()));
        vs
    }
}
