//! Perturbation generators.
//!
//! # Overview
//!
//! Each generator derives a correlated `(source, target)` pair from one
//! original graph. The edge-sampling family partitions vertices into a
//! common core plus two disjoint private sets, then samples edges for each
//! side independently with retention derived from
//! `beta = (1 - alpha_e) / (1 + alpha_e)`. The sample-based model skips the
//! shared-core mechanism entirely, and the seed-and-grow model lives in
//! [`seed_grow`].
//!
//! Every generator finishes with component pruning on both outputs, so the
//! recorded vertex overlap is the intersection of the *final* vertex sets —
//! usually a little smaller than the theoretical core, which is exactly
//! what ground truth must record.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;
use remap_core::{Graph, GraphKind};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::{self, ConfigError};

mod seed_grow;

pub use seed_grow::{SeedGrowParams, seed_and_grow};

#[derive(Debug, Error)]
pub enum PerturbError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{algorithm} requires a {expected:?} input graph")]
    KindMismatch {
        algorithm: &'static str,
        expected: GraphKind,
    },
    #[error("cannot perturb an empty graph")]
    EmptyGraph,
}

/// A correlated source/target graph pair.
#[derive(Debug, Clone)]
pub struct GraphPair {
    pub source: Graph,
    pub target: Graph,
}

impl GraphPair {
    /// Vertices present in both final graphs, ascending — the ground-truth
    /// overlap.
    #[must_use]
    pub fn common_vertices(&self) -> Vec<u32> {
        let target: BTreeSet<u32> = self.target.sorted_vertices().into_iter().collect();
        self.source
            .sorted_vertices()
            .into_iter()
            .filter(|v| target.contains(v))
            .collect()
    }
}

/// Parameters of the NS09-style edge-sampling generators.
#[derive(Debug, Clone, Copy)]
pub struct EdgeSampleParams {
    /// Fraction of vertices shared between the two derived graphs.
    pub alpha_v: f64,
    /// Edge-overlap parameter; retention is derived from it.
    pub alpha_e: f64,
}

impl EdgeSampleParams {
    /// # Errors
    ///
    /// Rejects parameters outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        config::check_fraction("alpha_v", self.alpha_v)?;
        config::check_fraction("alpha_e", self.alpha_e)
    }
}

/// Undirected edge-sampling perturbation.
///
/// # Errors
///
/// Fails on invalid parameters, an empty input, or a directed input graph.
#[instrument(skip(graph, rng), fields(vertices = graph.vertex_count(), edges = graph.edge_count()))]
pub fn ns09<R: Rng + ?Sized>(
    graph: &Graph,
    params: &EdgeSampleParams,
    rng: &mut R,
) -> Result<GraphPair, PerturbError> {
    if graph.is_directed() {
        return Err(PerturbError::KindMismatch {
            algorithm: "ns09",
            expected: GraphKind::Undirected,
        });
    }
    partition_and_sample(graph, params, rng)
}

/// Directed edge-sampling perturbation; same vertex partition and retention
/// formula as [`ns09`], generalized to ordered edges.
///
/// # Errors
///
/// Fails on invalid parameters, an empty input, or an undirected input graph.
#[instrument(skip(graph, rng), fields(vertices = graph.vertex_count(), edges = graph.edge_count()))]
pub fn dns09<R: Rng + ?Sized>(
    graph: &Graph,
    params: &EdgeSampleParams,
    rng: &mut R,
) -> Result<GraphPair, PerturbError> {
    if !graph.is_directed() {
        return Err(PerturbError::KindMismatch {
            algorithm: "dns09",
            expected: GraphKind::Directed,
        });
    }
    partition_and_sample(graph, params, rng)
}

fn partition_and_sample<R: Rng + ?Sized>(
    graph: &Graph,
    params: &EdgeSampleParams,
    rng: &mut R,
) -> Result<GraphPair, PerturbError> {
    params.validate()?;
    let mut vertices = graph.sorted_vertices();
    if vertices.is_empty() {
        return Err(PerturbError::EmptyGraph);
    }
    vertices.shuffle(rng);

    let n = vertices.len();
    let common = ((n as f64) * params.alpha_v).round() as usize;
    let common = common.min(n);
    let private = (n - common) / 2;

    let core = &vertices[..common];
    let source_extra = &vertices[common..common + private];
    let target_extra = &vertices[common + private..common + 2 * private];

    let beta = (1.0 - params.alpha_e) / (1.0 + params.alpha_e);
    let keep = ((1.0 - beta) * graph.edge_count() as f64).round() as usize;
    debug!(common, private, keep, "edge-sampling partition");

    let edges = graph.edges();
    let mut build_side = |extra: &[u32]| {
        let mut side = Graph::new(graph.kind());
        for &v in core.iter().chain(extra) {
            side.add_vertex(v);
        }
        let mut sampled = edges.clone();
        sampled.shuffle(rng);
        for (a, b) in sampled.into_iter().take(keep) {
            // silently dropped when an endpoint fell on the other side
            side.add_edge(a, b);
        }
        side.retain_largest_connected_component();
        side
    };

    let source = build_side(source_extra);
    let target = build_side(target_extra);
    Ok(GraphPair { source, target })
}

/// Parameters of the sample-based generator.
#[derive(Debug, Clone, Copy)]
pub struct SampledParams {
    /// Fraction of vertices each side keeps.
    pub s_v: f64,
    /// Fraction of edges each side keeps.
    pub s_e: f64,
}

impl SampledParams {
    /// # Errors
    ///
    /// Rejects parameters outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        config::check_fraction("s_v", self.s_v)?;
        config::check_fraction("s_e", self.s_e)
    }
}

/// Sample-based perturbation: each side independently keeps a fixed
/// fraction of vertices and of edges, with no shared-core mechanism.
///
/// # Errors
///
/// Fails on invalid parameters or an empty input.
#[instrument(skip(graph, rng), fields(vertices = graph.vertex_count(), edges = graph.edge_count()))]
pub fn sampled<R: Rng + ?Sized>(
    graph: &Graph,
    params: &SampledParams,
    rng: &mut R,
) -> Result<GraphPair, PerturbError> {
    params.validate()?;
    let vertices = graph.sorted_vertices();
    if vertices.is_empty() {
        return Err(PerturbError::EmptyGraph);
    }
    let keep_vertices = ((vertices.len() as f64) * params.s_v).round() as usize;
    let keep_edges = ((graph.edge_count() as f64) * params.s_e).round() as usize;
    let edges = graph.edges();

    let mut build_side = || {
        let mut side = Graph::new(graph.kind());
        let mut vs = vertices.clone();
        vs.shuffle(rng);
        for &v in vs.iter().take(keep_vertices) {
            side.add_vertex(v);
        }
        let mut es = edges.clone();
        es.shuffle(rng);
        for (a, b) in es.into_iter().take(keep_edges) {
            side.add_edge(a, b);
        }
        side.retain_largest_connected_component();
        side
    };

    let source = build_side();
    let target = build_side();
    Ok(GraphPair { source, target })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn ring_with_chords(n: u32) -> Graph {
        let mut g = Graph::new_undirected();
        for v in 0..n {
            g.add_vertex(v);
        }
        for v in 0..n {
            g.add_edge(v, (v + 1) % n);
            g.add_edge(v, (v + 3) % n);
        }
        g
    }

    fn is_connected(g: &Graph) -> bool {
        g.vertex_count() == 0 || g.largest_connected_component().len() == g.vertex_count()
    }

    #[test]
    fn ns09_outputs_are_connected_and_overlap() {
        let g = ring_with_chords(100);
        let params = EdgeSampleParams {
            alpha_v: 0.8,
            alpha_e: 0.6,
        };
        let mut rng = StdRng::seed_from_u64(42);
        let pair = ns09(&g, &params, &mut rng).expect("perturb");

        assert!(is_connected(&pair.source));
        assert!(is_connected(&pair.target));
        assert!(pair.source.vertex_count() <= 90);
        assert!(pair.target.vertex_count() <= 90);

        let common = pair.common_vertices();
        assert!(!common.is_empty());
        for v in &common {
            assert!(pair.source.contains_vertex(*v));
            assert!(pair.target.contains_vertex(*v));
        }
    }

    #[test]
    fn ns09_rejects_directed_input() {
        let mut g = Graph::new_directed();
        g.add_vertex(0);
        g.add_vertex(1);
        g.add_edge(0, 1);
        let params = EdgeSampleParams {
            alpha_v: 0.5,
            alpha_e: 0.5,
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            ns09(&g, &params, &mut rng),
            Err(PerturbError::KindMismatch { .. })
        ));
    }

    #[test]
    fn invalid_fraction_is_a_config_error() {
        let g = ring_with_chords(10);
        let params = EdgeSampleParams {
            alpha_v: 1.2,
            alpha_e: 0.5,
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            ns09(&g, &params, &mut rng),
            Err(PerturbError::Config(_))
        ));
    }

    #[test]
    fn dns09_keeps_directedness() {
        let mut g = Graph::new_directed();
        for v in 0..60 {
            g.add_vertex(v);
        }
        for v in 0..60 {
            g.add_edge(v, (v + 1) % 60);
            g.add_edge(v, (v + 5) % 60);
        }
        let params = EdgeSampleParams {
            alpha_v: 0.9,
            alpha_e: 0.8,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let pair = dns09(&g, &params, &mut rng).expect("perturb");
        assert!(pair.source.is_directed());
        assert!(pair.target.is_directed());
        assert!(is_connected(&pair.source));
    }

    #[test]
    fn sampled_sides_are_independent_and_connected() {
        let g = ring_with_chords(80);
        let params = SampledParams { s_v: 0.9, s_e: 0.9 };
        let mut rng = StdRng::seed_from_u64(11);
        let pair = sampled(&g, &params, &mut rng).expect("perturb");
        assert!(is_connected(&pair.source));
        assert!(is_connected(&pair.target));
        assert!(pair.source.vertex_count() <= 72);
    }

    #[test]
    fn empty_graph_is_rejected() {
        let g = Graph::new_undirected();
        let params = EdgeSampleParams {
            alpha_v: 0.5,
            alpha_e: 0.5,
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            ns09(&g, &params, &mut rng),
            Err(PerturbError::EmptyGraph)
        ));
    }
}
