//! Full pipeline: perturb, seed, propagate, score.

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use remap_core::{Graph, GroundTruth, Matches};
use remap_deanon::perturb::{self, EdgeSampleParams};
use remap_deanon::propagate::{
    self, Blb, Dns09, Grh, Ns09, PropagationAlgorithm, PropagationConfig, Sng, StopReason,
};
use remap_deanon::seeding;

/// Ring of `n` vertices with chords to the second and third successor, so
/// degrees vary and the graph stays connected under edge sampling.
fn ring_with_chords(n: u32) -> Graph {
    let mut g = Graph::new_undirected();
    for v in 0..n {
        g.add_vertex(v);
    }
    for v in 0..n {
        g.add_edge(v, (v + 1) % n);
        g.add_edge(v, (v + 2) % n);
        if v % 3 == 0 {
            g.add_edge(v, (v + 3) % n);
        }
    }
    g
}

#[test]
fn perturb_seed_and_propagate_pipeline() {
    let original = ring_with_chords(120);
    let mut rng = StdRng::seed_from_u64(2024);
    let pair = perturb::ns09(
        &original,
        &EdgeSampleParams {
            alpha_v: 0.8,
            alpha_e: 0.75,
        },
        &mut rng,
    )
    .expect("perturb");

    let common: BTreeSet<u32> = pair.common_vertices().into_iter().collect();
    assert!(!common.is_empty(), "correlated pair must overlap");
    let truth = GroundTruth::from_common(common.clone());

    let seed_ids = seeding::top_degree(&pair.source, &common, 8);
    assert!(!seed_ids.is_empty());
    let seeds = Matches::from_self_pairs(&seed_ids);

    let mut algo = Ns09::new(0.5, 7);
    let outcome = propagate::run(
        &mut algo,
        &pair.source,
        &pair.target,
        seeds,
        &PropagationConfig::default(),
        &mut (),
    )
    .expect("propagation");

    assert!(outcome.rounds >= 1);
    assert!(matches!(
        outcome.stop,
        StopReason::Converged | StopReason::MaxRounds
    ));
    // A sweep can rebind a pair but never drops one, so the mapping is at
    // least as large as the seed set.
    assert!(outcome.matches.len() >= seed_ids.len());

    let accuracy = truth.accuracy(&outcome.matches);
    assert_eq!(
        accuracy.correct + accuracy.incorrect + accuracy.unknown,
        outcome.matches.len()
    );
}

#[test]
fn every_variant_converges_on_empty_seeds() {
    let undirected = ring_with_chords(12);
    let mut directed = Graph::new_directed();
    for v in 0..6 {
        directed.add_vertex(v);
    }
    for v in 0..5 {
        directed.add_edge(v, v + 1);
    }

    let mut variants: Vec<(Box<dyn PropagationAlgorithm>, &Graph)> = vec![
        (Box::new(Ns09::new(0.5, 0)), &undirected),
        (Box::new(Dns09::new(0.5, 0)), &directed),
        (Box::new(Blb::with_defaults(0)), &undirected),
        (Box::new(Grh::with_defaults(0)), &undirected),
        (Box::new(Sng::default()), &undirected),
    ];
    for (algo, graph) in &mut variants {
        let outcome = propagate::run(
            algo.as_mut(),
            graph,
            graph,
            Matches::new(),
            &PropagationConfig::default(),
            &mut (),
        )
        .expect("run");
        assert_eq!(outcome.rounds, 0, "{} must not start a round", algo.name());
        assert_eq!(outcome.stop, StopReason::Converged);
        assert!(outcome.matches.is_empty());
    }
}
