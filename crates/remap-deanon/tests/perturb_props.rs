//! Property tests for the perturbation contract: both derived graphs end
//! up connected, and the recorded overlap is exactly the intersection of
//! their final vertex sets.

use std::collections::{BTreeSet, VecDeque};

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use remap_core::Graph;
use remap_deanon::perturb::{self, EdgeSampleParams, GraphPair, SampledParams};

fn ring_with_chords(n: u32) -> Graph {
    let mut g = Graph::new_undirected();
    for v in 0..n {
        g.add_vertex(v);
    }
    for v in 0..n {
        g.add_edge(v, (v + 1) % n);
        g.add_edge(v, (v + 2) % n);
    }
    g
}

fn is_connected(g: &Graph) -> bool {
    let vs = g.sorted_vertices();
    let Some(&start) = vs.first() else {
        return true;
    };
    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(v) = queue.pop_front() {
        for n in g.neighbors_of(v) {
            if seen.insert(n) {
                queue.push_back(n);
            }
        }
    }
    seen.len() == vs.len()
}

fn assert_pair_contract(original: &Graph, pair: &GraphPair) -> Result<(), TestCaseError> {
    prop_assert!(is_connected(&pair.source));
    prop_assert!(is_connected(&pair.target));

    let source_vs: BTreeSet<u32> = pair.source.sorted_vertices().into_iter().collect();
    let target_vs: BTreeSet<u32> = pair.target.sorted_vertices().into_iter().collect();
    let common: Vec<u32> = source_vs.intersection(&target_vs).copied().collect();
    prop_assert_eq!(pair.common_vertices(), common);

    // Sampling never invents structure: every surviving edge comes from
    // the original graph.
    for side in [&pair.source, &pair.target] {
        for (a, b) in side.edges() {
            prop_assert!(original.contains_edge(a, b) || original.contains_edge(b, a));
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn edge_sampling_pair_upholds_the_contract(
        n in 30u32..80,
        alpha_v in 0.4f64..1.0,
        alpha_e in 0.5f64..1.0,
        seed in 0u64..500,
    ) {
        let g = ring_with_chords(n);
        let mut rng = StdRng::seed_from_u64(seed);
        let pair = perturb::ns09(&g, &EdgeSampleParams { alpha_v, alpha_e }, &mut rng)
            .expect("valid parameters");
        assert_pair_contract(&g, &pair)?;
    }

    #[test]
    fn sampled_pair_upholds_the_contract(
        n in 30u32..80,
        s_v in 0.5f64..1.0,
        s_e in 0.6f64..1.0,
        seed in 0u64..500,
    ) {
        let g = ring_with_chords(n);
        let mut rng = StdRng::seed_from_u64(seed);
        let pair = perturb::sampled(&g, &SampledParams { s_v, s_e }, &mut rng)
            .expect("valid parameters");
        assert_pair_contract(&g, &pair)?;
    }
}
