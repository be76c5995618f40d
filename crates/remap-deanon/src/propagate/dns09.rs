//! Degree-weighted propagation for directed pairs.
//!
//! Edge orientation must survive the mapping: an in-neighbor of `v` whose
//! image is known votes for the image's out-neighbors (each weighted by
//! `1/sqrt(in-degree)`), and an out-neighbor votes for the image's
//! in-neighbors (weighted by `1/sqrt(out-degree)`). Both contributions
//! sum into one candidate score; the sweep is otherwise the same
//! mutual-confirmation loop as the undirected variant.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use remap_core::{Graph, GraphKind, Matches};

use super::{MapSide, PropagationAlgorithm, PropagationError, accept_candidate};

#[derive(Debug)]
pub struct Dns09 {
    theta: f64,
    rng: StdRng,
}

impl Dns09 {
    #[must_use]
    pub fn new(theta: f64, seed: u64) -> Self {
        Self {
            theta,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

fn directed_match_scores(
    from: &Graph,
    to: &Graph,
    matches: &Matches,
    v: u32,
    side: MapSide,
) -> BTreeMap<u32, f64> {
    let mut scores = BTreeMap::new();

    // v's in-neighbors map to candidates downstream of their image.
    for nbr in from.in_neighbors_of(v) {
        let Some(image) = side.image(matches, nbr) else {
            continue;
        };
        for candidate in to.out_neighbors_of(image) {
            if side.is_taken(matches, candidate) {
                continue;
            }
            let d_in = to.in_neighbors_of(candidate).len();
            if d_in == 0 {
                continue;
            }
            *scores.entry(candidate).or_insert(0.0) += 1.0 / (d_in as f64).sqrt();
        }
    }

    // v's out-neighbors map to candidates upstream of their image.
    for nbr in from.out_neighbors_of(v) {
        let Some(image) = side.image(matches, nbr) else {
            continue;
        };
        for candidate in to.in_neighbors_of(image) {
            if side.is_taken(matches, candidate) {
                continue;
            }
            let d_out = to.out_neighbors_of(candidate).len();
            if d_out == 0 {
                continue;
            }
            *scores.entry(candidate).or_insert(0.0) += 1.0 / (d_out as f64).sqrt();
        }
    }

    scores
}

impl PropagationAlgorithm for Dns09 {
    fn name(&self) -> &'static str {
        "dns09"
    }

    fn run_round(
        &mut self,
        source: &Graph,
        target: &Graph,
        matches: &mut Matches,
    ) -> Result<usize, PropagationError> {
        if !source.is_directed() || !target.is_directed() {
            return Err(PropagationError::KindMismatch {
                algorithm: "dns09",
                expected: GraphKind::Directed,
            });
        }
        let mut new_matches = 0;
        for v in source.sorted_vertices() {
            let forward = directed_match_scores(source, target, matches, v, MapSide::Forward);
            let Some(candidate) = accept_candidate(&forward, self.theta, &mut self.rng) else {
                continue;
            };
            let reverse = directed_match_scores(target, source, matches, candidate, MapSide::Reverse);
            let Some(confirmed) = accept_candidate(&reverse, self.theta, &mut self.rng) else {
                continue;
            };
            if confirmed == v && matches.add(v, candidate) {
                new_matches += 1;
            }
        }
        Ok(new_matches)
    }
}
