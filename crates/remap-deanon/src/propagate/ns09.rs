//! Degree-weighted propagation for undirected pairs.
//!
//! For every source vertex adjacent to the mapped region, each target
//! candidate reachable through a mapped neighbor scores
//! `Σ 1/sqrt(deg(candidate))` over those neighbors; the top candidate must
//! pass the eccentricity gate and be confirmed by the symmetric reverse
//! sweep before the pair is committed. Matches are mutated in place, so a
//! pair registered early in a round is visible to the rest of the round.

use rand::SeedableRng;
use rand::rngs::StdRng;
use remap_core::{Graph, Matches};

use super::{MapSide, PropagationAlgorithm, PropagationError, accept_candidate, neighbor_match_scores};

#[derive(Debug)]
pub struct Ns09 {
    theta: f64,
    rng: StdRng,
}

impl Ns09 {
    /// `theta` gates candidate confidence; `seed` drives tie-breaking.
    #[must_use]
    pub fn new(theta: f64, seed: u64) -> Self {
        Self {
            theta,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

fn degree_term(_d_v: usize, d_candidate: usize) -> f64 {
    1.0 / (d_candidate as f64).sqrt()
}

impl PropagationAlgorithm for Ns09 {
    fn name(&self) -> &'static str {
        "ns09"
    }

    fn run_round(
        &mut self,
        source: &Graph,
        target: &Graph,
        matches: &mut Matches,
    ) -> Result<usize, PropagationError> {
        let mut new_matches = 0;
        for v in source.sorted_vertices() {
            let forward =
                neighbor_match_scores(source, target, matches, v, MapSide::Forward, degree_term);
            let Some(candidate) = accept_candidate(&forward, self.theta, &mut self.rng) else {
                continue;
            };
            let reverse = neighbor_match_scores(
                target,
                source,
                matches,
                candidate,
                MapSide::Reverse,
                degree_term,
            );
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
