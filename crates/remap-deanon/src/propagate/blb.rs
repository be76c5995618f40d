//! Degree-similarity weighted propagation.
//!
//! Same mutual-confirmation sweep as the degree-weighted variant, but each
//! mapped neighbor contributes `min(d(v)/d(c), d(c)/d(v))^delta` — a
//! candidate whose degree resembles the vertex being matched scores
//! higher, with `delta` controlling how sharply the resemblance decays.

use rand::SeedableRng;
use rand::rngs::StdRng;
use remap_core::{Graph, Matches};

use super::{MapSide, PropagationAlgorithm, PropagationError, accept_candidate, neighbor_match_scores};

#[derive(Debug)]
pub struct Blb {
    theta: f64,
    delta: f64,
    rng: StdRng,
}

impl Blb {
    pub const DEFAULT_THETA: f64 = 0.01;
    pub const DEFAULT_DELTA: f64 = 0.5;

    #[must_use]
    pub fn new(theta: f64, delta: f64, seed: u64) -> Self {
        Self {
            theta,
            delta,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn with_defaults(seed: u64) -> Self {
        Self::new(Self::DEFAULT_THETA, Self::DEFAULT_DELTA, seed)
    }
}

fn similarity_term(delta: f64) -> impl Fn(usize, usize) -> f64 {
    move |d_v, d_c| {
        if d_v == 0 || d_c == 0 {
            return 0.0;
        }
        let (d_v, d_c) = (d_v as f64, d_c as f64);
        (d_v / d_c).min(d_c / d_v).powf(delta)
    }
}

impl PropagationAlgorithm for Blb {
    fn name(&self) -> &'static str {
        "blb"
    }

    fn run_round(
        &mut self,
        source: &Graph,
        target: &Graph,
        matches: &mut Matches,
    ) -> Result<usize, PropagationError> {
        let term = similarity_term(self.delta);
        let mut new_matches = 0;
        for v in source.sorted_vertices() {
            let forward =
                neighbor_match_scores(source, target, matches, v, MapSide::Forward, &term);
            let Some(candidate) = accept_candidate(&forward, self.theta, &mut self.rng) else {
                continue;
            };
            let reverse =
                neighbor_match_scores(target, source, matches, candidate, MapSide::Reverse, &term);
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
