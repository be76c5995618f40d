//! Grasshopper propagation.
//!
//! # Overview
//!
//! Each round rebuilds a per-vertex weight table over the mapped region:
//! a mapped vertex starts at 1 and gains 1 for every neighbor whose
//! mapping is also edge-consistent, then the weight is normalized by
//! `1/sqrt(deg_src·deg_tar)`. Candidate scores sum the weights of the
//! mapped images they are reached through, so well-corroborated regions
//! pull harder than lucky one-off agreements.
//!
//! Two deliberate departures from the simpler variants: the confidence
//! gate compares the top-two gap against the *population* deviation of
//! all candidate scores (a lone candidate can never pass), and proposals
//! are buffered and committed only at round end, so a sweep always scores
//! against the mapping the round started with.
//!
//! The variant carries its own step and wall-clock budget; exhausting
//! either forces a stop with a distinguishable reason.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use remap_core::{Graph, Matches, stats};

use super::{MapSide, PropagationAlgorithm, PropagationError, StopReason, two_largest};

#[derive(Debug)]
pub struct Grh {
    theta: f64,
    max_steps: usize,
    max_time: Duration,
    rng: StdRng,
    rounds: usize,
    started: Option<Instant>,
}

impl Grh {
    pub const DEFAULT_THETA: f64 = 1.0;
    pub const DEFAULT_MAX_STEPS: usize = 40;
    pub const DEFAULT_MAX_TIME: Duration = Duration::from_secs(1200);

    #[must_use]
    pub fn new(theta: f64, max_steps: usize, max_time: Duration, seed: u64) -> Self {
        Self {
            theta,
            max_steps,
            max_time,
            rng: StdRng::seed_from_u64(seed),
            rounds: 0,
            started: None,
        }
    }

    #[must_use]
    pub fn with_defaults(seed: u64) -> Self {
        Self::new(
            Self::DEFAULT_THETA,
            Self::DEFAULT_MAX_STEPS,
            Self::DEFAULT_MAX_TIME,
            seed,
        )
    }

    /// Population-deviation gate over all candidate scores.
    fn accept(&mut self, scores: &BTreeMap<u32, f64>) -> Option<u32> {
        if scores.is_empty() {
            return None;
        }
        let values: Vec<f64> = scores.values().copied().collect();
        let std = stats::population_std(&values);
        if std <= 0.0 {
            return None;
        }
        let (max, second) = two_largest(&values);
        if (max - second) / std < self.theta {
            return None;
        }
        let best: Vec<u32> = scores
            .iter()
            .filter(|&(_, &s)| s == max)
            .map(|(&v, _)| v)
            .collect();
        Some(best[self.rng.gen_range(0..best.len())])
    }
}

/// Weight tables for the mapped region, keyed by source and by target id.
fn weight_tables(
    source: &Graph,
    target: &Graph,
    matches: &Matches,
) -> (HashMap<u32, f64>, HashMap<u32, f64>) {
    let mut source_weights: HashMap<u32, f64> = HashMap::new();
    let mut target_weights: HashMap<u32, f64> = HashMap::new();
    for (v, tv) in matches.iter() {
        source_weights.insert(v, 1.0);
        target_weights.insert(tv, 1.0);
    }
    for (v, tv) in matches.iter() {
        for nbr in source.neighbors_of(v) {
            let Some(tn) = matches.get(nbr) else { continue };
            if target.contains_edge(tv, tn) || target.contains_edge(tn, tv) {
                if let Some(w) = source_weights.get_mut(&v) {
                    *w += 1.0;
                }
                if let Some(w) = target_weights.get_mut(&tv) {
                    *w += 1.0;
                }
            }
        }
    }
    for (v, tv) in matches.iter() {
        let product = (source.degree_of(v) * target.degree_of(tv)) as f64;
        let factor = if product > 0.0 {
            1.0 / product.sqrt()
        } else {
            0.0
        };
        if let Some(w) = source_weights.get_mut(&v) {
            *w *= factor;
        }
        if let Some(w) = target_weights.get_mut(&tv) {
            *w *= factor;
        }
    }
    (source_weights, target_weights)
}

/// Candidate scores for `v` using the weight of each mapped image it is
/// reached through. Already-mapped candidates stay eligible; a commit
/// simply rebinds them.
fn weighted_scores(
    from: &Graph,
    to: &Graph,
    matches: &Matches,
    v: u32,
    side: MapSide,
    image_weights: &HashMap<u32, f64>,
) -> BTreeMap<u32, f64> {
    let mut scores = BTreeMap::new();
    for nbr in from.neighbors_of(v) {
        let Some(image) = side.image(matches, nbr) else {
            continue;
        };
        let weight = image_weights.get(&image).copied().unwrap_or(0.0);
        for candidate in to.neighbors_of(image) {
            *scores.entry(candidate).or_insert(0.0) += weight;
        }
    }
    scores
}

impl PropagationAlgorithm for Grh {
    fn name(&self) -> &'static str {
        "grh"
    }

    fn budget_exceeded(&self) -> Option<StopReason> {
        if self.rounds >= self.max_steps {
            return Some(StopReason::StepBudget);
        }
        if let Some(started) = self.started {
            if started.elapsed() > self.max_time {
                return Some(StopReason::TimeBudget);
            }
        }
        None
    }

    fn run_round(
        &mut self,
        source: &Graph,
        target: &Graph,
        matches: &mut Matches,
    ) -> Result<usize, PropagationError> {
        self.started.get_or_insert_with(Instant::now);
        self.rounds += 1;

        let (source_weights, target_weights) = weight_tables(source, target, matches);

        let mut staged = matches.clone();
        let mut new_matches = 0;
        for v in source.sorted_vertices() {
            let forward =
                weighted_scores(source, target, matches, v, MapSide::Forward, &target_weights);
            let Some(candidate) = self.accept(&forward) else {
                continue;
            };
            if matches.get(v) == Some(candidate) {
                continue;
            }
            let reverse = weighted_scores(
                target,
                source,
                matches,
                candidate,
                MapSide::Reverse,
                &source_weights,
            );
            let Some(confirmed) = self.accept(&reverse) else {
                continue;
            };
            if confirmed == v && staged.add(v, candidate) {
                new_matches += 1;
            }
        }
        *matches = staged;
        Ok(new_matches)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{PropagationConfig, run};
    use super::*;

    fn star() -> Graph {
        let mut g = Graph::new_undirected();
        for v in 0..5 {
            g.add_vertex(v);
        }
        for leaf in 1..5 {
            g.add_edge(0, leaf);
        }
        g
    }

    #[test]
    fn weight_tables_reward_edge_consistency() {
        // Path 0-1-2, fully mapped to itself: the interior vertex has two
        // edge-consistent mapped neighbors.
        let mut g = Graph::new_undirected();
        for v in 0..3 {
            g.add_vertex(v);
        }
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        let matches = Matches::from_self_pairs(&[0, 1, 2]);
        let (src_w, _) = weight_tables(&g, &g, &matches);

        // vertex 1: (1 + 2) / sqrt(2·2); vertex 0: (1 + 1) / sqrt(1·1)
        assert!((src_w[&1] - 1.5).abs() < 1e-12);
        assert!((src_w[&0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn indistinguishable_leaves_never_commit() {
        let g = star();
        let seeds = Matches::from_self_pairs(&[0]);
        let mut algo = Grh::with_defaults(3);
        let outcome = run(
            &mut algo,
            &g,
            &g,
            seeds,
            &PropagationConfig::default(),
            &mut (),
        )
        .expect("run");
        // All four leaves tie, so the population gate rejects every round.
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.stop, super::super::StopReason::Converged);
    }

    #[test]
    fn step_budget_forces_stop() {
        let g = star();
        let seeds = Matches::from_self_pairs(&[0]);
        let mut algo = Grh::new(0.0, 0, Duration::from_secs(3600), 1);
        let outcome = run(
            &mut algo,
            &g,
            &g,
            seeds,
            &PropagationConfig::default(),
            &mut (),
        )
        .expect("run");
        assert_eq!(outcome.stop, StopReason::StepBudget);
        assert_eq!(outcome.rounds, 0);
    }
}
