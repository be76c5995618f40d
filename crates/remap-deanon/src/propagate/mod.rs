//! Iterative matching propagation.
//!
//! # Overview
//!
//! The engine is a two-state machine: `RUNNING` while rounds keep
//! registering new or changed matches, `CONVERGED` as soon as a full sweep
//! registers none. The round loop lives here in [`run`]; the five
//! interchangeable algorithms implement [`PropagationAlgorithm`] and share
//! the "propose forward, confirm in reverse, accept on mutual agreement"
//! shape while differing in how candidates are scored.
//!
//! Confidence gating uses *eccentricity*: the gap between the best and
//! second-best candidate score normalized by the score spread. Fewer than
//! two candidates or a zero spread defines eccentricity as 0, which
//! rejects the proposal for the round — normal control flow, not an error.
//!
//! An overall round cap guards every variant against pathological
//! non-convergence; the Grasshopper variant additionally carries its own
//! step and wall-clock budget, reported as a distinguishable stop reason.

use std::collections::BTreeMap;

use rand::Rng;
use remap_core::{Graph, GraphKind, Matches, stats};
use thiserror::Error;
use tracing::{info, instrument};

mod blb;
mod dns09;
mod grh;
mod ns09;
mod sng;

pub use blb::Blb;
pub use dns09::Dns09;
pub use grh::Grh;
pub use ns09::Ns09;
pub use sng::{Sng, SngCompat};

#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("{algorithm} requires a {expected:?} graph pair")]
    KindMismatch {
        algorithm: &'static str,
        expected: GraphKind,
    },
}

/// Why a propagation run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A round registered no new match.
    Converged,
    /// The overall round cap was reached.
    MaxRounds,
    /// The algorithm's own step budget ran out (Grasshopper).
    StepBudget,
    /// The algorithm's own wall-clock budget ran out (Grasshopper).
    TimeBudget,
}

#[derive(Debug, Clone, Copy)]
pub struct PropagationConfig {
    /// Hard cap on rounds for every algorithm.
    pub max_rounds: usize,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self { max_rounds: 1000 }
    }
}

#[derive(Debug, Clone)]
pub struct PropagationOutcome {
    pub matches: Matches,
    pub rounds: usize,
    pub stop: StopReason,
}

/// Round-by-round progress hook (replaces ad-hoc debug UIs).
pub trait ProgressObserver {
    fn on_round(&mut self, round: usize, total_matches: usize, new_matches: usize);
}

/// Observer that logs each round via `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_round(&mut self, round: usize, total_matches: usize, new_matches: usize) {
        info!(round, total_matches, new_matches, "propagation round");
    }
}

impl ProgressObserver for () {
    fn on_round(&mut self, _round: usize, _total_matches: usize, _new_matches: usize) {}
}

/// One interchangeable propagation algorithm.
pub trait PropagationAlgorithm {
    fn name(&self) -> &'static str;

    /// Cooperative budget check, consulted once before each round.
    fn budget_exceeded(&self) -> Option<StopReason> {
        None
    }

    /// One full sweep; returns the number of new or changed matches.
    ///
    /// # Errors
    ///
    /// Fails only on a graph-kind mismatch.
    fn run_round(
        &mut self,
        source: &Graph,
        target: &Graph,
        matches: &mut Matches,
    ) -> Result<usize, PropagationError>;
}

/// Drive an algorithm to convergence (or a budget stop) from a seed set.
///
/// An empty seed set converges immediately with zero rounds: no variant
/// can grow a mapping out of nothing.
///
/// # Errors
///
/// Propagates [`PropagationError`] from the algorithm.
#[instrument(skip_all, fields(algorithm = algorithm.name(), seeds = seeds.len()))]
pub fn run<A>(
    algorithm: &mut A,
    source: &Graph,
    target: &Graph,
    seeds: Matches,
    config: &PropagationConfig,
    observer: &mut dyn ProgressObserver,
) -> Result<PropagationOutcome, PropagationError>
where
    A: PropagationAlgorithm + ?Sized,
{
    let mut matches = seeds;
    if matches.is_empty() {
        info!("empty seed set; converged immediately");
        return Ok(PropagationOutcome {
            matches,
            rounds: 0,
            stop: StopReason::Converged,
        });
    }

    let mut rounds = 0;
    let stop = loop {
        if rounds >= config.max_rounds {
            break StopReason::MaxRounds;
        }
        if let Some(reason) = algorithm.budget_exceeded() {
            break reason;
        }
        let new_matches = algorithm.run_round(source, target, &mut matches)?;
        rounds += 1;
        observer.on_round(rounds, matches.len(), new_matches);
        if new_matches == 0 {
            break StopReason::Converged;
        }
    };

    info!(rounds, matches = matches.len(), ?stop, "propagation finished");
    Ok(PropagationOutcome {
        matches,
        rounds,
        stop,
    })
}

// ---------------------------------------------------------------------------
// Shared scoring machinery
// ---------------------------------------------------------------------------

/// Which way the mapping is read during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MapSide {
    Forward,
    Reverse,
}

impl MapSide {
    pub(crate) fn image(self, matches: &Matches, v: u32) -> Option<u32> {
        match self {
            Self::Forward => matches.get(v),
            Self::Reverse => matches.get_reverse(v),
        }
    }

    pub(crate) fn is_taken(self, matches: &Matches, v: u32) -> bool {
        match self {
            Self::Forward => matches.contains_target(v),
            Self::Reverse => matches.contains_source(v),
        }
    }
}

/// `(max − second max) / sample standard deviation`; 0 when fewer than two
/// scores or the spread is zero.
pub(crate) fn eccentricity(scores: &[f64]) -> f64 {
    if scores.len() < 2 {
        return 0.0;
    }
    let (max, second) = two_largest(scores);
    let std = stats::sample_std(scores);
    if std == 0.0 {
        return 0.0;
    }
    (max - second) / std
}

pub(crate) fn two_largest(scores: &[f64]) -> (f64, f64) {
    let mut max = f64::NEG_INFINITY;
    let mut second = f64::NEG_INFINITY;
    for &s in scores {
        if s >= max {
            second = max;
            max = s;
        } else if s > second {
            second = s;
        }
    }
    (max, second)
}

/// Candidate scores for `v`: walk its neighbors whose image is known, then
/// score each non-taken neighbor of the image with `term(deg(v), deg(candidate))`.
pub(crate) fn neighbor_match_scores(
    from: &Graph,
    to: &Graph,
    matches: &Matches,
    v: u32,
    side: MapSide,
    term: impl Fn(usize, usize) -> f64,
) -> BTreeMap<u32, f64> {
    let d_v = from.degree_of(v);
    let mut scores = BTreeMap::new();
    for nbr in from.neighbors_of(v) {
        let Some(image) = side.image(matches, nbr) else {
            continue;
        };
        for candidate in to.neighbors_of(image) {
            if side.is_taken(matches, candidate) {
                continue;
            }
            let d_c = to.degree_of(candidate);
            if d_c == 0 {
                continue; // ineligible rather than a division fault
            }
            *scores.entry(candidate).or_insert(0.0) += term(d_v, d_c);
        }
    }
    scores
}

/// Gate the candidate map: unique candidates pass outright, otherwise the
/// eccentricity of the score distribution must reach `theta`. Max-score
/// ties resolve through the RNG.
pub(crate) fn accept_candidate<R: Rng + ?Sized>(
    scores: &BTreeMap<u32, f64>,
    theta: f64,
    rng: &mut R,
) -> Option<u32> {
    if scores.is_empty() {
        return None;
    }
    if scores.len() == 1 {
        return scores.keys().next().copied();
    }
    let values: Vec<f64> = scores.values().copied().collect();
    if eccentricity(&values) < theta {
        return None;
    }
    let (max, _) = two_largest(&values);
    let best: Vec<u32> = scores
        .iter()
        .filter(|&(_, &s)| s == max)
        .map(|(&v, _)| v)
        .collect();
    Some(best[rng.gen_range(0..best.len())])
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn eccentricity_edge_cases() {
        assert_eq!(eccentricity(&[]), 0.0);
        assert_eq!(eccentricity(&[3.0]), 0.0);
        assert_eq!(eccentricity(&[2.0, 2.0]), 0.0, "zero spread rejects");
        assert!(eccentricity(&[1.0, 5.0]) > 0.0);
    }

    #[test]
    fn eccentricity_of_known_distribution() {
        // values 1, 1, 4: std = sqrt(3), gap = 3
        let e = eccentricity(&[1.0, 1.0, 4.0]);
        assert!((e - 3.0 / 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn unique_candidate_bypasses_gate() {
        let mut rng = StdRng::seed_from_u64(0);
        let scores: BTreeMap<u32, f64> = [(7, 0.5)].into_iter().collect();
        assert_eq!(accept_candidate(&scores, f64::MAX, &mut rng), Some(7));
    }

    #[test]
    fn tied_scores_are_rejected_by_gate() {
        let mut rng = StdRng::seed_from_u64(0);
        let scores: BTreeMap<u32, f64> = [(1, 1.0), (2, 1.0)].into_iter().collect();
        assert_eq!(accept_candidate(&scores, 0.5, &mut rng), None);
    }

    #[test]
    fn clear_winner_passes_gate() {
        let mut rng = StdRng::seed_from_u64(0);
        let scores: BTreeMap<u32, f64> = [(1, 0.1), (2, 0.2), (3, 5.0)].into_iter().collect();
        assert_eq!(accept_candidate(&scores, 1.0, &mut rng), Some(3));
    }

    #[test]
    fn empty_seed_set_converges_without_rounds() {
        let mut g = Graph::new_undirected();
        g.add_vertex(0);
        let mut algo = Ns09::new(1.0, 0);
        let outcome = run(
            &mut algo,
            &g,
            &g,
            Matches::new(),
            &PropagationConfig::default(),
            &mut (),
        )
        .expect("run");
        assert_eq!(outcome.rounds, 0);
        assert_eq!(outcome.stop, StopReason::Converged);
        assert!(outcome.matches.is_empty());
    }
}
