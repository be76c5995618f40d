//! Seeding strategies.
//!
//! # Overview
//!
//! Every strategy selects seeds from the ground-truth common-vertex set
//! only — a seeder never invents correspondences outside it. The returned
//! source ids are self-paired into the initial [`remap_core::Matches`] by
//! the caller: seeds are an assumption that the attacker already knows
//! those correspondences, not a claim the seeder verified them.
//!
//! Asking for more seeds than the candidate pool holds returns the whole
//! pool. Ordering is deterministic: stable sorts tie-break on ascending
//! vertex id, and random draws come from the caller-provided RNG.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use rand::Rng;
use rand::seq::SliceRandom;
use remap_core::Graph;
use tracing::{debug, warn};

/// Shared knobs for the iterative strategies.
#[derive(Debug, Clone, Copy)]
pub struct SeedingConfig {
    /// Wall-clock budget for the BFS-pattern and clique strategies.
    pub timeout: Duration,
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
        }
    }
}

/// Common vertices sorted by descending source degree (ascending id on
/// ties).
fn by_descending_degree(graph: &Graph, common: &BTreeSet<u32>) -> Vec<u32> {
    let mut pool: Vec<u32> = common.iter().copied().collect();
    pool.sort_by_key(|&v| Reverse(graph.degree_of(v)));
    pool
}

/// Optionally restrict the pool to the top `top_percent` by degree
/// (truncating, like the historical selection).
fn degree_filtered(graph: &Graph, common: &BTreeSet<u32>, top_percent: Option<f64>) -> Vec<u32> {
    let mut pool = by_descending_degree(graph, common);
    if let Some(percent) = top_percent {
        let take = ((pool.len() as f64) * percent) as usize;
        pool.truncate(take.min(pool.len()));
    }
    pool
}

/// Top-degree strategy: the `seed_count` highest-degree common vertices.
#[must_use]
pub fn top_degree(graph: &Graph, common: &BTreeSet<u32>, seed_count: usize) -> Vec<u32> {
    let mut pool = by_descending_degree(graph, common);
    pool.truncate(seed_count);
    pool
}

/// Uniform random sample (without replacement) from the optionally
/// degree-restricted common pool.
#[must_use]
pub fn random_from_top<R: Rng + ?Sized>(
    graph: &Graph,
    common: &BTreeSet<u32>,
    seed_count: usize,
    top_percent: Option<f64>,
    rng: &mut R,
) -> Vec<u32> {
    let mut pool = degree_filtered(graph, common, top_percent);
    pool.shuffle(rng);
    pool.truncate(seed_count);
    pool
}

/// BFS-pattern strategy: repeatedly root a tree at a random pool vertex and
/// consume up to `bfs_size` additional common vertices per tree, so seeds
/// come in structurally clustered groups.
#[must_use]
pub fn bfs_pattern<R: Rng + ?Sized>(
    graph: &Graph,
    common: &BTreeSet<u32>,
    seed_count: usize,
    bfs_size: usize,
    top_percent: Option<f64>,
    config: &SeedingConfig,
    rng: &mut R,
) -> Vec<u32> {
    let mut pool: BTreeSet<u32> = degree_filtered(graph, common, top_percent)
        .into_iter()
        .collect();
    let mut seeds = Vec::new();
    let started = Instant::now();

    while seeds.len() < seed_count && !pool.is_empty() {
        if started.elapsed() > config.timeout {
            warn!(collected = seeds.len(), "seeding timeout; returning partial seed set");
            break;
        }
        let root = take_random(&mut pool, rng);
        seeds.push(root);

        let mut consumed = 0usize;
        let mut queue = std::collections::VecDeque::from([root]);
        while let Some(v) = queue.pop_front() {
            if consumed >= bfs_size || seeds.len() >= seed_count {
                break;
            }
            let mut nbrs: Vec<u32> = graph.neighbors_of(v).into_iter().collect();
            nbrs.shuffle(rng);
            for nbr in nbrs {
                if consumed >= bfs_size || seeds.len() >= seed_count {
                    break;
                }
                if pool.remove(&nbr) {
                    seeds.push(nbr);
                    queue.push_back(nbr);
                    consumed += 1;
                }
            }
        }
    }
    debug!(seeds = seeds.len(), "bfs-pattern seeding done");
    seeds
}

/// k-clique strategy: grow cliques of exactly `clique_size` vertices inside
/// the common pool by intersecting neighbor candidate sets; members of up
/// to `clique_count` cliques become seeds.
#[must_use]
pub fn cliques_from_top<R: Rng + ?Sized>(
    graph: &Graph,
    common: &BTreeSet<u32>,
    clique_size: usize,
    clique_count: usize,
    top_percent: Option<f64>,
    config: &SeedingConfig,
    rng: &mut R,
) -> Vec<u32> {
    let mut pool: BTreeSet<u32> = degree_filtered(graph, common, top_percent)
        .into_iter()
        .collect();
    let mut seeds = Vec::new();
    let mut found = 0usize;
    let started = Instant::now();

    while found < clique_count && !pool.is_empty() {
        if started.elapsed() > config.timeout {
            warn!(found, "seeding timeout; returning partial clique set");
            break;
        }
        let start = take_random(&mut pool, rng);
        let mut clique = vec![start];
        let mut candidates: BTreeSet<u32> = graph
            .neighbors_of(start)
            .into_iter()
            .filter(|v| pool.contains(v))
            .collect();

        while clique.len() < clique_size && !candidates.is_empty() {
            let next = take_random(&mut candidates, rng);
            candidates.retain(|&c| graph.neighbors_of(next).contains(&c));
            clique.push(next);
        }

        if clique.len() == clique_size {
            for &member in &clique {
                pool.remove(&member);
            }
            seeds.extend(clique);
            found += 1;
        }
        // failed attempts only burn the start vertex, already removed
    }
    debug!(cliques = found, seeds = seeds.len(), "clique seeding done");
    seeds
}

/// Dictionary-ranked strategy: rank the common vertices by any precomputed
/// score map, optionally skip a fraction from the chosen end, and take the
/// next `seed_count`.
#[must_use]
pub fn dictionary_ranked(
    scores: &std::collections::BTreeMap<u32, f64>,
    common: &BTreeSet<u32>,
    seed_count: usize,
    skip_fraction: f64,
    from_top: bool,
) -> Vec<u32> {
    let mut ranked: Vec<(u32, f64)> = scores
        .iter()
        .filter(|(v, _)| common.contains(v))
        .map(|(&v, &s)| (v, s))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    if from_top {
        ranked.reverse();
    }
    let skip = ((ranked.len() as f64) * skip_fraction) as usize;
    ranked
        .into_iter()
        .skip(skip)
        .take(seed_count)
        .map(|(v, _)| v)
        .collect()
}

fn take_random<R: Rng + ?Sized>(pool: &mut BTreeSet<u32>, rng: &mut R) -> u32 {
    let idx = rng.gen_range(0..pool.len());
    let v = *pool
        .iter()
        .nth(idx)
        .unwrap_or_else(|| unreachable!("index is bounded by pool length"));
    pool.remove(&v);
    v
}
