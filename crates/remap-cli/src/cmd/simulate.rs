use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use remap_core::tgf::{self, LoadOptions};
use remap_core::{Graph, GroundTruth, Matches, records};
use remap_deanon::propagate::{
    self, Blb, Dns09, Grh, LogProgress, Ns09, PropagationAlgorithm, PropagationConfig, Sng,
    SngCompat,
};
use remap_deanon::seeding::{self, SeedingConfig};
use remap_metrics::cache;
use remap_metrics::{LtaVariant, Metric};
use serde::Serialize;
use tracing::info;

use crate::output::{self, OutputMode};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Seeding {
    /// Highest-degree common vertices.
    Top,
    /// Uniform sample from the (optionally degree-restricted) common pool.
    Random,
    /// Randomized BFS trees over the common pool.
    Bfs,
    /// Greedy k-cliques grown from random common vertices.
    Cliques,
    /// Ranked by a cached per-vertex metric.
    Dict,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Algo {
    Ns09,
    Dns09,
    Blb,
    Grh,
    Sng,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DictMetric {
    Degree,
    Clustering,
    LtaA,
    LtaB,
    LtaC,
    LtaD,
    Betweenness,
    Closeness,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Source (anonymized) graph.
    pub source: PathBuf,

    /// Target (auxiliary) graph.
    pub target: PathBuf,

    /// Treat both graphs as directed.
    #[arg(long)]
    pub directed: bool,

    /// Vertex-overlap cache recording the ground-truth common set.
    #[arg(long, value_name = "PATH")]
    pub overlap: PathBuf,

    /// Optional extended ground-truth mapping file.
    #[arg(long, value_name = "PATH")]
    pub mapping: Option<PathBuf>,

    /// Seed-selection strategy.
    #[arg(long, value_enum, default_value_t = Seeding::Top)]
    pub seeding: Seeding,

    /// Number of seed pairs requested.
    #[arg(long, default_value_t = 20)]
    pub seed_count: usize,

    /// Restrict seed pools to this top-degree fraction.
    #[arg(long)]
    pub top_percent: Option<f64>,

    /// Extra common vertices consumed per tree (bfs strategy).
    #[arg(long, default_value_t = 4)]
    pub bfs_size: usize,

    /// Clique size (cliques strategy).
    #[arg(long, default_value_t = 4)]
    pub clique_size: usize,

    /// Number of cliques (cliques strategy).
    #[arg(long, default_value_t = 5)]
    pub clique_count: usize,

    /// Metric ranking the dict strategy draws from.
    #[arg(long, value_enum, default_value_t = DictMetric::Degree)]
    pub dict_metric: DictMetric,

    /// Fraction of the ranking skipped before taking seeds (dict strategy).
    #[arg(long, default_value_t = 0.0)]
    pub skip_fraction: f64,

    /// Take dict seeds from the top of the ranking instead of the bottom.
    #[arg(long)]
    pub from_top: bool,

    /// Metric cache directory (dict strategy).
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub cache_dir: PathBuf,

    /// Propagation variant.
    #[arg(long, value_enum, default_value_t = Algo::Ns09)]
    pub algo: Algo,

    /// Eccentricity confidence threshold.
    #[arg(long, default_value_t = 0.5)]
    pub theta: f64,

    /// Degree-similarity exponent (blb).
    #[arg(long, default_value_t = Blb::DEFAULT_DELTA)]
    pub delta: f64,

    /// Hard cap on propagation rounds.
    #[arg(long, default_value_t = 1000)]
    pub max_rounds: usize,

    /// Grasshopper step budget.
    #[arg(long, default_value_t = Grh::DEFAULT_MAX_STEPS)]
    pub grh_max_steps: usize,

    /// Grasshopper wall-clock budget in seconds.
    #[arg(long, default_value_t = 1200)]
    pub grh_max_time: u64,

    /// Reproduce the published seed-and-grow minima quirk.
    #[arg(long)]
    pub sng_faithful: bool,

    /// RNG seed shared by seeding and propagation tie-breaks.
    #[arg(long, default_value_t = 0)]
    pub rng_seed: u64,

    /// Persist the resulting mapping under this path prefix (.dat / .edat).
    #[arg(long, value_name = "PREFIX")]
    pub save_matches: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SimulateReport {
    algorithm: String,
    seeding: String,
    seeds: usize,
    rounds: usize,
    stop: String,
    matched: usize,
    correct: usize,
    incorrect: usize,
    unknown: usize,
    rate: f64,
    finished_at: String,
}

pub fn run_simulate(args: &SimulateArgs, output: OutputMode) -> Result<()> {
    let opts = LoadOptions::for_kind(super::kind_flag(args.directed));
    let source = tgf::load_graph(&args.source, &opts)
        .with_context(|| format!("failed to load source graph {}", args.source.display()))?;
    let target = tgf::load_graph(&args.target, &opts)
        .with_context(|| format!("failed to load target graph {}", args.target.display()))?;
    let truth = GroundTruth::load(&args.overlap, args.mapping.as_deref())
        .context("failed to load ground truth")?;

    let mut rng = StdRng::seed_from_u64(args.rng_seed);
    let seed_ids = select_seeds(args, &source, &truth, &mut rng);
    info!(seeds = seed_ids.len(), "seed selection finished");
    let seeds = Matches::from_self_pairs(&seed_ids);

    let mut algorithm = build_algorithm(args);
    let outcome = propagate::run(
        algorithm.as_mut(),
        &source,
        &target,
        seeds,
        &PropagationConfig {
            max_rounds: args.max_rounds,
        },
        &mut LogProgress,
    )?;

    if let Some(prefix) = &args.save_matches {
        save_matches(prefix, &truth, &outcome.matches)?;
    }

    let accuracy = truth.accuracy(&outcome.matches);
    let report = SimulateReport {
        algorithm: algorithm.name().to_string(),
        seeding: format!("{:?}", args.seeding).to_lowercase(),
        seeds: seed_ids.len(),
        rounds: outcome.rounds,
        stop: format!("{:?}", outcome.stop),
        matched: outcome.matches.len(),
        correct: accuracy.correct,
        incorrect: accuracy.incorrect,
        unknown: accuracy.unknown,
        rate: accuracy.rate(),
        finished_at: chrono::Utc::now().to_rfc3339(),
    };
    output::render(output, &report, |r, w| {
        output::kv(w, "algorithm", &r.algorithm)?;
        output::kv(w, "seeding", format!("{} ({} seeds)", r.seeding, r.seeds))?;
        output::kv(w, "rounds", format!("{} ({})", r.rounds, r.stop))?;
        output::kv(w, "matched", r.matched)?;
        output::kv(
            w,
            "accuracy",
            format!(
                "{} correct, {} incorrect, {} unknown (rate {:.4})",
                r.correct, r.incorrect, r.unknown, r.rate
            ),
        )
    })
}

fn select_seeds(
    args: &SimulateArgs,
    source: &Graph,
    truth: &GroundTruth,
    rng: &mut StdRng,
) -> Vec<u32> {
    let common = truth.common_vertices();
    let config = SeedingConfig::default();
    match args.seeding {
        Seeding::Top => seeding::top_degree(source, common, args.seed_count),
        Seeding::Random => {
            seeding::random_from_top(source, common, args.seed_count, args.top_percent, rng)
        }
        Seeding::Bfs => seeding::bfs_pattern(
            source,
            common,
            args.seed_count,
            args.bfs_size,
            args.top_percent,
            &config,
            rng,
        ),
        Seeding::Cliques => seeding::cliques_from_top(
            source,
            common,
            args.clique_size,
            args.clique_count,
            args.top_percent,
            &config,
            rng,
        ),
        Seeding::Dict => {
            let scores = dict_scores(args, source);
            seeding::dictionary_ranked(
                &scores,
                common,
                args.seed_count,
                args.skip_fraction,
                args.from_top,
            )
        }
    }
}

/// Per-vertex ranking for the dictionary strategy, served from the metric
/// cache keyed by the source graph's file stem.
fn dict_scores(args: &SimulateArgs, source: &Graph) -> BTreeMap<u32, f64> {
    let prefix = super::file_prefix(&args.source);
    let dir = args.cache_dir.as_path();
    match args.dict_metric {
        DictMetric::Degree => cache::load_or_compute(source, dir, &prefix, Metric::Degree, None),
        DictMetric::Clustering => {
            cache::load_or_compute(source, dir, &prefix, Metric::Clustering, None)
        }
        DictMetric::LtaA => {
            cache::load_or_compute(source, dir, &prefix, Metric::Lta(LtaVariant::A), None)
        }
        DictMetric::LtaB => {
            cache::load_or_compute(source, dir, &prefix, Metric::Lta(LtaVariant::B), None)
        }
        DictMetric::LtaC => {
            cache::load_or_compute(source, dir, &prefix, Metric::Lta(LtaVariant::C), None)
        }
        DictMetric::LtaD => {
            cache::load_or_compute(source, dir, &prefix, Metric::Lta(LtaVariant::D), None)
        }
        DictMetric::Betweenness => {
            cache::load_or_compute_centrality(source, dir, &prefix, None).betweenness
        }
        DictMetric::Closeness => {
            cache::load_or_compute_centrality(source, dir, &prefix, None).closeness
        }
    }
}

fn build_algorithm(args: &SimulateArgs) -> Box<dyn PropagationAlgorithm> {
    match args.algo {
        Algo::Ns09 => Box::new(Ns09::new(args.theta, args.rng_seed)),
        Algo::Dns09 => Box::new(Dns09::new(args.theta, args.rng_seed)),
        Algo::Blb => Box::new(Blb::new(args.theta, args.delta, args.rng_seed)),
        Algo::Grh => Box::new(Grh::new(
            args.theta,
            args.grh_max_steps,
            Duration::from_secs(args.grh_max_time),
            args.rng_seed,
        )),
        Algo::Sng => Box::new(Sng::new(if args.sng_faithful {
            SngCompat::Faithful
        } else {
            SngCompat::Fixed
        })),
    }
}

/// Write the ground-truth-restricted mapping (`.dat`) and the full mapping
/// (`.edat`) next to each other.
fn save_matches(prefix: &PathBuf, truth: &GroundTruth, matches: &Matches) -> Result<()> {
    let restricted = truth.restricted_pairs(matches);
    let full: Vec<(u32, u32)> = matches.iter().collect();

    let dat = prefix.with_extension("dat");
    let edat = prefix.with_extension("edat");
    records::write_matches(&dat, &restricted)
        .with_context(|| format!("failed to write {}", dat.display()))?;
    records::write_matches(&edat, &full)
        .with_context(|| format!("failed to write {}", edat.display()))?;
    info!(restricted = restricted.len(), full = full.len(), "mapping persisted");
    Ok(())
}
