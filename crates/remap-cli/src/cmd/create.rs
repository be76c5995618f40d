use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use remap_core::records;
use remap_core::tgf::{self, LoadOptions};
use remap_deanon::perturb::{self, EdgeSampleParams, SampledParams, SeedGrowParams};
use serde::Serialize;

use crate::output::{self, OutputMode};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Model {
    /// Undirected shared-core edge sampling.
    Ns09,
    /// Directed shared-core edge sampling.
    Dns09,
    /// Independent vertex/edge sampling per side.
    Sampled,
    /// BFS core export plus randomized private growth.
    SeedGrow,
}

#[derive(Args, Debug)]
pub struct CreateDataArgs {
    /// Input graph as a whitespace-separated edge list.
    pub graph: PathBuf,

    /// Treat the input as a directed graph.
    #[arg(long)]
    pub directed: bool,

    /// Perturbation model.
    #[arg(long, value_enum, default_value_t = Model::Ns09)]
    pub model: Model,

    /// Fraction of vertices shared between the two outputs (edge-sampling models).
    #[arg(long, default_value_t = 0.5)]
    pub alpha_v: f64,

    /// Edge-overlap parameter (edge-sampling models).
    #[arg(long, default_value_t = 0.75)]
    pub alpha_e: f64,

    /// Vertex-keep fraction (sampled model).
    #[arg(long, default_value_t = 0.5)]
    pub s_v: f64,

    /// Edge-keep fraction (sampled model).
    #[arg(long, default_value_t = 0.5)]
    pub s_e: f64,

    /// Shared-core size (seed-grow model).
    #[arg(long, default_value_t = 1000)]
    pub common_size: usize,

    /// Private vertices grown per side (seed-grow model).
    #[arg(long, default_value_t = 0)]
    pub extra_size: usize,

    /// Target-side edge-addition rate (seed-grow model).
    #[arg(long, default_value_t = 0.0)]
    pub perturbation_rate: f64,

    /// Directory the pair is written into.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Base name for the outputs; defaults to the input stem plus a timestamp.
    #[arg(long)]
    pub name: Option<String>,

    /// RNG seed for a reproducible pair.
    #[arg(long, default_value_t = 0)]
    pub rng_seed: u64,
}

#[derive(Debug, Serialize)]
struct CreateDataReport {
    name: String,
    model: String,
    source_vertices: usize,
    source_edges: usize,
    target_vertices: usize,
    target_edges: usize,
    common_vertices: usize,
    source_file: String,
    target_file: String,
    overlap_file: String,
}

pub fn run_create_data(args: &CreateDataArgs, output: OutputMode) -> Result<()> {
    let opts = LoadOptions::for_kind(super::kind_flag(args.directed));
    let graph = tgf::load_graph(&args.graph, &opts)
        .with_context(|| format!("failed to load graph {}", args.graph.display()))?;

    let mut rng = StdRng::seed_from_u64(args.rng_seed);
    let pair = match args.model {
        Model::Ns09 => perturb::ns09(
            &graph,
            &EdgeSampleParams {
                alpha_v: args.alpha_v,
                alpha_e: args.alpha_e,
            },
            &mut rng,
        )?,
        Model::Dns09 => perturb::dns09(
            &graph,
            &EdgeSampleParams {
                alpha_v: args.alpha_v,
                alpha_e: args.alpha_e,
            },
            &mut rng,
        )?,
        Model::Sampled => perturb::sampled(
            &graph,
            &SampledParams {
                s_v: args.s_v,
                s_e: args.s_e,
            },
            &mut rng,
        )?,
        Model::SeedGrow => perturb::seed_and_grow(
            &graph,
            &SeedGrowParams {
                common_size: args.common_size,
                extra_size: args.extra_size,
                perturbation_rate: args.perturbation_rate,
            },
            &mut rng,
        )?,
    };

    let name = args.name.clone().unwrap_or_else(|| {
        format!(
            "{}-{}",
            super::file_prefix(&args.graph),
            chrono::Utc::now().format("%Y%m%d%H%M%S")
        )
    });
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let source_path = args.out_dir.join(format!("{name}.src.tgf"));
    let target_path = args.out_dir.join(format!("{name}.tar.tgf"));
    let overlap_path = args.out_dir.join(format!("{name}.ovl"));

    tgf::write_graph(&pair.source, &source_path)
        .with_context(|| format!("failed to write {}", source_path.display()))?;
    tgf::write_graph(&pair.target, &target_path)
        .with_context(|| format!("failed to write {}", target_path.display()))?;
    let common = pair.common_vertices();
    records::write_id_list(&overlap_path, &common)
        .with_context(|| format!("failed to write {}", overlap_path.display()))?;

    let report = CreateDataReport {
        name,
        model: format!("{:?}", args.model).to_lowercase(),
        source_vertices: pair.source.vertex_count(),
        source_edges: pair.source.edge_count(),
        target_vertices: pair.target.vertex_count(),
        target_edges: pair.target.edge_count(),
        common_vertices: common.len(),
        source_file: source_path.display().to_string(),
        target_file: target_path.display().to_string(),
        overlap_file: overlap_path.display().to_string(),
    };
    output::render(output, &report, |r, w| {
        output::kv(w, "pair", &r.name)?;
        output::kv(w, "model", &r.model)?;
        output::kv(
            w,
            "source",
            format!("{} vertices, {} edges", r.source_vertices, r.source_edges),
        )?;
        output::kv(
            w,
            "target",
            format!("{} vertices, {} edges", r.target_vertices, r.target_edges),
        )?;
        output::kv(w, "overlap", r.common_vertices)
    })
}
