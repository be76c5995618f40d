use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::Args;
use rand::SeedableRng;
use rand::rngs::StdRng;
use remap_core::tgf::{self, LoadOptions};
use serde::Serialize;

use crate::output::{self, OutputMode};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Graph to subsample.
    pub graph: PathBuf,

    /// Treat the input as a directed graph.
    #[arg(long)]
    pub directed: bool,

    /// Requested vertex count; the BFS may overshoot by one frontier layer.
    #[arg(long)]
    pub size: usize,

    /// Output edge-list path.
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,

    /// RNG seed selecting the BFS root.
    #[arg(long, default_value_t = 0)]
    pub rng_seed: u64,
}

#[derive(Debug, Serialize)]
struct ExportReport {
    input: String,
    output: String,
    vertices: usize,
    edges: usize,
}

pub fn run_export(args: &ExportArgs, output: OutputMode) -> Result<()> {
    let opts = LoadOptions::for_kind(super::kind_flag(args.directed));
    let graph = tgf::load_graph(&args.graph, &opts)
        .with_context(|| format!("failed to load graph {}", args.graph.display()))?;

    let mut rng = StdRng::seed_from_u64(args.rng_seed);
    let Some(sample) = graph.export(args.size, &mut rng) else {
        bail!("cannot subsample an empty graph");
    };
    tgf::write_graph(&sample, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    let report = ExportReport {
        input: args.graph.display().to_string(),
        output: args.output.display().to_string(),
        vertices: sample.vertex_count(),
        edges: sample.edge_count(),
    };
    output::render(output, &report, |r, w| {
        output::kv(w, "input", &r.input)?;
        output::kv(w, "output", &r.output)?;
        output::kv(w, "sample", format!("{} vertices, {} edges", r.vertices, r.edges))
    })
}
