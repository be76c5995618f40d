use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use remap_core::tgf::{self, LoadOptions};
use remap_metrics::cache;
use remap_metrics::{LtaVariant, Metric};
use serde::Serialize;

use crate::output::{self, OutputMode};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum MetricArg {
    Degree,
    Clustering,
    LtaA,
    LtaB,
    LtaC,
    LtaD,
    /// Betweenness and closeness, computed jointly.
    Centrality,
}

#[derive(Args, Debug)]
pub struct MeasureArgs {
    /// Graph to measure.
    pub graph: PathBuf,

    /// Treat the input as a directed graph.
    #[arg(long)]
    pub directed: bool,

    /// Metrics to compute; repeatable.
    #[arg(long, value_enum, required = true)]
    pub metric: Vec<MetricArg>,

    /// Metric cache directory.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub cache_dir: PathBuf,

    /// Cache file prefix; defaults to the graph file stem.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Restrict centrality to this top-degree fraction of vertices.
    #[arg(long)]
    pub top_percent: Option<f64>,
}

#[derive(Debug, Serialize)]
struct MetricReport {
    metric: String,
    entries: usize,
    files: Vec<String>,
}

#[derive(Debug, Serialize)]
struct MeasureReport {
    graph: String,
    prefix: String,
    metrics: Vec<MetricReport>,
}

pub fn run_measure(args: &MeasureArgs, output: OutputMode) -> Result<()> {
    let opts = LoadOptions::for_kind(super::kind_flag(args.directed));
    let graph = tgf::load_graph(&args.graph, &opts)
        .with_context(|| format!("failed to load graph {}", args.graph.display()))?;
    let prefix = args
        .prefix
        .clone()
        .unwrap_or_else(|| super::file_prefix(&args.graph));
    let subset: Option<BTreeSet<u32>> = args
        .top_percent
        .map(|p| graph.top_degree_subset(p).into_iter().collect());
    let dir = args.cache_dir.as_path();

    let mut metrics = Vec::new();
    for &arg in &args.metric {
        let report = match arg {
            MetricArg::Centrality => {
                let scores =
                    cache::load_or_compute_centrality(&graph, dir, &prefix, subset.as_ref());
                MetricReport {
                    metric: "centrality".to_string(),
                    entries: scores.betweenness.len(),
                    files: vec![
                        cache_file(dir, &prefix, Metric::Betweenness),
                        cache_file(dir, &prefix, Metric::Closeness),
                    ],
                }
            }
            other => {
                let metric = single_metric(other);
                let values = cache::load_or_compute(&graph, dir, &prefix, metric, None);
                MetricReport {
                    metric: format!("{other:?}").to_lowercase(),
                    entries: values.len(),
                    files: vec![cache_file(dir, &prefix, metric)],
                }
            }
        };
        metrics.push(report);
    }

    let report = MeasureReport {
        graph: args.graph.display().to_string(),
        prefix,
        metrics,
    };
    output::render(output, &report, |r, w| {
        output::kv(w, "graph", &r.graph)?;
        output::kv(w, "prefix", &r.prefix)?;
        for m in &r.metrics {
            output::kv(
                w,
                &m.metric,
                format!("{} entries -> {}", m.entries, m.files.join(", ")),
            )?;
        }
        Ok(())
    })
}

fn single_metric(arg: MetricArg) -> Metric {
    match arg {
        MetricArg::Degree => Metric::Degree,
        MetricArg::Clustering => Metric::Clustering,
        MetricArg::LtaA => Metric::Lta(LtaVariant::A),
        MetricArg::LtaB => Metric::Lta(LtaVariant::B),
        MetricArg::LtaC => Metric::Lta(LtaVariant::C),
        MetricArg::LtaD => Metric::Lta(LtaVariant::D),
        MetricArg::Centrality => unreachable!("centrality handled jointly"),
    }
}

fn cache_file(dir: &std::path::Path, prefix: &str, metric: Metric) -> String {
    cache::cache_path(dir, prefix, metric).display().to_string()
}
