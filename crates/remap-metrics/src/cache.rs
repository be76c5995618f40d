//! On-disk metric cache layer.
//!
//! # Overview
//!
//! Each metric-variant combination persists to one binary file named by
//! convention under a cache directory: `<prefix>.deg`, `<prefix>.lcc`,
//! `<prefix>_v<LETTER>.lta`, and the joint `<prefix>.bwc` / `<prefix>.clc`
//! pair (two files, same record order). Caches are immutable once written
//! and invalidated only by deleting the file.
//!
//! The cache is best-effort, never authoritative: a read or write failure
//! is logged and the in-memory computation proceeds. Callers that need
//! hard failures use [`read`]/[`write`] directly.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use remap_core::{Graph, records};
use thiserror::Error;
use tracing::{debug, warn};

use crate::centrality::{self, CentralityScores};
use crate::lta::LtaVariant;
use crate::{clustering, degree, lta};

/// A cacheable per-vertex metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Degree,
    Clustering,
    Lta(LtaVariant),
    Betweenness,
    Closeness,
}

impl Metric {
    /// Cache file name for this metric under the given prefix.
    #[must_use]
    pub fn file_name(self, prefix: &str) -> String {
        match self {
            Self::Degree => format!("{prefix}.deg"),
            Self::Clustering => format!("{prefix}.lcc"),
            Self::Lta(variant) => format!("{prefix}_v{}.lta", variant.letter()),
            Self::Betweenness => format!("{prefix}.bwc"),
            Self::Closeness => format!("{prefix}.clc"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CacheError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Full path of a metric cache file.
#[must_use]
pub fn cache_path(dir: &Path, prefix: &str, metric: Metric) -> PathBuf {
    dir.join(metric.file_name(prefix))
}

/// Whether the cache file for this metric already exists.
#[must_use]
pub fn exists(dir: &Path, prefix: &str, metric: Metric) -> bool {
    cache_path(dir, prefix, metric).exists()
}

/// Read one metric cache file. Degree files hold integer records and are
/// widened to `f64`.
///
/// # Errors
///
/// Returns [`CacheError::Io`] when the file is missing or unreadable.
pub fn read(path: &Path, metric: Metric) -> Result<BTreeMap<u32, f64>, CacheError> {
    match metric {
        Metric::Degree => Ok(records::read_int_scores(path)
            .map_err(|e| CacheError::from_io(path, e))?
            .into_iter()
            .map(|(v, d)| (v, f64::from(d)))
            .collect()),
        _ => records::read_scores(path).map_err(|e| CacheError::from_io(path, e)),
    }
}

/// Write one metric cache file atomically.
///
/// # Errors
///
/// Returns [`CacheError::Io`] on any filesystem failure.
pub fn write(path: &Path, metric: Metric, values: &BTreeMap<u32, f64>) -> Result<(), CacheError> {
    let result = match metric {
        Metric::Degree => records::write_int_scores(
            path,
            values.iter().map(|(&v, &d)| (v, d as u32)),
        ),
        _ => records::write_scores(path, values.iter().map(|(&v, &s)| (v, s))),
    };
    result.map_err(|e| CacheError::from_io(path, e))
}

fn compute_metric(graph: &Graph, metric: Metric, subset: Option<&BTreeSet<u32>>) -> BTreeMap<u32, f64> {
    match metric {
        Metric::Degree => degree::compute_scores(graph),
        Metric::Clustering => clustering::compute(graph),
        Metric::Lta(variant) => lta::compute(graph, variant),
        Metric::Betweenness => centrality::compute(graph, subset).betweenness,
        Metric::Closeness => centrality::compute(graph, subset).closeness,
    }
}

/// Load a metric from cache, or compute it and populate the cache.
///
/// Cache failures degrade to recomputation with a warning. The `subset`
/// restriction only applies to the centrality metrics; prefer
/// [`load_or_compute_centrality`] when both centrality maps are needed,
/// since it computes them in one pass.
#[must_use]
pub fn load_or_compute(
    graph: &Graph,
    dir: &Path,
    prefix: &str,
    metric: Metric,
    subset: Option<&BTreeSet<u32>>,
) -> BTreeMap<u32, f64> {
    let path = cache_path(dir, prefix, metric);
    if path.exists() {
        match read(&path, metric) {
            Ok(values) => {
                debug!(path = %path.display(), entries = values.len(), "metric cache hit");
                return values;
            }
            Err(err) => warn!(%err, "unreadable metric cache; recomputing"),
        }
    }
    let values = compute_metric(graph, metric, subset);
    if let Err(err) = write(&path, metric, &values) {
        warn!(%err, "failed to persist metric cache; continuing without it");
    }
    values
}

/// Load or compute betweenness and closeness together, persisting both
/// files in one pass. Same best-effort discipline as [`load_or_compute`].
#[must_use]
pub fn load_or_compute_centrality(
    graph: &Graph,
    dir: &Path,
    prefix: &str,
    subset: Option<&BTreeSet<u32>>,
) -> CentralityScores {
    let bwc_path = cache_path(dir, prefix, Metric::Betweenness);
    let clc_path = cache_path(dir, prefix, Metric::Closeness);
    if bwc_path.exists() && clc_path.exists() {
        match (
            read(&bwc_path, Metric::Betweenness),
            read(&clc_path, Metric::Closeness),
        ) {
            (Ok(betweenness), Ok(closeness)) => {
                return CentralityScores {
                    betweenness,
                    closeness,
                };
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(%err, "unreadable centrality cache; recomputing");
            }
        }
    }
    let scores = centrality::compute(graph, subset);
    for (path, metric, values) in [
        (&bwc_path, Metric::Betweenness, &scores.betweenness),
        (&clc_path, Metric::Closeness, &scores.closeness),
    ] {
        if let Err(err) = write(path, metric, values) {
            warn!(%err, "failed to persist centrality cache; continuing without it");
        }
    }
    scores
}
