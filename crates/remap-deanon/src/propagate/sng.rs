//! Seed-and-grow propagation.
//!
//! # Overview
//!
//! Instead of sweeping single vertices, each round builds two frontier
//! lists (unmapped neighbors of the mapped region on each side) and a
//! full dissimilarity matrix between them: cell `(r, c)` measures how
//! much of one frontier vertex's mapped-neighbor set is missing from the
//! other's, normalized by that side's set size. A pair is committed only
//! when its cell is simultaneously the row and column minimum of both
//! matrices and outshines every competing minimal cell in its row and
//! column under a local eccentricity measure.
//!
//! Rounds terminate on an empty frontier or when a digest of the frontier
//! pair repeats, which catches oscillating rebind cycles the new-match
//! counter alone would miss.
//!
//! [`SngCompat::Faithful`] reproduces a documented quirk of the published
//! implementation where the target-side minima are derived from the
//! source matrix; [`SngCompat::Fixed`] (the default) derives them from the
//! target matrix as intended.

use std::collections::{BTreeSet, HashSet};

use remap_core::{Graph, Matches, stats};

use super::{MapSide, PropagationAlgorithm, PropagationError};

/// How to resolve the published implementation's matrix-swap quirk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SngCompat {
    /// Derive target-side minima from the source matrix, as published.
    Faithful,
    /// Derive target-side minima from the target matrix.
    #[default]
    Fixed,
}

#[derive(Debug, Default)]
pub struct Sng {
    compat: SngCompat,
    seen_frontiers: HashSet<[u8; 32]>,
}

impl Sng {
    #[must_use]
    pub fn new(compat: SngCompat) -> Self {
        Self {
            compat,
            seen_frontiers: HashSet::new(),
        }
    }
}

/// Unmapped neighbors of the mapped region, in mapping iteration order.
fn frontier(graph: &Graph, matches: &Matches, side: MapSide) -> Vec<u32> {
    let mut out = Vec::new();
    let mut dedup = BTreeSet::new();
    for (source, target) in matches.iter() {
        let v = match side {
            MapSide::Forward => source,
            MapSide::Reverse => target,
        };
        for nbr in graph.neighbors_of(v) {
            let unmapped = match side {
                MapSide::Forward => matches.get(nbr).is_none(),
                MapSide::Reverse => matches.get_reverse(nbr).is_none(),
            };
            if unmapped && dedup.insert(nbr) {
                out.push(nbr);
            }
        }
    }
    out
}

fn frontier_digest(c_src: &[u32], c_tar: &[u32]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for &v in c_src {
        hasher.update(&v.to_be_bytes());
    }
    hasher.update(&[0xFF]);
    for &v in c_tar {
        hasher.update(&v.to_be_bytes());
    }
    *hasher.finalize().as_bytes()
}

/// Mapped-neighbor sets expressed in source ids. Every frontier vertex is
/// adjacent to the mapped region, so each set is non-empty.
fn mapped_neighbor_sets(
    graph: &Graph,
    matches: &Matches,
    candidates: &[u32],
    side: MapSide,
) -> Vec<BTreeSet<u32>> {
    candidates
        .iter()
        .map(|&c| {
            graph
                .neighbors_of(c)
                .into_iter()
                .filter_map(|nbr| match side {
                    MapSide::Forward => matches.get(nbr).map(|_| nbr),
                    MapSide::Reverse => matches.get_reverse(nbr),
                })
                .collect()
        })
        .collect()
}

fn dissimilarity(own: &BTreeSet<u32>, other: &BTreeSet<u32>) -> f64 {
    own.difference(other).count() as f64 / own.len() as f64
}

fn column(matrix: &[Vec<f64>], col: usize) -> Vec<f64> {
    matrix.iter().map(|row| row[col]).collect()
}

/// Local eccentricity of one value within a row or column slice: the
/// smallest distance to a differing value, damped by how many slots share
/// the value. Fewer than two slots or a zero spread yields 0.
fn slice_eccentricity(item: f64, items: &[f64]) -> f64 {
    if items.len() < 2 {
        return 0.0;
    }
    let std = stats::sample_std(items);
    if std == 0.0 {
        return 0.0;
    }
    let mut gap: f64 = 1.0;
    let mut multitude = 0;
    for &x in items {
        if x == item {
            multitude += 1;
        } else {
            gap = gap.min((x - item).abs());
        }
    }
    gap / (multitude as f64 * std)
}

impl PropagationAlgorithm for Sng {
    fn name(&self) -> &'static str {
        "sng"
    }

    #[allow(clippy::too_many_lines)]
    fn run_round(
        &mut self,
        source: &Graph,
        target: &Graph,
        matches: &mut Matches,
    ) -> Result<usize, PropagationError> {
        let c_src = frontier(source, matches, MapSide::Forward);
        let c_tar = frontier(target, matches, MapSide::Reverse);
        if c_src.is_empty() || c_tar.is_empty() {
            return Ok(0);
        }
        if !self
            .seen_frontiers
            .insert(frontier_digest(&c_src, &c_tar))
        {
            return Ok(0);
        }

        let mn_src = mapped_neighbor_sets(source, matches, &c_src, MapSide::Forward);
        let mn_tar = mapped_neighbor_sets(target, matches, &c_tar, MapSide::Reverse);

        // Rows follow the target frontier, columns the source frontier.
        let rows = c_tar.len();
        let cols = c_src.len();
        let mut dissims_src = vec![vec![0.0; cols]; rows];
        let mut dissims_tar = vec![vec![0.0; cols]; rows];
        for (r, tar_set) in mn_tar.iter().enumerate() {
            for (c, src_set) in mn_src.iter().enumerate() {
                dissims_src[r][c] = dissimilarity(src_set, tar_set);
                dissims_tar[r][c] = dissimilarity(tar_set, src_set);
            }
        }
        let tar_view: &[Vec<f64>] = match self.compat {
            SngCompat::Faithful => &dissims_src,
            SngCompat::Fixed => &dissims_tar,
        };

        let src_row_min: Vec<f64> = dissims_src
            .iter()
            .map(|row| row.iter().copied().fold(1.0, f64::min))
            .collect();
        let src_col_min: Vec<f64> = (0..cols)
            .map(|c| column(&dissims_src, c).into_iter().fold(1.0, f64::min))
            .collect();
        let tar_row_min: Vec<f64> = tar_view
            .iter()
            .map(|row| row.iter().copied().fold(1.0, f64::min))
            .collect();
        let tar_col_min: Vec<f64> = (0..cols)
            .map(|c| column(tar_view, c).into_iter().fold(1.0, f64::min))
            .collect();
        if src_row_min.iter().copied().fold(1.0, f64::min) == 1.0
            || tar_col_min.iter().copied().fold(1.0, f64::min) == 1.0
        {
            return Ok(0);
        }

        // Cells that are simultaneously row- and column-minimal in both views.
        let mut minimal_cells = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                if dissims_src[r][c] == src_row_min[r]
                    && dissims_src[r][c] == src_col_min[c]
                    && dissims_tar[r][c] == tar_row_min[r]
                    && dissims_tar[r][c] == tar_col_min[c]
                {
                    minimal_cells.push((r, c));
                }
            }
        }

        let mut new_matches = 0;
        for &(row, col) in &minimal_cells {
            let row_rivals: Vec<usize> = minimal_cells
                .iter()
                .filter(|&&(r, c)| r == row && c != col)
                .map(|&(_, c)| c)
                .collect();
            let col_rivals: Vec<usize> = minimal_cells
                .iter()
                .filter(|&&(r, c)| c == col && r != row)
                .map(|&(r, _)| r)
                .collect();

            // Along the row, competitors are compared within their columns.
            let own_src = slice_eccentricity(dissims_src[row][col], &column(&dissims_src, col));
            let own_tar = slice_eccentricity(dissims_tar[row][col], &column(&dissims_tar, col));
            let outshone = row_rivals.iter().any(|&c| {
                slice_eccentricity(dissims_src[row][c], &column(&dissims_src, c)) >= own_src
                    || slice_eccentricity(dissims_tar[row][c], &column(&dissims_tar, c)) >= own_tar
            });
            if outshone {
                continue;
            }

            // Along the column, competitors are compared within their rows.
            let own_src = slice_eccentricity(dissims_src[row][col], &dissims_src[row]);
            let own_tar = slice_eccentricity(dissims_tar[row][col], &dissims_tar[row]);
            let outshone = col_rivals.iter().any(|&r| {
                slice_eccentricity(dissims_src[r][col], &dissims_src[r]) >= own_src
                    || slice_eccentricity(dissims_tar[r][col], &dissims_tar[r]) >= own_tar
            });
            if outshone {
                continue;
            }

            if matches.add(c_src[col], c_tar[row]) {
                new_matches += 1;
            }
        }
        Ok(new_matches)
    }
}
