//! Local topological anonymity.
//!
//! # Overview
//!
//! LTA estimates how structurally distinguishable a vertex is from the
//! vertices two hops away from it: for each second-hop vertex, take the
//! cosine similarity of the two neighbor sets
//! (`|N(v) ∩ N(u)| / sqrt(|N(v)|·|N(u)|)`), then aggregate. A high value
//! means the vertex blends in with its structural surroundings; a low
//! value makes it a good re-identification anchor.
//!
//! Four aggregation variants are kept, matching the historical cache
//! files:
//!
//! - **A** — mean similarity over the second-hop set.
//! - **B** — similarity sum divided by `max(|N(v)|, 2)`.
//! - **C** — variant A divided by the standard deviation of the
//!   second-hop degree differences (floored to 1.0).
//! - **D** — variant A with first-hop neighbors excluded from the
//!   second-hop set.

use std::collections::{BTreeMap, BTreeSet};

use remap_core::{Graph, stats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LtaVariant {
    A,
    B,
    C,
    D,
}

impl LtaVariant {
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Uppercase letter used in cache file names (`_v<letter>.lta`).
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }
}

fn cosine_similarity(a: &BTreeSet<u32>, b: &BTreeSet<u32>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let common = a.intersection(b).count();
    common as f64 / ((a.len() * b.len()) as f64).sqrt()
}

/// LTA score of every vertex under the given variant.
#[must_use]
pub fn compute(graph: &Graph, variant: LtaVariant) -> BTreeMap<u32, f64> {
    let mut out = BTreeMap::new();
    for v in graph.sorted_vertices() {
        let nbrs = graph.neighbors_of(v);

        let mut second: BTreeSet<u32> = nbrs
            .iter()
            .flat_map(|&n| graph.neighbors_of(n))
            .filter(|&u| u != v)
            .collect();
        if variant == LtaVariant::D {
            second.retain(|u| !nbrs.contains(u));
        }

        let mut sims = Vec::with_capacity(second.len());
        let mut degree_diffs = Vec::with_capacity(second.len());
        for &u in &second {
            let unbrs = graph.neighbors_of(u);
            sims.push(cosine_similarity(&nbrs, &unbrs));
            degree_diffs.push((unbrs.len() as f64 - nbrs.len() as f64).abs());
        }
        let sum: f64 = sims.iter().sum();
        let mean = if second.is_empty() {
            0.0
        } else {
            sum / second.len() as f64
        };

        let score = match variant {
            LtaVariant::A | LtaVariant::D => mean,
            LtaVariant::B => sum / nbrs.len().max(2) as f64,
            LtaVariant::C => mean / stats::sample_std(&degree_diffs).max(1.0),
        };
        out.insert(v, score);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Path 0-1-2-3-4.
    fn path5() -> Graph {
        let mut g = Graph::new_undirected();
        for v in 0..5 {
            g.add_vertex(v);
        }
        for v in 0..4 {
            g.add_edge(v, v + 1);
        }
        g
    }

    #[test]
    fn variant_a_on_path_endpoint() {
        // Second hop of vertex 0 is {2}; cos(N(0)={1}, N(2)={1,3}) = 1/sqrt(2).
        let scores = compute(&path5(), LtaVariant::A);
        assert!((scores[&0] - 1.0 / 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn variant_a_on_path_center() {
        // N(1)={0,2}, N(3)={2,4}; union minus self ⇒ second hop = {0, 4}.
        // cos(N(2)={1,3}, N(0)={1}) = 1/sqrt(2); same for 4 ⇒ mean 1/sqrt(2).
        let scores = compute(&path5(), LtaVariant::A);
        assert!((scores[&2] - 1.0 / 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn variant_b_divides_by_degree_floor_two() {
        // Vertex 0: sum of sims = 1/sqrt(2), |N(0)| = 1, floor to 2.
        let scores = compute(&path5(), LtaVariant::B);
        assert!((scores[&0] - 1.0 / (2.0 * 2.0_f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn variant_c_floors_small_deviation_to_one() {
        // Vertex 0's only second-hop vertex gives a single degree diff, so
        // the deviation is undefined and must floor to 1.0 ⇒ C == A.
        let a = compute(&path5(), LtaVariant::A);
        let c = compute(&path5(), LtaVariant::C);
        assert_eq!(a[&0], c[&0]);
    }

    #[test]
    fn variant_d_excludes_first_hop() {
        // Triangle plus pendant: 0-1, 1-2, 2-0, 2-3.
        let mut g = Graph::new_undirected();
        for v in 0..4 {
            g.add_vertex(v);
        }
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 0);
        g.add_edge(2, 3);
        // For vertex 0: raw second hop = {1, 2, 3}; variant D drops the
        // first-hop vertices 1 and 2, leaving {3}.
        // cos(N(0)={1,2}, N(3)={2}) = 1/sqrt(2).
        let d = compute(&g, LtaVariant::D);
        assert!((d[&0] - 1.0 / 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn isolated_vertex_scores_zero_in_all_variants() {
        let mut g = Graph::new_undirected();
        g.add_vertex(9);
        for variant in LtaVariant::ALL {
            assert_eq!(compute(&g, variant)[&9], 0.0);
        }
    }
}
