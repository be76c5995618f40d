//! Local clustering coefficient.
//!
//! For vertex `v` with neighbor set `N(v)`, the coefficient is the number
//! of ordered neighbor pairs `(a, b)` joined by an edge divided by
//! `|N(v)|²`. The denominator deliberately includes self-pairs (it is not
//! the classical `|N(v)|·(|N(v)|−1)` form); cache files produced with this
//! shape stay comparable across runs. Degree-0 vertices score 0.0 rather
//! than dividing by zero.

use std::collections::BTreeMap;

use remap_core::Graph;

/// Local clustering coefficient of every vertex.
#[must_use]
pub fn compute(graph: &Graph) -> BTreeMap<u32, f64> {
    let mut out = BTreeMap::new();
    for v in graph.sorted_vertices() {
        let nbrs: Vec<u32> = graph.neighbors_of(v).into_iter().collect();
        if nbrs.is_empty() {
            out.insert(v, 0.0);
            continue;
        }
        let mut linked = 0usize;
        for &a in &nbrs {
            for &b in &nbrs {
                if graph.contains_edge(a, b) {
                    linked += 1;
                }
            }
        }
        out.insert(v, linked as f64 / (nbrs.len() * nbrs.len()) as f64);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_vertex_scores_zero() {
        let mut g = Graph::new_undirected();
        g.add_vertex(5);
        assert_eq!(compute(&g).get(&5), Some(&0.0));
    }

    #[test]
    fn triangle_vertices() {
        let mut g = Graph::new_undirected();
        for v in 0..3 {
            g.add_vertex(v);
        }
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 0);
        // Each vertex: 2 neighbors, one edge between them counted in both
        // orders, over a denominator of 4.
        for v in 0..3 {
            assert!((compute(&g)[&v] - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn star_center_scores_zero() {
        let mut g = Graph::new_undirected();
        for v in 0..4 {
            g.add_vertex(v);
        }
        for leaf in 1..4 {
            g.add_edge(0, leaf);
        }
        assert_eq!(compute(&g)[&0], 0.0);
    }
}
