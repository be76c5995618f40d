//! Vertex degree metric.

use std::collections::BTreeMap;

use remap_core::Graph;

/// Degree of every vertex, keyed by id.
#[must_use]
pub fn compute(graph: &Graph) -> BTreeMap<u32, u32> {
    graph
        .sorted_vertices()
        .into_iter()
        .map(|v| (v, graph.degree_of(v) as u32))
        .collect()
}

/// Degree map widened to `f64`, the shape the seeding and cache layers
/// consume.
#[must_use]
pub fn compute_scores(graph: &Graph) -> BTreeMap<u32, f64> {
    compute(graph)
        .into_iter()
        .map(|(v, d)| (v, f64::from(d)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directed_degree_counts_both_directions() {
        let mut g = Graph::new_directed();
        for v in 0..3 {
            g.add_vertex(v);
        }
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 1);

        let deg = compute(&g);
        assert_eq!(deg.get(&1), Some(&3));
        assert_eq!(deg.get(&0), Some(&1));
    }
}
