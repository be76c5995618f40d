//! Cache-layer integration tests through real temp files.

use std::collections::BTreeSet;
use std::fs;

use tempfile::TempDir;

use remap_core::Graph;
use remap_metrics::cache::{self, Metric};
use remap_metrics::lta::LtaVariant;

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
fn load_or_compute_populates_then_hits_cache() {
    let g = path5();
    let tmp = TempDir::new().expect("tempdir");

    let first = cache::load_or_compute(&g, tmp.path(), "p5", Metric::Clustering, None);
    let path = cache::cache_path(tmp.path(), "p5", Metric::Clustering);
    assert!(path.exists());

    // Second call must read the file, not recompute: corrupting one value
    // on disk should be reflected back.
    let mut on_disk = cache::read(&path, Metric::Clustering).expect("read cache");
    on_disk.insert(0, 0.875);
    cache::write(&path, Metric::Clustering, &on_disk).expect("rewrite cache");

    let second = cache::load_or_compute(&g, tmp.path(), "p5", Metric::Clustering, None);
    assert_eq!(second[&0], 0.875);
    assert_eq!(second.len(), first.len());
}

#[test]
fn degree_cache_uses_integer_records() {
    let g = path5();
    let tmp = TempDir::new().expect("tempdir");
    let values = cache::load_or_compute(&g, tmp.path(), "p5", Metric::Degree, None);
    assert_eq!(values[&0], 1.0);
    assert_eq!(values[&2], 2.0);

    // 5 records of (i32, i32).
    let path = cache::cache_path(tmp.path(), "p5", Metric::Degree);
    assert_eq!(fs::metadata(&path).expect("stat cache").len(), 40);
}

#[test]
fn corrupt_cache_degrades_to_recomputation() {
    let g = path5();
    let tmp = TempDir::new().expect("tempdir");
    let path = cache::cache_path(tmp.path(), "p5", Metric::Lta(LtaVariant::A));
    fs::create_dir_all(tmp.path()).expect("cache dir");

    // A directory at the cache path makes the read fail outright.
    fs::create_dir(&path).expect("plant unreadable cache");
    let values = cache::load_or_compute(&g, tmp.path(), "p5", Metric::Lta(LtaVariant::A), None);
    assert_eq!(values.len(), 5);
}

#[test]
fn centrality_writes_both_files_with_shared_order() {
    let g = path5();
    let tmp = TempDir::new().expect("tempdir");
    let subset: BTreeSet<u32> = (0..5).collect();
    let scores = cache::load_or_compute_centrality(&g, tmp.path(), "p5", Some(&subset));
    assert!((scores.betweenness[&2] - 4.0).abs() < 1e-12);

    let bwc = cache::cache_path(tmp.path(), "p5", Metric::Betweenness);
    let clc = cache::cache_path(tmp.path(), "p5", Metric::Closeness);
    assert!(bwc.exists() && clc.exists());

    let reread = cache::load_or_compute_centrality(&g, tmp.path(), "p5", Some(&subset));
    let bwc_keys: Vec<u32> = reread.betweenness.keys().copied().collect();
    let clc_keys: Vec<u32> = reread.closeness.keys().copied().collect();
    assert_eq!(bwc_keys, clc_keys);
}
