//! Textual edge-list reader/writer.
//!
//! One edge per line as whitespace-separated `source target` integer pairs;
//! lines starting with `#` are comments. Vertices are introduced by their
//! first edge mention, self-loops are skipped, and the writer emits only the
//! edge list (the vertex set is implicit).

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use thiserror::Error;
use tracing::warn;

use crate::graph::{Graph, GraphKind};

/// Default vertex cap for undirected graphs.
pub const DEFAULT_UNDIRECTED_CAP: usize = 600_000;
/// Default vertex cap for directed graphs.
pub const DEFAULT_DIRECTED_CAP: usize = 1_100_000;

/// What to do when a load would exceed the vertex cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapPolicy {
    /// Stop consuming edges and log a warning (historical behavior).
    Truncate,
    /// Fail the load with [`LoadError::VertexCapExceeded`].
    Error,
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub kind: GraphKind,
    pub vertex_cap: usize,
    pub cap_policy: CapPolicy,
}

impl LoadOptions {
    #[must_use]
    pub fn undirected() -> Self {
        Self {
            kind: GraphKind::Undirected,
            vertex_cap: DEFAULT_UNDIRECTED_CAP,
            cap_policy: CapPolicy::Truncate,
        }
    }

    #[must_use]
    pub fn directed() -> Self {
        Self {
            kind: GraphKind::Directed,
            vertex_cap: DEFAULT_DIRECTED_CAP,
            cap_policy: CapPolicy::Truncate,
        }
    }

    #[must_use]
    pub fn for_kind(kind: GraphKind) -> Self {
        match kind {
            GraphKind::Undirected => Self::undirected(),
            GraphKind::Directed => Self::directed(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read edge list: {0}")]
    Io(#[from] io::Error),
    #[error("malformed edge at line {line}: {text:?}")]
    Malformed { line: usize, text: String },
    #[error("vertex cap of {cap} exceeded at line {line}")]
    VertexCapExceeded { cap: usize, line: usize },
}

/// Load a graph from an edge-list file.
///
/// # Errors
///
/// Returns [`LoadError`] for I/O failures, unparsable lines, or (under
/// [`CapPolicy::Error`]) a breached vertex cap.
pub fn load_graph(path: &Path, opts: &LoadOptions) -> Result<Graph, LoadError> {
    let file = File::open(path)?;
    parse_edge_list(BufReader::new(file), opts)
}

/// Parse an edge list from any buffered reader. See [`load_graph`].
///
/// # Errors
///
/// Same failure modes as [`load_graph`].
pub fn parse_edge_list<R: BufRead>(reader: R, opts: &LoadOptions) -> Result<Graph, LoadError> {
    let mut graph = Graph::new(opts.kind);
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let mut tokens = text.split_whitespace();
        let (Some(a), Some(b)) = (tokens.next(), tokens.next()) else {
            return Err(LoadError::Malformed {
                line: idx + 1,
                text: text.to_string(),
            });
        };
        let parse = |t: &str| {
            t.parse::<u32>().map_err(|_| LoadError::Malformed {
                line: idx + 1,
                text: text.to_string(),
            })
        };
        let (a, b) = (parse(a)?, parse(b)?);
        if a == b {
            continue;
        }
        if graph.vertex_count() >= opts.vertex_cap {
            match opts.cap_policy {
                CapPolicy::Truncate => {
                    warn!(
                        cap = opts.vertex_cap,
                        line = idx + 1,
                        "vertex cap reached; truncating edge-list load"
                    );
                    break;
                }
                CapPolicy::Error => {
                    return Err(LoadError::VertexCapExceeded {
                        cap: opts.vertex_cap,
                        line: idx + 1,
                    });
                }
            }
        }
        graph.add_vertex(a);
        graph.add_vertex(b);
        graph.add_edge(a, b);
    }
    Ok(graph)
}

/// Write a graph as an edge list, one `source target` line per edge in
/// ascending order.
///
/// # Errors
///
/// Returns any underlying filesystem error.
pub fn write_graph(graph: &Graph, path: &Path) -> io::Result<()> {
    let mut edges = graph.edges();
    edges.sort_unstable();
    let mut out = io::BufWriter::new(File::create(path)?);
    for (a, b) in edges {
        writeln!(out, "{a} {b}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempfile::TempDir;

    use super::*;

    const SAMPLE: &str = "# comment line\n1 2\n2 3\n3 3\n\n2\t4\n";

    #[test]
    fn parses_comments_whitespace_and_self_loops() {
        let g = parse_edge_list(Cursor::new(SAMPLE), &LoadOptions::undirected())
            .expect("parse sample");
        assert_eq!(g.sorted_vertices(), vec![1, 2, 3, 4]);
        assert_eq!(g.edge_count(), 3);
        assert!(!g.contains_edge(3, 3));
    }

    #[test]
    fn malformed_line_is_an_error() {
        let err = parse_edge_list(Cursor::new("1 2\nnope\n"), &LoadOptions::undirected())
            .expect_err("must reject junk");
        match err {
            LoadError::Malformed { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_target_token_is_an_error() {
        let err = parse_edge_list(Cursor::new("17\n"), &LoadOptions::undirected())
            .expect_err("must reject a lone vertex");
        assert!(matches!(err, LoadError::Malformed { line: 1, .. }));
    }

    #[test]
    fn truncate_policy_stops_at_cap() {
        let opts = LoadOptions {
            vertex_cap: 3,
            ..LoadOptions::undirected()
        };
        let g = parse_edge_list(Cursor::new("1 2\n2 3\n4 5\n"), &opts).expect("parse capped");
        // Third edge would push past the cap and is dropped.
        assert_eq!(g.sorted_vertices(), vec![1, 2, 3]);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn error_policy_rejects_cap_breach() {
        let opts = LoadOptions {
            vertex_cap: 3,
            cap_policy: CapPolicy::Error,
            ..LoadOptions::undirected()
        };
        let err = parse_edge_list(Cursor::new("1 2\n2 3\n4 5\n"), &opts)
            .expect_err("must reject oversized input");
        assert!(matches!(
            err,
            LoadError::VertexCapExceeded { cap: 3, line: 3 }
        ));
    }

    #[test]
    fn directed_edges_keep_orientation() {
        let g = parse_edge_list(Cursor::new("1 2\n"), &LoadOptions::directed()).expect("parse");
        assert!(g.contains_edge(1, 2));
        assert!(!g.contains_edge(2, 1));
    }

    #[test]
    fn write_then_load_round_trips() {
        let mut g = Graph::new_undirected();
        for v in 0..4 {
            g.add_vertex(v);
        }
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 3);

        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("g.tgf");
        write_graph(&g, &path).expect("write graph");
        let loaded = load_graph(&path, &LoadOptions::undirected()).expect("load graph");
        assert_eq!(loaded.sorted_vertices(), g.sorted_vertices());
        assert_eq!(loaded.edge_count(), g.edge_count());
    }
}
