pub mod create;
pub mod export;
pub mod measure;
pub mod simulate;

use std::path::Path;

use remap_core::GraphKind;

/// Graph kind implied by the shared `--directed` flag.
pub fn kind_flag(directed: bool) -> GraphKind {
    if directed {
        GraphKind::Directed
    } else {
        GraphKind::Undirected
    }
}

/// Cache/output prefix derived from a graph file name.
pub fn file_prefix(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("graph")
        .to_string()
}
