//! Binary record codec for the on-disk caches.
//!
//! # Overview
//!
//! All cache files share one wire discipline: fixed-width big-endian
//! records, no header, no delimiters, consumed until end-of-stream.
//! Four record shapes exist:
//!
//! - score records: `(i32 vertex id, f64 value)` — LCC, LTA, centrality
//! - integer records: `(i32 vertex id, i32 value)` — degree
//! - id lists: raw `i32` vertex ids, sorted ascending — vertex overlap
//! - match pairs: `(i32 source, i32 target)`, optionally count-prefixed
//!
//! Writes go through a temp file in the destination directory followed by a
//! rename, so a concurrent reader never observes a half-written cache. A
//! trailing partial record on read is tolerated with a warning.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}

/// Write `bytes` to `path` atomically (temp file + rename), creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns any underlying filesystem error.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

fn read_all(path: &Path, record_size: usize) -> io::Result<Vec<u8>> {
    let bytes = fs::read(path)?;
    let trailing = bytes.len() % record_size;
    if trailing != 0 {
        warn!(
            path = %path.display(),
            trailing,
            "cache file has a trailing partial record; ignoring it"
        );
    }
    Ok(bytes)
}

fn be_i32(chunk: &[u8]) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&chunk[..4]);
    i32::from_be_bytes(buf)
}

fn be_f64(chunk: &[u8]) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&chunk[..8]);
    f64::from_be_bytes(buf)
}

// ---------------------------------------------------------------------------
// Score records: (i32, f64)
// ---------------------------------------------------------------------------

/// Write `(vertex, score)` records in iteration order.
///
/// # Errors
///
/// Returns any underlying filesystem error.
pub fn write_scores<I>(path: &Path, entries: I) -> io::Result<()>
where
    I: IntoIterator<Item = (u32, f64)>,
{
    let mut bytes = Vec::new();
    for (v, score) in entries {
        bytes.extend_from_slice(&(v as i32).to_be_bytes());
        bytes.extend_from_slice(&score.to_be_bytes());
    }
    write_atomic(path, &bytes)
}

/// Read `(vertex, score)` records until end-of-stream.
///
/// # Errors
///
/// Returns any underlying filesystem error.
pub fn read_scores(path: &Path) -> io::Result<BTreeMap<u32, f64>> {
    let bytes = read_all(path, 12)?;
    Ok(bytes
        .chunks_exact(12)
        .map(|chunk| (be_i32(chunk) as u32, be_f64(&chunk[4..])))
        .collect())
}

// ---------------------------------------------------------------------------
// Integer records: (i32, i32)
// ---------------------------------------------------------------------------

/// Write `(vertex, value)` integer records in iteration order (degree cache).
///
/// # Errors
///
/// Returns any underlying filesystem error.
pub fn write_int_scores<I>(path: &Path, entries: I) -> io::Result<()>
where
    I: IntoIterator<Item = (u32, u32)>,
{
    let mut bytes = Vec::new();
    for (v, value) in entries {
        bytes.extend_from_slice(&(v as i32).to_be_bytes());
        bytes.extend_from_slice(&(value as i32).to_be_bytes());
    }
    write_atomic(path, &bytes)
}

/// Read `(vertex, value)` integer records until end-of-stream.
///
/// # Errors
///
/// Returns any underlying filesystem error.
pub fn read_int_scores(path: &Path) -> io::Result<BTreeMap<u32, u32>> {
    let bytes = read_all(path, 8)?;
    Ok(bytes
        .chunks_exact(8)
        .map(|chunk| (be_i32(chunk) as u32, be_i32(&chunk[4..]) as u32))
        .collect())
}

// ---------------------------------------------------------------------------
// Id lists
// ---------------------------------------------------------------------------

/// Write a vertex id list, sorted ascending (vertex-overlap cache).
///
/// # Errors
///
/// Returns any underlying filesystem error.
pub fn write_id_list(path: &Path, ids: &[u32]) -> io::Result<()> {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    let mut bytes = Vec::with_capacity(sorted.len() * 4);
    for v in sorted {
        bytes.extend_from_slice(&(v as i32).to_be_bytes());
    }
    write_atomic(path, &bytes)
}

/// Read a vertex id list until end-of-stream.
///
/// # Errors
///
/// Returns any underlying filesystem error.
pub fn read_id_list(path: &Path) -> io::Result<Vec<u32>> {
    let bytes = read_all(path, 4)?;
    Ok(bytes.chunks_exact(4).map(|c| be_i32(c) as u32).collect())
}

// ---------------------------------------------------------------------------
// Match pairs
// ---------------------------------------------------------------------------

/// Write raw `(source, target)` pairs with no count prefix (ground-truth
/// mapping file).
///
/// # Errors
///
/// Returns any underlying filesystem error.
pub fn write_id_pairs(path: &Path, pairs: &[(u32, u32)]) -> io::Result<()> {
    let mut bytes = Vec::with_capacity(pairs.len() * 8);
    for &(a, b) in pairs {
        bytes.extend_from_slice(&(a as i32).to_be_bytes());
        bytes.extend_from_slice(&(b as i32).to_be_bytes());
    }
    write_atomic(path, &bytes)
}

/// Read raw `(source, target)` pairs until end-of-stream.
///
/// # Errors
///
/// Returns any underlying filesystem error.
pub fn read_id_pairs(path: &Path) -> io::Result<Vec<(u32, u32)>> {
    let bytes = read_all(path, 8)?;
    Ok(bytes
        .chunks_exact(8)
        .map(|chunk| (be_i32(chunk) as u32, be_i32(&chunk[4..]) as u32))
        .collect())
}

/// Write count-prefixed `(source, target)` pairs (persisted matches).
///
/// # Errors
///
/// Returns any underlying filesystem error.
pub fn write_matches(path: &Path, pairs: &[(u32, u32)]) -> io::Result<()> {
    let mut bytes = Vec::with_capacity(4 + pairs.len() * 8);
    bytes.extend_from_slice(&(pairs.len() as i32).to_be_bytes());
    for &(a, b) in pairs {
        bytes.extend_from_slice(&(a as i32).to_be_bytes());
        bytes.extend_from_slice(&(b as i32).to_be_bytes());
    }
    write_atomic(path, &bytes)
}

/// Read count-prefixed `(source, target)` pairs.
///
/// # Errors
///
/// Returns an `InvalidData` error when the file is shorter than its declared
/// count, or any underlying filesystem error.
pub fn read_matches(path: &Path) -> io::Result<Vec<(u32, u32)>> {
    let bytes = fs::read(path)?;
    if bytes.len() < 4 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "matches file shorter than its count prefix",
        ));
    }
    let count = be_i32(&bytes) as usize;
    let body = &bytes[4..];
    if body.len() < count * 8 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("matches file declares {count} pairs but is truncated"),
        ));
    }
    Ok(body
        .chunks_exact(8)
        .take(count)
        .map(|chunk| (be_i32(chunk) as u32, be_i32(&chunk[4..]) as u32))
        .collect())
}
