#![forbid(unsafe_code)]
//! remap-core library.
//!
//! Graph model, bidirectional match bookkeeping, ground truth scoring, and
//! the binary record codec shared by the metric caches.
//!
//! # Conventions
//!
//! - **Errors**: Library seams return `thiserror` enums; orchestration layers
//!   wrap them with `anyhow` context.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod graph;
pub mod ground_truth;
pub mod matches;
pub mod records;
pub mod stats;
pub mod tgf;

pub use graph::{Graph, GraphKind};
pub use ground_truth::{Accuracy, GroundTruth, MatchScore};
pub use matches::Matches;
