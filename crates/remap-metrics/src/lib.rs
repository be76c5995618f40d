#![forbid(unsafe_code)]
//! remap-metrics library.
//!
//! Per-vertex structural metrics (degree, local clustering, local
//! topological anonymity, betweenness/closeness) and the binary cache layer
//! that persists them per graph + variant.
//!
//! # Conventions
//!
//! - **Errors**: Cache I/O returns [`cache::CacheError`]; metric computation
//!   itself is infallible.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod cache;
pub mod centrality;
pub mod clustering;
pub mod degree;
pub mod lta;

pub use cache::{CacheError, Metric};
pub use lta::LtaVariant;
