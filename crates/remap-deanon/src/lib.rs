#![forbid(unsafe_code)]
//! remap-deanon library.
//!
//! The attack side of the pipeline: perturbation generators that derive a
//! correlated source/target graph pair from one original, seeding
//! strategies that bootstrap an initial partial mapping, and the iterative
//! propagation engine that grows that mapping from structure alone.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums ([`config::ConfigError`],
//!   [`perturb::PerturbError`], [`propagate::PropagationError`]).
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod perturb;
pub mod propagate;
pub mod seeding;

pub use config::ConfigError;
pub use perturb::{GraphPair, PerturbError};
pub use propagate::{
    PropagationAlgorithm, PropagationConfig, PropagationError, PropagationOutcome, StopReason,
};
