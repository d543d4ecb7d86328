//! Compile-time constant sweep engine
//!
//! This crate sweeps the integer constants of a source kernel across ranges,
//! runs pluggable analysis models on every resulting permutation and keeps the
//! results in a durable store. It provides:
//! - RANGESPEC parsing (`start[-stop[:num[log[base]]]]`) into value sequences
//! - Merging of repeated declarations into per-constant axes
//! - Deterministic cartesian products over the axes
//! - A sweep driver that resolves the kernel and runs every model per permutation
//! - A result store saved atomically after every permutation
//!
//! # Example
//!
//! ```ignore
//! use constsweep_core::{Axes, ResultStore, Sweep, range::parse_values};
//!
//! let mut axes = Axes::new();
//! axes.declare("N", parse_values("1000-10000:4log")?);
//! axes.declare("M", parse_values("4-8")?);
//!
//! let mut store = ResultStore::load(&store_path)?;
//! let summary = Sweep::new(&mut kernel, &machine, &registry, &config, &models)?
//!     .persist_to(&store_path)
//!     .run(&axes, &mut store, &mut std::io::stdout())?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod axis;
pub mod error;
pub mod permutation;
pub mod range;
pub mod store;
pub mod sweep;

// ============================================================================
// Collaborator modules
// ============================================================================

pub mod config;
pub mod kernel;
pub mod machine;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use axis::{Axes, Axis};
pub use config::{AnalysisConfig, AsmBlock, OutputUnit};
pub use error::{BoxError, MachineError, RangeError, StoreError, SweepError};
pub use kernel::Kernel;
pub use machine::MachineModel;
pub use model::{AnalysisModel, ModelConstructor, ModelRegistry};
pub use permutation::{Permutation, Permutations};
pub use range::RangeDescriptor;
pub use store::{AnalysisResult, ConstantsKey, ResultStore, StagedSave};
pub use sweep::{Sweep, SweepSummary};
