//! Command-line front end for the constant sweep engine.
//!
//! Wires the [`constsweep_core`] sweep to a C source kernel, a YAML machine
//! description and the built-in models.

pub mod cli;
pub mod kernel;
pub mod logging;
pub mod models;

use std::io::Write;

use color_eyre::eyre::WrapErr;
use constsweep_core::{MachineModel, ResultStore, Sweep, SweepSummary};

pub use cli::Args;
pub use kernel::SourceKernel;
pub use logging::init_logging;

/// Run the sweep described by `args`, writing the report to `out`.
///
/// Declarations and the result store are checked before any analysis runs: a
/// malformed RANGESPEC or a corrupt store aborts without touching the kernel.
pub fn run(args: &Args, out: &mut dyn Write) -> color_eyre::Result<SweepSummary> {
    let axes = args.axes()?;

    let mut store = match &args.store {
        Some(path) => ResultStore::load(path)
            .wrap_err_with(|| format!("failed to load result store {}", path.display()))?,
        None => ResultStore::new(),
    };

    let machine = MachineModel::from_path(&args.machine)?;
    let mut kernel = SourceKernel::from_path(&args.code_file)
        .wrap_err_with(|| format!("failed to read kernel {}", args.code_file.display()))?;
    let registry = models::registry();
    let config = args.analysis_config();

    let mut sweep = Sweep::new(&mut kernel, &machine, &registry, &config, &args.pmodels)?;
    if let Some(path) = &args.store {
        sweep = sweep.persist_to(path);
    }

    let summary = sweep
        .run(&axes, &mut store, out)
        .wrap_err_with(|| format!("sweep of {} aborted", args.code_file.display()))?;
    Ok(summary)
}
