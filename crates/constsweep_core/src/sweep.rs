//! Sweep orchestration: one analysis pass per permutation of the swept constants.
//!
//! For every permutation, in generator order, the sweep
//!
//! 1. sets each swept constant on the kernel and resolves it,
//! 2. builds, runs and reports every requested model,
//! 3. stores every model result under the kernel's active constants, and
//! 4. saves the result store, if a store path was given.
//!
//! The store is only touched once all models of a permutation have finished, so
//! an interrupted or failing sweep leaves every previously saved permutation
//! intact on disk. Errors from the kernel or a model end the sweep immediately;
//! nothing is retried or skipped.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::axis::Axes;
use crate::config::AnalysisConfig;
use crate::error::SweepError;
use crate::kernel::Kernel;
use crate::machine::MachineModel;
use crate::model::ModelRegistry;
use crate::permutation::Permutation;
use crate::store::{AnalysisResult, ConstantsKey, ResultStore};

/// Name under which the header banner is printed
const BANNER: &str = " constsweep ";

/// Outcome of a completed sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepSummary {
    /// Name the results were stored under
    pub kernel_name: String,
    /// Number of permutations analyzed
    pub permutations: usize,
    /// Number of model results stored
    pub results: usize,
}

/// Drives the analysis of one kernel across all permutations of a set of axes
pub struct Sweep<'a> {
    kernel: &'a mut dyn Kernel,
    machine: &'a MachineModel,
    registry: &'a ModelRegistry,
    config: &'a AnalysisConfig,
    models: Vec<String>,
    store_path: Option<PathBuf>,
}

impl<'a> Sweep<'a> {
    /// Prepare a sweep running `models` on every permutation.
    ///
    /// Repeated model names are analyzed once. Fails if a name is not registered.
    pub fn new(
        kernel: &'a mut dyn Kernel,
        machine: &'a MachineModel,
        registry: &'a ModelRegistry,
        config: &'a AnalysisConfig,
        models: &[String],
    ) -> Result<Self, SweepError> {
        let mut unique: Vec<String> = Vec::with_capacity(models.len());
        for name in models {
            registry.ensure_known(name)?;
            if !unique.contains(name) {
                unique.push(name.clone());
            }
        }

        Ok(Self {
            kernel,
            machine,
            registry,
            config,
            models: unique,
            store_path: None,
        })
    }

    /// Save the result store to `path` after every permutation.
    #[must_use]
    pub fn persist_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    /// The deduplicated model names, in the order they are run
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Name results are stored under: the final component of the kernel path
    pub fn kernel_name(&self) -> String {
        kernel_name(self.kernel.source_path())
    }

    /// Run every permutation of `axes`, writing reports to `out` and results to `store`.
    pub fn run(
        &mut self,
        axes: &Axes,
        store: &mut ResultStore,
        out: &mut dyn Write,
    ) -> Result<SweepSummary, SweepError> {
        let kernel_name = self.kernel_name();
        let total = axes.total_permutations();
        let mut results = 0;

        tracing::info!(
            kernel = %kernel_name,
            permutations = total,
            models = ?self.models,
            "starting sweep"
        );

        for (index, permutation) in axes.permutations().enumerate() {
            tracing::debug!(
                permutation = %permutation,
                "permutation {}/{}",
                index + 1,
                total
            );
            results += self.run_permutation(&permutation, &kernel_name, store, out)?;
        }

        Ok(SweepSummary {
            kernel_name,
            permutations: total,
            results,
        })
    }

    fn run_permutation(
        &mut self,
        permutation: &Permutation,
        kernel_name: &str,
        store: &mut ResultStore,
        out: &mut dyn Write,
    ) -> Result<usize, SweepError> {
        for (name, value) in permutation.assignments() {
            self.kernel.set_constant(name, *value);
        }
        self.kernel.process().map_err(SweepError::Kernel)?;

        let constants = active_constants(&*self.kernel, permutation)?;

        let mut outcomes: Vec<(&str, AnalysisResult)> = Vec::with_capacity(self.models.len());
        for model_name in &self.models {
            self.write_header(out, permutation, model_name)?;
            self.write_kernel_diagnostics(out)?;

            let mut model =
                self.registry
                    .instantiate(model_name, &*self.kernel, self.machine, self.config)?;
            model.analyze().map_err(|source| SweepError::Model {
                model: model_name.clone(),
                source,
            })?;
            model.report(out)?;
            writeln!(out)?;

            tracing::debug!(model = %model_name, "analysis complete");
            outcomes.push((model_name.as_str(), model.results()));
        }

        let stored = outcomes.len();
        for (model_name, result) in outcomes {
            store.upsert(kernel_name, constants.clone(), model_name, result);
        }

        if let Some(path) = &self.store_path {
            store.save(path)?;
        }
        Ok(stored)
    }

    fn write_header(
        &self,
        out: &mut dyn Write,
        permutation: &Permutation,
        model_name: &str,
    ) -> Result<(), SweepError> {
        writeln!(out, "{BANNER:=^80}")?;
        writeln!(
            out,
            "{:<40}{:>40}",
            self.kernel.source_path().display().to_string(),
            format!("-m {}", self.machine.path().display())
        )?;
        writeln!(out, "{permutation}")?;
        writeln!(out, "{:-^80}", format!(" {model_name} "))?;
        Ok(())
    }

    fn write_kernel_diagnostics(&self, out: &mut dyn Write) -> Result<(), SweepError> {
        if self.config.verbosity > 1 {
            self.kernel.print_kernel_code(out)?;
            writeln!(out)?;
            self.kernel.print_kernel_info(out)?;
        }
        if self.config.verbosity > 0 {
            self.kernel.print_constants_info(out)?;
        }
        Ok(())
    }
}

/// Final path component of `path`, or the whole path if it has none
pub fn kernel_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read the kernel's active constants and check they agree with `permutation`.
///
/// The key may hold more constants than were swept (defaults declared by the
/// kernel), but every swept constant must be present with the value just set.
/// This keeps distinct permutations from ever sharing a store key.
fn active_constants(
    kernel: &dyn Kernel,
    permutation: &Permutation,
) -> Result<ConstantsKey, SweepError> {
    let constants = ConstantsKey::new(kernel.constants());
    for (name, expected) in permutation.assignments() {
        match constants.get(name) {
            Some(actual) if actual == *expected => {}
            Some(actual) => {
                return Err(SweepError::ConstantsMismatch {
                    name: name.clone(),
                    expected: *expected,
                    actual,
                });
            }
            None => return Err(SweepError::MissingConstant { name: name.clone() }),
        }
    }
    Ok(constants)
}
