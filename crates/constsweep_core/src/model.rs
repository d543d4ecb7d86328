//! Analysis models and the registry that names them.

use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::config::AnalysisConfig;
use crate::error::{BoxError, SweepError};
use crate::kernel::Kernel;
use crate::machine::MachineModel;
use crate::store::AnalysisResult;

/// One analysis run over a resolved kernel
pub trait AnalysisModel {
    /// Perform the analysis
    fn analyze(&mut self) -> Result<(), BoxError>;

    /// Write a human-readable report of the last analysis to `out`
    fn report(&self, out: &mut dyn Write) -> io::Result<()>;

    /// Result payload of the last analysis, stored verbatim in the result store
    fn results(&self) -> AnalysisResult;
}

/// Builds a model for a resolved kernel
pub type ModelConstructor = fn(
    kernel: &dyn Kernel,
    machine: &MachineModel,
    config: &AnalysisConfig,
) -> Result<Box<dyn AnalysisModel>, BoxError>;

#[derive(Clone)]
struct RegisteredModel {
    description: String,
    constructor: ModelConstructor,
}

/// Maps model names to their constructors
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, RegisteredModel>,
}

impl ModelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model. A model registered under an existing name replaces it.
    pub fn register(&mut self, name: &str, description: &str, constructor: ModelConstructor) {
        self.models.insert(
            name.to_string(),
            RegisteredModel {
                description: description.to_string(),
                constructor,
            },
        );
    }

    /// Builder-style [`ModelRegistry::register`]
    #[must_use]
    pub fn with(mut self, name: &str, description: &str, constructor: ModelConstructor) -> Self {
        self.register(name, description, constructor);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Registered model names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.models.get(name).map(|m| m.description.as_str())
    }

    /// Fail with [`SweepError::UnknownModel`] unless `name` is registered.
    pub fn ensure_known(&self, name: &str) -> Result<(), SweepError> {
        if self.contains(name) {
            return Ok(());
        }
        Err(self.unknown(name))
    }

    fn unknown(&self, name: &str) -> SweepError {
        SweepError::UnknownModel {
            name: name.to_string(),
            known: self.names().collect::<Vec<_>>().join(", "),
        }
    }

    /// Construct the model registered as `name`.
    pub fn instantiate(
        &self,
        name: &str,
        kernel: &dyn Kernel,
        machine: &MachineModel,
        config: &AnalysisConfig,
    ) -> Result<Box<dyn AnalysisModel>, SweepError> {
        let model = self.models.get(name).ok_or_else(|| self.unknown(name))?;
        (model.constructor)(kernel, machine, config).map_err(|source| SweepError::Model {
            model: name.to_string(),
            source,
        })
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.models.keys()).finish()
    }
}
