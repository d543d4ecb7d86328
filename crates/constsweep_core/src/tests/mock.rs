//! In-memory collaborators for exercising sweeps without real kernels.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::json;

use crate::config::AnalysisConfig;
use crate::error::BoxError;
use crate::kernel::Kernel;
use crate::machine::MachineModel;
use crate::model::{AnalysisModel, ModelRegistry};
use crate::store::AnalysisResult;

/// A kernel that keeps its constants in a list.
///
/// Constants declared up front act as source defaults. `process` fails when any
/// constant equals `fail_value`, and `clamp` caps every value that is set.
pub struct MockKernel {
    path: PathBuf,
    constants: Vec<(String, i64)>,
    pub processed: usize,
    pub fail_value: Option<i64>,
    pub clamp: Option<i64>,
}

impl MockKernel {
    pub fn new(path: &str) -> Self {
        Self {
            path: PathBuf::from(path),
            constants: Vec::new(),
            processed: 0,
            fail_value: None,
            clamp: None,
        }
    }

    pub fn with_default(mut self, name: &str, value: i64) -> Self {
        self.constants.push((name.to_string(), value));
        self
    }
}

impl Kernel for MockKernel {
    fn source_path(&self) -> &Path {
        &self.path
    }

    fn set_constant(&mut self, name: &str, value: i64) {
        let value = self.clamp.map_or(value, |max| value.min(max));
        match self.constants.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.constants.push((name.to_string(), value)),
        }
    }

    fn process(&mut self) -> Result<(), BoxError> {
        self.processed += 1;
        if let Some(bad) = self.fail_value
            && let Some((name, _)) = self.constants.iter().find(|(_, v)| *v == bad)
        {
            return Err(format!("cannot resolve {name}={bad}").into());
        }
        Ok(())
    }

    fn constants(&self) -> Vec<(String, i64)> {
        self.constants.clone()
    }
}

/// Records the constants it was built with and the configured core count
struct EchoModel {
    constants: Vec<(String, i64)>,
    cores: usize,
    analyzed: bool,
}

impl AnalysisModel for EchoModel {
    fn analyze(&mut self) -> Result<(), BoxError> {
        self.analyzed = true;
        Ok(())
    }

    fn report(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "echo analyzed={}", self.analyzed)
    }

    fn results(&self) -> AnalysisResult {
        json!({
            "constants": self.constants,
            "cores": self.cores,
            "score": 0.1 + self.constants.len() as f64,
        })
        .into()
    }
}

fn echo(
    kernel: &dyn Kernel,
    _machine: &MachineModel,
    config: &AnalysisConfig,
) -> Result<Box<dyn AnalysisModel>, BoxError> {
    Ok(Box::new(EchoModel {
        constants: kernel.constants(),
        cores: config.cores,
        analyzed: false,
    }))
}

/// Fails its analysis whenever the kernel's `N` is 3
struct FragileModel {
    n: Option<i64>,
}

impl AnalysisModel for FragileModel {
    fn analyze(&mut self) -> Result<(), BoxError> {
        match self.n {
            Some(3) => Err("N=3 is not supported".into()),
            _ => Ok(()),
        }
    }

    fn report(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "fragile ok")
    }

    fn results(&self) -> AnalysisResult {
        json!({ "n": self.n }).into()
    }
}

fn fragile(
    kernel: &dyn Kernel,
    _machine: &MachineModel,
    _config: &AnalysisConfig,
) -> Result<Box<dyn AnalysisModel>, BoxError> {
    let n = kernel
        .constants()
        .into_iter()
        .find(|(name, _)| name == "N")
        .map(|(_, v)| v);
    Ok(Box::new(FragileModel { n }))
}

fn unbuildable(
    _kernel: &dyn Kernel,
    _machine: &MachineModel,
    _config: &AnalysisConfig,
) -> Result<Box<dyn AnalysisModel>, BoxError> {
    Err("missing machine parameters".into())
}

pub fn registry() -> ModelRegistry {
    ModelRegistry::new()
        .with("Echo", "records the active constants", echo)
        .with("Fragile", "fails for N=3", fragile)
        .with("Unbuildable", "never constructs", unbuildable)
}

pub fn machine() -> MachineModel {
    MachineModel::from_yaml(Path::new("machines/test.yml"), "model name: Test\n")
        .expect("valid machine yaml")
}
