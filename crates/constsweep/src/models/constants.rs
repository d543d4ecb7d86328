use std::io::{self, Write};

use constsweep_core::{
    AnalysisConfig, AnalysisModel, AnalysisResult, BoxError, Kernel, MachineModel,
};
use serde_json::json;

/// Snapshot of the kernel's active constants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantsModel {
    constants: Vec<(String, i64)>,
}

pub(super) fn build(
    kernel: &dyn Kernel,
    _machine: &MachineModel,
    _config: &AnalysisConfig,
) -> Result<Box<dyn AnalysisModel>, BoxError> {
    Ok(Box::new(ConstantsModel {
        constants: kernel.constants(),
    }))
}

impl AnalysisModel for ConstantsModel {
    fn analyze(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    fn report(&self, out: &mut dyn Write) -> io::Result<()> {
        for (name, value) in &self.constants {
            writeln!(out, "{name:<40}{value:>40}")?;
        }
        Ok(())
    }

    fn results(&self) -> AnalysisResult {
        json!({ "constants": self.constants }).into()
    }
}
