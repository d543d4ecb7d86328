use std::io::{self, Write};

use constsweep_core::{
    AnalysisConfig, AnalysisModel, AnalysisResult, BoxError, Kernel, MachineModel, OutputUnit,
};
use serde::Serialize;

/// Product of all active constants, i.e. the trip count of a perfectly nested
/// loop whose bounds are the constants, split evenly across cores.
#[derive(Debug, Clone)]
pub struct VolumeModel {
    constants: Vec<(String, i64)>,
    cores: usize,
    unit: Option<OutputUnit>,
    results: Option<VolumeResults>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct VolumeResults {
    volume: i64,
    cores: usize,
    per_core: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<OutputUnit>,
}

pub(super) fn build(
    kernel: &dyn Kernel,
    _machine: &MachineModel,
    config: &AnalysisConfig,
) -> Result<Box<dyn AnalysisModel>, BoxError> {
    Ok(Box::new(VolumeModel {
        constants: kernel.constants(),
        cores: config.cores.max(1),
        unit: config.unit,
        results: None,
    }))
}

impl AnalysisModel for VolumeModel {
    fn analyze(&mut self) -> Result<(), BoxError> {
        let volume = self
            .constants
            .iter()
            .try_fold(1i64, |acc, (_, value)| acc.checked_mul(*value))
            .ok_or("iteration volume overflows a 64-bit integer")?;

        self.results = Some(VolumeResults {
            volume,
            cores: self.cores,
            per_core: volume as f64 / self.cores as f64,
            unit: self.unit,
        });
        Ok(())
    }

    fn report(&self, out: &mut dyn Write) -> io::Result<()> {
        let Some(results) = &self.results else {
            return writeln!(out, "not analyzed");
        };
        writeln!(out, "{:<40}{:>40}", "iterations", results.volume)?;
        writeln!(
            out,
            "{:<40}{:>40}",
            format!("iterations per core ({} cores)", results.cores),
            format!("{:.1}", results.per_core)
        )
    }

    fn results(&self) -> AnalysisResult {
        serde_json::to_value(&self.results)
            .unwrap_or_default()
            .into()
    }
}
