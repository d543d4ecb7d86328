//! Analysis options forwarded to models.
//!
//! The sweep engine never interprets these values; they are handed to every
//! model constructor unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unit in which models should report their predictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputUnit {
    /// Cycles per cache line
    #[serde(rename = "cy/CL")]
    CyclesPerCacheLine,
    /// Iterations per second
    #[serde(rename = "It/s")]
    IterationsPerSecond,
    /// Floating point operations per second
    #[serde(rename = "FLOP/s")]
    FlopsPerSecond,
}

impl OutputUnit {
    pub const ALL: [OutputUnit; 3] = [
        OutputUnit::CyclesPerCacheLine,
        OutputUnit::IterationsPerSecond,
        OutputUnit::FlopsPerSecond,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OutputUnit::CyclesPerCacheLine => "cy/CL",
            OutputUnit::IterationsPerSecond => "It/s",
            OutputUnit::FlopsPerSecond => "FLOP/s",
        }
    }
}

impl fmt::Display for OutputUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OutputUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputUnit::ALL
            .into_iter()
            .find(|u| u.label() == s)
            .ok_or_else(|| format!("unknown unit '{s}' (expected cy/CL, It/s or FLOP/s)"))
    }
}

/// Which assembly block a model should mark for analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AsmBlock {
    /// Let the model pick the block
    #[default]
    Auto,
    /// Ask the user interactively
    Manual,
    /// A specific block index
    Index(usize),
}

impl fmt::Display for AsmBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmBlock::Auto => f.write_str("auto"),
            AsmBlock::Manual => f.write_str("manual"),
            AsmBlock::Index(i) => write!(f, "{i}"),
        }
    }
}

impl FromStr for AsmBlock {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(AsmBlock::Auto),
            "manual" => Ok(AsmBlock::Manual),
            other => other
                .parse::<usize>()
                .map(AsmBlock::Index)
                .map_err(|_| "can only be \"auto\", \"manual\" or an integer".to_string()),
        }
    }
}

/// Options shared by every model of a sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Output unit, model specific default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<OutputUnit>,
    /// Number of cores the analysis should assume
    #[serde(default = "default_cores")]
    pub cores: usize,
    /// Prefer pessimistic latency over throughput predictions
    #[serde(default)]
    pub latency: bool,
    #[serde(default)]
    pub asm_block: AsmBlock,
    /// Diagnostic verbosity (number of `-v` flags)
    #[serde(default)]
    pub verbosity: u8,
}

fn default_cores() -> usize {
    1
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            unit: None,
            cores: default_cores(),
            latency: false,
            asm_block: AsmBlock::default(),
            verbosity: 0,
        }
    }
}
