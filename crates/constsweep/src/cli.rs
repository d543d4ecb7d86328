//! Command-line surface.

use std::path::PathBuf;

use clap::{ArgAction, Command, CommandFactory, FromArgMatches, Parser};
use color_eyre::eyre::WrapErr;
use constsweep_core::range::RangeDescriptor;
use constsweep_core::{AnalysisConfig, AsmBlock, Axes, ModelRegistry, OutputUnit};

#[derive(Parser, Debug, Clone)]
#[command(name = "constsweep")]
#[command(about = "Sweep the compile-time constants of a loop kernel through analysis models")]
pub struct Args {
    /// Path to machine description yaml file
    #[arg(short, long, value_name = "PATH")]
    pub machine: PathBuf,

    /// Analysis model to apply (repeatable)
    #[arg(short = 'p', long = "pmodel", value_name = "MODEL", required = true)]
    pub pmodels: Vec<String>,

    /// Define a constant used in the kernel. Values must be an integer or match
    /// start-stop[:num[log[base]]]; every permutation of all ranges is analyzed.
    /// Overrides constants defined in the kernel file.
    #[arg(
        short = 'D',
        long = "define",
        num_args = 2,
        value_names = ["KEY", "RANGESPEC"],
        action = ArgAction::Append
    )]
    pub defines: Vec<String>,

    /// Increase verbosity level
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// File with loop kernel C code
    #[arg(value_name = "FILE")]
    pub code_file: PathBuf,

    /// Assembly block to analyze: "auto", "manual" or a block number
    #[arg(long, value_name = "BLOCK", default_value = "auto")]
    pub asm_block: AsmBlock,

    /// Add results to this store file for later processing
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Output unit (cy/CL, It/s or FLOP/s), model specific if not given
    #[arg(short, long)]
    pub unit: Option<OutputUnit>,

    /// Number of cores to be used in parallel
    #[arg(short, long, value_name = "CORES", default_value_t = 1, value_parser = parse_cores)]
    pub cores: usize,

    /// Use pessimistic latency instead of throughput predictions
    #[arg(long)]
    pub latency: bool,

    /// Append diagnostics to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// The clap command with the models of `registry` listed after the options
pub fn command(registry: &ModelRegistry) -> Command {
    Args::command().after_help(models_help(registry))
}

fn models_help(registry: &ModelRegistry) -> String {
    let mut help = String::from("Analysis models:\n");
    for name in registry.names() {
        let description = registry.description(name).unwrap_or_default();
        help.push_str(&format!("  {name:<12}{description}\n"));
    }
    help
}

fn parse_cores(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Args {
    /// Parse the process arguments, exiting with usage on error.
    pub fn parse_with_models(registry: &ModelRegistry) -> Self {
        let matches = command(registry).get_matches();
        Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    pub fn try_parse_with_models<I, T>(
        registry: &ModelRegistry,
        itr: I,
    ) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = command(registry).try_get_matches_from(itr)?;
        Self::from_arg_matches(&matches)
    }

    /// `(name, RANGESPEC)` pairs in the order they were given
    pub fn define_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defines
            .chunks_exact(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }

    /// Parse every `-D` declaration and merge them into sweep axes.
    pub fn axes(&self) -> color_eyre::Result<Axes> {
        let mut axes = Axes::new();
        for (name, spec) in self.define_pairs() {
            let range: RangeDescriptor = spec
                .parse()
                .wrap_err_with(|| format!("invalid declaration -D {name} {spec}"))?;
            tracing::debug!(name, range = %range, "declared range");
            axes.declare(name, range.values());
        }
        Ok(axes)
    }

    /// Options forwarded to every model
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            unit: self.unit,
            cores: self.cores,
            latency: self.latency,
            asm_block: self.asm_block,
            verbosity: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("constsweep").chain(args.iter().copied()))
    }

    #[test]
    fn test_minimal_arguments() {
        let args = parse(&["-m", "machine.yml", "-p", "Volume", "kernel.c"]).unwrap();
        assert_eq!(args.machine, PathBuf::from("machine.yml"));
        assert_eq!(args.pmodels, vec!["Volume"]);
        assert_eq!(args.code_file, PathBuf::from("kernel.c"));
        assert_eq!(args.analysis_config(), AnalysisConfig::default());
        assert!(args.store.is_none());
    }

    #[test]
    fn test_model_and_machine_required() {
        assert!(parse(&["-p", "Volume", "kernel.c"]).is_err());
        assert!(parse(&["-m", "machine.yml", "kernel.c"]).is_err());
        assert!(parse(&["-m", "machine.yml", "-p", "Volume"]).is_err());
    }

    #[test]
    fn test_defines_merge_into_axes() {
        let args = parse(&[
            "-m", "m.yml", "-p", "Volume", "-D", "N", "1-3", "-D", "M", "8", "--define", "N",
            "2-4", "kernel.c",
        ])
        .unwrap();

        let pairs: Vec<_> = args.define_pairs().collect();
        assert_eq!(pairs, vec![("N", "1-3"), ("M", "8"), ("N", "2-4")]);

        let axes = args.axes().unwrap();
        assert_eq!(axes.get("N").unwrap().values(), &[1, 2, 3, 4]);
        assert_eq!(axes.get("M").unwrap().values(), &[8]);
        assert_eq!(axes.total_permutations(), 4);
    }

    #[test]
    fn test_define_requires_two_values() {
        assert!(parse(&["-m", "m.yml", "-p", "Volume", "kernel.c", "-D", "N"]).is_err());
    }

    #[test]
    fn test_malformed_define_is_reported() {
        let args = parse(&["-m", "m.yml", "-p", "Volume", "-D", "N", "1-2:1", "kernel.c"]).unwrap();
        let err = args.axes().unwrap_err();
        assert!(err.to_string().contains("-D N 1-2:1"));
    }

    #[test]
    fn test_forwarded_options() {
        let args = parse(&[
            "-m", "m.yml", "-p", "Volume", "-p", "Constants", "-vv", "-u", "FLOP/s", "-c", "4",
            "--latency", "--asm-block", "2", "--store", "results.json", "kernel.c",
        ])
        .unwrap();

        let config = args.analysis_config();
        assert_eq!(config.unit, Some(OutputUnit::FlopsPerSecond));
        assert_eq!(config.cores, 4);
        assert!(config.latency);
        assert_eq!(config.asm_block, AsmBlock::Index(2));
        assert_eq!(config.verbosity, 2);
        assert_eq!(args.store, Some(PathBuf::from("results.json")));
        assert_eq!(args.pmodels, vec!["Volume", "Constants"]);
    }

    #[test]
    fn test_help_lists_registered_models() {
        let registry = crate::models::registry();
        let err = Args::try_parse_with_models(&registry, ["constsweep", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);

        let help = err.to_string();
        assert!(help.contains("Analysis models:"));
        for name in registry.names() {
            assert!(help.contains(name));
            assert!(help.contains(registry.description(name).unwrap()));
        }
    }

    #[test]
    fn test_parse_with_models_accepts_arguments() {
        let args = Args::try_parse_with_models(
            &crate::models::registry(),
            ["constsweep", "-m", "m.yml", "-p", "Volume", "kernel.c"],
        )
        .unwrap();
        assert_eq!(args.pmodels, vec!["Volume"]);
    }

    #[test]
    fn test_oversized_define_is_reported() {
        let args = parse(&[
            "-m", "m.yml", "-p", "Volume", "-D", "N", "0-9223372036854775807", "kernel.c",
        ])
        .unwrap();
        let err = args.axes().unwrap_err();
        assert!(err.to_string().contains("-D N 0-9223372036854775807"));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let base = ["-m", "m.yml", "-p", "Volume"];
        for extra in [
            &["--asm-block", "first"][..],
            &["-u", "cycles"][..],
            &["-c", "0"][..],
        ] {
            let mut args: Vec<&str> = base.to_vec();
            args.extend_from_slice(extra);
            args.push("kernel.c");
            assert!(parse(&args).is_err(), "{extra:?} should be rejected");
        }
    }
}
