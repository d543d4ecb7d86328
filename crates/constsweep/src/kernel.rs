//! A kernel backed by a C source file.
//!
//! Integer `#define NAME <value>` lines in the source are the kernel's default
//! constants. Constants set from the command line override a default in place
//! or are added after the defaults.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use constsweep_core::{BoxError, Kernel};

#[derive(Debug, Clone)]
pub struct SourceKernel {
    path: PathBuf,
    source: String,
    constants: Vec<(String, i64)>,
    /// Source with the active constant values, rebuilt by `process`
    resolved: Option<String>,
}

impl SourceKernel {
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let source = fs::read_to_string(path)?;
        Ok(Self::from_source(path, source))
    }

    pub fn from_source(path: &Path, source: impl Into<String>) -> Self {
        let source = source.into();
        let mut constants: Vec<(String, i64)> = Vec::new();
        for (name, value) in source.lines().filter_map(parse_define) {
            match constants.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 = value,
                None => constants.push((name.to_string(), value)),
            }
        }
        tracing::debug!(
            path = %path.display(),
            defaults = constants.len(),
            "loaded kernel source"
        );

        Self {
            path: path.to_path_buf(),
            source,
            constants,
            resolved: None,
        }
    }

    /// The source as it reads with the active constants, once processed
    pub fn resolved_source(&self) -> Option<&str> {
        self.resolved.as_deref()
    }

    fn value_of(&self, name: &str) -> Option<i64> {
        self.constants
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, v)| v)
    }
}

/// `#define NAME 123` → `("NAME", 123)`; anything else is not a constant
fn parse_define(line: &str) -> Option<(&str, i64)> {
    let rest = line.trim_start().strip_prefix('#')?.trim_start();
    let rest = rest.strip_prefix("define")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?;
    let value = tokens.next()?.parse().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    Some((name, value))
}

impl Kernel for SourceKernel {
    fn source_path(&self) -> &Path {
        &self.path
    }

    fn set_constant(&mut self, name: &str, value: i64) {
        match self.constants.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.constants.push((name.to_string(), value)),
        }
        self.resolved = None;
    }

    fn process(&mut self) -> Result<(), BoxError> {
        if let Some((name, value)) = self.constants.iter().find(|(_, v)| *v < 0) {
            return Err(format!("constant {name} must not be negative, got {value}").into());
        }

        let mut resolved = String::with_capacity(self.source.len());
        for (name, value) in &self.constants {
            if !self.source.lines().any(|l| parse_define(l).is_some_and(|(n, _)| n == name)) {
                writeln!(resolved, "#define {name} {value}")?;
            }
        }
        for line in self.source.lines() {
            match parse_define(line).and_then(|(name, _)| Some((name, self.value_of(name)?))) {
                Some((name, value)) => writeln!(resolved, "#define {name} {value}")?,
                None => writeln!(resolved, "{line}")?,
            }
        }

        self.resolved = Some(resolved);
        Ok(())
    }

    fn constants(&self) -> Vec<(String, i64)> {
        self.constants.clone()
    }

    fn print_kernel_code(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.resolved.as_deref().unwrap_or(&self.source).as_bytes())
    }

    fn print_kernel_info(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{:-^80}", " kernel ")?;
        writeln!(out, "{:<40}{:>40}", "source", self.path.display().to_string())?;
        writeln!(out, "{:<40}{:>40}", "lines", self.source.lines().count())?;
        writeln!(out, "{:<40}{:>40}", "constants", self.constants.len())?;
        writeln!(out, "{:-^80}", "")
    }
}
