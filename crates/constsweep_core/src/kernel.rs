//! The analyzed kernel, as seen by the sweep engine.

use std::io::{self, Write};
use std::path::Path;

use crate::error::BoxError;

/// A source kernel whose compile-time constants can be set and resolved.
///
/// Implementations own parsing and representation of the source; the sweep engine
/// only sets constants, asks the kernel to resolve them and reads them back.
pub trait Kernel {
    /// Path of the kernel source
    fn source_path(&self) -> &Path;

    /// Set (or add) a constant. Takes effect on the next [`Kernel::process`].
    fn set_constant(&mut self, name: &str, value: i64);

    /// Resolve the kernel with the constants currently set.
    fn process(&mut self) -> Result<(), BoxError>;

    /// All constants currently active on the kernel, in kernel order.
    ///
    /// This may include constants that were never set explicitly, such as
    /// defaults declared in the source.
    fn constants(&self) -> Vec<(String, i64)>;

    /// Write a table of the active constants.
    fn print_constants_info(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{:-^80}", " constants ")?;
        writeln!(out, "{:<40}{:>40}", "name", "value")?;
        for (name, value) in self.constants() {
            writeln!(out, "{name:<40}{value:>40}")?;
        }
        writeln!(out, "{:-^80}", "")
    }

    /// Write the resolved kernel source
    fn print_kernel_code(&self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }

    /// Write implementation specific details about the kernel
    fn print_kernel_info(&self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}
