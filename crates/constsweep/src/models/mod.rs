//! Built-in analysis models.
//!
//! - `Constants` - records the constants the kernel was resolved with
//! - `Volume` - size of the iteration space spanned by the constants

mod constants;
mod volume;

pub use constants::ConstantsModel;
pub use volume::VolumeModel;

use constsweep_core::ModelRegistry;

/// Registry of every model the command line can select
pub fn registry() -> ModelRegistry {
    ModelRegistry::new()
        .with(
            "Constants",
            "Records the constants the kernel was resolved with",
            constants::build,
        )
        .with(
            "Volume",
            "Iteration space volume spanned by the active constants",
            volume::build,
        )
}
