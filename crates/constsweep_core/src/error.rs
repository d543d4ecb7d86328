use std::path::PathBuf;

use thiserror::Error;

/// Error type returned by pluggable collaborators (kernels and models).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while turning a RANGESPEC token into values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("'{0}' must match start[-stop[:num[log[base]]]]")]
    Malformed(String),
    #[error("'{token}': num has to be at least 2, got {num}")]
    TooFewPoints { token: String, num: usize },
    #[error("'{token}': stop ({stop}) is smaller than start ({start})")]
    Descending { token: String, start: i64, stop: i64 },
    #[error("'{0}': logarithmic ranges cannot include 0")]
    LogOfZero(String),
    #[error("'{token}': logarithm base must be at least 2, got {base}")]
    InvalidBase { token: String, base: u32 },
    #[error("'{0}': value does not fit into a 64-bit integer")]
    Overflow(String),
    #[error("'{token}' expands to {len} values, at most {max} are allowed")]
    TooLarge { token: String, len: usize, max: usize },
}

/// Errors related to the persisted result store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The store exists and is non-empty but could not be decoded.
    #[error("store {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to replace store {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to loading a machine description
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("failed to read machine description {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse machine description {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

/// Errors that abort a sweep
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("unknown analysis model '{name}' (known: {known})")]
    UnknownModel { name: String, known: String },
    #[error("kernel resolution failed: {0}")]
    Kernel(#[source] BoxError),
    #[error("model {model} failed: {source}")]
    Model {
        model: String,
        #[source]
        source: BoxError,
    },
    /// The kernel reports a different value for a constant than the one just applied.
    #[error("kernel reports {name}={actual} after {name}={expected} was applied")]
    ConstantsMismatch {
        name: String,
        expected: i64,
        actual: i64,
    },
    /// A swept constant is absent from the kernel's active constants.
    #[error("kernel does not report swept constant {name}")]
    MissingConstant { name: String },
    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}
