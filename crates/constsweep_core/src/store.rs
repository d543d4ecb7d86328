//! Persistent, crash-resistant result store.
//!
//! Results are kept in a nested mapping
//! `kernel name → active constants → model name → result` and serialized as JSON:
//!
//! ```text
//! {
//!   "triad.c": [
//!     { "constants": [["N", 1000], ["M", 8]], "models": { "Volume": { ... } } }
//!   ]
//! }
//! ```
//!
//! Saving writes the whole store to a fresh temporary file next to the target and
//! renames it over the target, so the file on disk is always either the previous
//! store or the new one. There is no inter-process locking: two processes saving
//! to the same path race and the last rename wins.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::permutation::Permutation;

/// The constants active on a kernel when a result was produced, in kernel order
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstantsKey(Vec<(String, i64)>);

impl ConstantsKey {
    pub fn new(pairs: Vec<(String, i64)>) -> Self {
        Self(pairs)
    }

    pub fn pairs(&self) -> &[(String, i64)] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.0.iter().find(|(n, _)| n == name).map(|&(_, v)| v)
    }
}

impl From<Vec<(String, i64)>> for ConstantsKey {
    fn from(pairs: Vec<(String, i64)>) -> Self {
        Self(pairs)
    }
}

impl From<&Permutation> for ConstantsKey {
    fn from(perm: &Permutation) -> Self {
        Self(perm.assignments().to_vec())
    }
}

/// Opaque payload produced by an analysis model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(serde_json::Value);

impl AnalysisResult {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for AnalysisResult {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Model results for one kernel, keyed by the active constants
pub type KernelResults = BTreeMap<ConstantsKey, BTreeMap<String, AnalysisResult>>;

/// On-disk shape of one constants entry
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    constants: ConstantsKey,
    models: BTreeMap<String, AnalysisResult>,
}

type StoredForm = BTreeMap<String, Vec<StoredEntry>>;

/// Accumulated analysis results for every kernel and constant set seen so far
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredForm", into = "StoredForm")]
pub struct ResultStore {
    kernels: BTreeMap<String, KernelResults>,
}

impl From<StoredForm> for ResultStore {
    fn from(stored: StoredForm) -> Self {
        let mut store = ResultStore::default();
        for (kernel, entries) in stored {
            let results = store.kernels.entry(kernel).or_default();
            for entry in entries {
                results
                    .entry(entry.constants)
                    .or_default()
                    .extend(entry.models);
            }
        }
        store
    }
}

impl From<ResultStore> for StoredForm {
    fn from(store: ResultStore) -> Self {
        store
            .kernels
            .into_iter()
            .map(|(kernel, results)| {
                let entries = results
                    .into_iter()
                    .map(|(constants, models)| StoredEntry { constants, models })
                    .collect();
                (kernel, entries)
            })
            .collect()
    }
}

impl ResultStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from `path`.
    ///
    /// A missing or zero-length file yields an empty store. Anything else that
    /// fails to decode is reported as [`StoreError::Corrupt`]; it is never
    /// replaced by an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "result store not found, starting empty");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let store = Self::from_bytes(&bytes).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            kernels = store.kernels.len(),
            results = store.len(),
            "loaded result store"
        );
        Ok(store)
    }

    /// Decode a store from its serialized form. An empty source is an empty store.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
    }

    /// Encode the store in its serialized form
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Insert or overwrite the result at `[kernel][constants][model]`.
    ///
    /// Returns the result previously stored at that path, if any.
    pub fn upsert(
        &mut self,
        kernel: &str,
        constants: ConstantsKey,
        model: &str,
        result: AnalysisResult,
    ) -> Option<AnalysisResult> {
        self.kernels
            .entry(kernel.to_string())
            .or_default()
            .entry(constants)
            .or_default()
            .insert(model.to_string(), result)
    }

    pub fn get(
        &self,
        kernel: &str,
        constants: &ConstantsKey,
        model: &str,
    ) -> Option<&AnalysisResult> {
        self.models(kernel, constants)?.get(model)
    }

    /// All model results stored for one constant set of a kernel
    pub fn models(
        &self,
        kernel: &str,
        constants: &ConstantsKey,
    ) -> Option<&BTreeMap<String, AnalysisResult>> {
        self.kernels.get(kernel)?.get(constants)
    }

    pub fn kernels(&self) -> impl Iterator<Item = &str> {
        self.kernels.keys().map(String::as_str)
    }

    pub fn entries(&self, kernel: &str) -> Option<&KernelResults> {
        self.kernels.get(kernel)
    }

    /// Total number of stored model results
    pub fn len(&self) -> usize {
        self.kernels
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Atomically replace `target` with the current contents of the store.
    pub fn save(&self, target: &Path) -> Result<(), StoreError> {
        self.stage(target)?.commit()?;
        tracing::info!(path = %target.display(), results = self.len(), "saved result store");
        Ok(())
    }

    /// First half of [`ResultStore::save`]: write the store to a fresh temporary
    /// file in the directory of `target` without touching `target` itself.
    ///
    /// Dropping the returned [`StagedSave`] without committing removes the
    /// temporary file.
    pub fn stage(&self, target: &Path) -> Result<StagedSave, StoreError> {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let prefix = format!(
            ".{}.",
            target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "store".to_string())
        );
        let io_err = |source: io::Error| StoreError::Io {
            path: target.to_path_buf(),
            source,
        };

        let bytes = self.to_bytes()?;
        let mut temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(io_err)?;
        temp.write_all(&bytes).map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;

        Ok(StagedSave {
            temp,
            target: target.to_path_buf(),
        })
    }
}

/// A fully written temporary copy of the store, waiting to replace its target
#[derive(Debug)]
pub struct StagedSave {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedSave {
    /// Path of the temporary file
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Rename the temporary file over the target.
    pub fn commit(self) -> Result<(), StoreError> {
        let target = self.target;
        self.temp
            .persist(&target)
            .map(drop)
            .map_err(|e| StoreError::Persist {
                path: target,
                source: e.error,
            })
    }
}
