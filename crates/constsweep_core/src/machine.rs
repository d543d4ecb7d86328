//! Machine description loading.
//!
//! The schema of a machine description belongs to the models that consume it, so
//! the file is kept as an ordered map of top-level keys to untyped values.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::MachineError;

/// A machine description read from a YAML file
#[derive(Debug, Clone, PartialEq)]
pub struct MachineModel {
    path: PathBuf,
    attributes: BTreeMap<String, Value>,
}

impl MachineModel {
    /// Read and parse the machine description at `path`.
    pub fn from_path(path: &Path) -> Result<Self, MachineError> {
        let text = fs::read_to_string(path).map_err(|source| MachineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(path, &text)
    }

    /// Parse a machine description from YAML text, recording `path` as its origin.
    pub fn from_yaml(path: &Path, text: &str) -> Result<Self, MachineError> {
        let attributes = if text.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_saphyr::from_str(text).map_err(|e| MachineError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };
        tracing::debug!(
            path = %path.display(),
            keys = attributes.len(),
            "loaded machine description"
        );

        Ok(Self {
            path: path.to_path_buf(),
            attributes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_attributes() {
        let yaml = "model name: Test CPU\ncores per socket: 8\nclock: 2.5\n";
        let machine = MachineModel::from_yaml(Path::new("test.yml"), yaml).unwrap();

        assert_eq!(machine.path(), Path::new("test.yml"));
        assert_eq!(machine.get("model name").and_then(Value::as_str), Some("Test CPU"));
        assert_eq!(machine.get("cores per socket").and_then(Value::as_u64), Some(8));
        assert_eq!(machine.get("clock").and_then(Value::as_f64), Some(2.5));
    }

    #[test]
    fn test_empty_description() {
        let machine = MachineModel::from_yaml(Path::new("empty.yml"), "\n").unwrap();
        assert!(machine.attributes().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = MachineModel::from_path(Path::new("/nonexistent/machine.yml")).unwrap_err();
        assert!(matches!(err, MachineError::Io { .. }));
    }
}
