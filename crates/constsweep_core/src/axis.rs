//! Accumulation of range declarations into sweep axes.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::permutation::Permutations;

/// The ordered, deduplicated candidate values for one swept constant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    name: String,
    values: Vec<i64>,
}

impl Axis {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append the values not yet on the axis, keeping their order.
    fn merge(&mut self, values: impl IntoIterator<Item = i64>) {
        let mut seen: FxHashSet<i64> = self.values.iter().copied().collect();
        for value in values {
            if seen.insert(value) {
                self.values.push(value);
            }
        }
    }
}

/// All axes of a sweep, in order of first declaration.
///
/// Repeated declarations of the same name are merged into a single axis: values
/// already present are skipped, new values are appended in the order given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axes {
    axes: Vec<Axis>,
}

impl Axes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one `NAME RANGESPEC` declaration.
    ///
    /// Declarations with no values are ignored, so every stored axis is non-empty.
    pub fn declare(&mut self, name: &str, values: impl IntoIterator<Item = i64>) {
        if let Some(axis) = self.axes.iter_mut().find(|a| a.name == name) {
            axis.merge(values);
            return;
        }

        let mut axis = Axis {
            name: name.to_string(),
            values: Vec::new(),
        };
        axis.merge(values);
        if !axis.is_empty() {
            self.axes.push(axis);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Axis> {
        self.axes.iter()
    }

    /// Number of axes
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Number of permutations the axes span (1 when there are no axes)
    pub fn total_permutations(&self) -> usize {
        self.axes.iter().map(Axis::len).product()
    }

    /// Shape of the sweep grid, one entry per axis
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(Axis::len).collect()
    }

    /// Iterate over the cartesian product of all axes
    pub fn permutations(&self) -> Permutations<'_> {
        Permutations::new(&self.axes)
    }
}

impl<'a> IntoIterator for &'a Axes {
    type Item = &'a Axis;
    type IntoIter = std::slice::Iter<'a, Axis>;

    fn into_iter(self) -> Self::IntoIter {
        self.axes.iter()
    }
}
