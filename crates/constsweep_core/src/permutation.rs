//! Cartesian product over sweep axes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::axis::Axis;

/// One full assignment of values to every declared axis
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permutation {
    assignments: Vec<(String, i64)>,
}

impl Permutation {
    /// The `(name, value)` pairs, in axis declaration order
    pub fn assignments(&self) -> &[(String, i64)] {
        &self.assignments
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.assignments
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl fmt::Display for Permutation {
    /// Formats as the command-line flags that select this permutation: `-D N 10 -D M 4`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "-D {name} {value}")?;
        }
        Ok(())
    }
}

/// Iterator over all permutations of a set of axes.
///
/// Yields in row-major order: the first axis varies slowest and the last-declared
/// axis varies fastest. With no axes a single empty permutation is produced.
pub struct Permutations<'a> {
    axes: &'a [Axis],
    current: Vec<usize>,
    remaining: usize,
}

impl<'a> Permutations<'a> {
    pub(crate) fn new(axes: &'a [Axis]) -> Self {
        Self {
            axes,
            current: vec![0; axes.len()],
            remaining: axes.iter().map(Axis::len).product(),
        }
    }
}

impl Iterator for Permutations<'_> {
    type Item = Permutation;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let assignments = self
            .axes
            .iter()
            .zip(&self.current)
            .map(|(axis, &idx)| (axis.name().to_string(), axis.values()[idx]))
            .collect();

        // Increment indices (row-major: last axis varies fastest)
        for i in (0..self.axes.len()).rev() {
            self.current[i] += 1;
            if self.current[i] < self.axes[i].len() {
                break;
            }
            self.current[i] = 0;
        }

        Some(Permutation { assignments })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Permutations<'_> {}
