//! Descriptor vector type and its text encoding

use crate::error::{CbirError, Result};
use serde::{Deserialize, Serialize};

/// A fixed-length feature vector describing one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    data: Vec<f64>,
}

impl Descriptor {
    /// Create a new descriptor from a Vec<f64>
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// Get the dimension of the descriptor
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Get the underlying data as a slice
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Consume the descriptor and return its components
    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }

    /// Check if this descriptor has the same dimension as another
    pub fn has_same_dimension(&self, other: &Descriptor) -> bool {
        self.dimension() == other.dimension()
    }

    /// Sum of all components. A normalized histogram sums to 1.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Parse a descriptor from one whitespace-separated line of floats.
    ///
    /// The error carries only the reason; callers attach file and line.
    pub fn parse_line(line: &str) -> std::result::Result<Self, String> {
        line.split_whitespace()
            .map(|x| x.parse::<f64>().map_err(|_| format!("Invalid float: {}", x)))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Descriptor::new)
    }

    /// Encode the descriptor as a single line joined by `sep` (no newline).
    pub fn to_line(&self, sep: &str) -> String {
        encode_row(&self.data, sep)
    }

    /// Check that `other` has the same dimension, returning an error otherwise.
    pub fn check_dimension(&self, other: &Descriptor) -> Result<()> {
        if self.has_same_dimension(other) {
            Ok(())
        } else {
            Err(CbirError::DimensionMismatch {
                expected: self.dimension(),
                actual: other.dimension(),
            })
        }
    }
}

impl From<Vec<f64>> for Descriptor {
    fn from(data: Vec<f64>) -> Self {
        Descriptor::new(data)
    }
}

pub(crate) fn encode_row(values: &[f64], sep: &str) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}
