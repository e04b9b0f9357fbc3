//! Distance between descriptors

use crate::error::Result;
use crate::vector::Descriptor;

/// Compute the Euclidean (L2) distance between two descriptors, checking dimensions first.
pub fn distance(v1: &Descriptor, v2: &Descriptor) -> Result<f64> {
    v1.check_dimension(v2)?;
    Ok(euclidean_distance(v1.as_slice(), v2.as_slice()))
}

/// Compute Euclidean (L2) distance between two slices.
///
/// Components are paired up; callers must pass slices of equal length.
pub fn euclidean_distance(x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt()
}
