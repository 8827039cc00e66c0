//! Kernel trait definition

use crate::core::{Result, SVMError};

/// Kernel function trait
///
/// A kernel function K(x, y) must satisfy Mercer's condition to be valid for SVM.
/// Every kernel also carries a name that encodes its parameters; the Gram matrix
/// and solution caches use it as part of their keys.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, y)
    ///
    /// Fails with [`SVMError::DimensionMismatch`] when `x` and `y` differ in length.
    fn compute(&self, x: &[f64], y: &[f64]) -> Result<f64>;

    /// Stable name derived from the kernel parameters
    fn name(&self) -> String;
}

/// Reject vectors of different length; kernels never truncate or pad
pub(crate) fn ensure_same_length(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(SVMError::DimensionMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    Ok(())
}

/// Dense dot product of two equally long slices
pub(crate) fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

/// Squared Euclidean distance of two equally long slices
pub(crate) fn squared_distance(x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y)
        .map(|(a, b)| {
            let diff = a - b;
            diff * diff
        })
        .sum()
}
