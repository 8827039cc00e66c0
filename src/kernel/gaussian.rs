//! Gaussian kernel implementation
//!
//! K(x, y) = exp(-||x - y||² / (2σ²))

use crate::core::Result;
use crate::kernel::traits::{ensure_same_length, squared_distance, Kernel};

/// Gaussian (RBF) kernel parameterised by its width σ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianKernel {
    sigma: f64,
}

impl GaussianKernel {
    /// Create a new Gaussian kernel
    ///
    /// # Panics
    /// Panics if sigma is not positive
    pub fn new(sigma: f64) -> Self {
        assert!(sigma > 0.0, "Sigma must be positive, got: {}", sigma);
        Self { sigma }
    }

    /// Get the sigma parameter
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Kernel for GaussianKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        ensure_same_length(x, y)?;
        let norm = -squared_distance(x, y) / (2.0 * self.sigma * self.sigma);
        Ok(norm.exp())
    }

    fn name(&self) -> String {
        format!("gauss-{}", self.sigma)
    }
}
