//! Polynomial Kernel Implementation
//!
//! The polynomial kernel is defined as:
//! K(x, y) = (r + <x, y>)^d
//!
//! Where:
//! - r (offset): independent term in the polynomial
//! - d (dimension): degree of the polynomial, kept as a real exponent
//!
//! Common configurations:
//! - Linear kernel: d=1, r=0
//! - Quadratic kernel: d=2, r=1

use crate::core::Result;
use crate::kernel::traits::{dot, ensure_same_length, Kernel};

/// Polynomial kernel with configurable degree and offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialKernel {
    /// Exponent applied to the shifted dot product
    pub dimension: f64,
    /// Independent term added to the dot product
    pub offset: f64,
}

impl PolynomialKernel {
    /// Creates a new polynomial kernel
    ///
    /// # Examples
    /// ```
    /// use ksvm::kernel::{Kernel, PolynomialKernel};
    ///
    /// // Quadratic kernel: (x·y + 1)²
    /// let kernel = PolynomialKernel::new(2.0, 1.0);
    /// assert_eq!(kernel.name(), "polynomial-2-1");
    /// ```
    pub fn new(dimension: f64, offset: f64) -> Self {
        Self { dimension, offset }
    }

    /// Plain dot product: (x·y)¹
    pub fn linear() -> Self {
        Self::new(1.0, 0.0)
    }

    /// Creates a quadratic kernel: (x·y + 1)²
    pub fn quadratic() -> Self {
        Self::new(2.0, 1.0)
    }
}

impl Kernel for PolynomialKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        ensure_same_length(x, y)?;
        Ok((self.offset + dot(x, y)).powf(self.dimension))
    }

    fn name(&self) -> String {
        format!("polynomial-{}-{}", self.dimension, self.offset)
    }
}
