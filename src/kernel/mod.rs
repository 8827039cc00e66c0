//! Kernel functions for SVM

pub mod gaussian;
pub mod polynomial;
pub mod traits;

pub use self::gaussian::*;
pub use self::polynomial::*;
pub use self::traits::*;

use crate::core::{Result, SVMError};

/// Kernel chosen at runtime, e.g. from command-line arguments
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelFunction {
    Polynomial(PolynomialKernel),
    Gaussian(GaussianKernel),
}

impl KernelFunction {
    /// Resolve a kernel from its family name and numeric arguments
    ///
    /// `"polynomial"` takes `[dimension, offset]`, `"gauss"` takes `[sigma]`.
    ///
    /// # Examples
    /// ```
    /// use ksvm::kernel::{Kernel, KernelFunction};
    ///
    /// let kernel = KernelFunction::from_name("gauss", &[0.5]).unwrap();
    /// assert_eq!(kernel.name(), "gauss-0.5");
    /// assert!(KernelFunction::from_name("sigmoid", &[1.0]).is_err());
    /// ```
    pub fn from_name(name: &str, args: &[f64]) -> Result<Self> {
        match name {
            "polynomial" => match args {
                [dimension, offset] => Ok(Self::Polynomial(PolynomialKernel::new(
                    *dimension, *offset,
                ))),
                _ => Err(SVMError::Configuration(format!(
                    "polynomial kernel takes 2 arguments (dimension, offset), got {}",
                    args.len()
                ))),
            },
            "gauss" => match args {
                [sigma] if *sigma > 0.0 => Ok(Self::Gaussian(GaussianKernel::new(*sigma))),
                [sigma] => Err(SVMError::InvalidParameter(format!(
                    "sigma must be positive, got {sigma}"
                ))),
                _ => Err(SVMError::Configuration(format!(
                    "gauss kernel takes 1 argument (sigma), got {}",
                    args.len()
                ))),
            },
            other => Err(SVMError::Configuration(format!(
                "Cannot recognize kernel type: {other}"
            ))),
        }
    }
}

impl Kernel for KernelFunction {
    fn compute(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        match self {
            Self::Polynomial(kernel) => kernel.compute(x, y),
            Self::Gaussian(kernel) => kernel.compute(x, y),
        }
    }

    fn name(&self) -> String {
        match self {
            Self::Polynomial(kernel) => kernel.name(),
            Self::Gaussian(kernel) => kernel.name(),
        }
    }
}

impl From<PolynomialKernel> for KernelFunction {
    fn from(kernel: PolynomialKernel) -> Self {
        Self::Polynomial(kernel)
    }
}

impl From<GaussianKernel> for KernelFunction {
    fn from(kernel: GaussianKernel) -> Self {
        Self::Gaussian(kernel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_polynomial() {
        let kernel = KernelFunction::from_name("polynomial", &[2.0, 1.0]).unwrap();
        assert_eq!(kernel, KernelFunction::Polynomial(PolynomialKernel::new(2.0, 1.0)));
        assert_eq!(kernel.name(), "polynomial-2-1");
        assert_eq!(kernel.compute(&[1.0], &[1.0]).unwrap(), 4.0);
    }

    #[test]
    fn test_from_name_gauss() {
        let kernel = KernelFunction::from_name("gauss", &[1.5]).unwrap();
        assert_eq!(kernel.name(), "gauss-1.5");
        assert_eq!(kernel.compute(&[2.0], &[2.0]).unwrap(), 1.0);
    }

    #[test]
    fn test_from_name_errors() {
        assert!(matches!(
            KernelFunction::from_name("linear", &[]),
            Err(SVMError::Configuration(_))
        ));
        assert!(matches!(
            KernelFunction::from_name("polynomial", &[2.0]),
            Err(SVMError::Configuration(_))
        ));
        assert!(matches!(
            KernelFunction::from_name("gauss", &[1.0, 2.0]),
            Err(SVMError::Configuration(_))
        ));
        assert!(matches!(
            KernelFunction::from_name("gauss", &[-1.0]),
            Err(SVMError::InvalidParameter(_))
        ));
    }
}
