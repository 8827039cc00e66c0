//! Hard-margin SVM
//!
//! Assumes the training set is separable in the kernel-induced feature space:
//! multipliers are bounded below by zero and unbounded above.

use crate::core::{Result, SVMError};
use crate::gram::GramMatrix;
use crate::svm::{
    ensure_matching, ensure_solution_size, expansion_at, support_indices, weight_norm_squared,
    Formulation, ModelParameters, Variant,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HardMargin;

impl HardMargin {
    pub fn new() -> Self {
        Self
    }
}

impl Formulation for HardMargin {
    fn variant(&self) -> Variant {
        Variant::Hard
    }

    fn upper_bound(&self, _n: usize) -> f64 {
        f64::INFINITY
    }

    /// `Λ = Σ y_i y_j α_i α_j M[i][j]` over the support vectors, the bias is
    /// recovered at the first support vector and `Margin = sqrt(Λ)`
    fn algorithm(
        &self,
        labels: &[f64],
        gram: &GramMatrix,
        lagrangians: &[f64],
    ) -> Result<ModelParameters> {
        let n = ensure_matching(labels, gram)?;
        ensure_solution_size(lagrangians, n)?;

        let support = support_indices(lagrangians);
        let &chosen = support.first().ok_or(SVMError::NoSupportVectors)?;

        let lambda = weight_norm_squared(labels, gram, lagrangians, &support);
        let bias =
            labels[chosen] * lambda - expansion_at(labels, gram, lagrangians, &support, chosen);

        Ok(ModelParameters {
            support,
            bias,
            lambda,
            margin: lambda.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::PolynomialKernel;
    use approx::assert_relative_eq;

    fn two_points() -> (Vec<f64>, GramMatrix) {
        let values = vec![vec![0.0, 0.0], vec![1.0, 1.0]];
        let gram = GramMatrix::compute(&PolynomialKernel::linear(), &values).unwrap();
        (vec![-1.0, 1.0], gram)
    }

    #[test]
    fn test_formulate() {
        let (labels, gram) = two_points();
        let problem = HardMargin.formulate(&labels, &gram).unwrap();

        assert_eq!(problem.size(), 2);
        assert_eq!(problem.quadratic(1, 1), 2.0);
        assert_eq!(problem.quadratic(0, 1), 0.0);
        assert!(problem.upper_bounds().iter().all(|u| u.is_infinite()));
        assert_eq!(problem.lower_bounds(), &[0.0, 0.0]);
        assert_eq!(problem.equalities()[0].coefficients, labels);
        assert_eq!(problem.equalities()[1].rhs, 1.0);
        assert_eq!(problem.scale(), &[1.0, 1.0]);
    }

    #[test]
    fn test_quadratic_term_carries_labels() {
        let gram = GramMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.5, 2.0]]).unwrap();
        let problem = HardMargin.formulate(&[1.0, -1.0], &gram).unwrap();
        assert_eq!(problem.quadratic_row(0), &[1.0, -0.5]);
        assert_eq!(problem.quadratic_row(1), &[-0.5, 2.0]);
    }

    #[test]
    fn test_algorithm_two_points() {
        let (labels, gram) = two_points();
        let params = HardMargin.algorithm(&labels, &gram, &[0.5, 0.5]).unwrap();

        assert_eq!(params.support, vec![0, 1]);
        assert_eq!(params.lambda, 0.5);
        assert_eq!(params.bias, -0.5);
        assert_relative_eq!(params.margin, 0.5_f64.sqrt());
    }

    #[test]
    fn test_zero_multipliers_are_not_support_vectors() {
        let gram = GramMatrix::from_rows(vec![
            vec![4.0, 2.0, -2.0],
            vec![2.0, 1.0, -1.0],
            vec![-2.0, -1.0, 1.0],
        ])
        .unwrap();
        let params = HardMargin
            .algorithm(&[-1.0, -1.0, 1.0], &gram, &[0.0, 0.5, 0.5])
            .unwrap();
        assert_eq!(params.support, vec![1, 2]);
        assert_eq!(params.lambda, 1.0);
        assert_eq!(params.bias, 0.0);
        assert_eq!(params.margin, 1.0);
    }

    #[test]
    fn test_empty_support_is_an_error() {
        let (labels, gram) = two_points();
        assert!(matches!(
            HardMargin.algorithm(&labels, &gram, &[0.0, 0.0]),
            Err(SVMError::NoSupportVectors)
        ));
    }

    #[test]
    fn test_size_mismatch() {
        let (_, gram) = two_points();
        assert!(matches!(
            HardMargin.formulate(&[1.0], &gram),
            Err(SVMError::DimensionMismatch { .. })
        ));
        assert!(HardMargin
            .algorithm(&[1.0, -1.0], &gram, &[1.0])
            .is_err());
    }
}
