//! Trained SVM model

use crate::core::{Classifier, Result, SVMError};
use crate::kernel::Kernel;
use crate::svm::{ModelParameters, Variant};
use std::sync::Arc;

/// A training vector with a positive multiplier
#[derive(Debug, Clone, PartialEq)]
pub struct SupportVector {
    /// Position in the training set
    pub index: usize,
    pub features: Vec<f64>,
    pub label: f64,
    pub lagrangian: f64,
}

/// Immutable result of a training run
#[derive(Debug, Clone)]
pub struct Model<K: Kernel> {
    kernel: Arc<K>,
    support_vectors: Vec<SupportVector>,
    bias: f64,
    lambda: f64,
    margin: f64,
    variant: Variant,
    nu: Option<f64>,
}

impl<K: Kernel> Model<K> {
    /// Assemble a model from solved multipliers and their derived parameters
    pub(crate) fn new(
        kernel: Arc<K>,
        values: &[Vec<f64>],
        labels: &[f64],
        lagrangians: &[f64],
        params: ModelParameters,
        variant: Variant,
        nu: Option<f64>,
    ) -> Self {
        let support_vectors = params
            .support
            .iter()
            .map(|&index| SupportVector {
                index,
                features: values[index].clone(),
                label: labels[index],
                lagrangian: lagrangians[index],
            })
            .collect();

        Self {
            kernel,
            support_vectors,
            bias: params.bias,
            lambda: params.lambda,
            margin: params.margin,
            variant,
            nu,
        }
    }

    pub fn support_vectors(&self) -> &[SupportVector] {
        &self.support_vectors
    }

    /// Training indices of the support vectors, ascending
    pub fn support_vector_indices(&self) -> Vec<usize> {
        self.support_vectors.iter().map(|sv| sv.index).collect()
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The nu the model was trained with (soft margin only)
    pub fn nu(&self) -> Option<f64> {
        self.nu
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

impl<K: Kernel> Classifier for Model<K> {
    fn decision_function(&self, input: &[f64]) -> Result<f64> {
        let mut sum = 0.0;
        for sv in &self.support_vectors {
            sum += sv.lagrangian * sv.label * self.kernel.compute(&sv.features, input)?;
        }
        let value = sum + self.bias;
        if !value.is_finite() {
            return Err(SVMError::NonFinite(format!("decision value {value}")));
        }
        Ok(value)
    }

    fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    fn bias(&self) -> f64 {
        self.bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::PolynomialKernel;

    fn two_point_model() -> Model<PolynomialKernel> {
        let params = ModelParameters {
            support: vec![0, 1],
            bias: -0.5,
            lambda: 0.5,
            margin: 0.5_f64.sqrt(),
        };
        Model::new(
            Arc::new(PolynomialKernel::linear()),
            &[vec![0.0, 0.0], vec![1.0, 1.0]],
            &[-1.0, 1.0],
            &[0.5, 0.5],
            params,
            Variant::Hard,
            None,
        )
    }

    #[test]
    fn test_decide() {
        let model = two_point_model();
        assert_eq!(model.n_support_vectors(), 2);
        assert_eq!(model.decide(&[2.0, 2.0]).unwrap(), 1.0);
        assert_eq!(model.decide(&[-1.0, -1.0]).unwrap(), -1.0);
    }

    #[test]
    fn test_boundary_input_decides_zero() {
        let model = two_point_model();
        assert_eq!(model.decision_function(&[0.5, 0.5]).unwrap(), 0.0);
        assert_eq!(model.decide(&[0.5, 0.5]).unwrap(), 0.0);
        assert!(model.predict(&[0.5, 0.5]).unwrap().is_on_boundary());
    }

    #[test]
    fn test_support_vector_fields() {
        let model = two_point_model();
        let sv = &model.support_vectors()[1];
        assert_eq!(sv.index, 1);
        assert_eq!(sv.label, 1.0);
        assert_eq!(sv.lagrangian, 0.5);
        assert_eq!(model.support_vector_indices(), vec![0, 1]);
        assert_eq!(model.variant(), Variant::Hard);
        assert_eq!(model.nu(), None);
    }

    #[test]
    fn test_nan_decision_value_is_an_error() {
        let params = ModelParameters {
            support: vec![0, 1],
            bias: f64::NAN,
            lambda: f64::NAN,
            margin: f64::NAN,
        };
        let model = Model::new(
            Arc::new(PolynomialKernel::linear()),
            &[vec![0.0, 0.0], vec![1.0, 1.0]],
            &[-1.0, 1.0],
            &[0.5, 0.5],
            params,
            Variant::Hard,
            None,
        );

        assert!(matches!(
            model.decide(&[3.0, 3.0]),
            Err(SVMError::NonFinite(_))
        ));
        assert!(model.predict(&[-3.0, -3.0]).is_err());
    }

    #[test]
    fn test_input_length_mismatch() {
        let model = two_point_model();
        assert!(matches!(
            model.decide(&[1.0, 2.0, 3.0]),
            Err(SVMError::DimensionMismatch { .. })
        ));
        assert!(model.predict_batch(&[vec![1.0, 1.0], vec![1.0]]).is_err());
    }
}
