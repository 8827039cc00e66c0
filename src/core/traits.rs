//! Core traits for SVM implementation

use crate::core::{sign, Prediction, Result};

/// Decision function of a trained binary classifier
pub trait Classifier {
    /// Raw decision value `Σ α_i y_i K(x_i, x) + B`
    fn decision_function(&self, input: &[f64]) -> Result<f64>;

    /// Sign of the decision value; 0 is returned as-is for boundary inputs
    fn decide(&self, input: &[f64]) -> Result<f64> {
        self.decision_function(input).map(sign)
    }

    /// Predict a single input
    fn predict(&self, input: &[f64]) -> Result<Prediction> {
        self.decision_function(input)
            .map(Prediction::from_decision_value)
    }

    /// Predict multiple inputs
    fn predict_batch(&self, inputs: &[Vec<f64>]) -> Result<Vec<Prediction>> {
        inputs.iter().map(|x| self.predict(x)).collect()
    }

    /// Get the number of support vectors
    fn n_support_vectors(&self) -> usize;

    /// Get the bias term
    fn bias(&self) -> f64;
}
