//! Core type definitions for SVM

use crate::core::{Result, SVMError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Sign of the decision value: +1, -1, or 0 when the input lies exactly on the boundary
    pub label: f64,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: f64, decision_value: f64) -> Self {
        Self {
            label,
            decision_value,
        }
    }

    /// Build a prediction from a raw decision value
    pub fn from_decision_value(decision_value: f64) -> Self {
        Self::new(sign(decision_value), decision_value)
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }

    /// True when the input sits exactly on the decision boundary
    pub fn is_on_boundary(&self) -> bool {
        self.label == 0.0
    }
}

/// Three-valued sign: zero maps to zero, never to a class label
pub fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Dense training vectors with parallel binary labels
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    values: Vec<Vec<f64>>,
    labels: Vec<f64>,
}

impl TrainingSet {
    /// Create a training set, validating lengths, dimensionality and labels
    pub fn new(values: Vec<Vec<f64>>, labels: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        if values.len() != labels.len() {
            return Err(SVMError::InvalidDataset(format!(
                "{} vectors but {} labels",
                values.len(),
                labels.len()
            )));
        }

        let dim = values[0].len();
        if let Some(bad) = values.iter().find(|v| v.len() != dim) {
            return Err(SVMError::DimensionMismatch {
                expected: dim,
                actual: bad.len(),
            });
        }

        if let Some(&bad) = labels.iter().find(|&&l| l != 1.0 && l != -1.0) {
            return Err(SVMError::InvalidLabel(bad));
        }

        Ok(Self { values, labels })
    }

    /// Number of training vectors
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; construction rejects empty sets
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Feature dimensionality
    pub fn dim(&self) -> usize {
        self.values[0].len()
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// Count of (+1, -1) labels
    pub fn label_counts(&self) -> (usize, usize) {
        let positive = self.labels.iter().filter(|&&l| l > 0.0).count();
        (positive, self.labels.len() - positive)
    }
}

/// Configuration for the built-in QP solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Largest tolerated gradient gap between two same-label multipliers
    pub tolerance: f64,
    /// Maximum number of two-variable steps
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_iterations: 1_000_000,
        }
    }
}

/// Candidate schedule for the soft-margin nu search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NuSearchConfig {
    /// Value the schedule counts down from (never tried itself)
    pub start: f64,
    /// Decrement between candidates
    pub step: f64,
    /// Smallest candidate still tried
    pub floor: f64,
}

impl Default for NuSearchConfig {
    fn default() -> Self {
        Self {
            start: 1.0,
            step: 0.005,
            floor: 0.005,
        }
    }
}

impl NuSearchConfig {
    /// Candidate number `k` (1-based), computed without accumulating rounding error
    pub fn candidate(&self, k: usize) -> f64 {
        self.start - k as f64 * self.step
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.step > 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "nu search step must be positive, got {}",
                self.step
            )));
        }
        if self.candidate(1) > 1.0 {
            return Err(SVMError::InvalidParameter(format!(
                "first nu candidate {} - {} exceeds 1",
                self.start, self.step
            )));
        }
        if !(self.floor > 0.0) || self.floor > self.start {
            return Err(SVMError::InvalidParameter(format!(
                "nu search floor must lie in (0, {}], got {}",
                self.start, self.floor
            )));
        }
        Ok(())
    }
}

/// Configuration for a training run
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Directory holding the Gram matrix and solution cache files
    pub cache_dir: PathBuf,
    /// Number of Gram matrices kept in memory
    pub memory_cache_capacity: usize,
    pub solver: SolverConfig,
    pub nu_search: NuSearchConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data"),
            memory_cache_capacity: 4,
            solver: SolverConfig::default(),
            nu_search: NuSearchConfig::default(),
        }
    }
}
