//! High-level API for Support Vector Machine operations
//!
//! This module provides a user-friendly interface for training, prediction
//! and the one-vs-rest corpus evaluation the `ksvm` binary runs.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ksvm::api::SVM;
//! use ksvm::core::TrainingSet;
//! use ksvm::svm::Variant;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let set = TrainingSet::new(vec![vec![0.0, 0.0], vec![1.0, 1.0]], vec![-1.0, 1.0])?;
//!
//! let model = SVM::new()
//!     .with_variant(Variant::Soft)
//!     .with_cache_dir("cache")
//!     .train(&set)?;
//!
//! println!("nu = {}, decision = {}", model.nu(), model.decide(&[2.0, 2.0])?);
//! # Ok(())
//! # }
//! ```

use crate::core::{
    Classifier, NuSearchConfig, Prediction, Result, SVMError, TrainerConfig, TrainingSet,
};
use crate::data::{one_vs_rest, Corpus, TfIdfVectorizer};
use crate::kernel::{Kernel, PolynomialKernel};
use crate::model::Model;
use crate::solver::QpSolver;
use crate::svm::{HardMargin, SoftMargin, Variant};
use crate::trainer::Trainer;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// High-level SVM interface with builder pattern
pub struct SVM<K: Kernel = PolynomialKernel> {
    kernel: K,
    variant: Variant,
    nu: Option<f64>,
    problem_name: String,
    category: String,
    config: TrainerConfig,
}

impl SVM<PolynomialKernel> {
    /// Create a hard-margin SVM with the linear kernel and default parameters
    pub fn new() -> Self {
        Self::with_kernel(PolynomialKernel::linear())
    }
}

impl Default for SVM<PolynomialKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kernel> SVM<K> {
    /// Create SVM with custom kernel
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            variant: Variant::Hard,
            nu: None,
            problem_name: "problem".to_string(),
            category: "default".to_string(),
            config: TrainerConfig::default(),
        }
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Use a fixed nu for the soft margin instead of searching for one
    pub fn with_nu(mut self, nu: f64) -> Self {
        self.nu = Some(nu);
        self
    }

    /// Name the cache files are keyed on
    pub fn with_problem_name(mut self, name: impl Into<String>) -> Self {
        self.problem_name = name.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_cache_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.cache_dir = dir.into();
        self
    }

    /// Set convergence tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.solver.tolerance = tolerance;
        self
    }

    /// Set maximum number of solver steps
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.solver.max_iterations = max_iterations;
        self
    }

    pub fn with_nu_search(mut self, nu_search: NuSearchConfig) -> Self {
        self.config.nu_search = nu_search;
        self
    }

    /// Number of Gram matrices kept in memory
    pub fn with_memory_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.memory_cache_capacity = capacity;
        self
    }

    pub fn train(self, set: &TrainingSet) -> Result<TrainedModel<K>> {
        let mut trainer = Trainer::new(self.problem_name, self.category, self.kernel, self.config);
        train_variant(&mut trainer, set, self.variant, self.nu)
    }
}

/// Train `variant` with an existing trainer
///
/// The soft margin searches for nu unless `nu` is given. The hard margin
/// reports nu as 1.
pub fn train_variant<K: Kernel, S: QpSolver>(
    trainer: &mut Trainer<K, S>,
    set: &TrainingSet,
    variant: Variant,
    nu: Option<f64>,
) -> Result<TrainedModel<K>> {
    match (variant, nu) {
        (Variant::Hard, nu) => {
            if nu.is_some() {
                warn!("nu is ignored by the hard margin");
            }
            let model = trainer.train(set, &HardMargin)?;
            Ok(TrainedModel {
                model,
                nu: 1.0,
                attempts: 1,
            })
        }
        (Variant::Soft, Some(nu)) => {
            let model = trainer.train(set, &SoftMargin::new(nu)?)?;
            Ok(TrainedModel {
                model,
                nu,
                attempts: 1,
            })
        }
        (Variant::Soft, None) => {
            let outcome = trainer.train_with_nu_search(set)?;
            Ok(TrainedModel {
                model: outcome.model,
                nu: outcome.nu,
                attempts: outcome.attempts,
            })
        }
    }
}

/// Trained SVM model with high-level prediction interface
#[derive(Debug, Clone)]
pub struct TrainedModel<K: Kernel> {
    model: Model<K>,
    nu: f64,
    attempts: usize,
}

impl<K: Kernel> TrainedModel<K> {
    /// Predict a single input
    pub fn predict(&self, input: &[f64]) -> Result<Prediction> {
        self.model.predict(input)
    }

    /// Predict multiple inputs
    pub fn predict_batch(&self, inputs: &[Vec<f64>]) -> Result<Vec<Prediction>> {
        self.model.predict_batch(inputs)
    }

    /// +1, -1, or 0 for inputs on the boundary
    pub fn decide(&self, input: &[f64]) -> Result<f64> {
        self.model.decide(input)
    }

    /// Get detailed evaluation metrics
    pub fn evaluate(&self, values: &[Vec<f64>], labels: &[f64]) -> Result<EvaluationMetrics> {
        let decisions = values
            .iter()
            .map(|x| self.model.decide(x))
            .collect::<Result<Vec<_>>>()?;
        EvaluationMetrics::from_decisions(&decisions, labels)
    }

    /// The nu used for training; 1 for the hard margin
    pub fn nu(&self) -> f64 {
        self.nu
    }

    /// Number of nu candidates tried
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Get model information
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            variant: self.model.variant(),
            nu: self.nu,
            n_support_vectors: self.model.n_support_vectors(),
            bias: self.model.bias(),
            lambda: self.model.lambda(),
            margin: self.model.margin(),
            support_vector_indices: self.model.support_vector_indices(),
        }
    }

    /// Get the underlying trained model
    pub fn inner(&self) -> &Model<K> {
        &self.model
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub variant: Variant,
    pub nu: f64,
    pub n_support_vectors: usize,
    pub bias: f64,
    pub lambda: f64,
    pub margin: f64,
    pub support_vector_indices: Vec<usize>,
}

/// Detailed evaluation metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl EvaluationMetrics {
    pub fn new(tp: usize, tn: usize, fp: usize, fn_: usize) -> Self {
        Self {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
        }
    }

    /// Count hits and misses; a decision only counts as a hit when it equals
    /// the label, so a boundary decision of 0 is always a miss
    pub fn from_decisions(decisions: &[f64], labels: &[f64]) -> Result<Self> {
        if decisions.len() != labels.len() {
            return Err(SVMError::DimensionMismatch {
                expected: labels.len(),
                actual: decisions.len(),
            });
        }

        let mut metrics = Self::new(0, 0, 0, 0);
        for (&decided, &label) in decisions.iter().zip(labels) {
            match (label > 0.0, decided == label) {
                (true, true) => metrics.true_positives += 1,
                (true, false) => metrics.false_negatives += 1,
                (false, true) => metrics.true_negatives += 1,
                (false, false) => metrics.false_positives += 1,
            }
        }
        Ok(metrics)
    }

    /// Calculate accuracy: (TP + TN) / (TP + TN + FP + FN)
    pub fn accuracy(&self) -> f64 {
        let total =
            self.true_positives + self.true_negatives + self.false_positives + self.false_negatives;
        if total == 0 {
            0.0
        } else {
            (self.true_positives + self.true_negatives) as f64 / total as f64
        }
    }

    /// Calculate precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        let denominator = self.true_positives + self.false_positives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Calculate recall (sensitivity): TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        let denominator = self.true_positives + self.false_negatives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Calculate F1 score: 2 * (precision * recall) / (precision + recall)
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }

    /// Calculate specificity: TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        let denominator = self.true_negatives + self.false_positives;
        if denominator == 0 {
            0.0
        } else {
            self.true_negatives as f64 / denominator as f64
        }
    }
}

/// Outcome of one one-vs-rest class run
#[derive(Debug, Clone, Serialize)]
pub struct ClassReport {
    pub class: String,
    pub nu: f64,
    pub metrics: EvaluationMetrics,
    pub started_at: DateTime<Utc>,
}

impl fmt::Display for ClassReport {
    /// `class nu tp tn fp fn precision recall accuracy% F1%`, tab separated
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metrics;
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.class,
            self.nu,
            m.true_positives,
            m.true_negatives,
            m.false_positives,
            m.false_negatives,
            m.precision(),
            m.recall(),
            m.accuracy() * 100.0,
            m.f1_score() * 100.0
        )
    }
}

/// Append one report line to `path`, creating the file if needed
pub fn append_report<P: AsRef<Path>>(path: P, report: &ClassReport) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())?;
    writeln!(file, "{report}")?;
    Ok(())
}

/// Train/test corpora vectorized with one tf-idf vocabulary, evaluated one
/// class at a time
pub struct CorpusEvaluation<K: Kernel> {
    trainer: Trainer<K>,
    variant: Variant,
    nu: Option<f64>,
    training: Corpus,
    test: Corpus,
    training_values: Vec<Vec<f64>>,
    test_values: Vec<Vec<f64>>,
}

impl<K: Kernel> CorpusEvaluation<K> {
    /// Fit the vectorizer on `training` and vectorize both corpora
    pub fn new(
        problem_name: &str,
        kernel: K,
        variant: Variant,
        nu: Option<f64>,
        config: TrainerConfig,
        training: Corpus,
        test: Corpus,
    ) -> Self {
        let vectorizer = TfIdfVectorizer::fit(&training);
        info!(
            "Vocabulary of {} words from {} training documents",
            vectorizer.dim(),
            training.len()
        );
        let training_values = vectorizer.vectorize(&training);
        let test_values = vectorizer.vectorize(&test);

        Self {
            trainer: Trainer::new(problem_name, "", kernel, config),
            variant,
            nu,
            training,
            test,
            training_values,
            test_values,
        }
    }

    /// Read `<data_dir>/<problem>-train.txt` and `<data_dir>/<problem>-test.txt`
    pub fn from_data_dir<P: AsRef<Path>>(
        data_dir: P,
        problem_name: &str,
        kernel: K,
        variant: Variant,
        nu: Option<f64>,
        config: TrainerConfig,
    ) -> Result<Self> {
        let dir = data_dir.as_ref();
        let training = Corpus::from_file(dir.join(format!("{problem_name}-train.txt")))?;
        let test = Corpus::from_file(dir.join(format!("{problem_name}-test.txt")))?;
        Ok(Self::new(
            problem_name,
            kernel,
            variant,
            nu,
            config,
            training,
            test,
        ))
    }

    /// Training classes in order of first appearance
    pub fn classes(&self) -> Vec<String> {
        self.training.classes().map(str::to_string).collect()
    }

    /// `<problem>-<variant>-result-<problem>-<kernel>.txt`
    pub fn report_file_name(&self) -> String {
        let problem = self.trainer.problem_name();
        format!(
            "{problem}-{}-result-{problem}-{}.txt",
            self.variant,
            self.trainer.kernel().name()
        )
    }

    /// Train a one-vs-rest model for `class` and evaluate it on the test corpus
    pub fn evaluate_class(&mut self, class: &str) -> Result<ClassReport> {
        let started_at = Utc::now();
        self.trainer.set_category(class);

        let set = one_vs_rest(&self.training_values, &self.training, class)?;
        let test_labels = self.test.labels_for(class);

        let (positive, negative) = set.label_counts();
        info!(
            "{class} training samples: {positive} of {}",
            positive + negative
        );
        let test_positive = test_labels.iter().filter(|&&l| l > 0.0).count();
        info!(
            "{class} test samples: {test_positive} of {}",
            test_labels.len()
        );

        let model = train_variant(&mut self.trainer, &set, self.variant, self.nu)?;
        let metrics = model.evaluate(&self.test_values, &test_labels)?;

        info!(
            "{class}: tp {} tn {} fp {} fn {}, accuracy {:.2}%",
            metrics.true_positives,
            metrics.true_negatives,
            metrics.false_positives,
            metrics.false_negatives,
            metrics.accuracy() * 100.0
        );

        Ok(ClassReport {
            class: class.to_string(),
            nu: model.nu(),
            metrics,
            started_at,
        })
    }
}
