//! SVM training variants
//!
//! A [`Formulation`] turns labels and a Gram matrix into a [`QpProblem`] and,
//! once the problem is solved, turns the multipliers into support vectors, a
//! bias and a margin. The two variants only differ in the multiplier upper
//! bound and in how the bias is recovered.

pub mod hard;
pub mod soft;

pub use self::hard::*;
pub use self::soft::*;

use crate::core::{Result, SVMError};
use crate::gram::GramMatrix;
use crate::problem::{LinearConstraint, QpProblem};
use std::fmt;
use std::str::FromStr;

/// Quantities derived from a solved QP
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    /// Training indices with a positive multiplier, ascending
    pub support: Vec<usize>,
    pub bias: f64,
    pub lambda: f64,
    pub margin: f64,
}

/// One SVM training variant
pub trait Formulation {
    /// Variant name used in cache keys and report file names
    fn variant(&self) -> Variant;

    /// Upper bound of every multiplier for a training set of size `n`
    fn upper_bound(&self, n: usize) -> f64;

    /// The nu parameter, for variants that have one
    fn nu(&self) -> Option<f64> {
        None
    }

    /// Suffix distinguishing solutions of the same variant with different parameters
    fn solution_suffix(&self) -> String {
        String::new()
    }

    /// Build the QP:
    /// `A[i][j] = y_i y_j M[i][j]`, zero linear term, `0 ≤ α_i ≤ upper_bound`,
    /// `Σ y_i α_i = 0`, `Σ α_i = 1`, unit scale.
    fn formulate(&self, labels: &[f64], gram: &GramMatrix) -> Result<QpProblem> {
        let n = ensure_matching(labels, gram)?;

        let mut quadratic = Vec::with_capacity(n * n);
        for i in 0..n {
            for (j, m) in gram.row(i).iter().enumerate() {
                quadratic.push(labels[i] * labels[j] * m);
            }
        }

        QpProblem::new(
            quadratic,
            vec![0.0; n],
            vec![0.0; n],
            vec![self.upper_bound(n); n],
            vec![
                LinearConstraint::new(labels.to_vec(), 0.0),
                LinearConstraint::new(vec![1.0; n], 1.0),
            ],
            vec![1.0; n],
        )
    }

    /// Derive support vectors, bias, lambda and margin from solved multipliers
    fn algorithm(
        &self,
        labels: &[f64],
        gram: &GramMatrix,
        lagrangians: &[f64],
    ) -> Result<ModelParameters>;
}

/// Variant names accepted at the configuration boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Hard,
    Soft,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Hard => "Hard",
            Variant::Soft => "Soft",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = SVMError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hard" => Ok(Variant::Hard),
            "soft" => Ok(Variant::Soft),
            other => Err(SVMError::Configuration(format!(
                "Cannot recognize SVM type: {other}"
            ))),
        }
    }
}

/// Check that labels, Gram matrix and (optionally) multipliers describe the same set
pub(crate) fn ensure_matching(labels: &[f64], gram: &GramMatrix) -> Result<usize> {
    if labels.len() != gram.size() {
        return Err(SVMError::DimensionMismatch {
            expected: gram.size(),
            actual: labels.len(),
        });
    }
    Ok(labels.len())
}

pub(crate) fn ensure_solution_size(lagrangians: &[f64], n: usize) -> Result<()> {
    if lagrangians.len() != n {
        return Err(SVMError::DimensionMismatch {
            expected: n,
            actual: lagrangians.len(),
        });
    }
    Ok(())
}

/// Indices with a strictly positive multiplier, ascending
pub(crate) fn support_indices(lagrangians: &[f64]) -> Vec<usize> {
    lagrangians
        .iter()
        .enumerate()
        .filter(|(_, &a)| a > 0.0)
        .map(|(i, _)| i)
        .collect()
}

/// `Σ_{i,j ∈ SV} y_i y_j α_i α_j M[i][j]`
pub(crate) fn weight_norm_squared(
    labels: &[f64],
    gram: &GramMatrix,
    lagrangians: &[f64],
    support: &[usize],
) -> f64 {
    let mut sum = 0.0;
    for &i in support {
        for &j in support {
            sum += labels[i] * labels[j] * lagrangians[i] * lagrangians[j] * gram.get(i, j);
        }
    }
    sum
}

/// `Σ_{k ∈ SV} α_k y_k M[k][index]`, the kernel expansion at a training point
pub(crate) fn expansion_at(
    labels: &[f64],
    gram: &GramMatrix,
    lagrangians: &[f64],
    support: &[usize],
    index: usize,
) -> f64 {
    support
        .iter()
        .map(|&k| lagrangians[k] * labels[k] * gram.get(k, index))
        .sum()
}
