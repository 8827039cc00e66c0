//! Soft-margin (nu) SVM
//!
//! Every multiplier is capped at `1 / (nu · n)`. A smaller nu loosens the cap;
//! a nu that is too large makes the equality constraints unreachable, which is
//! what the trainer's nu search probes for.

use crate::core::{Result, SVMError};
use crate::gram::GramMatrix;
use crate::svm::{
    ensure_matching, ensure_solution_size, expansion_at, support_indices, weight_norm_squared,
    Formulation, ModelParameters, Variant,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftMargin {
    nu: f64,
}

impl SoftMargin {
    pub const DEFAULT_NU: f64 = 0.08;

    /// Create a soft-margin formulation; `nu` must lie in `(0, 1]`
    pub fn new(nu: f64) -> Result<Self> {
        if !(nu > 0.0 && nu <= 1.0) {
            return Err(SVMError::InvalidParameter(format!(
                "nu must lie in (0, 1], got {nu}"
            )));
        }
        Ok(Self { nu })
    }

    pub fn nu_value(&self) -> f64 {
        self.nu
    }
}

impl Default for SoftMargin {
    fn default() -> Self {
        Self {
            nu: Self::DEFAULT_NU,
        }
    }
}

impl Formulation for SoftMargin {
    fn variant(&self) -> Variant {
        Variant::Soft
    }

    fn upper_bound(&self, n: usize) -> f64 {
        1.0 / (self.nu * n as f64)
    }

    fn nu(&self) -> Option<f64> {
        Some(self.nu)
    }

    fn solution_suffix(&self) -> String {
        format!("-nu{:.6}", self.nu)
    }

    /// The bias is taken between the last free negative and the last free
    /// positive support vector, i.e. those strictly inside `(0, 1/(nu n))`
    fn algorithm(
        &self,
        labels: &[f64],
        gram: &GramMatrix,
        lagrangians: &[f64],
    ) -> Result<ModelParameters> {
        let n = ensure_matching(labels, gram)?;
        ensure_solution_size(lagrangians, n)?;

        let support = support_indices(lagrangians);
        let bound = self.upper_bound(n);

        let mut index_i = None;
        let mut index_j = None;
        for &i in &support {
            let signed = lagrangians[i] * labels[i];
            if -bound < signed && signed < 0.0 {
                index_i = Some(i);
            }
            if 0.0 < signed && signed < bound {
                index_j = Some(i);
            }
        }

        let (Some(index_i), Some(index_j)) = (index_i, index_j) else {
            return Err(SVMError::NoBoundarySupportVector { nu: self.nu });
        };

        let lambda = weight_norm_squared(labels, gram, lagrangians, &support).sqrt() / 2.0;
        let left = expansion_at(labels, gram, lagrangians, &support, index_i);
        let right = expansion_at(labels, gram, lagrangians, &support, index_j);
        let bias = -lambda * (left + right);

        Ok(ModelParameters {
            support,
            bias,
            lambda,
            margin: 2.0 * lambda * right + bias,
        })
    }
}
