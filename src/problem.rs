//! Quadratic program specification
//!
//! minimize    ½ αᵀ A α + lᵀ α
//! subject to  lower ≤ α ≤ upper
//!             cₖᵀ α = rₖ   for every equality row k
//!
//! A [`QpProblem`] is built from scratch for every training attempt and never
//! mutated afterwards.

use crate::core::{Result, SVMError};

/// One linear equality row `coefficients · α = rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub coefficients: Vec<f64>,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn new(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self { coefficients, rhs }
    }

    /// Residual `coefficients · α - rhs`
    pub fn residual(&self, alpha: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(alpha)
            .map(|(c, a)| c * a)
            .sum::<f64>()
            - self.rhs
    }
}

/// Assembled QP coefficients handed to a solver
#[derive(Debug, Clone, PartialEq)]
pub struct QpProblem {
    n: usize,
    quadratic: Vec<f64>,
    linear: Vec<f64>,
    lower_bounds: Vec<f64>,
    upper_bounds: Vec<f64>,
    equalities: Vec<LinearConstraint>,
    scale: Vec<f64>,
}

impl QpProblem {
    /// Assemble a problem, checking that every part has matching size
    pub fn new(
        quadratic: Vec<f64>,
        linear: Vec<f64>,
        lower_bounds: Vec<f64>,
        upper_bounds: Vec<f64>,
        equalities: Vec<LinearConstraint>,
        scale: Vec<f64>,
    ) -> Result<Self> {
        let n = linear.len();
        let check = |what: &str, actual: usize, expected: usize| {
            if actual == expected {
                Ok(())
            } else {
                Err(SVMError::InvalidParameter(format!(
                    "{what} has size {actual}, expected {expected}"
                )))
            }
        };

        check("quadratic term", quadratic.len(), n * n)?;
        check("lower bounds", lower_bounds.len(), n)?;
        check("upper bounds", upper_bounds.len(), n)?;
        check("scale", scale.len(), n)?;
        for row in &equalities {
            check("equality row", row.coefficients.len(), n)?;
        }

        Ok(Self {
            n,
            quadratic,
            linear,
            lower_bounds,
            upper_bounds,
            equalities,
            scale,
        })
    }

    /// Number of variables
    pub fn size(&self) -> usize {
        self.n
    }

    /// Entry `(i, j)` of the quadratic term
    pub fn quadratic(&self, i: usize, j: usize) -> f64 {
        self.quadratic[i * self.n + j]
    }

    pub fn quadratic_row(&self, i: usize) -> &[f64] {
        &self.quadratic[i * self.n..(i + 1) * self.n]
    }

    pub fn linear(&self) -> &[f64] {
        &self.linear
    }

    pub fn lower_bounds(&self) -> &[f64] {
        &self.lower_bounds
    }

    pub fn upper_bounds(&self) -> &[f64] {
        &self.upper_bounds
    }

    pub fn equalities(&self) -> &[LinearConstraint] {
        &self.equalities
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Objective value `½ αᵀ A α + lᵀ α`
    pub fn objective(&self, alpha: &[f64]) -> f64 {
        let mut value = 0.0;
        for i in 0..self.n {
            let row = self.quadratic_row(i);
            let a_alpha: f64 = row.iter().zip(alpha).map(|(q, a)| q * a).sum();
            value += alpha[i] * (0.5 * a_alpha + self.linear[i]);
        }
        value
    }
}
