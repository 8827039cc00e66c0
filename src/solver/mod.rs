//! QP solver contract and implementations
//!
//! The training pipeline only talks to [`QpSolver`]. The built-in
//! [`PairwiseSolver`] covers the constraint family both SVM formulations
//! produce; [`SolutionCache`] persists successful solutions by name so that a
//! repeated run skips solving entirely.

pub mod cached;
pub mod smo;

pub use self::cached::*;
pub use self::smo::*;

use crate::core::Result;
use crate::problem::QpProblem;
use std::fmt;

/// Solver-reported outcome code
///
/// Positive means converged. Zero or negative means the multipliers are not
/// usable; [`TerminationStatus::INFEASIBLE`] in particular signals that the
/// bounds and equality constraints cannot be met together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationStatus(pub i32);

impl TerminationStatus {
    pub const CONVERGED: Self = Self(1);
    pub const ITERATION_LIMIT: Self = Self(0);
    pub const INFEASIBLE: Self = Self(-3);
    /// NaN or infinite values in the problem data
    pub const NUMERICAL_ERROR: Self = Self(-1);

    pub fn code(self) -> i32 {
        self.0
    }

    pub fn is_converged(self) -> bool {
        self.0 > 0
    }

    pub fn is_infeasible(self) -> bool {
        self == Self::INFEASIBLE
    }
}

impl fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let meaning = match *self {
            Self::CONVERGED => "converged",
            Self::ITERATION_LIMIT => "iteration limit",
            Self::INFEASIBLE => "infeasible",
            Self::NUMERICAL_ERROR => "numerical error",
            s if s.is_converged() => "converged",
            _ => "failed",
        };
        write!(f, "{} ({})", self.0, meaning)
    }
}

/// Multipliers returned by a solver, one per training vector
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub lagrangians: Vec<f64>,
    pub status: TerminationStatus,
    /// Number of two-variable steps performed
    pub iterations: usize,
    /// True when the multipliers were read from the solution cache
    pub from_cache: bool,
}

impl Solution {
    pub fn new(lagrangians: Vec<f64>, status: TerminationStatus, iterations: usize) -> Self {
        Self {
            lagrangians,
            status,
            iterations,
            from_cache: false,
        }
    }
}

/// Anything able to minimize an assembled [`QpProblem`]
pub trait QpSolver {
    /// Solve the problem; a non-converged run is reported through
    /// [`Solution::status`], malformed input through `Err`
    fn solve(&self, problem: &QpProblem) -> Result<Solution>;
}

impl<S: QpSolver + ?Sized> QpSolver for &S {
    fn solve(&self, problem: &QpProblem) -> Result<Solution> {
        (**self).solve(problem)
    }
}

impl<S: QpSolver + ?Sized> QpSolver for Box<S> {
    fn solve(&self, problem: &QpProblem) -> Result<Solution> {
        (**self).solve(problem)
    }
}
