//! Name-keyed persistence of solver solutions

use crate::core::{Result, SVMError};
use crate::persistence;
use crate::problem::QpProblem;
use crate::solver::{QpSolver, Solution, TerminationStatus};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Wraps a [`QpSolver`] and reuses multipliers persisted under a solution name
///
/// Only converged solutions are written. A hit is returned with status
/// [`TerminationStatus::CONVERGED`] and `from_cache` set, without touching the
/// inner solver.
#[derive(Debug, Clone)]
pub struct SolutionCache<S> {
    dir: PathBuf,
    solver: S,
}

impl<S: QpSolver> SolutionCache<S> {
    pub fn new<P: Into<PathBuf>>(dir: P, solver: S) -> Self {
        Self {
            dir: dir.into(),
            solver,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// File the solution named `name` is persisted to
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.txt"))
    }

    /// Load the solution named `name`, or solve `problem` and persist the result
    /// if it converged
    pub fn solve(&self, name: &str, problem: &QpProblem) -> Result<Solution> {
        let path = self.path_for(name);

        if path.exists() {
            let lagrangians = persistence::read_vector(&path)?;
            if lagrangians.len() != problem.size() {
                return Err(SVMError::StaleCache {
                    path,
                    expected: problem.size(),
                    actual: lagrangians.len(),
                });
            }
            debug!("Solution {name}: loaded from {path:?}");
            return Ok(Solution {
                lagrangians,
                status: TerminationStatus::CONVERGED,
                iterations: 0,
                from_cache: true,
            });
        }

        let solution = self.solver.solve(problem)?;
        if solution.status.is_converged() {
            persistence::write_vector(&path, &solution.lagrangians)?;
            info!("Solution {name} persisted to {path:?}");
        } else {
            debug!("Solution {name} not persisted, status {}", solution.status);
        }
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::LinearConstraint;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    /// Returns a fixed answer and counts how often it was asked
    struct Scripted {
        status: TerminationStatus,
        calls: Cell<usize>,
    }

    impl Scripted {
        fn new(status: TerminationStatus) -> Self {
            Self {
                status,
                calls: Cell::new(0),
            }
        }
    }

    impl QpSolver for Scripted {
        fn solve(&self, problem: &QpProblem) -> Result<Solution> {
            self.calls.set(self.calls.get() + 1);
            let n = problem.size();
            Ok(Solution::new(vec![1.0 / n as f64; n], self.status, 3))
        }
    }

    fn problem(n: usize) -> QpProblem {
        QpProblem::new(
            vec![1.0; n * n],
            vec![0.0; n],
            vec![0.0; n],
            vec![1.0; n],
            vec![LinearConstraint::new(vec![1.0; n], 1.0)],
            vec![1.0; n],
        )
        .unwrap()
    }

    #[test]
    fn test_converged_solution_is_reused() {
        let dir = TempDir::new().unwrap();
        let cache = SolutionCache::new(dir.path(), Scripted::new(TerminationStatus::CONVERGED));

        let first = cache.solve("toy-Hard-k-a", &problem(4)).unwrap();
        assert!(!first.from_cache);
        assert!(cache.path_for("toy-Hard-k-a").exists());

        let second = cache.solve("toy-Hard-k-a", &problem(4)).unwrap();
        assert!(second.from_cache);
        assert_eq!(second.status, TerminationStatus::CONVERGED);
        assert_eq!(second.lagrangians, first.lagrangians);
        assert_eq!(cache.solver().calls.get(), 1);
    }

    #[test]
    fn test_failed_solution_is_not_persisted() {
        let dir = TempDir::new().unwrap();
        let cache = SolutionCache::new(dir.path(), Scripted::new(TerminationStatus::INFEASIBLE));

        let solution = cache.solve("toy", &problem(2)).unwrap();
        assert!(solution.status.is_infeasible());
        assert!(!cache.path_for("toy").exists());

        cache.solve("toy", &problem(2)).unwrap();
        assert_eq!(cache.solver().calls.get(), 2);
    }

    #[test]
    fn test_length_mismatch_is_stale() {
        let dir = TempDir::new().unwrap();
        let cache = SolutionCache::new(dir.path(), Scripted::new(TerminationStatus::CONVERGED));
        fs::write(cache.path_for("toy"), "0.5 0.5\n").unwrap();

        assert!(matches!(
            cache.solve("toy", &problem(3)),
            Err(SVMError::StaleCache {
                expected: 3,
                actual: 2,
                ..
            })
        ));
    }
}
