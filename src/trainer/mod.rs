//! Training pipeline
//!
//! Integrates the kernel, the Gram matrix cache, a formulation and a QP solver:
//!
//! ```text
//! TrainingSet → GramMatrixCache → Formulation::formulate → SolutionCache
//!             → Formulation::algorithm → Model
//! ```
//!
//! Any failing stage aborts the run. The soft-margin nu search repeats the
//! pipeline with decreasing nu while the solver reports infeasibility.

use crate::core::{Result, SVMError, TrainerConfig, TrainingSet};
use crate::gram::{CacheStats, GramMatrixCache};
use crate::kernel::Kernel;
use crate::model::Model;
use crate::solver::{PairwiseSolver, QpSolver, SolutionCache};
use crate::svm::{Formulation, SoftMargin};
use log::{debug, info};
use std::sync::Arc;

/// Result of [`Trainer::train_with_nu_search`]
#[derive(Debug, Clone)]
pub struct NuSearchOutcome<K: Kernel> {
    pub model: Model<K>,
    /// First feasible nu
    pub nu: f64,
    /// Number of candidates tried, including the successful one
    pub attempts: usize,
}

/// Trains models for one problem, kernel and category
pub struct Trainer<K: Kernel, S: QpSolver = PairwiseSolver> {
    problem_name: String,
    category: String,
    kernel: Arc<K>,
    config: TrainerConfig,
    gram_cache: GramMatrixCache,
    solutions: SolutionCache<S>,
}

impl<K: Kernel> Trainer<K> {
    /// Create a trainer using the built-in pairwise solver
    pub fn new(
        problem_name: impl Into<String>,
        category: impl Into<String>,
        kernel: K,
        config: TrainerConfig,
    ) -> Self {
        let solver = PairwiseSolver::new(config.solver.clone());
        Self::with_solver(problem_name, category, kernel, config, solver)
    }
}

impl<K: Kernel, S: QpSolver> Trainer<K, S> {
    /// Create a trainer backed by a custom QP solver
    pub fn with_solver(
        problem_name: impl Into<String>,
        category: impl Into<String>,
        kernel: K,
        config: TrainerConfig,
        solver: S,
    ) -> Self {
        let gram_cache = GramMatrixCache::new(&config.cache_dir, config.memory_cache_capacity);
        let solutions = SolutionCache::new(&config.cache_dir, solver);
        Self {
            problem_name: problem_name.into(),
            category: category.into(),
            kernel: Arc::new(kernel),
            config,
            gram_cache,
            solutions,
        }
    }

    pub fn problem_name(&self) -> &str {
        &self.problem_name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Switch to another category; the Gram matrices stay cached
    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn solver(&self) -> &S {
        self.solutions.solver()
    }

    pub fn gram_stats(&self) -> CacheStats {
        self.gram_cache.stats()
    }

    /// Name the solution for `formulation` is cached under:
    /// `<problem>-<variant>-<kernel>-<category>` plus the formulation's suffix
    pub fn solution_name<F: Formulation + ?Sized>(&self, formulation: &F) -> String {
        format!(
            "{}-{}-{}-{}{}",
            self.problem_name,
            formulation.variant(),
            self.kernel.name(),
            self.category,
            formulation.solution_suffix()
        )
    }

    /// Run the full pipeline once
    pub fn train<F: Formulation + ?Sized>(
        &mut self,
        set: &TrainingSet,
        formulation: &F,
    ) -> Result<Model<K>> {
        debug!(
            "Training {} on {} vectors of dimension {}",
            formulation.variant(),
            set.len(),
            set.dim()
        );

        let gram =
            self.gram_cache
                .get_or_compute(&self.problem_name, self.kernel.as_ref(), set.values())?;

        debug!("Formulating QP");
        let problem = formulation.formulate(set.labels(), &gram)?;

        let name = self.solution_name(formulation);
        debug!("Solving QP {name}");
        let solution = self.solutions.solve(&name, &problem)?;

        let status = solution.status;
        if status.is_infeasible() {
            return Err(SVMError::Infeasible {
                status: status.code(),
            });
        }
        if !status.is_converged() {
            return Err(SVMError::TrainingFailed {
                status: status.code(),
            });
        }

        debug!(
            "Post-processing {} multipliers (cached: {}, steps: {})",
            solution.lagrangians.len(),
            solution.from_cache,
            solution.iterations
        );
        let params = formulation.algorithm(set.labels(), &gram, &solution.lagrangians)?;

        info!(
            "{name}: {} support vectors, bias {:.6}, margin {:.6}",
            params.support.len(),
            params.bias,
            params.margin
        );

        Ok(Model::new(
            Arc::clone(&self.kernel),
            set.values(),
            set.labels(),
            &solution.lagrangians,
            params,
            formulation.variant(),
            formulation.nu(),
        ))
    }

    /// Train soft-margin models with decreasing nu until one is feasible
    ///
    /// Candidates are `start - k · step` for `k = 1, 2, ...`; the start value
    /// itself is never tried. Only [`SVMError::Infeasible`] moves on to the
    /// next candidate, every other error is returned immediately.
    pub fn train_with_nu_search(&mut self, set: &TrainingSet) -> Result<NuSearchOutcome<K>> {
        let search = self.config.nu_search.clone();
        search.validate()?;
        // Absorbs rounding in `start - k · step` near the floor
        let slack = search.step * 1e-6;

        for attempts in 1.. {
            let nu = search.candidate(attempts);
            if nu < search.floor - slack {
                break;
            }

            let formulation = SoftMargin::new(nu)?;
            match self.train(set, &formulation) {
                Ok(model) => {
                    info!("nu = {nu:.3} feasible after {attempts} attempt(s)");
                    return Ok(NuSearchOutcome {
                        model,
                        nu,
                        attempts,
                    });
                }
                Err(SVMError::Infeasible { status }) => {
                    info!("nu = {nu:.3} infeasible (status {status}), decreasing");
                }
                Err(e) => return Err(e),
            }
        }

        Err(SVMError::NuSearchExhausted {
            floor: search.floor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Classifier, NuSearchConfig};
    use crate::kernel::PolynomialKernel;
    use crate::problem::QpProblem;
    use crate::solver::{Solution, TerminationStatus};
    use crate::svm::{HardMargin, Variant};
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> TrainerConfig {
        TrainerConfig {
            cache_dir: dir.path().to_path_buf(),
            ..TrainerConfig::default()
        }
    }

    fn line_set() -> TrainingSet {
        TrainingSet::new(
            vec![vec![-2.0], vec![-1.0], vec![1.0], vec![3.0]],
            vec![-1.0, -1.0, 1.0, 1.0],
        )
        .unwrap()
    }

    /// Reports a fixed status and counts calls
    struct Stuck {
        status: TerminationStatus,
        calls: Cell<usize>,
    }

    impl QpSolver for Stuck {
        fn solve(&self, problem: &QpProblem) -> Result<Solution> {
            self.calls.set(self.calls.get() + 1);
            Ok(Solution::new(vec![0.0; problem.size()], self.status, 0))
        }
    }

    #[test]
    fn test_solution_name() {
        let dir = TempDir::new().unwrap();
        let trainer = Trainer::new("toy", "earn", PolynomialKernel::quadratic(), config(&dir));
        assert_eq!(
            trainer.solution_name(&HardMargin),
            "toy-Hard-polynomial-2-1-earn"
        );
        assert_eq!(
            trainer.solution_name(&SoftMargin::new(0.25).unwrap()),
            "toy-Soft-polynomial-2-1-earn-nu0.250000"
        );
    }

    #[test]
    fn test_train_hard() {
        let dir = TempDir::new().unwrap();
        let mut trainer = Trainer::new("line", "pos", PolynomialKernel::linear(), config(&dir));
        let model = trainer.train(&line_set(), &HardMargin).unwrap();

        assert_eq!(model.support_vector_indices(), vec![1, 2]);
        assert_eq!(model.bias(), 0.0);
        assert_eq!(model.lambda(), 1.0);
        assert_eq!(model.margin(), 1.0);
        assert_eq!(model.variant(), Variant::Hard);
        assert!(dir.path().join("line-Hard-polynomial-1-0-pos.txt").exists());
        assert!(dir
            .path()
            .join("line-polynomial-1-0-kernelmatrix.txt")
            .exists());
    }

    #[test]
    fn test_infeasible_status_maps_to_error() {
        let dir = TempDir::new().unwrap();
        let solver = Stuck {
            status: TerminationStatus::INFEASIBLE,
            calls: Cell::new(0),
        };
        let mut trainer =
            Trainer::with_solver("line", "pos", PolynomialKernel::linear(), config(&dir), solver);
        assert!(matches!(
            trainer.train(&line_set(), &HardMargin),
            Err(SVMError::Infeasible { status: -3 })
        ));
    }

    #[test]
    fn test_other_status_is_training_failure() {
        let dir = TempDir::new().unwrap();
        let solver = Stuck {
            status: TerminationStatus::ITERATION_LIMIT,
            calls: Cell::new(0),
        };
        let mut trainer =
            Trainer::with_solver("line", "pos", PolynomialKernel::linear(), config(&dir), solver);
        assert!(matches!(
            trainer.train(&line_set(), &HardMargin),
            Err(SVMError::TrainingFailed { status: 0 })
        ));
        assert!(!dir.path().join("line-Hard-polynomial-1-0-pos.txt").exists());
    }

    #[test]
    fn test_numerical_error_status_is_training_failure() {
        let dir = TempDir::new().unwrap();
        let solver = Stuck {
            status: TerminationStatus::NUMERICAL_ERROR,
            calls: Cell::new(0),
        };
        let mut trainer =
            Trainer::with_solver("line", "pos", PolynomialKernel::linear(), config(&dir), solver);
        assert!(matches!(
            trainer.train(&line_set(), &HardMargin),
            Err(SVMError::TrainingFailed { status: -1 })
        ));
    }

    #[test]
    fn test_nu_search_first_candidate() {
        let dir = TempDir::new().unwrap();
        let mut trainer = Trainer::new("line", "pos", PolynomialKernel::linear(), config(&dir));
        let outcome = trainer.train_with_nu_search(&line_set()).unwrap();

        assert_eq!(outcome.attempts, 1);
        assert_relative_eq!(outcome.nu, 0.995, epsilon = 1e-12);
        assert_eq!(outcome.model.nu(), Some(outcome.nu));
        for (x, y) in [(-2.0, -1.0), (-1.0, -1.0), (1.0, 1.0), (3.0, 1.0)] {
            assert_eq!(outcome.model.decide(&[x]).unwrap(), y);
        }
    }

    #[test]
    fn test_nu_search_exhausts() {
        let dir = TempDir::new().unwrap();
        let solver = Stuck {
            status: TerminationStatus::INFEASIBLE,
            calls: Cell::new(0),
        };
        let mut config = config(&dir);
        config.nu_search = NuSearchConfig {
            start: 1.0,
            step: 0.25,
            floor: 0.25,
        };
        let mut trainer =
            Trainer::with_solver("line", "pos", PolynomialKernel::linear(), config, solver);

        assert!(matches!(
            trainer.train_with_nu_search(&line_set()),
            Err(SVMError::NuSearchExhausted { floor }) if floor == 0.25
        ));
        // 0.75, 0.5 and 0.25
        assert_eq!(trainer.solver().calls.get(), 3);
    }

    #[test]
    fn test_nu_search_aborts_on_other_errors() {
        let dir = TempDir::new().unwrap();
        let solver = Stuck {
            status: TerminationStatus(-2),
            calls: Cell::new(0),
        };
        let mut trainer =
            Trainer::with_solver("line", "pos", PolynomialKernel::linear(), config(&dir), solver);

        assert!(matches!(
            trainer.train_with_nu_search(&line_set()),
            Err(SVMError::TrainingFailed { status: -2 })
        ));
        assert_eq!(trainer.solver().calls.get(), 1);
    }

    #[test]
    fn test_gram_matrix_is_shared_across_categories() {
        let dir = TempDir::new().unwrap();
        let mut trainer = Trainer::new("line", "pos", PolynomialKernel::linear(), config(&dir));
        trainer.train(&line_set(), &HardMargin).unwrap();

        trainer.set_category("neg");
        let flipped = TrainingSet::new(
            line_set().values().to_vec(),
            line_set().labels().iter().map(|l| -l).collect(),
        )
        .unwrap();
        trainer.train(&flipped, &HardMargin).unwrap();

        let stats = trainer.gram_stats();
        assert_eq!(stats.computed, 1);
        assert_eq!(stats.memory_hits, 1);
    }
}
