//! Hard- and soft-margin (nu) kernel Support Vector Machines
//!
//! Training is expressed as a quadratic program over the Gram matrix of the
//! training set. Gram matrices and solver solutions are cached on disk so
//! that repeated runs on the same problem skip the expensive stages.

pub mod api;
pub mod config;
pub mod core;
pub mod data;
pub mod gram;
pub mod kernel;
pub mod model;
pub mod persistence;
pub mod problem;
pub mod solver;
pub mod svm;
pub mod trainer;

// Re-export main types for convenience
pub use crate::api::{ClassReport, CorpusEvaluation, EvaluationMetrics, ModelInfo, TrainedModel, SVM};
pub use crate::config::RunConfig;
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{Result, SVMError};
pub use crate::data::{Corpus, TfIdfVectorizer};
pub use crate::gram::{CacheStats, GramMatrix, GramMatrixCache};
pub use crate::kernel::{GaussianKernel, Kernel, KernelFunction, PolynomialKernel};
pub use crate::model::{Model, SupportVector};
pub use crate::problem::{LinearConstraint, QpProblem};
pub use crate::solver::{PairwiseSolver, QpSolver, Solution, SolutionCache, TerminationStatus};
pub use crate::svm::{Formulation, HardMargin, SoftMargin, Variant};
pub use crate::trainer::{NuSearchOutcome, Trainer};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
