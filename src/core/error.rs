//! Error types for SVM training and classification

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SVMError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Invalid label: expected -1 or +1, got {0}")]
    InvalidLabel(f64),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Non-finite value: {0}")]
    NonFinite(String),

    #[error("QP constraints are infeasible with the current parameters (status {status})")]
    Infeasible { status: i32 },

    #[error("Training failed: solver terminated with status {status}")]
    TrainingFailed { status: i32 },

    #[error("Solution has no support vectors")]
    NoSupportVectors,

    #[error("No boundary support vector found for nu = {nu}")]
    NoBoundarySupportVector { nu: f64 },

    #[error("No feasible nu found above {floor}")]
    NuSearchExhausted { floor: f64 },

    #[error("Stale cache {path:?}: expected size {expected}, found {actual}")]
    StaleCache {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, SVMError>;
