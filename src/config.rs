//! Run configuration loaded from JSON
//!
//! ```json
//! {
//!   "solver": { "tolerance": 1e-9, "max_iterations": 1000000 },
//!   "nu_search": { "start": 1.0, "step": 0.005, "floor": 0.005 },
//!   "memory_cache_capacity": 4,
//!   "nu": 0.08
//! }
//! ```
//!
//! Every field is optional. Without `nu` the soft-margin variant searches for
//! the first feasible nu; with it, that nu is used as-is.

use crate::core::{NuSearchConfig, Result, SVMError, SolverConfig, TrainerConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub solver: SolverConfig,
    pub nu_search: NuSearchConfig,
    pub memory_cache_capacity: usize,
    pub nu: Option<f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        let trainer = TrainerConfig::default();
        Self {
            solver: trainer.solver,
            nu_search: trainer.nu_search,
            memory_cache_capacity: trainer.memory_cache_capacity,
            nu: None,
        }
    }
}

impl RunConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SVMError::SerializationError(e.to_string()))?;
        config.nu_search.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SVMError::SerializationError(e.to_string()))
    }

    /// Trainer configuration persisting into `cache_dir`
    pub fn trainer_config<P: Into<PathBuf>>(&self, cache_dir: P) -> TrainerConfig {
        TrainerConfig {
            cache_dir: cache_dir.into(),
            memory_cache_capacity: self.memory_cache_capacity,
            solver: self.solver.clone(),
            nu_search: self.nu_search.clone(),
        }
    }
}
