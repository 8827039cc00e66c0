//! Gram matrix computation and caching
//!
//! A Gram matrix holds every pairwise kernel value of a training set. It costs
//! O(n²) kernel evaluations, so it is computed once per (problem, kernel) pair
//! and reused: first from an in-memory LRU, then from a flat file in the cache
//! directory. Only the upper triangle is evaluated; the lower triangle is
//! mirrored from it.

use crate::core::{Result, SVMError};
use crate::kernel::Kernel;
use crate::persistence;
use log::{debug, info};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Symmetric n×n matrix of kernel values, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct GramMatrix {
    n: usize,
    data: Vec<f64>,
}

impl GramMatrix {
    /// Evaluate `kernel` over every pair of `values`
    pub fn compute<K: Kernel + ?Sized>(kernel: &K, values: &[Vec<f64>]) -> Result<Self> {
        let n = values.len();
        let mut data = vec![0.0; n * n];

        for i in 0..n {
            for j in i..n {
                let value = kernel.compute(&values[i], &values[j])?;
                if !value.is_finite() {
                    return Err(SVMError::NonFinite(format!(
                        "kernel {} gives {value} for vectors {i} and {j}",
                        kernel.name()
                    )));
                }
                data[i * n + j] = value;
                data[j * n + i] = value;
            }
        }

        Ok(Self { n, data })
    }

    /// Build from rows; every row must be as long as there are rows
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for row in rows {
            if row.len() != n {
                return Err(SVMError::DimensionMismatch {
                    expected: n,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self { n, data })
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.n
    }

    /// Entry `(i, j)`
    ///
    /// # Panics
    /// Panics if `i` or `j` is out of range
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "Gram index out of range");
        self.data[i * self.n + j]
    }

    /// Row `i`
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Row-major backing storage
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| (i + 1..self.n).all(|j| self.get(i, j) == self.get(j, i)))
    }
}

/// Two-level cache of Gram matrices keyed by (problem name, kernel name)
pub struct GramMatrixCache {
    dir: PathBuf,
    memory: LruCache<String, Arc<GramMatrix>>,
    memory_hits: u64,
    disk_hits: u64,
    computed: u64,
}

impl GramMatrixCache {
    /// Create a cache persisting into `dir`, keeping up to `capacity` matrices in memory
    pub fn new<P: Into<PathBuf>>(dir: P, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            dir: dir.into(),
            memory: LruCache::new(capacity),
            memory_hits: 0,
            disk_hits: 0,
            computed: 0,
        }
    }

    /// Directory holding the persisted matrices
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a matrix for `(problem_name, kernel_name)` is persisted to
    pub fn path_for(&self, problem_name: &str, kernel_name: &str) -> PathBuf {
        self.dir
            .join(format!("{problem_name}-{kernel_name}-kernelmatrix.txt"))
    }

    /// Return the cached matrix for `(problem_name, kernel.name())`, computing and
    /// persisting it on first use
    ///
    /// A persisted matrix is trusted as-is apart from its size: it must be square
    /// with one row per training vector, otherwise [`SVMError::StaleCache`] is
    /// returned. Reusing a problem name for different data of the same size is not
    /// detected.
    pub fn get_or_compute<K: Kernel + ?Sized>(
        &mut self,
        problem_name: &str,
        kernel: &K,
        values: &[Vec<f64>],
    ) -> Result<Arc<GramMatrix>> {
        let kernel_name = kernel.name();
        let key = format!("{problem_name}-{kernel_name}");
        let n = values.len();

        if let Some(matrix) = self.memory.get(&key).cloned() {
            if matrix.size() == n {
                debug!("Gram matrix {key}: memory hit");
                self.memory_hits += 1;
                return Ok(matrix);
            }
            return Err(SVMError::StaleCache {
                path: self.path_for(problem_name, &kernel_name),
                expected: n,
                actual: matrix.size(),
            });
        }

        let path = self.path_for(problem_name, &kernel_name);
        let matrix = if path.exists() {
            debug!("Gram matrix {key}: loading {path:?}");
            let rows = persistence::read_matrix(&path)?;
            if rows.len() != n {
                return Err(SVMError::StaleCache {
                    path,
                    expected: n,
                    actual: rows.len(),
                });
            }
            let matrix = GramMatrix::from_rows(rows).map_err(|e| match e {
                SVMError::DimensionMismatch { actual, .. } => SVMError::StaleCache {
                    path: path.clone(),
                    expected: n,
                    actual,
                },
                other => other,
            })?;
            self.disk_hits += 1;
            matrix
        } else {
            info!("Computing {n}x{n} Gram matrix for {key}");
            let matrix = GramMatrix::compute(kernel, values)?;
            persistence::write_matrix(&path, matrix.as_slice(), n)?;
            info!("Gram matrix persisted to {path:?}");
            self.computed += 1;
            matrix
        };

        let matrix = Arc::new(matrix);
        self.memory.put(key, Arc::clone(&matrix));
        Ok(matrix)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            memory_hits: self.memory_hits,
            disk_hits: self.disk_hits,
            computed: self.computed,
            capacity: self.memory.cap().get(),
            size: self.memory.len(),
        }
    }

    /// Drop the in-memory layer; persisted files stay
    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub memory_hits: u64,
    pub disk_hits: u64,
    pub computed: u64,
    pub capacity: usize,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{GaussianKernel, PolynomialKernel};
    use std::fs;
    use tempfile::TempDir;

    fn values() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 1.0],
            vec![1.0, 1.0],
            vec![2.0, -1.0],
            vec![0.5, 0.5],
        ]
    }

    #[test]
    fn test_compute_is_symmetric() {
        let matrix = GramMatrix::compute(&GaussianKernel::new(0.8), &values()).unwrap();
        assert_eq!(matrix.size(), 4);
        assert!(matrix.is_symmetric());
        for i in 0..4 {
            assert_eq!(matrix.get(i, i), 1.0);
        }
    }

    #[test]
    fn test_compute_rejects_non_finite_values() {
        // (x·y)^1.5 is NaN for a negative dot product
        let kernel = PolynomialKernel::new(1.5, 0.0);
        let result = GramMatrix::compute(&kernel, &[vec![-1.0], vec![1.0]]);
        assert!(matches!(result, Err(SVMError::NonFinite(_))));
    }

    #[test]
    fn test_compute_values() {
        let matrix = GramMatrix::compute(&PolynomialKernel::linear(), &values()).unwrap();
        assert_eq!(matrix.get(0, 1), 1.0);
        assert_eq!(matrix.get(2, 1), 1.0);
        assert_eq!(matrix.get(2, 2), 5.0);
        assert_eq!(matrix.row(3), &[0.5, 1.0, 0.5, 0.5]);
    }

    #[test]
    fn test_compute_propagates_length_mismatch() {
        let ragged = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(
            GramMatrix::compute(&PolynomialKernel::linear(), &ragged),
            Err(SVMError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_from_rows_rejects_non_square() {
        assert!(GramMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
        assert!(GramMatrix::from_rows(vec![vec![1.0, 2.0], vec![2.0, 1.0]]).is_ok());
    }

    #[test]
    fn test_cache_persists_and_short_circuits() {
        let dir = TempDir::new().unwrap();
        let kernel = PolynomialKernel::quadratic();
        let mut cache = GramMatrixCache::new(dir.path(), 2);

        let first = cache.get_or_compute("toy", &kernel, &values()).unwrap();
        let path = cache.path_for("toy", "polynomial-2-1");
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 4);

        let second = cache.get_or_compute("toy", &kernel, &values()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().computed, 1);
        assert_eq!(cache.stats().memory_hits, 1);
    }

    #[test]
    fn test_disk_reload_is_bit_identical() {
        let dir = TempDir::new().unwrap();
        let kernel = GaussianKernel::new(0.3);

        let computed = GramMatrixCache::new(dir.path(), 1)
            .get_or_compute("toy", &kernel, &values())
            .unwrap();

        let mut fresh = GramMatrixCache::new(dir.path(), 1);
        let loaded = fresh.get_or_compute("toy", &kernel, &values()).unwrap();
        assert_eq!(fresh.stats().disk_hits, 1);
        assert_eq!(fresh.stats().computed, 0);
        for (a, b) in computed.as_slice().iter().zip(loaded.as_slice()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_disk_cache_is_trusted_without_recomputing() {
        let dir = TempDir::new().unwrap();
        let mut cache = GramMatrixCache::new(dir.path(), 1);
        let path = cache.path_for("toy", "polynomial-1-0");
        fs::write(&path, "7 7\n7 7\n").unwrap();

        let matrix = cache
            .get_or_compute("toy", &PolynomialKernel::linear(), &values()[..2])
            .unwrap();
        assert_eq!(matrix.get(0, 0), 7.0);
    }

    #[test]
    fn test_stale_cache_size_is_detected() {
        let dir = TempDir::new().unwrap();
        let kernel = PolynomialKernel::linear();
        GramMatrixCache::new(dir.path(), 1)
            .get_or_compute("toy", &kernel, &values())
            .unwrap();

        let mut fresh = GramMatrixCache::new(dir.path(), 1);
        let result = fresh.get_or_compute("toy", &kernel, &values()[..3]);
        assert!(matches!(
            result,
            Err(SVMError::StaleCache {
                expected: 3,
                actual: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_memory_layer_evicts_lru() {
        let dir = TempDir::new().unwrap();
        let mut cache = GramMatrixCache::new(dir.path(), 1);
        let kernel = PolynomialKernel::linear();

        cache.get_or_compute("a", &kernel, &values()).unwrap();
        cache.get_or_compute("b", &kernel, &values()).unwrap();
        cache.get_or_compute("a", &kernel, &values()).unwrap();

        let stats = cache.stats();
        assert_eq!(stats.computed, 2);
        assert_eq!(stats.disk_hits, 1);
        assert_eq!(stats.memory_hits, 0);
        assert_eq!(stats.size, 1);

        cache.clear_memory();
        assert_eq!(cache.stats().size, 0);
    }
}
