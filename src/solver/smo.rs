//! Pairwise (SMO-style) solver for label-balanced QPs
//!
//! Both SVM formulations constrain the multipliers with
//!
//! ```text
//! Σ y_i α_i = r0,   Σ α_i = r1
//! ```
//!
//! which fixes the multiplier mass of each label group:
//! `Σ_{y=+1} α = (r1 + r0) / 2` and `Σ_{y=-1} α = (r1 - r0) / 2`.
//! Moving mass between two multipliers of the same group keeps both equalities
//! satisfied, so the solver repeatedly picks the maximal-violating pair inside a
//! group and performs an exact line search clipped to the box bounds.

use crate::core::{Result, SVMError, SolverConfig};
use crate::problem::QpProblem;
use crate::solver::{QpSolver, Solution, TerminationStatus};
use log::{debug, trace};

/// Curvature used when a pair has none (identical feature vectors)
const TAU: f64 = 1e-12;

/// Slack allowed when comparing group targets against bound sums
const FEASIBILITY_TOLERANCE: f64 = 1e-12;

/// One label group together with the multiplier mass it must carry
struct Group {
    members: Vec<usize>,
    target: f64,
}

/// Solver for the two-equality QPs produced by the SVM formulations
#[derive(Debug, Clone, Default)]
pub struct PairwiseSolver {
    config: SolverConfig,
}

impl PairwiseSolver {
    /// Create a new solver with the given configuration
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Split variables by the sign of their coefficient in the first equality row
    fn label_groups(problem: &QpProblem) -> Result<[Group; 2]> {
        let unsupported = |reason: &str| {
            SVMError::InvalidParameter(format!(
                "pairwise solver expects rows [labels = r0, ones = r1]: {reason}"
            ))
        };

        let [signs, ones] = problem.equalities() else {
            return Err(unsupported("need exactly two equality rows"));
        };
        if ones.coefficients.iter().any(|&c| c != 1.0) {
            return Err(unsupported("second row must be all ones"));
        }

        let mut positive = Vec::new();
        let mut negative = Vec::new();
        for (i, &c) in signs.coefficients.iter().enumerate() {
            if c == 1.0 {
                positive.push(i);
            } else if c == -1.0 {
                negative.push(i);
            } else {
                return Err(unsupported("first row must hold +1/-1 only"));
            }
        }

        Ok([
            Group {
                members: positive,
                target: (ones.rhs + signs.rhs) / 2.0,
            },
            Group {
                members: negative,
                target: (ones.rhs - signs.rhs) / 2.0,
            },
        ])
    }

    /// Whether every group can reach its target within its bounds
    fn is_feasible(problem: &QpProblem, groups: &[Group]) -> bool {
        let lower = problem.lower_bounds();
        let upper = problem.upper_bounds();

        if lower.iter().zip(upper).any(|(l, u)| l > u) {
            return false;
        }

        groups.iter().all(|group| {
            let min: f64 = group.members.iter().map(|&i| lower[i]).sum();
            let max: f64 = group.members.iter().map(|&i| upper[i]).sum();
            min <= group.target + FEASIBILITY_TOLERANCE
                && max >= group.target - FEASIBILITY_TOLERANCE
        })
    }

    /// Greedy feasible start: fill each group in index order up to its target
    fn initial_point(problem: &QpProblem, groups: &[Group]) -> Vec<f64> {
        let upper = problem.upper_bounds();
        let mut alpha = problem.lower_bounds().to_vec();

        for group in groups {
            let mut remaining =
                group.target - group.members.iter().map(|&i| alpha[i]).sum::<f64>();
            for &i in &group.members {
                if remaining <= 0.0 {
                    break;
                }
                let add = (upper[i] - alpha[i]).min(remaining);
                alpha[i] += add;
                remaining -= add;
            }
        }

        alpha
    }

    /// Maximal-violating pair `(grow, shrink, gap)` within one group
    fn select_pair(
        problem: &QpProblem,
        group: &Group,
        alpha: &[f64],
        gradient: &[f64],
    ) -> Option<(usize, usize, f64)> {
        let lower = problem.lower_bounds();
        let upper = problem.upper_bounds();

        let grow = group
            .members
            .iter()
            .copied()
            .filter(|&i| alpha[i] < upper[i])
            .min_by(|&a, &b| gradient[a].total_cmp(&gradient[b]))?;
        let shrink = group
            .members
            .iter()
            .copied()
            .filter(|&j| alpha[j] > lower[j])
            .max_by(|&a, &b| gradient[a].total_cmp(&gradient[b]))?;

        Some((grow, shrink, gradient[shrink] - gradient[grow]))
    }

    /// Move mass from `shrink` to `grow`, returning the amount moved
    fn take_step(
        problem: &QpProblem,
        grow: usize,
        shrink: usize,
        gap: f64,
        alpha: &mut [f64],
        gradient: &mut [f64],
    ) -> f64 {
        let lower = problem.lower_bounds();
        let upper = problem.upper_bounds();

        let mut curvature = problem.quadratic(grow, grow) + problem.quadratic(shrink, shrink)
            - 2.0 * problem.quadratic(grow, shrink);
        if curvature <= 0.0 {
            curvature = TAU;
        }

        let room_grow = upper[grow] - alpha[grow];
        let room_shrink = alpha[shrink] - lower[shrink];
        let mut delta = gap / curvature;

        if delta >= room_grow || delta >= room_shrink {
            if room_grow <= room_shrink {
                delta = room_grow;
                alpha[grow] = upper[grow];
                alpha[shrink] -= delta;
                if room_grow == room_shrink {
                    alpha[shrink] = lower[shrink];
                }
            } else {
                delta = room_shrink;
                alpha[grow] += delta;
                alpha[shrink] = lower[shrink];
            }
        } else {
            alpha[grow] += delta;
            alpha[shrink] -= delta;
        }

        let row_grow = problem.quadratic_row(grow);
        let row_shrink = problem.quadratic_row(shrink);
        for (k, g) in gradient.iter_mut().enumerate() {
            *g += delta * (row_grow[k] - row_shrink[k]);
        }

        delta
    }
}

impl QpSolver for PairwiseSolver {
    fn solve(&self, problem: &QpProblem) -> Result<Solution> {
        let n = problem.size();
        let groups = Self::label_groups(problem)?;

        if !Self::is_feasible(problem, &groups) {
            debug!("QP with {n} variables is infeasible");
            return Ok(Solution::new(
                vec![0.0; n],
                TerminationStatus::INFEASIBLE,
                0,
            ));
        }

        let mut alpha = Self::initial_point(problem, &groups);
        let mut gradient: Vec<f64> = (0..n)
            .map(|i| {
                problem
                    .quadratic_row(i)
                    .iter()
                    .zip(&alpha)
                    .map(|(q, a)| q * a)
                    .sum::<f64>()
                    + problem.linear()[i]
            })
            .collect();

        let mut iterations = 0;
        loop {
            // total_cmp orders NaN by its sign bit, so check every gap
            let pairs: Vec<_> = groups
                .iter()
                .filter_map(|group| Self::select_pair(problem, group, &alpha, &gradient))
                .collect();
            if gradient.iter().any(|g| !g.is_finite())
                || pairs.iter().any(|pair| !pair.2.is_finite())
            {
                debug!("Pairwise solver hit a non-finite gradient after {iterations} steps");
                return Ok(Solution::new(
                    alpha,
                    TerminationStatus::NUMERICAL_ERROR,
                    iterations,
                ));
            }
            let best = pairs.into_iter().max_by(|a, b| a.2.total_cmp(&b.2));

            let (grow, shrink, gap) = match best {
                Some(pair) if pair.2 >= self.config.tolerance => pair,
                _ => {
                    debug!("Pairwise solver converged after {iterations} steps");
                    return Ok(Solution::new(
                        alpha,
                        TerminationStatus::CONVERGED,
                        iterations,
                    ));
                }
            };

            if iterations >= self.config.max_iterations {
                debug!("Pairwise solver stopped at the iteration limit, gap {gap:e}");
                return Ok(Solution::new(
                    alpha,
                    TerminationStatus::ITERATION_LIMIT,
                    iterations,
                ));
            }

            let moved = Self::take_step(problem, grow, shrink, gap, &mut alpha, &mut gradient);
            trace!("step {iterations}: {shrink} -> {grow}, moved {moved:e}, gap {gap:e}");
            iterations += 1;
        }
    }
}
