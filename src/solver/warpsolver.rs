use serde::Serialize;
use tracing::{
    debug,
    warn
};

use crate::configuration::{
    Configuration,
    SolverKind
};
use crate::equalizationerror::{
    EqualizationError,
    Result
};
use crate::math::warp::warp_unchecked;
use crate::solver::brentsolver::solve_brent;
use crate::solver::terminationcode::TerminationCode;

pub const TARGET_MEAN: f64 = 0.5;

const SEED_K1: f64 = 0.999;
const SEED_K2: f64 = 1.001;
const CONCAVE_BRACKET: (f64, f64) = (0.00000001, 0.99999999);
const CONVEX_BRACKET: (f64, f64) = (1.00000001, 99999999.0);

pub(crate) const WIDE_BRACKET: (f64, f64) = (CONCAVE_BRACKET.0, CONVEX_BRACKET.1);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WarpSolution {
    k: f64,
    achieved_mean: f64,
    code: TerminationCode,
}

impl WarpSolution {
    pub fn new(k: f64, achieved_mean: f64, code: TerminationCode) -> WarpSolution {
        WarpSolution { k, achieved_mean, code }
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    pub fn achieved_mean(&self) -> f64 {
        self.achieved_mean
    }

    pub fn code(&self) -> TerminationCode {
        self.code
    }
}

/// Positions of `values[row1..=row2]` relative to the segment endpoints.
/// `None` when the endpoints coincide.
pub fn relative_positions(values: &[f64], row1: usize, row2: usize) -> Option<Vec<f64>> {
    let x1 = values[row1];
    let x2 = values[row2];
    if x2 == x1 {
        return None;
    }
    Some(
        values[row1..=row2]
            .iter()
            .map(|&x| (x - x1) / (x2 - x1))
            .collect()
    )
}

pub(crate) fn mean_of(positions: &[f64], k: f64) -> f64 {
    positions.iter().map(|&xi| warp_unchecked(xi, k)).sum::<f64>() / positions.len() as f64
}

/// Mean warped value of the segment `[row1, row2]` for parameter `k`.
pub fn mean_warp(values: &[f64], row1: usize, row2: usize, k: f64) -> Result<f64> {
    if !(k >= 0.0 && k.is_finite()) {
        return Err(EqualizationError::precision_violation("k", k));
    }
    match relative_positions(values, row1, row2) {
        Some(positions) => Ok(mean_of(&positions, k)),
        None => Err(EqualizationError::precision_violation("segment span", 0.0)),
    }
}

/// Finds the k whose mean warp over a segment equals 0.5.
#[derive(Debug, Clone, Copy)]
pub struct WarpSolver {
    precision: f64,
    max_iterations: usize,
    kind: SolverKind,
}

impl WarpSolver {
    pub fn new(precision: f64, max_iterations: usize, kind: SolverKind) -> WarpSolver {
        WarpSolver { precision, max_iterations, kind }
    }

    pub fn from_configuration(configuration: &Configuration) -> WarpSolver {
        WarpSolver::new(
            configuration.precision(),
            configuration.max_iterations(),
            configuration.solver()
        )
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn solve_k(&self, values: &[f64], row1: usize, row2: usize) -> Result<WarpSolution> {
        let positions = match relative_positions(values, row1, row2) {
            Some(positions) => positions,
            None => {
                debug!(row1, row2, "flat segment, using identity warp");
                return Ok(WarpSolution::new(1.0, TARGET_MEAN, TerminationCode::FlatSegment));
            }
        };
        let solution = match self.kind {
            SolverKind::Heuristic => self.bisect(&positions)?,
            SolverKind::Brent => solve_brent(positions, self.precision, self.max_iterations)?,
        };
        debug!(
            row1,
            row2,
            k = solution.k(),
            achieved_mean = solution.achieved_mean(),
            code = solution.code().code(),
            "solved warp parameter"
        );
        Ok(solution)
    }

    // Exit tolerance on the bracket width. Relaxed to a few ulps of the
    // upper end so that brackets around k ~ 1e8 still terminate in f64.
    fn width_tolerance(&self, k2: f64) -> f64 {
        self.precision.max(4.0 * f64::EPSILON * k2.abs())
    }

    fn is_on_target(&self, mean: f64) -> bool {
        (mean - TARGET_MEAN).abs() < self.precision
    }

    /// Directional pre-scan around k = 1 followed by bisection.
    ///
    /// The pre-scan only compares the two seed means against 0.5; it does not
    /// verify a sign change inside the chosen bracket.
    fn bisect(&self, positions: &[f64]) -> Result<WarpSolution> {
        let mut k1 = SEED_K1;
        let mut k2 = SEED_K2;
        let mut mean_1 = mean_of(positions, k1);
        let mut mean_2 = mean_of(positions, k2);

        if mean_1 < mean_2 {
            if mean_1 > TARGET_MEAN {
                (k1, k2) = CONCAVE_BRACKET;
            } else if mean_2 < TARGET_MEAN {
                (k1, k2) = CONVEX_BRACKET;
            } else {
                return Ok(WarpSolution::new((k1 + k2) / 2.0, TARGET_MEAN, TerminationCode::IdentityAscending));
            }
        } else if mean_2 > TARGET_MEAN {
            (k1, k2) = CONVEX_BRACKET;
        } else if mean_1 < TARGET_MEAN {
            (k1, k2) = CONCAVE_BRACKET;
        } else {
            return Ok(WarpSolution::new((k1 + k2) / 2.0, TARGET_MEAN, TerminationCode::IdentityDescending));
        }

        mean_1 = mean_of(positions, k1);
        mean_2 = mean_of(positions, k2);
        let mut k3 = (k1 + k2) / 2.0;
        let mut mean_3 = mean_of(positions, k3);
        let mut iterations = 0;

        while (k2 - k1).abs() > self.width_tolerance(k2) {
            if iterations >= self.max_iterations {
                warn!(iterations, k1, k2, "warp solver did not converge");
                return Err(EqualizationError::ConvergenceFailure { iterations, k1, k2 });
            }
            if self.is_on_target(mean_1) {
                return Ok(WarpSolution::new(k1, mean_1, TerminationCode::LowerBound));
            }
            if self.is_on_target(mean_2) {
                return Ok(WarpSolution::new(k2, mean_2, TerminationCode::UpperBound));
            }
            k3 = (k1 + k2) / 2.0;
            mean_3 = mean_of(positions, k3);
            if self.is_on_target(mean_3) {
                return Ok(WarpSolution::new(k3, mean_3, TerminationCode::Midpoint));
            }
            if mean_2 > mean_1 {
                if mean_3 > TARGET_MEAN {
                    k2 = k3;
                    mean_2 = mean_3;
                } else {
                    k1 = k3;
                    mean_1 = mean_3;
                }
            } else if mean_3 > TARGET_MEAN {
                k1 = k3;
                mean_1 = mean_3;
            } else {
                k2 = k3;
                mean_2 = mean_3;
            }

            iterations += 1;
        }
        Ok(WarpSolution::new(k3, mean_3, TerminationCode::BracketExhausted))
    }
}
