use argmin::core::{
    CostFunction,
    Error,
    Executor,
    State,
    TerminationReason
};
use argmin::solver::brent::BrentRoot;
use tracing::warn;

use crate::equalizationerror::{
    EqualizationError,
    Result
};
use crate::solver::terminationcode::TerminationCode;
use crate::solver::warpsolver::{
    mean_of,
    WarpSolution,
    TARGET_MEAN,
    WIDE_BRACKET
};

/// Residual `mean_warp(k) - 0.5` over one segment's relative positions.
struct MeanWarpResidual {
    positions: Vec<f64>,
}

impl CostFunction for MeanWarpResidual {
    type Param = f64;
    type Output = f64;

    fn cost(&self, k: &Self::Param) -> std::result::Result<Self::Output, Error> {
        Ok(mean_of(&self.positions, *k) - TARGET_MEAN)
    }
}

/// Brent's method over the full `[1e-8, 99999999]` bracket.
///
/// The mean warp is strictly decreasing in k for non-constant segments, so
/// the wide bracket carries a sign change whenever the root lies inside it.
pub(crate) fn solve_brent(positions: Vec<f64>, precision: f64, max_iterations: usize) -> Result<WarpSolution> {
    let (k_min, k_max) = WIDE_BRACKET;
    let problem = MeanWarpResidual { positions: positions.clone() };
    let solver = BrentRoot::new(k_min, k_max, precision);

    let result = Executor::new(problem, solver)
        .configure(|state| state.param(1.0).max_iters(max_iterations as u64))
        .run()
        .map_err(|error| {
            warn!(%error, "brent root search failed");
            EqualizationError::ConvergenceFailure { iterations: 0, k1: k_min, k2: k_max }
        })?;

    let state = result.state();
    let iterations = state.get_iter() as usize;
    if matches!(state.get_termination_reason(), Some(TerminationReason::MaxItersReached)) {
        return Err(EqualizationError::ConvergenceFailure { iterations, k1: k_min, k2: k_max });
    }
    let k = state
        .get_best_param()
        .or(state.get_param())
        .copied()
        .ok_or(EqualizationError::ConvergenceFailure { iterations, k1: k_min, k2: k_max })?;

    Ok(WarpSolution::new(k, mean_of(&positions, k), TerminationCode::Brent))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::configuration::SolverKind;
    use crate::solver::warpsolver::{
        mean_warp,
        WarpSolver
    };

    #[test]
    fn test_brent_reaches_target_mean() {
        let values = vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.6, 1.0];
        let solver = WarpSolver::new(1e-9, 200, SolverKind::Brent);
        let solution = solver.solve_k(&values, 0, 6).unwrap();
        assert_eq!(solution.code(), TerminationCode::Brent);
        assert!(solution.k() < 1.0);
        assert_abs_diff_eq!(mean_warp(&values, 0, 6, solution.k()).unwrap(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_brent_agrees_with_bisection_on_convex_segment() {
        let values = vec![0.0, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0];
        let brent = WarpSolver::new(1e-9, 200, SolverKind::Brent).solve_k(&values, 0, 6).unwrap();
        let bisection = WarpSolver::new(1e-9, 10_000, SolverKind::Heuristic).solve_k(&values, 0, 6).unwrap();
        assert!(brent.k() > 1.0);
        assert_abs_diff_eq!(
            mean_warp(&values, 0, 6, brent.k()).unwrap(),
            mean_warp(&values, 0, 6, bisection.k()).unwrap(),
            epsilon = 1e-6
        );
    }
}
