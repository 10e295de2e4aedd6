//! Constrained mean-variance solvers.
//!
//! Both problems are convex quadratic programs solved with Clarabel over the
//! eigenvalue-clipped covariance. The maximum-Sharpe ratio is homogenised:
//! with `y = kappa * w` it becomes `min y' C y` subject to
//! `(r - rf) . y = 1`, `sum y = kappa` and `0 <= y_i <= cap * kappa`, and the
//! weights are `y / sum y`.

use std::time::Instant;

use ndarray::{Array1, Array2, s};

use crate::config::SolverConfig;
use crate::covariance::clip_eigenvalues;
use crate::error::OptimizationError;
use crate::performance::{MIN_VOLATILITY, evaluate, portfolio_variance};
use crate::qp::{QpFailure, QuadraticProgram};

/// Minimum-variance weights for a target return.
///
/// Solves `min w' C w` subject to `sum w = 1`, `returns . w = target_return`
/// and `0 <= w_i <= max_weight`.
///
/// # Errors
///
/// - [`OptimizationError::Infeasible`] if `n * max_weight < 1`
/// - [`OptimizationError::TargetUnreachable`] if no capped portfolio earns
///   `target_return`
/// - [`OptimizationError::NotConverged`] / [`OptimizationError::TimedOut`]
///   when the solver runs out of iterations or time
///
/// # Examples
///
/// ```
/// use bpif_optimize::{minimize_volatility, SolverConfig};
/// use ndarray::{array, Array2};
///
/// let returns = array![0.10, 0.20, 0.05, 0.12];
/// let cov = Array2::from_diag(&array![0.0025, 0.0225, 0.0004, 0.01]);
/// let w = minimize_volatility(&returns, &cov, 0.11, 0.4, &SolverConfig::default()).unwrap();
/// assert!((w.sum() - 1.0).abs() < 1e-6);
/// assert!((w.dot(&returns) - 0.11).abs() < 1e-6);
/// ```
pub fn minimize_volatility(
    returns: &Array1<f64>,
    covariance: &Array2<f64>,
    target_return: f64,
    max_weight: f64,
    config: &SolverConfig,
) -> Result<Array1<f64>, OptimizationError> {
    let started = Instant::now();
    check_inputs(returns, covariance)?;
    let n = returns.len();
    if !budget_feasible(n, max_weight) {
        return Err(OptimizationError::Infeasible {
            n_assets: n,
            max_weight,
        });
    }

    let tol = config.constraint_tolerance;
    let (min, max) = return_range(returns, max_weight);
    let unreachable = || OptimizationError::TargetUnreachable {
        target: target_return,
        min,
        max,
    };
    if !target_return.is_finite() || target_return < min - tol || target_return > max + tol {
        return Err(unreachable());
    }

    let mut program = QuadraticProgram::new(clip_eigenvalues(covariance) * 2.0)
        .equal(Array1::ones(n), 1.0)
        .bounded(0..n, 0.0, max_weight);
    // A single reachable return makes the target row a copy of the budget row.
    if max - min > tol {
        let target = target_return.clamp(min, max);
        program = program.equal(returns.clone(), target);
    }

    let solution = solve(&program, config, started).map_err(|f| into_error(f, unreachable))?;
    let weights = Array1::from(solution).mapv(|w| w.clamp(0.0, max_weight));

    tracing::debug!(
        target_return,
        variance = portfolio_variance(&weights, covariance),
        "minimum-variance solve finished"
    );
    Ok(weights)
}

/// Maximum-Sharpe weights.
///
/// Maximises `(returns . w - risk_free_rate) / sqrt(w' C w)` subject to
/// `sum w = 1` and `0 <= w_i <= max_weight`. The ratio is maximised
/// globally, so the result is never worse than equal weighting.
/// `risk_free_rate` is a decimal.
///
/// # Errors
///
/// - [`OptimizationError::Infeasible`] if `n * max_weight < 1`
/// - [`OptimizationError::DegenerateVolatility`] if the optimum is riskless
/// - [`OptimizationError::NoExcessReturn`] if no capped portfolio beats the
///   risk-free rate
/// - [`OptimizationError::NotConverged`] / [`OptimizationError::TimedOut`]
pub fn maximize_sharpe(
    returns: &Array1<f64>,
    covariance: &Array2<f64>,
    risk_free_rate: f64,
    max_weight: f64,
    config: &SolverConfig,
) -> Result<Array1<f64>, OptimizationError> {
    let started = Instant::now();
    check_inputs(returns, covariance)?;
    if !risk_free_rate.is_finite() {
        return Err(OptimizationError::InvalidInput(
            "risk-free rate is not finite".to_string(),
        ));
    }
    let n = returns.len();
    if !budget_feasible(n, max_weight) {
        return Err(OptimizationError::Infeasible {
            n_assets: n,
            max_weight,
        });
    }
    if covariance.diag().iter().all(|&v| v < MIN_VOLATILITY * MIN_VOLATILITY) {
        return Err(OptimizationError::DegenerateVolatility);
    }

    let (_, best) = return_range(returns, max_weight);
    let no_excess = || OptimizationError::NoExcessReturn {
        best,
        risk_free_rate,
    };
    if best - risk_free_rate <= config.constraint_tolerance {
        return Err(no_excess());
    }

    // Variables are y_0..y_{n-1} followed by kappa.
    let mut objective = Array2::zeros((n + 1, n + 1));
    objective
        .slice_mut(s![..n, ..n])
        .assign(&(clip_eigenvalues(covariance) * 2.0));

    let excess = Array1::from_iter(returns.iter().map(|r| r - risk_free_rate).chain([0.0]));
    let budget = Array1::from_iter(std::iter::repeat_n(1.0, n).chain([-1.0]));

    let mut program = QuadraticProgram::new(objective)
        .equal(excess, 1.0)
        .equal(budget, 0.0);
    for i in 0..=n {
        let mut row = Array1::zeros(n + 1);
        row[i] = -1.0;
        program = program.at_most(row, 0.0);
    }
    for i in 0..n {
        let mut row = Array1::zeros(n + 1);
        row[i] = 1.0;
        row[n] = -max_weight;
        program = program.at_most(row, 0.0);
    }

    let solution = solve(&program, config, started).map_err(|f| into_error(f, no_excess))?;
    let scaled = Array1::from(solution).slice(s![..n]).mapv(|y| y.max(0.0));
    let total = scaled.sum();
    if total <= f64::EPSILON {
        return Err(OptimizationError::SolverFailure(
            "homogenised solution vanished".to_string(),
        ));
    }
    let weights = (scaled / total).mapv(|w| w.min(max_weight));

    let (ret, vol) = evaluate(&weights, returns, covariance);
    if vol < MIN_VOLATILITY {
        return Err(OptimizationError::DegenerateVolatility);
    }
    tracing::debug!(
        sharpe = (ret - risk_free_rate) / vol,
        "maximum-Sharpe solve finished"
    );
    Ok(weights)
}

/// Whether `n` funds capped at `cap` can hold a fully invested portfolio.
const fn budget_feasible(n: usize, cap: f64) -> bool {
    n > 0 && cap > 0.0 && n as f64 * cap >= 1.0 - 1e-12
}

/// Lowest and highest return reachable under the cap.
///
/// Filled greedily: the cheapest (or richest) funds take `cap` each until
/// the budget is spent.
fn return_range(returns: &Array1<f64>, cap: f64) -> (f64, f64) {
    let mut sorted: Vec<f64> = returns.to_vec();
    sorted.sort_by(f64::total_cmp);

    let fill = |values: &mut dyn Iterator<Item = &f64>| {
        let mut remaining = 1.0_f64;
        let mut total = 0.0;
        for &r in values {
            if remaining <= 0.0 {
                break;
            }
            let w = remaining.min(cap);
            total += w * r;
            remaining -= w;
        }
        total
    };

    let min = fill(&mut sorted.iter());
    let max = fill(&mut sorted.iter().rev());
    (min, max)
}

/// Run `program` with whatever remains of the configured time limit.
fn solve(
    program: &QuadraticProgram,
    config: &SolverConfig,
    started: Instant,
) -> Result<Vec<f64>, QpFailure> {
    let time_left = match config.time_limit() {
        Some(limit) => {
            let elapsed = started.elapsed();
            if elapsed >= limit {
                return Err(QpFailure::TimeLimit(elapsed));
            }
            Some(limit - elapsed)
        }
        None => None,
    };
    program.solve(config, time_left)
}

fn into_error(
    failure: QpFailure,
    infeasible: impl FnOnce() -> OptimizationError,
) -> OptimizationError {
    match failure {
        QpFailure::Infeasible => infeasible(),
        QpFailure::IterationLimit(iterations) => OptimizationError::NotConverged { iterations },
        QpFailure::TimeLimit(elapsed) => OptimizationError::TimedOut { elapsed },
        QpFailure::Numerical(message) => OptimizationError::SolverFailure(message),
    }
}

fn check_inputs(returns: &Array1<f64>, covariance: &Array2<f64>) -> Result<(), OptimizationError> {
    let n = returns.len();
    if n == 0 {
        return Err(OptimizationError::InvalidInput("no funds".to_string()));
    }
    if covariance.dim() != (n, n) {
        return Err(OptimizationError::InvalidInput(format!(
            "covariance is {:?}, expected ({n}, {n})",
            covariance.dim()
        )));
    }
    if returns
        .iter()
        .chain(covariance.iter())
        .any(|x| !x.is_finite())
    {
        return Err(OptimizationError::InvalidInput(
            "inputs contain non-finite values".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::{equal_weights, sharpe_ratio};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn five_funds() -> (Array1<f64>, Array2<f64>) {
        let returns = array![0.10, 0.20, 0.05, 0.14, 0.08];
        let vols = [0.05, 0.15, 0.02, 0.12, 0.04];
        let mut cov = Array2::zeros((5, 5));
        for i in 0..5 {
            for j in 0..5 {
                let rho = if i == j { 1.0 } else { 0.2 };
                cov[[i, j]] = rho * vols[i] * vols[j];
            }
        }
        (returns, cov)
    }

    fn assert_feasible(w: &Array1<f64>, cap: f64) {
        assert_abs_diff_eq!(w.sum(), 1.0, epsilon = 1e-6);
        for &x in w.iter() {
            assert!((0.0..=cap).contains(&x), "weight {x} outside [0, {cap}]");
        }
    }

    #[test]
    fn test_return_range_under_cap() {
        let (returns, _) = five_funds();
        let (min, max) = return_range(&returns, 0.4);
        assert_abs_diff_eq!(min, 0.4 * 0.05 + 0.4 * 0.08 + 0.2 * 0.10, epsilon = 1e-12);
        assert_abs_diff_eq!(max, 0.4 * 0.20 + 0.4 * 0.14 + 0.2 * 0.10, epsilon = 1e-12);
        assert!(budget_feasible(5, 0.2));
        assert!(!budget_feasible(2, 0.4));
    }

    #[test]
    fn test_minimize_volatility_hits_target() {
        let (returns, cov) = five_funds();
        let config = SolverConfig::default();
        for target in [0.08, 0.10, 0.12, 0.14] {
            let w = minimize_volatility(&returns, &cov, target, 0.4, &config).unwrap();
            assert_feasible(&w, 0.4);
            assert_abs_diff_eq!(w.dot(&returns), target, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_minimize_volatility_beats_equal_weight_at_same_return() {
        let (returns, cov) = five_funds();
        let ew = equal_weights(5);
        let (ew_ret, ew_vol) = evaluate(&ew, &returns, &cov);
        let w = minimize_volatility(&returns, &cov, ew_ret, 0.4, &SolverConfig::default()).unwrap();
        let (_, vol) = evaluate(&w, &returns, &cov);
        assert!(vol <= ew_vol + 1e-7);
    }

    #[test]
    fn test_minimize_volatility_two_uncorrelated_funds() {
        // Without a binding cap the target fixes the split.
        let returns = array![0.10, 0.20];
        let cov = Array2::from_diag(&array![0.04, 0.04]);
        let w = minimize_volatility(&returns, &cov, 0.15, 1.0, &SolverConfig::default()).unwrap();
        assert_abs_diff_eq!(w[0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(w[1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_minimize_volatility_matches_analytic_minimum() {
        // Uncorrelated funds with a free budget: weights proportional to 1 / variance.
        let returns = array![0.10, 0.10, 0.10];
        let cov = Array2::from_diag(&array![0.01, 0.02, 0.04]);
        let w = minimize_volatility(&returns, &cov, 0.10, 1.0, &SolverConfig::default()).unwrap();
        let inverse = [100.0, 50.0, 25.0];
        let total: f64 = inverse.iter().sum();
        for (i, v) in inverse.iter().enumerate() {
            assert_abs_diff_eq!(w[i], v / total, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_minimize_volatility_infeasible_cap() {
        let returns = array![0.10, 0.20];
        let cov = Array2::from_diag(&array![0.04, 0.04]);
        let err = minimize_volatility(&returns, &cov, 0.15, 0.4, &SolverConfig::default());
        assert!(matches!(err, Err(OptimizationError::Infeasible { n_assets: 2, .. })));
    }

    #[test]
    fn test_minimize_volatility_unreachable_target() {
        let (returns, cov) = five_funds();
        let err = minimize_volatility(&returns, &cov, 0.20, 0.4, &SolverConfig::default());
        assert!(matches!(err, Err(OptimizationError::TargetUnreachable { .. })));
    }

    #[test]
    fn test_minimize_volatility_iteration_cap() {
        let (returns, cov) = five_funds();
        let config = SolverConfig {
            max_iterations: 0,
            ..Default::default()
        };
        let err = minimize_volatility(&returns, &cov, 0.12, 0.4, &config);
        assert!(matches!(err, Err(OptimizationError::NotConverged { .. })));
    }

    #[test]
    fn test_minimize_volatility_timeout() {
        let (returns, cov) = five_funds();
        let config = SolverConfig {
            time_limit_ms: Some(0),
            ..Default::default()
        };
        let err = minimize_volatility(&returns, &cov, 0.12, 0.4, &config);
        assert!(matches!(err, Err(OptimizationError::TimedOut { .. })));
    }

    #[test]
    fn test_minimize_volatility_indefinite_covariance() {
        // The pairwise heuristic can produce an indefinite matrix; the solve still succeeds.
        let returns = array![0.10, 0.12, 0.14, 0.16];
        let corr = array![
            [1.0, 0.9, -0.9, 0.2],
            [0.9, 1.0, 0.9, 0.2],
            [-0.9, 0.9, 1.0, 0.2],
            [0.2, 0.2, 0.2, 1.0]
        ];
        let cov = corr * 0.01;
        let w = minimize_volatility(&returns, &cov, 0.13, 0.4, &SolverConfig::default()).unwrap();
        assert_feasible(&w, 0.4);
        assert_abs_diff_eq!(w.dot(&returns), 0.13, epsilon = 1e-6);
    }

    #[test]
    fn test_dimension_mismatch() {
        let returns = array![0.1, 0.2, 0.3];
        let cov = Array2::<f64>::eye(2);
        let err = minimize_volatility(&returns, &cov, 0.2, 0.4, &SolverConfig::default());
        assert!(matches!(err, Err(OptimizationError::InvalidInput(_))));
        let err = maximize_sharpe(&returns, &cov, 0.0, 0.5, &SolverConfig::default());
        assert!(matches!(err, Err(OptimizationError::InvalidInput(_))));
    }

    #[test]
    fn test_maximize_sharpe_feasible_and_better_than_equal_weight() {
        let (returns, cov) = five_funds();
        let rf = 0.03;
        let w = maximize_sharpe(&returns, &cov, rf, 0.5, &SolverConfig::default()).unwrap();
        assert_feasible(&w, 0.5);

        let (ret, vol) = evaluate(&w, &returns, &cov);
        let (ew_ret, ew_vol) = evaluate(&equal_weights(5), &returns, &cov);
        assert!(sharpe_ratio(ret, vol, rf) >= sharpe_ratio(ew_ret, ew_vol, rf) - 1e-9);
    }

    #[test]
    fn test_maximize_sharpe_beats_feasible_grid() {
        // No long-only three-fund portfolio on a 0.05 grid does better.
        let (returns, cov) = five_funds();
        let (returns, cov) = (
            returns.slice(s![..3]).to_owned(),
            cov.slice(s![..3, ..3]).to_owned(),
        );
        let rf = 0.02;
        let w = maximize_sharpe(&returns, &cov, rf, 0.5, &SolverConfig::default()).unwrap();
        let (ret, vol) = evaluate(&w, &returns, &cov);
        let best = sharpe_ratio(ret, vol, rf);

        for a in 0..=10 {
            for b in 0..=10 {
                let (wa, wb) = (a as f64 * 0.05, b as f64 * 0.05);
                let wc = 1.0 - wa - wb;
                if !(0.0..=0.5 + 1e-12).contains(&wc) {
                    continue;
                }
                let grid = array![wa, wb, wc];
                let (gr, gv) = evaluate(&grid, &returns, &cov);
                assert!(sharpe_ratio(gr, gv, rf) <= best + 1e-6);
            }
        }
    }

    #[test]
    fn test_maximize_sharpe_prefers_dominant_fund() {
        // Fund 0 has the best return at the lowest risk: it should hit the cap.
        let returns = array![0.30, 0.10, 0.10];
        let cov = Array2::from_diag(&array![0.01, 0.04, 0.04]);
        let w = maximize_sharpe(&returns, &cov, 0.05, 0.5, &SolverConfig::default()).unwrap();
        assert_abs_diff_eq!(w[0], 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(w[1], w[2], epsilon = 1e-5);
    }

    #[test]
    fn test_maximize_sharpe_no_excess_return() {
        let (returns, cov) = five_funds();
        let err = maximize_sharpe(&returns, &cov, 0.25, 0.5, &SolverConfig::default());
        assert!(matches!(err, Err(OptimizationError::NoExcessReturn { .. })));
    }

    #[test]
    fn test_maximize_sharpe_zero_volatility() {
        let returns = array![0.1, 0.2];
        let cov = Array2::zeros((2, 2));
        let err = maximize_sharpe(&returns, &cov, 0.0, 0.5, &SolverConfig::default());
        assert!(matches!(err, Err(OptimizationError::DegenerateVolatility)));
    }

    #[test]
    fn test_maximize_sharpe_infeasible_single_fund() {
        let returns = array![0.1];
        let cov = array![[0.01]];
        let err = maximize_sharpe(&returns, &cov, 0.0, 0.5, &SolverConfig::default());
        assert!(matches!(err, Err(OptimizationError::Infeasible { .. })));
    }

    #[test]
    fn test_maximize_sharpe_iteration_cap() {
        let (returns, cov) = five_funds();
        let config = SolverConfig {
            max_iterations: 0,
            ..Default::default()
        };
        let err = maximize_sharpe(&returns, &cov, 0.03, 0.5, &config);
        assert!(matches!(err, Err(OptimizationError::NotConverged { .. })));
    }

    #[test]
    fn test_maximize_sharpe_timeout() {
        let (returns, cov) = five_funds();
        let config = SolverConfig {
            time_limit_ms: Some(0),
            ..Default::default()
        };
        let err = maximize_sharpe(&returns, &cov, 0.03, 0.5, &config);
        assert!(matches!(err, Err(OptimizationError::TimedOut { .. })));
    }

    #[test]
    fn test_deterministic() {
        let (returns, cov) = five_funds();
        let config = SolverConfig::default();
        let a = maximize_sharpe(&returns, &cov, 0.03, 0.5, &config).unwrap();
        let b = maximize_sharpe(&returns, &cov, 0.03, 0.5, &config).unwrap();
        assert_eq!(a, b);
    }
}
