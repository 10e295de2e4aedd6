//! Efficient frontier construction.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::performance::{evaluate, sharpe_ratio};
use crate::solver::minimize_volatility;

/// One solved point: decimal return and volatility with its weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPoint {
    /// Expected annual return (decimal)
    #[serde(rename = "return")]
    pub expected_return: f64,
    /// Annual volatility (decimal)
    pub volatility: f64,
    /// Sharpe ratio against the risk-free rate used to build the frontier
    pub sharpe_ratio: f64,
    /// Weights in input fund order
    pub weights: Vec<f64>,
}

/// Minimum-volatility portfolios over an ascending grid of target returns.
///
/// `returns`, `volatilities` and `sharpe_ratios` mirror `portfolios`
/// element-wise so the frontier can be plotted directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EfficientFrontier {
    /// Solved portfolios, ascending by target return
    pub portfolios: Vec<PortfolioPoint>,
    /// Expected returns of `portfolios`
    pub returns: Vec<f64>,
    /// Volatilities of `portfolios`
    pub volatilities: Vec<f64>,
    /// Sharpe ratios of `portfolios`
    pub sharpe_ratios: Vec<f64>,
    /// Grid targets whose solve failed and were left out
    pub skipped_targets: Vec<f64>,
}

impl EfficientFrontier {
    /// Number of solved points.
    pub fn len(&self) -> usize {
        self.portfolios.len()
    }

    /// Whether no grid point could be solved.
    pub fn is_empty(&self) -> bool {
        self.portfolios.is_empty()
    }

    fn push(&mut self, point: PortfolioPoint) {
        self.returns.push(point.expected_return);
        self.volatilities.push(point.volatility);
        self.sharpe_ratios.push(point.sharpe_ratio);
        self.portfolios.push(point);
    }
}

/// `num_points` evenly spaced values from `start` to `end` inclusive.
///
/// A single point sits at `start`.
pub fn linspace(start: f64, end: f64, num_points: usize) -> Vec<f64> {
    match num_points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num_points - 1) as f64;
            (0..num_points)
                .map(|i| {
                    if i == num_points - 1 {
                        end
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// Trace the efficient frontier between the lowest and highest fund return.
///
/// Each target on the grid is solved with [`minimize_volatility`] under the
/// `max_weight` cap. Targets whose solve fails (typically the grid ends,
/// which a capped portfolio cannot reach) are skipped and listed in
/// [`EfficientFrontier::skipped_targets`]; the remaining points keep the
/// ascending grid order.
pub fn build_frontier(
    returns: &Array1<f64>,
    covariance: &Array2<f64>,
    num_points: usize,
    max_weight: f64,
    risk_free_rate: f64,
    config: &SolverConfig,
) -> EfficientFrontier {
    let mut frontier = EfficientFrontier::default();
    if returns.is_empty() {
        return frontier;
    }

    let min = returns.iter().copied().fold(f64::INFINITY, f64::min);
    let max = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    for target in linspace(min, max, num_points) {
        match minimize_volatility(returns, covariance, target, max_weight, config) {
            Ok(weights) => {
                let (expected_return, volatility) = evaluate(&weights, returns, covariance);
                frontier.push(PortfolioPoint {
                    expected_return,
                    volatility,
                    sharpe_ratio: sharpe_ratio(expected_return, volatility, risk_free_rate),
                    weights: weights.to_vec(),
                });
            }
            Err(err) => {
                tracing::debug!(target_return = target, error = %err, "frontier point skipped");
                frontier.skipped_targets.push(target);
            }
        }
    }

    frontier
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn inputs() -> (Array1<f64>, Array2<f64>) {
        let returns = array![0.06, 0.09, 0.12, 0.15, 0.18];
        let vols = [0.03, 0.06, 0.10, 0.15, 0.22];
        let mut cov = Array2::zeros((5, 5));
        for i in 0..5 {
            for j in 0..5 {
                let rho = if i == j { 1.0 } else { 0.3 };
                cov[[i, j]] = rho * vols[i] * vols[j];
            }
        }
        (returns, cov)
    }

    #[test]
    fn test_linspace() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.3, 0.9, 1), vec![0.3]);
        let grid = linspace(0.0, 1.0, 5);
        assert_eq!(grid.len(), 5);
        assert_abs_diff_eq!(grid[1], 0.25);
        assert_eq!(grid[4], 1.0);
    }

    #[test]
    fn test_frontier_points_follow_grid() {
        let (returns, cov) = inputs();
        let frontier = build_frontier(&returns, &cov, 9, 0.4, 0.0, &SolverConfig::default());

        assert!(!frontier.is_empty());
        assert_eq!(frontier.len() + frontier.skipped_targets.len(), 9);
        assert_eq!(frontier.returns.len(), frontier.volatilities.len());
        assert_eq!(frontier.returns.len(), frontier.sharpe_ratios.len());

        let grid = linspace(0.06, 0.18, 9);
        let solved: Vec<f64> = grid
            .iter()
            .copied()
            .filter(|t| !frontier.skipped_targets.contains(t))
            .collect();
        for (ret, target) in frontier.returns.iter().zip(solved.iter()) {
            assert_abs_diff_eq!(*ret, *target, epsilon = 1e-4);
        }
        for pair in frontier.returns.windows(2) {
            assert!(pair[1] >= pair[0] - 1e-9);
        }
        for point in &frontier.portfolios {
            assert_abs_diff_eq!(point.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-4);
            assert!(point.weights.iter().all(|&w| (-1e-9..=0.4 + 1e-9).contains(&w)));
        }
    }

    #[test]
    fn test_frontier_skips_unreachable_ends() {
        // Under a 0.4 cap neither the lowest nor the highest fund return is reachable.
        let (returns, cov) = inputs();
        let frontier = build_frontier(&returns, &cov, 9, 0.4, 0.0, &SolverConfig::default());
        assert_eq!(frontier.skipped_targets.first(), Some(&0.06));
        assert_eq!(frontier.skipped_targets.last(), Some(&0.18));
    }

    #[test]
    fn test_frontier_upper_branch_volatility_rises() {
        let (returns, cov) = inputs();
        let frontier = build_frontier(&returns, &cov, 9, 0.4, 0.0, &SolverConfig::default());
        let top = frontier.volatilities.last().unwrap();
        let low = frontier
            .volatilities
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        assert!(*top > low);
    }

    #[test]
    fn test_single_point_identical_returns() {
        let returns = array![0.1, 0.1, 0.1];
        let cov = Array2::from_diag(&array![0.01, 0.02, 0.03]);
        let frontier = build_frontier(&returns, &cov, 1, 0.4, 0.0, &SolverConfig::default());

        assert_eq!(frontier.len(), 1);
        assert!(frontier.skipped_targets.is_empty());
        assert_abs_diff_eq!(frontier.returns[0], 0.1, epsilon = 1e-7);
    }

    #[test]
    fn test_sharpe_uses_risk_free_rate() {
        let (returns, cov) = inputs();
        let rf = 0.05;
        let frontier = build_frontier(&returns, &cov, 5, 0.4, rf, &SolverConfig::default());
        for point in &frontier.portfolios {
            assert_abs_diff_eq!(
                point.sharpe_ratio,
                (point.expected_return - rf) / point.volatility,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_empty_inputs() {
        let frontier = build_frontier(
            &Array1::zeros(0),
            &Array2::zeros((0, 0)),
            10,
            0.4,
            0.0,
            &SolverConfig::default(),
        );
        assert!(frontier.is_empty());
        assert!(frontier.skipped_targets.is_empty());
    }
}
