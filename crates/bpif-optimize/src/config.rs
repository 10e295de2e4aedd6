//! Optimizer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the interior-point QP solves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Interior-point iteration cap for a single solve
    pub max_iterations: usize,
    /// Duality-gap and feasibility tolerance handed to the solver
    pub tolerance: f64,
    /// Slack allowed when checking a target return against the reachable range
    pub constraint_tolerance: f64,
    /// Wall-clock budget per solve in milliseconds, unbounded when `None`
    pub time_limit_ms: Option<u64>,
}

impl SolverConfig {
    /// Time limit as a [`Duration`].
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-8,
            constraint_tolerance: 1e-6,
            time_limit_ms: None,
        }
    }
}

/// Configuration for [`PortfolioOptimizer`](crate::PortfolioOptimizer).
///
/// # Examples
///
/// ```
/// use bpif_optimize::OptimizerConfig;
///
/// let config = OptimizerConfig {
///     risk_free_rate: 16.0,
///     ..Default::default()
/// };
/// assert!((config.risk_free_decimal() - 0.16).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Annual risk-free rate in percent (Bank of Russia key rate assumption)
    pub risk_free_rate: f64,
    /// Per-fund weight cap for the minimum-variance solve
    pub min_variance_max_weight: f64,
    /// Per-fund weight cap for the maximum-Sharpe solve
    pub max_sharpe_max_weight: f64,
    /// Number of target returns on the efficient frontier
    pub frontier_points: usize,
    /// Number of best-returning funds in the high-return portfolio
    pub high_return_top_n: usize,
    /// Solver settings
    pub solver: SolverConfig,
}

impl OptimizerConfig {
    /// Risk-free rate as a decimal fraction.
    pub fn risk_free_decimal(&self) -> f64 {
        self.risk_free_rate / 100.0
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 15.0,
            min_variance_max_weight: 0.4,
            max_sharpe_max_weight: 0.5,
            frontier_points: 50,
            high_return_top_n: 5,
            solver: SolverConfig::default(),
        }
    }
}
