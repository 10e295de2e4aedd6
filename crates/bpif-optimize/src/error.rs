//! Optimizer failure kinds.

use std::time::Duration;

use bpif_core::BpifError;
use thiserror::Error;

/// Why a constrained solve produced no optimum.
///
/// Callers that prefer the historical "never fail" behaviour substitute the
/// equal-weight portfolio themselves; [`PortfolioOptimizer::select`]
/// does so and tags the result.
///
/// [`PortfolioOptimizer::select`]: crate::PortfolioOptimizer::select
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizationError {
    /// No weight vector satisfies the budget under the per-fund cap.
    #[error("infeasible: {n_assets} funds capped at {max_weight} cannot sum to 1")]
    Infeasible {
        /// Number of funds.
        n_assets: usize,
        /// Per-fund upper bound.
        max_weight: f64,
    },

    /// The target return lies outside what the feasible set can reach.
    #[error("target return {target:.6} outside reachable range [{min:.6}, {max:.6}]")]
    TargetUnreachable {
        /// Requested target return (decimal).
        target: f64,
        /// Lowest reachable return.
        min: f64,
        /// Highest reachable return.
        max: f64,
    },

    /// The iteration cap was hit before the weights settled.
    #[error("solver did not converge within {iterations} iterations")]
    NotConverged {
        /// Iterations performed.
        iterations: usize,
    },

    /// Portfolio volatility vanished, so the Sharpe ratio is undefined.
    #[error("portfolio volatility is zero")]
    DegenerateVolatility,

    /// The configured deadline expired.
    #[error("solver timed out after {elapsed:?}")]
    TimedOut {
        /// Time spent before giving up.
        elapsed: Duration,
    },

    /// No capped portfolio earns more than the risk-free rate, so the
    /// Sharpe ratio cannot be made positive.
    #[error("best reachable return {best:.6} is below the risk-free rate {risk_free_rate:.6}")]
    NoExcessReturn {
        /// Highest return reachable under the cap (decimal).
        best: f64,
        /// Risk-free rate (decimal).
        risk_free_rate: f64,
    },

    /// The QP solver stopped on a numerical problem.
    #[error("solver failure: {0}")]
    SolverFailure(String),

    /// Inputs disagree on the number of funds or contain non-finite values.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<OptimizationError> for BpifError {
    fn from(err: OptimizationError) -> Self {
        Self::Optimization(err.to_string())
    }
}
