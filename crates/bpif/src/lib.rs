#![doc(issue_tracker_base_url = "https://github.com/bpif-research/bpif/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # bpif
//!
//! Portfolio construction and risk analytics for Russian exchange-traded
//! funds (BPIF).
//!
//! bpif is an umbrella crate that re-exports the bpif sub-crates for
//! convenience: fund inputs, the mean-variance optimizer and per-fund risk
//! metrics.
//!
//! ## Quick Start
//!
//! ```
//! use bpif::prelude::*;
//!
//! # fn main() -> bpif::Result<()> {
//! let funds = vec![
//!     FundSnapshot::new("SBGB", 9.0, 4.0).with_short_name("Sber Gov Bonds"),
//!     FundSnapshot::new("SBMX", 22.0, 18.0).with_short_name("Sber MOEX"),
//!     FundSnapshot::new("TGLD", 18.0, 14.0).with_short_name("Tinkoff Gold"),
//! ];
//!
//! let optimizer = PortfolioOptimizer::new(OptimizerConfig::default());
//! let portfolios = optimizer.select(&funds)?;
//! for (name, summary) in portfolios.iter() {
//!     println!("{name}: {:.2}% at {:.2}% risk", summary.expected_return, summary.volatility);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`funds`] - Fund snapshots, fund tables and the shared error type
//! - [`optimize`] - Covariance heuristic, solvers, efficient frontier, selector
//! - [`metrics`] - Per-fund Sharpe, information ratio, beta, alpha and VaR
//!
//! ## Architecture
//!
//! 1. **Fund reports** are loaded into [`FundSnapshot`]s (directly or via a [`FundTable`])
//! 2. **The covariance heuristic** guesses correlations from fund names
//! 3. **Solvers** find minimum-variance and maximum-Sharpe weights under per-fund caps
//! 4. **The selector** packages named portfolios for reports and dashboards

/// Version information for the bpif crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Fund Inputs
// ============================================================================

/// Fund inputs and the shared error type.
pub mod funds {
    pub use bpif_core::*;
}

pub use bpif_core::{BpifError, FundSnapshot, FundTable, Result, Ticker};

// ============================================================================
// Portfolio Construction
// ============================================================================

/// Mean-variance portfolio construction.
///
/// ## Named portfolios
///
/// - **minimum_variance**: lowest volatility at the mean fund return, weights capped at 0.4
/// - **maximum_sharpe**: highest Sharpe ratio, weights capped at 0.5
/// - **equal_weighted**: `1/n` in every fund
/// - **high_return**: the five best-returning funds in equal shares
///
/// When a solve fails the portfolio falls back to equal weights and its
/// `source` says so.
pub mod optimize {
    pub use bpif_optimize::*;
}

pub use bpif_optimize::{
    EfficientFrontier, OptimalPortfolios, OptimizationError, OptimizerConfig, PortfolioOptimizer,
    PortfolioSummary, WeightSource,
};

// ============================================================================
// Risk Metrics
// ============================================================================

/// Per-fund risk metrics.
pub mod metrics {
    pub use bpif_metrics::*;
}

pub use bpif_metrics::{FundMetrics, RiskMetrics, RiskMetricsConfig};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```
/// use bpif::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BpifError, EfficientFrontier, FundSnapshot, FundTable, OptimalPortfolios, OptimizerConfig,
        PortfolioOptimizer, PortfolioSummary, Result, RiskMetrics, RiskMetricsConfig,
        WeightSource,
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
    }

    #[test]
    fn test_pipeline_through_reexports() {
        let funds = vec![
            FundSnapshot::new("A", 10.0, 5.0),
            FundSnapshot::new("B", 20.0, 15.0),
            FundSnapshot::new("C", 5.0, 2.0),
        ];
        let portfolios = PortfolioOptimizer::default().select(&funds).unwrap();
        assert_abs_diff_eq!(portfolios.equal_weighted.expected_return, 35.0 / 3.0, epsilon = 1e-9);

        let inputs = optimize::estimate(&funds).unwrap();
        let (ret, _) = optimize::evaluate(
            &optimize::equal_weights(3),
            &inputs.returns,
            &inputs.covariance,
        );
        assert_abs_diff_eq!(ret * 100.0, 35.0 / 3.0, epsilon = 1e-9);

        let metrics = RiskMetrics::for_fund(&funds[1], &RiskMetricsConfig::default()).unwrap();
        assert!(metrics.beta > 0.0);
    }

    #[test]
    fn test_error_types() {
        let _result: Result<()> = Ok(());
        let _error: BpifError = BpifError::InvalidData("test".to_string());
        let err: BpifError = OptimizationError::DegenerateVolatility.into();
        assert!(matches!(err, BpifError::Optimization(_)));
    }
}
