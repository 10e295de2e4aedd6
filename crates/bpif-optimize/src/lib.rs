#![doc(issue_tracker_base_url = "https://github.com/bpif-research/bpif/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

//! Mean-variance portfolio construction for Russian exchange-traded funds.
//!
//! The pipeline runs leaf to root:
//!
//! 1. [`estimate`] turns fund snapshots into decimal returns and a heuristic
//!    covariance matrix (correlations are guessed from fund names).
//! 2. [`evaluate`] maps a weight vector to expected return and volatility.
//! 3. [`minimize_volatility`] and [`maximize_sharpe`] solve the long-only,
//!    capped, fully invested problems as quadratic programs with Clarabel.
//! 4. [`build_frontier`] sweeps target returns into an efficient frontier.
//! 5. [`PortfolioOptimizer`] assembles the named portfolios for reports.
//!
//! # Examples
//!
//! ```
//! use bpif_core::FundSnapshot;
//! use bpif_optimize::{OptimizerConfig, PortfolioOptimizer, WeightSource};
//!
//! let funds = vec![
//!     FundSnapshot::new("SBGB", 9.0, 4.0).with_short_name("Sber Gov Bonds"),
//!     FundSnapshot::new("SBMX", 22.0, 18.0).with_short_name("Sber MOEX"),
//!     FundSnapshot::new("TGLD", 18.0, 14.0).with_short_name("Tinkoff Gold"),
//!     FundSnapshot::new("AKMB", 11.0, 6.0).with_short_name("Alfa bonds"),
//! ];
//!
//! let optimizer = PortfolioOptimizer::new(OptimizerConfig::default());
//! let portfolios = optimizer.select(&funds).unwrap();
//! assert_eq!(portfolios.maximum_sharpe.source, WeightSource::Optimized);
//!
//! let total: f64 = portfolios.minimum_variance.weights.values().sum();
//! assert!((total - 1.0).abs() < 1e-4);
//! ```

/// The version of the bpif-optimize crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod config;
mod covariance;
mod diversification;
mod error;
mod frontier;
mod performance;
mod qp;
mod selector;
mod solver;

pub use config::{OptimizerConfig, SolverConfig};
pub use covariance::{
    AssetClass, CorrelationModel, KeywordCorrelation, OptimizationInputs, clip_eigenvalues,
    estimate, estimate_with,
};
pub use diversification::DiversificationMetrics;
pub use error::OptimizationError;
pub use frontier::{EfficientFrontier, PortfolioPoint, build_frontier, linspace};
pub use performance::{MIN_VOLATILITY, equal_weights, evaluate, portfolio_variance, sharpe_ratio};
pub use selector::{
    OptimalPortfolios, PortfolioOptimizer, PortfolioSummary, PortfolioWeights, WeightSource,
    top_return_weights,
};
pub use solver::{maximize_sharpe, minimize_volatility};
