#![doc(issue_tracker_base_url = "https://github.com/bpif-research/bpif/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Per-fund risk metrics for bpif.
//!
//! Fund reports carry only an annual return and volatility per fund, so the
//! metrics here are closed-form approximations over those two numbers:
//!
//! - **Sharpe ratio**: excess return over the risk-free rate per unit of volatility
//! - **Information ratio**: excess return over a benchmark per unit of tracking error
//! - **Beta / alpha**: synthetic beta from an assumed market correlation, CAPM alpha
//! - **VaR**: one-day parametric value at risk from a normal quantile
//!
//! # Example
//!
//! ```
//! use bpif_core::FundSnapshot;
//! use bpif_metrics::{RiskMetricsConfig, rank_funds};
//!
//! let funds = vec![
//!     FundSnapshot::new("SBMX", 22.0, 18.0),
//!     FundSnapshot::new("LQDT", 15.5, 0.8),
//! ];
//! let ranked = rank_funds(&funds, &RiskMetricsConfig::default()).unwrap();
//! assert_eq!(ranked[0].ticker, "LQDT");
//! ```

/// The version of the bpif-metrics crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod config;
mod risk;

pub use config::RiskMetricsConfig;
pub use risk::{
    FundMetrics, RiskMetrics, alpha, beta, information_ratio, rank_funds, sharpe_ratio,
    value_at_risk,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_config_defaults() {
        let config = RiskMetricsConfig::default();
        assert_eq!(config.risk_free_rate, 15.0);
        assert_eq!(config.market_return, 12.0);
        assert_eq!(config.market_volatility, 20.0);
        assert_eq!(config.var_confidence, 0.05);
        assert_eq!(config.trading_days_per_year, 252);
    }
}
