//! Risk metric assumptions.

use serde::{Deserialize, Serialize};

/// Market and benchmark assumptions for [`RiskMetrics`](crate::RiskMetrics).
///
/// Rates and volatilities are annual and in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskMetricsConfig {
    /// Risk-free rate (Bank of Russia key rate assumption)
    pub risk_free_rate: f64,
    /// Expected market return used for CAPM alpha
    pub market_return: f64,
    /// Market volatility used for the synthetic beta
    pub market_volatility: f64,
    /// Benchmark return for the information ratio
    pub benchmark_return: f64,
    /// Benchmark volatility for the tracking error approximation
    pub benchmark_volatility: f64,
    /// Assumed correlation of every fund with the market
    pub market_correlation: f64,
    /// Left-tail probability of the VaR quantile (0.05 is 95% VaR)
    pub var_confidence: f64,
    /// Trading days per year for daily VaR scaling
    pub trading_days_per_year: usize,
}

impl Default for RiskMetricsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 15.0,
            market_return: 12.0,
            market_volatility: 20.0,
            benchmark_return: 12.0,
            benchmark_volatility: 20.0,
            market_correlation: 0.7,
            var_confidence: 0.05,
            trading_days_per_year: 252,
        }
    }
}
