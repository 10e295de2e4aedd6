//! Per-fund risk metrics.
//!
//! Every metric is derived from the fund's annual return and volatility
//! alone; no price history is involved. Beta assumes a fixed correlation
//! with the market and the tracking error ignores the fund-benchmark
//! correlation, so both are coarse approximations.

use bpif_core::{BpifError, FundSnapshot, Result, Ticker};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::config::RiskMetricsConfig;

/// Risk statistics of a single fund.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// `(return - rf) / volatility`, zero for a riskless fund
    pub sharpe_ratio: f64,
    /// Excess return over the benchmark per unit of tracking error
    pub information_ratio: f64,
    /// `market_correlation * volatility / market_volatility`
    pub beta: f64,
    /// CAPM alpha in percent
    pub alpha: f64,
    /// One-day parametric VaR in percent (negative is a loss)
    pub value_at_risk: f64,
    /// Return per unit of volatility, volatility floored at 1%
    pub risk_adjusted_return: f64,
}

impl RiskMetrics {
    /// Calculate all metrics from an annual return and volatility in percent.
    ///
    /// # Errors
    ///
    /// Returns [`BpifError::InvalidData`] when either input is non-finite
    /// or the volatility is negative.
    ///
    /// # Example
    ///
    /// ```
    /// use bpif_metrics::{RiskMetrics, RiskMetricsConfig};
    ///
    /// let m = RiskMetrics::calculate(20.0, 25.0, &RiskMetricsConfig::default()).unwrap();
    /// assert!((m.beta - 0.875).abs() < 1e-12);
    /// assert!((m.sharpe_ratio - 0.2).abs() < 1e-12);
    /// ```
    pub fn calculate(
        annual_return: f64,
        volatility: f64,
        config: &RiskMetricsConfig,
    ) -> Result<Self> {
        if !annual_return.is_finite() || !volatility.is_finite() || volatility < 0.0 {
            return Err(BpifError::InvalidData(format!(
                "return {annual_return} and volatility {volatility} must be finite, volatility >= 0"
            )));
        }

        let beta = beta(volatility, config);
        Ok(Self {
            sharpe_ratio: sharpe_ratio(annual_return, volatility, config.risk_free_rate),
            information_ratio: information_ratio(annual_return, volatility, config),
            beta,
            alpha: alpha(annual_return, beta, config),
            value_at_risk: value_at_risk(annual_return, volatility, config)?,
            risk_adjusted_return: annual_return / volatility.max(1.0) * 100.0,
        })
    }

    /// Metrics for one fund snapshot.
    pub fn for_fund(fund: &FundSnapshot, config: &RiskMetricsConfig) -> Result<Self> {
        Self::calculate(fund.annual_return, fund.volatility, config)
    }
}

/// A fund's ticker with its metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundMetrics {
    /// Fund ticker
    pub ticker: Ticker,
    /// Annual return in percent
    pub annual_return: f64,
    /// Annual volatility in percent
    pub volatility: f64,
    /// Derived metrics
    #[serde(flatten)]
    pub metrics: RiskMetrics,
}

/// Metrics for every fund, sorted by descending Sharpe ratio.
///
/// Funds with equal Sharpe ratios keep their input order.
pub fn rank_funds(funds: &[FundSnapshot], config: &RiskMetricsConfig) -> Result<Vec<FundMetrics>> {
    let mut ranked = funds
        .iter()
        .map(|fund| {
            Ok(FundMetrics {
                ticker: fund.ticker.clone(),
                annual_return: fund.annual_return,
                volatility: fund.volatility,
                metrics: RiskMetrics::for_fund(fund, config)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    ranked.sort_by(|a, b| b.metrics.sharpe_ratio.total_cmp(&a.metrics.sharpe_ratio));
    tracing::debug!(funds = ranked.len(), "ranked funds by Sharpe ratio");
    Ok(ranked)
}

/// Sharpe ratio from percent inputs; zero when `volatility` is zero.
pub fn sharpe_ratio(annual_return: f64, volatility: f64, risk_free_rate: f64) -> f64 {
    if volatility == 0.0 {
        return 0.0;
    }
    (annual_return - risk_free_rate) / volatility
}

/// Information ratio against the configured benchmark.
///
/// Tracking error is approximated by `sqrt(max(vol^2 - bench_vol^2, 0))`;
/// the ratio is zero when that vanishes.
pub fn information_ratio(annual_return: f64, volatility: f64, config: &RiskMetricsConfig) -> f64 {
    let excess = (annual_return - config.benchmark_return) / 100.0;
    let vol = volatility / 100.0;
    let bench_vol = config.benchmark_volatility / 100.0;
    let tracking_error = (vol * vol - bench_vol * bench_vol).max(0.0).sqrt();

    if tracking_error == 0.0 {
        return 0.0;
    }
    excess / tracking_error
}

/// Beta from volatility and an assumed market correlation.
pub fn beta(volatility: f64, config: &RiskMetricsConfig) -> f64 {
    if config.market_volatility == 0.0 {
        return 0.0;
    }
    config.market_correlation * volatility / config.market_volatility
}

/// CAPM alpha in percent.
pub fn alpha(annual_return: f64, beta: f64, config: &RiskMetricsConfig) -> f64 {
    let rf = config.risk_free_rate;
    annual_return - (rf + beta * (config.market_return - rf))
}

/// One-day parametric VaR in percent at `config.var_confidence`.
///
/// Annual figures are scaled to daily with `trading_days_per_year`. A
/// riskless fund's VaR is its daily return.
pub fn value_at_risk(
    annual_return: f64,
    volatility: f64,
    config: &RiskMetricsConfig,
) -> Result<f64> {
    let days = config.trading_days_per_year as f64;
    let daily_return = annual_return / 100.0 / days;
    let daily_vol = volatility / 100.0 / days.sqrt();

    if daily_vol == 0.0 {
        return Ok(daily_return * 100.0);
    }

    let normal = Normal::new(daily_return, daily_vol)
        .map_err(|e| BpifError::InvalidData(format!("VaR distribution: {e}")))?;
    Ok(normal.inverse_cdf(config.var_confidence) * 100.0)
}
