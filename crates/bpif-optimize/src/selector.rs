//! Named optimal portfolios for presentation.

use std::fmt;
use std::ops::Index;

use bpif_core::{FundSnapshot, Result, Ticker};
use ndarray::Array1;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::config::OptimizerConfig;
use crate::covariance::{CorrelationModel, KeywordCorrelation, OptimizationInputs, estimate_with};
use crate::diversification::DiversificationMetrics;
use crate::error::OptimizationError;
use crate::frontier::{EfficientFrontier, build_frontier};
use crate::performance::{equal_weights, evaluate, sharpe_ratio};
use crate::solver::{maximize_sharpe, minimize_volatility};

/// How a summary's weights were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSource {
    /// A solver optimum.
    Optimized,
    /// The solver failed and equal weights were substituted.
    EqualWeightFallback,
    /// A rule-based allocation that involves no solver.
    FixedAllocation,
}

/// Weight per ticker, kept in fund order.
///
/// Serializes as a JSON object whose keys follow the input fund list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioWeights(Vec<(Ticker, f64)>);

impl PortfolioWeights {
    /// Weight of `ticker`, if the portfolio lists it.
    pub fn get(&self, ticker: &str) -> Option<f64> {
        self.0.iter().find(|(t, _)| t == ticker).map(|(_, w)| *w)
    }

    /// `(ticker, weight)` pairs in fund order.
    pub fn iter(&self) -> impl Iterator<Item = (&Ticker, &f64)> {
        self.0.iter().map(|(t, w)| (t, w))
    }

    /// Weights in fund order.
    pub fn values(&self) -> impl Iterator<Item = &f64> {
        self.0.iter().map(|(_, w)| w)
    }

    /// Number of funds.
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no fund is listed.
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Ticker, f64)> for PortfolioWeights {
    fn from_iter<I: IntoIterator<Item = (Ticker, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Index<&str> for PortfolioWeights {
    type Output = f64;

    fn index(&self, ticker: &str) -> &f64 {
        match self.0.iter().find(|(t, _)| t == ticker) {
            Some((_, w)) => w,
            None => panic!("no weight for ticker {ticker}"),
        }
    }
}

impl Serialize for PortfolioWeights {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// One named portfolio ready for reporting.
///
/// `expected_return` and `volatility` are in percent; the Sharpe ratio is
/// unit-free.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    /// Weight per ticker in fund order
    pub weights: PortfolioWeights,
    /// Expected annual return in percent
    #[serde(rename = "return")]
    pub expected_return: f64,
    /// Annual volatility in percent
    pub volatility: f64,
    /// Sharpe ratio against the configured risk-free rate
    pub sharpe_ratio: f64,
    /// Human-readable label
    pub description: String,
    /// Whether the weights are an optimum, a fallback or a fixed rule
    pub source: WeightSource,
    /// Concentration statistics of the weights
    pub diversification: DiversificationMetrics,
}

impl PortfolioSummary {
    /// Whether the solver failed and equal weights were substituted.
    pub fn is_fallback(&self) -> bool {
        self.source == WeightSource::EqualWeightFallback
    }
}

/// The four portfolios produced by [`PortfolioOptimizer::select`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimalPortfolios {
    /// Lowest volatility at the mean fund return
    pub minimum_variance: PortfolioSummary,
    /// Highest Sharpe ratio
    pub maximum_sharpe: PortfolioSummary,
    /// Uniform weights
    pub equal_weighted: PortfolioSummary,
    /// Best-returning funds in equal shares
    pub high_return: PortfolioSummary,
}

impl OptimalPortfolios {
    /// Portfolios paired with their keys, in report order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &PortfolioSummary)> {
        [
            ("minimum_variance", &self.minimum_variance),
            ("maximum_sharpe", &self.maximum_sharpe),
            ("equal_weighted", &self.equal_weighted),
            ("high_return", &self.high_return),
        ]
        .into_iter()
    }
}

/// Builds optimal portfolios and efficient frontiers from fund snapshots.
///
/// # Examples
///
/// ```
/// use bpif_core::FundSnapshot;
/// use bpif_optimize::{OptimizerConfig, PortfolioOptimizer};
///
/// let funds = vec![
///     FundSnapshot::new("SBGB", 10.0, 5.0),
///     FundSnapshot::new("SBMX", 20.0, 15.0),
///     FundSnapshot::new("LQDT", 5.0, 2.0),
/// ];
/// let optimizer = PortfolioOptimizer::new(OptimizerConfig::default());
/// let portfolios = optimizer.select(&funds).unwrap();
/// assert!((portfolios.equal_weighted.expected_return - 35.0 / 3.0).abs() < 1e-9);
/// ```
pub struct PortfolioOptimizer {
    config: OptimizerConfig,
    model: Box<dyn CorrelationModel>,
}

impl PortfolioOptimizer {
    /// Create an optimizer using the keyword correlation heuristic.
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            config,
            model: Box::new(KeywordCorrelation::default()),
        }
    }

    /// Replace the correlation model.
    pub fn with_correlation_model(mut self, model: Box<dyn CorrelationModel>) -> Self {
        self.model = model;
        self
    }

    /// Active configuration.
    pub const fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Estimate returns and covariance for `funds`.
    pub fn inputs(&self, funds: &[FundSnapshot]) -> Result<OptimizationInputs> {
        estimate_with(funds, self.model.as_ref())
    }

    /// Compute the minimum-variance, maximum-Sharpe, equal-weight and
    /// high-return portfolios.
    ///
    /// Solver failures do not fail the call: the affected portfolio falls
    /// back to equal weights, is tagged [`WeightSource::EqualWeightFallback`]
    /// and a warning is logged.
    ///
    /// # Errors
    ///
    /// Fails only when the fund list itself is invalid.
    pub fn select(&self, funds: &[FundSnapshot]) -> Result<OptimalPortfolios> {
        let inputs = self.inputs(funds)?;
        let n = inputs.len();
        let rf = self.config.risk_free_decimal();
        let solver = &self.config.solver;

        let mean_return = inputs.returns.mean().unwrap_or(0.0);
        let min_variance = minimize_volatility(
            &inputs.returns,
            &inputs.covariance,
            mean_return,
            self.config.min_variance_max_weight,
            solver,
        );
        let max_sharpe = maximize_sharpe(
            &inputs.returns,
            &inputs.covariance,
            rf,
            self.config.max_sharpe_max_weight,
            solver,
        );

        let summarize = |weights: Array1<f64>, source, description: &str| {
            self.summarize(&inputs, &weights, source, description)
        };

        let (weights, source) = or_equal_weights(min_variance, n, "minimum_variance");
        let minimum_variance = summarize(weights, source, "Minimum-risk portfolio");

        let (weights, source) = or_equal_weights(max_sharpe, n, "maximum_sharpe");
        let maximum_sharpe = summarize(weights, source, "Maximum Sharpe ratio portfolio");

        let equal_weighted = summarize(
            equal_weights(n),
            WeightSource::FixedAllocation,
            "Equal-weight portfolio",
        );

        let top_n = self.config.high_return_top_n.clamp(1, n);
        let high_return = summarize(
            top_return_weights(&inputs.returns, top_n),
            WeightSource::FixedAllocation,
            &format!("High-return portfolio (top {top_n} funds)"),
        );

        Ok(OptimalPortfolios {
            minimum_variance,
            maximum_sharpe,
            equal_weighted,
            high_return,
        })
    }

    /// Trace the efficient frontier over `funds` with the configured number
    /// of points and the minimum-variance weight cap.
    pub fn frontier(&self, funds: &[FundSnapshot]) -> Result<EfficientFrontier> {
        let inputs = self.inputs(funds)?;
        Ok(build_frontier(
            &inputs.returns,
            &inputs.covariance,
            self.config.frontier_points,
            self.config.min_variance_max_weight,
            self.config.risk_free_decimal(),
            &self.config.solver,
        ))
    }

    fn summarize(
        &self,
        inputs: &OptimizationInputs,
        weights: &Array1<f64>,
        source: WeightSource,
        description: &str,
    ) -> PortfolioSummary {
        let (ret, vol) = evaluate(weights, &inputs.returns, &inputs.covariance);
        let diversification = DiversificationMetrics::compute(weights, &inputs.volatilities(), vol);

        PortfolioSummary {
            weights: inputs
                .tickers
                .iter()
                .cloned()
                .zip(weights.iter().copied())
                .collect(),
            expected_return: ret * 100.0,
            volatility: vol * 100.0,
            sharpe_ratio: sharpe_ratio(ret, vol, self.config.risk_free_decimal()),
            description: description.to_string(),
            source,
            diversification,
        }
    }
}

impl Default for PortfolioOptimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

impl fmt::Debug for PortfolioOptimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortfolioOptimizer")
            .field("config", &self.config)
            .field("model", &self.model.name())
            .finish()
    }
}

fn or_equal_weights(
    solved: std::result::Result<Array1<f64>, OptimizationError>,
    n: usize,
    portfolio: &str,
) -> (Array1<f64>, WeightSource) {
    match solved {
        Ok(weights) => (weights, WeightSource::Optimized),
        Err(err) => {
            tracing::warn!(portfolio, error = %err, "optimization failed, using equal weights");
            (equal_weights(n), WeightSource::EqualWeightFallback)
        }
    }
}

/// Equal weights over the `top_n` highest returns, zero elsewhere.
///
/// Ties keep input order. With fewer than `top_n` funds every fund is held,
/// and a `top_n` of zero holds the single best fund, so the weights always
/// sum to one.
pub fn top_return_weights(returns: &Array1<f64>, top_n: usize) -> Array1<f64> {
    let mut order: Vec<usize> = (0..returns.len()).collect();
    order.sort_by(|&a, &b| returns[b].total_cmp(&returns[a]));

    let k = top_n.max(1).min(returns.len());
    let mut weights = Array1::zeros(returns.len());
    for &i in order.iter().take(k) {
        weights[i] = 1.0 / k as f64;
    }
    weights
}
