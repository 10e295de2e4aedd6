//! Portfolio performance from weights.

use ndarray::{Array1, Array2};

/// Volatilities below this are treated as zero.
pub const MIN_VOLATILITY: f64 = 1e-12;

/// Expected return and volatility of a weight vector.
///
/// Returns `(w . r, sqrt(max(w' C w, 0)))`. The clamp keeps the square root
/// defined when the heuristic covariance is not positive semi-definite.
///
/// # Panics
///
/// Panics if the shapes of `weights`, `returns` and `covariance` disagree.
///
/// # Examples
///
/// ```
/// use bpif_optimize::evaluate;
/// use ndarray::{array, Array2};
///
/// let cov = Array2::from_diag(&array![0.01, 0.04]);
/// let (ret, vol) = evaluate(&array![0.5, 0.5], &array![0.1, 0.2], &cov);
/// assert!((ret - 0.15).abs() < 1e-12);
/// assert!((vol - 0.0125f64.sqrt()).abs() < 1e-12);
/// ```
pub fn evaluate(
    weights: &Array1<f64>,
    returns: &Array1<f64>,
    covariance: &Array2<f64>,
) -> (f64, f64) {
    let expected_return = weights.dot(returns);
    let volatility = portfolio_variance(weights, covariance).max(0.0).sqrt();
    (expected_return, volatility)
}

/// `w' C w`, unclamped.
pub fn portfolio_variance(weights: &Array1<f64>, covariance: &Array2<f64>) -> f64 {
    weights.dot(&covariance.dot(weights))
}

/// Sharpe ratio `(ret - rf) / vol`; `0.0` for a riskless portfolio.
pub fn sharpe_ratio(expected_return: f64, volatility: f64, risk_free_rate: f64) -> f64 {
    if volatility < MIN_VOLATILITY {
        return 0.0;
    }
    (expected_return - risk_free_rate) / volatility
}

/// Uniform weights `1/n`.
pub fn equal_weights(n: usize) -> Array1<f64> {
    if n == 0 {
        return Array1::zeros(0);
    }
    Array1::from_elem(n, 1.0 / n as f64)
}
