//! Concentration and diversification measures of a weight vector.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::performance::MIN_VOLATILITY;

/// Diversification statistics of a portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiversificationMetrics {
    /// Weighted average fund volatility over portfolio volatility
    pub diversification_ratio: f64,
    /// `1 / sum w^2`
    pub effective_number_of_assets: f64,
    /// `sum w^2`
    pub herfindahl_index: f64,
    /// Largest single weight
    pub concentration_score: f64,
}

impl DiversificationMetrics {
    /// Compute the metrics for `weights` given per-fund and portfolio volatility.
    ///
    /// Volatilities may be in any unit as long as both use the same one. The
    /// ratio is `1.0` for a riskless portfolio.
    pub fn compute(
        weights: &Array1<f64>,
        volatilities: &Array1<f64>,
        portfolio_volatility: f64,
    ) -> Self {
        let weighted_vol = weights.dot(volatilities);
        let diversification_ratio = if portfolio_volatility < MIN_VOLATILITY {
            1.0
        } else {
            weighted_vol / portfolio_volatility
        };

        let herfindahl_index = weights.mapv(|w| w * w).sum();
        let effective_number_of_assets = if herfindahl_index > 0.0 {
            1.0 / herfindahl_index
        } else {
            0.0
        };
        let concentration_score = weights.iter().copied().fold(0.0, f64::max);

        Self {
            diversification_ratio,
            effective_number_of_assets,
            herfindahl_index,
            concentration_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_equal_weights() {
        let w = array![0.25, 0.25, 0.25, 0.25];
        let vols = array![0.1, 0.1, 0.1, 0.1];
        let m = DiversificationMetrics::compute(&w, &vols, 0.05);
        assert_relative_eq!(m.herfindahl_index, 0.25);
        assert_relative_eq!(m.effective_number_of_assets, 4.0);
        assert_relative_eq!(m.concentration_score, 0.25);
        assert_relative_eq!(m.diversification_ratio, 2.0);
    }

    #[test]
    fn test_single_holding() {
        let w = array![1.0, 0.0, 0.0];
        let vols = array![0.2, 0.1, 0.3];
        let m = DiversificationMetrics::compute(&w, &vols, 0.2);
        assert_relative_eq!(m.effective_number_of_assets, 1.0);
        assert_relative_eq!(m.concentration_score, 1.0);
        assert_relative_eq!(m.diversification_ratio, 1.0);
    }

    #[test]
    fn test_riskless_portfolio() {
        let w = array![0.5, 0.5];
        let m = DiversificationMetrics::compute(&w, &array![0.0, 0.0], 0.0);
        assert_eq!(m.diversification_ratio, 1.0);
    }
}
