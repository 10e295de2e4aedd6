//! Optimize command implementation.

use anyhow::Result;
use bpif_optimize::{OptimalPortfolios, PortfolioOptimizer, PortfolioSummary, WeightSource};

use super::{print_header, print_json};
use crate::{InputArgs, OutputFormat, data};

/// Weights below this are left out of the text report.
const MIN_REPORTED_WEIGHT: f64 = 1e-4;

/// Compute and print the four named portfolios.
pub(crate) fn run_optimize(args: &InputArgs) -> Result<()> {
    let (config, funds) = data::load(args)?;
    let risk_free_rate = config.risk_free_rate;
    let portfolios = PortfolioOptimizer::new(config).select(&funds)?;

    match args.format {
        OutputFormat::Json => print_json(&portfolios),
        OutputFormat::Text => {
            print_header("Optimal Portfolios");
            println!("Funds:          {}", funds.len());
            println!("Risk-free rate: {risk_free_rate:.2}%");
            println!();
            print_portfolios(&portfolios);
            Ok(())
        }
    }
}

fn print_portfolios(portfolios: &OptimalPortfolios) {
    for (name, summary) in portfolios.iter() {
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("{name}: {}", summary.description);
        if summary.source == WeightSource::EqualWeightFallback {
            println!("  (solver failed, equal weights substituted)");
        }
        println!("  Return:           {:>8.2}%", summary.expected_return);
        println!("  Volatility:       {:>8.2}%", summary.volatility);
        println!("  Sharpe Ratio:     {:>8.3}", summary.sharpe_ratio);
        println!(
            "  Effective Funds:  {:>8.2}",
            summary.diversification.effective_number_of_assets
        );
        println!(
            "  Diversification:  {:>8.2}",
            summary.diversification.diversification_ratio
        );
        println!("  Weights:");
        for (ticker, weight) in reported_weights(summary) {
            println!("    {ticker:<10} {:>7.2}%", weight * 100.0);
        }
        println!();
    }
}

/// Non-negligible weights, largest first.
fn reported_weights(summary: &PortfolioSummary) -> Vec<(&str, f64)> {
    let mut weights: Vec<(&str, f64)> = summary
        .weights
        .iter()
        .filter(|(_, w)| **w >= MIN_REPORTED_WEIGHT)
        .map(|(t, w)| (t.as_str(), *w))
        .collect();
    weights.sort_by(|a, b| b.1.total_cmp(&a.1));
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpif_core::FundSnapshot;

    #[test]
    fn test_reported_weights_sorted_and_filtered() {
        let funds = vec![
            FundSnapshot::new("A", 10.0, 5.0),
            FundSnapshot::new("B", 20.0, 15.0),
            FundSnapshot::new("C", 5.0, 2.0),
            FundSnapshot::new("D", 25.0, 22.0),
            FundSnapshot::new("E", 7.0, 3.0),
            FundSnapshot::new("F", 3.0, 1.0),
        ];
        let portfolios = PortfolioOptimizer::default().select(&funds).unwrap();
        let weights = reported_weights(&portfolios.high_return);

        assert_eq!(weights.len(), 5);
        assert!(weights.iter().all(|(t, _)| *t != "F"));
        assert!(weights.windows(2).all(|pair| pair[0].1 >= pair[1].1));
    }
}
