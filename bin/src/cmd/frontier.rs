//! Frontier command implementation.

use anyhow::Result;
use bpif_optimize::{EfficientFrontier, PortfolioOptimizer};

use super::{print_header, print_json};
use crate::{InputArgs, OutputFormat, data};

/// Trace and print the efficient frontier.
pub(crate) fn run_frontier(args: &InputArgs, points: Option<usize>) -> Result<()> {
    let (mut config, funds) = data::load(args)?;
    if let Some(points) = points {
        config.frontier_points = points;
    }
    let requested = config.frontier_points;
    let frontier = PortfolioOptimizer::new(config).frontier(&funds)?;

    match args.format {
        OutputFormat::Json => print_json(&frontier),
        OutputFormat::Text => {
            print_header("Efficient Frontier");
            println!("Funds:  {}", funds.len());
            println!("Points: {} of {requested} solved", frontier.len());
            println!();
            print_frontier(&frontier);
            Ok(())
        }
    }
}

fn print_frontier(frontier: &EfficientFrontier) {
    if frontier.is_empty() {
        println!("No target return could be reached under the weight cap.");
        return;
    }

    println!("  {:>10}  {:>10}  {:>8}", "Return", "Volatility", "Sharpe");
    for ((ret, vol), sharpe) in frontier
        .returns
        .iter()
        .zip(&frontier.volatilities)
        .zip(&frontier.sharpe_ratios)
    {
        println!(
            "  {:>9.2}%  {:>9.2}%  {:>8.3}",
            ret * 100.0,
            vol * 100.0,
            sharpe
        );
    }

    if let Some(best) = best_sharpe(frontier) {
        println!();
        println!(
            "Best Sharpe on frontier: {:.3} at {:.2}% return",
            frontier.sharpe_ratios[best],
            frontier.returns[best] * 100.0
        );
    }
    if !frontier.skipped_targets.is_empty() {
        println!(
            "Skipped {} unreachable target(s)",
            frontier.skipped_targets.len()
        );
    }
}

/// Index of the frontier point with the highest Sharpe ratio.
fn best_sharpe(frontier: &EfficientFrontier) -> Option<usize> {
    frontier
        .sharpe_ratios
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
}
