//! Metrics command implementation.

use anyhow::Result;
use bpif_metrics::{FundMetrics, RiskMetricsConfig, rank_funds};

use super::{print_header, print_json};
use crate::{InputArgs, OutputFormat, data};

/// Print per-fund risk metrics ranked by Sharpe ratio.
pub(crate) fn run_metrics(args: &InputArgs) -> Result<()> {
    let (config, funds) = data::load(args)?;
    let metrics_config = RiskMetricsConfig {
        risk_free_rate: config.risk_free_rate,
        ..Default::default()
    };
    let ranked = rank_funds(&funds, &metrics_config)?;

    match args.format {
        OutputFormat::Json => print_json(&ranked),
        OutputFormat::Text => {
            print_header("Fund Risk Metrics");
            print_table(&ranked);
            Ok(())
        }
    }
}

fn print_table(ranked: &[FundMetrics]) {
    println!(
        "  {:<8} {:>8} {:>8} {:>7} {:>7} {:>6} {:>7} {:>7}",
        "Ticker", "Return", "Vol", "Sharpe", "IR", "Beta", "Alpha", "VaR95"
    );
    for fund in ranked {
        let m = &fund.metrics;
        println!(
            "  {:<8} {:>7.2}% {:>7.2}% {:>7.3} {:>7.3} {:>6.3} {:>6.2}% {:>6.2}%",
            fund.ticker,
            fund.annual_return,
            fund.volatility,
            m.sharpe_ratio,
            m.information_ratio,
            m.beta,
            m.alpha,
            m.value_at_risk
        );
    }
}
