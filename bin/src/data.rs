//! Fund report and configuration loading for the bpif CLI.

use std::path::Path;

use anyhow::{Context, Result, bail};
use bpif_core::{FundSnapshot, FundTable, load_json};
use bpif_metrics::sharpe_ratio;
use bpif_optimize::OptimizerConfig;

use crate::InputArgs;

/// Column the reports rank funds by when present.
const SHARPE_COLUMN: &str = "sharpe_ratio";

/// Load funds from a `.csv` or `.json` report, keeping the best `top` by Sharpe ratio.
///
/// CSV reports that carry a `sharpe_ratio` column are ranked by it; otherwise
/// the ratio is computed from return and volatility against `risk_free_rate`.
pub(crate) fn load_funds(
    path: &Path,
    top: Option<usize>,
    risk_free_rate: f64,
) -> Result<Vec<FundSnapshot>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let funds = match extension.as_deref() {
        Some("csv") => {
            let table = FundTable::read_csv(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            match top {
                Some(n) if table.has_column(SHARPE_COLUMN) => {
                    let funds = table.top_by(SHARPE_COLUMN, n)?.to_snapshots()?;
                    tracing::info!(
                        funds = funds.len(),
                        "selected funds by reported Sharpe ratio"
                    );
                    return Ok(funds);
                }
                _ => table.to_snapshots()?,
            }
        }
        Some("json") => {
            load_json(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        _ => bail!(
            "unsupported fund report {}: expected .csv or .json",
            path.display()
        ),
    };

    Ok(match top {
        Some(n) => top_by_sharpe(funds, n, risk_free_rate),
        None => funds,
    })
}

/// The `n` funds with the highest Sharpe ratio; ties keep report order.
pub(crate) fn top_by_sharpe(
    mut funds: Vec<FundSnapshot>,
    n: usize,
    risk_free_rate: f64,
) -> Vec<FundSnapshot> {
    let sharpe = |f: &FundSnapshot| sharpe_ratio(f.annual_return, f.volatility, risk_free_rate);
    funds.sort_by(|a, b| sharpe(b).total_cmp(&sharpe(a)));
    funds.truncate(n);
    funds
}

/// Optimizer configuration from `--config` with flag overrides applied.
pub(crate) fn load_config(args: &InputArgs) -> Result<OptimizerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => OptimizerConfig::default(),
    };

    if let Some(rate) = args.risk_free_rate {
        config.risk_free_rate = rate;
    }
    Ok(config)
}

/// Load the configuration and the funds an [`InputArgs`] points at.
pub(crate) fn load(args: &InputArgs) -> Result<(OptimizerConfig, Vec<FundSnapshot>)> {
    let config = load_config(args)?;
    let funds = load_funds(&args.input, args.top, config.risk_free_rate)?;
    if funds.is_empty() {
        bail!("no funds in {}", args.input.display());
    }
    tracing::debug!(
        funds = funds.len(),
        risk_free_rate = config.risk_free_rate,
        "inputs loaded"
    );
    Ok((config, funds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputFormat;
    use approx::assert_abs_diff_eq;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("bpif-cli-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn args(input: PathBuf) -> InputArgs {
        InputArgs {
            input,
            top: None,
            config: None,
            risk_free_rate: None,
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn test_top_by_sharpe() {
        let funds = vec![
            FundSnapshot::new("SBGB", 9.0, 4.0),
            FundSnapshot::new("LQDT", 15.5, 0.8),
            FundSnapshot::new("SBMX", 22.0, 18.0),
        ];
        let top = top_by_sharpe(funds, 2, 15.0);
        let tickers: Vec<&str> = top.iter().map(|f| f.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["LQDT", "SBMX"]);
    }

    #[test]
    fn test_load_json_report() {
        let path = temp_file(
            "funds.json",
            r#"[{"ticker": "SBGB", "annual_return": 9.0, "volatility": 4.0},
                {"ticker": "TMOS", "annual_return": 24.0, "volatility": 20.0}]"#,
        );
        let funds = load_funds(&path, Some(1), 15.0).unwrap();
        assert_eq!(funds.len(), 1);
        assert_eq!(funds[0].ticker, "TMOS");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_csv_ranks_by_reported_sharpe() {
        let path = temp_file(
            "funds.csv",
            "ticker,annual_return,volatility,sharpe_ratio\nSBGB,9.0,4.0,2.5\nTMOS,24.0,20.0,0.45\n",
        );
        let funds = load_funds(&path, Some(1), 15.0).unwrap();
        assert_eq!(funds[0].ticker, "SBGB");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(load_funds(Path::new("funds.xlsx"), None, 15.0).is_err());
    }

    #[test]
    fn test_config_override() {
        let config_path = temp_file(
            "config.json",
            r#"{"risk_free_rate": 21.0, "frontier_points": 30}"#,
        );
        let mut input = args(PathBuf::from("funds.json"));
        input.config = Some(config_path.clone());

        let config = load_config(&input).unwrap();
        assert_abs_diff_eq!(config.risk_free_rate, 21.0);
        assert_eq!(config.frontier_points, 30);

        input.risk_free_rate = Some(16.0);
        assert_abs_diff_eq!(load_config(&input).unwrap().risk_free_rate, 16.0);
        std::fs::remove_file(config_path).ok();
    }
}
