//! Fund input types.
//!
//! A [`FundSnapshot`] is the per-fund record handed to the optimizer by the
//! upstream collectors: a ticker, an annual return and a volatility (both in
//! percent), plus free-text tags that only bias the correlation guess.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{BpifError, Result};

/// A fund ticker, e.g. `"SBMX"` or `"TMOS"`.
pub type Ticker = String;

/// One fund's inputs to portfolio construction.
///
/// Missing `annual_return` and `volatility` fields deserialize to zero, which
/// is how the upstream fund reports treat absent statistics.
///
/// # Example
///
/// ```
/// use bpif_core::FundSnapshot;
///
/// let fund = FundSnapshot::new("SBGB", 8.5, 4.2).with_short_name("Sber Gov Bonds");
/// assert_eq!(fund.ticker, "SBGB");
/// assert!(fund.tags().contains("bonds"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundSnapshot {
    /// Exchange ticker, unique within one optimization call.
    pub ticker: Ticker,
    /// Annual return in percent (12.5 means 12.5% per year).
    #[serde(default)]
    pub annual_return: f64,
    /// Annualized volatility in percent.
    #[serde(default)]
    pub volatility: f64,
    /// Short exchange name of the fund.
    #[serde(default)]
    pub short_name: Option<String>,
    /// Asset category label assigned by the collectors.
    #[serde(default)]
    pub category: Option<String>,
}

impl FundSnapshot {
    /// Create a snapshot without name or category tags.
    pub fn new(ticker: impl Into<Ticker>, annual_return: f64, volatility: f64) -> Self {
        Self {
            ticker: ticker.into(),
            annual_return,
            volatility,
            short_name: None,
            category: None,
        }
    }

    /// Attach a short name.
    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    /// Attach a category label.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Lowercased text searched by keyword-based heuristics.
    ///
    /// Short name and category are joined with a space; absent tags
    /// contribute nothing, so an untagged fund yields an empty string.
    pub fn tags(&self) -> String {
        [self.short_name.as_deref(), self.category.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

/// Check a fund list before it reaches the numeric code.
///
/// # Errors
///
/// Returns an error if the list is empty, a ticker repeats, a return is not
/// finite, or a volatility is negative or not finite.
pub fn validate_funds(funds: &[FundSnapshot]) -> Result<()> {
    if funds.is_empty() {
        return Err(BpifError::InsufficientData(
            "at least one fund is required".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(funds.len());
    for fund in funds {
        if !seen.insert(fund.ticker.as_str()) {
            return Err(BpifError::DuplicateTicker(fund.ticker.clone()));
        }
        if !fund.annual_return.is_finite() {
            return Err(BpifError::InvalidData(format!(
                "{}: annual_return is not finite",
                fund.ticker
            )));
        }
        if !fund.volatility.is_finite() || fund.volatility < 0.0 {
            return Err(BpifError::InvalidData(format!(
                "{}: volatility must be a non-negative number, got {}",
                fund.ticker, fund.volatility
            )));
        }
    }

    Ok(())
}

/// Read a JSON array of fund snapshots from disk.
pub fn load_json(path: impl AsRef<Path>) -> Result<Vec<FundSnapshot>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
