//! Tabular fund reports.
//!
//! The collectors publish fund statistics as tables with one row per fund.
//! [`FundTable`] wraps such a Polars DataFrame and converts it into
//! [`FundSnapshot`]s for the optimizer.
//!
//! # Expected Schema
//!
//! - `ticker` (required): fund ticker
//! - `annual_return` (required): annual return in percent
//! - `volatility` (required): annualized volatility in percent
//! - `short_name`, `category` (optional): free-text tags
//! - `sharpe_ratio` (optional): used by reports to pick the best funds

use std::path::Path;

use polars::prelude::*;

use crate::types::FundSnapshot;
use crate::{BpifError, Result};

/// Columns a fund table must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["ticker", "annual_return", "volatility"];

/// Container for a fund report.
#[derive(Debug, Clone)]
pub struct FundTable {
    data: DataFrame,
}

impl FundTable {
    /// Wrap a DataFrame, checking that the required columns exist.
    ///
    /// # Errors
    ///
    /// Returns [`BpifError::MissingColumn`] naming the first absent column.
    pub fn new(data: DataFrame) -> Result<Self> {
        let table = Self { data };
        for column in REQUIRED_COLUMNS {
            if !table.has_column(column) {
                return Err(BpifError::MissingColumn(column.to_string()));
            }
        }
        Ok(table)
    }

    /// Read a fund report from a CSV file with a header row.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()?;
        Self::new(df)
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Number of funds in the table.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.height() == 0
    }

    /// Checks if a column exists in the table.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    /// Keep the `n` rows with the largest values in `column`.
    ///
    /// Nulls sort last. Reports use this to optimise only the top funds,
    /// e.g. the best 15 by Sharpe ratio.
    pub fn top_by(&self, column: &str, n: usize) -> Result<Self> {
        if !self.has_column(column) {
            return Err(BpifError::MissingColumn(column.to_string()));
        }
        let sorted = self.data.sort(
            [column],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_nulls_last(true)
                .with_maintain_order(true),
        )?;
        Ok(Self {
            data: sorted.head(Some(n)),
        })
    }

    /// Convert every row into a [`FundSnapshot`].
    ///
    /// Null statistics become `0.0`; a null ticker is an error.
    pub fn to_snapshots(&self) -> Result<Vec<FundSnapshot>> {
        let tickers = self.data.column("ticker")?.as_materialized_series().str()?;
        let returns = self.float_column("annual_return")?;
        let volatilities = self.float_column("volatility")?;
        let short_names = self.optional_text_column("short_name")?;
        let categories = self.optional_text_column("category")?;

        let mut funds = Vec::with_capacity(self.len());
        for (row, ticker) in tickers.into_iter().enumerate() {
            let ticker = ticker
                .ok_or_else(|| BpifError::InvalidData(format!("row {row}: ticker is null")))?;
            funds.push(FundSnapshot {
                ticker: ticker.to_string(),
                annual_return: returns[row].unwrap_or(0.0),
                volatility: volatilities[row].unwrap_or(0.0),
                short_name: short_names.as_ref().and_then(|c| c[row].clone()),
                category: categories.as_ref().and_then(|c| c[row].clone()),
            });
        }

        Ok(funds)
    }

    fn float_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self
            .data
            .column(name)
            .map_err(|_| BpifError::MissingColumn(name.to_string()))?
            .cast(&DataType::Float64)?;
        Ok(column.as_materialized_series().f64()?.into_iter().collect())
    }

    fn optional_text_column(&self, name: &str) -> Result<Option<Vec<Option<String>>>> {
        if !self.has_column(name) {
            return Ok(None);
        }
        let column = self.data.column(name)?.cast(&DataType::String)?;
        let values = column
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(Some(values))
    }
}

impl TryFrom<DataFrame> for FundTable {
    type Error = BpifError;

    fn try_from(data: DataFrame) -> Result<Self> {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for FundTable {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> DataFrame {
        df! {
            "ticker" => &["SBMX", "SBGB", "TGLD"],
            "annual_return" => &[18.0, 8.5, 11.0],
            "volatility" => &[22.0, 4.5, 14.0],
            "short_name" => &["Sber Moex", "Sber Gov Bonds", "Tinkoff Gold"],
            "sharpe_ratio" => &[0.14, -1.44, -0.29],
        }
        .unwrap()
    }

    #[test]
    fn test_missing_required_column() {
        let df = df! { "ticker" => &["SBMX"], "volatility" => &[22.0] }.unwrap();
        let err = FundTable::new(df).unwrap_err();
        assert!(matches!(err, BpifError::MissingColumn(c) if c == "annual_return"));
    }

    #[test]
    fn test_to_snapshots() {
        let table = FundTable::new(sample()).unwrap();
        let funds = table.to_snapshots().unwrap();

        assert_eq!(funds.len(), 3);
        assert_eq!(funds[1].ticker, "SBGB");
        assert_relative_eq!(funds[1].annual_return, 8.5);
        assert_relative_eq!(funds[1].volatility, 4.5);
        assert_eq!(funds[1].short_name.as_deref(), Some("Sber Gov Bonds"));
        assert!(funds[1].category.is_none());
    }

    #[test]
    fn test_integer_statistics_are_cast() {
        let df = df! {
            "ticker" => &["A", "B"],
            "annual_return" => &[10i64, 20],
            "volatility" => &[5i64, 15],
        }
        .unwrap();
        let funds = FundTable::new(df).unwrap().to_snapshots().unwrap();
        assert_relative_eq!(funds[1].annual_return, 20.0);
        assert_relative_eq!(funds[0].volatility, 5.0);
    }

    #[test]
    fn test_top_by_sharpe() {
        let table = FundTable::new(sample()).unwrap();
        let top = table.top_by("sharpe_ratio", 2).unwrap();
        let tickers: Vec<String> = top
            .to_snapshots()
            .unwrap()
            .into_iter()
            .map(|f| f.ticker)
            .collect();
        assert_eq!(tickers, vec!["SBMX", "TGLD"]);
    }

    #[test]
    fn test_top_by_unknown_column() {
        let table = FundTable::new(sample()).unwrap();
        assert!(table.top_by("alpha", 2).is_err());
    }
}
