//! Error types for the bpif toolkit.
//!
//! This module defines the error type shared by the bpif crates, covering
//! fund input validation, tabular loading and serialization failures.

use thiserror::Error;

/// The main error type for bpif operations.
#[derive(Debug, Error)]
pub enum BpifError {
    /// Error due to invalid or malformed fund data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when there are too few funds for the requested operation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error when the same ticker appears more than once in a fund list.
    #[error("Duplicate ticker: {0}")]
    DuplicateTicker(String),

    /// Error when a required column is missing from a fund table.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Error from JSON (de)serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error reading fund files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by a portfolio optimizer.
    #[error("Optimization failed: {0}")]
    Optimization(String),
}

/// A specialized Result type for bpif operations.
pub type Result<T> = std::result::Result<T, BpifError>;
