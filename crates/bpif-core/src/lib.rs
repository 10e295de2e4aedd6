#![doc(issue_tracker_base_url = "https://github.com/bpif-research/bpif/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core fund types for the bpif ETF toolkit.
//!
//! This crate provides the inputs shared by the optimizer and the risk
//! metrics: per-fund snapshots, tabular fund reports and the common error
//! type.

/// The version of the bpif-core crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod table;
pub mod types;

pub use error::{BpifError, Result};
pub use table::FundTable;
pub use types::{FundSnapshot, Ticker, load_json, validate_funds};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
