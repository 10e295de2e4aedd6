//! CLI subcommand modules.
//!
//! This module contains the implementations for all bpif CLI subcommands.

pub(crate) mod frontier;
pub(crate) mod metrics;
pub(crate) mod optimize;

use anyhow::Result;
use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a boxed section header.
pub(crate) fn print_header(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║ {title:^60} ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}
