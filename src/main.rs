//! modmerge: combine mod packages into a single merged package
//!
//! Scans a directory of independently-authored mod packages, resolves
//! declared conflicts between them, and merges their configuration
//! fragments and archives into one output package.

use anyhow::Result;

mod cli;
mod config;
mod domain;
mod merge;
mod resolve;
mod scan;

fn main() -> Result<()> {
    cli::run()
}
