//! # billcode command-line entry point
//!
//! ```bash
//! billcode encode --input azure_sample.csv --category "Virtual Machines"
//! billcode config --output groups.json
//! ```
//!
//! Pass `-v` (or set `RUST_LOG=debug`) for per-column progress.

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // Allow println! in main binary

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let log_dir = billcode::logging::init(&cli.log_settings())?;

    let result = cli::run_command(cli.command);

    if let Err(e) = &result {
        tracing::error!("{e:#}");
        tracing::error!(
            "Details were logged to {}",
            billcode::logging::current_log_path(&log_dir).display()
        );
    }
    result
}
