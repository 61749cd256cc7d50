//! LoopXFade CLI
//!
//! Command-line entry point for the loop crossfade tool.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use loopxfade::cli::commands::{failure_context, print_report, process_file};
use loopxfade::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("LoopXFade v{}", env!("CARGO_PKG_VERSION"));

    let job = cli.job();

    // Reported once, by anyhow, on the way out of main
    let report = process_file(&job).map_err(|e| {
        let context = failure_context(&job, &e);
        anyhow::Error::new(e).context(context)
    })?;

    if cli.report {
        print_report(&report).context("failed to print report")?;
    }

    Ok(())
}
