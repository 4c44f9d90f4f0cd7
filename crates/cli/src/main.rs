//! standings entry point.
//!
//! Scrapes the league standings page into the local store, on demand or on a
//! schedule, and reads it back for reporting and health checks. Logs go to
//! stderr; command results are printed to stdout as JSON.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use standings_core::AppConfig;

mod commands;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "standings")]
#[command(about = "League standings scraper")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Scrape the standings page once
    Run,
    /// Scrape on a fixed interval until interrupted
    Schedule {
        /// Hours between runs (overrides configuration)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_hours: Option<u64>,
        /// Run once at startup instead of waiting for the first interval
        #[arg(long)]
        immediate: bool,
    },
    /// Print standings, metrics and top scorers as JSON
    Report {
        /// Maximum number of ranked teams
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Number of top scorers
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Check that the store is reachable and report document counts
    Health,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let mut config = AppConfig::load()?;

    match cli.command {
        Commands::Run => commands::run(&config).await?,
        Commands::Schedule { interval_hours, immediate } => {
            if let Some(hours) = interval_hours {
                config.interval_hours = hours;
            }
            commands::schedule(&config, immediate).await?;
        }
        Commands::Report { limit, top } => commands::report(&config, limit, top).await?,
        Commands::Health => return commands::health(&config).await,
    }

    Ok(ExitCode::SUCCESS)
}
