//! Subcommand bodies.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use standings_client::{FetchClient, FetchConfig, TableLocator, run_with_timeout};
use standings_core::{AppConfig, CollectionCounts, ScorerRow, StandingsReader, StoreDb, TeamRecord};
use tokio::time::MissedTickBehavior;

struct Scraper {
    fetcher: FetchClient,
    locator: TableLocator,
}

impl Scraper {
    fn new(config: &AppConfig) -> Result<Self> {
        let fetcher = FetchClient::new(FetchConfig::from(config)).context("building HTTP client")?;
        let locator = TableLocator::from_config(config).context("building table locator")?;
        Ok(Self { fetcher, locator })
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One bounded scrape run.
pub async fn run(config: &AppConfig) -> Result<()> {
    let scraper = Scraper::new(config)?;
    let report = run_with_timeout(&scraper.fetcher, config, &scraper.locator).await?;
    print_json(&report)
}

/// Run on a fixed interval until Ctrl-C.
///
/// Each run is awaited before the next tick is taken, so runs never overlap.
/// A tick missed while a run was in flight fires once, late.
pub async fn schedule(config: &AppConfig, immediate: bool) -> Result<()> {
    let scraper = Scraper::new(config)?;
    let period = config.interval();

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    if !immediate {
        ticker.tick().await;
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tracing::info!(interval_hours = config.interval_hours, immediate, "scheduler started");

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            _ = &mut shutdown => break,
            result = run_with_timeout(&scraper.fetcher, config, &scraper.locator) => {
                if result.is_err() {
                    tracing::warn!(next_in_secs = period.as_secs(), "run failed, waiting for next tick");
                }
            }
        }
    }

    tracing::info!("scheduler stopped");
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct Metrics {
    pub team_count: u64,
    pub total_goals: i64,
    pub season: String,
    pub matchday: i64,
}

/// Data behind the standings dashboard.
#[derive(Debug, Serialize)]
pub struct Report {
    pub metrics: Metrics,
    pub teams: Vec<TeamRecord>,
    pub top_scorers: Vec<ScorerRow>,
}

pub async fn build_report(reader: &StandingsReader, limit: usize, top: usize) -> Report {
    let summary = reader.latest_summary().await;

    Report {
        metrics: Metrics {
            team_count: reader.total_team_count().await,
            total_goals: reader.total_goals().await,
            season: summary.season,
            matchday: summary.matchday,
        },
        teams: reader.list_teams(limit).await,
        top_scorers: reader.top_scorers(top).await,
    }
}

pub async fn report(config: &AppConfig, limit: usize, top: usize) -> Result<()> {
    let reader = StandingsReader::open(&config.db_path, config.season.clone()).await;
    print_json(&build_report(&reader, limit, top).await)
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub teams: u64,
    pub summaries: u64,
}

impl From<CollectionCounts> for Health {
    fn from(counts: CollectionCounts) -> Self {
        let status = if counts.is_empty() { "not yet scraped" } else { "ok" };
        Self { status, teams: counts.teams, summaries: counts.summaries }
    }
}

pub async fn check_store(config: &AppConfig, timeout: Duration) -> Result<Health> {
    let counts = tokio::time::timeout(timeout, StoreDb::inspect(&config.db_path))
        .await
        .context("store did not answer in time")??;

    Ok(Health::from(counts))
}

/// Report document counts. Only an unreachable store is a failure. A store
/// that has not been created yet reports as not yet scraped.
pub async fn health(config: &AppConfig) -> Result<ExitCode> {
    match check_store(config, config.timeout()).await {
        Ok(health) => {
            print_json(&health)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(kind = "store", path = %config.db_path.display(), error = %e, "store unreachable");
            print_json(&serde_json::json!({ "status": "unreachable", "error": e.to_string() }))?;
            Ok(ExitCode::FAILURE)
        }
    }
}
