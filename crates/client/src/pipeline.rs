//! One scrape run: fetch, locate, parse, normalize, persist.
//!
//! Extraction is synchronous and works on an HTML string so it can be tested
//! without a network. Nothing is written unless the page was fetched and the
//! standings table was found.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use scraper::Html;
use serde::Serialize;
use standings_core::{AppConfig, Error, RawRecord, RecordKind, StoreRecord, StoreWriter, TeamRecord};

use crate::extract::{Normalizer, RowParser, TableLocator};
use crate::fetch::FetchClient;

/// Everything extracted from one page.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Team records followed by the run summary.
    pub records: Vec<StoreRecord>,
    pub teams: usize,
    pub rows_skipped: usize,
    pub rejected: usize,
    pub matchday: i64,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub teams_written: usize,
    pub rows_skipped: usize,
    pub records_rejected: usize,
    pub matchday: i64,
    pub captured_at: DateTime<Utc>,
}

/// Extract team records and a run summary from a standings page.
pub fn extract_standings(
    html: &str, locator: &TableLocator, season: &str, captured_at: DateTime<Utc>,
) -> Result<Extraction, Error> {
    let document = Html::parse_document(html);

    let table = locator.require(&document).inspect_err(|e| {
        tracing::error!(
            kind = e.kind().as_str(),
            marker = locator.points_marker(),
            known_teams = ?locator.known_teams(),
            "standings table not found"
        );
    })?;

    let rows = RowParser::new().parse_table(table);
    let normalizer = Normalizer::new(captured_at);

    let mut extraction = Extraction { rows_skipped: rows.skipped, ..Default::default() };
    let mut first_team: Option<&TeamRecord> = None;

    for raw in rows.records {
        match normalizer.normalize(raw) {
            Ok(record) => extraction.records.push(record),
            Err(e) => {
                tracing::warn!(error = %e, "dropping record");
                extraction.rejected += 1;
            }
        }
    }

    for record in &extraction.records {
        if let StoreRecord::Team(team) = record {
            extraction.teams += 1;
            first_team.get_or_insert(team);
        }
    }
    extraction.matchday = first_team.map_or(0, |team| team.played);

    let summary = RawRecord::new(RecordKind::Summary)
        .with("season", season)
        .with("matchday", extraction.matchday)
        .with("team_count", extraction.teams as i64)
        .with("match_count", 0);

    match normalizer.normalize(summary) {
        Ok(record) => extraction.records.push(record),
        Err(e) => {
            tracing::warn!(error = %e, "dropping summary");
            extraction.rejected += 1;
        }
    }

    tracing::info!(
        teams = extraction.teams,
        skipped = extraction.rows_skipped,
        rejected = extraction.rejected,
        matchday = extraction.matchday,
        "extracted standings"
    );

    Ok(extraction)
}

/// Write records in order, stopping at the first failure.
pub async fn persist(writer: &StoreWriter, records: &[StoreRecord]) -> Result<usize, Error> {
    for record in records {
        writer.write(record).await?;
    }
    Ok(records.len())
}

/// Fetch the configured page and store what it holds.
pub async fn run_once(fetcher: &FetchClient, config: &AppConfig, locator: &TableLocator) -> Result<RunReport, Error> {
    let captured_at = Utc::now();
    tracing::info!(url = %config.source_url, "run started");

    let html = fetcher.fetch_html(&config.source_url).await?;
    let extraction = extract_standings(&html, locator, &config.season, captured_at)?;

    let writer = StoreWriter::new(&config.db_path);
    persist(&writer, &extraction.records).await?;

    Ok(RunReport {
        teams_written: extraction.teams,
        rows_skipped: extraction.rows_skipped,
        records_rejected: extraction.rejected,
        matchday: extraction.matchday,
        captured_at,
    })
}

/// Cancel `run` once `limit` has elapsed.
pub async fn bounded<T>(limit: Duration, run: impl Future<Output = Result<T, Error>>) -> Result<T, Error> {
    tokio::time::timeout(limit, run)
        .await
        .unwrap_or_else(|_| Err(Error::RunTimeout(limit.as_secs())))
}

/// [`run_once`] under the configured hard time limit. Failures are logged.
pub async fn run_with_timeout(
    fetcher: &FetchClient, config: &AppConfig, locator: &TableLocator,
) -> Result<RunReport, Error> {
    let result = bounded(config.run_timeout(), run_once(fetcher, config, locator)).await;

    match &result {
        Ok(report) => tracing::info!(
            teams = report.teams_written,
            skipped = report.rows_skipped,
            rejected = report.records_rejected,
            matchday = report.matchday,
            "run finished"
        ),
        Err(e) => tracing::error!(kind = e.kind().as_str(), error = %e, "run failed"),
    }

    result
}
