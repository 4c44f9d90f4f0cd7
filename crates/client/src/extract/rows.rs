//! Standings row parsing.
//!
//! Field meaning is positional: after the rank and name cells, the first
//! signed integer of each remaining cell is collected left to right and
//! mapped through [`STAT_FIELDS`]. A layout change on the source page means
//! editing that table, nothing else.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use standings_core::{RawRecord, RecordKind};

/// Rows with fewer cells are not data rows.
pub const MIN_CELLS: usize = 8;

/// Stat fields in the order their integers appear in a row.
pub const STAT_FIELDS: [&str; 8] =
    ["points", "played", "won", "drawn", "lost", "goals_for", "goals_against", "goal_difference"];

/// Name used when no cell yields a team name.
pub const UNKNOWN_TEAM: &str = "Unknown";

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("invalid selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("invalid selector"));
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("invalid selector"));
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("invalid regex"));
// U+2212 is how the source renders negative goal differences.
static SIGNED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\x{2212}]?\d+").expect("invalid regex"));

/// Why a row produced no record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("{0} cells, need at least {min}", min = MIN_CELLS)]
    TooFewCells(usize),

    #[error("no rank digits in first cell")]
    MissingRank,

    #[error("{0} numeric cells, need {n}", n = STAT_FIELDS.len())]
    TooFewNumbers(usize),
}

/// Outcome of parsing every data row of a table.
#[derive(Debug, Default)]
pub struct TableRows {
    pub records: Vec<RawRecord>,
    pub skipped: usize,
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn link_text(cell: &ElementRef<'_>) -> Option<String> {
    cell.select(&LINK)
        .map(|a| cell_text(&a))
        .find(|text| !text.is_empty())
}

fn first_signed_int(text: &str) -> Option<i64> {
    SIGNED
        .find(text)
        .and_then(|m| m.as_str().replace('\u{2212}', "-").parse().ok())
}

/// First digit run of the rank cell.
pub fn parse_rank(cell: &ElementRef<'_>) -> Option<i64> {
    DIGITS.find(&cell_text(cell)).and_then(|m| m.as_str().parse().ok())
}

/// Team name from the second cell, falling back to the third, then to [`UNKNOWN_TEAM`].
///
/// Link text wins over plain text within each cell since icons and footnote
/// markers sit outside the link.
pub fn parse_name(cells: &[ElementRef<'_>]) -> String {
    let candidates = cells.iter().skip(1).take(2).flat_map(|cell| {
        let link = link_text(cell);
        let plain = Some(cell_text(cell)).filter(|t| !t.is_empty());
        [link, plain]
    });

    candidates.flatten().next().unwrap_or_else(|| {
        tracing::warn!("no team name found in row, using placeholder");
        UNKNOWN_TEAM.to_string()
    })
}

/// First signed integer of every cell that has one, left to right.
///
/// Cells without digits contribute nothing, which shifts later positions.
pub fn extract_numbers(cells: &[ElementRef<'_>]) -> Vec<i64> {
    cells.iter().filter_map(|cell| first_signed_int(&cell_text(cell))).collect()
}

/// Map a positional integer list onto the stat fields of a team record.
pub fn stats_record(rank: i64, name: &str, numbers: &[i64]) -> Result<RawRecord, SkipReason> {
    if numbers.len() < STAT_FIELDS.len() {
        return Err(SkipReason::TooFewNumbers(numbers.len()));
    }

    let record = STAT_FIELDS
        .iter()
        .zip(numbers)
        .fold(RawRecord::new(RecordKind::Team).with("rank", rank).with("name", name), |record, (field, value)| {
            record.with(field, *value)
        });

    Ok(record.with("recent_form", ""))
}

/// Parses table rows into raw team records.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowParser;

impl RowParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one data row. The header row must already be excluded.
    pub fn parse_row(&self, row: ElementRef<'_>) -> Result<RawRecord, SkipReason> {
        let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
        if cells.len() < MIN_CELLS {
            return Err(SkipReason::TooFewCells(cells.len()));
        }

        let rank = parse_rank(&cells[0]).ok_or(SkipReason::MissingRank)?;
        let name = parse_name(&cells);
        let numbers = extract_numbers(&cells[2..]);

        let record = stats_record(rank, &name, &numbers)?;

        if let (Some(played), Some(won), Some(drawn), Some(lost)) =
            (numbers.get(1), numbers.get(2), numbers.get(3), numbers.get(4))
            && *played != won + drawn + lost
        {
            tracing::debug!(team = %name, played, won, drawn, lost, "played does not equal won + drawn + lost");
        }

        Ok(record)
    }

    /// Parse every row after the first (header) row, skipping non-data rows.
    pub fn parse_table(&self, table: ElementRef<'_>) -> TableRows {
        let mut rows = TableRows::default();

        for (index, row) in table.select(&ROW).enumerate().skip(1) {
            match self.parse_row(row) {
                Ok(record) => rows.records.push(record),
                Err(reason) => {
                    tracing::debug!(row = index, %reason, "skipping row");
                    rows.skipped += 1;
                }
            }
        }

        rows
    }
}
