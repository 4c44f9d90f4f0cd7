//! Standings records as they flow through a run and into the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Collection holding the current snapshot, one document per team name.
pub const TEAMS_COLLECTION: &str = "teams";

/// Append-only collection with one document per successful run.
pub const SUMMARIES_COLLECTION: &str = "summaries";

/// One row of current standings. `name` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub rank: i64,
    pub name: String,
    pub points: i64,
    pub played: i64,
    pub won: i64,
    pub drawn: i64,
    pub lost: i64,
    pub goals_for: i64,
    pub goals_against: i64,
    pub goal_difference: i64,
    #[serde(default)]
    pub recent_form: String,
    pub captured_at: DateTime<Utc>,
}

/// Per-run summary statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub season: String,
    /// Best effort; 0 when unknown.
    #[serde(default)]
    pub matchday: i64,
    pub team_count: i64,
    /// Not computed yet, always 0.
    #[serde(default)]
    pub match_count: i64,
    pub captured_at: DateTime<Utc>,
}

/// Projection returned by the top scorers query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerRow {
    pub name: String,
    pub goals_for: i64,
    pub rank: i64,
}

/// Document counts per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionCounts {
    pub teams: u64,
    pub summaries: u64,
}

impl CollectionCounts {
    pub fn total(&self) -> u64 {
        self.teams + self.summaries
    }

    /// Nothing has been scraped yet.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Which typed record a raw mapping is destined to become.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Team,
    Summary,
}

impl RecordKind {
    /// Fields coerced to integers during normalization.
    pub fn numeric_fields(&self) -> &'static [&'static str] {
        match self {
            RecordKind::Team => &[
                "rank",
                "points",
                "played",
                "won",
                "drawn",
                "lost",
                "goals_for",
                "goals_against",
                "goal_difference",
            ],
            RecordKind::Summary => &["matchday", "team_count", "match_count"],
        }
    }
}

/// Untyped field-value mapping produced before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub kind: RecordKind,
    pub fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new(kind: RecordKind) -> Self {
        Self { kind, fields: Map::new() }
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// A finalized record, tagged with the collection it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRecord {
    Team(TeamRecord),
    Summary(SummaryRecord),
}

impl StoreRecord {
    pub fn collection(&self) -> &'static str {
        match self {
            StoreRecord::Team(_) => TEAMS_COLLECTION,
            StoreRecord::Summary(_) => SUMMARIES_COLLECTION,
        }
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        match self {
            StoreRecord::Team(t) => t.captured_at,
            StoreRecord::Summary(s) => s.captured_at,
        }
    }
}
