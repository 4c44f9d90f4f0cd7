//! Core types and shared functionality for the standings scraper.
//!
//! This crate provides:
//! - Team and summary records, raw and finalized
//! - Document store with SQLite backend (writer + never-failing reader)
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod model;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::{Error, ErrorKind};
pub use model::{
    CollectionCounts, RawRecord, RecordKind, ScorerRow, StoreRecord, SummaryRecord, TeamRecord,
};
pub use store::{StandingsReader, StoreDb, StoreWriter};
