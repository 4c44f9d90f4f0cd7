//! Scraping side of the standings scraper.
//!
//! This crate provides the polite page fetcher, table location and row
//! parsing, record normalization, and the run pipeline that ties them to the
//! store writer.

pub mod extract;
pub mod fetch;
pub mod pipeline;

pub use extract::{NormalizeError, Normalizer, RowParser, SkipReason, TableLocator, TableRows};

pub use fetch::{FetchClient, FetchConfig, FetchResponse};

pub use pipeline::{Extraction, RunReport, extract_standings, persist, run_once, run_with_timeout};
