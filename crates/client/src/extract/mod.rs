//! Standings extraction from a parsed page.
//!
//! ### Table Locator
//! - Candidate selectors are tried in priority order (most specific first),
//!   tables within one selector in document order.
//! - A table qualifies when its text contains the points-column marker and
//!   at least one team from the known-teams allowlist.
//! - No qualifying table is a hard miss; nothing falls back to a guess.
//!
//! ### Rows and Normalization
//! - [`rows`] turns table rows into raw field mappings, skipping non-data rows.
//! - [`normalize`] trims, coerces and stamps raw mappings into typed records.

pub mod normalize;
pub mod rows;

pub use normalize::{NormalizeError, Normalizer};
pub use rows::{RowParser, SkipReason, TableRows};

use scraper::{ElementRef, Html, Selector};
use standings_core::{AppConfig, Error};

/// Finds the one table on a page that holds the current standings.
#[derive(Debug, Clone)]
pub struct TableLocator {
    selectors: Vec<Selector>,
    points_marker: String,
    known_teams: Vec<String>,
}

impl TableLocator {
    /// Build a locator from raw CSS selectors.
    pub fn new(
        selectors: &[String], points_marker: impl Into<String>, known_teams: Vec<String>,
    ) -> Result<Self, Error> {
        let selectors = selectors
            .iter()
            .map(|s| Selector::parse(s).map_err(|e| Error::InvalidInput(format!("bad table selector {s:?}: {e}"))))
            .collect::<Result<Vec<_>, _>>()?;

        let known_teams = known_teams
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Self { selectors, points_marker: points_marker.into(), known_teams })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(&config.table_selectors, config.points_marker.clone(), config.known_teams.clone())
    }

    pub fn points_marker(&self) -> &str {
        &self.points_marker
    }

    pub fn known_teams(&self) -> &[String] {
        &self.known_teams
    }

    fn is_standings(&self, table: &ElementRef<'_>) -> bool {
        let text = table.text().collect::<Vec<_>>().join(" ");
        text.contains(&self.points_marker) && self.known_teams.iter().any(|team| text.contains(team.as_str()))
    }

    /// The first qualifying table, or `None`.
    pub fn locate<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        self.selectors
            .iter()
            .flat_map(|selector| document.select(selector))
            .find(|table| self.is_standings(table))
    }

    /// Like [`locate`](Self::locate) but a miss becomes [`Error::TableNotFound`].
    pub fn require<'a>(&self, document: &'a Html) -> Result<ElementRef<'a>, Error> {
        self.locate(document).ok_or_else(|| Error::TableNotFound {
            marker: self.points_marker.clone(),
            known_teams: self.known_teams.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> TableLocator {
        TableLocator::from_config(&AppConfig::default()).unwrap()
    }

    fn table_id(table: ElementRef<'_>) -> Option<&str> {
        table.value().attr("id")
    }

    #[test]
    fn test_not_found_among_unrelated_tables() {
        let html = Html::parse_document(
            r#"<html><body>
                <table class="wikitable" id="nav"><tr><td>Accueil</td><td>Portail</td></tr></table>
                <table class="wikitable" id="stadiums"><tr><th>Club</th><th>Stade</th></tr>
                    <tr><td>Lens</td><td>Bollaert-Delelis</td></tr></table>
                <table id="history"><tr><th>Saison</th><th>Pts</th></tr>
                    <tr><td>1998-1999</td><td>70</td></tr></table>
            </body></html>"#,
        );

        assert!(locator().locate(&html).is_none());
        assert!(matches!(locator().require(&html), Err(Error::TableNotFound { .. })));
    }

    #[test]
    fn test_picks_the_only_qualifying_table() {
        let html = Html::parse_document(
            r#"<html><body>
                <table class="wikitable" id="scorers"><tr><th>Joueur</th><th>Buts</th></tr>
                    <tr><td>Dembélé</td><td>Paris Saint-Germain</td></tr></table>
                <table class="wikitable" id="standings"><tr><th>Rang</th><th>Équipe</th><th>Pts</th></tr>
                    <tr><td>1</td><td>Lens</td><td>31</td></tr></table>
                <table class="wikitable" id="points-rules"><tr><th>Pts</th><th>Résultat</th></tr></table>
            </body></html>"#,
        );

        let table = locator().locate(&html).unwrap();
        assert_eq!(table_id(table), Some("standings"));
    }

    #[test]
    fn test_class_selector_wins_over_document_order() {
        let html = Html::parse_document(
            r#"<html><body>
                <table id="plain"><tr><th>Pts</th></tr><tr><td>Monaco</td></tr></table>
                <table class="wikitable" id="classed"><tr><th>Pts</th></tr><tr><td>Monaco</td></tr></table>
            </body></html>"#,
        );

        assert_eq!(table_id(locator().locate(&html).unwrap()), Some("classed"));
    }

    #[test]
    fn test_falls_back_to_any_table() {
        let html = Html::parse_document(
            r#"<html><body>
                <table class="wikitable"><tr><td>Navigation</td></tr></table>
                <table id="plain"><tr><th>Pts</th></tr><tr><td>Paris Saint-Germain</td></tr></table>
            </body></html>"#,
        );

        assert_eq!(table_id(locator().locate(&html).unwrap()), Some("plain"));
    }

    #[test]
    fn test_first_qualifying_in_document_order() {
        let html = Html::parse_document(
            r#"<html><body>
                <table class="wikitable" id="first"><tr><th>Pts</th></tr><tr><td>Lens</td></tr></table>
                <table class="wikitable" id="second"><tr><th>Pts</th></tr><tr><td>Lens</td></tr></table>
            </body></html>"#,
        );

        assert_eq!(table_id(locator().locate(&html).unwrap()), Some("first"));
    }

    #[test]
    fn test_allowlist_is_configurable() {
        let html = Html::parse_document(
            r#"<table class="wikitable" id="t"><tr><th>Pts</th></tr><tr><td>Stade Brestois</td></tr></table>"#,
        );

        assert!(locator().locate(&html).is_none());

        let custom =
            TableLocator::new(&["table".to_string()], "Pts", vec!["Stade Brestois".into(), "  ".into()]).unwrap();
        assert_eq!(custom.known_teams(), ["Stade Brestois"]);
        assert_eq!(table_id(custom.locate(&html).unwrap()), Some("t"));
    }

    #[test]
    fn test_invalid_selector() {
        let result = TableLocator::new(&["table[".to_string()], "Pts", vec!["Lens".into()]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
