//! Source URL canonicalization.

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a source URL before it is checked against robots.txt and fetched.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Reject anything other than http and https
/// 4. Lowercase the host and drop the fragment; the query string is kept as-is
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str().map(str::to_lowercase) {
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_wikipedia_page() {
        let url = canonicalize("https://fr.wikipedia.org/wiki/Championnat_de_France_de_football_2025-2026").unwrap();
        assert_eq!(url.host_str(), Some("fr.wikipedia.org"));
        assert_eq!(url.path(), "/wiki/Championnat_de_France_de_football_2025-2026");
    }

    #[test]
    fn test_canonicalize_default_scheme() {
        let url = canonicalize("fr.wikipedia.org/wiki/Ligue_1").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_canonicalize_drops_section_anchor() {
        let url = canonicalize("https://FR.Wikipedia.org/wiki/Ligue_1#Classement").unwrap();
        assert_eq!(url.host_str(), Some("fr.wikipedia.org"));
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_canonicalize_keeps_query() {
        let url = canonicalize("  https://example.com/standings?season=2025&b=2  ").unwrap();
        assert_eq!(url.query(), Some("season=2025&b=2"));
    }

    #[test]
    fn test_canonicalize_rejects() {
        assert!(matches!(canonicalize("file:///etc/passwd"), Err(UrlError::UnsupportedScheme(_))));
        assert!(matches!(canonicalize("   "), Err(UrlError::Empty)));
        assert!(matches!(canonicalize("https://"), Err(UrlError::InvalidUrl(_))));
    }
}
