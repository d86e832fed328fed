use std::collections::HashSet;

use regex::Regex;

/// Location of the upstream page index.
pub const DEFAULT_MANIFEST_URL: &str = "https://code.claude.com/docs/llms.txt";

/// Shape of a mirrored page URL inside the manifest.
pub const DEFAULT_URL_PATTERN: &str = r"https://code\.claude\.com/docs/en/[\w-]+\.md";

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("invalid URL pattern: {0}")]
    InvalidPattern(String),

    #[error("no markdown URLs found in manifest")]
    NoMatches,
}

/// The deduplicated list of page URLs a manifest names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    urls: Vec<String>,
}

impl Manifest {
    /// Build a manifest from URLs, dropping repeats. First occurrence keeps its position.
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let urls = urls
            .into_iter()
            .map(Into::into)
            .filter(|url: &String| seen.insert(url.clone()))
            .collect();
        Self { urls }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Extracts page URLs from manifest text by pattern match.
#[derive(Debug, Clone)]
pub struct ManifestParser {
    pattern: Regex,
}

impl ManifestParser {
    pub fn new(pattern: &str) -> Result<Self, ManifestError> {
        let pattern =
            Regex::new(pattern).map_err(|e| ManifestError::InvalidPattern(e.to_string()))?;
        Ok(Self { pattern })
    }

    /// Collect every match in `text`. Anything that doesn't match is ignored.
    pub fn parse(&self, text: &str) -> Result<Manifest, ManifestError> {
        let manifest = Manifest::from_urls(self.pattern.find_iter(text).map(|m| m.as_str()));
        if manifest.is_empty() {
            return Err(ManifestError::NoMatches);
        }
        Ok(manifest)
    }
}

/// Local filename for a page URL: everything after the last `/`.
pub fn filename_for(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ManifestParser {
        ManifestParser::new(DEFAULT_URL_PATTERN).unwrap()
    }

    #[test]
    fn extracts_matching_urls() {
        let text = "\
# Docs

- [Overview](https://code.claude.com/docs/en/overview.md): start here
- [Hooks](https://code.claude.com/docs/en/hooks-guide.md)
";
        let manifest = parser().parse(text).unwrap();
        assert_eq!(
            manifest.urls(),
            [
                "https://code.claude.com/docs/en/overview.md",
                "https://code.claude.com/docs/en/hooks-guide.md",
            ]
        );
    }

    #[test]
    fn ignores_other_hosts_and_languages() {
        let text = "\
https://example.com/docs/en/overview.md
https://code.claude.com/docs/de/overview.md
https://code.claude.com/docs/en/setup.md
https://code.claude.com/docs/en/readme.txt
";
        let manifest = parser().parse(text).unwrap();
        assert_eq!(manifest.urls(), ["https://code.claude.com/docs/en/setup.md"]);
    }

    #[test]
    fn deduplicates_repeated_urls() {
        let text = "\
https://code.claude.com/docs/en/a.md
https://code.claude.com/docs/en/b.md
https://code.claude.com/docs/en/a.md
";
        let manifest = parser().parse(text).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.urls()[0], "https://code.claude.com/docs/en/a.md");
    }

    #[test]
    fn zero_matches_is_an_error() {
        let result = parser().parse("<html>maintenance</html>");
        assert!(matches!(result, Err(ManifestError::NoMatches)));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let result = ManifestParser::new("https://(unclosed");
        assert!(matches!(result, Err(ManifestError::InvalidPattern(_))));
    }

    #[test]
    fn filename_is_basename() {
        assert_eq!(
            filename_for("https://code.claude.com/docs/en/sub-agents.md"),
            "sub-agents.md"
        );
        assert_eq!(filename_for("plain.md"), "plain.md");
    }
}
