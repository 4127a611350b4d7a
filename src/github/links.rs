//! Parsing of the RFC 8288 `Link` header GitHub uses for pagination cursors.

use reqwest::header::{HeaderMap, LINK};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Matches one `<url>; rel="name"` entry of a `Link` header
static LINK_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r#"<([^>]*)>\s*;\s*rel\s*=\s*(?:"([^"]*)"|([^\s;,"]+))"#).expect("invalid regex"));

/// Relation name to target URL, as advertised by a single response.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkRelations {
    links: HashMap<String, String>,
}

impl LinkRelations {
    #[must_use]
    pub fn parse(header: &str) -> Self {
        let mut links = HashMap::new();

        for caps in LINK_REGEX.captures_iter(header) {
            let Some(url) = caps.get(1) else {
                continue;
            };

            let rels = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());

            // a single entry may carry several space-separated relation types
            for rel in rels.split_whitespace() {
                let _ = links.insert(rel.to_ascii_lowercase(), url.as_str().to_string());
            }
        }

        Self { links }
    }

    /// Extract the relations from a response's headers; absent or unreadable headers yield no relations.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(Self::parse)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, relation: &str) -> Option<&str> {
        self.links.get(relation).map(String::as_str)
    }

    #[must_use]
    pub fn next(&self) -> Option<&str> {
        self.get("next")
    }

    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.get("last")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// The page to fetch after `current`, if any.
    ///
    /// Traversal continues only while a `last` cursor is advertised that differs from the page just
    /// fetched, and a `next` cursor exists to follow.
    #[must_use]
    pub fn follow_from(&self, current: &str) -> Option<String> {
        let last = self.last()?;
        if last == current {
            return None;
        }

        self.next().map(ToString::to_string)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    const GITHUB_LINK: &str = r#"<https://api.github.com/user/repos?page=2>; rel="next", <https://api.github.com/user/repos?page=5>; rel="last""#;

    #[test]
    fn test_parse_github_link_header() {
        let links = LinkRelations::parse(GITHUB_LINK);
        assert_eq!(links.next(), Some("https://api.github.com/user/repos?page=2"));
        assert_eq!(links.last(), Some("https://api.github.com/user/repos?page=5"));
        assert!(links.get("prev").is_none());
    }

    #[test]
    fn test_parse_all_relations() {
        let header = r#"<https://x/?page=1>; rel="first", <https://x/?page=2>; rel="prev", <https://x/?page=4>; rel="next", <https://x/?page=9>; rel="last""#;
        let links = LinkRelations::parse(header);
        assert_eq!(links.get("first"), Some("https://x/?page=1"));
        assert_eq!(links.get("prev"), Some("https://x/?page=2"));
        assert_eq!(links.next(), Some("https://x/?page=4"));
        assert_eq!(links.last(), Some("https://x/?page=9"));
    }

    #[test]
    fn test_parse_unquoted_and_multi_relation() {
        let links = LinkRelations::parse("<https://x/?page=3>; rel=next, <https://x/?page=3>; rel=\"last alternate\"");
        assert_eq!(links.next(), Some("https://x/?page=3"));
        assert_eq!(links.last(), Some("https://x/?page=3"));
        assert_eq!(links.get("alternate"), Some("https://x/?page=3"));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(LinkRelations::parse("").is_empty());
        assert!(LinkRelations::parse("not a link header").is_empty());
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(LinkRelations::from_headers(&headers).is_empty());

        let _ = headers.insert(LINK, HeaderValue::from_static(GITHUB_LINK));
        let links = LinkRelations::from_headers(&headers);
        assert_eq!(links.next(), Some("https://api.github.com/user/repos?page=2"));
    }

    #[test]
    fn test_follow_from() {
        let links = LinkRelations::parse(GITHUB_LINK);
        assert_eq!(
            links.follow_from("https://api.github.com/user/repos?page=1").as_deref(),
            Some("https://api.github.com/user/repos?page=2")
        );

        // already on the last page
        assert!(links.follow_from("https://api.github.com/user/repos?page=5").is_none());
    }

    #[test]
    fn test_follow_from_requires_last() {
        let links = LinkRelations::parse(r#"<https://x/?page=2>; rel="next""#);
        assert!(links.follow_from("https://x/?page=1").is_none());

        let links = LinkRelations::parse(r#"<https://x/?page=1>; rel="prev", <https://x/?page=1>; rel="first""#);
        assert!(links.follow_from("https://x/?page=2").is_none());
    }
}
