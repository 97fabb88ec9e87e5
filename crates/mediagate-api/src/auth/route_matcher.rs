//! Path classification for the access gate
//!
//! Patterns are either exact paths (`/home`, also matching `/home/`) or
//! prefixes written as `/path(.*)`. The route table is an ordered list of
//! `(pattern, class)` pairs evaluated by `RouteTable::matches`.

use mediagate_core::AccessConfig;

const PREFIX_SUFFIX: &str = "(.*)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Page reachable without a session
    PublicPage,
    /// API route reachable without a session
    PublicApi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    Exact(String),
    Prefix(String),
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix(PREFIX_SUFFIX) {
            Some(prefix) => RoutePattern::Prefix(prefix.to_string()),
            None => RoutePattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            RoutePattern::Exact(exact) => {
                path == exact
                    || path
                        .strip_suffix('/')
                        .is_some_and(|trimmed| trimmed == exact && !trimmed.is_empty())
            }
            RoutePattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<(RoutePattern, RouteClass)>,
}

impl RouteTable {
    pub fn new(entries: Vec<(RoutePattern, RouteClass)>) -> Self {
        Self { entries }
    }

    pub fn from_access_config(access: &AccessConfig) -> Self {
        let pages = access
            .public_routes
            .iter()
            .map(|p| (RoutePattern::parse(p), RouteClass::PublicPage));
        let apis = access
            .public_api_routes
            .iter()
            .map(|p| (RoutePattern::parse(p), RouteClass::PublicApi));

        Self::new(pages.chain(apis).collect())
    }

    pub fn matches(&self, path: &str, class: RouteClass) -> bool {
        self.entries
            .iter()
            .any(|(pattern, entry_class)| *entry_class == class && pattern.matches(path))
    }

    pub fn is_public_page(&self, path: &str) -> bool {
        self.matches(path, RouteClass::PublicPage)
    }

    pub fn is_public_api(&self, path: &str) -> bool {
        self.matches(path, RouteClass::PublicApi)
    }
}

/// Whether the access gate runs for this path at all.
///
/// Static assets (last segment `name.ext`) and `/_next` internals bypass the
/// gate; `/api` and `/trpc` never do.
///
/// Only the last segment is inspected, and it needs a non-empty stem. A dot
/// elsewhere in the path (`/v1.2/page`) or a dotfile (`/.env`) stays gated,
/// which is stricter than an "any dot anywhere" asset rule.
pub fn is_gated(path: &str) -> bool {
    if path.starts_with("/api") || path.starts_with("/trpc") {
        return true;
    }
    if path.starts_with("/_next") {
        return false;
    }
    !has_file_extension(path)
}

fn has_file_extension(path: &str) -> bool {
    let Some(last) = path.rsplit('/').next() else {
        return false;
    };
    match last.rsplit_once('.') {
        Some((stem, ext)) => {
            !ext.is_empty()
                && ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && (!stem.is_empty() || path.len() > last.len() + 1)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_table() -> RouteTable {
        RouteTable::from_access_config(&AccessConfig::default())
    }

    #[test]
    fn test_exact_pattern_tolerates_trailing_slash() {
        let pattern = RoutePattern::parse("/home");
        assert!(pattern.matches("/home"));
        assert!(pattern.matches("/home/"));
        assert!(!pattern.matches("/home/feed"));
        assert!(!pattern.matches("/homepage"));
    }

    #[test]
    fn test_root_pattern_matches_only_root() {
        let pattern = RoutePattern::parse("/");
        assert!(pattern.matches("/"));
        assert!(!pattern.matches("/dashboard"));
        assert!(!pattern.matches("//"));
    }

    #[test]
    fn test_prefix_pattern() {
        let pattern = RoutePattern::parse("/sign-in(.*)");
        assert_eq!(pattern, RoutePattern::Prefix("/sign-in".to_string()));
        assert!(pattern.matches("/sign-in"));
        assert!(pattern.matches("/sign-in/factor-one"));
        assert!(!pattern.matches("/sign-up"));
    }

    #[test]
    fn test_default_classification() {
        let table = default_table();
        assert!(table.is_public_page("/"));
        assert!(table.is_public_page("/sign-in"));
        assert!(table.is_public_page("/sign-up"));
        assert!(table.is_public_page("/home"));
        assert!(!table.is_public_page("/dashboard"));

        assert!(table.is_public_api("/api/videos"));
        assert!(!table.is_public_api("/api/video-upload"));
        assert!(!table.is_public_page("/api/videos"));
    }

    #[test]
    fn test_gate_coverage() {
        assert!(is_gated("/"));
        assert!(is_gated("/dashboard"));
        assert!(is_gated("/api/image-upload"));
        assert!(is_gated("/api/export.csv"));
        assert!(is_gated("/trpc/videos.list"));

        assert!(!is_gated("/openapi.json"));
        assert!(!is_gated("/favicon.ico"));
        assert!(!is_gated("/assets/app.min.js"));
        assert!(!is_gated("/_next/static/chunk"));
    }

    #[test]
    fn test_only_last_segment_counts_as_asset() {
        assert!(is_gated("/.env"));
        assert!(is_gated("/v1.2/page"));
        assert!(is_gated("/releases/2024.06/notes"));
        assert!(!is_gated("/.well-known/security.txt"));
    }
}
