//! Link selection by `href`.
//!
//! The default mode is a literal substring test, the same predicate as the
//! CSS selector `a[href*="delete_swap"]`. Stricter modes exist for routing
//! schemes where a bare substring would also catch `delete_swap_all` or
//! `undelete_swap`.

use serde::{Deserialize, Serialize};

/// Marker that identifies the "cancel swap request" endpoint.
pub const DEFAULT_MARKER: &str = "delete_swap";

/// How the marker is compared against an `href`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// `href` contains the marker anywhere.
    #[default]
    Substring,
    /// `href` starts with the marker.
    Prefix,
    /// `href` equals the marker.
    Exact,
    /// The marker is one whole `/`-separated segment of the path.
    /// Query string and fragment are ignored.
    PathSegment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HrefMatcher {
    marker: String,
    mode: MatchMode,
}

impl Default for HrefMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER, MatchMode::Substring)
    }
}

impl HrefMatcher {
    pub fn new(marker: impl Into<String>, mode: MatchMode) -> Self {
        Self {
            marker: marker.into(),
            mode,
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn matches(&self, href: &str) -> bool {
        match self.mode {
            MatchMode::Substring => href.contains(self.marker.as_str()),
            MatchMode::Prefix => href.starts_with(self.marker.as_str()),
            MatchMode::Exact => href == self.marker,
            MatchMode::PathSegment => path_of(href)
                .split('/')
                .any(|segment| segment == self.marker),
        }
    }

    /// Attribute selector handed to `querySelectorAll`.
    ///
    /// `PathSegment` has no CSS equivalent, so it falls back to the substring
    /// selector and the host refines the result with [`HrefMatcher::matches`].
    pub fn css_selector(&self) -> String {
        let operator = match self.mode {
            MatchMode::Substring | MatchMode::PathSegment => "*=",
            MatchMode::Prefix => "^=",
            MatchMode::Exact => "=",
        };
        format!("a[href{operator}\"{}\"]", escape_css_string(&self.marker))
    }
}

fn path_of(href: &str) -> &str {
    let end = href.find(['?', '#']).unwrap_or(href.len());
    &href[..end]
}

fn escape_css_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        if matches!(character, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_matches_delete_links_only() {
        let matcher = HrefMatcher::default();
        assert!(matcher.matches("/app/delete_swap/42"));
        assert!(matcher.matches("/swap/5/delete_swap"));
        assert!(!matcher.matches("/app/other_action/42"));
        assert!(!matcher.matches(""));
    }

    #[test]
    fn substring_has_no_boundaries() {
        // Same as the attribute selector: neighbours of the marker don't matter.
        let matcher = HrefMatcher::default();
        assert!(matcher.matches("/swap/delete_swapXYZ"));
        assert!(matcher.matches("/swap/undelete_swap"));
    }

    #[test]
    fn substring_is_case_sensitive() {
        assert!(!HrefMatcher::default().matches("/swap/5/DELETE_SWAP"));
    }

    #[test]
    fn path_segment_requires_whole_segment() {
        let matcher = HrefMatcher::new("delete_swap", MatchMode::PathSegment);
        assert!(matcher.matches("/app/delete_swap/42"));
        assert!(matcher.matches("/swap/5/delete_swap?next=/my_swaps"));
        assert!(matcher.matches("delete_swap#top"));
        assert!(!matcher.matches("/swap/delete_swapXYZ"));
        assert!(!matcher.matches("/swap/5/view?action=delete_swap"));
    }

    #[test]
    fn prefix_and_exact() {
        let prefix = HrefMatcher::new("/swap/delete", MatchMode::Prefix);
        assert!(prefix.matches("/swap/delete/7"));
        assert!(!prefix.matches("/app/swap/delete/7"));

        let exact = HrefMatcher::new("/swap/5/delete_swap", MatchMode::Exact);
        assert!(exact.matches("/swap/5/delete_swap"));
        assert!(!exact.matches("/swap/5/delete_swap/"));
    }

    #[test]
    fn css_selector_per_mode() {
        assert_eq!(
            HrefMatcher::default().css_selector(),
            r#"a[href*="delete_swap"]"#
        );
        assert_eq!(
            HrefMatcher::new("/x", MatchMode::Prefix).css_selector(),
            r#"a[href^="/x"]"#
        );
        assert_eq!(
            HrefMatcher::new("/x", MatchMode::Exact).css_selector(),
            r#"a[href="/x"]"#
        );
        assert_eq!(
            HrefMatcher::new("delete_swap", MatchMode::PathSegment).css_selector(),
            r#"a[href*="delete_swap"]"#
        );
    }

    #[test]
    fn css_selector_escapes_quotes() {
        let matcher = HrefMatcher::new(r#"a"b\c"#, MatchMode::Substring);
        assert_eq!(matcher.css_selector(), r#"a[href*="a\"b\\c"]"#);
    }
}
