//! Link icon resolution.
//!
//! Author and app pages render their links with an icon-font class when one
//! is known. The table maps either a semantic link name (`home`) or a host
//! (`github.com`, `*.itch.io`) to a class string.
//!
//! ## Precedence
//!
//! First match wins:
//!
//! 1. Exact link name: `home: https://example.com` → the `home` icon
//! 2. Exact host of the URL: `https://github.com/foo` → the `github.com` icon
//! 3. Wildcard host in table order: `https://mygame.itch.io/` → `*.itch.io`
//! 4. No icon
//!
//! Link names match case-sensitively, so `Home` and `home` are distinct
//! entries. Hosts are compared ignoring ASCII case; if two keys differ only
//! in case, the first in table order wins the host step.
//!
//! Table keys containing `*`, `?` or `[` are wildcard entries and only take
//! part in step 3.

use glob::{MatchOptions, Pattern, PatternError};
use std::collections::BTreeMap;

/// Icon table used when `config.toml` has no `[icons]` overrides.
pub fn default_table() -> BTreeMap<String, String> {
    [
        ("github.com", "fa-brands fa-github"),
        ("gitlab.com", "fa-brands fa-gitlab"),
        ("home", "fa-solid fa-home"),
        ("homepage", "fa-solid fa-home"),
        ("*.itch.io", "fa-brands fa-itch-io"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn is_wildcard(key: &str) -> bool {
    key.contains(['*', '?', '['])
}

const HOST_MATCH: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Resolves link names and URLs to icon classes from an explicit table.
#[derive(Debug, Clone)]
pub struct IconResolver {
    exact: BTreeMap<String, String>,
    wildcards: Vec<(Pattern, String)>,
}

impl IconResolver {
    /// Split the table into exact and wildcard entries, compiling the latter.
    pub fn new(table: &BTreeMap<String, String>) -> Result<Self, PatternError> {
        let mut exact = BTreeMap::new();
        let mut wildcards = Vec::new();
        for (key, icon) in table {
            if is_wildcard(key) {
                wildcards.push((Pattern::new(key)?, icon.clone()));
            } else {
                exact.insert(key.clone(), icon.clone());
            }
        }
        Ok(Self { exact, wildcards })
    }

    pub fn resolve(&self, name: &str, url: &str) -> Option<&str> {
        if let Some(icon) = self.exact.get(name) {
            return Some(icon.as_str());
        }
        let host = url_host(url)?;
        if let Some((_, icon)) = self
            .exact
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(&host))
        {
            return Some(icon.as_str());
        }
        self.wildcards
            .iter()
            .find(|(pattern, _)| pattern.matches_with(&host, HOST_MATCH))
            .map(|(_, icon)| icon.as_str())
    }
}

/// Lowercased host of a URL: scheme, userinfo, port, path and query removed.
///
/// ```text
/// https://github.com/foo        → github.com
/// https://user@Host.io:8080/x   → host.io
/// example.com/page              → example.com
/// ```
fn url_host(url: &str) -> Option<String> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    let host = host_port
        .split_once(':')
        .map_or(host_port, |(host, _)| host);
    (!host.is_empty()).then(|| host.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn resolver() -> IconResolver {
        IconResolver::new(&table(&[
            ("home", "fa-home"),
            ("github.com", "fa-github"),
            ("*.itch.io", "fa-itch"),
        ]))
        .unwrap()
    }

    #[test]
    fn name_match_wins() {
        assert_eq!(resolver().resolve("home", "https://x"), Some("fa-home"));
    }

    #[test]
    fn name_beats_host() {
        assert_eq!(
            resolver().resolve("home", "https://github.com/me"),
            Some("fa-home")
        );
    }

    #[test]
    fn exact_host_match() {
        assert_eq!(
            resolver().resolve("x", "https://github.com/foo"),
            Some("fa-github")
        );
    }

    #[test]
    fn wildcard_host_match() {
        assert_eq!(
            resolver().resolve("x", "https://mygame.itch.io/abc"),
            Some("fa-itch")
        );
    }

    #[test]
    fn no_match_is_none() {
        assert_eq!(resolver().resolve("x", "https://example.com"), None);
    }

    #[test]
    fn exact_host_beats_wildcard() {
        let r = IconResolver::new(&table(&[
            ("*.example.com", "fa-wild"),
            ("docs.example.com", "fa-book"),
        ]))
        .unwrap();
        assert_eq!(
            r.resolve("docs", "https://docs.example.com/"),
            Some("fa-book")
        );
        assert_eq!(
            r.resolve("blog", "https://blog.example.com/"),
            Some("fa-wild")
        );
    }

    #[test]
    fn wildcard_does_not_match_bare_domain() {
        assert_eq!(resolver().resolve("x", "https://itch.io/games"), None);
    }

    #[test]
    fn host_is_case_insensitive() {
        assert_eq!(
            resolver().resolve("x", "https://GitHub.com/foo"),
            Some("fa-github")
        );
        assert_eq!(
            resolver().resolve("x", "https://MyGame.Itch.IO/"),
            Some("fa-itch")
        );
    }

    #[test]
    fn name_match_is_case_sensitive() {
        let r = IconResolver::new(&table(&[("Home", "fa-house"), ("home", "fa-home")])).unwrap();
        assert_eq!(r.resolve("Home", "https://x"), Some("fa-house"));
        assert_eq!(r.resolve("home", "https://x"), Some("fa-home"));
        assert_eq!(r.resolve("HOME", "https://x"), None);
    }

    #[test]
    fn mixed_case_host_key_matches() {
        let r = IconResolver::new(&table(&[("GitHub.com", "fa-github")])).unwrap();
        assert_eq!(r.resolve("x", "https://github.com/foo"), Some("fa-github"));
    }

    #[test]
    fn wildcard_key_not_used_as_name() {
        assert_eq!(resolver().resolve("*.itch.io", "https://example.com"), None);
    }

    #[test]
    fn url_host_strips_parts() {
        assert_eq!(url_host("https://github.com/foo").as_deref(), Some("github.com"));
        assert_eq!(
            url_host("https://user@Host.io:8080/x?y").as_deref(),
            Some("host.io")
        );
        assert_eq!(url_host("example.com/page").as_deref(), Some("example.com"));
        assert_eq!(url_host("https://x").as_deref(), Some("x"));
        assert_eq!(url_host("https:///path"), None);
    }

    #[test]
    fn invalid_wildcard_rejected() {
        assert!(IconResolver::new(&table(&[("[.example.com", "fa-x")])).is_err());
    }

    #[test]
    fn default_table_resolves_known_hosts() {
        let r = IconResolver::new(&default_table()).unwrap();
        assert_eq!(
            r.resolve("source", "https://gitlab.com/me/app"),
            Some("fa-brands fa-gitlab")
        );
        assert_eq!(
            r.resolve("homepage", "https://me.dev"),
            Some("fa-solid fa-home")
        );
        assert_eq!(
            r.resolve("play", "https://me.itch.io/app"),
            Some("fa-brands fa-itch-io")
        );
    }

    #[test]
    fn resolvers_do_not_share_tables() {
        let a = IconResolver::new(&table(&[("github.com", "fa-a")])).unwrap();
        let b = IconResolver::new(&table(&[("github.com", "fa-b")])).unwrap();
        assert_eq!(a.resolve("x", "https://github.com"), Some("fa-a"));
        assert_eq!(b.resolve("x", "https://github.com"), Some("fa-b"));
    }
}
