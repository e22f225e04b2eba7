//! Result type definitions

use serde::{Deserialize, Serialize};
use url::Url;

/// What part of a result URL is kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupMode {
    /// Keep only the network location as written in the link
    /// (`example.com`, `example.com:8080`, `user@example.com`)
    #[default]
    Host,
    /// Keep the link exactly as returned
    FullUrl,
}

impl DedupMode {
    pub fn from_full_url_flag(full_url: bool) -> Self {
        if full_url {
            DedupMode::FullUrl
        } else {
            DedupMode::Host
        }
    }

    /// Key under which `link` is stored. `None` when host mode cannot find a
    /// host in the link.
    pub fn key(&self, link: &str) -> Option<String> {
        match self {
            DedupMode::FullUrl => Some(link.to_string()),
            DedupMode::Host => host_key(link),
        }
    }
}

/// Authority of `link` exactly as written: the text between `://` and the
/// next `/`, `?` or `#`. Case, port, userinfo and non-ASCII hosts are kept.
fn host_key(link: &str) -> Option<String> {
    Url::parse(link).ok()?.host_str()?;
    let (_, rest) = link.trim().split_once("://")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let netloc = &rest[..end];
    (!netloc.is_empty()).then(|| netloc.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_key() {
        let mode = DedupMode::Host;
        assert_eq!(mode.key("http://b.com/x").as_deref(), Some("b.com"));
        assert_eq!(
            mode.key("https://docs.rs/serde/latest?q=1#frag").as_deref(),
            Some("docs.rs")
        );
        assert_eq!(
            mode.key("http://localhost:8080/a").as_deref(),
            Some("localhost:8080")
        );
        assert_eq!(mode.key("https://a.com:443/").as_deref(), Some("a.com:443"));
    }

    #[test]
    fn test_host_key_is_not_normalized() {
        let mode = DedupMode::Host;
        assert_eq!(mode.key("https://bücher.de/x").as_deref(), Some("bücher.de"));
        assert_eq!(
            mode.key("https://Example.COM/path").as_deref(),
            Some("Example.COM")
        );
        assert_eq!(
            mode.key("https://user:pw@a.com:443/").as_deref(),
            Some("user:pw@a.com:443")
        );
        assert_eq!(mode.key("http://a.com?q=1").as_deref(), Some("a.com"));
    }

    #[test]
    fn test_host_key_without_host() {
        let mode = DedupMode::Host;
        assert_eq!(mode.key("not a url"), None);
        assert_eq!(mode.key("mailto:someone@example.com"), None);
    }

    #[test]
    fn test_full_url_key_is_verbatim() {
        assert_eq!(
            DedupMode::FullUrl.key("http://b.com/x?y=1").as_deref(),
            Some("http://b.com/x?y=1")
        );
    }

    #[test]
    fn test_from_flag() {
        assert_eq!(DedupMode::from_full_url_flag(true), DedupMode::FullUrl);
        assert_eq!(DedupMode::from_full_url_flag(false), DedupMode::Host);
    }
}
