//! Run-wide set of deduplicated results

use super::types::DedupMode;
use std::collections::BTreeSet;
use std::io;
use std::path::Path;

/// Collects result keys across all queries of a run. Keys are unique and
/// iterate in ascending lexical order.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    mode: DedupMode,
    keys: BTreeSet<String>,
}

impl ResultSet {
    pub fn new(mode: DedupMode) -> Self {
        Self {
            mode,
            keys: BTreeSet::new(),
        }
    }

    /// Add the key for `link`. Returns true if it was not already present.
    pub fn add_link(&mut self, link: &str) -> bool {
        match self.mode.key(link) {
            Some(key) => self.keys.insert(key),
            None => false,
        }
    }

    /// Add every link, returning how many new keys were stored
    pub fn extend_links<'a>(&mut self, links: impl IntoIterator<Item = &'a str>) -> usize {
        links.into_iter().filter(|link| self.add_link(link)).count()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Keys in ascending order
    pub fn to_sorted_vec(&self) -> Vec<String> {
        self.keys.iter().cloned().collect()
    }

    /// Pretty JSON array (2-space indent, non-ASCII kept as-is)
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.keys)
    }

    /// Write the keys to `path` as a JSON array, replacing any existing file
    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::from)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINKS: [&str; 3] = ["http://b.com/x", "http://a.com/y", "http://b.com/z"];

    #[test]
    fn test_host_mode_dedups_and_sorts() {
        let mut set = ResultSet::new(DedupMode::Host);
        assert_eq!(set.extend_links(LINKS), 2);
        assert_eq!(set.to_sorted_vec(), vec!["a.com", "b.com"]);
    }

    #[test]
    fn test_full_url_mode_keeps_each_link() {
        let mut set = ResultSet::new(DedupMode::FullUrl);
        set.extend_links(LINKS);
        assert_eq!(
            set.to_sorted_vec(),
            vec!["http://a.com/y", "http://b.com/x", "http://b.com/z"]
        );
    }

    #[test]
    fn test_add_link_reports_duplicates() {
        let mut set = ResultSet::new(DedupMode::Host);
        assert!(set.add_link("https://a.com/1"));
        assert!(!set.add_link("https://a.com/2"));
        assert!(!set.add_link("garbage"));
        assert_eq!(set.len(), 1);
        assert!(set.contains("a.com"));
    }

    #[test]
    fn test_json_format() {
        let mut set = ResultSet::new(DedupMode::FullUrl);
        set.add_link("https://b.com/ü");
        set.add_link("https://a.com/");

        assert_eq!(
            set.to_json().unwrap(),
            "[\n  \"https://a.com/\",\n  \"https://b.com/ü\"\n]"
        );
    }

    #[test]
    fn test_non_ascii_hosts_are_written_unescaped() {
        let mut set = ResultSet::new(DedupMode::Host);
        set.add_link("https://bücher.de/x");
        set.add_link("https://bücher.de/y");

        assert_eq!(set.len(), 1);
        assert_eq!(set.to_json().unwrap(), "[\n  \"bücher.de\"\n]");
    }

    #[test]
    fn test_write_json_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        std::fs::write(&path, "old content that is longer than the new one").unwrap();

        let mut set = ResultSet::new(DedupMode::Host);
        set.add_link("https://a.com/");
        set.write_json(&path).unwrap();

        let written: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, vec!["a.com"]);
    }

    #[test]
    fn test_empty_set_serializes_to_empty_array() {
        let set = ResultSet::new(DedupMode::Host);
        assert!(set.is_empty());
        assert_eq!(set.to_json().unwrap(), "[]");
    }
}
