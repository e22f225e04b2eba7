//! Saved query list
//!
//! An ordered list of query strings kept in a JSON file. Duplicates are
//! refused on add; removal is by zero-based index.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum QueryStoreError {
    #[error("query must not be empty")]
    Empty,

    #[error("index {index} is out of bounds ({len} queries saved)")]
    OutOfBounds { index: usize, len: usize },

    #[error("failed to write query file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize queries: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result of adding a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyExists,
}

/// JSON-file-backed list of queries
#[derive(Debug, Clone)]
pub struct QueryStore {
    path: PathBuf,
}

impl QueryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All saved queries in order. A missing or unreadable file is an empty list.
    pub fn list(&self) -> Vec<String> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Cannot read query file {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!("Query file {} is malformed: {}", self.path.display(), e);
            Vec::new()
        })
    }

    fn save(&self, queries: &[String]) -> Result<(), QueryStoreError> {
        let json = to_json_4(queries)?;
        std::fs::write(&self.path, json).map_err(|source| QueryStoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Append a query unless an identical one is already saved
    pub fn add(&self, query: &str) -> Result<AddOutcome, QueryStoreError> {
        if query.trim().is_empty() {
            return Err(QueryStoreError::Empty);
        }

        let mut queries = self.list();
        if queries.iter().any(|q| q == query) {
            return Ok(AddOutcome::AlreadyExists);
        }
        queries.push(query.to_string());
        self.save(&queries)?;
        Ok(AddOutcome::Added)
    }

    /// Remove the query at `index`, returning it
    pub fn remove(&self, index: usize) -> Result<String, QueryStoreError> {
        let mut queries = self.list();
        if index >= queries.len() {
            return Err(QueryStoreError::OutOfBounds {
                index,
                len: queries.len(),
            });
        }
        let removed = queries.remove(index);
        self.save(&queries)?;
        Ok(removed)
    }
}

fn to_json_4(queries: &[String]) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(queries, &mut ser)?;
    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> QueryStore {
        QueryStore::new(dir.path().join("queries.json"))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).list().is_empty());
    }

    #[test]
    fn test_malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "[\"unterminated").unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_add_keeps_order_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.add("rust async").unwrap(), AddOutcome::Added);
        assert_eq!(store.add("tokio tutorial").unwrap(), AddOutcome::Added);
        assert_eq!(store.add("rust async").unwrap(), AddOutcome::AlreadyExists);

        assert_eq!(store.list(), vec!["rust async", "tokio tutorial"]);
    }

    #[test]
    fn test_add_rejects_blank() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            store_in(&dir).add("   "),
            Err(QueryStoreError::Empty)
        ));
    }

    #[test]
    fn test_remove_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for q in ["a", "b", "c"] {
            store.add(q).unwrap();
        }

        assert_eq!(store.remove(1).unwrap(), "b");
        assert_eq!(store.list(), vec!["a", "c"]);
    }

    #[test]
    fn test_remove_out_of_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.add("only").unwrap();

        let err = store.remove(1).unwrap_err();
        assert!(matches!(err, QueryStoreError::OutOfBounds { index: 1, len: 1 }));
        assert_eq!(store.list(), vec!["only"]);
    }

    #[test]
    fn test_file_uses_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.add("q").unwrap();

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "[\n    \"q\"\n]");
    }
}
