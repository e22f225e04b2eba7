//! API credential profiles
//!
//! Profiles live in a YAML file mapping a profile name to an API key and a
//! search engine id:
//!
//! ```yaml
//! default:
//!   api_key: AIza...
//!   search_engine_id: 0123456789abcdef
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Profile used when none is given
pub const DEFAULT_PROFILE: &str = "default";

/// Credential errors. All of them are fatal for a search run.
#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error("credentials file '{0}' not found, run `cse config` to set up a profile")]
    NotFound(PathBuf),

    #[error("profile '{profile}' not found in '{path}'")]
    UnknownProfile { profile: String, path: PathBuf },

    #[error("{field} missing in profile '{profile}'")]
    MissingField {
        profile: String,
        field: &'static str,
    },

    #[error("failed to access credentials file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid credentials file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// API key and Programmable Search Engine id (`cx`)
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub search_engine_id: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, search_engine_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            search_engine_id: search_engine_id.into(),
        }
    }

    fn check(&self, profile: &str) -> Result<(), CredentialsError> {
        if self.api_key.trim().is_empty() {
            return Err(CredentialsError::MissingField {
                profile: profile.to_string(),
                field: "api_key",
            });
        }
        if self.search_engine_id.trim().is_empty() {
            return Err(CredentialsError::MissingField {
                profile: profile.to_string(),
                field: "search_engine_id",
            });
        }
        Ok(())
    }
}

// Keep the key out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("search_engine_id", &self.search_engine_id)
            .finish()
    }
}

/// YAML-backed profile store
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_profiles(&self) -> Result<Option<BTreeMap<String, Credentials>>, CredentialsError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CredentialsError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if text.trim().is_empty() {
            return Ok(Some(BTreeMap::new()));
        }

        serde_yaml::from_str(&text)
            .map(Some)
            .map_err(|source| CredentialsError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Load and check the credentials of `profile`
    pub fn load(&self, profile: &str) -> Result<Credentials, CredentialsError> {
        let profiles = self
            .read_profiles()?
            .ok_or_else(|| CredentialsError::NotFound(self.path.clone()))?;

        let credentials =
            profiles
                .get(profile)
                .cloned()
                .ok_or_else(|| CredentialsError::UnknownProfile {
                    profile: profile.to_string(),
                    path: self.path.clone(),
                })?;

        credentials.check(profile)?;
        debug!("Loaded credentials for profile '{}'", profile);
        Ok(credentials)
    }

    /// Create or replace `profile`, keeping all other profiles. A blank name
    /// saves to the default profile. Returns the name used.
    pub fn save(&self, profile: &str, credentials: Credentials) -> Result<String, CredentialsError> {
        let profile = match profile.trim() {
            "" => DEFAULT_PROFILE.to_string(),
            name => name.to_string(),
        };

        let mut profiles = self.read_profiles()?.unwrap_or_default();
        profiles.insert(profile.clone(), credentials);

        let yaml = serde_yaml::to_string(&profiles).map_err(|source| CredentialsError::Parse {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, yaml).map_err(|source| CredentialsError::Io {
            path: self.path.clone(),
            source,
        })?;

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join(".credentials.yml"))
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = store_in(&dir).load("default").unwrap_err();
        assert!(matches!(err, CredentialsError::NotFound(_)));
        assert!(err.to_string().contains("cse config"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let name = store.save("", Credentials::new("key-1", "cx-1")).unwrap();
        assert_eq!(name, "default");
        store.save("work", Credentials::new("key-2", "cx-2")).unwrap();

        assert_eq!(store.load("default").unwrap(), Credentials::new("key-1", "cx-1"));
        assert_eq!(store.load("work").unwrap(), Credentials::new("key-2", "cx-2"));
        let yaml = std::fs::read_to_string(store.path()).unwrap();
        assert!(yaml.contains("default:") && yaml.contains("work:"));
    }

    #[test]
    fn test_save_replaces_existing_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save("default", Credentials::new("old", "cx")).unwrap();
        store.save("default", Credentials::new("new", "cx")).unwrap();

        assert_eq!(store.load("default").unwrap().api_key, "new");
        let yaml = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(yaml.matches("api_key").count(), 1);
    }

    #[test]
    fn test_unknown_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save("default", Credentials::new("k", "cx")).unwrap();

        let err = store.load("other").unwrap_err();
        assert!(matches!(err, CredentialsError::UnknownProfile { .. }));
    }

    #[test]
    fn test_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            "default:\n  api_key: abc\nblank:\n  api_key: ''\n  search_engine_id: cx\n",
        )
        .unwrap();

        let err = store.load("default").unwrap_err();
        assert!(matches!(
            err,
            CredentialsError::MissingField {
                field: "search_engine_id",
                ..
            }
        ));

        let err = store.load("blank").unwrap_err();
        assert!(matches!(
            err,
            CredentialsError::MissingField {
                field: "api_key",
                ..
            }
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", Credentials::new("secret-key", "cx"));
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("REDACTED"));
    }
}
