//! Whole-document JSON persistence.
//!
//! Every durable structure in redscout is one small JSON document keyed by
//! name inside a data directory. Documents are rewritten wholesale on save;
//! a document that is missing or fails to parse loads as the caller's
//! default, never as an error.

use redscout_core::{ScoutError, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Well-known document names.
pub const SEEN_DOC: &str = "seen";
pub const ALERTS_DOC: &str = "alerts";
pub const SCHEDULE_DOC: &str = "scheduled_posts";
pub const HISTORY_DOC: &str = "posted_history";
pub const COMPETITORS_DOC: &str = "competitors";
pub const DIGEST_DOC: &str = "digest";

#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, ScoutError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|_| StorageError::DirUnavailable {
                path: dir.display().to_string(),
            })?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// Load a document, substituting `default` when the file is missing or
    /// does not parse. Corruption is logged and recovered, not fatal.
    pub async fn load_or<T: DeserializeOwned>(&self, name: &str, default: T) -> T {
        let path = self.path_for(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(value) => value,
                Err(e) => {
                    warn!(
                        "Document '{}' at {} is corrupt ({}), using default",
                        name,
                        path.display(),
                        e
                    );
                    default
                }
            },
            Err(_) => {
                debug!("Document '{}' not present, using default", name);
                default
            }
        }
    }

    pub async fn save<T: Serialize>(&self, name: &str, document: &T) -> Result<(), ScoutError> {
        let bytes =
            serde_json::to_vec_pretty(document).map_err(|e| StorageError::EncodeFailed {
                name: name.to_string(),
                source: e,
            })?;
        tokio::fs::write(self.path_for(name), bytes)
            .await
            .map_err(|e| StorageError::WriteFailed {
                name: name.to_string(),
                source: e,
            })?;
        debug!("Saved document '{}'", name);
        Ok(())
    }
}
