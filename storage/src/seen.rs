//! The bounded durable set of already-notified item identifiers.

use crate::store::{JsonStore, SEEN_DOC};
use redscout_core::ScoutError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Retained keys after a flush; older entries are evicted first.
pub const SEEN_CAP: usize = 1000;

/// Composite dedup key. Keyword-alert and competitor tracking share one
/// persisted set but live in separate namespaces, so an item noticed by
/// one path can still be fresh to the other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeenKey {
    Keyword(String),
    Competitor(String),
}

impl SeenKey {
    pub fn render(&self) -> String {
        match self {
            SeenKey::Keyword(id) => id.clone(),
            SeenKey::Competitor(id) => format!("comp:{}", id),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SeenDocument {
    keys: Vec<String>,
}

/// In-memory view of the seen set for one run. Loaded once at start,
/// flushed once at completion; nothing touches disk in between.
#[derive(Debug, Default)]
pub struct SeenSet {
    // insertion order, oldest first; no promotion on repeat lookups
    ordered: Vec<String>,
    lookup: HashSet<String>,
}

impl SeenSet {
    pub async fn load(store: &JsonStore) -> Self {
        let doc: SeenDocument = store.load_or(SEEN_DOC, SeenDocument::default()).await;
        let lookup = doc.keys.iter().cloned().collect();
        Self {
            ordered: doc.keys,
            lookup,
        }
    }

    pub fn contains(&self, key: &SeenKey) -> bool {
        self.lookup.contains(&key.render())
    }

    pub fn insert(&mut self, key: SeenKey) {
        let rendered = key.render();
        if self.lookup.insert(rendered.clone()) {
            self.ordered.push(rendered);
        }
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Evict down to the newest `SEEN_CAP` keys and persist the whole
    /// document.
    pub async fn flush(&mut self, store: &JsonStore) -> Result<(), ScoutError> {
        if self.ordered.len() > SEEN_CAP {
            let excess = self.ordered.len() - SEEN_CAP;
            for key in self.ordered.drain(..excess) {
                self.lookup.remove(&key);
            }
            debug!("Evicted {} oldest seen keys", excess);
        }
        store
            .save(
                SEEN_DOC,
                &SeenDocument {
                    keys: self.ordered.clone(),
                },
            )
            .await
    }
}
