//! Subscriber chat-id store.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use nudge_core::error::Result;

/// Flat-file set of subscriber chat ids, persisted as a JSON array.
#[derive(Clone)]
pub struct SubscriberStore {
    path: PathBuf,
}

impl SubscriberStore {
    /// Create a subscriber store inside the given data directory.
    pub fn new(dir: &Path) -> Self {
        std::fs::create_dir_all(dir).ok();
        Self {
            path: dir.join("chats.json"),
        }
    }

    /// Load the subscriber set. A missing or unreadable file degrades to
    /// an empty set.
    pub fn load(&self) -> BTreeSet<i64> {
        if !self.path.exists() {
            return BTreeSet::new();
        }
        match std::fs::read_to_string(&self.path) {
            Ok(json) => match serde_json::from_str::<Vec<i64>>(&json) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    tracing::warn!("⚠️ Failed to parse {}: {e}", self.path.display());
                    BTreeSet::new()
                }
            },
            Err(e) => {
                tracing::warn!("⚠️ Failed to read {}: {e}", self.path.display());
                BTreeSet::new()
            }
        }
    }

    /// Write the subscriber set back to disk.
    pub fn save(&self, subscribers: &BTreeSet<i64>) -> Result<()> {
        let ids: Vec<i64> = subscribers.iter().copied().collect();
        let json = serde_json::to_string_pretty(&ids)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Register a chat id. Returns true when it was new (and persisted).
    pub fn add(&self, chat_id: i64) -> Result<bool> {
        let mut subscribers = self.load();
        if !subscribers.insert(chat_id) {
            return Ok(false);
        }
        self.save(&subscribers)?;
        Ok(true)
    }
}
