use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::saved_words::SavedWord;
use super::storage::{read_json, write_json, KeyValueStorage, Result};

pub const PENDING_SYNC_KEY: &str = "vocabmaster_pending_sync";

/// Queue of remote writes that have been applied locally but not yet
/// acknowledged by the server
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PendingQueue {
    pub items: Vec<QueueItem>,
}

/// A single queued remote write
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    /// Unique ID for this queue item
    pub id: Uuid,
    /// The write to perform
    pub operation: PendingOperation,
    /// When this item was queued
    pub created_at: DateTime<Utc>,
    /// Number of failed attempts
    pub retries: u32,
    /// Last error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Types of remote writes that can be queued
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PendingOperation {
    /// Save a word; carries the local entry so it can be re-applied
    Save { word: SavedWord },
    /// Remove a word, by saved row id when it is known
    Remove {
        vocabulary_word_id: i64,
        word: String,
        remote_id: Option<i64>,
    },
    /// Remove every saved word of this client
    Clear,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add an operation, folding it into what is already queued
    pub fn enqueue(&mut self, operation: PendingOperation) {
        match &operation {
            // Nothing queued before a clear can matter any more
            PendingOperation::Clear => self.items.clear(),
            PendingOperation::Save { word } => {
                let already_queued = self.items.iter().any(|item| {
                    matches!(&item.operation, PendingOperation::Save { word: queued } if queued.id == word.id)
                });
                if already_queued {
                    return;
                }
            }
            PendingOperation::Remove {
                vocabulary_word_id, ..
            } => {
                // A save the server never saw cancels out against this remove
                let pending_save = self.items.iter().position(|item| {
                    matches!(&item.operation, PendingOperation::Save { word } if word.id == *vocabulary_word_id)
                });
                if let Some(pos) = pending_save {
                    self.items.remove(pos);
                    return;
                }
            }
        }

        self.items.push(QueueItem {
            id: Uuid::new_v4(),
            operation,
            created_at: Utc::now(),
            retries: 0,
            last_error: None,
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Oldest item, next to be sent
    pub fn front(&self) -> Option<&QueueItem> {
        self.items.first()
    }

    /// Mark an item as completed (remove it)
    pub fn complete(&mut self, item_id: Uuid) {
        self.items.retain(|item| item.id != item_id);
    }

    /// Mark an item as failed with error
    pub fn fail(&mut self, item_id: Uuid, error: String) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) {
            item.retries += 1;
            item.last_error = Some(error);
        }
    }

    /// Fill in the saved row id of queued removes once a save is acknowledged
    pub fn resolve_remote_id(&mut self, vocabulary_word_id: i64, remote: i64) {
        for item in &mut self.items {
            if let PendingOperation::Remove {
                vocabulary_word_id: id,
                remote_id,
                ..
            } = &mut item.operation
            {
                if *id == vocabulary_word_id && remote_id.is_none() {
                    *remote_id = Some(remote);
                }
            }
        }
    }

    /// Replay queued operations on top of a list fetched from the server
    pub fn apply_to(&self, words: &mut Vec<SavedWord>) {
        for item in &self.items {
            match &item.operation {
                PendingOperation::Clear => words.clear(),
                PendingOperation::Save { word } => {
                    let lower = word.word.to_lowercase();
                    if !words.iter().any(|w| w.word.to_lowercase() == lower) {
                        words.push(word.clone());
                    }
                }
                PendingOperation::Remove {
                    vocabulary_word_id, ..
                } => words.retain(|w| w.id != *vocabulary_word_id),
            }
        }
    }

    /// Load the queue; missing or malformed data gives an empty queue
    pub fn load(storage: &dyn KeyValueStorage) -> Self {
        read_json(storage, PENDING_SYNC_KEY).unwrap_or_default()
    }

    pub fn save(&self, storage: &dyn KeyValueStorage) -> Result<()> {
        if self.items.is_empty() {
            storage.remove(PENDING_SYNC_KEY)
        } else {
            write_json(storage, PENDING_SYNC_KEY, self)
        }
    }
}
