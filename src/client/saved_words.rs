//! Saved-word stores
//!
//! Two variants are provided:
//! - [`LocalSavedWords`]: words live only in local storage
//! - [`SavedWordStore`]: the server is authoritative and local storage is a
//!   cache. Writes are applied locally first, queued, then pushed to the
//!   server. Anything the server has not acknowledged is replayed over the
//!   fetched list on the next load.
//!
//! Case handling differs between operations: `save_word` on the remote-backed
//! store refuses a word that matches an existing one case-insensitively,
//! while `is_word_saved` and `remove_saved_word` compare exactly.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::api::ApiClientError;
use super::identity;
use super::queue::{PendingOperation, PendingQueue, QueueItem};
use super::storage::{read_json, write_json, KeyValueStorage, StorageError};
use crate::vocabulary::{SavedWordRecord, SavedWordRow, StoredVocabularyWord, DEFAULT_LEVEL};

pub const SAVED_WORDS_KEY: &str = "vocabmaster_saved_words";

#[derive(Error, Debug)]
pub enum SavedWordsError {
    #[error("Local storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to reach saved words service: {0}")]
    Remote(#[from] ApiClientError),
}

pub type Result<T> = std::result::Result<T, SavedWordsError>;

fn default_level() -> String {
    DEFAULT_LEVEL.to_string()
}

/// A word the user chose to keep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWord {
    /// Id of the vocabulary word
    pub id: i64,
    pub word: String,
    pub pronunciation: String,
    pub definition: String,
    pub sentence: String,
    #[serde(default = "default_level")]
    pub level: String,
    pub saved_at: DateTime<Utc>,
    /// Id of the server-side saved row, once known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<i64>,
}

impl SavedWord {
    pub fn from_vocabulary(word: &StoredVocabularyWord) -> Self {
        Self {
            id: word.id,
            word: word.word.clone(),
            pronunciation: word.pronunciation.clone(),
            definition: word.definition.clone(),
            sentence: word.sentence.clone(),
            level: word.level.clone(),
            saved_at: Utc::now(),
            remote_id: None,
        }
    }

    pub fn from_row(row: SavedWordRow) -> Self {
        Self {
            id: row.word_id,
            word: row.word,
            pronunciation: row.pronunciation,
            definition: row.definition,
            sentence: row.sentence,
            level: row.level,
            saved_at: row.created_at,
            remote_id: Some(row.id),
        }
    }
}

fn pick_random(words: &[SavedWord], count: usize) -> Vec<SavedWord> {
    words
        .choose_multiple(&mut rand::thread_rng(), count.min(words.len()))
        .cloned()
        .collect()
}

/// Saved words kept only in local storage
pub struct LocalSavedWords<S> {
    storage: S,
}

impl<S: KeyValueStorage> LocalSavedWords<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn get_saved_words(&self) -> Vec<SavedWord> {
        read_json(&self.storage, SAVED_WORDS_KEY).unwrap_or_default()
    }

    /// Append a word unless one with the exact same text exists
    pub fn save_word(&self, word: &StoredVocabularyWord) -> std::result::Result<bool, StorageError> {
        let mut words = self.get_saved_words();
        if words.iter().any(|w| w.word == word.word) {
            return Ok(false);
        }
        words.push(SavedWord::from_vocabulary(word));
        write_json(&self.storage, SAVED_WORDS_KEY, &words)?;
        Ok(true)
    }

    pub fn remove_saved_word(&self, word: &str) -> std::result::Result<(), StorageError> {
        let words: Vec<SavedWord> = self
            .get_saved_words()
            .into_iter()
            .filter(|w| w.word != word)
            .collect();
        write_json(&self.storage, SAVED_WORDS_KEY, &words)
    }

    pub fn is_word_saved(&self, word: &str) -> bool {
        self.get_saved_words().iter().any(|w| w.word == word)
    }

    pub fn clear_all_saved_words(&self) -> std::result::Result<(), StorageError> {
        self.storage.remove(SAVED_WORDS_KEY)
    }

    pub fn random_words(&self, count: usize) -> Vec<SavedWord> {
        pick_random(&self.get_saved_words(), count)
    }
}

/// Server-side saved-word operations used by [`SavedWordStore`]
#[async_trait]
pub trait SavedWordsRemote: Send + Sync {
    async fn fetch_saved(
        &self,
        anonymous_id: &str,
    ) -> std::result::Result<Vec<SavedWordRow>, ApiClientError>;

    /// Returns `None` when the server already had the word
    async fn save(
        &self,
        anonymous_id: &str,
        vocabulary_word_id: i64,
    ) -> std::result::Result<Option<SavedWordRecord>, ApiClientError>;

    async fn delete(&self, saved_id: i64) -> std::result::Result<(), ApiClientError>;

    async fn clear(&self, anonymous_id: &str) -> std::result::Result<(), ApiClientError>;
}

#[async_trait]
impl<T: SavedWordsRemote + ?Sized> SavedWordsRemote for Arc<T> {
    async fn fetch_saved(
        &self,
        anonymous_id: &str,
    ) -> std::result::Result<Vec<SavedWordRow>, ApiClientError> {
        (**self).fetch_saved(anonymous_id).await
    }

    async fn save(
        &self,
        anonymous_id: &str,
        vocabulary_word_id: i64,
    ) -> std::result::Result<Option<SavedWordRecord>, ApiClientError> {
        (**self).save(anonymous_id, vocabulary_word_id).await
    }

    async fn delete(&self, saved_id: i64) -> std::result::Result<(), ApiClientError> {
        (**self).delete(saved_id).await
    }

    async fn clear(&self, anonymous_id: &str) -> std::result::Result<(), ApiClientError> {
        (**self).clear(anonymous_id).await
    }
}

/// Saved words backed by the server, cached in local storage
pub struct SavedWordStore<R, S> {
    remote: R,
    storage: S,
    anonymous_id: String,
    words: Vec<SavedWord>,
    queue: PendingQueue,
}

impl<R: SavedWordsRemote, S: KeyValueStorage> SavedWordStore<R, S> {
    /// Open the store from the local cache without contacting the server
    pub fn new(remote: R, storage: S) -> Result<Self> {
        let anonymous_id = identity::anonymous_id(&storage)?;
        let words = read_json(&storage, SAVED_WORDS_KEY).unwrap_or_default();
        let queue = PendingQueue::load(&storage);

        Ok(Self {
            remote,
            storage,
            anonymous_id,
            words,
            queue,
        })
    }

    pub fn anonymous_id(&self) -> &str {
        &self.anonymous_id
    }

    pub fn saved_words(&self) -> &[SavedWord] {
        &self.words
    }

    pub fn saved_count(&self) -> usize {
        self.words.len()
    }

    /// Writes applied locally that the server has not acknowledged yet
    pub fn pending(&self) -> &[QueueItem] {
        &self.queue.items
    }

    /// Exact-match membership check
    pub fn is_word_saved(&self, word: &str) -> bool {
        self.words.iter().any(|w| w.word == word)
    }

    pub fn random_words(&self, count: usize) -> Vec<SavedWord> {
        pick_random(&self.words, count)
    }

    /// Reconcile with the server
    ///
    /// Pending writes are flushed first, then the server list replaces the
    /// local cache with anything still unacknowledged replayed on top. If
    /// the server cannot be reached the last local cache stays in place and
    /// the error is returned.
    pub async fn load(&mut self) -> Result<()> {
        self.flush().await;

        match self.remote.fetch_saved(&self.anonymous_id).await {
            Ok(rows) => {
                let mut seen = HashSet::new();
                let mut words: Vec<SavedWord> = rows
                    .into_iter()
                    .filter(|row| seen.insert(row.word.to_lowercase()))
                    .map(SavedWord::from_row)
                    .collect();
                self.queue.apply_to(&mut words);

                log::info!(
                    "Loaded {} saved words ({} pending)",
                    words.len(),
                    self.queue.len()
                );
                self.words = words;
                self.persist_words()?;
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to fetch saved words, using local cache: {}", e);
                self.words = read_json(&self.storage, SAVED_WORDS_KEY).unwrap_or_default();
                Err(e.into())
            }
        }
    }

    /// Save a word; returns false if a case-insensitive match is already saved
    pub async fn save_word(&mut self, word: &StoredVocabularyWord) -> Result<bool> {
        let lower = word.word.to_lowercase();
        if self.words.iter().any(|w| w.word.to_lowercase() == lower) {
            return Ok(false);
        }

        let saved = SavedWord::from_vocabulary(word);
        self.words.push(saved.clone());
        self.persist_words()?;
        self.queue.enqueue(PendingOperation::Save { word: saved });
        self.queue.save(&self.storage)?;

        self.flush().await;
        Ok(true)
    }

    /// Remove a word by exact text; returns false if nothing matched
    pub async fn remove_saved_word(&mut self, word: &str) -> Result<bool> {
        let (removed, kept): (Vec<SavedWord>, Vec<SavedWord>) =
            self.words.drain(..).partition(|w| w.word == word);
        self.words = kept;

        if removed.is_empty() {
            return Ok(false);
        }

        self.persist_words()?;
        for w in removed {
            self.queue.enqueue(PendingOperation::Remove {
                vocabulary_word_id: w.id,
                word: w.word,
                remote_id: w.remote_id,
            });
        }
        self.queue.save(&self.storage)?;

        self.flush().await;
        Ok(true)
    }

    pub async fn clear_all_saved_words(&mut self) -> Result<()> {
        self.words.clear();
        self.storage.remove(SAVED_WORDS_KEY)?;
        self.queue.enqueue(PendingOperation::Clear);
        self.queue.save(&self.storage)?;

        self.flush().await;
        Ok(())
    }

    /// Push queued writes to the server in order, stopping at the first
    /// failure. Returns the number of writes still pending.
    pub async fn flush(&mut self) -> usize {
        while let Some(item) = self.queue.front().cloned() {
            match self.send(&item.operation).await {
                Ok(record) => {
                    self.queue.complete(item.id);
                    if let Some(record) = record {
                        self.acknowledge_save(&record);
                    }
                }
                Err(e) if !e.is_retryable() => {
                    // The server will refuse this write every time; the next
                    // load brings the local list back in line with it.
                    log::warn!("Remote refused write, dropping it: {}", e);
                    self.queue.complete(item.id);
                }
                Err(e) => {
                    log::warn!(
                        "Remote write failed (attempt {}), keeping local change: {}",
                        item.retries + 1,
                        e
                    );
                    self.queue.fail(item.id, e.to_string());
                    break;
                }
            }
        }

        if let Err(e) = self.queue.save(&self.storage) {
            log::warn!("Failed to persist pending writes: {}", e);
        }
        self.queue.len()
    }

    async fn send(
        &self,
        operation: &PendingOperation,
    ) -> std::result::Result<Option<SavedWordRecord>, ApiClientError> {
        match operation {
            PendingOperation::Save { word } => self.remote.save(&self.anonymous_id, word.id).await,
            PendingOperation::Remove {
                remote_id: Some(id),
                ..
            } => self.remote.delete(*id).await.map(|_| None),
            PendingOperation::Remove {
                vocabulary_word_id,
                word,
                remote_id: None,
            } => {
                let rows = self.remote.fetch_saved(&self.anonymous_id).await?;
                match rows.iter().find(|row| row.word_id == *vocabulary_word_id) {
                    Some(row) => self.remote.delete(row.id).await.map(|_| None),
                    None => {
                        log::debug!("{} was never saved remotely, nothing to remove", word);
                        Ok(None)
                    }
                }
            }
            PendingOperation::Clear => self.remote.clear(&self.anonymous_id).await.map(|_| None),
        }
    }

    fn acknowledge_save(&mut self, record: &SavedWordRecord) {
        if let Some(word) = self
            .words
            .iter_mut()
            .find(|w| w.id == record.vocabulary_word_id)
        {
            word.remote_id = Some(record.id);
        }
        self.queue
            .resolve_remote_id(record.vocabulary_word_id, record.id);

        if let Err(e) = self.persist_words() {
            log::warn!("Failed to cache saved words: {}", e);
        }
    }

    fn persist_words(&self) -> std::result::Result<(), StorageError> {
        write_json(&self.storage, SAVED_WORDS_KEY, &self.words)
    }
}
