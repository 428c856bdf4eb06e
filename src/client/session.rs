//! Learning/review session driving generation and saved words
//!
//! Holds everything a front end shows: the last generated batch, the review
//! list, the current mode and the notifications raised by user actions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::api::{ApiClientError, WordGenerator};
use super::history::WordHistory;
use super::saved_words::{SavedWord, SavedWordStore, SavedWordsError, SavedWordsRemote};
use super::storage::{read_json, write_json, KeyValueStorage};
use crate::vocabulary::{StoredVocabularyWord, VocabularyRequest};

pub const LAST_GENERATED_KEY: &str = "vocabmaster_last_generated";

/// Words picked for a random review
pub const RANDOM_REVIEW_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Learning,
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

/// A short message for the user, like a toast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    fn new(kind: NotificationKind, title: &str, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.into(),
        }
    }
}

/// Handle for one generation request
///
/// Only the most recently issued ticket may apply its result.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    seq: u64,
    pub request: VocabularyRequest,
}

impl GenerationTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

pub struct VocabularySession<G, R, S> {
    generator: G,
    saved: SavedWordStore<R, Arc<S>>,
    storage: Arc<S>,
    history: WordHistory,
    level: String,
    num_words: u32,
    mode: Mode,
    generated: Vec<StoredVocabularyWord>,
    review_words: Vec<SavedWord>,
    notifications: Vec<Notification>,
    latest_ticket: u64,
    in_flight: Option<u64>,
    clear_requested: bool,
}

impl<G, R, S> VocabularySession<G, R, S>
where
    G: WordGenerator,
    R: SavedWordsRemote,
    S: KeyValueStorage,
{
    /// Build a session from local state only; call [`Self::load`] to sync
    pub fn new(
        generator: G,
        remote: R,
        storage: Arc<S>,
        level: impl Into<String>,
        num_words: u32,
    ) -> Result<Self, SavedWordsError> {
        let saved = SavedWordStore::new(remote, Arc::clone(&storage))?;
        let history = WordHistory::load(&*storage);
        let generated = read_json(&*storage, LAST_GENERATED_KEY).unwrap_or_default();

        Ok(Self {
            generator,
            saved,
            storage,
            history,
            level: level.into(),
            num_words,
            mode: Mode::Learning,
            generated,
            review_words: Vec::new(),
            notifications: Vec::new(),
            latest_ticket: 0,
            in_flight: None,
            clear_requested: false,
        })
    }

    /// Reconcile saved words with the server
    ///
    /// On failure the cached list stays usable and an error notification is
    /// raised as well.
    pub async fn load(&mut self) -> Result<(), SavedWordsError> {
        let result = self.saved.load().await;
        if let Err(e) = &result {
            self.notify(
                NotificationKind::Error,
                "Offline",
                format!("Showing saved words from this device. {}", e),
            );
        }
        result
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn generated_words(&self) -> &[StoredVocabularyWord] {
        &self.generated
    }

    pub fn review_words(&self) -> &[SavedWord] {
        &self.review_words
    }

    pub fn saved_words(&self) -> &[SavedWord] {
        self.saved.saved_words()
    }

    pub fn saved_store(&self) -> &SavedWordStore<R, Arc<S>> {
        &self.saved
    }

    pub fn saved_store_mut(&mut self) -> &mut SavedWordStore<R, Arc<S>> {
        &mut self.saved
    }

    pub fn history(&self) -> &WordHistory {
        &self.history
    }

    pub fn is_word_saved(&self, word: &str) -> bool {
        self.saved.is_word_saved(word)
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_clear_requested(&self) -> bool {
        self.clear_requested
    }

    /// Look up a word of the current batch, ignoring case
    pub fn find_generated(&self, word: &str) -> Option<&StoredVocabularyWord> {
        let lower = word.to_lowercase();
        self.generated
            .iter()
            .find(|w| w.word.to_lowercase() == lower)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, kind: NotificationKind, title: &str, description: impl Into<String>) {
        let notification = Notification::new(kind, title, description);
        log::debug!("{}: {}", notification.title, notification.description);
        self.notifications.push(notification);
    }

    /// Start a generation; any earlier ticket becomes stale
    pub fn begin_generation(&mut self) -> GenerationTicket {
        self.latest_ticket += 1;
        self.in_flight = Some(self.latest_ticket);

        let request = VocabularyRequest {
            level: self.level.clone(),
            num_words: self.num_words,
            exclude_words: self.history.exclusions(),
            anonymous_id: Some(self.saved.anonymous_id().to_string()),
        };

        self.notify(
            NotificationKind::Info,
            "Generating vocabulary...",
            "Please wait while we create new words for you.",
        );

        GenerationTicket {
            seq: self.latest_ticket,
            request,
        }
    }

    /// Apply a generation result; returns false if the ticket was stale
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<Vec<StoredVocabularyWord>, ApiClientError>,
    ) -> bool {
        if ticket.seq != self.latest_ticket {
            log::info!(
                "Discarding stale generation {} (latest is {})",
                ticket.seq,
                self.latest_ticket
            );
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(words) => {
                let names: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
                self.history.record_generation(&names);
                if let Err(e) = self.history.save(&*self.storage) {
                    log::warn!("Failed to persist word history: {}", e);
                }
                if let Err(e) = write_json(&*self.storage, LAST_GENERATED_KEY, &words) {
                    log::warn!("Failed to persist generated words: {}", e);
                }

                self.notify(
                    NotificationKind::Success,
                    "Vocabulary generated!",
                    format!("{} new words are ready for learning.", words.len()),
                );
                self.generated = words;
            }
            Err(e) => {
                log::error!("Generation failed: {}", e);
                self.notify(NotificationKind::Error, "Generation Failed", e.to_string());
            }
        }
        true
    }

    /// Request a new batch and apply it
    pub async fn generate(&mut self) -> bool {
        let ticket = self.begin_generation();
        let result = self.generator.generate(&ticket.request).await;
        self.complete_generation(ticket, result)
    }

    /// Save the word if it is not saved, otherwise remove it
    ///
    /// Returns whether the word is saved afterwards.
    pub async fn toggle_save(
        &mut self,
        word: &StoredVocabularyWord,
    ) -> Result<bool, SavedWordsError> {
        if self.saved.is_word_saved(&word.word) {
            self.saved.remove_saved_word(&word.word).await?;
            self.notify(
                NotificationKind::Info,
                "Word removed",
                format!("\"{}\" has been removed from your saved words.", word.word),
            );
            return Ok(false);
        }

        if self.saved.save_word(word).await? {
            self.notify(
                NotificationKind::Success,
                "Word saved!",
                format!("\"{}\" has been added to your saved words.", word.word),
            );
        }
        Ok(true)
    }

    /// Switch modes; entering review shows every saved word
    pub fn toggle_mode(&mut self) -> Mode {
        self.mode = match self.mode {
            Mode::Learning => {
                self.review_words = self.saved.saved_words().to_vec();
                Mode::Review
            }
            Mode::Review => Mode::Learning,
        };
        self.mode
    }

    /// Replace the review list with a few random saved words
    pub fn review_random(&mut self) -> &[SavedWord] {
        if self.saved.saved_count() == 0 {
            self.notify(
                NotificationKind::Error,
                "No saved words",
                "Save some words first to start reviewing.",
            );
            return &self.review_words;
        }

        self.review_words = self.saved.random_words(RANDOM_REVIEW_SIZE);
        let count = self.review_words.len();
        self.notify(
            NotificationKind::Info,
            "Random review",
            format!("Reviewing {} random words.", count),
        );
        &self.review_words
    }

    /// First step of clearing; returns whether confirmation is now awaited
    pub fn request_clear(&mut self) -> bool {
        if self.saved.saved_count() == 0 {
            self.notify(
                NotificationKind::Error,
                "No saved words",
                "There are no words to clear.",
            );
            return false;
        }
        self.clear_requested = true;
        true
    }

    pub fn cancel_clear(&mut self) {
        self.clear_requested = false;
    }

    /// Clear every saved word; does nothing unless a clear was requested
    pub async fn confirm_clear(&mut self) -> Result<bool, SavedWordsError> {
        if !self.clear_requested {
            return Ok(false);
        }
        self.clear_requested = false;

        self.saved.clear_all_saved_words().await?;
        self.review_words.clear();
        self.notify(
            NotificationKind::Success,
            "All words cleared",
            "All saved words have been removed.",
        );
        Ok(true)
    }

    pub async fn remove_from_review(&mut self, word: &str) -> Result<(), SavedWordsError> {
        self.saved.remove_saved_word(word).await?;
        self.review_words.retain(|w| w.word != word);
        self.notify(
            NotificationKind::Info,
            "Word removed",
            format!("\"{}\" has been removed from your saved words.", word),
        );
        Ok(())
    }

    /// Forget the word history and the current batch
    pub fn reset_history(&mut self) {
        self.history.reset();
        if let Err(e) = self.history.save(&*self.storage) {
            log::warn!("Failed to persist word history: {}", e);
        }
        self.generated.clear();
        if let Err(e) = self.storage.remove(LAST_GENERATED_KEY) {
            log::warn!("Failed to drop generated words: {}", e);
        }
        self.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::storage::MemoryStorage;
    use crate::testing::{stored, FakeGenerator, FakeRemote};

    type TestSession = VocabularySession<Arc<FakeGenerator>, Arc<FakeRemote>, MemoryStorage>;

    struct Harness {
        generator: Arc<FakeGenerator>,
        remote: Arc<FakeRemote>,
        storage: Arc<MemoryStorage>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                generator: Arc::new(FakeGenerator::new()),
                remote: Arc::new(FakeRemote::new()),
                storage: Arc::new(MemoryStorage::new()),
            }
        }

        fn session(&self) -> TestSession {
            VocabularySession::new(
                Arc::clone(&self.generator),
                Arc::clone(&self.remote),
                Arc::clone(&self.storage),
                "B1-C1",
                2,
            )
            .unwrap()
        }
    }

    fn titles(session: &TestSession) -> Vec<&str> {
        session
            .notifications()
            .iter()
            .map(|n| n.title.as_str())
            .collect()
    }

    #[tokio::test]
    async fn test_generation_updates_history_and_batch() {
        let harness = Harness::new();
        let mut session = harness.session();

        assert!(session.generate().await);
        assert_eq!(session.generated_words().len(), 2);
        assert!(!session.is_generating());
        assert_eq!(
            titles(&session),
            vec!["Generating vocabulary...", "Vocabulary generated!"]
        );

        session.generate().await;
        let request = harness.generator.last_request().unwrap();
        assert_eq!(request.exclude_words, vec!["word1", "word2"]);
        assert_eq!(request.anonymous_id.as_deref(), Some(session.saved_store().anonymous_id()));

        // The batch survives a restart
        let reopened = harness.session();
        assert_eq!(reopened.generated_words(), session.generated_words());
        assert_eq!(reopened.history().len(), 4);
    }

    #[tokio::test]
    async fn test_sixth_request_excludes_only_fifth_batch() {
        let harness = Harness::new();
        let mut session = harness.session();

        for _ in 0..5 {
            session.generate().await;
        }
        session.generate().await;

        let request = harness.generator.last_request().unwrap();
        assert_eq!(request.exclude_words, vec!["word10", "word9"]);
    }

    #[tokio::test]
    async fn test_failed_generation_notifies_and_keeps_state() {
        let harness = Harness::new();
        let mut session = harness.session();
        session.generate().await;

        harness.generator.set_failing(true);
        session.take_notifications();
        assert!(session.generate().await);

        assert_eq!(session.generated_words().len(), 2);
        assert_eq!(session.history().generation_count(), 1);
        let notes = session.notifications();
        assert_eq!(notes[1].kind, NotificationKind::Error);
        assert_eq!(notes[1].title, "Generation Failed");
        assert!(notes[1].description.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_stale_generation_is_discarded() {
        let harness = Harness::new();
        let mut session = harness.session();

        let first = session.begin_generation();
        let second = session.begin_generation();
        assert!(second.seq() > first.seq());

        assert!(session.complete_generation(second, Ok(vec![stored(20, "newer")])));
        assert!(!session.complete_generation(first, Ok(vec![stored(10, "older")])));

        assert_eq!(session.generated_words()[0].word, "newer");
        assert!(!session.history().contains("older"));
    }

    #[tokio::test]
    async fn test_toggle_save() {
        let harness = Harness::new();
        let mut session = harness.session();
        let word = stored(1, "word1");

        assert!(session.toggle_save(&word).await.unwrap());
        assert!(session.is_word_saved("word1"));
        assert!(!session.toggle_save(&word).await.unwrap());
        assert!(!session.is_word_saved("word1"));
        assert_eq!(titles(&session), vec!["Word saved!", "Word removed"]);
    }

    #[tokio::test]
    async fn test_review_modes() {
        let harness = Harness::new();
        let mut session = harness.session();

        assert!(session.review_random().is_empty());
        assert_eq!(session.notifications()[0].kind, NotificationKind::Error);

        for id in 1..=5 {
            session.toggle_save(&stored(id, &format!("word{}", id))).await.unwrap();
        }

        assert_eq!(session.toggle_mode(), Mode::Review);
        assert_eq!(session.review_words().len(), 5);
        assert_eq!(session.review_random().len(), RANDOM_REVIEW_SIZE);

        let target = session.review_words()[0].word.clone();
        session.remove_from_review(&target).await.unwrap();
        assert_eq!(session.review_words().len(), RANDOM_REVIEW_SIZE - 1);
        assert!(!session.is_word_saved(&target));

        assert_eq!(session.toggle_mode(), Mode::Learning);
    }

    #[tokio::test]
    async fn test_clear_requires_confirmation() {
        let harness = Harness::new();
        let mut session = harness.session();

        assert!(!session.request_clear());
        assert!(!session.confirm_clear().await.unwrap());

        session.toggle_save(&stored(1, "word1")).await.unwrap();
        session.toggle_mode();
        assert!(session.request_clear());
        assert!(session.confirm_clear().await.unwrap());

        assert!(session.saved_words().is_empty());
        assert!(session.review_words().is_empty());
        assert!(harness.remote.rows(session.saved_store().anonymous_id()).is_empty());
    }

    #[tokio::test]
    async fn test_load_offline_keeps_cache() {
        let harness = Harness::new();
        let mut session = harness.session();
        session.toggle_save(&stored(1, "word1")).await.unwrap();

        harness.remote.set_online(false);
        let mut reopened = harness.session();
        assert!(reopened.load().await.is_err());
        assert!(reopened.is_word_saved("word1"));
        assert_eq!(reopened.notifications()[0].title, "Offline");
    }

    #[tokio::test]
    async fn test_reset_history() {
        let harness = Harness::new();
        let mut session = harness.session();
        session.generate().await;

        session.reset_history();
        assert!(session.history().is_empty());
        assert!(session.generated_words().is_empty());
        assert!(harness.storage.get(LAST_GENERATED_KEY).is_none());

        session.generate().await;
        let request = harness.generator.last_request().unwrap();
        assert!(request.exclude_words.is_empty());
    }
}
