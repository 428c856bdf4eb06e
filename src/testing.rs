//! Test doubles shared by the unit tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::client::{ApiClientError, SavedWordsRemote, WordGenerator};
use crate::vocabulary::{
    SavedWordRecord, SavedWordRow, StoredVocabularyWord, VocabularyRequest, VocabularyWord,
    WordSource,
};

pub fn stored(id: i64, word: &str) -> StoredVocabularyWord {
    StoredVocabularyWord {
        id,
        word: word.to_string(),
        pronunciation: "N/A".to_string(),
        definition: format!("definition of {}", word),
        sentence: format!("A sentence using {}.", word),
        level: "B1-C1".to_string(),
    }
}

fn offline() -> ApiClientError {
    ApiClientError::Server {
        status: 503,
        message: "offline".to_string(),
    }
}

/// Word source returning a fixed list
pub struct CannedSource {
    words: Vec<String>,
}

impl CannedSource {
    pub fn new(words: &[&str]) -> Self {
        Self {
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }
}

#[async_trait]
impl WordSource for CannedSource {
    async fn generate(
        &self,
        level: &str,
        num_words: usize,
        _exclude_words: &[String],
    ) -> crate::vocabulary::Result<Vec<VocabularyWord>> {
        Ok(self
            .words
            .iter()
            .take(num_words)
            .map(|w| VocabularyWord {
                word: w.clone(),
                pronunciation: "N/A".to_string(),
                definition: format!("definition of {}", w),
                sentence: format!("A sentence using {}.", w),
                level: level.to_string(),
            })
            .collect())
    }
}

/// In-memory saved-word server that can be switched offline
///
/// Words saved through it are named `word{id}`, matching [`FakeGenerator`].
/// Saves of single word ids can be refused for good ([`FakeRemote::reject_save`])
/// or fail transiently ([`FakeRemote::fail_save`]).
pub struct FakeRemote {
    rows: Mutex<Vec<SavedWordRow>>,
    online: AtomicBool,
    next_id: AtomicI64,
    calls: AtomicUsize,
    rejected: Mutex<HashSet<i64>>,
    failing: Mutex<HashSet<i64>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            online: AtomicBool::new(true),
            next_id: AtomicI64::new(1),
            calls: AtomicUsize::new(0),
            rejected: Mutex::new(HashSet::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Answer saves of this word id with a 404, as for an unknown word
    pub fn reject_save(&self, vocabulary_word_id: i64) {
        self.rejected.lock().unwrap().insert(vocabulary_word_id);
    }

    /// Answer saves of this word id with a 503 while `failing` is set
    pub fn fail_save(&self, vocabulary_word_id: i64, failing: bool) {
        let mut set = self.failing.lock().unwrap();
        if failing {
            set.insert(vocabulary_word_id);
        } else {
            set.remove(&vocabulary_word_id);
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of requests received, including failed ones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self, anonymous_id: &str) -> Vec<SavedWordRow> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.anonymous_id == anonymous_id)
            .cloned()
            .collect()
    }

    pub fn insert_row(&self, anonymous_id: &str, word: &StoredVocabularyWord) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.rows.lock().unwrap().push(SavedWordRow {
            id,
            anonymous_id: anonymous_id.to_string(),
            created_at: Utc::now(),
            word_id: word.id,
            word: word.word.clone(),
            pronunciation: word.pronunciation.clone(),
            definition: word.definition.clone(),
            sentence: word.sentence.clone(),
            level: word.level.clone(),
        });
        id
    }

    fn check(&self) -> Result<(), ApiClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(offline())
        }
    }
}

#[async_trait]
impl SavedWordsRemote for FakeRemote {
    async fn fetch_saved(&self, anonymous_id: &str) -> Result<Vec<SavedWordRow>, ApiClientError> {
        self.check()?;
        Ok(self.rows(anonymous_id))
    }

    async fn save(
        &self,
        anonymous_id: &str,
        vocabulary_word_id: i64,
    ) -> Result<Option<SavedWordRecord>, ApiClientError> {
        self.check()?;
        if self.rejected.lock().unwrap().contains(&vocabulary_word_id) {
            return Err(ApiClientError::Rejected {
                status: 404,
                message: format!("Vocabulary word not found: {}", vocabulary_word_id),
            });
        }
        if self.failing.lock().unwrap().contains(&vocabulary_word_id) {
            return Err(offline());
        }
        let exists = self
            .rows(anonymous_id)
            .iter()
            .any(|r| r.word_id == vocabulary_word_id);
        if exists {
            return Ok(None);
        }

        let word = stored(vocabulary_word_id, &format!("word{}", vocabulary_word_id));
        let id = self.insert_row(anonymous_id, &word);
        Ok(Some(SavedWordRecord {
            id,
            anonymous_id: anonymous_id.to_string(),
            vocabulary_word_id,
            created_at: Utc::now(),
        }))
    }

    async fn delete(&self, saved_id: i64) -> Result<(), ApiClientError> {
        self.check()?;
        self.rows.lock().unwrap().retain(|r| r.id != saved_id);
        Ok(())
    }

    async fn clear(&self, anonymous_id: &str) -> Result<(), ApiClientError> {
        self.check()?;
        self.rows
            .lock()
            .unwrap()
            .retain(|r| r.anonymous_id != anonymous_id);
        Ok(())
    }
}

/// Generator handing out numbered batches and recording requests
pub struct FakeGenerator {
    pub requests: Mutex<Vec<VocabularyRequest>>,
    next_id: AtomicI64,
    fail: AtomicBool,
}

impl FakeGenerator {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn last_request(&self) -> Option<VocabularyRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl WordGenerator for FakeGenerator {
    async fn generate(
        &self,
        request: &VocabularyRequest,
    ) -> Result<Vec<StoredVocabularyWord>, ApiClientError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiClientError::Rejected {
                status: 500,
                message: "Failed to generate vocabulary: quota exceeded".to_string(),
            });
        }

        Ok((0..request.num_words)
            .map(|_| {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                stored(id, &format!("word{}", id))
            })
            .collect())
    }
}
