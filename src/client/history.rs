//! Rolling history of words already shown to the user

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::storage::{read_json, write_json, KeyValueStorage, Result};

pub const WORD_HISTORY_KEY: &str = "vocabmaster_word_history";

/// Generations after which the history shrinks back to the latest batch
pub const RESET_INTERVAL: u32 = 5;

/// Words to keep out of the next generation request
///
/// Each successful generation adds its words. On every fifth generation the
/// set is replaced by that generation's words alone, so older words may come
/// back for reinforcement while the batch just shown still does not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordHistory {
    words: BTreeSet<String>,
    generation_count: u32,
}

impl WordHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the words returned by a successful generation
    pub fn record_generation<S: AsRef<str>>(&mut self, words: &[S]) {
        let latest = words.iter().map(|w| w.as_ref().to_lowercase());
        self.generation_count += 1;

        if self.generation_count >= RESET_INTERVAL {
            self.words = latest.collect();
            self.generation_count = 0;
            log::debug!("Word history rolled over to {} words", self.words.len());
        } else {
            self.words.extend(latest);
        }
    }

    /// Current exclusion list, sorted
    pub fn exclusions(&self) -> Vec<String> {
        self.words.iter().cloned().collect()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn generation_count(&self) -> u32 {
        self.generation_count
    }

    /// Forget everything
    pub fn reset(&mut self) {
        self.words.clear();
        self.generation_count = 0;
    }

    /// Load persisted history; missing or malformed data gives an empty one
    pub fn load(storage: &dyn KeyValueStorage) -> Self {
        read_json(storage, WORD_HISTORY_KEY).unwrap_or_default()
    }

    pub fn save(&self, storage: &dyn KeyValueStorage) -> Result<()> {
        write_json(storage, WORD_HISTORY_KEY, self)
    }
}
