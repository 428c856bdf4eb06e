//! Data models shared by the word source, the server and the client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::VocabularyError;

/// Level used when a request does not name one
pub const DEFAULT_LEVEL: &str = "B1-C1";

/// Number of words generated when a request does not say
pub const DEFAULT_NUM_WORDS: u32 = 10;

/// Upper bound on words per generation request
pub const MAX_NUM_WORDS: u32 = 20;

/// A word produced by the word source, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyWord {
    pub word: String,
    pub pronunciation: String,
    pub definition: String,
    pub sentence: String,
    pub level: String,
}

/// A row of `vocabulary_words`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredVocabularyWord {
    pub id: i64,
    pub word: String,
    pub pronunciation: String,
    pub definition: String,
    pub sentence: String,
    #[serde(default = "default_level")]
    pub level: String,
}

impl StoredVocabularyWord {
    pub fn from_word(id: i64, word: VocabularyWord) -> Self {
        Self {
            id,
            word: word.word,
            pronunciation: word.pronunciation,
            definition: word.definition,
            sentence: word.sentence,
            level: word.level,
        }
    }
}

fn default_level() -> String {
    DEFAULT_LEVEL.to_string()
}

fn default_num_words() -> u32 {
    DEFAULT_NUM_WORDS
}

/// Body of `POST /api/vocabulary/generate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyRequest {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_num_words")]
    pub num_words: u32,
    #[serde(default)]
    pub exclude_words: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous_id: Option<String>,
}

impl Default for VocabularyRequest {
    fn default() -> Self {
        Self {
            level: default_level(),
            num_words: default_num_words(),
            exclude_words: Vec::new(),
            anonymous_id: None,
        }
    }
}

impl VocabularyRequest {
    /// Check the request bounds before any work is done for it
    pub fn validate(&self) -> Result<(), VocabularyError> {
        if self.num_words < 1 || self.num_words > MAX_NUM_WORDS {
            return Err(VocabularyError::InvalidRequest(format!(
                "numWords must be between 1 and {}, got {}",
                MAX_NUM_WORDS, self.num_words
            )));
        }
        if self.level.trim().is_empty() {
            return Err(VocabularyError::InvalidRequest(
                "level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A `saved_words` row joined with the word it points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWordRow {
    pub id: i64,
    pub anonymous_id: String,
    pub created_at: DateTime<Utc>,
    pub word_id: i64,
    pub word: String,
    pub pronunciation: String,
    pub definition: String,
    pub sentence: String,
    pub level: String,
}

/// A bare `saved_words` row, as returned by an insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWordRecord {
    pub id: i64,
    pub anonymous_id: String,
    pub vocabulary_word_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/saved-words`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveWordRequest {
    pub anonymous_id: String,
    pub vocabulary_word_id: i64,
}

/// Query string carrying the anonymous id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousQuery {
    pub anonymous_id: String,
}

/// Envelope used by every API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// A `{success}` response without a payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }
}

/// Lowercase the first character of a generated word
///
/// Gemini tends to capitalize words at the start of its list; proper nouns
/// past the first character are left alone.
pub fn normalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
