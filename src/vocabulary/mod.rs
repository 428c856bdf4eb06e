//! Vocabulary generation for VocabMaster
//!
//! This module provides:
//! - Wire models shared by the server and the client
//! - Curated example sampling for prompt seeding
//! - Prompt construction with level distribution and exclusions
//! - The Gemini word source and response parsing

pub mod curated;
pub mod gemini;
pub mod models;
pub mod prompt;

use thiserror::Error;

pub use curated::{CuratedEntry, CuratedVocabulary};
pub use gemini::{parse_words, GeminiClient, GeminiConfig, WordSource};
pub use models::*;

#[derive(Error, Debug)]
pub enum VocabularyError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("GEMINI_API_KEY or GOOGLE_API_KEY environment variable is required")]
    MissingApiKey,

    #[error("Failed to generate vocabulary: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to generate vocabulary: Gemini returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Failed to generate vocabulary: Empty response from Gemini API")]
    EmptyResponse,

    #[error("Failed to generate vocabulary: Invalid response format from Gemini API")]
    InvalidFormat,

    #[error("Failed to generate vocabulary: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VocabularyError>;
