//! Relational store for vocabulary words and per-user saved words.

mod store;

use thiserror::Error;

pub use store::VocabularyStore;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Vocabulary word not found: {0}")]
    WordNotFound(i64),
}

pub type Result<T> = std::result::Result<T, DbError>;
