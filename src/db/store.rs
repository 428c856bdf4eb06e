//! SQLite store for generated and saved vocabulary words

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{DbError, Result};
use crate::vocabulary::{SavedWordRecord, SavedWordRow, StoredVocabularyWord, VocabularyWord};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS vocabulary_words (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    word TEXT NOT NULL,
    pronunciation TEXT NOT NULL,
    definition TEXT NOT NULL,
    sentence TEXT NOT NULL,
    level TEXT NOT NULL DEFAULT 'B1-C1'
);

CREATE TABLE IF NOT EXISTS saved_words (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    anonymous_id TEXT NOT NULL,
    vocabulary_word_id INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (vocabulary_word_id) REFERENCES vocabulary_words(id) ON DELETE CASCADE,
    UNIQUE (anonymous_id, vocabulary_word_id)
);

CREATE INDEX IF NOT EXISTS idx_saved_words_anonymous_id ON saved_words(anonymous_id);
"#;

/// Relational store behind the HTTP API
pub struct VocabularyStore {
    conn: Connection,
}

fn parse_timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl VocabularyStore {
    /// Open (or create) the store at the given path
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(db_path)?)
    }

    /// In-memory store, used by tests and throwaway servers
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Insert a generated batch and return the rows with their ids
    pub fn insert_words(&mut self, words: Vec<VocabularyWord>) -> Result<Vec<StoredVocabularyWord>> {
        let tx = self.conn.transaction()?;
        let mut stored = Vec::with_capacity(words.len());

        {
            let mut stmt = tx.prepare(
                "INSERT INTO vocabulary_words (word, pronunciation, definition, sentence, level) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for word in words {
                stmt.execute(params![
                    word.word,
                    word.pronunciation,
                    word.definition,
                    word.sentence,
                    word.level,
                ])?;
                stored.push(StoredVocabularyWord::from_word(tx.last_insert_rowid(), word));
            }
        }

        tx.commit()?;
        Ok(stored)
    }

    /// Get a single vocabulary word
    pub fn get_word(&self, id: i64) -> Result<StoredVocabularyWord> {
        self.conn
            .query_row(
                "SELECT id, word, pronunciation, definition, sentence, level FROM vocabulary_words WHERE id = ?1",
                params![id],
                |row| {
                    Ok(StoredVocabularyWord {
                        id: row.get(0)?,
                        word: row.get(1)?,
                        pronunciation: row.get(2)?,
                        definition: row.get(3)?,
                        sentence: row.get(4)?,
                        level: row.get(5)?,
                    })
                },
            )
            .optional()?
            .ok_or(DbError::WordNotFound(id))
    }

    /// List saved words for an anonymous id, oldest first
    pub fn list_saved(&self, anonymous_id: &str) -> Result<Vec<SavedWordRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.id, s.anonymous_id, s.created_at, v.id, v.word, v.pronunciation, v.definition, v.sentence, v.level
            FROM saved_words s
            INNER JOIN vocabulary_words v ON s.vocabulary_word_id = v.id
            WHERE s.anonymous_id = ?1
            ORDER BY s.id
            "#,
        )?;

        let rows = stmt
            .query_map(params![anonymous_id], |row| {
                Ok(SavedWordRow {
                    id: row.get(0)?,
                    anonymous_id: row.get(1)?,
                    created_at: parse_timestamp(row, 2)?,
                    word_id: row.get(3)?,
                    word: row.get(4)?,
                    pronunciation: row.get(5)?,
                    definition: row.get(6)?,
                    sentence: row.get(7)?,
                    level: row.get(8)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Word strings saved by an anonymous id
    pub fn saved_word_strings(&self, anonymous_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT v.word
            FROM saved_words s
            INNER JOIN vocabulary_words v ON s.vocabulary_word_id = v.id
            WHERE s.anonymous_id = ?1
            ORDER BY s.id
            "#,
        )?;

        let words = stmt
            .query_map(params![anonymous_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(words)
    }

    /// Save a word for an anonymous id
    ///
    /// Returns `None` when the pair is already saved.
    pub fn insert_saved(
        &mut self,
        anonymous_id: &str,
        vocabulary_word_id: i64,
    ) -> Result<Option<SavedWordRecord>> {
        // Surfaces a missing word as a typed error instead of a constraint failure
        self.get_word(vocabulary_word_id)?;

        let created_at = Utc::now();
        let inserted = self.conn.execute(
            r#"
            INSERT INTO saved_words (anonymous_id, vocabulary_word_id, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (anonymous_id, vocabulary_word_id) DO NOTHING
            "#,
            params![anonymous_id, vocabulary_word_id, created_at.to_rfc3339()],
        )?;

        if inserted == 0 {
            return Ok(None);
        }

        Ok(Some(SavedWordRecord {
            id: self.conn.last_insert_rowid(),
            anonymous_id: anonymous_id.to_string(),
            vocabulary_word_id,
            created_at,
        }))
    }

    /// Delete a saved word by its row id; unknown ids are ignored
    pub fn delete_saved(&mut self, id: i64) -> Result<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM saved_words WHERE id = ?1", params![id])?)
    }

    /// Delete every saved word of an anonymous id
    pub fn clear_saved(&mut self, anonymous_id: &str) -> Result<usize> {
        Ok(self.conn.execute(
            "DELETE FROM saved_words WHERE anonymous_id = ?1",
            params![anonymous_id],
        )?)
    }
}
