//! Curated example words used to seed generation prompts
//!
//! The pool is a JSON array of `{word, sentence}` pairs mined from podcast
//! transcripts. A missing or unreadable file gives an empty pool and the
//! prompt falls back to asking for every word from scratch.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// A single curated word with the sentence it was taken from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedEntry {
    pub word: String,
    pub sentence: String,
}

/// In-memory pool of curated entries
#[derive(Debug, Clone, Default)]
pub struct CuratedVocabulary {
    entries: Vec<CuratedEntry>,
}

impl CuratedVocabulary {
    pub fn new(entries: Vec<CuratedEntry>) -> Self {
        Self { entries }
    }

    /// Load the pool from disk, treating any failure as an empty pool
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No curated vocabulary at {:?}, prompts will not be seeded", path);
            return Self::default();
        }

        let entries = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|raw| {
                serde_json::from_str::<Vec<CuratedEntry>>(&raw).map_err(|e| e.to_string())
            });

        match entries {
            Ok(entries) => {
                log::info!("Loaded {} curated vocabulary entries", entries.len());
                Self { entries }
            }
            Err(e) => {
                log::warn!("Ignoring curated vocabulary at {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pick up to `count` random entries whose word is not excluded
    ///
    /// Exclusion is case-insensitive.
    pub fn sample(&self, count: usize, exclude_words: &[String]) -> Vec<CuratedEntry> {
        if count == 0 {
            return Vec::new();
        }

        let excluded: HashSet<String> = exclude_words.iter().map(|w| w.to_lowercase()).collect();
        let pool: Vec<&CuratedEntry> = self
            .entries
            .iter()
            .filter(|e| !excluded.contains(&e.word.to_lowercase()))
            .collect();

        pool.choose_multiple(&mut rand::thread_rng(), count.min(pool.len()))
            .map(|e| (*e).clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(word: &str) -> CuratedEntry {
        CuratedEntry {
            word: word.to_string(),
            sentence: format!("We talked about {} a lot this quarter.", word),
        }
    }

    #[test]
    fn test_sample_respects_exclusions() {
        let pool = CuratedVocabulary::new(vec![entry("roadmap"), entry("leverage"), entry("cadence")]);
        let excluded = vec!["ROADMAP".to_string(), "cadence".to_string()];

        for _ in 0..10 {
            let picked = pool.sample(3, &excluded);
            assert_eq!(picked.len(), 1);
            assert_eq!(picked[0].word, "leverage");
        }
    }

    #[test]
    fn test_sample_caps_at_pool_size() {
        let pool = CuratedVocabulary::new(vec![entry("roadmap"), entry("leverage")]);
        assert_eq!(pool.sample(5, &[]).len(), 2);
        assert!(pool.sample(0, &[]).is_empty());
        assert!(CuratedVocabulary::default().sample(3, &[]).is_empty());
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let temp = TempDir::new().unwrap();
        let missing = CuratedVocabulary::load(&temp.path().join("nope.json"));
        assert!(missing.is_empty());

        let bad = temp.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(CuratedVocabulary::load(&bad).is_empty());

        let good = temp.path().join("good.json");
        fs::write(&good, serde_json::to_string(&vec![entry("roadmap")]).unwrap()).unwrap();
        assert_eq!(CuratedVocabulary::load(&good).len(), 1);
    }
}
