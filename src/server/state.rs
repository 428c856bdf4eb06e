use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::ServerConfig;
use crate::db::VocabularyStore;
use crate::vocabulary::{CuratedVocabulary, GeminiClient, WordSource};

use super::error::ApiError;

/// Server state shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<VocabularyStore>>,
    pub source: Arc<dyn WordSource>,
}

impl AppState {
    pub fn new(store: VocabularyStore, source: Arc<dyn WordSource>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            source,
        }
    }

    /// Build the production state: on-disk store plus the Gemini client.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ApiError> {
        let store = VocabularyStore::open(&config.database_path)?;
        let curated = CuratedVocabulary::load(&config.curated_path);
        let gemini = GeminiClient::new(config.gemini(), curated)?;

        log::info!("Using word store at {:?}", config.database_path);
        Ok(Self::new(store, Arc::new(gemini)))
    }

    /// Lock the store. Callers must drop the guard before awaiting.
    pub fn store(&self) -> Result<MutexGuard<'_, VocabularyStore>, ApiError> {
        self.store
            .lock()
            .map_err(|e| ApiError::Internal(format!("Failed to acquire store lock: {}", e)))
    }
}
