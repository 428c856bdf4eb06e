use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use vocabmaster_lib::client::{JsonFileStorage, VocabularyClient, VocabularySession};
use vocabmaster_lib::config::ClientConfig;

pub type Session = VocabularySession<Arc<VocabularyClient>, Arc<VocabularyClient>, JsonFileStorage>;

/// Shared application state for client commands
pub struct App {
    pub config: ClientConfig,
    pub session: Session,
}

impl App {
    /// Open the session from local storage without contacting the server
    pub fn open(config_path: Option<&Path>) -> Result<Self> {
        Self::build(config_path, None, None)
    }

    /// Open the session and reconcile saved words with the server
    ///
    /// An unreachable server is not fatal: the session falls back to the
    /// local cache and records an "Offline" notification.
    pub async fn connect(
        config_path: Option<&Path>,
        level: Option<String>,
        count: Option<u32>,
    ) -> Result<Self> {
        let mut app = Self::build(config_path, level, count)?;
        if let Err(e) = app.session.load().await {
            log::warn!("Continuing with local saved words: {}", e);
        }
        Ok(app)
    }

    fn build(config_path: Option<&Path>, level: Option<String>, count: Option<u32>) -> Result<Self> {
        let mut config = ClientConfig::load(config_path).context("Failed to load config")?;
        if let Some(level) = level {
            config.level = level;
        }
        if let Some(count) = count {
            config.num_words = count;
        }

        let client = Arc::new(
            VocabularyClient::new(&config.server_url)
                .with_context(|| format!("Invalid server URL '{}'", config.server_url))?,
        );
        let storage = Arc::new(JsonFileStorage::open(config.storage_path.clone()));
        log::debug!("Using local storage at {:?}", config.storage_path);

        let session = VocabularySession::new(
            Arc::clone(&client),
            client,
            storage,
            config.level.clone(),
            config.num_words,
        )
        .context("Failed to open local storage")?;

        Ok(Self { config, session })
    }
}
