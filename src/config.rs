//! Server and client configuration
//!
//! Both configs load from an optional TOML file; environment variables take
//! precedence over the file, and built-in defaults fill anything left unset.

use std::env;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vocabulary::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::vocabulary::GeminiConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Could not determine data directory")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Base directory for everything VocabMaster keeps on disk
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|p| p.join("vocabmaster"))
        .ok_or(ConfigError::DataDirNotFound)
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| {
            log::warn!("Invalid {} value: {}", key, e);
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }
        }),
        None => Ok(None),
    }
}

fn read_file<T: for<'de> Deserialize<'de> + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            Ok(toml::from_str(&raw)?)
        }
        None => Ok(T::default()),
    }
}

/// Configuration for `vocabmaster-cli serve`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,
    pub port: u16,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Curated vocabulary JSON used to seed prompts
    pub curated_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let data_dir = default_data_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_path: data_dir.join("vocabmaster.db"),
            curated_path: data_dir.join("curated-vocabulary.json"),
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config: Self = read_file(path)?;
        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(host) = var("VOCABMASTER_HOST") {
            self.host = host;
        }
        if let Some(port) = parse_var("VOCABMASTER_PORT")? {
            self.port = port;
        }
        if let Some(db) = var("VOCABMASTER_DB") {
            self.database_path = PathBuf::from(db);
        }
        if let Some(curated) = var("VOCABMASTER_CURATED") {
            self.curated_path = PathBuf::from(curated);
        }
        if let Some(key) = var("GEMINI_API_KEY").or_else(|| var("GOOGLE_API_KEY")) {
            self.gemini_api_key = Some(key);
        }
        if let Some(model) = var("GEMINI_MODEL") {
            self.gemini_model = model;
        }

        if self.gemini_api_key.is_none() {
            log::warn!("GEMINI_API_KEY not set, generation requests will fail");
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.gemini_api_key.clone(),
            model: self.gemini_model.clone(),
            base_url: self.gemini_base_url.clone(),
        }
    }
}

/// Configuration for the client-side commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ClientConfig {
    /// Base URL of a running VocabMaster server
    pub server_url: String,
    /// File standing in for browser local storage
    pub storage_path: PathBuf,
    pub level: String,
    pub num_words: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let data_dir = default_data_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            storage_path: data_dir.join("local-storage.json"),
            level: crate::vocabulary::DEFAULT_LEVEL.to_string(),
            num_words: 6,
        }
    }
}

impl ClientConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config: Self = read_file(path)?;
        if let Some(url) = var("VOCABMASTER_SERVER") {
            config.server_url = url;
        }
        if let Some(path) = var("VOCABMASTER_STORAGE") {
            config.storage_path = PathBuf::from(path);
        }
        Ok(config)
    }
}
