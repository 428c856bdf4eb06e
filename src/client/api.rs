//! HTTP client for the VocabMaster API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::saved_words::SavedWordsRemote;
use crate::vocabulary::{
    ApiResponse, SaveWordRequest, SavedWordRecord, SavedWordRow, StoredVocabularyWord,
    VocabularyRequest,
};

#[derive(Error, Debug)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },
    /// The server answered with `success: false`
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Response did not include any data")]
    MissingData,
    #[error("Unreadable response: {0}")]
    Decode(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, ApiClientError>;

impl ApiClientError {
    /// Whether sending the same request again could succeed
    ///
    /// Transport failures and 5xx answers are transient. A 4xx answer or a
    /// body that cannot be read will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiClientError::Http(_) => true,
            ApiClientError::Server { status, .. } | ApiClientError::Rejected { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            ApiClientError::MissingData
            | ApiClientError::Decode(_)
            | ApiClientError::InvalidUrl(_) => false,
        }
    }
}

/// Anything that can hand out freshly generated, persisted words
#[async_trait]
pub trait WordGenerator: Send + Sync {
    async fn generate(&self, request: &VocabularyRequest) -> Result<Vec<StoredVocabularyWord>>;
}

#[async_trait]
impl<T: WordGenerator + ?Sized> WordGenerator for std::sync::Arc<T> {
    async fn generate(&self, request: &VocabularyRequest) -> Result<Vec<StoredVocabularyWord>> {
        (**self).generate(request).await
    }
}

/// Client for the generation and saved-word endpoints
pub struct VocabularyClient {
    client: Client,
    base_url: String,
}

impl VocabularyClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiClientError::InvalidUrl(
                "URL must start with http:// or https://".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Unwrap the `{success, data, error}` envelope
async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<ApiResponse<T>> {
    let status = response.status();
    let text = response.text().await?;

    match serde_json::from_str::<ApiResponse<T>>(&text) {
        Ok(body) if body.success => Ok(body),
        Ok(body) => Err(ApiClientError::Rejected {
            status: status.as_u16(),
            message: body.error.unwrap_or_else(|| {
                format!("Request failed with status {}", status.as_u16())
            }),
        }),
        Err(_) if !status.is_success() => Err(ApiClientError::Server {
            status: status.as_u16(),
            message: text,
        }),
        Err(e) => Err(ApiClientError::Decode(e.to_string())),
    }
}

#[async_trait]
impl WordGenerator for VocabularyClient {
    async fn generate(&self, request: &VocabularyRequest) -> Result<Vec<StoredVocabularyWord>> {
        log::debug!(
            "Requesting {} words at {} ({} excluded)",
            request.num_words,
            request.level,
            request.exclude_words.len()
        );

        let response = self
            .client
            .post(self.url("api/vocabulary/generate"))
            .json(request)
            .send()
            .await?;

        read_envelope(response)
            .await?
            .data
            .ok_or(ApiClientError::MissingData)
    }
}

#[async_trait]
impl SavedWordsRemote for VocabularyClient {
    async fn fetch_saved(&self, anonymous_id: &str) -> Result<Vec<SavedWordRow>> {
        let response = self
            .client
            .get(self.url("api/saved-words"))
            .query(&[("anonymousId", anonymous_id)])
            .send()
            .await?;

        Ok(read_envelope(response).await?.data.unwrap_or_default())
    }

    async fn save(
        &self,
        anonymous_id: &str,
        vocabulary_word_id: i64,
    ) -> Result<Option<SavedWordRecord>> {
        let body = SaveWordRequest {
            anonymous_id: anonymous_id.to_string(),
            vocabulary_word_id,
        };
        let response = self
            .client
            .post(self.url("api/saved-words"))
            .json(&body)
            .send()
            .await?;

        Ok(read_envelope(response).await?.data)
    }

    async fn delete(&self, saved_id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("api/saved-words/{}", saved_id)))
            .send()
            .await?;

        read_envelope::<Value>(response).await.map(|_| ())
    }

    async fn clear(&self, anonymous_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url("api/saved-words"))
            .query(&[("anonymousId", anonymous_id)])
            .send()
            .await?;

        read_envelope::<Value>(response).await.map(|_| ())
    }
}
