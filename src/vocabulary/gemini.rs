//! Gemini-backed word source

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use super::curated::CuratedVocabulary;
use super::models::VocabularyWord;
use super::prompt::{build_prompt, LevelDistribution};
use super::{Result, VocabularyError};

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Placeholder for fields the model left out
const MISSING_FIELD: &str = "N/A";

/// Anything that can produce a batch of vocabulary words
#[async_trait]
pub trait WordSource: Send + Sync {
    async fn generate(
        &self,
        level: &str,
        num_words: usize,
        exclude_words: &[String],
    ) -> Result<Vec<VocabularyWord>>;
}

/// Settings for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
    curated: CuratedVocabulary,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig, curated: CuratedVocabulary) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            config: GeminiConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
            curated,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    fn request_body(prompt: &str) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "words": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "word": { "type": "STRING" },
                                    "pronunciation": { "type": "STRING" },
                                    "definition": { "type": "STRING" },
                                    "sentence": { "type": "STRING" }
                                },
                                "required": ["word", "pronunciation", "definition", "sentence"]
                            }
                        }
                    },
                    "required": ["words"]
                }
            }
        })
    }

    async fn generate_content(&self, api_key: &str, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&Self::request_body(prompt))
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(VocabularyError::Upstream {
                    status: response.status().as_u16(),
                    message: "Gemini rejected the API key".to_string(),
                });
            }
            status if !status.is_success() => {
                return Err(VocabularyError::Upstream {
                    status: status.as_u16(),
                    message: response.text().await.unwrap_or_default(),
                });
            }
            _ => {}
        }

        let body: GenerateContentResponse = response.json().await?;
        body.text().ok_or(VocabularyError::EmptyResponse)
    }
}

#[async_trait]
impl WordSource for GeminiClient {
    async fn generate(
        &self,
        level: &str,
        num_words: usize,
        exclude_words: &[String],
    ) -> Result<Vec<VocabularyWord>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(VocabularyError::MissingApiKey)?;

        let dist = LevelDistribution::for_count(num_words);
        let samples = self.curated.sample(dist.curated, exclude_words);
        let prompt = build_prompt(level, num_words, exclude_words, &samples);

        log::debug!(
            "Requesting {} words at {} ({} curated, {} excluded)",
            num_words,
            level,
            samples.len(),
            exclude_words.len()
        );

        let text = self.generate_content(api_key, &prompt).await.map_err(|e| {
            log::error!("Error generating vocabulary: {}", e);
            e
        })?;

        parse_words(&text, level)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Strip a surrounding markdown code fence, if any
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches("json");
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(MISSING_FIELD)
        .to_string()
}

/// Parse model output into vocabulary words
///
/// Accepts `{"words": [...]}` or a bare array. Missing fields become "N/A"
/// and every word is tagged with the requested level.
pub fn parse_words(text: &str, level: &str) -> Result<Vec<VocabularyWord>> {
    let text = strip_code_fence(text);
    if text.is_empty() {
        return Err(VocabularyError::EmptyResponse);
    }

    let data: Value = serde_json::from_str(text)?;
    let items = match &data {
        Value::Array(items) => items,
        Value::Object(obj) => match obj.get("words") {
            Some(Value::Array(items)) => items,
            _ => return Err(VocabularyError::InvalidFormat),
        },
        _ => return Err(VocabularyError::InvalidFormat),
    };

    Ok(items
        .iter()
        .map(|item| VocabularyWord {
            word: field(item, "word"),
            pronunciation: field(item, "pronunciation"),
            definition: field(item, "definition"),
            sentence: field(item, "sentence"),
            level: level.to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_words_object() {
        let text = r#"{"words":[{"word":"leverage","pronunciation":"ˋlɛvərɪdʒ","definition":"use to advantage","sentence":"We can leverage this."}]}"#;
        let words = parse_words(text, "B2").unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "leverage");
        assert_eq!(words[0].level, "B2");
    }

    #[test]
    fn test_parse_words_fills_missing_fields() {
        let text = r#"[{"word":"cadence"}, {"definition":"","sentence":"Hi."}]"#;
        let words = parse_words(text, "B1-C1").unwrap();
        assert_eq!(words[0].pronunciation, "N/A");
        assert_eq!(words[0].definition, "N/A");
        assert_eq!(words[1].word, "N/A");
        assert_eq!(words[1].definition, "N/A");
        assert_eq!(words[1].sentence, "Hi.");
    }

    #[test]
    fn test_parse_words_code_fence() {
        let text = "```json\n{\"words\": [{\"word\": \"roadmap\"}]}\n```";
        let words = parse_words(text, "B1-C1").unwrap();
        assert_eq!(words[0].word, "roadmap");
    }

    #[test]
    fn test_parse_words_rejects_bad_shapes() {
        assert!(matches!(parse_words("", "B1"), Err(VocabularyError::EmptyResponse)));
        assert!(matches!(
            parse_words(r#"{"items": []}"#, "B1"),
            Err(VocabularyError::InvalidFormat)
        ));
        assert!(matches!(parse_words("42", "B1"), Err(VocabularyError::InvalidFormat)));
        assert!(matches!(parse_words("not json", "B1"), Err(VocabularyError::Json(_))));
    }

    #[test]
    fn test_candidate_text_extraction() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"words\":" }, { "text": "[]}" }] } }]
        }))
        .unwrap();
        assert_eq!(body.text().as_deref(), Some("{\"words\":[]}"));

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.text().is_none());
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = GeminiClient::new(GeminiConfig::default(), CuratedVocabulary::default()).unwrap();
        let err = client.generate("B1-C1", 5, &[]).await.unwrap_err();
        assert!(matches!(err, VocabularyError::MissingApiKey));
    }
}
