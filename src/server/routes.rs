use std::collections::HashSet;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use crate::vocabulary::{
    normalize_word, Ack, AnonymousQuery, ApiResponse, SaveWordRequest, SavedWordRecord,
    SavedWordRow, StoredVocabularyWord, VocabularyRequest, VocabularyWord,
};

use super::error::ApiError;
use super::state::AppState;

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(v)| v)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

fn anonymous_id(query: Result<Query<AnonymousQuery>, QueryRejection>) -> Result<String, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if query.anonymous_id.trim().is_empty() {
        return Err(ApiError::BadRequest("anonymousId must not be empty".to_string()));
    }
    Ok(query.anonymous_id)
}

/// Append `extra` to `exclude`, skipping case-insensitive duplicates
pub fn merge_exclusions(exclude: &mut Vec<String>, extra: Vec<String>) {
    let mut seen: HashSet<String> = exclude.iter().map(|w| w.to_lowercase()).collect();
    for word in extra {
        if seen.insert(word.to_lowercase()) {
            exclude.push(word);
        }
    }
}

/// `POST /api/vocabulary/generate`
pub async fn generate_handler(
    State(state): State<AppState>,
    body: Result<Json<VocabularyRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<StoredVocabularyWord>>>, ApiError> {
    let request = json_body(body)?;
    request.validate()?;

    let mut exclude_words = request.exclude_words;
    if let Some(anonymous_id) = request.anonymous_id.as_deref().filter(|id| !id.is_empty()) {
        let saved = state.store()?.saved_word_strings(anonymous_id)?;
        merge_exclusions(&mut exclude_words, saved);
    }

    let vocabulary = state
        .source
        .generate(&request.level, request.num_words as usize, &exclude_words)
        .await?;

    let rows: Vec<VocabularyWord> = vocabulary
        .into_iter()
        .map(|v| VocabularyWord {
            word: normalize_word(&v.word),
            level: if v.level.is_empty() { request.level.clone() } else { v.level },
            ..v
        })
        .collect();

    let inserted = state.store()?.insert_words(rows)?;
    log::info!("Generated {} words at {}", inserted.len(), request.level);

    Ok(Json(ApiResponse::ok(inserted)))
}

/// `GET /api/saved-words?anonymousId=...`
pub async fn list_saved_handler(
    State(state): State<AppState>,
    query: Result<Query<AnonymousQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<SavedWordRow>>>, ApiError> {
    let anonymous_id = anonymous_id(query)?;
    let rows = state.store()?.list_saved(&anonymous_id)?;
    Ok(Json(ApiResponse::ok(rows)))
}

/// `POST /api/saved-words`
///
/// Saving an already saved word is not an error; `data` is `null` instead.
pub async fn save_word_handler(
    State(state): State<AppState>,
    body: Result<Json<SaveWordRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<SavedWordRecord>>), ApiError> {
    let payload = json_body(body)?;
    if payload.anonymous_id.trim().is_empty() {
        return Err(ApiError::BadRequest("anonymousId must not be empty".to_string()));
    }

    let inserted = state
        .store()?
        .insert_saved(&payload.anonymous_id, payload.vocabulary_word_id)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data: inserted,
            error: None,
        }),
    ))
}

/// `DELETE /api/saved-words/{id}`
pub async fn delete_saved_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ack>, ApiError> {
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid id".to_string()))?;

    state.store()?.delete_saved(id)?;
    Ok(Json(Ack::ok()))
}

/// `DELETE /api/saved-words?anonymousId=...`
pub async fn clear_saved_handler(
    State(state): State<AppState>,
    query: Result<Query<AnonymousQuery>, QueryRejection>,
) -> Result<Json<Ack>, ApiError> {
    let anonymous_id = anonymous_id(query)?;
    let removed = state.store()?.clear_saved(&anonymous_id)?;
    log::info!("Cleared {} saved words for {}", removed, anonymous_id);
    Ok(Json(Ack::ok()))
}
