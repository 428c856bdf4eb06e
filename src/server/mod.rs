//! HTTP API that proxies word generation and stores saved words.

mod error;
mod routes;
mod state;

use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;

pub use error::ApiError;
pub use routes::merge_exclusions;
pub use state::AppState;

/// Build the API router over the given state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/vocabulary/generate", post(routes::generate_handler))
        .route(
            "/api/saved-words",
            get(routes::list_saved_handler)
                .post(routes::save_word_handler)
                .delete(routes::clear_saved_handler),
        )
        .route("/api/saved-words/{id}", delete(routes::delete_saved_handler))
        .layer(cors)
        .with_state(state)
}

/// Run the API server until Ctrl+C or SIGTERM.
pub async fn start_server(
    config: &ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = AppState::from_config(config)?;
    let app = router(state);

    let address = config.address();
    let listener = TcpListener::bind(&address).await?;
    log::info!("VocabMaster server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::db::VocabularyStore;
    use crate::vocabulary::{VocabularyError, VocabularyWord, WordSource};

    /// Word source that returns canned words and records what it was asked
    #[derive(Default)]
    struct FakeSource {
        words: Vec<&'static str>,
        fail: bool,
        seen_exclusions: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl WordSource for FakeSource {
        async fn generate(
            &self,
            level: &str,
            num_words: usize,
            exclude_words: &[String],
        ) -> crate::vocabulary::Result<Vec<VocabularyWord>> {
            self.seen_exclusions.lock().unwrap().push(exclude_words.to_vec());
            if self.fail {
                return Err(VocabularyError::EmptyResponse);
            }
            Ok(self
                .words
                .iter()
                .take(num_words)
                .map(|w| VocabularyWord {
                    word: w.to_string(),
                    pronunciation: "N/A".to_string(),
                    definition: format!("definition of {}", w),
                    sentence: format!("Sentence with {}.", w),
                    level: level.to_string(),
                })
                .collect())
        }
    }

    fn app(source: Arc<FakeSource>) -> Router {
        let store = VocabularyStore::open_in_memory().unwrap();
        router(AppState::new(store, source))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_generate_stores_and_normalizes_words() {
        let source = Arc::new(FakeSource {
            words: vec!["Leverage", "cadence"],
            ..Default::default()
        });
        let app = app(source);

        let (status, body) = send(
            &app,
            "POST",
            "/api/vocabulary/generate",
            Some(json!({ "level": "B2", "numWords": 2 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["word"], "leverage");
        assert_eq!(data[0]["level"], "B2");
        assert!(data[0]["id"].as_i64().is_some());
    }

    #[tokio::test]
    async fn test_generate_rejects_out_of_range_count() {
        let app = app(Arc::new(FakeSource::default()));
        let (status, body) = send(
            &app,
            "POST",
            "/api/vocabulary/generate",
            Some(json!({ "numWords": 21 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("numWords"));
    }

    #[tokio::test]
    async fn test_generate_failure_is_reported() {
        let source = Arc::new(FakeSource {
            fail: true,
            ..Default::default()
        });
        let app = app(source);
        let (status, body) = send(&app, "POST", "/api/vocabulary/generate", Some(json!({}))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("Empty response"));
    }

    #[tokio::test]
    async fn test_saved_words_are_merged_into_exclusions() {
        let source = Arc::new(FakeSource {
            words: vec!["leverage", "cadence"],
            ..Default::default()
        });
        let app = app(Arc::clone(&source));

        let (_, body) = send(
            &app,
            "POST",
            "/api/vocabulary/generate",
            Some(json!({ "numWords": 2 })),
        )
        .await;
        let word_id = body["data"][0]["id"].as_i64().unwrap();

        send(
            &app,
            "POST",
            "/api/saved-words",
            Some(json!({ "anonymousId": "anon-1", "vocabularyWordId": word_id })),
        )
        .await;

        send(
            &app,
            "POST",
            "/api/vocabulary/generate",
            Some(json!({ "numWords": 2, "excludeWords": ["LEVERAGE", "roadmap"], "anonymousId": "anon-1" })),
        )
        .await;

        let seen = source.seen_exclusions.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].is_empty());
        // "leverage" is already excluded case-insensitively, so it is not added twice
        assert_eq!(seen[1], vec!["LEVERAGE", "roadmap"]);
    }

    #[tokio::test]
    async fn test_saved_word_lifecycle() {
        let source = Arc::new(FakeSource {
            words: vec!["leverage", "cadence"],
            ..Default::default()
        });
        let app = app(source);

        let (_, body) = send(
            &app,
            "POST",
            "/api/vocabulary/generate",
            Some(json!({ "numWords": 2 })),
        )
        .await;
        let first = body["data"][0]["id"].as_i64().unwrap();
        let second = body["data"][1]["id"].as_i64().unwrap();

        let save = |id: i64| json!({ "anonymousId": "anon-1", "vocabularyWordId": id });

        let (status, body) = send(&app, "POST", "/api/saved-words", Some(save(first))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["vocabularyWordId"], first);

        let (status, body) = send(&app, "POST", "/api/saved-words", Some(save(first))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["data"].is_null());

        send(&app, "POST", "/api/saved-words", Some(save(second))).await;

        let (status, body) = send(&app, "GET", "/api/saved-words?anonymousId=anon-1", None).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body["data"].as_array().unwrap().clone();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["word"], "leverage");
        assert_eq!(rows[0]["wordId"], first);

        let row_id = rows[0]["id"].as_i64().unwrap();
        let (status, body) = send(&app, "DELETE", &format!("/api/saved-words/{}", row_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (_, body) = send(&app, "GET", "/api/saved-words?anonymousId=anon-1", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "DELETE", "/api/saved-words?anonymousId=anon-1", None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&app, "GET", "/api/saved-words?anonymousId=anon-1", None).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_requests() {
        let app = app(Arc::new(FakeSource::default()));

        let (status, body) = send(&app, "DELETE", "/api/saved-words/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid id");

        let (status, body) = send(&app, "GET", "/api/saved-words", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = send(
            &app,
            "POST",
            "/api/saved-words",
            Some(json!({ "anonymousId": "anon-1", "vocabularyWordId": 42 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
