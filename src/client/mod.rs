//! HTTP client for the trivia backend.
//!
//! All endpoint specifics are isolated here so backend URL changes are easy
//! to fix. Every request carries a `_t` cache-busting parameter because
//! some deployments sit behind caching intermediaries.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::normalize::{OverviewPayload, QuestionsPayload, RawMatch};

/// Errors from the trivia backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// This backend version does not ship the endpoint. An expected,
    /// displayable condition rather than a transient failure.
    #[error("endpoint not available on this backend")]
    Unavailable,

    #[error("unexpected payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Read-only view of the trivia backend, mockable for tests.
#[async_trait]
pub trait TriviaApi: Send + Sync {
    /// Aggregate statistics, either pre-summarized or as a raw question
    /// list depending on the backend version.
    async fn fetch_overview(&self) -> Result<OverviewPayload, ApiError>;

    /// Active match rosters. Returns [`ApiError::Unavailable`] on backends
    /// that predate the rooms endpoint.
    async fn fetch_active_matches(&self) -> Result<Vec<RawMatch>, ApiError>;

    /// Question catalog, optionally bounded by a result count.
    async fn fetch_questions(&self, limit: Option<u32>) -> Result<QuestionsPayload, ApiError>;
}

const OVERVIEW_PATH: &str = "trivia/questions/overview";
const ROOMS_PATH: &str = "trivia/rooms/active";
const QUESTIONS_PATH: &str = "trivia/questions";

/// Parse and normalize the backend base URL so joins keep its full path.
fn normalized_base(raw: &str) -> Result<Url, ApiError> {
    let mut base = Url::parse(raw).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
    if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
    }
    Ok(base)
}

/// HTTP implementation of [`TriviaApi`].
pub struct TriviaClient {
    client: Client,
    base_url: Url,
}

impl TriviaClient {
    pub fn new(base_url: &str, config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = normalized_base(base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("trivia-dash/0.1.0")),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// GET a JSON endpoint with the cache-busting parameter appended.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("_t", Utc::now().timestamp_millis().to_string())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::Unavailable);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl TriviaApi for TriviaClient {
    async fn fetch_overview(&self) -> Result<OverviewPayload, ApiError> {
        self.get_json(OVERVIEW_PATH, &[]).await
    }

    async fn fetch_active_matches(&self) -> Result<Vec<RawMatch>, ApiError> {
        self.get_json(ROOMS_PATH, &[]).await
    }

    async fn fetch_questions(&self, limit: Option<u32>) -> Result<QuestionsPayload, ApiError> {
        let mut query = Vec::new();
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.get_json(QUESTIONS_PATH, &query).await
    }
}

type MockQueue = Mutex<VecDeque<Result<serde_json::Value, ApiError>>>;

/// Canned API responses for tests. Each call pops the next queued response
/// for its endpoint; an exhausted queue reports a server error so a test
/// that over-fetches fails loudly instead of hanging on real data.
#[derive(Default)]
pub struct MockApi {
    overview: MockQueue,
    matches: MockQueue,
    questions: MockQueue,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_overview(&self, response: Result<serde_json::Value, ApiError>) {
        self.overview.lock().unwrap().push_back(response);
    }

    pub fn queue_matches(&self, response: Result<serde_json::Value, ApiError>) {
        self.matches.lock().unwrap().push_back(response);
    }

    pub fn queue_questions(&self, response: Result<serde_json::Value, ApiError>) {
        self.questions.lock().unwrap().push_back(response);
    }

    fn next<T: DeserializeOwned>(queue: &MockQueue) -> Result<T, ApiError> {
        let queued = queue.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(ApiError::Status {
                status: 500,
                message: "no queued mock response".to_string(),
            })
        });
        queued.and_then(|value| serde_json::from_value(value).map_err(ApiError::from))
    }
}

#[async_trait]
impl TriviaApi for MockApi {
    async fn fetch_overview(&self) -> Result<OverviewPayload, ApiError> {
        Self::next(&self.overview)
    }

    async fn fetch_active_matches(&self) -> Result<Vec<RawMatch>, ApiError> {
        Self::next(&self.matches)
    }

    async fn fetch_questions(&self, _limit: Option<u32>) -> Result<QuestionsPayload, ApiError> {
        Self::next(&self.questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalized_base_appends_slash() {
        let base = normalized_base("https://api.example.test/v1").unwrap();
        assert_eq!(base.path(), "/v1/");

        let joined = base.join(QUESTIONS_PATH).unwrap();
        assert_eq!(joined.path(), "/v1/trivia/questions");
    }

    #[test]
    fn test_normalized_base_keeps_existing_slash() {
        let base = normalized_base("https://api.example.test/").unwrap();
        assert_eq!(base.path(), "/");
    }

    #[test]
    fn test_normalized_base_rejects_garbage() {
        assert!(matches!(
            normalized_base("railway"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_client_builds_from_config() {
        let config = ClientConfig::default();
        assert!(TriviaClient::new("https://api.example.test", &config).is_ok());
    }

    #[test]
    fn test_mock_pops_in_order() {
        let mock = MockApi::new();
        mock.queue_questions(Ok(json!([{"text": "first"}])));
        mock.queue_questions(Ok(json!([{"text": "second"}])));

        tokio_test::block_on(async {
            let first = mock.fetch_questions(None).await.unwrap();
            let second = mock.fetch_questions(None).await.unwrap();
            assert_eq!(crate::normalize::normalize_questions(first)[0].text, "first");
            assert_eq!(
                crate::normalize::normalize_questions(second)[0].text,
                "second"
            );
        });
    }

    #[tokio::test]
    async fn test_mock_exhausted_queue_errors() {
        let mock = MockApi::new();
        let err = mock.fetch_overview().await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_mock_decode_failure_surfaces() {
        let mock = MockApi::new();
        mock.queue_matches(Ok(json!("not a list")));
        let err = mock.fetch_active_matches().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Status {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
        assert_eq!(
            ApiError::Unavailable.to_string(),
            "endpoint not available on this backend"
        );
    }
}
