//! Google Gemini provider implementing [`CompletionProvider`].
//!
//! Uses the `generateContent` endpoint of `generativelanguage.googleapis.com`
//! with the API key sent in the `x-goog-api-key` header. One request per
//! chat turn, no streaming and no retries.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, instrument, warn};

use crate::provider::{CompletionProvider, CompletionResult, GenerationParams};

use super::types::{
    API_KEY_HEADER, DEFAULT_API_KEY_BASE_URL, GenerateContentRequest, GenerateContentResponse,
    GoogleConfig, parse_api_error,
};

/// Google Gemini completion provider.
pub struct GoogleProvider {
    /// Provider configuration.
    config: GoogleConfig,
    /// HTTP client (reused across requests).
    client: reqwest::Client,
}

impl GoogleProvider {
    /// Create a new Google provider.
    #[must_use]
    pub fn new(config: GoogleConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Create a new Google provider with a shared HTTP client.
    #[must_use]
    pub fn with_client(config: GoogleConfig, client: reqwest::Client) -> Self {
        info!(
            model = %config.model,
            custom_base_url = config.base_url.is_some(),
            timeout = ?config.timeout,
            "Google provider initialized"
        );
        Self { config, client }
    }

    /// Get the API URL for a given action.
    fn get_api_url(&self, action: &str) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_KEY_BASE_URL)
            .trim_end_matches('/');
        format!("{base}/models/{}:{action}", self.config.model)
    }
}

#[async_trait]
impl CompletionProvider for GoogleProvider {
    fn model(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip_all, fields(model = %self.config.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> CompletionResult<String> {
        let body = GenerateContentRequest::from_prompt(prompt, params);

        let mut request = self
            .client
            .post(self.get_api_url("generateContent"))
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body);
        if let Some(timeout) = self.config.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let err = parse_api_error(status.as_u16(), &error_text);
            warn!(status = status.as_u16(), category = err.category(), "Gemini request failed");
            return Err(err);
        }

        let data: GenerateContentResponse = response.json().await?;
        let text = data.into_text()?;
        debug!(response_len = text.len(), "Gemini completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::provider::CompletionError;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/models/gemini-1.5-flash:generateContent";

    fn provider_for(server: &MockServer) -> GoogleProvider {
        GoogleProvider::new(GoogleConfig {
            base_url: Some(server.uri()),
            ..GoogleConfig::new("test-key")
        })
    }

    #[test]
    fn api_url_default_base() {
        let p = GoogleProvider::new(GoogleConfig::new("k"));
        assert_eq!(
            p.get_api_url("generateContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn api_url_trims_trailing_slash() {
        let p = GoogleProvider::new(GoogleConfig {
            base_url: Some("http://localhost:1/".into()),
            ..GoogleConfig::new("k")
        });
        assert_eq!(
            p.get_api_url("generateContent"),
            "http://localhost:1/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn model_accessor() {
        let p = GoogleProvider::new(GoogleConfig::new("k"));
        assert_eq!(p.model(), "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn complete_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "\nUser: 안녕\nAssistant:"}]}],
                "generationConfig": {"candidateCount": 1, "stopSequences": ["\n"], "temperature": 0.7}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "반가워요!"}]},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider_for(&server)
            .complete("\nUser: 안녕\nAssistant:", &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(text, "반가워요!");
    }

    #[tokio::test]
    async fn complete_maps_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete("x", &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Api { status: 400, .. }));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn complete_maps_quota_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete("x", &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn complete_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete("x", &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Http(_)));
    }

    #[tokio::test]
    async fn complete_times_out_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(2))
                    .set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(GoogleConfig {
            base_url: Some(server.uri()),
            timeout: Some(Duration::from_millis(100)),
            ..GoogleConfig::new("test-key")
        });
        let err = provider
            .complete("x", &GenerationParams::default())
            .await
            .unwrap_err();
        match err {
            CompletionError::Http(e) => assert!(e.is_timeout()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_refused_is_http_error() {
        let provider = GoogleProvider::new(GoogleConfig {
            base_url: Some("http://127.0.0.1:9".into()),
            ..GoogleConfig::new("k")
        });
        let err = provider
            .complete("x", &GenerationParams::default())
            .await
            .unwrap_err();
        assert_eq!(err.category(), "network");
    }

    #[tokio::test]
    async fn network_errors_do_not_reveal_api_key() {
        let provider = GoogleProvider::new(GoogleConfig {
            base_url: Some("http://127.0.0.1:9".into()),
            ..GoogleConfig::new("SECRET-API-KEY")
        });
        let err = provider
            .complete("x", &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Http(_)));
        assert!(!err.to_string().contains("SECRET-API-KEY"));
        assert!(!format!("{err:?}").contains("SECRET-API-KEY"));
    }

    #[tokio::test]
    async fn api_key_stays_out_of_query_string() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })))
            .mount(&server)
            .await;

        let _ = provider_for(&server)
            .complete("x", &GenerationParams::default())
            .await
            .unwrap();
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.query().is_none());
        assert_eq!(
            requests[0].headers.get("x-goog-api-key").unwrap(),
            "test-key"
        );
    }
}
