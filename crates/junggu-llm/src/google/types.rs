//! Gemini API types and configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::provider::{CompletionError, CompletionResult, GenerationParams};

/// Default API base URL for API-key authentication.
pub const DEFAULT_API_KEY_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Google provider configuration.
#[derive(Clone, Debug)]
pub struct GoogleConfig {
    /// Model ID (e.g., `gemini-1.5-flash`).
    pub model: String,
    /// API key.
    pub api_key: String,
    /// Base URL override.
    pub base_url: Option<String>,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl GoogleConfig {
    /// Config for the default model with `api_key`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            base_url: None,
            timeout: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request types
// ─────────────────────────────────────────────────────────────────────────────

/// Content message in Gemini API format.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    /// The role (`user` or `model`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// A content part. Only text parts are used here.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GeminiPart {
    /// The text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Generation config for the Gemini API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Number of candidates.
    pub candidate_count: u32,
    /// Stop sequences.
    pub stop_sequences: Vec<String>,
    /// Temperature.
    pub temperature: f64,
}

impl From<&GenerationParams> for GenerationConfig {
    fn from(p: &GenerationParams) -> Self {
        Self {
            candidate_count: p.candidate_count,
            stop_sequences: p.stop_sequences.clone(),
            temperature: p.temperature,
        }
    }
}

/// `generateContent` request body.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation contents (a single user message here).
    pub contents: Vec<GeminiContent>,
    /// Generation settings.
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Single-message request carrying `prompt`.
    pub fn from_prompt(prompt: &str, params: &GenerationParams) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: params.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response types
// ─────────────────────────────────────────────────────────────────────────────

/// `generateContent` response body.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Response candidates.
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    /// Prompt-level feedback (set when the prompt itself was blocked).
    pub prompt_feedback: Option<PromptFeedback>,
}

/// A response candidate.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    /// The content of this candidate.
    pub content: Option<GeminiContent>,
    /// Finish reason (e.g., `STOP`, `MAX_TOKENS`, `SAFETY`).
    pub finish_reason: Option<String>,
}

/// Prompt feedback.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Why the prompt was blocked.
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    pub fn into_text(self) -> CompletionResult<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(CompletionError::Blocked { reason });
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(CompletionError::EmptyResponse);
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return match candidate.finish_reason.as_deref() {
                Some(reason @ ("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")) => {
                    Err(CompletionError::Blocked {
                        reason: reason.to_string(),
                    })
                }
                _ => Err(CompletionError::EmptyResponse),
            };
        }
        Ok(text)
    }
}

/// Error envelope returned with non-2xx statuses.
#[derive(Clone, Debug, Deserialize)]
pub struct GeminiErrorEnvelope {
    /// The error.
    pub error: GeminiApiError,
}

/// Error details.
#[derive(Clone, Debug, Deserialize)]
pub struct GeminiApiError {
    /// Numeric code.
    #[serde(default)]
    pub code: u16,
    /// Message.
    #[serde(default)]
    pub message: String,
    /// Status string (e.g., `RESOURCE_EXHAUSTED`).
    pub status: Option<String>,
}

/// Map a non-2xx response to a [`CompletionError`].
pub fn parse_api_error(status: u16, body: &str) -> CompletionError {
    let parsed = serde_json::from_str::<GeminiErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    if status == 429 {
        return CompletionError::RateLimited { message };
    }

    CompletionError::Api {
        status,
        message,
        code: parsed.and_then(|e| e.error.status),
    }
}
