//! # Completion Provider Trait
//!
//! Core abstraction for the text-generation collaborator. The chat state
//! machine only sees [`CompletionProvider`]; the Gemini client and the test
//! mock both implement it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type alias for completion operations.
pub type CompletionResult<T> = Result<T, CompletionError>;

/// Anything that can go wrong while asking for a completion.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// HTTP request failed. The request URL is stripped before wrapping.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rate limited or out of quota.
    #[error("Rate limited: {message}")]
    RateLimited {
        /// Error description.
        message: String,
    },

    /// Provider returned an API error.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
        /// Provider-specific status string.
        code: Option<String>,
    },

    /// The prompt or the answer was blocked by safety filters.
    #[error("Response blocked: {reason}")]
    Blocked {
        /// Block reason reported by the provider.
        reason: String,
    },

    /// The provider answered without any text.
    #[error("Empty response from provider")]
    EmptyResponse,

    /// Provider-specific error.
    #[error("{message}")]
    Other {
        /// Error description.
        message: String,
    },
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

impl CompletionError {
    /// Error category string for logs.
    pub fn category(&self) -> &str {
        match self {
            Self::Http(_) => "network",
            Self::Json(_) => "parse",
            Self::RateLimited { .. } => "rate_limit",
            Self::Api { .. } => "api",
            Self::Blocked { .. } => "blocked",
            Self::EmptyResponse => "empty",
            Self::Other { .. } => "unknown",
        }
    }
}

/// Generation parameters sent with every completion request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    /// Number of candidates to generate.
    pub candidate_count: u32,
    /// Sequences that end generation.
    pub stop_sequences: Vec<String>,
    /// Sampling temperature.
    pub temperature: f64,
}

impl GenerationParams {
    /// Chat defaults with a custom temperature.
    #[must_use]
    pub fn with_temperature(temperature: f64) -> Self {
        Self {
            temperature,
            ..Self::default()
        }
    }
}

impl Default for GenerationParams {
    /// One candidate, stop at the first newline, temperature 0.7.
    fn default() -> Self {
        Self {
            candidate_count: 1,
            stop_sequences: vec!["\n".to_string()],
            temperature: 0.7,
        }
    }
}

/// Text-generation collaborator.
///
/// Implementors must be `Send + Sync` so one instance can serve every
/// session.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Current model ID.
    fn model(&self) -> &str;

    /// Generate a completion for `prompt`.
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> CompletionResult<String>;
}
