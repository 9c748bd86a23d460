//! Scripted provider for deterministic tests without API calls.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::provider::{CompletionError, CompletionProvider, CompletionResult, GenerationParams};

/// One recorded call.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    /// Prompt that was sent.
    pub prompt: String,
    /// Parameters that were sent.
    pub params: GenerationParams,
}

/// Mock provider that returns pre-programmed results in sequence.
///
/// Once the script runs out every call fails with [`CompletionError::Other`].
pub struct MockProvider {
    script: Mutex<VecDeque<CompletionResult<String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockProvider {
    /// Provider returning `results` in order.
    pub fn new(results: Vec<CompletionResult<String>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Provider answering with each text in turn.
    pub fn replying<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(|t| Ok(t.into())).collect())
    }

    /// Provider whose single call fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self::new(vec![Err(CompletionError::Other {
            message: message.to_string(),
        })])
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// All recorded calls.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Prompt of the most recent call.
    pub fn last_prompt(&self) -> Option<String> {
        self.calls.lock().last().map(|c| c.prompt.clone())
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn model(&self) -> &str {
        "mock"
    }

    async fn complete(&self, prompt: &str, params: &GenerationParams) -> CompletionResult<String> {
        self.calls.lock().push(RecordedCall {
            prompt: prompt.to_string(),
            params: params.clone(),
        });
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| {
                Err(CompletionError::Other {
                    message: "mock provider script exhausted".to_string(),
                })
            })
    }
}
