//! Chat state machine.
//!
//! `Idle → AwaitingResponse → Idle`. A submit always ends back in `Idle`
//! with the input buffer empty; completion failures become an apology turn
//! in the transcript instead of an error.

use junggu_core::{PlaceRecord, Speaker, Transcript};
use junggu_llm::{CompletionProvider, GenerationParams};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::recommend;

/// Start of the bot turn recorded when the completion call fails.
pub const APOLOGY_PREFIX: &str = "죄송해요, 오류가 발생했습니다.";

/// Where the chat is in its cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatState {
    /// Ready for input.
    #[default]
    Idle,
    /// Waiting on the completion collaborator.
    AwaitingResponse,
}

/// How a submit ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// Empty input; nothing happened.
    Ignored,
    /// The collaborator answered.
    Replied,
    /// The collaborator failed and an apology was recorded.
    Apologized,
}

/// Result of one submit.
#[derive(Clone, Debug, Serialize)]
pub struct SubmitOutcome {
    /// How the turn ended.
    pub kind: ReplyKind,
    /// Places synthesized by a recommendation request.
    pub added_places: Vec<PlaceRecord>,
}

impl SubmitOutcome {
    fn ignored() -> Self {
        Self {
            kind: ReplyKind::Ignored,
            added_places: Vec::new(),
        }
    }
}

/// Resets the chat to `Idle` when dropped, including when the awaiting
/// future is cancelled.
struct AwaitingGuard<'a> {
    state: &'a mut ChatState,
}

impl<'a> AwaitingGuard<'a> {
    fn enter(state: &'a mut ChatState) -> Self {
        *state = ChatState::AwaitingResponse;
        Self { state }
    }
}

impl Drop for AwaitingGuard<'_> {
    fn drop(&mut self) {
        *self.state = ChatState::Idle;
    }
}

/// Transcript, pending input and state of one chat box.
#[derive(Debug, Default)]
pub struct ChatSession {
    transcript: Transcript,
    input: String,
    state: ChatState,
    params: GenerationParams,
}

impl ChatSession {
    /// Chat using `params` for every completion.
    #[must_use]
    pub fn new(params: GenerationParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Transcript so far.
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ChatState {
        self.state
    }

    /// Pending input buffer.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the pending input buffer.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Submit the pending input buffer.
    ///
    /// The buffer is taken up front, so it is empty afterwards on every
    /// path. Keyword recommendations only run after a successful reply.
    #[instrument(skip_all, fields(model = provider.model()))]
    pub async fn submit_input<R>(
        &mut self,
        provider: &dyn CompletionProvider,
        rng: &mut R,
    ) -> SubmitOutcome
    where
        R: Rng + ?Sized,
    {
        let text = std::mem::take(&mut self.input);
        if text.is_empty() {
            debug!("empty chat input ignored");
            return SubmitOutcome::ignored();
        }

        let prompt = self.transcript.render_prompt(&text);
        let result = {
            let _awaiting = AwaitingGuard::enter(&mut self.state);
            provider.complete(&prompt, &self.params).await
        };

        match result {
            Ok(reply) => {
                self.transcript.push(Speaker::User, text.as_str());
                self.transcript.push(Speaker::Bot, reply);
                let added_places = recommend::recommend_for(&text, rng).unwrap_or_default();
                info!(
                    turns = self.transcript.len(),
                    added = added_places.len(),
                    "chat turn completed"
                );
                SubmitOutcome {
                    kind: ReplyKind::Replied,
                    added_places,
                }
            }
            Err(err) => {
                warn!(error = %err, category = err.category(), "completion failed, recording apology");
                self.transcript.push(Speaker::User, text);
                self.transcript
                    .push(Speaker::Bot, format!("{APOLOGY_PREFIX} {err}"));
                SubmitOutcome {
                    kind: ReplyKind::Apologized,
                    added_places: Vec::new(),
                }
            }
        }
    }

    /// Put `text` in the buffer and submit it.
    pub async fn submit<R>(
        &mut self,
        text: &str,
        provider: &dyn CompletionProvider,
        rng: &mut R,
    ) -> SubmitOutcome
    where
        R: Rng + ?Sized,
    {
        self.set_input(text);
        self.submit_input(provider, rng).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use junggu_core::Category;
    use junggu_core::places::{ANCHOR_LATITUDE, ANCHOR_LONGITUDE};
    use junggu_llm::{GoogleConfig, GoogleProvider, MockProvider};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(5)
    }

    #[tokio::test]
    async fn empty_input_is_noop() {
        let mock = MockProvider::replying(["unused"]);
        let mut chat = ChatSession::default();
        let outcome = chat.submit("", &mock, &mut rng()).await;
        assert_eq!(outcome.kind, ReplyKind::Ignored);
        assert!(chat.transcript().is_empty());
        assert_eq!(mock.call_count(), 0);
        assert_eq!(chat.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn success_appends_user_then_bot() {
        let mock = MockProvider::replying(["반가워요"]);
        let mut chat = ChatSession::default();
        let outcome = chat.submit("안녕", &mock, &mut rng()).await;

        assert_eq!(outcome.kind, ReplyKind::Replied);
        assert!(outcome.added_places.is_empty());
        let turns = chat.transcript().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker, Speaker::User);
        assert_eq!(turns[0].text, "안녕");
        assert_eq!(turns[1].speaker, Speaker::Bot);
        assert_eq!(turns[1].text, "반가워요");
        assert_eq!(chat.input(), "");
        assert_eq!(chat.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn prompt_folds_history() {
        let mock = MockProvider::replying(["b", "d"]);
        let mut chat = ChatSession::default();
        let _ = chat.submit("a", &mock, &mut rng()).await;
        let _ = chat.submit("c", &mock, &mut rng()).await;

        let calls = mock.calls();
        assert_eq!(calls[0].prompt, "\nUser: a\nAssistant:");
        assert_eq!(calls[1].prompt, "User: a\nBot: b\nUser: c\nAssistant:");
    }

    #[tokio::test]
    async fn sends_chat_generation_params() {
        let mock = MockProvider::replying(["ok"]);
        let mut chat = ChatSession::default();
        let _ = chat.submit("hi", &mock, &mut rng()).await;
        assert_eq!(mock.calls()[0].params, GenerationParams::default());
    }

    #[tokio::test]
    async fn failure_appends_apology_with_error() {
        let mock = MockProvider::failing("quota exceeded");
        let mut chat = ChatSession::default();
        chat.set_input("hello");
        let outcome = chat.submit_input(&mock, &mut rng()).await;

        assert_eq!(outcome.kind, ReplyKind::Apologized);
        let turns = chat.transcript().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker, Speaker::User);
        assert_eq!(turns[1].speaker, Speaker::Bot);
        assert!(turns[1].text.starts_with(APOLOGY_PREFIX));
        assert!(turns[1].text.contains("quota exceeded"));
        assert_eq!(chat.input(), "");
        assert_eq!(chat.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn apology_never_contains_api_key() {
        let provider = GoogleProvider::new(GoogleConfig {
            base_url: Some("http://127.0.0.1:9".into()),
            ..GoogleConfig::new("SECRET-API-KEY")
        });
        let mut chat = ChatSession::default();
        let outcome = chat.submit("hello", &provider, &mut rng()).await;

        assert_eq!(outcome.kind, ReplyKind::Apologized);
        let turns = chat.transcript().turns();
        assert!(turns[1].text.starts_with(APOLOGY_PREFIX));
        assert!(turns.iter().all(|t| !t.text.contains("SECRET-API-KEY")));
    }

    #[tokio::test]
    async fn failed_recommendation_adds_nothing() {
        let mock = MockProvider::failing("down");
        let mut chat = ChatSession::default();
        let outcome = chat.submit("recommend a cafe", &mock, &mut rng()).await;
        assert!(outcome.added_places.is_empty());
    }

    #[tokio::test]
    async fn recommend_cafe_adds_five_cafes() {
        let mock = MockProvider::replying(["여기 어때요"]);
        let mut chat = ChatSession::default();
        let outcome = chat.submit("recommend a cafe", &mock, &mut rng()).await;

        assert_eq!(outcome.added_places.len(), 5);
        for p in &outcome.added_places {
            assert_eq!(p.category, Category::Cafe);
            assert!((p.latitude - ANCHOR_LATITUDE).abs() <= 0.01 + 1e-9);
            assert!((p.longitude - ANCHOR_LONGITUDE).abs() <= 0.01 + 1e-9);
        }
    }

    #[tokio::test]
    async fn cancelled_submit_returns_to_idle() {
        struct Hang;

        #[async_trait::async_trait]
        impl CompletionProvider for Hang {
            fn model(&self) -> &str {
                "hang"
            }

            async fn complete(
                &self,
                _prompt: &str,
                _params: &GenerationParams,
            ) -> junggu_llm::CompletionResult<String> {
                std::future::pending().await
            }
        }

        let mut chat = ChatSession::default();
        chat.set_input("hi");
        let mut r = rng();
        let res = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            chat.submit_input(&Hang, &mut r),
        )
        .await;
        assert!(res.is_err());
        assert_eq!(chat.state(), ChatState::Idle);
        assert_eq!(chat.input(), "");
        assert!(chat.transcript().is_empty());
    }
}
