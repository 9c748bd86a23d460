//! Per-session state owned by one visitor's page.
//!
//! Filter selection, chat and the places chat has added live here and are
//! passed explicitly to whoever handles a request for the session.

use chrono::{DateTime, Utc};
use junggu_core::{
    FilterSelection, FilterToggle, PlaceRecord, PlaceStore, SessionId, Transcript,
    compute_visible,
};
use junggu_llm::{CompletionProvider, GenerationParams};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::chat::{ChatSession, ChatState, SubmitOutcome};

/// Per-session state.
#[derive(Debug)]
pub struct SessionContext {
    id: SessionId,
    created_at: DateTime<Utc>,
    selection: FilterSelection,
    chat: ChatSession,
    additions: Vec<PlaceRecord>,
    rng: StdRng,
}

impl SessionContext {
    /// Fresh session with an OS-seeded RNG.
    pub fn new(id: SessionId, params: GenerationParams) -> Self {
        Self::with_rng(id, params, StdRng::from_os_rng())
    }

    /// Fresh session with a deterministic RNG.
    pub fn with_seed(id: SessionId, params: GenerationParams, seed: u64) -> Self {
        Self::with_rng(id, params, StdRng::seed_from_u64(seed))
    }

    fn with_rng(id: SessionId, params: GenerationParams, rng: StdRng) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            selection: FilterSelection::default(),
            chat: ChatSession::new(params),
            additions: Vec::new(),
            rng,
        }
    }

    /// Session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Apply a filter toggle and return the new selection.
    pub fn toggle(&mut self, toggle: FilterToggle) -> FilterSelection {
        self.selection.toggle(toggle);
        debug!(session_id = %self.id, ?toggle, selection = ?self.selection, "filter toggled");
        self.selection
    }

    /// Current filter selection.
    pub fn selection(&self) -> FilterSelection {
        self.selection
    }

    /// Anchor, filtered store records, then chat additions.
    pub fn visible(&self, store: &PlaceStore) -> Vec<PlaceRecord> {
        let mut visible = compute_visible(store, &self.selection);
        visible.extend(self.additions.iter().cloned());
        visible
    }

    /// Chat transcript.
    pub fn transcript(&self) -> &Transcript {
        self.chat.transcript()
    }

    /// Chat state.
    pub fn chat_state(&self) -> ChatState {
        self.chat.state()
    }

    /// Places added by chat so far.
    pub fn additions(&self) -> &[PlaceRecord] {
        &self.additions
    }

    /// Stage `text` in the chat input buffer.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.chat.set_input(text);
    }

    /// Submit the staged chat input.
    pub async fn submit_input(&mut self, provider: &dyn CompletionProvider) -> SubmitOutcome {
        let outcome = self.chat.submit_input(provider, &mut self.rng).await;
        self.additions.extend(outcome.added_places.iter().cloned());
        outcome
    }

    /// Submit `text` as a chat message.
    pub async fn submit(&mut self, text: &str, provider: &dyn CompletionProvider) -> SubmitOutcome {
        self.set_input(text);
        self.submit_input(provider).await
    }
}
