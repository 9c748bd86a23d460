//! Session manager: create, look up and end sessions.
//!
//! Sessions idle longer than the configured TTL are evicted, so visitors who
//! close the page without ending their session do not hold a slot forever.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use junggu_core::SessionId;
use junggu_llm::GenerationParams;
use parking_lot::Mutex as SyncMutex;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::errors::RuntimeError;
use crate::session::SessionContext;

/// Idle time after which a session may be evicted, unless overridden.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// A live session. The mutex serialises actions within one session.
pub type SharedSession = Arc<Mutex<SessionContext>>;

struct SessionEntry {
    session: SharedSession,
    last_active: SyncMutex<Instant>,
}

impl SessionEntry {
    fn new(ctx: SessionContext) -> Self {
        Self {
            session: Arc::new(Mutex::new(ctx)),
            last_active: SyncMutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_active.lock() = Instant::now();
    }

    /// Idle past `ttl` and not held by any in-flight request.
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        Arc::strong_count(&self.session) == 1
            && now.saturating_duration_since(*self.last_active.lock()) >= ttl
    }
}

/// Live sessions keyed by ID.
pub struct SessionManager {
    sessions: DashMap<SessionId, SessionEntry>,
    /// Slots taken, including ones reserved by a create still in progress.
    slots: AtomicUsize,
    max_sessions: usize,
    idle_ttl: Duration,
    params: GenerationParams,
}

impl SessionManager {
    /// Manager allowing at most `max_sessions` live sessions.
    pub fn new(max_sessions: usize, params: GenerationParams) -> Self {
        Self {
            sessions: DashMap::new(),
            slots: AtomicUsize::new(0),
            max_sessions,
            idle_ttl: DEFAULT_IDLE_TTL,
            params,
        }
    }

    /// Override the idle TTL.
    #[must_use]
    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    /// Start a new session.
    ///
    /// When the cap is reached, idle sessions are evicted first and the
    /// create fails only if none could be.
    #[instrument(skip(self))]
    pub fn create_session(&self) -> Result<SessionId, RuntimeError> {
        if !self.reserve_slot() && (self.evict_idle() == 0 || !self.reserve_slot()) {
            warn!(max = self.max_sessions, "session limit reached");
            return Err(RuntimeError::SessionLimit {
                max: self.max_sessions,
            });
        }

        let id = SessionId::new();
        let ctx = SessionContext::new(id.clone(), self.params.clone());
        let _ = self.sessions.insert(id.clone(), SessionEntry::new(ctx));
        debug!(session_id = %id, active = self.sessions.len(), "session created");
        Ok(id)
    }

    /// Look up a live session and mark it active.
    pub fn get(&self, id: &SessionId) -> Result<SharedSession, RuntimeError> {
        self.sessions
            .get(id)
            .map(|entry| {
                entry.touch();
                Arc::clone(&entry.session)
            })
            .ok_or_else(|| RuntimeError::SessionNotFound(id.to_string()))
    }

    /// End a session, dropping its transcript and additions.
    #[instrument(skip(self), fields(session_id = %id))]
    pub fn end_session(&self, id: &SessionId) -> Result<(), RuntimeError> {
        match self.sessions.remove(id) {
            Some(_) => {
                self.release_slots(1);
                debug!("session ended");
                Ok(())
            }
            None => Err(RuntimeError::SessionNotFound(id.to_string())),
        }
    }

    /// Drop every session idle for at least the TTL. Returns how many went.
    pub fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let mut evicted = 0;
        self.sessions.retain(|id, entry| {
            if entry.is_expired(now, self.idle_ttl) {
                debug!(session_id = %id, "idle session evicted");
                evicted += 1;
                false
            } else {
                true
            }
        });
        if evicted > 0 {
            self.release_slots(evicted);
            info!(evicted, active = self.sessions.len(), "evicted idle sessions");
        }
        evicted
    }

    /// Number of live sessions.
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Cap on live sessions.
    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Idle time after which a session is evicted.
    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    fn reserve_slot(&self) -> bool {
        self.slots
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |taken| {
                (taken < self.max_sessions).then_some(taken + 1)
            })
            .is_ok()
    }

    fn release_slots(&self, n: usize) {
        let _ = self.slots.fetch_sub(n, Ordering::AcqRel);
    }
}
