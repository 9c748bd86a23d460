//! Runtime error types.

use thiserror::Error;

/// Errors raised while managing sessions.
///
/// Completion failures never appear here: the chat state machine turns
/// them into transcript entries.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// No live session has this ID.
    #[error("session not found: {0}")]
    SessionNotFound(String),
    /// The live-session cap was reached.
    #[error("session limit reached ({max} active)")]
    SessionLimit {
        /// Configured cap.
        max: usize,
    },
}
