//! # junggu-runtime
//!
//! Per-session state for the places page.
//!
//! - [`chat`] — chat state machine (`Idle → AwaitingResponse → Idle`)
//! - [`recommend`] — keyword-triggered synthetic places
//! - [`session`] — [`SessionContext`], the explicit per-session state object
//! - [`manager`] — [`SessionManager`], live sessions keyed by ID

#![deny(unsafe_code)]

pub mod chat;
pub mod errors;
pub mod manager;
pub mod recommend;
pub mod session;

pub use chat::{APOLOGY_PREFIX, ChatSession, ChatState, ReplyKind, SubmitOutcome};
pub use errors::RuntimeError;
pub use manager::{DEFAULT_IDLE_TTL, SessionManager, SharedSession};
pub use session::SessionContext;
