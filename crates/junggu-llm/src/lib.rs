//! # junggu-llm
//!
//! Text completion for the chat box.
//!
//! - [`provider`] — the [`CompletionProvider`] trait, generation parameters, errors
//! - [`google`] — Gemini `generateContent` client (API-key auth)
//! - [`mock`] — scripted provider for tests

#![deny(unsafe_code)]

pub mod google;
pub mod mock;
pub mod provider;

pub use google::{GoogleConfig, GoogleProvider};
pub use mock::MockProvider;
pub use provider::{CompletionError, CompletionProvider, CompletionResult, GenerationParams};
