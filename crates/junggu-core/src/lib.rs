//! # junggu-core
//!
//! Foundation types for the Jung-gu recommended places service.
//!
//! - [`places`] — place records, the anchor, place sources and the cached store
//! - [`filter`] — two-dimension toggle filter and visible-set derivation
//! - [`transcript`] — chat transcript and prompt rendering
//! - [`ids`] — session identifiers
//! - [`logging`] — `tracing` subscriber setup

#![deny(unsafe_code)]

pub mod filter;
pub mod ids;
pub mod logging;
pub mod places;
pub mod transcript;

pub use filter::{Choice, Dimension, FilterSelection, FilterToggle, compute_visible};
pub use ids::SessionId;
pub use places::{Category, DurationBucket, PlaceRecord, PlaceStore, Selectable, anchor_record};
pub use transcript::{Speaker, Transcript, Turn};
