//! # junggu-settings
//!
//! Configuration with layered sources for the Jung-gu places service.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`JungguSettings::default()`]
//! 2. **User file** — `~/.junggu/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `JUNGGU_*` and `GOOGLE_API_KEY` (highest priority)
//!
//! The Gemini API key has no default. [`JungguSettings::validate`] fails
//! when it is missing so the server refuses to start without one.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    IgnoredOverride, LoadedSettings, apply_env_overrides, apply_overrides_from, deep_merge,
    load_settings, load_settings_from_path, load_settings_with, settings_path,
};
pub use types::*;
