//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`JungguSettings::default()`]
//! 2. If `~/.junggu/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Overrides that fail to parse are skipped and reported back in
//! [`LoadedSettings::ignored`], since loading usually happens before the
//! tracing subscriber exists.
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::JungguSettings;

/// An environment override that failed to parse and was skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IgnoredOverride {
    /// Variable name.
    pub key: String,
    /// Raw value found.
    pub value: String,
    /// Expected kind, e.g. `u16`.
    pub expected: &'static str,
}

impl fmt::Display for IgnoredOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?} is not a valid {}", self.key, self.value, self.expected)
    }
}

/// Settings plus the overrides skipped while loading them.
#[derive(Clone, Debug)]
pub struct LoadedSettings {
    /// Effective settings.
    pub settings: JungguSettings,
    /// Overrides that were present but invalid.
    pub ignored: Vec<IgnoredOverride>,
}

impl LoadedSettings {
    /// Emit one warning per ignored override. Call once logging is up.
    pub fn log_ignored(&self) {
        for o in &self.ignored {
            warn!(key = %o.key, value = %o.value, kind = o.expected, "invalid env var, ignoring");
        }
    }
}

/// Resolve the path to the settings file (`~/.junggu/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".junggu").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<LoadedSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<LoadedSettings> {
    load_settings_with(path, |name| std::env::var(name).ok())
}

/// Load settings from `path`, resolving overrides through `lookup`.
pub fn load_settings_with<F>(path: &Path, lookup: F) -> Result<LoadedSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = serde_json::to_value(JungguSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: JungguSettings = serde_json::from_value(merged)?;
    let ignored = apply_overrides_from(&mut settings, lookup);
    Ok(LoadedSettings { settings, ignored })
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply process environment overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut JungguSettings) -> Vec<IgnoredOverride> {
    apply_overrides_from(settings, |name| std::env::var(name).ok())
}

/// Apply overrides resolved through `lookup`.
///
/// Each variable has strict parsing rules:
/// - Integers must be valid and within the specified range
/// - Floats must parse and fall within the specified range
/// - Invalid values are skipped (fall back to file/default) and returned
pub fn apply_overrides_from<F>(settings: &mut JungguSettings, lookup: F) -> Vec<IgnoredOverride>
where
    F: Fn(&str) -> Option<String>,
{
    let mut env = EnvReader {
        lookup,
        ignored: Vec::new(),
    };

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = env.string("JUNGGU_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = env.u16("JUNGGU_PORT", 1, 65535) {
        settings.server.port = v;
    }
    if let Some(v) = env.usize("JUNGGU_MAX_SESSIONS", 1, 1_000_000) {
        settings.server.max_sessions = v;
    }
    if let Some(v) = env.u64("JUNGGU_SESSION_IDLE_SECS", 1, 7 * 24 * 3600) {
        settings.server.session_idle_secs = v;
    }

    // ── Google ──────────────────────────────────────────────────────
    if let Some(v) = env.string("GOOGLE_API_KEY") {
        settings.google.api_key = Some(v);
    }
    if let Some(v) = env.string("JUNGGU_MODEL") {
        settings.google.model = v;
    }
    if let Some(v) = env.string("JUNGGU_GOOGLE_BASE_URL") {
        settings.google.base_url = Some(v);
    }
    if let Some(v) = env.f64("JUNGGU_TEMPERATURE", 0.0, 2.0) {
        settings.google.temperature = v;
    }
    if let Some(v) = env.u64("JUNGGU_COMPLETION_TIMEOUT_MS", 100, 600_000) {
        settings.google.timeout_ms = Some(v);
    }

    // ── Places ──────────────────────────────────────────────────────
    if let Some(v) = env.usize("JUNGGU_PLACE_COUNT", 1, 100_000) {
        settings.places.count = v;
    }
    if let Some(v) = env.u64("JUNGGU_PLACE_SEED", 0, u64::MAX) {
        settings.places.seed = Some(v);
    }
    if let Some(v) = env.string("JUNGGU_PLACES_FILE") {
        settings.places.file = Some(v);
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = env.string("JUNGGU_LOG_LEVEL") {
        settings.logging.level = v;
    }

    env.ignored
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a finite `f64` within a range.
pub fn parse_f64_range(val: &str, min: f64, max: f64) -> Option<f64> {
    let n: f64 = val.parse().ok()?;
    (n.is_finite() && n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

struct EnvReader<F> {
    lookup: F,
    ignored: Vec<IgnoredOverride>,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn parsed<T>(
        &mut self,
        name: &str,
        kind: &'static str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        let val = (self.lookup)(name)?;
        let result = parse(&val);
        if result.is_none() {
            self.ignored.push(IgnoredOverride {
                key: name.to_string(),
                value: val,
                expected: kind,
            });
        }
        result
    }

    fn u16(&mut self, name: &str, min: u16, max: u16) -> Option<u16> {
        self.parsed(name, "u16", |v| parse_u16_range(v, min, max))
    }

    fn u64(&mut self, name: &str, min: u64, max: u64) -> Option<u64> {
        self.parsed(name, "u64", |v| parse_u64_range(v, min, max))
    }

    fn usize(&mut self, name: &str, min: usize, max: usize) -> Option<usize> {
        self.parsed(name, "usize", |v| parse_usize_range(v, min, max))
    }

    fn f64(&mut self, name: &str, min: f64, max: f64) -> Option<f64> {
        self.parsed(name, "f64", |v| parse_f64_range(v, min, max))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
