//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so a partial
//! JSON file only needs the fields it changes.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "server": { "port": 9000 },
///   "google": { "model": "gemini-1.5-flash", "apiKey": "..." },
///   "places": { "count": 80, "seed": 7 }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JungguSettings {
    /// Settings schema version.
    pub version: String,
    /// Application name.
    pub name: String,
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Gemini completion settings.
    pub google: GoogleSettings,
    /// Place store settings.
    pub places: PlaceSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

impl Default for JungguSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "junggu".to_string(),
            server: ServerSettings::default(),
            google: GoogleSettings::default(),
            places: PlaceSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl JungguSettings {
    /// Check values that must hold before the server starts.
    pub fn validate(&self) -> Result<()> {
        let _ = self.google.require_api_key()?;
        if !(0.0..=2.0).contains(&self.google.temperature) {
            return Err(SettingsError::InvalidValue(format!(
                "google.temperature must be within 0.0..=2.0, got {}",
                self.google.temperature
            )));
        }
        if self.places.file.is_none() && self.places.count == 0 {
            return Err(SettingsError::InvalidValue(
                "places.count must be at least 1".into(),
            ));
        }
        if self.server.max_sessions == 0 {
            return Err(SettingsError::InvalidValue(
                "server.maxSessions must be at least 1".into(),
            ));
        }
        if self.server.session_idle_secs == 0 {
            return Err(SettingsError::InvalidValue(
                "server.sessionIdleSecs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Maximum number of live sessions.
    pub max_sessions: usize,
    /// Seconds without a request before a session may be evicted.
    pub session_idle_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            max_sessions: 1000,
            session_idle_secs: 1800,
        }
    }
}

/// Gemini completion settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleSettings {
    /// Model ID.
    pub model: String,
    /// API base URL override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// API key. Never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Sampling temperature for chat replies.
    pub temperature: f64,
    /// Request timeout in milliseconds. Unset means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            base_url: None,
            api_key: None,
            temperature: 0.7,
            timeout_ms: None,
        }
    }
}

impl GoogleSettings {
    /// The configured API key, or [`SettingsError::MissingApiKey`].
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(SettingsError::MissingApiKey)
    }
}

/// Place store settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaceSettings {
    /// Number of random places to generate.
    pub count: usize,
    /// RNG seed for reproducible generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// JSON place file replacing random generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for PlaceSettings {
    fn default() -> Self {
        Self {
            count: 50,
            seed: None,
            file: None,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_key() -> JungguSettings {
        let mut s = JungguSettings::default();
        s.google.api_key = Some("k".into());
        s
    }

    #[test]
    fn defaults_fail_validation_without_key() {
        let err = JungguSettings::default().validate().unwrap_err();
        assert!(matches!(err, SettingsError::MissingApiKey));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let mut s = JungguSettings::default();
        s.google.api_key = Some("   ".into());
        assert!(matches!(s.google.require_api_key(), Err(SettingsError::MissingApiKey)));
    }

    #[test]
    fn key_present_validates() {
        assert!(with_key().validate().is_ok());
        assert_eq!(with_key().google.require_api_key().unwrap(), "k");
    }

    #[test]
    fn temperature_out_of_range() {
        let mut s = with_key();
        s.google.temperature = 3.5;
        assert!(matches!(s.validate(), Err(SettingsError::InvalidValue(_))));
    }

    #[test]
    fn zero_count_without_file_rejected() {
        let mut s = with_key();
        s.places.count = 0;
        assert!(matches!(s.validate(), Err(SettingsError::InvalidValue(_))));
        s.places.file = Some("places.json".into());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn zero_idle_timeout_rejected() {
        let mut s = with_key();
        assert_eq!(s.server.session_idle_secs, 1800);
        s.server.session_idle_secs = 0;
        assert!(matches!(s.validate(), Err(SettingsError::InvalidValue(_))));
    }

    #[test]
    fn api_key_is_not_serialized() {
        let json = serde_json::to_value(with_key()).unwrap();
        assert!(json["google"].get("apiKey").is_none());
    }

    #[test]
    fn api_key_is_deserialized() {
        let s: JungguSettings =
            serde_json::from_str(r#"{"google": {"apiKey": "abc"}}"#).unwrap();
        assert_eq!(s.google.api_key.as_deref(), Some("abc"));
        assert_eq!(s.google.model, "gemini-1.5-flash");
    }
}
