//! Builds the place store and completion provider from settings.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use junggu_core::PlaceStore;
use junggu_core::places::{JsonPlaceSource, PlaceSource, PlaceSourceError, RandomPlaceSource};
use junggu_llm::{CompletionProvider, GenerationParams, GoogleConfig, GoogleProvider};
use junggu_settings::{GoogleSettings, PlaceSettings, SettingsError};

/// The configured place source: a JSON file if one is set, random otherwise.
pub fn place_source(settings: &PlaceSettings) -> Box<dyn PlaceSource> {
    match &settings.file {
        Some(file) => Box::new(JsonPlaceSource::new(Path::new(file))),
        None => {
            let source = RandomPlaceSource::new(settings.count);
            Box::new(match settings.seed {
                Some(seed) => source.with_seed(seed),
                None => source,
            })
        }
    }
}

/// Load the process-wide place store.
pub fn place_store(settings: &PlaceSettings) -> Result<PlaceStore, PlaceSourceError> {
    PlaceStore::load(place_source(settings).as_ref())
}

/// Gemini client for the configured model and key.
pub fn completion_provider(
    settings: &GoogleSettings,
) -> Result<Arc<dyn CompletionProvider>, SettingsError> {
    let config = GoogleConfig {
        model: settings.model.clone(),
        base_url: settings.base_url.clone(),
        timeout: settings.timeout_ms.map(Duration::from_millis),
        ..GoogleConfig::new(settings.require_api_key()?)
    };
    Ok(Arc::new(GoogleProvider::new(config)))
}

/// Chat generation parameters with the configured temperature.
pub fn generation_params(settings: &GoogleSettings) -> GenerationParams {
    GenerationParams::with_temperature(settings.temperature)
}
