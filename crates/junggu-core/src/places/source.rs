//! Place sources and the process-wide place store.
//!
//! A [`PlaceSource`] produces the candidate places once at startup; the
//! resulting [`PlaceStore`] is immutable and shared by every session.

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use thiserror::Error;
use tracing::{debug, info};

use super::{Category, DurationBucket, PlaceRecord, Selectable, jitter};

/// Centre of the generated neighbourhood (latitude).
const GENERATED_CENTER_LATITUDE: f64 = 36.35;

/// Centre of the generated neighbourhood (longitude).
const GENERATED_CENTER_LONGITUDE: f64 = 127.39;

/// Coordinate spread for generated places, in degrees.
const GENERATED_SPREAD: f64 = 0.01;

/// Default number of generated places.
pub const DEFAULT_PLACE_COUNT: usize = 50;

const GENERATED_REASONS: &[&str] = &["음식이 훌륭해요!", "친절한 서비스", "지역 특산물"];

/// Errors raised while loading places.
#[derive(Debug, Error)]
pub enum PlaceSourceError {
    /// The place file could not be read.
    #[error("failed to read place file {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The place file is not a JSON array of places.
    #[error("failed to parse place file: {0}")]
    Json(#[from] serde_json::Error),
    /// The source produced no places.
    #[error("place source is empty")]
    Empty,
}

/// Something that can produce the candidate places.
pub trait PlaceSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Produce the places.
    fn load(&self) -> Result<Vec<PlaceRecord>, PlaceSourceError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Random source
// ─────────────────────────────────────────────────────────────────────────────

/// Generates random places scattered around the neighbourhood centre.
#[derive(Clone, Debug)]
pub struct RandomPlaceSource {
    count: usize,
    seed: Option<u64>,
}

impl RandomPlaceSource {
    /// Create a source generating `count` places.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self { count, seed: None }
    }

    /// Use a fixed RNG seed so the generated set is reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for RandomPlaceSource {
    fn default() -> Self {
        Self::new(DEFAULT_PLACE_COUNT)
    }
}

impl PlaceSource for RandomPlaceSource {
    fn name(&self) -> &str {
        "random"
    }

    fn load(&self) -> Result<Vec<PlaceRecord>, PlaceSourceError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let places = (1..=self.count)
            .map(|n| {
                let category = Category::ALL.choose(&mut rng).copied().unwrap_or(Category::Other);
                let bucket = DurationBucket::ALL
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or(DurationBucket::FiveMinutes);
                let reason = GENERATED_REASONS.choose(&mut rng).copied().unwrap_or_default();
                PlaceRecord::new(
                    format!("추천 장소 {n}"),
                    category,
                    bucket,
                    jitter(&mut rng, GENERATED_CENTER_LATITUDE, GENERATED_SPREAD),
                    jitter(&mut rng, GENERATED_CENTER_LONGITUDE, GENERATED_SPREAD),
                    reason,
                )
            })
            .collect();
        Ok(places)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON file source
// ─────────────────────────────────────────────────────────────────────────────

/// Loads places from a JSON array on disk.
///
/// Icon keys in the file are ignored; every record gets its category's icon.
#[derive(Clone, Debug)]
pub struct JsonPlaceSource {
    path: PathBuf,
}

impl JsonPlaceSource {
    /// Create a source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this source reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlaceSource for JsonPlaceSource {
    fn name(&self) -> &str {
        "json"
    }

    fn load(&self) -> Result<Vec<PlaceRecord>, PlaceSourceError> {
        debug!(path = ?self.path, "loading places from file");
        let content = std::fs::read_to_string(&self.path).map_err(|source| PlaceSourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut places: Vec<PlaceRecord> = serde_json::from_str(&content)?;
        for place in &mut places {
            place.icon_key = place.category.icon_key().to_owned();
        }
        Ok(places)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable collection of candidate places, loaded once per process.
#[derive(Clone, Debug, Default)]
pub struct PlaceStore {
    records: Vec<PlaceRecord>,
}

impl PlaceStore {
    /// Load the store from a source. Empty sources are rejected.
    pub fn load(source: &dyn PlaceSource) -> Result<Self, PlaceSourceError> {
        let records = source.load()?;
        if records.is_empty() {
            return Err(PlaceSourceError::Empty);
        }
        info!(source = source.name(), count = records.len(), "place store loaded");
        Ok(Self { records })
    }

    /// Build a store from records directly.
    #[must_use]
    pub fn from_records(records: Vec<PlaceRecord>) -> Self {
        Self { records }
    }

    /// All records in load order.
    #[must_use]
    pub fn records(&self) -> &[PlaceRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records in `category`.
    #[must_use]
    pub fn count_category(&self, category: Category) -> usize {
        self.records.iter().filter(|r| r.category == category).count()
    }
}
