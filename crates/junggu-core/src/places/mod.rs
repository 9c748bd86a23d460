//! Place records, categories, duration buckets and the anchor location.
//!
//! Every place shown on the map is a [`PlaceRecord`]. Records are immutable
//! once created. The anchor record (Sungsimdang main store) is a constant
//! that is always visible and always drawn with its own icon.

pub mod source;

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use source::{JsonPlaceSource, PlaceSource, PlaceSourceError, PlaceStore, RandomPlaceSource};

// ─────────────────────────────────────────────────────────────────────────────
// Anchor constants
// ─────────────────────────────────────────────────────────────────────────────

/// Anchor name (Sungsimdang main store).
pub const ANCHOR_NAME: &str = "성심당 본점";

/// Anchor latitude.
pub const ANCHOR_LATITUDE: f64 = 36.3277;

/// Anchor longitude.
pub const ANCHOR_LONGITUDE: f64 = 127.4273;

/// Icon key reserved for the anchor record.
pub const ANCHOR_ICON_KEY: &str = "anchor";

const ANCHOR_REASON: &str = "대전에서 가장 유명한 빵집이에요!";

// ─────────────────────────────────────────────────────────────────────────────
// Selectable enums
// ─────────────────────────────────────────────────────────────────────────────

/// A closed set of values that can be selected in a filter group.
///
/// `wire_name` is the stable lowercase identifier used in JSON and URLs;
/// `label` is the Korean text shown on the page.
pub trait Selectable: Copy + Eq + fmt::Debug + 'static {
    /// Every value, in display order.
    const ALL: &'static [Self];

    /// Stable identifier used on the wire.
    fn wire_name(self) -> &'static str;

    /// Human-facing label.
    fn label(self) -> &'static str;

    /// Look up a value by its wire name.
    fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.wire_name() == name)
    }
}

/// Place category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Restaurants and food stalls.
    Food,
    /// Sights, parks and landmarks.
    Attraction,
    /// Cafes and bakeries.
    Cafe,
    /// Shops and markets.
    Shopping,
    /// Anything else.
    Other,
}

impl Category {
    /// Icon-atlas key for ordinary places of this category.
    #[must_use]
    pub fn icon_key(self) -> &'static str {
        self.wire_name()
    }
}

impl Selectable for Category {
    const ALL: &'static [Self] = &[
        Self::Food,
        Self::Attraction,
        Self::Cafe,
        Self::Shopping,
        Self::Other,
    ];

    fn wire_name(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Attraction => "attraction",
            Self::Cafe => "cafe",
            Self::Shopping => "shopping",
            Self::Other => "other",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Food => "음식",
            Self::Attraction => "관광지",
            Self::Cafe => "카페",
            Self::Shopping => "쇼핑",
            Self::Other => "기타",
        }
    }
}

/// How long a visit to the place takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationBucket {
    /// About five minutes.
    #[serde(rename = "5m")]
    FiveMinutes,
    /// About ten minutes.
    #[serde(rename = "10m")]
    TenMinutes,
    /// About half an hour.
    #[serde(rename = "30m")]
    ThirtyMinutes,
    /// An hour or more.
    #[serde(rename = "60m+")]
    HourOrMore,
}

impl Selectable for DurationBucket {
    const ALL: &'static [Self] = &[
        Self::FiveMinutes,
        Self::TenMinutes,
        Self::ThirtyMinutes,
        Self::HourOrMore,
    ];

    fn wire_name(self) -> &'static str {
        match self {
            Self::FiveMinutes => "5m",
            Self::TenMinutes => "10m",
            Self::ThirtyMinutes => "30m",
            Self::HourOrMore => "60m+",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::FiveMinutes => "5분",
            Self::TenMinutes => "10분",
            Self::ThirtyMinutes => "30분",
            Self::HourOrMore => "1시간 이상",
        }
    }
}

/// Error returned when a wire name matches no value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownValue {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl FromStr for Category {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire_name(s).ok_or_else(|| UnknownValue {
            kind: "category",
            value: s.to_owned(),
        })
    }
}

impl FromStr for DurationBucket {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire_name(s).ok_or_else(|| UnknownValue {
            kind: "duration bucket",
            value: s.to_owned(),
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PlaceRecord
// ─────────────────────────────────────────────────────────────────────────────

/// One place on the map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    /// Display name. Not guaranteed unique.
    pub name: String,
    /// Category.
    pub category: Category,
    /// Visit duration bucket.
    pub duration_bucket: DurationBucket,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Why the place is recommended.
    pub reason: String,
    /// Icon-atlas key used by the map layer.
    #[serde(default)]
    pub icon_key: String,
}

impl PlaceRecord {
    /// Create a record whose icon follows its category.
    pub fn new(
        name: impl Into<String>,
        category: Category,
        duration_bucket: DurationBucket,
        latitude: f64,
        longitude: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            duration_bucket,
            latitude,
            longitude,
            reason: reason.into(),
            icon_key: category.icon_key().to_owned(),
        }
    }

    /// Whether this record is the anchor.
    #[must_use]
    pub fn is_anchor(&self) -> bool {
        self.icon_key == ANCHOR_ICON_KEY
    }
}

/// The always-visible anchor record.
pub fn anchor_record() -> PlaceRecord {
    PlaceRecord {
        icon_key: ANCHOR_ICON_KEY.to_owned(),
        ..PlaceRecord::new(
            ANCHOR_NAME,
            Category::Food,
            DurationBucket::FiveMinutes,
            ANCHOR_LATITUDE,
            ANCHOR_LONGITUDE,
            ANCHOR_REASON,
        )
    }
}

/// Uniform random coordinate within `center ± spread`.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, center: f64, spread: f64) -> f64 {
    center + rng.random_range(-spread..=spread)
}
