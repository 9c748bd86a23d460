//! Keyword-triggered place recommendations.
//!
//! A chat message asking to recommend or search for something produces a
//! handful of made-up places of the guessed category, scattered around the
//! anchor. Korean and English keywords are both recognised; English matching
//! ignores case.

use junggu_core::places::{ANCHOR_LATITUDE, ANCHOR_LONGITUDE, jitter};
use junggu_core::{Category, DurationBucket, PlaceRecord, Selectable};
use rand::Rng;

/// Places produced per triggering message.
pub const PLACES_PER_RECOMMENDATION: usize = 5;

/// Coordinate spread around the anchor, in degrees.
pub const RECOMMENDATION_SPREAD: f64 = 0.01;

const TRIGGERS: &[&str] = &["추천", "검색", "recommend", "search"];

/// Category keywords, checked in order. First hit wins.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Cafe, &["카페", "cafe"]),
    (Category::Attraction, &["공원", "park"]),
    (Category::Food, &["음식", "맛집", "food", "restaurant"]),
];

/// Category used when no keyword matches.
pub const DEFAULT_CATEGORY: Category = Category::Cafe;

/// Whether `text` asks for recommendations.
pub fn is_recommendation_request(text: &str) -> bool {
    let lowered = text.to_lowercase();
    TRIGGERS.iter().any(|t| lowered.contains(t))
}

/// Guess the wanted category from `text`.
pub fn classify(text: &str) -> Category {
    let lowered = text.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lowered.contains(w)))
        .map_or(DEFAULT_CATEGORY, |(category, _)| *category)
}

/// Make up [`PLACES_PER_RECOMMENDATION`] places of `category` near the anchor.
pub fn synthesize<R: Rng + ?Sized>(category: Category, rng: &mut R) -> Vec<PlaceRecord> {
    let label = category.label();
    (1..=PLACES_PER_RECOMMENDATION)
        .map(|n| {
            PlaceRecord::new(
                format!("새로운 {label} 추천 {n}"),
                category,
                DurationBucket::TenMinutes,
                jitter(rng, ANCHOR_LATITUDE, RECOMMENDATION_SPREAD),
                jitter(rng, ANCHOR_LONGITUDE, RECOMMENDATION_SPREAD),
                format!("멋진 {label} 공간이에요!"),
            )
        })
        .collect()
}

/// Places for `text` if it is a recommendation request.
pub fn recommend_for<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Option<Vec<PlaceRecord>> {
    is_recommendation_request(text).then(|| synthesize(classify(text), rng))
}
