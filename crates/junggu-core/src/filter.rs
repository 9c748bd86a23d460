//! Two-dimension toggle filter and visible-set derivation.
//!
//! The page offers two single-select groups (category, time bucket), each
//! with an "All" option. Selecting the value that is already active clears
//! that dimension back to unset; both unset and `All` admit every place.

use std::fmt;
use std::iter;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::places::{Category, DurationBucket, PlaceRecord, PlaceStore, Selectable, anchor_record};

/// Wire name of the "All" option.
pub const ALL_WIRE_NAME: &str = "all";

/// One option in a filter group: `All` or a specific value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Choice<T> {
    /// The "All" option.
    All,
    /// A specific value.
    Only(T),
}

impl<T: Selectable> Choice<T> {
    /// Whether a record with `value` passes this choice.
    #[must_use]
    pub fn admits(self, value: T) -> bool {
        match self {
            Self::All => true,
            Self::Only(v) => v == value,
        }
    }

    /// Wire name (`all` or the value's wire name).
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::All => ALL_WIRE_NAME,
            Self::Only(v) => v.wire_name(),
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Option<Self> {
        if name == ALL_WIRE_NAME {
            Some(Self::All)
        } else {
            T::from_wire_name(name).map(Self::Only)
        }
    }
}

impl<T: Selectable> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl<T: Selectable> Serialize for Choice<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de, T: Selectable> Deserialize<'de> for Choice<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_wire_name(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown filter value: {name}")))
    }
}

/// Filter dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Place category.
    Category,
    /// Visit duration bucket.
    Time,
}

/// A single user click on one filter group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dimension", content = "value", rename_all = "snake_case")]
pub enum FilterToggle {
    /// Click in the category group.
    Category(Choice<Category>),
    /// Click in the time group.
    Time(Choice<DurationBucket>),
}

impl FilterToggle {
    /// Which dimension the click targets.
    #[must_use]
    pub fn dimension(self) -> Dimension {
        match self {
            Self::Category(_) => Dimension::Category,
            Self::Time(_) => Dimension::Time,
        }
    }
}

/// Current filter selection. `None` means unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Selected category option.
    pub category: Option<Choice<Category>>,
    /// Selected time option.
    pub time: Option<Choice<DurationBucket>>,
}

impl FilterSelection {
    /// Apply one click: re-selecting the active value clears it.
    pub fn toggle(&mut self, toggle: FilterToggle) {
        match toggle {
            FilterToggle::Category(choice) => toggle_slot(&mut self.category, choice),
            FilterToggle::Time(choice) => toggle_slot(&mut self.time, choice),
        }
    }

    /// Shorthand for a category click.
    pub fn toggle_category(&mut self, choice: Choice<Category>) {
        self.toggle(FilterToggle::Category(choice));
    }

    /// Shorthand for a time click.
    pub fn toggle_time(&mut self, choice: Choice<DurationBucket>) {
        self.toggle(FilterToggle::Time(choice));
    }

    /// Whether `record` passes every set dimension.
    #[must_use]
    pub fn matches(&self, record: &PlaceRecord) -> bool {
        self.category.is_none_or(|c| c.admits(record.category))
            && self.time.is_none_or(|t| t.admits(record.duration_bucket))
    }

    /// Whether neither dimension restricts anything.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        !matches!(self.category, Some(Choice::Only(_))) && !matches!(self.time, Some(Choice::Only(_)))
    }
}

fn toggle_slot<T: PartialEq + Copy>(slot: &mut Option<T>, value: T) {
    *slot = if *slot == Some(value) { None } else { Some(value) };
}

/// Anchor followed by every store record passing `selection`.
pub fn compute_visible(store: &PlaceStore, selection: &FilterSelection) -> Vec<PlaceRecord> {
    iter::once(anchor_record())
        .chain(store.records().iter().filter(|r| selection.matches(r)).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn place(category: Category, bucket: DurationBucket) -> PlaceRecord {
        PlaceRecord::new("p", category, bucket, 36.35, 127.39, "r")
    }

    fn store_strategy() -> impl Strategy<Value = PlaceStore> {
        prop::collection::vec(
            (
                prop::sample::select(Category::ALL),
                prop::sample::select(DurationBucket::ALL),
            ),
            0..80,
        )
        .prop_map(|pairs| {
            PlaceStore::from_records(pairs.into_iter().map(|(c, b)| place(c, b)).collect())
        })
    }

    fn category_choice() -> impl Strategy<Value = Choice<Category>> {
        prop_oneof![
            Just(Choice::All),
            prop::sample::select(Category::ALL).prop_map(Choice::Only),
        ]
    }

    fn time_choice() -> impl Strategy<Value = Choice<DurationBucket>> {
        prop_oneof![
            Just(Choice::All),
            prop::sample::select(DurationBucket::ALL).prop_map(Choice::Only),
        ]
    }

    fn selection_strategy() -> impl Strategy<Value = FilterSelection> {
        (
            prop::option::of(category_choice()),
            prop::option::of(time_choice()),
        )
            .prop_map(|(category, time)| FilterSelection { category, time })
    }

    #[test]
    fn toggle_sets_then_clears() {
        let mut sel = FilterSelection::default();
        sel.toggle_category(Choice::Only(Category::Food));
        assert_eq!(sel.category, Some(Choice::Only(Category::Food)));
        sel.toggle_category(Choice::Only(Category::Food));
        assert_eq!(sel.category, None);
    }

    #[test]
    fn toggle_different_value_replaces() {
        let mut sel = FilterSelection::default();
        sel.toggle_time(Choice::Only(DurationBucket::FiveMinutes));
        sel.toggle_time(Choice::Only(DurationBucket::ThirtyMinutes));
        assert_eq!(sel.time, Some(Choice::Only(DurationBucket::ThirtyMinutes)));
    }

    #[test]
    fn toggle_all_twice_clears() {
        let mut sel = FilterSelection::default();
        sel.toggle_category(Choice::All);
        assert_eq!(sel.category, Some(Choice::All));
        sel.toggle_category(Choice::All);
        assert_eq!(sel.category, None);
    }

    #[test]
    fn toggle_leaves_other_dimension_alone() {
        let mut sel = FilterSelection::default();
        sel.toggle_time(Choice::Only(DurationBucket::TenMinutes));
        sel.toggle_category(Choice::Only(Category::Cafe));
        assert_eq!(sel.time, Some(Choice::Only(DurationBucket::TenMinutes)));
    }

    #[test]
    fn both_dimensions_are_anded() {
        let sel = FilterSelection {
            category: Some(Choice::Only(Category::Cafe)),
            time: Some(Choice::Only(DurationBucket::TenMinutes)),
        };
        assert!(sel.matches(&place(Category::Cafe, DurationBucket::TenMinutes)));
        assert!(!sel.matches(&place(Category::Cafe, DurationBucket::FiveMinutes)));
        assert!(!sel.matches(&place(Category::Food, DurationBucket::TenMinutes)));
    }

    #[test]
    fn visible_starts_with_anchor() {
        let store = PlaceStore::from_records(vec![place(Category::Food, DurationBucket::FiveMinutes)]);
        let visible = compute_visible(&store, &FilterSelection::default());
        assert!(visible[0].is_anchor());
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn food_then_refood_scenario() {
        let store = PlaceStore::load(&crate::places::RandomPlaceSource::new(50).with_seed(9)).unwrap();
        let food = store.count_category(Category::Food);

        let mut sel = FilterSelection::default();
        sel.toggle_category(Choice::Only(Category::Food));
        sel.toggle_time(Choice::All);
        let visible = compute_visible(&store, &sel);
        assert_eq!(visible.len(), food + 1);
        assert!(visible.iter().skip(1).all(|p| p.category == Category::Food));

        sel.toggle_category(Choice::Only(Category::Food));
        assert_eq!(compute_visible(&store, &sel).len(), 51);
    }

    #[test]
    fn toggle_serde_shape() {
        let t: FilterToggle =
            serde_json::from_str(r#"{"dimension":"category","value":"food"}"#).unwrap();
        assert_eq!(t, FilterToggle::Category(Choice::Only(Category::Food)));

        let t: FilterToggle = serde_json::from_str(r#"{"dimension":"time","value":"all"}"#).unwrap();
        assert_eq!(t, FilterToggle::Time(Choice::All));
        assert_eq!(t.dimension(), Dimension::Time);

        let json = serde_json::to_value(FilterToggle::Time(Choice::Only(DurationBucket::HourOrMore)))
            .unwrap();
        assert_eq!(json, serde_json::json!({"dimension": "time", "value": "60m+"}));
    }

    #[test]
    fn toggle_rejects_unknown_value() {
        let res = serde_json::from_str::<FilterToggle>(r#"{"dimension":"category","value":"zoo"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn selection_serializes_unset_as_null() {
        let json = serde_json::to_value(FilterSelection::default()).unwrap();
        assert_eq!(json, serde_json::json!({"category": null, "time": null}));
    }

    proptest! {
        #[test]
        fn double_toggle_restores_unset(c in category_choice(), t in time_choice()) {
            let mut sel = FilterSelection::default();
            sel.toggle_category(c);
            sel.toggle_category(c);
            sel.toggle_time(t);
            sel.toggle_time(t);
            prop_assert_eq!(sel, FilterSelection::default());
        }

        #[test]
        fn double_toggle_of_active_value_restores(sel in selection_strategy(), c in category_choice()) {
            let mut sel = sel;
            sel.category = Some(c);
            let before = sel;
            sel.toggle_category(c);
            sel.toggle_category(c);
            prop_assert_eq!(sel, before);
        }

        #[test]
        fn exactly_one_anchor(store in store_strategy(), sel in selection_strategy()) {
            let visible = compute_visible(&store, &sel);
            prop_assert_eq!(visible.iter().filter(|p| p.is_anchor()).count(), 1);
        }

        #[test]
        fn unrestricted_shows_everything(store in store_strategy(), c in prop::option::of(Just(Choice::All)), t in prop::option::of(Just(Choice::All))) {
            let sel = FilterSelection { category: c, time: t };
            prop_assert!(sel.is_unrestricted());
            prop_assert_eq!(compute_visible(&store, &sel).len(), store.len() + 1);
        }

        #[test]
        fn category_selection_counts(store in store_strategy(), c in prop::sample::select(Category::ALL)) {
            let mut sel = FilterSelection::default();
            sel.toggle_category(Choice::Only(c));
            prop_assert_eq!(compute_visible(&store, &sel).len(), store.count_category(c) + 1);
        }
    }
}
