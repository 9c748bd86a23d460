//! Render model handed to the external map collaborator.
//!
//! Mirrors a deck.gl scene: a light Mapbox base map centred on the anchor,
//! one icon layer for ordinary places, a larger blue icon layer for the
//! anchor, and a "현위치" label above it.

use std::collections::BTreeMap;

use junggu_core::places::{ANCHOR_ICON_KEY, ANCHOR_LATITUDE, ANCHOR_LONGITUDE};
use junggu_core::{Category, PlaceRecord, Selectable};
use serde::Serialize;

/// Base map style.
pub const MAP_STYLE: &str = "mapbox://styles/mapbox/light-v9";

/// Icon atlas image.
pub const ICON_ATLAS: &str =
    "https://raw.githubusercontent.com/visgl/deck.gl-data/master/website/icon-atlas.png";

/// Label drawn over the anchor.
pub const ANCHOR_LABEL: &str = "현위치";

const ICON_SIZE: u32 = 128;

/// Initial camera.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewState {
    /// Centre latitude.
    pub latitude: f64,
    /// Centre longitude.
    pub longitude: f64,
    /// Zoom level.
    pub zoom: u8,
    /// Camera pitch in degrees.
    pub pitch: u8,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            latitude: ANCHOR_LATITUDE,
            longitude: ANCHOR_LONGITUDE,
            zoom: 17,
            pitch: 0,
        }
    }
}

/// One sprite in the icon atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct IconFrame {
    /// Left edge in the atlas.
    pub x: u32,
    /// Top edge in the atlas.
    pub y: u32,
    /// Sprite width.
    pub width: u32,
    /// Sprite height.
    pub height: u32,
    /// Vertical anchor within the sprite.
    pub anchor_y: u32,
}

impl IconFrame {
    const fn at(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            width: ICON_SIZE,
            height: ICON_SIZE,
            anchor_y: ICON_SIZE,
        }
    }
}

fn frame_for(category: Category) -> IconFrame {
    match category {
        Category::Food => IconFrame::at(0, 0),
        Category::Attraction => IconFrame::at(128, 0),
        Category::Cafe => IconFrame::at(0, 128),
        Category::Shopping => IconFrame::at(128, 128),
        Category::Other => IconFrame::at(256, 0),
    }
}

/// Icon key → atlas frame for every category plus the anchor.
pub fn icon_mapping() -> BTreeMap<&'static str, IconFrame> {
    let mut mapping: BTreeMap<_, _> = Category::ALL
        .iter()
        .map(|&c| (c.icon_key(), frame_for(c)))
        .collect();
    let _ = mapping.insert(ANCHOR_ICON_KEY, IconFrame::at(0, 0));
    mapping
}

/// A text label at a coordinate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextLabel {
    /// Label text.
    pub text: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

/// A map layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Layer {
    /// Icons looked up by each record's `icon_key`.
    #[serde(rename = "IconLayer")]
    Icon {
        /// Layer ID.
        id: &'static str,
        /// Records drawn.
        data: Vec<PlaceRecord>,
        /// Icon size.
        size: u32,
        /// RGB tint, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<[u8; 3]>,
    },
    /// Text labels.
    #[serde(rename = "TextLayer")]
    Text {
        /// Layer ID.
        id: &'static str,
        /// Labels drawn.
        data: Vec<TextLabel>,
        /// Font size.
        size: u32,
        /// RGBA colour.
        color: [u8; 4],
        /// Pixel offset from the coordinate.
        offset: [i32; 2],
        /// Vertical alignment.
        alignment_baseline: &'static str,
    },
}

/// Everything the map collaborator needs to draw the visible set.
#[derive(Clone, Debug, Serialize)]
pub struct RenderModel {
    /// Initial camera.
    pub view: ViewState,
    /// Base map style.
    pub map_style: &'static str,
    /// Icon atlas image URL.
    pub icon_atlas: &'static str,
    /// Icon key → atlas frame.
    pub icon_mapping: BTreeMap<&'static str, IconFrame>,
    /// Layers, bottom first.
    pub layers: Vec<Layer>,
}

impl RenderModel {
    /// Build the scene for `visible`, splitting the anchor from the rest.
    pub fn from_visible(visible: Vec<PlaceRecord>) -> Self {
        let (anchor, places): (Vec<_>, Vec<_>) =
            visible.into_iter().partition(PlaceRecord::is_anchor);

        let labels = anchor
            .iter()
            .map(|a| TextLabel {
                text: ANCHOR_LABEL.to_string(),
                latitude: a.latitude,
                longitude: a.longitude,
            })
            .collect();

        Self {
            view: ViewState::default(),
            map_style: MAP_STYLE,
            icon_atlas: ICON_ATLAS,
            icon_mapping: icon_mapping(),
            layers: vec![
                Layer::Icon {
                    id: "places",
                    data: places,
                    size: 10,
                    color: None,
                },
                Layer::Icon {
                    id: "anchor",
                    data: anchor,
                    size: 15,
                    color: Some([0, 0, 255]),
                },
                Layer::Text {
                    id: "current-location",
                    data: labels,
                    size: 16,
                    color: [0, 0, 0, 255],
                    offset: [0, 40],
                    alignment_baseline: "top",
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use junggu_core::{DurationBucket, anchor_record};

    fn visible() -> Vec<PlaceRecord> {
        vec![
            anchor_record(),
            PlaceRecord::new("a", Category::Cafe, DurationBucket::TenMinutes, 36.35, 127.39, "r"),
            PlaceRecord::new("b", Category::Other, DurationBucket::FiveMinutes, 36.35, 127.39, "r"),
        ]
    }

    #[test]
    fn mapping_covers_every_key() {
        let m = icon_mapping();
        assert_eq!(m.len(), 6);
        assert_eq!(m["cafe"], IconFrame::at(0, 128));
        assert_eq!(m["shopping"], IconFrame::at(128, 128));
        assert_eq!(m["other"], IconFrame::at(256, 0));
        assert_eq!(m[ANCHOR_ICON_KEY], IconFrame::at(0, 0));
    }

    #[test]
    fn anchor_split_from_places() {
        let model = RenderModel::from_visible(visible());
        assert_eq!(model.layers.len(), 3);
        match &model.layers[0] {
            Layer::Icon { data, size, color, .. } => {
                assert_eq!(data.len(), 2);
                assert!(data.iter().all(|p| !p.is_anchor()));
                assert_eq!(*size, 10);
                assert!(color.is_none());
            }
            other => panic!("unexpected layer: {other:?}"),
        }
        match &model.layers[1] {
            Layer::Icon { data, size, color, .. } => {
                assert_eq!(data.len(), 1);
                assert!(data[0].is_anchor());
                assert_eq!(*size, 15);
                assert_eq!(*color, Some([0, 0, 255]));
            }
            other => panic!("unexpected layer: {other:?}"),
        }
        match &model.layers[2] {
            Layer::Text { data, offset, .. } => {
                assert_eq!(data.len(), 1);
                assert_eq!(data[0].text, ANCHOR_LABEL);
                assert_eq!(*offset, [0, 40]);
            }
            other => panic!("unexpected layer: {other:?}"),
        }
    }

    #[test]
    fn serialized_shape() {
        let json = serde_json::to_value(RenderModel::from_visible(visible())).unwrap();
        assert_eq!(json["view"]["zoom"], 17);
        assert_eq!(json["view"]["latitude"], 36.3277);
        assert_eq!(json["map_style"], MAP_STYLE);
        assert_eq!(json["icon_mapping"]["anchor"]["anchor_y"], 128);
        assert_eq!(json["layers"][0]["type"], "IconLayer");
        assert_eq!(json["layers"][2]["type"], "TextLayer");
        assert_eq!(json["layers"][2]["alignment_baseline"], "top");
        assert!(json["layers"][0].get("color").is_none());
    }
}
