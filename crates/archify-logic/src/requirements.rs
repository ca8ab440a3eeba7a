//! Floor-plan requirements as handed over by the conversation layer.
//!
//! The upstream extractor produces loosely-structured JSON; every field is
//! optional and defaults the way the planner expects. A field of the wrong
//! shape falls back too: numbers may arrive as strings, names as numbers,
//! lists as `null`. Only text that is not JSON at all is an error.
//! `Requirements::room_source`
//! turns the flat shape into an explicit choice between an explicit room
//! list and a space-type template.
//!
//! ```
//! use archify_logic::requirements::{Requirements, RoomSource};
//!
//! let req = Requirements::from_json(r#"{"space_type": "office", "num_bathrooms": 1}"#).unwrap();
//! assert!(matches!(req.room_source(), RoomSource::Template { bathrooms: 1, .. }));
//! assert_eq!(req.footprint().width_cm, 1000.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::rooms::SpaceType;

/// Largest footprint side accepted, in centimetres (1 km).
pub const MAX_FOOTPRINT_CM: f64 = 100_000.0;

/// One explicitly requested room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomRequest {
    #[serde(deserialize_with = "lenient::optional_text")]
    pub name: Option<String>,
    /// Free-form size label ("small", "large", "xlarge"…).
    #[serde(deserialize_with = "lenient::optional_text")]
    pub size: Option<String>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub furniture: Vec<String>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub accessories: Vec<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub floor_tile: Option<String>,
}

impl RoomRequest {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: &str) -> Self {
        self.size = Some(size.to_string());
        self
    }
}

/// Requirements for one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Requirements {
    #[serde(deserialize_with = "lenient::space_type")]
    pub space_type: String,
    #[serde(deserialize_with = "lenient::width_meters")]
    pub width_meters: f64,
    #[serde(deserialize_with = "lenient::height_meters")]
    pub height_meters: f64,
    #[serde(deserialize_with = "lenient::count")]
    pub num_bedrooms: u32,
    #[serde(deserialize_with = "lenient::count")]
    pub num_bathrooms: u32,
    #[serde(deserialize_with = "lenient::rooms")]
    pub rooms: Vec<RoomRequest>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub features: Vec<String>,
    #[serde(deserialize_with = "lenient::style")]
    pub style: String,
    #[serde(deserialize_with = "lenient::user_priority")]
    pub user_priority: String,
}

impl Default for Requirements {
    fn default() -> Self {
        Self {
            space_type: "apartment".to_string(),
            width_meters: 10.0,
            height_meters: 8.0,
            num_bedrooms: 0,
            num_bathrooms: 0,
            rooms: Vec::new(),
            features: Vec::new(),
            style: "modern".to_string(),
            user_priority: "functionality".to_string(),
        }
    }
}

/// Where the room list comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomSource<'a> {
    /// The caller named each room.
    Explicit(&'a [RoomRequest]),
    /// Rooms are generated from the space type's template.
    Template {
        space_type: SpaceType,
        bedrooms: u32,
        bathrooms: u32,
    },
}

/// What the user cares about most; scales the footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserPriority {
    Aesthetics,
    Functionality,
    SpaceOptimization,
    Luxury,
    Budget,
}

impl UserPriority {
    /// Unknown tags fall back to `Functionality`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "aesthetics" => Self::Aesthetics,
            "space_optimization" => Self::SpaceOptimization,
            "luxury" => Self::Luxury,
            "budget" => Self::Budget,
            _ => Self::Functionality,
        }
    }

    /// Multiplier applied to both footprint dimensions.
    pub fn footprint_scale(&self) -> f64 {
        match self {
            Self::SpaceOptimization => 0.9,
            Self::Luxury => 1.2,
            _ => 1.0,
        }
    }
}

/// Building outline in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width_cm: f64,
    pub height_cm: f64,
}

impl Footprint {
    pub fn new(width_cm: f64, height_cm: f64) -> Self {
        Self {
            width_cm,
            height_cm,
        }
    }

    /// Both sides within 1 cm..=[`MAX_FOOTPRINT_CM`]; NaN becomes 1 cm.
    pub fn bounded(self) -> Self {
        let side = |cm: f64| {
            if cm.is_nan() {
                1.0
            } else {
                cm.clamp(1.0, MAX_FOOTPRINT_CM)
            }
        };
        Self::new(side(self.width_cm), side(self.height_cm))
    }
}

impl Requirements {
    /// Parse requirements JSON. Missing or malformed fields take their
    /// defaults; only invalid JSON is an error.
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        serde_json::from_str(json).map_err(PlanError::Requirements)
    }

    pub fn room_source(&self) -> RoomSource<'_> {
        if self.rooms.is_empty() {
            RoomSource::Template {
                space_type: SpaceType::from_name(&self.space_type),
                bedrooms: self.num_bedrooms,
                bathrooms: self.num_bathrooms,
            }
        } else {
            RoomSource::Explicit(&self.rooms)
        }
    }

    pub fn priority(&self) -> UserPriority {
        UserPriority::from_name(&self.user_priority)
    }

    /// Footprint in whole centimetres after the priority scaling.
    /// Sides that come out NaN or below one centimetre fall back to the
    /// defaults; oversized ones, infinity included, clamp to
    /// [`MAX_FOOTPRINT_CM`].
    pub fn footprint(&self) -> Footprint {
        let defaults = Requirements::default();
        let scale = self.priority().footprint_scale();
        let scaled = |m: f64| ((m * 100.0).trunc() * scale).trunc();
        let to_cm = |m: f64, fallback: f64| {
            let cm = scaled(m);
            if cm >= 1.0 {
                cm.min(MAX_FOOTPRINT_CM)
            } else {
                scaled(fallback)
            }
        };
        Footprint::new(
            to_cm(self.width_meters, defaults.width_meters),
            to_cm(self.height_meters, defaults.height_meters),
        )
    }
}

/// Field deserializers that fall back instead of failing.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{Requirements, RoomRequest};

    fn number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn text(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn text_or<'de, D: Deserializer<'de>>(d: D, fallback: String) -> Result<String, D::Error> {
        Ok(text(&Value::deserialize(d)?).unwrap_or(fallback))
    }

    fn number_or<'de, D: Deserializer<'de>>(d: D, fallback: f64) -> Result<f64, D::Error> {
        Ok(number(&Value::deserialize(d)?).unwrap_or(fallback))
    }

    /// Whole, non-negative count. Anything else is 0.
    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let n = number(&Value::deserialize(d)?).unwrap_or(0.0);
        Ok(if n.is_finite() && n > 0.0 {
            n.trunc().min(u32::MAX as f64) as u32
        } else {
            0
        })
    }

    pub fn width_meters<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        number_or(d, Requirements::default().width_meters)
    }

    pub fn height_meters<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        number_or(d, Requirements::default().height_meters)
    }

    pub fn space_type<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        text_or(d, Requirements::default().space_type)
    }

    pub fn style<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        text_or(d, Requirements::default().style)
    }

    pub fn user_priority<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        text_or(d, Requirements::default().user_priority)
    }

    pub fn optional_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(text(&Value::deserialize(d)?))
    }

    /// A list of strings. A lone string is a one-item list; entries that
    /// are not text are dropped.
    pub fn text_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items.iter().filter_map(text).collect(),
            Value::String(s) => vec![s],
            _ => Vec::new(),
        })
    }

    /// Room objects, or bare names. Other entries are dropped.
    pub fn rooms<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<RoomRequest>, D::Error> {
        let Value::Array(items) = Value::deserialize(d)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                object @ Value::Object(_) => serde_json::from_value(object).ok(),
                Value::String(name) => Some(RoomRequest::named(&name)),
                _ => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let req = Requirements::from_json("{}").unwrap();
        assert_eq!(req, Requirements::default());
        assert_eq!(
            req.room_source(),
            RoomSource::Template {
                space_type: SpaceType::Apartment,
                bedrooms: 0,
                bathrooms: 0
            }
        );
    }

    #[test]
    fn test_explicit_rooms_win_over_template() {
        let req = Requirements::from_json(
            r#"{"space_type": "office", "num_bathrooms": 2, "rooms": [{"name": "Lab"}]}"#,
        )
        .unwrap();
        match req.room_source() {
            RoomSource::Explicit(rooms) => {
                assert_eq!(rooms.len(), 1);
                assert_eq!(rooms[0].name.as_deref(), Some("Lab"));
            }
            other => panic!("expected explicit rooms, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_room_entries_accepted() {
        let req = Requirements::from_json(r#"{"rooms": [{}, {"size": "large"}]}"#).unwrap();
        assert_eq!(req.rooms.len(), 2);
        assert_eq!(req.rooms[0], RoomRequest::default());
        assert_eq!(req.rooms[1].size.as_deref(), Some("large"));
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Requirements::from_json("not json").is_err());
        assert!(Requirements::from_json("{\"rooms\": [").is_err());
    }

    #[test]
    fn test_negative_counts_fall_back_to_zero() {
        let req = Requirements::from_json(r#"{"num_bedrooms": -1, "num_bathrooms": 2.7}"#).unwrap();
        assert_eq!(req.num_bedrooms, 0);
        assert_eq!(req.num_bathrooms, 2);
    }

    #[test]
    fn test_stringified_numbers_accepted() {
        let req = Requirements::from_json(
            r#"{"width_meters": "12.5", "height_meters": " 6 ", "num_bedrooms": "3"}"#,
        )
        .unwrap();
        assert_eq!(req.width_meters, 12.5);
        assert_eq!(req.height_meters, 6.0);
        assert_eq!(req.num_bedrooms, 3);
    }

    #[test]
    fn test_wrong_shapes_take_defaults() {
        let req = Requirements::from_json(
            r#"{"space_type": null, "width_meters": "wide", "height_meters": [8],
                "rooms": 3, "features": {"a": 1}, "style": false, "user_priority": 4}"#,
        )
        .unwrap();
        let defaults = Requirements::default();
        assert_eq!(req.space_type, defaults.space_type);
        assert_eq!(req.width_meters, defaults.width_meters);
        assert_eq!(req.height_meters, defaults.height_meters);
        assert!(req.rooms.is_empty());
        assert!(req.features.is_empty());
        assert_eq!(req.style, "false");
        assert_eq!(req.priority(), UserPriority::Functionality);
    }

    #[test]
    fn test_room_entries_coerced() {
        let req = Requirements::from_json(
            r#"{"rooms": [{"name": 7}, {"name": null, "furniture": null},
                          "Kitchen", 42, {"furniture": ["desk", 3, null], "accessories": "trash"}]}"#,
        )
        .unwrap();
        assert_eq!(req.rooms.len(), 4);
        assert_eq!(req.rooms[0].name.as_deref(), Some("7"));
        assert_eq!(req.rooms[1], RoomRequest::default());
        assert_eq!(req.rooms[2], RoomRequest::named("Kitchen"));
        assert_eq!(req.rooms[3].furniture, vec!["desk", "3"]);
        assert_eq!(req.rooms[3].accessories, vec!["trash"]);
    }

    #[test]
    fn test_footprint_priority_scaling() {
        let mut req = Requirements::default();
        assert_eq!(req.footprint(), Footprint::new(1000.0, 800.0));

        req.user_priority = "space_optimization".to_string();
        assert_eq!(req.footprint(), Footprint::new(900.0, 720.0));

        req.user_priority = "luxury".to_string();
        assert_eq!(req.footprint(), Footprint::new(1200.0, 960.0));
    }

    #[test]
    fn test_footprint_rejects_nonsense_dimensions() {
        let req = Requirements {
            width_meters: -4.0,
            height_meters: f64::NAN,
            ..Default::default()
        };
        assert_eq!(req.footprint(), Footprint::new(1000.0, 800.0));
    }

    #[test]
    fn test_huge_dimensions_clamped() {
        let req = Requirements::from_json(r#"{"width_meters": 1e307, "height_meters": 8}"#).unwrap();
        assert_eq!(req.footprint(), Footprint::new(MAX_FOOTPRINT_CM, 800.0));

        let req = Requirements {
            width_meters: 0.001,
            height_meters: f64::INFINITY,
            user_priority: "luxury".to_string(),
            ..Default::default()
        };
        assert_eq!(req.footprint(), Footprint::new(1200.0, MAX_FOOTPRINT_CM));
    }

    #[test]
    fn test_unknown_priority_is_functionality() {
        assert_eq!(UserPriority::from_name("vibes"), UserPriority::Functionality);
        assert_eq!(UserPriority::from_name("Luxury"), UserPriority::Luxury);
    }
}
