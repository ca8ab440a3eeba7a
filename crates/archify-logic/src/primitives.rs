//! Geometry records (vertices, walls, holes, areas, items) in the planner
//! client's wire shape, plus their constructors.
//!
//! Constructors are pure data builders: they fill in the fixed
//! prototype/type tags and the dimensions from `PlannerConfig`, nothing
//! else. Cross-references (vertex → wall, wall → hole) are maintained by
//! the layout state that owns the records.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{resolve_texture, CatalogEntry};
use crate::config::PlannerConfig;
use crate::constants::{
    hole_types, item_types, prototypes, BARE_ID_LEN, ID_ALPHABET, PREFIXED_ID_LEN, UNIT_CM,
};
use crate::rooms::RoomType;

/// Serializes as `{}`; used for the client's always-empty `misc` maps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyObject {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitLength {
    pub length: f64,
    pub unit: String,
}

impl UnitLength {
    pub fn cm(length: f64) -> Self {
        Self {
            length,
            unit: UNIT_CM.to_string(),
        }
    }
}

// ── Records ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub prototype: String,
    pub name: String,
    pub misc: EmptyObject,
    pub selected: bool,
    pub properties: EmptyObject,
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    /// Walls incident to this vertex.
    pub lines: Vec<String>,
    pub areas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallProperties {
    pub height: Length,
    pub thickness: Length,
    #[serde(rename = "textureA")]
    pub texture_a: String,
    #[serde(rename = "textureB")]
    pub texture_b: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub prototype: String,
    pub name: String,
    pub misc: EmptyObject,
    pub selected: bool,
    pub properties: WallProperties,
    pub visible: bool,
    /// Start and end vertex.
    pub vertices: Vec<String>,
    /// Hosted holes, in placement order.
    pub holes: Vec<String>,
}

/// Door swing flags. The client spells the hinged flag `flip_orizzontal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlipFlags {
    Sliding {
        flip_horizontal: String,
        flip_vertical: String,
    },
    Hinged {
        flip_orizzontal: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleProperties {
    pub width: UnitLength,
    pub height: UnitLength,
    pub altitude: UnitLength,
    pub thickness: UnitLength,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub flip: Option<FlipFlags>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub prototype: String,
    pub name: String,
    pub misc: EmptyObject,
    pub selected: bool,
    pub properties: HoleProperties,
    pub visible: bool,
    /// Position along the host wall, 0 at its first vertex.
    pub offset: f64,
    /// Host wall.
    pub line: String,
}

impl Hole {
    pub fn is_door(&self) -> bool {
        hole_types::is_door(&self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaProperties {
    pub pattern_color: String,
    pub thickness: Length,
    pub texture: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub prototype: String,
    /// Room display name.
    pub name: String,
    pub misc: EmptyObject,
    pub selected: bool,
    pub properties: AreaProperties,
    pub visible: bool,
    /// Polygon corners in order.
    pub vertices: Vec<String>,
    pub holes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelProperties {
    pub text: String,
    pub font_size: Length,
    pub color: String,
    pub background_color: String,
    pub padding: Length,
    pub font_weight: String,
    pub text_align: String,
    pub border_radius: Length,
    pub border_color: String,
    pub border_width: Length,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemProperties {
    Label(LabelProperties),
    Plain(EmptyObject),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub prototype: String,
    pub name: String,
    pub misc: EmptyObject,
    pub selected: bool,
    pub properties: ItemProperties,
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
}

// ── Constructors ────────────────────────────────────────────────────────

pub fn vertex(id: &str, x: f64, y: f64) -> Vertex {
    Vertex {
        id: id.to_string(),
        kind: String::new(),
        prototype: prototypes::VERTICES.to_string(),
        name: "Vertex".to_string(),
        misc: EmptyObject {},
        selected: false,
        properties: EmptyObject {},
        visible: true,
        x,
        y,
        lines: Vec::new(),
        areas: Vec::new(),
    }
}

pub fn wall(id: &str, v1: &str, v2: &str, config: &PlannerConfig) -> Wall {
    Wall {
        id: id.to_string(),
        kind: "wall".to_string(),
        prototype: prototypes::LINES.to_string(),
        name: "Wall".to_string(),
        misc: EmptyObject {},
        selected: false,
        properties: WallProperties {
            height: Length {
                length: config.wall_height,
            },
            thickness: Length {
                length: config.wall_thickness,
            },
            texture_a: config.wall_texture_a.clone(),
            texture_b: config.wall_texture_b.clone(),
        },
        visible: true,
        vertices: vec![v1.to_string(), v2.to_string()],
        holes: Vec::new(),
    }
}

/// Hinged interior door.
pub fn door(id: &str, wall_id: &str, offset: f64, config: &PlannerConfig) -> Hole {
    Hole {
        id: id.to_string(),
        kind: hole_types::DOOR.to_string(),
        prototype: prototypes::HOLES.to_string(),
        name: "Door".to_string(),
        misc: EmptyObject {},
        selected: false,
        properties: HoleProperties {
            width: UnitLength::cm(config.door_width),
            height: UnitLength::cm(config.door_height),
            altitude: UnitLength::cm(0.0),
            thickness: UnitLength::cm(config.hole_thickness),
            flip: Some(FlipFlags::Hinged {
                flip_orizzontal: false,
            }),
        },
        visible: true,
        offset,
        line: wall_id.to_string(),
    }
}

/// Sliding main entrance door, at least `entrance_min_width` wide.
pub fn main_entrance(id: &str, wall_id: &str, offset: f64, config: &PlannerConfig) -> Hole {
    Hole {
        id: id.to_string(),
        kind: hole_types::SLIDING_DOOR.to_string(),
        prototype: prototypes::HOLES.to_string(),
        name: "Main Entrance".to_string(),
        misc: EmptyObject {},
        selected: false,
        properties: HoleProperties {
            width: UnitLength::cm(config.door_width.max(config.entrance_min_width)),
            height: UnitLength::cm(config.door_height),
            altitude: UnitLength::cm(0.0),
            thickness: UnitLength::cm(config.hole_thickness),
            flip: Some(FlipFlags::Sliding {
                flip_horizontal: "none".to_string(),
                flip_vertical: "right".to_string(),
            }),
        },
        visible: true,
        offset,
        line: wall_id.to_string(),
    }
}

pub fn window(id: &str, wall_id: &str, offset: f64, config: &PlannerConfig) -> Hole {
    Hole {
        id: id.to_string(),
        kind: hole_types::WINDOW.to_string(),
        prototype: prototypes::HOLES.to_string(),
        name: "Window".to_string(),
        misc: EmptyObject {},
        selected: false,
        properties: HoleProperties {
            width: UnitLength::cm(config.window_width),
            height: UnitLength::cm(config.window_height),
            altitude: UnitLength::cm(config.window_altitude),
            thickness: UnitLength::cm(config.hole_thickness),
            flip: None,
        },
        visible: true,
        offset,
        line: wall_id.to_string(),
    }
}

/// Room polygon. An explicit floor tile overrides the room type texture.
pub fn area(
    id: &str,
    room_name: &str,
    room_type: RoomType,
    vertices: Vec<String>,
    floor_tile: Option<&str>,
) -> Area {
    let texture = floor_tile.unwrap_or(room_type.spec().texture);
    Area {
        id: id.to_string(),
        kind: "area".to_string(),
        prototype: prototypes::AREAS.to_string(),
        name: room_name.to_string(),
        misc: EmptyObject {},
        selected: false,
        properties: AreaProperties {
            pattern_color: "#F5F4F4".to_string(),
            thickness: Length { length: 0.0 },
            texture: resolve_texture(texture),
        },
        visible: true,
        vertices,
        holes: Vec::new(),
    }
}

/// Font size for a room label, nudged by how wide the room's cell is.
pub fn label_font_size(room_type: RoomType, cell_width: f64) -> f64 {
    let base = room_type.spec().label_font_size as f64;
    if cell_width > 400.0 {
        (base + 5.0).min(40.0)
    } else if cell_width < 250.0 {
        (base - 5.0).max(24.0)
    } else {
        base
    }
}

/// Centered room name label.
pub fn room_label(
    id: &str,
    room_name: &str,
    x: f64,
    y: f64,
    room_type: RoomType,
    cell_width: f64,
) -> Item {
    let spec = room_type.spec();
    Item {
        id: id.to_string(),
        kind: item_types::TEXT.to_string(),
        prototype: prototypes::ITEMS.to_string(),
        name: format!("{} Label", room_name),
        misc: EmptyObject {},
        selected: false,
        properties: ItemProperties::Label(LabelProperties {
            text: room_name.to_string(),
            font_size: Length {
                length: label_font_size(room_type, cell_width),
            },
            color: "#000000".to_string(),
            background_color: format!("{}CC", spec.label_color),
            padding: Length { length: 15.0 },
            font_weight: "bold".to_string(),
            text_align: "center".to_string(),
            border_radius: Length { length: 8.0 },
            border_color: "#000000".to_string(),
            border_width: Length { length: 2.0 },
        }),
        visible: true,
        x,
        y,
        rotation: 0.0,
    }
}

pub fn catalog_item(id: &str, entry: &CatalogEntry, x: f64, y: f64, rotation: f64) -> Item {
    Item {
        id: id.to_string(),
        kind: entry.item_type.to_string(),
        prototype: prototypes::ITEMS.to_string(),
        name: entry.name.to_string(),
        misc: EmptyObject {},
        selected: false,
        properties: ItemProperties::Plain(EmptyObject {}),
        visible: true,
        x,
        y,
        rotation,
    }
}

// ── Identifiers ─────────────────────────────────────────────────────────

/// Issues random identifiers, never the same one twice.
#[derive(Debug, Default)]
pub struct IdGenerator {
    issued: HashSet<String>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `prefix-XXXXXXXXXX`, or an 11-character bare id when `prefix` is `None`.
    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R, prefix: Option<&str>) -> String {
        loop {
            let id = match prefix {
                Some(p) => format!("{}-{}", p, random_chars(rng, PREFIXED_ID_LEN)),
                None => random_chars(rng, BARE_ID_LEN),
            };
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}

fn random_chars<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::{json, Value};

    #[test]
    fn test_vertex_wire_shape() {
        let v = serde_json::to_value(vertex("v1", 10.0, 20.5)).unwrap();
        assert_eq!(
            v,
            json!({
                "id": "v1", "type": "", "prototype": "vertices", "name": "Vertex",
                "misc": {}, "selected": false, "properties": {}, "visible": true,
                "x": 10.0, "y": 20.5, "lines": [], "areas": []
            })
        );
    }

    #[test]
    fn test_wall_properties() {
        let config = PlannerConfig::default();
        let w = serde_json::to_value(wall("w1", "a", "b", &config)).unwrap();
        assert_eq!(w["type"], "wall");
        assert_eq!(w["prototype"], "lines");
        assert_eq!(w["properties"]["height"]["length"], 300.0);
        assert_eq!(w["properties"]["thickness"]["length"], 20.0);
        assert_eq!(w["properties"]["textureA"], "painted");
        assert_eq!(w["properties"]["textureB"], "painted");
        assert_eq!(w["vertices"], json!(["a", "b"]));
    }

    #[test]
    fn test_door_flags() {
        let config = PlannerConfig::default();
        let d = serde_json::to_value(door("door-1", "w1", 0.4, &config)).unwrap();
        assert_eq!(d["type"], "door");
        assert_eq!(d["properties"]["flip_orizzontal"], false);
        assert_eq!(d["properties"]["width"], json!({"length": 80.0, "unit": "cm"}));
        assert_eq!(d["line"], "w1");

        let e = serde_json::to_value(main_entrance("door-2", "w0", 0.1, &config)).unwrap();
        assert_eq!(e["type"], "sliding door");
        assert_eq!(e["name"], "Main Entrance");
        assert_eq!(e["properties"]["width"]["length"], 200.0);
        assert_eq!(e["properties"]["flip_horizontal"], "none");
        assert_eq!(e["properties"]["flip_vertical"], "right");
    }

    #[test]
    fn test_window_has_no_flip_flags() {
        let config = PlannerConfig::default();
        let w = serde_json::to_value(window("win-1", "w1", 0.2, &config)).unwrap();
        let props = w["properties"].as_object().unwrap();
        assert_eq!(props.len(), 4);
        assert_eq!(w["properties"]["altitude"]["length"], 90.0);
    }

    #[test]
    fn test_hole_reads_back_with_flags() {
        let config = PlannerConfig::default();
        for hole in [
            door("d", "w", 0.5, &config),
            main_entrance("m", "w", 0.1, &config),
            window("x", "w", 0.2, &config),
        ] {
            let json = serde_json::to_string(&hole).unwrap();
            let back: Hole = serde_json::from_str(&json).unwrap();
            assert_eq!(back, hole);
        }
    }

    #[test]
    fn test_area_texture_override() {
        let a = area("area-1", "Bath", RoomType::Bathroom, vec![], None);
        assert_eq!(a.properties.texture, "#ceramic");
        let b = area("area-2", "Bath", RoomType::Bathroom, vec![], Some("grass"));
        assert_eq!(b.properties.texture, "#grass");
        let c = area("area-3", "Office", RoomType::Office, vec![], None);
        assert_eq!(c.properties.texture, "carpet");
        let v: Value = serde_json::to_value(&c).unwrap();
        assert_eq!(v["properties"]["patternColor"], "#F5F4F4");
    }

    #[test]
    fn test_label_font_size_adjustment() {
        assert_eq!(label_font_size(RoomType::Living, 500.0), 39.0);
        assert_eq!(label_font_size(RoomType::Bedroom, 300.0), 30.0);
        assert_eq!(label_font_size(RoomType::Bathroom, 200.0), 24.0);
        assert_eq!(label_font_size(RoomType::Kitchen, 200.0), 27.0);
    }

    #[test]
    fn test_label_wire_shape() {
        let item = room_label("label-1", "Kitchen", 5.0, 6.0, RoomType::Kitchen, 300.0);
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["type"], "text");
        assert_eq!(v["name"], "Kitchen Label");
        assert_eq!(v["properties"]["backgroundColor"], "#FFD700CC");
        assert_eq!(v["properties"]["fontSize"]["length"], 32.0);
        assert_eq!(v["rotation"], 0.0);
    }

    #[test]
    fn test_ids_unique_and_prefixed() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ids = IdGenerator::new();
        let bare = ids.next(&mut rng, None);
        assert_eq!(bare.len(), BARE_ID_LEN);
        let door = ids.next(&mut rng, Some("door"));
        assert!(door.starts_with("door-"));
        assert_eq!(door.len(), "door-".len() + PREFIXED_ID_LEN);

        let mut seen = HashSet::new();
        for _ in 0..500 {
            assert!(seen.insert(ids.next(&mut rng, Some("item"))));
        }
        assert_eq!(ids.issued_count(), 502);
    }
}
