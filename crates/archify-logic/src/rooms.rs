//! Room types, space templates and size tables.
//!
//! Everything here is an immutable lookup table keyed by an enum: room
//! behaviours (door quotas, textures, default furnishing, label styling),
//! the space-type → room sequence templates, and the size label ratios.

use serde::{Deserialize, Serialize};

/// Room type tag carried by areas and room descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Bedroom,
    Bathroom,
    Kitchen,
    Living,
    Office,
    Classroom,
    Dining,
    Storage,
    Generic,
    // Template-only types. They behave like `Generic` apart from sizing.
    Reception,
    Meeting,
    Lobby,
    #[serde(rename = "room")]
    GuestRoom,
    Waiting,
    Consultation,
    Showroom,
}

/// Behaviour and styling of one room type.
#[derive(Debug, Clone)]
pub struct RoomTypeSpec {
    pub min_doors: u32,
    pub max_doors: u32,
    pub max_windows: u32,
    /// Floor texture before the special-texture mapping.
    pub texture: &'static str,
    /// Default furniture catalog keys.
    pub furniture: &'static [&'static str],
    /// Default accessory catalog keys.
    pub accessories: &'static [&'static str],
    pub label_color: &'static str,
    pub label_font_size: u32,
    /// Size ratio used when an explicit room list names this type.
    pub default_size_ratio: f64,
}

const GENERIC_SPEC: RoomTypeSpec = RoomTypeSpec {
    min_doors: 1,
    max_doors: 2,
    max_windows: 2,
    texture: "parquet",
    furniture: &[],
    accessories: &[],
    label_color: "#F5F5F5",
    label_font_size: 30,
    default_size_ratio: 1.5,
};

impl RoomType {
    pub fn spec(&self) -> RoomTypeSpec {
        match self {
            Self::Bedroom => RoomTypeSpec {
                min_doors: 1,
                max_doors: 2,
                max_windows: 3,
                texture: "parquet",
                furniture: &["bed", "wardrobe", "desk", "chair"],
                accessories: &["image", "hanger", "radiator", "smoke-detector"],
                label_color: "#FFE4B5",
                label_font_size: 30,
                default_size_ratio: 2.0,
            },
            Self::Bathroom => RoomTypeSpec {
                min_doors: 1,
                max_doors: 1,
                max_windows: 1,
                texture: "ceramic",
                furniture: &["toilet", "sink", "shower"],
                accessories: &["radiator", "smoke-detector", "trash"],
                label_color: "#AFEEEE",
                label_font_size: 28,
                default_size_ratio: 0.8,
            },
            Self::Kitchen => RoomTypeSpec {
                min_doors: 1,
                max_doors: 2,
                max_windows: 2,
                texture: "tile1",
                furniture: &["kitchen", "fridge", "sink", "canteen-table"],
                accessories: &["trash", "smoke-detector", "fire-extinguisher", "radiator"],
                label_color: "#FFD700",
                label_font_size: 32,
                default_size_ratio: 1.5,
            },
            Self::Living => RoomTypeSpec {
                min_doors: 1,
                max_doors: 3,
                max_windows: 4,
                texture: "parquet",
                furniture: &["sofa", "tv", "table", "armchairs"],
                accessories: &["radiator", "smoke-detector", "image", "coat-hook"],
                label_color: "#FFB6C1",
                label_font_size: 34,
                default_size_ratio: 2.0,
            },
            Self::Office => RoomTypeSpec {
                min_doors: 1,
                max_doors: 2,
                max_windows: 2,
                texture: "carpet",
                furniture: &["desk", "chair", "bookcase", "monitor_pc"],
                accessories: &[
                    "router-wifi",
                    "radiator",
                    "smoke-detector",
                    "fire-extinguisher",
                    "image",
                ],
                label_color: "#D8BFD8",
                label_font_size: 30,
                default_size_ratio: 2.5,
            },
            Self::Classroom => RoomTypeSpec {
                min_doors: 1,
                max_doors: 2,
                max_windows: 3,
                texture: "strand_porcelain",
                furniture: &["desks", "blackboard", "projector", "teacher_desk"],
                accessories: &[],
                label_color: "#B0E0E6",
                label_font_size: 32,
                default_size_ratio: 2.5,
            },
            Self::Dining => RoomTypeSpec {
                min_doors: 1,
                max_doors: 2,
                max_windows: 3,
                texture: "parquet",
                furniture: &["dining_table", "chairs", "sideboard"],
                accessories: &[],
                label_color: "#F0E68C",
                label_font_size: 32,
                default_size_ratio: 1.5,
            },
            Self::Storage => RoomTypeSpec {
                min_doors: 1,
                max_doors: 1,
                max_windows: 0,
                texture: "concrete",
                furniture: &["shelves", "racks"],
                accessories: &[],
                label_color: "#D3D3D3",
                label_font_size: 28,
                default_size_ratio: 0.6,
            },
            Self::Generic | Self::Lobby | Self::GuestRoom | Self::Showroom => GENERIC_SPEC,
            Self::Meeting => RoomTypeSpec {
                default_size_ratio: 2.0,
                ..GENERIC_SPEC
            },
            Self::Reception => RoomTypeSpec {
                default_size_ratio: 1.8,
                ..GENERIC_SPEC
            },
            Self::Waiting => RoomTypeSpec {
                default_size_ratio: 1.2,
                ..GENERIC_SPEC
            },
            Self::Consultation => GENERIC_SPEC,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bedroom => "bedroom",
            Self::Bathroom => "bathroom",
            Self::Kitchen => "kitchen",
            Self::Living => "living",
            Self::Office => "office",
            Self::Classroom => "classroom",
            Self::Dining => "dining",
            Self::Storage => "storage",
            Self::Generic => "generic",
            Self::Reception => "reception",
            Self::Meeting => "meeting",
            Self::Lobby => "lobby",
            Self::GuestRoom => "room",
            Self::Waiting => "waiting",
            Self::Consultation => "consultation",
            Self::Showroom => "showroom",
        }
    }

    /// Canonical display name when a template generates this room.
    /// `slot` is the room's index within the template.
    pub fn template_name(&self, slot: usize) -> String {
        match self {
            Self::Living => "Living Room".to_string(),
            Self::Kitchen => "Kitchen".to_string(),
            Self::Office => format!("Office {}", slot),
            Self::Classroom => "Classroom".to_string(),
            Self::Dining => "Dining Room".to_string(),
            Self::Storage => "Storage".to_string(),
            Self::Reception => "Reception".to_string(),
            Self::Meeting => "Meeting Room".to_string(),
            Self::Waiting => "Waiting Area".to_string(),
            Self::Consultation => format!("Consultation Room {}", slot),
            Self::Showroom => "Showroom".to_string(),
            Self::Lobby => "Lobby".to_string(),
            Self::Bedroom | Self::Bathroom | Self::Generic | Self::GuestRoom => {
                format!("Room {}", slot + 1)
            }
        }
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name keywords per inferred type, checked in order; first hit wins.
const TYPE_KEYWORDS: &[(RoomType, &[&str])] = &[
    (RoomType::Bedroom, &["bed", "sleep", "master", "guest"]),
    (
        RoomType::Bathroom,
        &["bath", "toilet", "wc", "restroom", "lavatory"],
    ),
    (RoomType::Kitchen, &["kitchen", "cook", "pantry"]),
    (RoomType::Living, &["living", "lounge", "family", "sitting"]),
    (RoomType::Office, &["office", "study", "library"]),
    (
        RoomType::Classroom,
        &["class", "school", "lecture", "training"],
    ),
    (
        RoomType::Dining,
        &["dining", "restaurant", "cafeteria", "eating"],
    ),
    (
        RoomType::Storage,
        &["storage", "closet", "wardrobe", "utility"],
    ),
    (RoomType::Lobby, &["lobby", "entry", "foyer"]),
    (RoomType::Office, &["meeting", "conference", "board"]),
];

/// Infer a room type from its display name (case-insensitive substring
/// match). Unmatched names, "Reception" included, are `Generic`.
pub fn infer_room_type(name: &str) -> RoomType {
    let lower = name.to_lowercase();
    TYPE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(rt, _)| *rt)
        .unwrap_or(RoomType::Generic)
}

/// Size ratio for a free-form size label, or `None` if unrecognized.
pub fn size_label_ratio(label: &str) -> Option<f64> {
    match label.trim().to_lowercase().as_str() {
        "xsmall" | "tiny" => Some(0.6),
        "compact" | "small" => Some(0.8),
        "medium" | "standard" | "normal" => Some(1.5),
        "large" | "big" | "spacious" => Some(2.0),
        "xlarge" | "huge" | "master" => Some(2.5),
        _ => None,
    }
}

/// Bedroom instances a template may generate.
pub const MAX_TEMPLATE_BEDROOMS: u32 = 5;
/// Bathroom instances a template may generate.
pub const MAX_TEMPLATE_BATHROOMS: u32 = 3;
/// Size ratio of template-generated rooms other than bathrooms.
pub const TEMPLATE_SIZE_RATIO: f64 = 1.5;
/// Size ratio of template-generated bathrooms.
pub const TEMPLATE_BATHROOM_RATIO: f64 = 0.8;
/// Size ratio of the storage room appended when none was requested.
pub const SYNTHETIC_STORAGE_RATIO: f64 = 0.8;

/// Kind of building the requirements describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceType {
    Apartment,
    Office,
    Classroom,
    Restaurant,
    House,
    Hotel,
    Clinic,
    Shop,
    /// Anything without a dedicated template (warehouse, gym, custom…).
    Other,
}

impl SpaceType {
    /// Resolve a free-form space type name. Unknown names map to `Other`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "apartment" => Self::Apartment,
            "office" => Self::Office,
            "classroom" => Self::Classroom,
            "restaurant" => Self::Restaurant,
            "house" => Self::House,
            "hotel" => Self::Hotel,
            "clinic" => Self::Clinic,
            "shop" => Self::Shop,
            _ => Self::Other,
        }
    }

    /// Room type sequence generated for this space.
    pub fn template(&self) -> &'static [RoomType] {
        use RoomType::*;
        match self {
            Self::Apartment => &[Living, Kitchen, Bedroom, Bedroom, Bathroom, Storage],
            Self::Office => &[Reception, Office, Office, Meeting, Bathroom, Storage],
            Self::Classroom => &[Classroom, Storage, Bathroom],
            Self::Restaurant => &[Dining, Kitchen, Bathroom, Bathroom, Storage],
            Self::House => &[
                Living, Kitchen, Bedroom, Bedroom, Bathroom, Dining, Storage,
            ],
            Self::Hotel => &[Lobby, GuestRoom, GuestRoom, GuestRoom, Bathroom, Storage],
            Self::Clinic => &[Waiting, Consultation, Consultation, Bathroom, Storage],
            Self::Shop => &[Showroom, Storage, Office, Bathroom],
            Self::Other => &[Generic, Generic, Storage],
        }
    }

    pub fn all() -> &'static [SpaceType] {
        &[
            Self::Apartment,
            Self::Office,
            Self::Classroom,
            Self::Restaurant,
            Self::House,
            Self::Hotel,
            Self::Clinic,
            Self::Shop,
            Self::Other,
        ]
    }
}
