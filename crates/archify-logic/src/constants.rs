//! Wire-format constants: prototype tags, hole types and id prefixes.
//!
//! These strings are read by the downstream planner client and must match
//! it exactly. Both the library and the harness use them.

pub mod prototypes {
    pub const VERTICES: &str = "vertices";
    pub const LINES: &str = "lines";
    pub const HOLES: &str = "holes";
    pub const AREAS: &str = "areas";
    pub const ITEMS: &str = "items";
}

pub mod hole_types {
    pub const DOOR: &str = "door";
    pub const SLIDING_DOOR: &str = "sliding door";
    pub const WINDOW: &str = "window";

    /// Returns true for any hole type that lets a person through.
    pub fn is_door(hole_type: &str) -> bool {
        hole_type.to_ascii_lowercase().contains(DOOR)
    }
}

pub mod item_types {
    /// Room name labels.
    pub const TEXT: &str = "text";
}

pub mod id_prefixes {
    pub const AREA: &str = "area";
    pub const DOOR: &str = "door";
    pub const WINDOW: &str = "win";
    pub const LABEL: &str = "label";
    pub const ITEM: &str = "item";
}

/// Characters used for generated identifiers.
pub const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Length of an unprefixed identifier.
pub const BARE_ID_LEN: usize = 11;

/// Length of the random part of a prefixed identifier.
pub const PREFIXED_ID_LEN: usize = 10;

pub const UNIT_CM: &str = "cm";
