//! Requirements normalization: turns requirements into the ordered room
//! descriptor list the grid planner consumes.
//!
//! Malformed input never fails here: blank names become "Room", unknown
//! size labels keep the type default, and unknown space types use the
//! generic template. The output always contains a storage room and is
//! sorted largest-first, which decides who gets the early grid cells.

use serde::{Deserialize, Serialize};

use crate::requirements::{Requirements, RoomRequest, RoomSource, UserPriority};
use crate::rooms::{
    infer_room_type, size_label_ratio, RoomType, SpaceType, MAX_TEMPLATE_BATHROOMS,
    MAX_TEMPLATE_BEDROOMS, SYNTHETIC_STORAGE_RATIO, TEMPLATE_BATHROOM_RATIO, TEMPLATE_SIZE_RATIO,
};

/// Name given to rooms whose requested name is missing or blank.
pub const PLACEHOLDER_ROOM_NAME: &str = "Room";

/// Floor tile for explicitly requested rooms that do not pick one.
pub const DEFAULT_FLOOR_TILE: &str = "parquet";

/// A normalized room, ready for placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDescriptor {
    pub name: String,
    pub room_type: RoomType,
    /// Size multiplier relative to a baseline grid cell.
    pub size_ratio: f64,
    /// Door quota from the room type.
    pub required_doors: u32,
    /// Explicit furniture keys; empty means "use the room type default".
    pub furniture: Vec<String>,
    /// Explicit accessory keys; empty means "use the room type default".
    pub accessories: Vec<String>,
    /// Explicit floor tile; `None` means "use the room type texture".
    pub floor_tile: Option<String>,
    pub user_priority: UserPriority,
}

impl RoomDescriptor {
    pub fn new(name: &str, room_type: RoomType, size_ratio: f64) -> Self {
        Self {
            name: name.to_string(),
            room_type,
            size_ratio,
            required_doors: room_type.spec().min_doors,
            furniture: Vec::new(),
            accessories: Vec::new(),
            floor_tile: None,
            user_priority: UserPriority::Functionality,
        }
    }
}

/// Normalize requirements into a storage-complete, largest-first list.
pub fn normalize_rooms(requirements: &Requirements) -> Vec<RoomDescriptor> {
    let priority = requirements.priority();
    let mut rooms = match requirements.room_source() {
        RoomSource::Explicit(requests) => requests
            .iter()
            .map(|r| explicit_room(r, priority))
            .collect(),
        RoomSource::Template {
            space_type,
            bedrooms,
            bathrooms,
        } => template_rooms(space_type, bedrooms, bathrooms, priority),
    };

    ensure_storage(&mut rooms, priority);
    sort_by_size(&mut rooms);
    log::debug!(
        "Normalized rooms: {}",
        rooms
            .iter()
            .map(|r| format!("{} ({}, {:.1})", r.name, r.room_type, r.size_ratio))
            .collect::<Vec<_>>()
            .join(", ")
    );
    rooms
}

fn explicit_room(request: &RoomRequest, priority: UserPriority) -> RoomDescriptor {
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty() && !n.eq_ignore_ascii_case(PLACEHOLDER_ROOM_NAME))
        .unwrap_or(PLACEHOLDER_ROOM_NAME);
    let room_type = infer_room_type(name);

    let size_ratio = request
        .size
        .as_deref()
        .and_then(size_label_ratio)
        .unwrap_or_else(|| room_type.spec().default_size_ratio);

    RoomDescriptor {
        furniture: request.furniture.clone(),
        accessories: request.accessories.clone(),
        floor_tile: Some(
            request
                .floor_tile
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FLOOR_TILE.to_string()),
        ),
        user_priority: priority,
        ..RoomDescriptor::new(name, room_type, size_ratio)
    }
}

/// Expand a space template. A positive bedroom/bathroom count replaces the
/// template's slots of that type with `count` numbered instances (capped);
/// a zero count keeps one instance per slot.
fn template_rooms(
    space_type: SpaceType,
    bedrooms: u32,
    bathrooms: u32,
    priority: UserPriority,
) -> Vec<RoomDescriptor> {
    let mut rooms = Vec::new();
    let mut bedroom_no = 0u32;
    let mut bathroom_no = 0u32;

    for (slot, &room_type) in space_type.template().iter().enumerate() {
        match room_type {
            RoomType::Bedroom => {
                let count = instance_count(bedrooms, MAX_TEMPLATE_BEDROOMS, bedroom_no);
                for _ in 0..count {
                    bedroom_no += 1;
                    rooms.push(RoomDescriptor::new(
                        &format!("Bedroom {}", bedroom_no),
                        RoomType::Bedroom,
                        TEMPLATE_SIZE_RATIO,
                    ));
                }
            }
            RoomType::Bathroom => {
                let count = instance_count(bathrooms, MAX_TEMPLATE_BATHROOMS, bathroom_no);
                for _ in 0..count {
                    bathroom_no += 1;
                    rooms.push(RoomDescriptor::new(
                        &format!("Bathroom {}", bathroom_no),
                        RoomType::Bathroom,
                        TEMPLATE_BATHROOM_RATIO,
                    ));
                }
            }
            other => rooms.push(RoomDescriptor::new(
                &other.template_name(slot),
                other,
                TEMPLATE_SIZE_RATIO,
            )),
        }
    }

    for room in &mut rooms {
        room.user_priority = priority;
    }
    rooms
}

/// Instances to emit at one template slot, given how many were emitted so far.
fn instance_count(requested: u32, cap: u32, emitted: u32) -> u32 {
    if requested == 0 {
        1
    } else if emitted == 0 {
        requested.min(cap)
    } else {
        0
    }
}

fn ensure_storage(rooms: &mut Vec<RoomDescriptor>, priority: UserPriority) {
    if rooms.iter().any(|r| r.room_type == RoomType::Storage) {
        return;
    }
    let mut storage = RoomDescriptor::new("Storage", RoomType::Storage, SYNTHETIC_STORAGE_RATIO);
    storage.user_priority = priority;
    rooms.push(storage);
}

/// Stable descending sort: equal ratios keep their request order.
fn sort_by_size(rooms: &mut [RoomDescriptor]) {
    rooms.sort_by(|a, b| b.size_ratio.total_cmp(&a.size_ratio));
}
