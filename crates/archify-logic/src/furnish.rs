//! Furniture and accessory placement.
//!
//! Furniture goes at fixed offsets around the room centroid, one item per
//! quadrant; accessories sit inset from the bounding-box corners. Keys the
//! catalog does not know are skipped and still use up their slot.

use rand::Rng;

use crate::catalog;
use crate::config::PlannerConfig;
use crate::constants::id_prefixes;
use crate::normalize::RoomDescriptor;
use crate::planner::{LayoutState, Rect};
use crate::primitives;

/// Mean of the polygon's corners.
pub fn centroid(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
    Some((sx / n, sy / n))
}

pub fn bounding_box(points: &[(f64, f64)]) -> Option<Rect> {
    let (&(fx, fy), rest) = points.split_first()?;
    let init = Rect::new(fx, fy, fx, fy);
    Some(rest.iter().fold(init, |r, &(x, y)| {
        Rect::new(r.x1.min(x), r.y1.min(y), r.x2.max(x), r.y2.max(y))
    }))
}

/// Furniture slots: (-,-), (+,-), (-,+), (+,+) around the centroid.
pub fn furniture_slots(center: (f64, f64), spread: f64) -> [(f64, f64); 4] {
    let (cx, cy) = center;
    [
        (cx - spread, cy - spread),
        (cx + spread, cy - spread),
        (cx - spread, cy + spread),
        (cx + spread, cy + spread),
    ]
}

/// Accessory slots, inset from each bounding-box corner.
pub fn accessory_slots(bbox: Rect, inset: f64) -> [(f64, f64); 4] {
    [
        (bbox.x1 + inset, bbox.y1 + inset),
        (bbox.x2 - inset, bbox.y1 + inset),
        (bbox.x1 + inset, bbox.y2 - inset),
        (bbox.x2 - inset, bbox.y2 - inset),
    ]
}

/// Explicit keys win; an empty list falls back to the room type defaults.
fn resolve_keys(explicit: &[String], defaults: &[&str]) -> Vec<String> {
    if explicit.is_empty() {
        defaults.iter().map(|k| k.to_string()).collect()
    } else {
        explicit.to_vec()
    }
}

/// Place furniture and accessories for every room. `descriptors` is
/// indexed like `state.rooms`. Returns the number of items placed.
pub fn furnish_rooms<R: Rng + ?Sized>(
    state: &mut LayoutState,
    descriptors: &[RoomDescriptor],
    config: &PlannerConfig,
    rng: &mut R,
) -> usize {
    let rooms = state.rooms.clone();
    let mut placed = 0;
    for (room, descriptor) in rooms.iter().zip(descriptors) {
        let polygon = state.polygon(&room.area_id);
        let (Some(center), Some(bbox)) = (centroid(&polygon), bounding_box(&polygon)) else {
            log::warn!("{}: no polygon, skipping furniture", room.name);
            continue;
        };
        let spec = room.room_type.spec();

        let furniture = resolve_keys(&descriptor.furniture, spec.furniture);
        let slots = furniture_slots(center, config.furniture_spread);
        placed += place_keys(
            state,
            &furniture,
            &slots[..config.max_furniture_per_room.min(4)],
            rng,
        );

        let accessories = resolve_keys(&descriptor.accessories, spec.accessories);
        let slots = accessory_slots(bbox, config.accessory_inset);
        placed += place_keys(
            state,
            &accessories,
            &slots[..config.max_accessories_per_room.min(4)],
            rng,
        );
    }
    log::debug!("Placed {} furniture and accessory items", placed);
    placed
}

fn place_keys<R: Rng + ?Sized>(
    state: &mut LayoutState,
    keys: &[String],
    slots: &[(f64, f64)],
    rng: &mut R,
) -> usize {
    let mut placed = 0;
    for (key, &(x, y)) in keys.iter().zip(slots) {
        let Some(entry) = catalog::lookup(key) else {
            log::debug!("Unknown catalog key {:?}, skipped", key);
            continue;
        };
        let id = state.ids.next(rng, Some(id_prefixes::ITEM));
        state
            .items
            .insert(id.clone(), primitives::catalog_item(&id, entry, x, y, 0.0));
        placed += 1;
    }
    placed
}
