//! Advisory structural checks over a finished document.
//!
//! Pure functions over the document's layer maps. Nothing here blocks
//! output; the generator logs whatever comes back.

use std::collections::{HashMap, HashSet};

use crate::config::PlannerConfig;
use crate::document::{FloorPlanDocument, Layer};

/// A validation finding.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

const EDGE_TOLERANCE: f64 = 1e-6;

// ── A. References ───────────────────────────────────────────────────────

/// Every id a record points at exists, and back-references agree.
pub fn check_references(layer: &Layer) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut dangling = |message: String| {
        errors.push(ValidationError {
            category: "references",
            severity: Severity::Error,
            message,
        })
    };

    for wall in layer.lines.values() {
        if wall.vertices.len() != 2 {
            dangling(format!(
                "Wall {} has {} vertices",
                wall.id,
                wall.vertices.len()
            ));
        }
        for v in &wall.vertices {
            match layer.vertices.get(v) {
                None => dangling(format!("Wall {} references missing vertex {}", wall.id, v)),
                Some(vertex) if !vertex.lines.contains(&wall.id) => dangling(format!(
                    "Vertex {} does not list incident wall {}",
                    v, wall.id
                )),
                _ => {}
            }
        }
        for h in &wall.holes {
            if !layer.holes.contains_key(h) {
                dangling(format!("Wall {} references missing hole {}", wall.id, h));
            }
        }
    }

    for hole in layer.holes.values() {
        match layer.lines.get(&hole.line) {
            None => dangling(format!("Hole {} sits on missing wall {}", hole.id, hole.line)),
            Some(wall) if !wall.holes.contains(&hole.id) => dangling(format!(
                "Wall {} does not list hosted hole {}",
                hole.line, hole.id
            )),
            _ => {}
        }
    }

    for area in layer.areas.values() {
        for v in &area.vertices {
            if !layer.vertices.contains_key(v) {
                dangling(format!("Area {} references missing vertex {}", area.id, v));
            }
        }
    }
    errors
}

/// Ids are unique across all five maps.
pub fn check_unique_ids(layer: &Layer) -> Vec<ValidationError> {
    let mut seen = HashSet::new();
    let ids = layer
        .vertices
        .keys()
        .chain(layer.lines.keys())
        .chain(layer.holes.keys())
        .chain(layer.areas.keys())
        .chain(layer.items.keys());
    let mut errors = Vec::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError {
                category: "references",
                severity: Severity::Error,
                message: format!("Id {} is used by more than one record", id),
            });
        }
    }
    errors
}

// ── B. Holes ────────────────────────────────────────────────────────────

/// Offsets lie in [0, 1] and holes on one wall keep their clearance.
pub fn check_hole_offsets(layer: &Layer, min_clearance: f64) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for hole in layer.holes.values() {
        if !(0.0..=1.0).contains(&hole.offset) {
            errors.push(ValidationError {
                category: "holes",
                severity: Severity::Error,
                message: format!("Hole {} has offset {} outside [0, 1]", hole.id, hole.offset),
            });
        }
    }
    for wall in layer.lines.values() {
        let offsets: Vec<(&str, f64)> = wall
            .holes
            .iter()
            .filter_map(|h| layer.holes.get(h))
            .map(|h| (h.id.as_str(), h.offset))
            .collect();
        for (i, (a, oa)) in offsets.iter().enumerate() {
            for (b, ob) in &offsets[i + 1..] {
                if (oa - ob).abs() + 1e-9 < min_clearance {
                    errors.push(ValidationError {
                        category: "holes",
                        severity: Severity::Error,
                        message: format!(
                            "Holes {} and {} on wall {} are {:.3} apart (< {})",
                            a,
                            b,
                            wall.id,
                            (oa - ob).abs(),
                            min_clearance
                        ),
                    });
                }
            }
        }
    }
    errors
}

/// Walls hosting more than one door. Only the emergency rescue does this.
pub fn check_double_doors(layer: &Layer) -> Vec<ValidationError> {
    layer
        .lines
        .values()
        .filter_map(|wall| {
            let doors = wall
                .holes
                .iter()
                .filter_map(|h| layer.holes.get(h))
                .filter(|h| h.is_door())
                .count();
            (doors > 1).then(|| ValidationError {
                category: "holes",
                severity: Severity::Warning,
                message: format!("Wall {} hosts {} doors", wall.id, doors),
            })
        })
        .collect()
}

// ── C. Areas ────────────────────────────────────────────────────────────

pub fn check_area_shapes(layer: &Layer) -> Vec<ValidationError> {
    layer
        .areas
        .values()
        .filter(|a| a.vertices.len() != 4)
        .map(|a| ValidationError {
            category: "areas",
            severity: Severity::Error,
            message: format!(
                "Area {} ({}) has {} corners, expected 4",
                a.id,
                a.name,
                a.vertices.len()
            ),
        })
        .collect()
}

// ── D. Outer shell ──────────────────────────────────────────────────────

/// The walls lying on the footprint's bounding box form one closed
/// quadrilateral: four walls, each corner shared by exactly two of them.
pub fn check_outer_closure(layer: &Layer) -> Vec<ValidationError> {
    let position = |id: &String| layer.vertices.get(id).map(|v| (v.x, v.y));
    let wall_points: Vec<(&String, (f64, f64), (f64, f64))> = layer
        .lines
        .values()
        .filter_map(|w| {
            let a = position(w.vertices.first()?)?;
            let b = position(w.vertices.get(1)?)?;
            Some((&w.id, a, b))
        })
        .collect();

    let fail = |message: String| {
        vec![ValidationError {
            category: "outer_shell",
            severity: Severity::Error,
            message,
        }]
    };

    if wall_points.is_empty() {
        return fail("Layout has no walls".to_string());
    }

    let xs = wall_points.iter().flat_map(|(_, a, b)| [a.0, b.0]);
    let ys = wall_points.iter().flat_map(|(_, a, b)| [a.1, b.1]);
    let (min_x, max_x) = xs.fold((f64::MAX, f64::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
    let (min_y, max_y) = ys.fold((f64::MAX, f64::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));

    let near = |a: f64, b: f64| (a - b).abs() < EDGE_TOLERANCE;
    let on_edge = |(ax, ay): (f64, f64), (bx, by): (f64, f64)| {
        (near(ax, min_x) && near(bx, min_x))
            || (near(ax, max_x) && near(bx, max_x))
            || (near(ay, min_y) && near(by, min_y))
            || (near(ay, max_y) && near(by, max_y))
    };

    let outer: Vec<&String> = wall_points
        .iter()
        .filter(|(_, a, b)| on_edge(*a, *b))
        .map(|(id, _, _)| *id)
        .collect();
    if outer.len() != 4 {
        return fail(format!("Expected 4 outer walls, found {}", outer.len()));
    }

    let mut refs: HashMap<&String, usize> = HashMap::new();
    for id in &outer {
        if let Some(wall) = layer.lines.get(*id) {
            for v in &wall.vertices {
                *refs.entry(v).or_default() += 1;
            }
        }
    }
    if refs.len() != 4 || refs.values().any(|&n| n != 2) {
        return fail("Outer walls do not form a closed cycle".to_string());
    }
    Vec::new()
}

// ── Master validation ───────────────────────────────────────────────────

/// Run every check against the document's active layer.
pub fn validate_document(doc: &FloorPlanDocument, config: &PlannerConfig) -> Vec<ValidationError> {
    let Some(layer) = doc.active_layer() else {
        return vec![ValidationError {
            category: "document",
            severity: Severity::Error,
            message: format!("Selected layer {} does not exist", doc.selected_layer),
        }];
    };
    let mut all = Vec::new();
    all.extend(check_references(layer));
    all.extend(check_unique_ids(layer));
    all.extend(check_hole_offsets(layer, config.min_hole_clearance));
    all.extend(check_double_doors(layer));
    all.extend(check_area_shapes(layer));
    all.extend(check_outer_closure(layer));
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{LayoutState, OuterEdge, WallRole};
    use crate::primitives;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // ── Helpers ─────────────────────────────────────────────────────────

    /// Closed 100x100 square: four outer walls, no rooms.
    fn square() -> (LayoutState, Vec<String>) {
        let config = PlannerConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = LayoutState::new();
        let corners: Vec<String> = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]
            .iter()
            .map(|&(x, y)| state.add_vertex(&mut rng, x, y))
            .collect();
        let edges = [
            OuterEdge::Start,
            OuterEdge::Right,
            OuterEdge::End,
            OuterEdge::Left,
        ];
        let walls = (0..4)
            .map(|i| {
                state.add_wall(
                    &mut rng,
                    &corners[i],
                    &corners[(i + 1) % 4],
                    WallRole::Outer(edges[i]),
                    &config,
                )
            })
            .collect();
        (state, walls)
    }

    fn layer_of(state: LayoutState) -> Layer {
        let doc = FloorPlanDocument::assemble(state, &PlannerConfig::default());
        doc.layers["layer-1"].clone()
    }

    // ── Tests ───────────────────────────────────────────────────────────

    #[test]
    fn test_clean_square_passes() {
        let (state, _) = square();
        let doc = FloorPlanDocument::assemble(state, &PlannerConfig::default());
        assert!(validate_document(&doc, &PlannerConfig::default()).is_empty());
    }

    #[test]
    fn test_open_shell_detected() {
        let (mut state, walls) = square();
        state.walls.remove(&walls[2]);
        let errors = check_outer_closure(&layer_of(state));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category, "outer_shell");
    }

    #[test]
    fn test_missing_vertex_detected() {
        let (mut state, walls) = square();
        let v = state.walls[&walls[0]].vertices[0].clone();
        state.vertices.remove(&v);
        let errors = check_references(&layer_of(state));
        assert!(errors.iter().any(|e| e.message.contains("missing vertex")));
    }

    #[test]
    fn test_hole_clearance_violation() {
        let config = PlannerConfig::default();
        let (mut state, walls) = square();
        state.add_hole(primitives::door("door-a", &walls[1], 0.40, &config));
        state.add_hole(primitives::window("win-b", &walls[1], 0.50, &config));
        let errors = check_hole_offsets(&layer_of(state), config.min_hole_clearance);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("door-a"));
    }

    #[test]
    fn test_offset_out_of_range() {
        let config = PlannerConfig::default();
        let (mut state, walls) = square();
        state.add_hole(primitives::window("win-x", &walls[0], 1.2, &config));
        let errors = check_hole_offsets(&layer_of(state), config.min_hole_clearance);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, Severity::Error);
    }

    #[test]
    fn test_double_door_is_warning() {
        let config = PlannerConfig::default();
        let (mut state, walls) = square();
        state.add_hole(primitives::main_entrance("door-e", &walls[0], 0.1, &config));
        state.add_hole(primitives::door("door-f", &walls[0], 0.8, &config));
        let errors = check_double_doors(&layer_of(state));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, Severity::Warning);
    }

    #[test]
    fn test_triangle_area_rejected() {
        let (mut state, _) = square();
        let verts: Vec<String> = state.vertices.keys().take(3).cloned().collect();
        state.areas.insert(
            "area-t".to_string(),
            primitives::area(
                "area-t",
                "Wedge",
                crate::rooms::RoomType::Generic,
                verts,
                None,
            ),
        );
        let errors = check_area_shapes(&layer_of(state));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Wedge"));
    }

    #[test]
    fn test_duplicate_ids_across_maps() {
        let config = PlannerConfig::default();
        let (mut state, walls) = square();
        // A hole reusing a wall's id.
        let clash = walls[3].clone();
        state.add_hole(primitives::window(&clash, &walls[3], 0.5, &config));
        let errors = check_unique_ids(&layer_of(state));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_missing_layer_reported() {
        let (state, _) = square();
        let mut doc = FloorPlanDocument::assemble(state, &PlannerConfig::default());
        doc.selected_layer = "layer-9".to_string();
        let errors = validate_document(&doc, &PlannerConfig::default());
        assert_eq!(errors[0].category, "document");
    }
}
