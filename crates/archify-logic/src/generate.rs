//! Generation entry points: requirements or room descriptors in, floor-plan
//! document out.
//!
//! Pipeline: normalize → plan grid → doors and windows → furniture →
//! assemble. There is no failure path once a config is accepted; a room
//! that ends up doorless shows in the accessibility report.

use rand::Rng;

use crate::access::AccessibilityReport;
use crate::config::{validate_config, PlannerConfig};
use crate::doors::place_openings;
use crate::document::FloorPlanDocument;
use crate::error::PlanError;
use crate::furnish::furnish_rooms;
use crate::normalize::{normalize_rooms, RoomDescriptor};
use crate::planner::plan_grid;
use crate::requirements::{Footprint, Requirements};
use crate::validate::{validate_document, Severity};

/// A generated document plus what the door engine had to say about it.
#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    pub document: FloorPlanDocument,
    pub report: AccessibilityReport,
    pub rooms: Vec<RoomDescriptor>,
}

/// Floor-plan generator bound to one validated config.
#[derive(Debug, Clone, Default)]
pub struct FloorPlanGenerator {
    config: PlannerConfig,
}

impl FloorPlanGenerator {
    pub fn new(config: PlannerConfig) -> Result<Self, PlanError> {
        let errors = validate_config(&config);
        if !errors.is_empty() {
            return Err(PlanError::InvalidConfig(errors));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Generate from requirements using the thread-local generator.
    pub fn generate(&self, requirements: &Requirements) -> GeneratedPlan {
        self.generate_with_rng(requirements, &mut rand::thread_rng())
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        requirements: &Requirements,
        rng: &mut R,
    ) -> GeneratedPlan {
        let rooms = normalize_rooms(requirements);
        log::info!(
            "Generating {} plan: {} rooms, {}x{} m, priority {}",
            requirements.space_type,
            rooms.len(),
            requirements.width_meters,
            requirements.height_meters,
            requirements.user_priority
        );
        self.generate_from_descriptors(rooms, requirements.footprint(), rng)
    }

    /// Generate from an already-built room list, skipping normalization.
    /// Rooms are placed in the order given.
    pub fn generate_from_descriptors<R: Rng + ?Sized>(
        &self,
        rooms: Vec<RoomDescriptor>,
        footprint: Footprint,
        rng: &mut R,
    ) -> GeneratedPlan {
        let config = &self.config;
        let mut state = plan_grid(&rooms, footprint, config, rng);
        let placement = place_openings(&mut state, config, rng);
        let furnished = furnish_rooms(&mut state, &rooms, config, rng);

        let report = AccessibilityReport::build(&state, &placement);
        report.log();

        let document = FloorPlanDocument::assemble(state, config);
        for finding in validate_document(&document, config) {
            match finding.severity {
                Severity::Error => log::warn!("[{}] {}", finding.category, finding.message),
                Severity::Warning => log::debug!("[{}] {}", finding.category, finding.message),
            }
        }

        log::info!(
            "Generated plan: {} rooms, {} doors/windows, {} furniture items, coverage {:.0}%",
            rooms.len(),
            document.active_layer().map_or(0, |l| l.holes.len()),
            furnished,
            report.coverage() * 100.0
        );

        GeneratedPlan {
            document,
            report,
            rooms,
        }
    }
}

/// Generate with the default config and the thread-local generator.
///
/// ```
/// use archify_logic::{generate_floor_plan, Requirements};
///
/// let req = Requirements::from_json(r#"{"space_type": "classroom"}"#).unwrap();
/// let doc = generate_floor_plan(&req);
/// let layer = doc.active_layer().unwrap();
/// assert_eq!(layer.areas.len(), 3);
/// assert!(layer.holes.values().any(|h| h.kind == "sliding door"));
/// ```
pub fn generate_floor_plan(requirements: &Requirements) -> FloorPlanDocument {
    FloorPlanGenerator::default().generate(requirements).document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rooms::RoomType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_invalid_config_rejected() {
        let config = PlannerConfig {
            door_width: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            FloorPlanGenerator::new(config),
            Err(PlanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_generate_default_requirements() {
        let plan = FloorPlanGenerator::default()
            .generate_with_rng(&Requirements::default(), &mut StdRng::seed_from_u64(1));
        // Zero counts keep one room per template slot.
        assert_eq!(plan.rooms.len(), 6);
        let layer = plan.document.active_layer().unwrap();
        assert_eq!(layer.areas.len(), 6);
        assert_eq!(plan.report.coverage(), 1.0);
    }

    #[test]
    fn test_same_seed_same_document() {
        let generator = FloorPlanGenerator::default();
        let req = Requirements {
            num_bedrooms: 2,
            num_bathrooms: 1,
            ..Default::default()
        };
        let a = generator.generate_with_rng(&req, &mut StdRng::seed_from_u64(9));
        let b = generator.generate_with_rng(&req, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.document, b.document);
    }

    #[test]
    fn test_descriptor_entry_point_keeps_order() {
        let rooms = vec![
            RoomDescriptor::new("Small", RoomType::Bathroom, 0.8),
            RoomDescriptor::new("Big", RoomType::Living, 2.0),
        ];
        let plan = FloorPlanGenerator::default().generate_from_descriptors(
            rooms,
            Footprint::new(600.0, 400.0),
            &mut StdRng::seed_from_u64(2),
        );
        assert_eq!(plan.report.rooms[0].name, "Small");
        assert_eq!(plan.report.rooms[1].name, "Big");
        // No storage is appended on this path.
        assert_eq!(plan.document.active_layer().unwrap().areas.len(), 2);
    }

    #[test]
    fn test_astronomical_width_still_generates() {
        let req = Requirements::from_json(r#"{"width_meters": 1e307, "height_meters": 8}"#).unwrap();
        let plan = FloorPlanGenerator::default()
            .generate_with_rng(&req, &mut StdRng::seed_from_u64(3));
        assert_eq!(plan.document.active_layer().unwrap().areas.len(), 6);
        assert!(plan.report.all_rooms_have_doors());
    }

    #[test]
    fn test_convenience_entry_point() {
        let doc = generate_floor_plan(&Requirements::default());
        assert_eq!(doc.unit, "cm");
        assert_eq!(doc.layers.len(), 1);
    }
}
