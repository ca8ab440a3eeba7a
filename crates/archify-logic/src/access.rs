//! Accessibility report: door counts per room and whether each room can
//! be reached from outside through doors.
//!
//! Rooms and the exterior form a graph whose edges are doors. A door on
//! a divider joins the rooms it serves; a door on an outer wall joins its
//! room to the exterior. Reachability is a BFS from the exterior node.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::doors::{rooms_served, DoorPlacement, DoorState};
use crate::planner::LayoutState;
use crate::rooms::RoomType;

/// Graph node for everything outside the footprint.
const EXTERIOR: usize = usize::MAX;

/// How a room ended up with (or without) its doors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Primary,
    ZeroDoorRescue,
    OuterWallRescue,
    EmergencyRescue,
    Unresolved,
}

impl From<DoorState> for Resolution {
    fn from(state: DoorState) -> Self {
        use crate::doors::DoorPhase;
        match state {
            DoorState::Satisfied(DoorPhase::Primary) => Self::Primary,
            DoorState::Satisfied(DoorPhase::ZeroDoorRescue) => Self::ZeroDoorRescue,
            DoorState::Satisfied(DoorPhase::OuterWallRescue) => Self::OuterWallRescue,
            DoorState::Satisfied(DoorPhase::EmergencyRescue) => Self::EmergencyRescue,
            _ => Self::Unresolved,
        }
    }
}

/// One row of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomAccess {
    pub name: String,
    pub room_type: RoomType,
    pub doors: u32,
    pub required_doors: u32,
    pub resolution: Resolution,
    pub reachable_from_exterior: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityReport {
    pub rooms: Vec<RoomAccess>,
    pub entrance_placed: bool,
    /// Some room only got its door by relaxing the one-door-per-wall rule.
    pub emergency_rescue_used: bool,
}

impl AccessibilityReport {
    /// Build the report for a layout after door placement.
    pub fn build(state: &LayoutState, placement: &DoorPlacement) -> Self {
        let reachable = reachable_rooms(state);
        let rooms = state
            .rooms
            .iter()
            .zip(&placement.rooms)
            .enumerate()
            .map(|(i, (room, status))| RoomAccess {
                name: room.name.clone(),
                room_type: room.room_type,
                doors: status.doors,
                required_doors: status.required,
                resolution: status.state.into(),
                reachable_from_exterior: reachable.contains(&i),
            })
            .collect();
        Self {
            rooms,
            entrance_placed: placement.entrance.is_some(),
            emergency_rescue_used: placement.emergency_rescue_used(),
        }
    }

    /// Fraction of rooms with at least one door. 1.0 for an empty plan.
    pub fn coverage(&self) -> f64 {
        if self.rooms.is_empty() {
            return 1.0;
        }
        let with_doors = self.rooms.iter().filter(|r| r.doors > 0).count();
        with_doors as f64 / self.rooms.len() as f64
    }

    pub fn doorless(&self) -> Vec<&RoomAccess> {
        self.rooms.iter().filter(|r| r.doors == 0).collect()
    }

    pub fn all_rooms_have_doors(&self) -> bool {
        self.rooms.iter().all(|r| r.doors > 0)
    }

    pub fn all_rooms_reachable(&self) -> bool {
        self.rooms.iter().all(|r| r.reachable_from_exterior)
    }

    /// Human-readable summary lines.
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .rooms
            .iter()
            .map(|r| match r.doors {
                0 => format!("⚠️ {}: NO DOORS", r.name),
                1 => format!("✅ {}: 1 door", r.name),
                n => format!("✅ {}: {} doors", r.name, n),
            })
            .collect();
        lines.push(format!("Door coverage: {:.0}%", self.coverage() * 100.0));
        if self.emergency_rescue_used {
            lines.push("Emergency rescue was needed".to_string());
        }
        lines
    }

    pub fn log(&self) {
        for line in self.lines() {
            log::info!("{}", line);
        }
        for room in self.rooms.iter().filter(|r| !r.reachable_from_exterior) {
            log::warn!("{} cannot be reached from the entrance", room.name);
        }
    }
}

/// Room indices reachable from the exterior through doors.
pub fn reachable_rooms(state: &LayoutState) -> HashSet<usize> {
    let mut adj: HashMap<usize, Vec<usize>> = HashMap::new();
    for hole in state.holes.values().filter(|h| h.is_door()) {
        let mut ends = rooms_served(state, &hole.line, hole.offset);
        if state.is_outer(&hole.line) {
            ends.push(EXTERIOR);
        }
        for (i, &a) in ends.iter().enumerate() {
            for &b in &ends[i + 1..] {
                adj.entry(a).or_default().push(b);
                adj.entry(b).or_default().push(a);
            }
        }
    }

    let mut visited: HashSet<usize> = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(EXTERIOR);
    queue.push_back(EXTERIOR);
    while let Some(node) = queue.pop_front() {
        if let Some(neighbors) = adj.get(&node) {
            for &next in neighbors {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }
    visited.remove(&EXTERIOR);
    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlannerConfig;
    use crate::doors::place_openings;
    use crate::normalize::RoomDescriptor;
    use crate::planner::plan_grid;
    use crate::requirements::Footprint;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn report_for(n: usize, seed: u64) -> AccessibilityReport {
        let config = PlannerConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let rooms: Vec<_> = (0..n)
            .map(|i| RoomDescriptor::new(&format!("Room {}", i + 1), RoomType::Generic, 1.0))
            .collect();
        let mut state = plan_grid(&rooms, Footprint::new(1000.0, 800.0), &config, &mut rng);
        let placement = place_openings(&mut state, &config, &mut rng);
        AccessibilityReport::build(&state, &placement)
    }

    fn row(name: &str, doors: u32) -> RoomAccess {
        RoomAccess {
            name: name.to_string(),
            room_type: RoomType::Generic,
            doors,
            required_doors: 1,
            resolution: if doors > 0 {
                Resolution::Primary
            } else {
                Resolution::Unresolved
            },
            reachable_from_exterior: doors > 0,
        }
    }

    #[test]
    fn test_full_coverage_on_grid() {
        let report = report_for(6, 1);
        assert_eq!(report.rooms.len(), 6);
        assert_eq!(report.coverage(), 1.0);
        assert!(report.entrance_placed);
        assert!(report.doorless().is_empty());
        assert!(!report.emergency_rescue_used);
    }

    #[test]
    fn test_entrance_room_always_reachable() {
        for seed in 0..5 {
            for n in [2, 4, 6, 9, 12] {
                let report = report_for(n, seed);
                assert!(report.rooms[0].reachable_from_exterior, "{} rooms, seed {}", n, seed);
            }
        }
        assert!(report_for(2, 0).all_rooms_reachable());
    }

    #[test]
    fn test_every_grid_size_fully_reachable() {
        for n in 1..=12 {
            for seed in 0..5 {
                let report = report_for(n, seed);
                let cut_off: Vec<&str> = report
                    .rooms
                    .iter()
                    .filter(|r| !r.reachable_from_exterior)
                    .map(|r| r.name.as_str())
                    .collect();
                assert!(cut_off.is_empty(), "{} rooms, seed {}: {:?}", n, seed, cut_off);
            }
        }
    }

    #[test]
    fn test_bottom_row_joined_through_last_column() {
        // 2x2: 0-1 across, 1-3 down, 2-3 across.
        let report = report_for(4, 3);
        assert!(report.all_rooms_reachable());
        let doors: Vec<u32> = report.rooms.iter().map(|r| r.doors).collect();
        assert_eq!(doors, vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_lonely_room_reached_by_exterior_door() {
        let report = report_for(1, 2);
        assert_eq!(report.rooms[0].resolution, Resolution::OuterWallRescue);
        assert!(report.rooms[0].reachable_from_exterior);
    }

    #[test]
    fn test_coverage_counts_doorless_rooms() {
        let report = AccessibilityReport {
            rooms: vec![row("A", 1), row("B", 0), row("C", 2), row("D", 1)],
            entrance_placed: true,
            emergency_rescue_used: false,
        };
        assert_eq!(report.coverage(), 0.75);
        assert!(!report.all_rooms_have_doors());
        assert_eq!(report.doorless()[0].name, "B");
    }

    #[test]
    fn test_summary_lines() {
        let report = AccessibilityReport {
            rooms: vec![row("Kitchen", 1), row("Hall", 2), row("Vault", 0)],
            entrance_placed: true,
            emergency_rescue_used: true,
        };
        let lines = report.lines();
        assert_eq!(lines[0], "✅ Kitchen: 1 door");
        assert_eq!(lines[1], "✅ Hall: 2 doors");
        assert_eq!(lines[2], "⚠️ Vault: NO DOORS");
        assert_eq!(lines[3], "Door coverage: 67%");
        assert_eq!(lines[4], "Emergency rescue was needed");
    }

    #[test]
    fn test_empty_report_is_fully_covered() {
        let report = AccessibilityReport {
            rooms: Vec::new(),
            entrance_placed: false,
            emergency_rescue_used: false,
        };
        assert_eq!(report.coverage(), 1.0);
    }
}
