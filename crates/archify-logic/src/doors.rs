//! Door and window placement.
//!
//! Every room runs through a small state machine:
//!
//! ```text
//! NeedsDoor → Attempting → Satisfied(Primary)
//!                        ↘ EscalatedRescue(ZeroDoorRescue)
//!                            → Satisfied(ZeroDoorRescue)
//!                            ↘ EscalatedRescue(OuterWallRescue)
//!                                → Satisfied(OuterWallRescue)
//!                                ↘ EscalatedRescue(EmergencyRescue)
//!                                    → Satisfied(EmergencyRescue) | Unresolved
//! ```
//!
//! Only rooms left with zero doors escalate. The one-door-per-wall rule
//! holds through the zero-door rescue; the outer-wall rescue may reuse a
//! wall that already has a door and the emergency rescue accepts any
//! bordering wall at one of its fixed offsets. Every phase keeps the
//! minimum offset clearance.
//! A doorless room is reported, never an error.

use rand::Rng;

use crate::config::PlannerConfig;
use crate::constants::id_prefixes;
use crate::planner::LayoutState;
use crate::primitives;

/// Phase of the door ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorPhase {
    Primary,
    ZeroDoorRescue,
    OuterWallRescue,
    EmergencyRescue,
}

impl DoorPhase {
    /// Rescue phase that follows a failed attempt in this one.
    pub fn next(self) -> Option<DoorPhase> {
        match self {
            Self::Primary => Some(Self::ZeroDoorRescue),
            Self::ZeroDoorRescue => Some(Self::OuterWallRescue),
            Self::OuterWallRescue => Some(Self::EmergencyRescue),
            Self::EmergencyRescue => None,
        }
    }

    pub fn is_rescue(self) -> bool {
        self != Self::Primary
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::ZeroDoorRescue => "zero-door rescue",
            Self::OuterWallRescue => "outer-wall rescue",
            Self::EmergencyRescue => "emergency rescue",
        }
    }
}

/// Where a room stands on the door ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    NeedsDoor,
    /// Primary wall scan in progress.
    Attempting,
    /// Has at least one door; the phase that delivered the first one.
    Satisfied(DoorPhase),
    /// Still doorless; waiting for the given rescue phase.
    EscalatedRescue(DoorPhase),
    /// Doorless after every phase.
    Unresolved,
}

impl DoorState {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied(_))
    }
}

/// Door bookkeeping for one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDoorStatus {
    pub doors: u32,
    pub required: u32,
    pub state: DoorState,
}

/// Result of a full placement run.
#[derive(Debug, Clone, Default)]
pub struct DoorPlacement {
    /// Indexed like `LayoutState::rooms`.
    pub rooms: Vec<RoomDoorStatus>,
    /// Hole id of the main entrance.
    pub entrance: Option<String>,
    pub windows: usize,
}

impl DoorPlacement {
    pub fn emergency_rescue_used(&self) -> bool {
        self.rooms
            .iter()
            .any(|r| r.state == DoorState::Satisfied(DoorPhase::EmergencyRescue))
    }
}

/// Run every phase: entrance, primary doors, the three rescues, windows.
pub fn place_openings<R: Rng + ?Sized>(
    state: &mut LayoutState,
    config: &PlannerConfig,
    rng: &mut R,
) -> DoorPlacement {
    let mut engine = DoorEngine::new(state, config);
    engine.place_main_entrance(rng);
    engine.assign_primary(rng);
    for phase in [
        DoorPhase::ZeroDoorRescue,
        DoorPhase::OuterWallRescue,
        DoorPhase::EmergencyRescue,
    ] {
        engine.rescue(phase, rng);
    }
    engine.place_windows(rng);
    engine.finish()
}

/// Rooms a door at `offset` on `wall_id` opens into: rooms bordering the
/// wall whose stretch of it contains the offset.
pub fn rooms_served(state: &LayoutState, wall_id: &str, offset: f64) -> Vec<usize> {
    state
        .rooms_on_wall(wall_id)
        .iter()
        .copied()
        .filter(|&i| {
            room_span(state, i, wall_id)
                .is_some_and(|(lo, hi)| offset >= lo - 1e-9 && offset <= hi + 1e-9)
        })
        .collect()
}

/// Portion of `wall_id`, as an offset range, alongside a room's cell.
pub fn room_span(state: &LayoutState, room: usize, wall_id: &str) -> Option<(f64, f64)> {
    let cell = state.rooms.get(room)?.cell_rect;
    let a = state.project_onto_wall(wall_id, cell.x1, cell.y1)?;
    let b = state.project_onto_wall(wall_id, cell.x2, cell.y2)?;
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi - lo <= f64::EPSILON {
        None
    } else {
        Some((lo, hi))
    }
}

/// Stepwise door placement over a layout.
pub struct DoorEngine<'a> {
    state: &'a mut LayoutState,
    config: &'a PlannerConfig,
    rooms: Vec<RoomDoorStatus>,
    entrance: Option<String>,
    windows: usize,
}

impl<'a> DoorEngine<'a> {
    pub fn new(state: &'a mut LayoutState, config: &'a PlannerConfig) -> Self {
        let rooms = state
            .rooms
            .iter()
            .map(|r| RoomDoorStatus {
                doors: 0,
                required: r.required_doors,
                state: DoorState::NeedsDoor,
            })
            .collect();
        Self {
            state,
            config,
            rooms,
            entrance: None,
            windows: 0,
        }
    }

    pub fn status(&self) -> &[RoomDoorStatus] {
        &self.rooms
    }

    pub fn finish(self) -> DoorPlacement {
        DoorPlacement {
            rooms: self.rooms,
            entrance: self.entrance,
            windows: self.windows,
        }
    }

    /// Sliding door on the start-edge outer wall.
    pub fn place_main_entrance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        let Some(wall_id) = self.state.entrance_wall().map(str::to_string) else {
            log::warn!("No outer wall on the start edge; skipping main entrance");
            return None;
        };
        let id = self.state.ids.next(rng, Some(id_prefixes::DOOR));
        self.state.add_hole(primitives::main_entrance(
            &id,
            &wall_id,
            self.config.entrance_offset,
            self.config,
        ));
        log::debug!(
            "Main entrance {} at offset {}",
            id,
            self.config.entrance_offset
        );
        self.entrance = Some(id.clone());
        Some(id)
    }

    /// One door per shared wall, credited to both rooms. Each room cuts up
    /// to its quota itself; doors a neighbour already cut into it do not
    /// count, so the scan chains every room to the one before it.
    pub fn assign_primary<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for room in 0..self.rooms.len() {
            if self.rooms[room].state == DoorState::NeedsDoor {
                self.rooms[room].state = DoorState::Attempting;
            }
            let required = self.rooms[room].required;
            let mut added = 0;
            let walls = self.state.rooms[room].adjacent_walls.clone();
            for wall_id in walls {
                if added >= required {
                    break;
                }
                if !self.state.is_shared(&wall_id) || self.state.has_door(&wall_id) {
                    continue;
                }
                let offset = self
                    .config
                    .primary_offsets
                    .iter()
                    .copied()
                    .find(|&o| self.clear_of_holes(&wall_id, o));
                if let Some(offset) = offset {
                    self.cut_door(&wall_id, offset, DoorPhase::Primary, rng);
                    added += 1;
                }
            }
        }

        for status in &mut self.rooms {
            if !status.state.is_satisfied() {
                status.state = if status.doors > 0 {
                    DoorState::Satisfied(DoorPhase::Primary)
                } else {
                    DoorState::EscalatedRescue(DoorPhase::ZeroDoorRescue)
                };
            }
        }
    }

    /// Try `phase` for every room waiting on it; failures escalate.
    pub fn rescue<R: Rng + ?Sized>(&mut self, phase: DoorPhase, rng: &mut R) {
        for room in 0..self.rooms.len() {
            if self.rooms[room].state != DoorState::EscalatedRescue(phase) {
                continue;
            }
            let placed = match phase {
                DoorPhase::Primary => false,
                DoorPhase::ZeroDoorRescue => self.zero_door_rescue(room, rng),
                DoorPhase::OuterWallRescue => self.outer_wall_rescue(room, rng),
                DoorPhase::EmergencyRescue => self.emergency_rescue(room, rng),
            };
            let name = &self.state.rooms[room].name;
            if placed {
                log::info!("{}: door placed by {}", name, phase.as_str());
                continue;
            }
            self.rooms[room].state = match phase.next() {
                Some(next) => DoorState::EscalatedRescue(next),
                None => {
                    log::warn!("{}: still has no door after every rescue phase", name);
                    DoorState::Unresolved
                }
            };
        }
    }

    /// Midpoint of a shared wall that has no door yet.
    fn zero_door_rescue<R: Rng + ?Sized>(&mut self, room: usize, rng: &mut R) -> bool {
        let offset = self.config.rescue_offset;
        let wall = self.state.rooms[room]
            .adjacent_walls
            .iter()
            .find(|w| {
                self.state.is_shared(w) && !self.state.has_door(w) && self.clear_of_holes(w, offset)
            })
            .cloned();
        match wall {
            Some(wall_id) => {
                self.cut_door(&wall_id, offset, DoorPhase::ZeroDoorRescue, rng);
                true
            }
            None => false,
        }
    }

    /// Exterior door on one of the room's outer walls, entrance wall
    /// excluded. Aims for the middle of the room's stretch of the wall,
    /// then the emergency offsets within that stretch.
    fn outer_wall_rescue<R: Rng + ?Sized>(&mut self, room: usize, rng: &mut R) -> bool {
        let entrance_wall = self.state.entrance_wall().map(str::to_string);
        let walls: Vec<String> = self.state.rooms[room]
            .adjacent_walls
            .iter()
            .filter(|w| self.state.is_outer(w) && Some(*w) != entrance_wall.as_ref())
            .cloned()
            .collect();

        let mut fractions = vec![0.5];
        fractions.extend(self.config.emergency_offsets.iter().copied());

        for wall_id in walls {
            if let Some(offset) = self.first_clear_offset(room, &wall_id, &fractions) {
                self.cut_door(&wall_id, offset, DoorPhase::OuterWallRescue, rng);
                return true;
            }
        }
        false
    }

    /// Any bordering wall at the configured emergency offsets, taken as
    /// they are. Offsets outside the room's stretch of the wall or too
    /// close to another hole are skipped.
    fn emergency_rescue<R: Rng + ?Sized>(&mut self, room: usize, rng: &mut R) -> bool {
        let walls = self.state.rooms[room].adjacent_walls.clone();
        let offsets = self.config.emergency_offsets.clone();
        for wall_id in walls {
            if let Some(offset) = self.first_clear_offset_in_span(room, &wall_id, &offsets) {
                log::warn!(
                    "{}: emergency door on wall {} at offset {:.2}",
                    self.state.rooms[room].name,
                    wall_id,
                    offset
                );
                self.cut_door(&wall_id, offset, DoorPhase::EmergencyRescue, rng);
                return true;
            }
        }
        false
    }

    /// 1–2 evenly spaced windows on each outer wall that has no door.
    pub fn place_windows<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let entrance_wall = self.state.entrance_wall().map(str::to_string);
        let walls: Vec<String> = self
            .state
            .outer_walls
            .iter()
            .filter(|w| Some(*w) != entrance_wall.as_ref())
            .cloned()
            .collect();

        for wall_id in walls {
            if self.state.has_door(&wall_id) {
                continue;
            }
            let count: u32 = rng.gen_range(1..=2);
            for i in 0..count {
                let offset = 0.2 + i as f64 * (0.6 / count as f64);
                let id = self.state.ids.next(rng, Some(id_prefixes::WINDOW));
                self.state
                    .add_hole(primitives::window(&id, &wall_id, offset, self.config));
                self.windows += 1;
            }
        }
    }

    /// No existing hole on the wall lies within the minimum clearance.
    fn clear_of_holes(&self, wall_id: &str, offset: f64) -> bool {
        let clearance = self.config.min_hole_clearance;
        self.state
            .hole_offsets(wall_id)
            .iter()
            .all(|o| (o - offset).abs() + 1e-9 >= clearance)
    }

    /// First fraction of the room's stretch of `wall_id` that is clear.
    fn first_clear_offset(&self, room: usize, wall_id: &str, fractions: &[f64]) -> Option<f64> {
        let (lo, hi) = room_span(&*self.state, room, wall_id)?;
        fractions
            .iter()
            .map(|f| lo + f * (hi - lo))
            .find(|&o| self.clear_of_holes(wall_id, o))
    }

    /// First of `offsets` inside the room's stretch of `wall_id` that is clear.
    fn first_clear_offset_in_span(
        &self,
        room: usize,
        wall_id: &str,
        offsets: &[f64],
    ) -> Option<f64> {
        let (lo, hi) = room_span(&*self.state, room, wall_id)?;
        offsets
            .iter()
            .copied()
            .find(|&o| o >= lo - 1e-9 && o <= hi + 1e-9 && self.clear_of_holes(wall_id, o))
    }

    fn cut_door<R: Rng + ?Sized>(
        &mut self,
        wall_id: &str,
        offset: f64,
        phase: DoorPhase,
        rng: &mut R,
    ) {
        let id = self.state.ids.next(rng, Some(id_prefixes::DOOR));
        self.state
            .add_hole(primitives::door(&id, wall_id, offset, self.config));
        for room in rooms_served(&*self.state, wall_id, offset) {
            let status = &mut self.rooms[room];
            status.doors += 1;
            if !status.state.is_satisfied() && status.state != DoorState::Attempting {
                status.state = DoorState::Satisfied(phase);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{Cell, OuterEdge, PlacedRoom, Rect, WallRole};
    use crate::rooms::RoomType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // ── Helpers ─────────────────────────────────────────────────────────

    fn config() -> PlannerConfig {
        PlannerConfig::default()
    }

    /// Single room covering a 1000x800 footprint whose only wall is the
    /// start edge. Returns the state and that wall's id.
    fn room_on_entrance_wall_only(rng: &mut StdRng, config: &PlannerConfig) -> (LayoutState, String) {
        let mut state = LayoutState::new();
        let a = state.add_vertex(rng, 200.0, 200.0);
        let b = state.add_vertex(rng, 1200.0, 200.0);
        let wall = state.add_wall(rng, &a, &b, WallRole::Outer(OuterEdge::Start), config);
        state.rooms.push(placed_room(
            "Closet",
            Rect::new(200.0, 200.0, 1200.0, 1000.0),
        ));
        state.link_room_wall(0, &wall);
        (state, wall)
    }

    fn placed_room(name: &str, cell_rect: Rect) -> PlacedRoom {
        PlacedRoom {
            name: name.to_string(),
            room_type: RoomType::Storage,
            area_id: format!("area-{}", name),
            cell: Cell { row: 0, col: 0 },
            cell_rect,
            room_rect: cell_rect,
            required_doors: 1,
            adjacent_walls: Vec::new(),
        }
    }

    fn planned(n: usize, seed: u64) -> (LayoutState, DoorPlacement) {
        let config = config();
        let mut rng = StdRng::seed_from_u64(seed);
        let descriptors: Vec<_> = (0..n)
            .map(|i| {
                crate::normalize::RoomDescriptor::new(&format!("R{}", i), RoomType::Generic, 1.0)
            })
            .collect();
        let mut state = crate::planner::plan_grid(
            &descriptors,
            crate::requirements::Footprint::new(1000.0, 800.0),
            &config,
            &mut rng,
        );
        let placement = place_openings(&mut state, &config, &mut rng);
        (state, placement)
    }

    fn door_count(state: &LayoutState, wall_id: &str) -> usize {
        state.walls[wall_id]
            .holes
            .iter()
            .filter(|h| state.holes[*h].is_door())
            .count()
    }

    // ── Phases ──────────────────────────────────────────────────────────

    #[test]
    fn test_phase_ladder() {
        assert_eq!(DoorPhase::Primary.next(), Some(DoorPhase::ZeroDoorRescue));
        assert_eq!(DoorPhase::EmergencyRescue.next(), None);
        assert!(!DoorPhase::Primary.is_rescue());
        assert!(DoorPhase::OuterWallRescue.is_rescue());
    }

    #[test]
    fn test_entrance_on_start_wall() {
        let (state, placement) = planned(6, 1);
        let id = placement.entrance.unwrap();
        let hole = &state.holes[&id];
        assert_eq!(hole.kind, "sliding door");
        assert_eq!(hole.offset, 0.1);
        assert_eq!(Some(hole.line.as_str()), state.entrance_wall());
        assert!(hole.properties.width.length >= 200.0);
    }

    #[test]
    fn test_grid_layouts_fully_covered() {
        for n in 1..=16 {
            for seed in 0..5 {
                let (_, placement) = planned(n, seed);
                for (i, room) in placement.rooms.iter().enumerate() {
                    assert!(room.doors >= 1, "{} rooms, seed {}: room {} doorless", n, seed, i);
                    assert!(room.state.is_satisfied());
                }
            }
        }
    }

    #[test]
    fn test_primary_doors_credit_both_rooms() {
        // 2x2 grid: doors 0-1, 1-3, 2-3. Room 3 adds none of its own.
        let (state, placement) = planned(4, 2);
        let interior_doors = state
            .holes
            .values()
            .filter(|h| h.kind == "door")
            .count();
        assert!(placement
            .rooms
            .iter()
            .all(|r| r.state == DoorState::Satisfied(DoorPhase::Primary)));
        let credited: u32 = placement.rooms.iter().map(|r| r.doors).sum();
        assert_eq!(interior_doors, 3);
        assert_eq!(credited as usize, interior_doors * 2);
        let doors: Vec<u32> = placement.rooms.iter().map(|r| r.doors).collect();
        assert_eq!(doors, vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_no_double_doors_without_emergency() {
        for seed in 0..10 {
            let (state, placement) = planned(9, seed);
            if placement.emergency_rescue_used() {
                continue;
            }
            for wall_id in state.walls.keys() {
                assert!(door_count(&state, wall_id) <= 1);
            }
        }
    }

    #[test]
    fn test_single_room_gets_outer_wall_rescue() {
        // One room on a 2-column grid has no shared wall at all.
        let (state, placement) = planned(1, 3);
        assert_eq!(
            placement.rooms[0].state,
            DoorState::Satisfied(DoorPhase::OuterWallRescue)
        );
        let door = state.holes.values().find(|h| h.kind == "door").unwrap();
        assert!(state.is_outer(&door.line));
        assert_ne!(Some(door.line.as_str()), state.entrance_wall());
    }

    #[test]
    fn test_emergency_rescue_uses_entrance_wall() {
        let config = config();
        let mut rng = StdRng::seed_from_u64(4);
        let (mut state, wall) = room_on_entrance_wall_only(&mut rng, &config);

        let placement = place_openings(&mut state, &config, &mut rng);
        assert_eq!(
            placement.rooms[0].state,
            DoorState::Satisfied(DoorPhase::EmergencyRescue)
        );
        assert!(placement.emergency_rescue_used());

        // 0.2 is too close to the entrance at 0.1; 0.8 is the first clear offset.
        let mut offsets = state.hole_offsets(&wall);
        offsets.sort_by(f64::total_cmp);
        assert_eq!(offsets.len(), 2);
        assert!((offsets[0] - 0.1).abs() < 1e-9);
        assert!((offsets[1] - 0.8).abs() < 1e-9);
        assert_eq!(door_count(&state, &wall), 2);
    }

    #[test]
    fn test_emergency_offsets_used_verbatim() {
        // Two rooms split the entrance wall: spans [0, 0.5] and [0.5, 1].
        let config = config();
        let mut rng = StdRng::seed_from_u64(8);
        let mut state = LayoutState::new();
        let a = state.add_vertex(&mut rng, 200.0, 200.0);
        let b = state.add_vertex(&mut rng, 1200.0, 200.0);
        let wall = state.add_wall(&mut rng, &a, &b, WallRole::Outer(OuterEdge::Start), &config);
        state
            .rooms
            .push(placed_room("West", Rect::new(200.0, 200.0, 700.0, 1000.0)));
        state
            .rooms
            .push(placed_room("East", Rect::new(700.0, 200.0, 1200.0, 1000.0)));
        state.link_room_wall(0, &wall);
        state.link_room_wall(1, &wall);

        let placement = place_openings(&mut state, &config, &mut rng);
        for room in &placement.rooms {
            assert_eq!(room.state, DoorState::Satisfied(DoorPhase::EmergencyRescue));
            assert_eq!(room.doors, 1);
        }

        // West: 0.2 crowds the entrance, 0.8 is outside its half, so 0.4.
        // East: 0.2 is outside its half, 0.8 fits.
        let mut offsets = state.hole_offsets(&wall);
        offsets.sort_by(f64::total_cmp);
        assert_eq!(offsets.len(), 3);
        for (got, want) in offsets.iter().zip([0.1, 0.4, 0.8]) {
            assert!((got - want).abs() < 1e-9, "offsets {:?}", offsets);
        }
    }

    #[test]
    fn test_room_without_walls_is_unresolved() {
        let config = config();
        let mut rng = StdRng::seed_from_u64(5);
        let mut state = LayoutState::new();
        state
            .rooms
            .push(placed_room("Void", Rect::new(0.0, 0.0, 100.0, 100.0)));

        let placement = place_openings(&mut state, &config, &mut rng);
        assert_eq!(placement.rooms[0].state, DoorState::Unresolved);
        assert_eq!(placement.rooms[0].doors, 0);
        assert!(placement.entrance.is_none());
    }

    #[test]
    fn test_crowded_wall_is_unresolved() {
        let config = config();
        let mut rng = StdRng::seed_from_u64(6);
        let (mut state, wall) = room_on_entrance_wall_only(&mut rng, &config);
        for offset in [0.2, 0.4, 0.6, 0.8] {
            state.add_hole(primitives::window(&format!("w{}", offset), &wall, offset, &config));
        }

        let mut engine = DoorEngine::new(&mut state, &config);
        engine.assign_primary(&mut rng);
        for phase in [
            DoorPhase::ZeroDoorRescue,
            DoorPhase::OuterWallRescue,
            DoorPhase::EmergencyRescue,
        ] {
            engine.rescue(phase, &mut rng);
        }
        assert_eq!(engine.status()[0].state, DoorState::Unresolved);
    }

    #[test]
    fn test_windows_skip_walls_with_doors() {
        for seed in 0..5 {
            let (state, placement) = planned(6, seed);
            let windows: Vec<_> = state
                .holes
                .values()
                .filter(|h| h.kind == "window")
                .collect();
            assert_eq!(windows.len(), placement.windows);
            for w in windows {
                assert!(state.is_outer(&w.line));
                assert_ne!(Some(w.line.as_str()), state.entrance_wall());
                assert!(!state.has_door(&w.line));
                assert!((w.offset - 0.2).abs() < 1e-9 || (w.offset - 0.5).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_hole_clearance_respected() {
        let config = config();
        for seed in 0..10 {
            let (state, _) = planned(12, seed);
            for wall_id in state.walls.keys() {
                let offsets = state.hole_offsets(wall_id);
                for (i, a) in offsets.iter().enumerate() {
                    for b in &offsets[i + 1..] {
                        assert!((a - b).abs() + 1e-9 >= config.min_hole_clearance);
                    }
                }
            }
        }
    }
}
