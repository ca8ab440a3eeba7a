//! Grid layout planner. Partitions the footprint into a row/column grid
//! and places one room per cell.
//!
//! The walls form a fixed lattice: four outer walls around the footprint
//! plus a divider between every pair of neighbouring cells. Rooms never
//! move the lattice; their polygons are drawn inside (and slightly
//! around) their cell with randomized size and inward-jittered corners.
//!
//! While placing rooms the planner records which walls border which
//! cells. A divider bordering two occupied cells is a *shared wall*, the
//! only kind of wall the primary door pass will use.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;

use crate::config::PlannerConfig;
use crate::constants::id_prefixes;
use crate::normalize::RoomDescriptor;
use crate::primitives::{self, Area, Hole, IdGenerator, Item, Vertex, Wall};
use crate::requirements::Footprint;
use crate::rooms::RoomType;

/// Column and row count of the room grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub cols: usize,
    pub rows: usize,
}

/// ≤4 rooms → 2 columns, ≤9 → 3, otherwise 4; rows fill the rest.
pub fn grid_dimensions(room_count: usize) -> GridSpec {
    let cols = match room_count {
        0..=4 => 2,
        5..=9 => 3,
        _ => 4,
    };
    let rows = room_count.div_ceil(cols).max(1);
    GridSpec { cols, rows }
}

/// Axis-aligned rectangle in plan coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    pub fn contains(&self, x: f64, y: f64, tolerance: f64) -> bool {
        x >= self.x1 - tolerance
            && x <= self.x2 + tolerance
            && y >= self.y1 - tolerance
            && y <= self.y2 + tolerance
    }
}

/// Grid cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

/// Which edge of the footprint an outer wall runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OuterEdge {
    /// Minimum-y edge; hosts the main entrance.
    Start,
    Right,
    /// Maximum-y edge.
    End,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Between columns `col - 1` and `col`.
    Vertical,
    /// Between rows `row - 1` and `row`.
    Horizontal,
}

/// Structural role of a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallRole {
    Outer(OuterEdge),
    Divider {
        orientation: Orientation,
        col: usize,
        row: usize,
    },
}

impl WallRole {
    pub fn is_outer(&self) -> bool {
        matches!(self, WallRole::Outer(_))
    }
}

/// A room after placement.
#[derive(Debug, Clone)]
pub struct PlacedRoom {
    pub name: String,
    pub room_type: RoomType,
    pub area_id: String,
    pub cell: Cell,
    /// Nominal grid cell.
    pub cell_rect: Rect,
    /// Randomized room extent the polygon corners are jittered inside.
    pub room_rect: Rect,
    pub required_doors: u32,
    /// Every wall bordering the cell, in door-scan order.
    pub adjacent_walls: Vec<String>,
}

/// Mutable layout state shared by every pipeline stage.
#[derive(Debug, Default)]
pub struct LayoutState {
    pub vertices: BTreeMap<String, Vertex>,
    pub walls: BTreeMap<String, Wall>,
    pub holes: BTreeMap<String, Hole>,
    pub areas: BTreeMap<String, Area>,
    pub items: BTreeMap<String, Item>,
    pub ids: IdGenerator,

    pub rooms: Vec<PlacedRoom>,
    pub wall_roles: HashMap<String, WallRole>,
    /// wall id → indices of rooms whose cell it borders.
    pub wall_rooms: HashMap<String, Vec<usize>>,
    /// Outer walls in Start, Right, End, Left order.
    pub outer_walls: Vec<String>,
    pub bounds: Option<Rect>,
    pub grid: Option<GridSpec>,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl LayoutState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex<R: Rng + ?Sized>(&mut self, rng: &mut R, x: f64, y: f64) -> String {
        let id = self.ids.next(rng, None);
        self.vertices
            .insert(id.clone(), primitives::vertex(&id, x, y));
        id
    }

    /// Add a wall between two existing vertices and register it on both.
    pub fn add_wall<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        v1: &str,
        v2: &str,
        role: WallRole,
        config: &PlannerConfig,
    ) -> String {
        let id = self.ids.next(rng, None);
        self.walls
            .insert(id.clone(), primitives::wall(&id, v1, v2, config));
        for v in [v1, v2] {
            if let Some(vertex) = self.vertices.get_mut(v) {
                vertex.lines.push(id.clone());
            }
        }
        if let WallRole::Outer(_) = role {
            self.outer_walls.push(id.clone());
        }
        self.wall_roles.insert(id.clone(), role);
        id
    }

    /// Insert a hole and append it to its host wall.
    pub fn add_hole(&mut self, hole: Hole) {
        if let Some(wall) = self.walls.get_mut(&hole.line) {
            wall.holes.push(hole.id.clone());
        }
        self.holes.insert(hole.id.clone(), hole);
    }

    /// Record that `room` borders `wall_id`.
    pub fn link_room_wall(&mut self, room: usize, wall_id: &str) {
        let rooms = self.wall_rooms.entry(wall_id.to_string()).or_default();
        if !rooms.contains(&room) {
            rooms.push(room);
        }
        if let Some(placed) = self.rooms.get_mut(room) {
            if !placed.adjacent_walls.iter().any(|w| w == wall_id) {
                placed.adjacent_walls.push(wall_id.to_string());
            }
        }
    }

    pub fn role(&self, wall_id: &str) -> Option<WallRole> {
        self.wall_roles.get(wall_id).copied()
    }

    pub fn is_outer(&self, wall_id: &str) -> bool {
        self.role(wall_id).is_some_and(|r| r.is_outer())
    }

    /// Rooms bordering a wall.
    pub fn rooms_on_wall(&self, wall_id: &str) -> &[usize] {
        self.wall_rooms
            .get(wall_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// A divider with rooms on both sides.
    pub fn is_shared(&self, wall_id: &str) -> bool {
        !self.is_outer(wall_id) && self.rooms_on_wall(wall_id).len() >= 2
    }

    /// The outer wall on the footprint's start edge.
    pub fn entrance_wall(&self) -> Option<&str> {
        self.outer_walls
            .iter()
            .find(|w| self.role(w) == Some(WallRole::Outer(OuterEdge::Start)))
            .map(|w| w.as_str())
    }

    pub fn hole_offsets(&self, wall_id: &str) -> Vec<f64> {
        self.walls
            .get(wall_id)
            .map(|w| {
                w.holes
                    .iter()
                    .filter_map(|h| self.holes.get(h))
                    .map(|h| h.offset)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_door(&self, wall_id: &str) -> bool {
        self.walls.get(wall_id).is_some_and(|w| {
            w.holes
                .iter()
                .filter_map(|h| self.holes.get(h))
                .any(|h| h.is_door())
        })
    }

    /// Wall endpoints as ((x1, y1), (x2, y2)).
    pub fn wall_endpoints(&self, wall_id: &str) -> Option<((f64, f64), (f64, f64))> {
        let wall = self.walls.get(wall_id)?;
        let a = self.vertices.get(wall.vertices.first()?)?;
        let b = self.vertices.get(wall.vertices.get(1)?)?;
        Some(((a.x, a.y), (b.x, b.y)))
    }

    /// Offset along `wall_id` closest to the point (x, y), in [0, 1].
    pub fn project_onto_wall(&self, wall_id: &str, x: f64, y: f64) -> Option<f64> {
        let ((x1, y1), (x2, y2)) = self.wall_endpoints(wall_id)?;
        let (dx, dy) = (x2 - x1, y2 - y1);
        let len_sq = dx * dx + dy * dy;
        if len_sq <= f64::EPSILON {
            return None;
        }
        Some((((x - x1) * dx + (y - y1) * dy) / len_sq).clamp(0.0, 1.0))
    }

    /// Point at `offset` along a wall.
    pub fn point_on_wall(&self, wall_id: &str, offset: f64) -> Option<(f64, f64)> {
        let ((x1, y1), (x2, y2)) = self.wall_endpoints(wall_id)?;
        Some((x1 + (x2 - x1) * offset, y1 + (y2 - y1) * offset))
    }

    /// Corner coordinates of a room polygon.
    pub fn polygon(&self, area_id: &str) -> Vec<(f64, f64)> {
        self.areas
            .get(area_id)
            .map(|a| {
                a.vertices
                    .iter()
                    .filter_map(|v| self.vertices.get(v))
                    .map(|v| (v.x, v.y))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Lay out `rooms` (already in placement order) on a grid over `footprint`.
pub fn plan_grid<R: Rng + ?Sized>(
    rooms: &[RoomDescriptor],
    footprint: Footprint,
    config: &PlannerConfig,
    rng: &mut R,
) -> LayoutState {
    let grid = grid_dimensions(rooms.len());
    let mut state = LayoutState::new();
    let footprint = footprint.bounded();

    let x_start = config.margin;
    let y_start = config.margin;
    let bounds = Rect::new(
        x_start,
        y_start,
        x_start + footprint.width_cm,
        y_start + footprint.height_cm,
    );
    state.bounds = Some(bounds);
    state.grid = Some(grid);

    // Outer shell: Start, Right, End, Left.
    let corners = [
        (bounds.x1, bounds.y1),
        (bounds.x2, bounds.y1),
        (bounds.x2, bounds.y2),
        (bounds.x1, bounds.y2),
    ];
    let corner_ids: Vec<String> = corners
        .iter()
        .map(|&(x, y)| state.add_vertex(rng, x, y))
        .collect();
    let edges = [
        OuterEdge::Start,
        OuterEdge::Right,
        OuterEdge::End,
        OuterEdge::Left,
    ];
    for (i, edge) in edges.into_iter().enumerate() {
        let (a, b) = (corner_ids[i].clone(), corner_ids[(i + 1) % 4].clone());
        state.add_wall(rng, &a, &b, WallRole::Outer(edge), config);
    }

    // A footprint thinner than a wall still gets 1 cm cells.
    let cell_width = ((footprint.width_cm - config.wall_thickness) / grid.cols as f64)
        .floor()
        .max(1.0);
    let cell_height = ((footprint.height_cm - config.wall_thickness) / grid.rows as f64)
        .floor()
        .max(1.0);
    state.cell_width = cell_width;
    state.cell_height = cell_height;

    // Interior lattice.
    let mut lattice: HashMap<(usize, usize), String> = HashMap::new();
    for row in 0..=grid.rows {
        for col in 0..=grid.cols {
            let x = x_start + col as f64 * cell_width;
            let y = y_start + row as f64 * cell_height;
            let id = state.add_vertex(rng, x, y);
            lattice.insert((row, col), id);
        }
    }

    let mut dividers: HashMap<WallRole, String> = HashMap::new();
    for col in 1..grid.cols {
        for row in 0..grid.rows {
            let role = WallRole::Divider {
                orientation: Orientation::Vertical,
                col,
                row,
            };
            let (a, b) = (lattice[&(row, col)].clone(), lattice[&(row + 1, col)].clone());
            let id = state.add_wall(rng, &a, &b, role, config);
            dividers.insert(role, id);
        }
    }
    for row in 1..grid.rows {
        for col in 0..grid.cols {
            let role = WallRole::Divider {
                orientation: Orientation::Horizontal,
                col,
                row,
            };
            let (a, b) = (lattice[&(row, col)].clone(), lattice[&(row, col + 1)].clone());
            let id = state.add_wall(rng, &a, &b, role, config);
            dividers.insert(role, id);
        }
    }

    let outer_by_edge: HashMap<OuterEdge, String> = state
        .outer_walls
        .iter()
        .filter_map(|w| match state.role(w) {
            Some(WallRole::Outer(edge)) => Some((edge, w.clone())),
            _ => None,
        })
        .collect();

    for (index, room) in rooms.iter().enumerate() {
        let cell = Cell {
            row: index / grid.cols,
            col: index % grid.cols,
        };
        place_room(
            &mut state,
            index,
            room,
            cell,
            (cell_width, cell_height),
            config,
            rng,
        );

        for wall_id in bordering_walls(cell, grid, &dividers, &outer_by_edge) {
            state.link_room_wall(index, &wall_id);
        }
    }

    log::info!(
        "Planned {} rooms on a {}x{} grid ({} walls, {} vertices)",
        rooms.len(),
        grid.cols,
        grid.rows,
        state.walls.len(),
        state.vertices.len()
    );

    state
}

/// Draw one room's polygon and label inside its cell.
fn place_room<R: Rng + ?Sized>(
    state: &mut LayoutState,
    index: usize,
    room: &RoomDescriptor,
    cell: Cell,
    (cell_width, cell_height): (f64, f64),
    config: &PlannerConfig,
    rng: &mut R,
) {
    let bounds = state.bounds.unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
    let x1 = bounds.x1 + cell.col as f64 * cell_width;
    let y1 = bounds.y1 + cell.row as f64 * cell_height;
    let cell_rect = Rect::new(x1, y1, x1 + cell_width, y1 + cell_height);

    let variance = config.room_size_variance;
    let room_width = (cell_width * (1.0 + rng.gen_range(-variance..=variance)))
        .clamp(cell_width * 0.5, cell_width * 1.5);
    let room_height = (cell_height * (1.0 + rng.gen_range(-variance..=variance)))
        .clamp(cell_height * 0.5, cell_height * 1.5);
    let room_rect = Rect::new(x1, y1, x1 + room_width, y1 + room_height);

    // Corners move inward only, so the polygon stays inside room_rect.
    let jx = room_width * config.corner_jitter;
    let jy = room_height * config.corner_jitter;
    let corners = [
        (
            room_rect.x1 + rng.gen_range(0.0..=jx),
            room_rect.y1 + rng.gen_range(0.0..=jy),
        ),
        (
            room_rect.x2 - rng.gen_range(0.0..=jx),
            room_rect.y1 + rng.gen_range(0.0..=jy),
        ),
        (
            room_rect.x2 - rng.gen_range(0.0..=jx),
            room_rect.y2 - rng.gen_range(0.0..=jy),
        ),
        (
            room_rect.x1 + rng.gen_range(0.0..=jx),
            room_rect.y2 - rng.gen_range(0.0..=jy),
        ),
    ];
    let corner_ids: Vec<String> = corners
        .iter()
        .map(|&(x, y)| state.add_vertex(rng, x, y))
        .collect();

    let area_id = state.ids.next(rng, Some(id_prefixes::AREA));
    for v in &corner_ids {
        if let Some(vertex) = state.vertices.get_mut(v) {
            vertex.areas.push(area_id.clone());
        }
    }
    state.areas.insert(
        area_id.clone(),
        primitives::area(
            &area_id,
            &room.name,
            room.room_type,
            corner_ids,
            room.floor_tile.as_deref(),
        ),
    );

    let (lx, ly) = room_rect.center();
    let label_id = state.ids.next(rng, Some(id_prefixes::LABEL));
    state.items.insert(
        label_id.clone(),
        primitives::room_label(&label_id, &room.name, lx, ly, room.room_type, cell_width),
    );

    debug_assert_eq!(state.rooms.len(), index);
    state.rooms.push(PlacedRoom {
        name: room.name.clone(),
        room_type: room.room_type,
        area_id,
        cell,
        cell_rect,
        room_rect,
        required_doors: room.required_doors,
        adjacent_walls: Vec::new(),
    });
}

/// Walls around a cell in door-scan order: start edge, dividers (left,
/// right, top, bottom), then the remaining outer edges.
fn bordering_walls(
    cell: Cell,
    grid: GridSpec,
    dividers: &HashMap<WallRole, String>,
    outer: &HashMap<OuterEdge, String>,
) -> Vec<String> {
    let mut walls = Vec::new();
    let push_outer = |edge: OuterEdge, walls: &mut Vec<String>| {
        if let Some(id) = outer.get(&edge) {
            walls.push(id.clone());
        }
    };

    if cell.row == 0 {
        push_outer(OuterEdge::Start, &mut walls);
    }

    let candidates = [
        (Orientation::Vertical, cell.col, cell.row),
        (Orientation::Vertical, cell.col + 1, cell.row),
        (Orientation::Horizontal, cell.col, cell.row),
        (Orientation::Horizontal, cell.col, cell.row + 1),
    ];
    for (orientation, col, row) in candidates {
        let role = WallRole::Divider {
            orientation,
            col,
            row,
        };
        if let Some(id) = dividers.get(&role) {
            walls.push(id.clone());
        }
    }

    if cell.col + 1 == grid.cols {
        push_outer(OuterEdge::Right, &mut walls);
    }
    if cell.row + 1 == grid.rows {
        push_outer(OuterEdge::End, &mut walls);
    }
    if cell.col == 0 {
        push_outer(OuterEdge::Left, &mut walls);
    }
    walls
}
