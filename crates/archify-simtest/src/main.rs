//! Archify Headless Floor-Plan Harness
//!
//! Sweeps the generation pipeline across space types and seeds and checks
//! the door guarantees, grid topology, document shape and the session
//! store round trip. Runs entirely in-process: no server, no LLM, no
//! rendering.
//!
//! Usage:
//!   cargo run -p archify-simtest
//!   cargo run -p archify-simtest -- --verbose --seeds 50
//!   cargo run -p archify-simtest -- --requirements req.json --seed 7 --dump plan.json

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use archify_logic::config::PlannerConfig;
use archify_logic::doors::{place_openings, DoorPhase, DoorState};
use archify_logic::generate::{FloorPlanGenerator, GeneratedPlan};
use archify_logic::normalize::{normalize_rooms, RoomDescriptor};
use archify_logic::planner::{
    grid_dimensions, plan_grid, Cell, LayoutState, OuterEdge, PlacedRoom, Rect, WallRole,
};
use archify_logic::requirements::{Footprint, Requirements, RoomRequest};
use archify_logic::rooms::{RoomType, SpaceType};
use archify_logic::session::{
    append_message, ChatMessage, ChatRole, Conversation, InMemorySessionStore, SessionStore,
};
use archify_logic::validate::{check_outer_closure, validate_document, Severity};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser, Debug)]
#[command(name = "archify-simtest")]
#[command(version)]
#[command(about = "Headless floor-plan generation harness")]
struct Args {
    /// Print every result, not just failures.
    #[arg(long)]
    verbose: bool,

    /// Seeds per sweep.
    #[arg(long, default_value_t = 25)]
    seeds: u64,

    /// First seed of every sweep; also the seed for --requirements.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Generate a single plan from this requirements JSON instead of
    /// running the scenario suite.
    #[arg(long)]
    requirements: Option<PathBuf>,

    /// Planner config JSON; defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the generated document JSON here (with --requirements).
    #[arg(long)]
    dump: Option<PathBuf>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            PlannerConfig::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => PlannerConfig::default(),
    };
    let generator = FloorPlanGenerator::new(config).context("planner config rejected")?;

    if let Some(path) = &args.requirements {
        return run_single(&generator, path, &args);
    }

    println!("=== Archify Floor-Plan Harness ===\n");
    let sweep = Sweep {
        first: args.seed,
        count: args.seeds.max(1),
    };

    let mut results = Vec::new();

    // 1. Requirements normalization
    results.extend(validate_normalizer());

    // 2. Grid topology
    results.extend(validate_grid(&generator, sweep));

    // 3. Door guarantee across every template
    results.extend(validate_door_guarantee(&generator, sweep));

    // 4. Rescue ladder on crafted layouts
    results.extend(validate_rescue_ladder(generator.config()));

    // 5. Document shape and advisory validation
    results.extend(validate_documents(&generator, sweep));

    // 6. Randomness confined to coordinates
    results.extend(validate_determinism(&generator, sweep));

    // 7. Session store round trip
    results.extend(validate_sessions(&generator, sweep));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn run_single(
    generator: &FloorPlanGenerator,
    path: &Path,
    args: &Args,
) -> anyhow::Result<()> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading requirements {}", path.display()))?;
    let requirements = Requirements::from_json(&json)
        .with_context(|| format!("parsing requirements {}", path.display()))?;

    log::info!("Generating from {} with seed {}", path.display(), args.seed);
    let plan = generator.generate_with_rng(&requirements, &mut StdRng::seed_from_u64(args.seed));
    println!("=== {} rooms ===", plan.rooms.len());
    for room in &plan.rooms {
        println!("  {} ({}, ratio {:.1})", room.name, room.room_type, room.size_ratio);
    }
    println!("\n=== Accessibility ===");
    for line in plan.report.lines() {
        println!("  {}", line);
    }

    if let Some(out) = &args.dump {
        let doc = plan.document.to_json_pretty()?;
        fs::write(out, doc).with_context(|| format!("writing {}", out.display()))?;
        println!("\nDocument written to {}", out.display());
    }
    Ok(())
}

#[derive(Clone, Copy)]
struct Sweep {
    first: u64,
    count: u64,
}

impl Sweep {
    fn seeds(self) -> impl Iterator<Item = u64> {
        self.first..self.first + self.count
    }
}

fn generate(generator: &FloorPlanGenerator, req: &Requirements, seed: u64) -> GeneratedPlan {
    generator.generate_with_rng(req, &mut StdRng::seed_from_u64(seed))
}

fn template(space: SpaceType, bedrooms: u32, bathrooms: u32) -> Requirements {
    Requirements {
        space_type: format!("{:?}", space).to_lowercase(),
        num_bedrooms: bedrooms,
        num_bathrooms: bathrooms,
        ..Default::default()
    }
}

fn explicit(names: &[&str]) -> Requirements {
    Requirements {
        rooms: names.iter().map(|n| RoomRequest::named(n)).collect(),
        ..Default::default()
    }
}

// ── 1. Normalizer ───────────────────────────────────────────────────────

fn validate_normalizer() -> Vec<TestResult> {
    println!("--- Requirements Normalizer ---");
    let mut results = Vec::new();

    let rooms = normalize_rooms(&template(SpaceType::Apartment, 2, 1));
    let count = |rt: RoomType| rooms.iter().filter(|r| r.room_type == rt).count();
    results.push(TestResult::new(
        "apartment_2bd_1ba",
        rooms.len() == 6
            && count(RoomType::Bedroom) == 2
            && count(RoomType::Bathroom) == 1
            && count(RoomType::Storage) == 1,
        format!(
            "{} rooms: {}",
            rooms.len(),
            rooms
                .iter()
                .map(|r| r.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    ));

    let rooms = normalize_rooms(&explicit(&["Reception", "Office 1", "Storage"]));
    let types: Vec<RoomType> = rooms.iter().map(|r| r.room_type).collect();
    results.push(TestResult::new(
        "explicit_inference",
        rooms.len() == 3
            && types.contains(&RoomType::Office)
            && types.contains(&RoomType::Storage)
            && types.contains(&RoomType::Generic),
        format!("{:?}", types),
    ));

    let capped = normalize_rooms(&template(SpaceType::House, 9, 9));
    let bedrooms = capped
        .iter()
        .filter(|r| r.room_type == RoomType::Bedroom)
        .count();
    let bathrooms = capped
        .iter()
        .filter(|r| r.room_type == RoomType::Bathroom)
        .count();
    results.push(TestResult::new(
        "template_caps",
        bedrooms == 5 && bathrooms == 3,
        format!("{} bedrooms, {} bathrooms", bedrooms, bathrooms),
    ));

    let mut unsorted = 0;
    for &space in SpaceType::all() {
        let rooms = normalize_rooms(&template(space, 3, 2));
        if rooms.windows(2).any(|p| p[0].size_ratio < p[1].size_ratio) {
            unsorted += 1;
        }
        if !rooms.iter().any(|r| r.room_type == RoomType::Storage) {
            unsorted += 1;
        }
    }
    results.push(TestResult::new(
        "sorted_with_storage",
        unsorted == 0,
        format!("{} templates out of order or storage-less", unsorted),
    ));

    results
}

// ── 2. Grid ─────────────────────────────────────────────────────────────

fn validate_grid(generator: &FloorPlanGenerator, sweep: Sweep) -> Vec<TestResult> {
    println!("--- Grid Layout Planner ---");
    let mut results = Vec::new();

    let grid = grid_dimensions(12);
    results.push(TestResult::new(
        "twelve_rooms_4x3",
        grid.cols == 4 && grid.rows == 3,
        format!("{}x{}", grid.cols, grid.rows),
    ));

    let config = generator.config();
    let mut escaped = 0;
    let mut open_shells = 0;
    let mut checked = 0;
    for seed in sweep.seeds() {
        for n in [1, 3, 6, 9, 12, 16] {
            let rooms: Vec<RoomDescriptor> = (0..n)
                .map(|i| RoomDescriptor::new(&format!("Room {}", i + 1), RoomType::Generic, 1.0))
                .collect();
            let mut rng = StdRng::seed_from_u64(seed);
            let state = plan_grid(&rooms, Footprint::new(1000.0, 800.0), config, &mut rng);
            if state.outer_walls.len() != 4 {
                open_shells += 1;
            }
            for room in &state.rooms {
                let cell = room.cell_rect;
                let bound = Rect::new(
                    cell.x1,
                    cell.y1,
                    cell.x1 + cell.width() * (1.0 + config.room_size_variance),
                    cell.y1 + cell.height() * (1.0 + config.room_size_variance),
                );
                checked += 1;
                if state
                    .polygon(&room.area_id)
                    .iter()
                    .any(|&(x, y)| !bound.contains(x, y, 1e-6))
                {
                    escaped += 1;
                }
            }
        }
    }
    results.push(TestResult::new(
        "outer_shell_closed",
        open_shells == 0,
        format!("{} layouts without 4 outer walls", open_shells),
    ));
    results.push(TestResult::new(
        "polygons_within_cells",
        escaped == 0,
        format!("{}/{} rooms escaped their perturbed cell", escaped, checked),
    ));

    results
}

// ── 3. Door guarantee ───────────────────────────────────────────────────

fn validate_door_guarantee(generator: &FloorPlanGenerator, sweep: Sweep) -> Vec<TestResult> {
    println!("--- Door Guarantee ---");
    let mut results = Vec::new();

    for &space in SpaceType::all() {
        let req = template(space, 2, 1);
        let mut worst = 1.0_f64;
        let mut double_doors = 0;
        let mut islands = 0;
        for seed in sweep.seeds() {
            let plan = generate(generator, &req, seed);
            worst = worst.min(plan.report.coverage());
            if !plan.report.emergency_rescue_used && has_double_door(&plan) {
                double_doors += 1;
            }
            if !plan.report.all_rooms_reachable() {
                islands += 1;
            }
        }
        results.push(TestResult::new(
            &format!("coverage_{:?}", space).to_lowercase(),
            worst >= 1.0 && double_doors == 0 && islands == 0,
            format!(
                "worst coverage {:.0}%, {} plans with a doubled door, {} with unreachable rooms",
                worst * 100.0,
                double_doors,
                islands
            ),
        ));
    }

    let mut missing_entrance = 0;
    for seed in sweep.seeds() {
        let plan = generate(generator, &template(SpaceType::Apartment, 2, 1), seed);
        if !plan.report.entrance_placed {
            missing_entrance += 1;
        }
    }
    results.push(TestResult::new(
        "main_entrance_present",
        missing_entrance == 0,
        format!("{} plans without a main entrance", missing_entrance),
    ));

    results
}

fn has_double_door(plan: &GeneratedPlan) -> bool {
    let Some(layer) = plan.document.active_layer() else {
        return false;
    };
    layer.lines.values().any(|wall| {
        wall.holes
            .iter()
            .filter_map(|h| layer.holes.get(h))
            .filter(|h| h.is_door())
            .count()
            > 1
    })
}

// ── 4. Rescue ladder ────────────────────────────────────────────────────

fn validate_rescue_ladder(config: &PlannerConfig) -> Vec<TestResult> {
    println!("--- Rescue Ladder ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(0);

    // A lone room has no shared wall: outer-wall rescue.
    let rooms = vec![RoomDescriptor::new("Studio", RoomType::Living, 2.0)];
    let mut state = plan_grid(&rooms, Footprint::new(800.0, 600.0), config, &mut rng);
    let placement = place_openings(&mut state, config, &mut rng);
    results.push(TestResult::new(
        "lone_room_outer_wall",
        placement.rooms[0].state == DoorState::Satisfied(DoorPhase::OuterWallRescue),
        format!("{:?}", placement.rooms[0].state),
    ));

    // A room whose only wall carries the entrance: emergency rescue.
    let mut state = LayoutState::new();
    let a = state.add_vertex(&mut rng, 200.0, 200.0);
    let b = state.add_vertex(&mut rng, 1200.0, 200.0);
    let wall = state.add_wall(&mut rng, &a, &b, WallRole::Outer(OuterEdge::Start), config);
    state.rooms.push(crafted_room("Closet", Rect::new(200.0, 200.0, 1200.0, 1000.0)));
    state.link_room_wall(0, &wall);
    let placement = place_openings(&mut state, config, &mut rng);
    results.push(TestResult::new(
        "entrance_wall_emergency",
        placement.rooms[0].state == DoorState::Satisfied(DoorPhase::EmergencyRescue)
            && placement.emergency_rescue_used(),
        format!(
            "{:?}, offsets {:?}",
            placement.rooms[0].state,
            state.hole_offsets(&wall)
        ),
    ));

    // A room with no walls at all stays unresolved without aborting.
    let mut state = LayoutState::new();
    state
        .rooms
        .push(crafted_room("Void", Rect::new(0.0, 0.0, 100.0, 100.0)));
    let placement = place_openings(&mut state, config, &mut rng);
    results.push(TestResult::new(
        "wall_less_room_unresolved",
        placement.rooms[0].state == DoorState::Unresolved,
        format!("{:?}", placement.rooms[0].state),
    ));

    results
}

fn crafted_room(name: &str, cell_rect: Rect) -> PlacedRoom {
    PlacedRoom {
        name: name.to_string(),
        room_type: RoomType::Storage,
        area_id: format!("area-{}", name.to_lowercase()),
        cell: Cell { row: 0, col: 0 },
        cell_rect,
        room_rect: cell_rect,
        required_doors: 1,
        adjacent_walls: Vec::new(),
    }
}

// ── 5. Documents ────────────────────────────────────────────────────────

fn validate_documents(generator: &FloorPlanGenerator, sweep: Sweep) -> Vec<TestResult> {
    println!("--- Document Shape ---");
    let mut results = Vec::new();

    let mut bad_shape = 0;
    let mut findings = 0;
    let mut open_shells = 0;
    let requests = [
        template(SpaceType::Apartment, 2, 1),
        template(SpaceType::Office, 0, 1),
        explicit(&["Kitchen", "", "Study"]),
        Requirements {
            space_type: "warehouse".to_string(),
            width_meters: f64::NAN,
            user_priority: "space_optimization".to_string(),
            ..Default::default()
        },
    ];
    for seed in sweep.seeds() {
        for req in &requests {
            let plan = generate(generator, req, seed);
            let json = match serde_json::to_value(&plan.document) {
                Ok(v) => v,
                Err(_) => {
                    bad_shape += 1;
                    continue;
                }
            };
            let keys = [
                "unit",
                "layers",
                "grids",
                "selectedLayer",
                "groups",
                "width",
                "height",
                "meta",
                "guides",
            ];
            let shape_ok = json.as_object().is_some_and(|o| o.len() == keys.len())
                && keys.iter().all(|k| json.get(k).is_some());
            if !shape_ok {
                bad_shape += 1;
            }
            findings += validate_document(&plan.document, generator.config())
                .iter()
                .filter(|f| f.severity == Severity::Error)
                .count();
            if let Some(layer) = plan.document.active_layer() {
                if !check_outer_closure(layer).is_empty() {
                    open_shells += 1;
                }
            }
        }
    }
    results.push(TestResult::new(
        "top_level_keys",
        bad_shape == 0,
        format!("{} documents with unexpected shape", bad_shape),
    ));
    results.push(TestResult::new(
        "structural_validation",
        findings == 0,
        format!("{} error findings", findings),
    ));
    results.push(TestResult::new(
        "document_shell_closed",
        open_shells == 0,
        format!("{} documents with an open shell", open_shells),
    ));

    results
}

// ── 6. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(generator: &FloorPlanGenerator, sweep: Sweep) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mut results = Vec::new();
    let req = template(SpaceType::Apartment, 2, 1);

    let a = generate(generator, &req, sweep.first);
    let b = generate(generator, &req, sweep.first);
    results.push(TestResult::new(
        "same_seed_same_document",
        a.document == b.document,
        "documents compared field by field",
    ));

    let c = generate(generator, &req, sweep.first + 1);
    let counts = |p: &GeneratedPlan| {
        p.document.active_layer().map(|l| {
            (
                l.vertices.len(),
                l.lines.len(),
                l.areas.len(),
                l.holes.values().filter(|h| h.is_door()).count(),
            )
        })
    };
    results.push(TestResult::new(
        "new_seed_same_structure",
        counts(&a) == counts(&c) && a.document != c.document,
        format!("{:?} vs {:?}", counts(&a), counts(&c)),
    ));

    results
}

// ── 7. Sessions ─────────────────────────────────────────────────────────

const SYSTEM_PROMPT: &str = "You turn room requests into floor-plan requirements JSON.";

fn validate_sessions(generator: &FloorPlanGenerator, sweep: Sweep) -> Vec<TestResult> {
    println!("--- Session Store ---");
    let mut results = Vec::new();
    let mut store: InMemorySessionStore<Conversation> = InMemorySessionStore::new(4, 600);

    // The last assistant turn carries requirements; plan from it.
    append_message(
        &mut store,
        "designer",
        SYSTEM_PROMPT,
        ChatMessage::new(ChatRole::User, "A two bedroom flat with one bathroom"),
        0,
    );
    append_message(
        &mut store,
        "designer",
        SYSTEM_PROMPT,
        ChatMessage::new(
            ChatRole::Assistant,
            r#"{"space_type": "apartment", "num_bedrooms": 2, "num_bathrooms": 1}"#,
        ),
        10,
    );
    let reply = store.get("designer", 20).and_then(|history| {
        history
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::Assistant)
            .map(|m| m.content.clone())
    });
    let planned = reply
        .as_deref()
        .and_then(|json| Requirements::from_json(json).ok())
        .map(|req| generate(generator, &req, sweep.first));
    results.push(TestResult::new(
        "history_round_trip",
        planned
            .as_ref()
            .is_some_and(|p| p.rooms.len() == 6 && p.report.all_rooms_reachable()),
        format!(
            "{} messages, {:?} rooms",
            store.get("designer", 20).map_or(0, |h| h.len()),
            planned.as_ref().map(|p| p.rooms.len())
        ),
    ));

    // Capacity evicts the least recently used session.
    for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
        let now = 30 + i as u64;
        let hello = ChatMessage::new(ChatRole::User, "hi");
        append_message(&mut store, id, SYSTEM_PROMPT, hello, now);
    }
    results.push(TestResult::new(
        "capacity_evicts_oldest",
        store.len() == 4 && store.get("designer", 40).is_none(),
        format!("{} sessions held", store.len()),
    ));

    // Sessions idle past the timeout are dropped.
    store.get("d", 500);
    let dropped = store.expire(700);
    results.push(TestResult::new(
        "idle_sessions_expire",
        dropped == 3 && store.get("d", 700).is_some(),
        format!("{} expired, {} left", dropped, store.len()),
    ));

    results
}
