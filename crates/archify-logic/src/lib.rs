//! Procedural floor-plan generation for Archify.
//!
//! Turns loosely-structured room requirements into a complete floor-plan
//! document for the browser planner: outer shell, grid of rooms, doors
//! with an escalating accessibility guarantee, windows, furniture and
//! labels. Everything is plain data in, plain data out; randomness comes
//! from a caller-supplied `rand::Rng` so tests can seed it.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`access`] | Accessibility report: door coverage and reachability |
//! | [`catalog`] | Furniture catalog and floor texture table |
//! | [`config`] | Planner dimensions and heuristics, with validation |
//! | [`constants`] | Wire-format tags and id prefixes |
//! | [`document`] | Root document, layer, grids and guides |
//! | [`doors`] | Entrance, door rescue ladder and windows |
//! | [`error`] | Parse and config errors |
//! | [`furnish`] | Furniture and accessory placement |
//! | [`generate`] | Pipeline entry points |
//! | [`normalize`] | Requirements → ordered room descriptors |
//! | [`planner`] | Grid layout, wall lattice, adjacency index |
//! | [`primitives`] | Vertex/wall/hole/area/item records and ids |
//! | [`requirements`] | Requirements input and footprint |
//! | [`rooms`] | Room types, keyword inference, space templates |
//! | [`session`] | Bounded per-session conversation store |
//! | [`validate`] | Advisory structural checks |

pub mod access;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod document;
pub mod doors;
pub mod error;
pub mod furnish;
pub mod generate;
pub mod normalize;
pub mod planner;
pub mod primitives;
pub mod requirements;
pub mod rooms;
pub mod session;
pub mod validate;

pub use document::FloorPlanDocument;
pub use error::PlanError;
pub use generate::{generate_floor_plan, FloorPlanGenerator, GeneratedPlan};
pub use requirements::Requirements;
