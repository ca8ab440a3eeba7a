//! Planner configuration: wall, door and window dimensions plus the
//! placement heuristics' tuning knobs.
//!
//! Every value has a production default; a JSON file may override any
//! subset of them. `validate_config` reports every out-of-range value at
//! once rather than stopping at the first.
//!
//! ```
//! use archify_logic::config::{validate_config, PlannerConfig};
//!
//! let mut config = PlannerConfig::default();
//! assert!(validate_config(&config).is_empty());
//!
//! config.min_hole_clearance = 0.9;
//! assert_eq!(validate_config(&config).len(), 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// Tunable parameters for one generation run. All lengths in centimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Distance from the canvas origin to the footprint's first corner.
    pub margin: f64,
    pub wall_thickness: f64,
    pub wall_height: f64,
    /// Interior face texture.
    pub wall_texture_a: String,
    /// Exterior face texture.
    pub wall_texture_b: String,

    pub door_width: f64,
    pub door_height: f64,
    /// The main entrance is never narrower than this.
    pub entrance_min_width: f64,
    /// Depth of every hole cut through a wall.
    pub hole_thickness: f64,

    pub window_width: f64,
    pub window_height: f64,
    pub window_altitude: f64,

    /// Minimum separation between two hole offsets on one wall.
    pub min_hole_clearance: f64,
    /// Offset of the main entrance along the start edge.
    pub entrance_offset: f64,
    /// Offsets tried, in order, during primary door assignment.
    pub primary_offsets: Vec<f64>,
    /// Offset used by the zero-door rescue.
    pub rescue_offset: f64,
    /// Offsets tried, in order, by the emergency rescue.
    pub emergency_offsets: Vec<f64>,

    /// Maximum fractional change of a room's width/height against its cell.
    pub room_size_variance: f64,
    /// Maximum inward corner jitter as a fraction of the room's size.
    pub corner_jitter: f64,

    /// Distance of furniture from the room centroid along each axis.
    pub furniture_spread: f64,
    /// Distance of accessories from the bounding-box corners.
    pub accessory_inset: f64,
    pub max_furniture_per_room: usize,
    pub max_accessories_per_room: usize,

    pub canvas_width: u32,
    pub canvas_height: u32,
    pub grid_step: u32,
    pub layer_id: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            margin: 200.0,
            wall_thickness: 20.0,
            wall_height: 300.0,
            wall_texture_a: "painted".to_string(),
            wall_texture_b: "painted".to_string(),
            door_width: 80.0,
            door_height: 215.0,
            entrance_min_width: 200.0,
            hole_thickness: 30.0,
            window_width: 120.0,
            window_height: 100.0,
            window_altitude: 90.0,
            min_hole_clearance: 0.15,
            entrance_offset: 0.1,
            primary_offsets: vec![0.3, 0.4, 0.5, 0.6, 0.7],
            rescue_offset: 0.5,
            emergency_offsets: vec![0.2, 0.8, 0.4, 0.6],
            room_size_variance: 0.3,
            corner_jitter: 0.2,
            furniture_spread: 100.0,
            accessory_inset: 50.0,
            max_furniture_per_room: 4,
            max_accessories_per_room: 4,
            canvas_width: 3000,
            canvas_height: 2000,
            grid_step: 20,
            layer_id: "layer-1".to_string(),
        }
    }
}

impl PlannerConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        let config: PlannerConfig = serde_json::from_str(json).map_err(PlanError::Config)?;
        let errors = validate_config(&config);
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(PlanError::InvalidConfig(errors))
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A length that must be strictly positive was not.
    NonPositiveLength(&'static str, f64),
    /// A hole offset outside the open interval (0, 1).
    OffsetOutOfRange(&'static str, f64),
    /// An offset list with nothing to try.
    EmptyOffsetList(&'static str),
    /// Clearance outside (0, 0.5).
    InvalidClearance(f64),
    /// Size variance large enough to collapse a room.
    VarianceTooLarge(f64),
    /// Corner jitter large enough to fold a room polygon.
    JitterTooLarge(f64),
    /// Canvas or grid dimension of zero.
    ZeroCanvas(&'static str),
    EmptyLayerId,
}

/// Validate a planner configuration, returning all errors found.
pub fn validate_config(config: &PlannerConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    let lengths = [
        ("wall_thickness", config.wall_thickness),
        ("wall_height", config.wall_height),
        ("door_width", config.door_width),
        ("door_height", config.door_height),
        ("hole_thickness", config.hole_thickness),
        ("window_width", config.window_width),
        ("window_height", config.window_height),
    ];
    for (name, value) in lengths {
        if value <= 0.0 {
            errors.push(ConfigError::NonPositiveLength(name, value));
        }
    }
    if config.margin < 0.0 {
        errors.push(ConfigError::NonPositiveLength("margin", config.margin));
    }

    let in_range = |o: f64| o > 0.0 && o < 1.0;
    if !in_range(config.entrance_offset) {
        errors.push(ConfigError::OffsetOutOfRange(
            "entrance_offset",
            config.entrance_offset,
        ));
    }
    if !in_range(config.rescue_offset) {
        errors.push(ConfigError::OffsetOutOfRange(
            "rescue_offset",
            config.rescue_offset,
        ));
    }
    for (name, list) in [
        ("primary_offsets", &config.primary_offsets),
        ("emergency_offsets", &config.emergency_offsets),
    ] {
        if list.is_empty() {
            errors.push(ConfigError::EmptyOffsetList(name));
        }
        for &o in list {
            if !in_range(o) {
                errors.push(ConfigError::OffsetOutOfRange(name, o));
            }
        }
    }

    if config.min_hole_clearance <= 0.0 || config.min_hole_clearance >= 0.5 {
        errors.push(ConfigError::InvalidClearance(config.min_hole_clearance));
    }
    if !(0.0..0.5).contains(&config.room_size_variance) {
        errors.push(ConfigError::VarianceTooLarge(config.room_size_variance));
    }
    if !(0.0..0.5).contains(&config.corner_jitter) {
        errors.push(ConfigError::JitterTooLarge(config.corner_jitter));
    }

    if config.canvas_width == 0 {
        errors.push(ConfigError::ZeroCanvas("canvas_width"));
    }
    if config.canvas_height == 0 {
        errors.push(ConfigError::ZeroCanvas("canvas_height"));
    }
    if config.grid_step == 0 {
        errors.push(ConfigError::ZeroCanvas("grid_step"));
    }
    if config.layer_id.trim().is_empty() {
        errors.push(ConfigError::EmptyLayerId);
    }

    errors
}
