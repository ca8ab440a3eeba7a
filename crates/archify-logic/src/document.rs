//! Floor-plan document: the root aggregate handed to the rendering client.
//!
//! The shape is fixed by the client. Everything except the layer maps is
//! static cosmetic metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::constants::UNIT_CM;
use crate::planner::LayoutState;
use crate::primitives::{Area, EmptyObject, Hole, Item, Vertex, Wall};

/// Background grid line colours, major line first.
const GRID_COLORS: [&str; 5] = ["#808080", "#ddd", "#ddd", "#ddd", "#ddd"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanDocument {
    pub unit: String,
    pub layers: BTreeMap<String, Layer>,
    pub grids: BTreeMap<String, Grid>,
    pub selected_layer: String,
    pub groups: BTreeMap<String, serde_json::Value>,
    pub width: u32,
    pub height: u32,
    pub meta: EmptyObject,
    pub guides: Guides,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub altitude: f64,
    pub order: u32,
    pub opacity: f64,
    pub name: String,
    pub visible: bool,
    pub vertices: BTreeMap<String, Vertex>,
    pub lines: BTreeMap<String, Wall>,
    pub holes: BTreeMap<String, Hole>,
    pub areas: BTreeMap<String, Area>,
    pub items: BTreeMap<String, Item>,
    pub selected: LayerSelection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerSelection {
    pub vertices: Vec<String>,
    pub lines: Vec<String>,
    pub holes: Vec<String>,
    pub areas: Vec<String>,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: GridProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridProperties {
    pub step: u32,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Guides {
    pub horizontal: BTreeMap<String, serde_json::Value>,
    pub vertical: BTreeMap<String, serde_json::Value>,
    pub circular: BTreeMap<String, serde_json::Value>,
}

impl Grid {
    fn streak(id: &str, kind: &str, step: u32) -> Self {
        Self {
            id: id.to_string(),
            kind: kind.to_string(),
            properties: GridProperties {
                step,
                colors: GRID_COLORS.iter().map(|c| c.to_string()).collect(),
            },
        }
    }
}

impl FloorPlanDocument {
    /// Wrap a finished layout into the client document.
    pub fn assemble(state: LayoutState, config: &PlannerConfig) -> Self {
        let layer = Layer {
            id: config.layer_id.clone(),
            altitude: 0.0,
            order: 0,
            opacity: 1.0,
            name: "default".to_string(),
            visible: true,
            vertices: state.vertices,
            lines: state.walls,
            holes: state.holes,
            areas: state.areas,
            items: state.items,
            selected: LayerSelection::default(),
        };

        let mut grids = BTreeMap::new();
        grids.insert(
            "h1".to_string(),
            Grid::streak("h1", "horizontal-streak", config.grid_step),
        );
        grids.insert(
            "v1".to_string(),
            Grid::streak("v1", "vertical-streak", config.grid_step),
        );

        let mut layers = BTreeMap::new();
        layers.insert(config.layer_id.clone(), layer);

        Self {
            unit: UNIT_CM.to_string(),
            layers,
            grids,
            selected_layer: config.layer_id.clone(),
            groups: BTreeMap::new(),
            width: config.canvas_width,
            height: config.canvas_height,
            meta: EmptyObject {},
            guides: Guides::default(),
        }
    }

    /// The layer named by `selectedLayer`.
    pub fn active_layer(&self) -> Option<&Layer> {
        self.layers.get(&self.selected_layer)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
