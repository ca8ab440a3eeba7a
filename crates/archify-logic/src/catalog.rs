//! Furniture catalog and floor texture table.
//!
//! Catalog keys are what requirements (and room-type defaults) name; each
//! resolves to the display name and item type the planner client renders.
//! Keys missing from the catalog resolve to `None` and are skipped.

/// One placeable catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub key: &'static str,
    pub name: &'static str,
    pub item_type: &'static str,
}

const fn entry(key: &'static str, name: &'static str, item_type: &'static str) -> CatalogEntry {
    CatalogEntry {
        key,
        name,
        item_type,
    }
}

/// All placeable items, keyed by catalog key.
pub const FURNITURE_CATALOG: &[CatalogEntry] = &[
    entry("bed", "bed", "bed"),
    entry("wardrobe", "wardrobe", "wardrobe"),
    entry("desk", "desk", "desk"),
    entry("chair", "chair", "chair"),
    entry("chairdesk", "chairdesk", "chairdesk"),
    entry("deskoffice", "desk", "deskoffice"),
    entry("sofa", "sofa", "sofa"),
    entry("armchairs", "armchairs", "armchairs"),
    entry("tv", "tv", "tv"),
    entry("coffee_table", "coffee_table", "table"),
    entry("dining_table", "dining_table", "table"),
    entry("bookcase", "bookcase", "bookcase"),
    entry("fridge", "fridge", "fridge"),
    entry("kitchen", "kitchen", "kitchen"),
    entry("sink", "sink", "sink"),
    entry("stove", "stove", "kitchen"),
    entry("toilet", "toilet", "sink"),
    entry("shower", "shower", "sink"),
    entry("radiator", "radiator-modern-style", "radiator-modern-style"),
    entry("trash", "trash", "trash"),
    entry("coat-hook", "coat-hook", "coat-hook"),
    entry("umbrella-stand", "umbrella-stand", "umbrella-stand"),
    entry("recycling-bins", "recycling-bins", "recycling-bins"),
    entry("smoke-detector", "smoke-detector", "smoke-detector"),
    entry("fire-extinguisher", "fire-extinguisher", "fire-extinguisher"),
    entry("monitor-pc", "monitor_pc", "monitor-pc"),
    entry("router-wifi", "router_wifi", "router-wifi"),
    entry("air-conditioner", "conditioner", "air-conditioner"),
    entry("hanger", "hanger", "hanger"),
    entry("image", "image", "image"),
    entry("blackboard", "blackboard", "blackboard"),
    entry("canteen-table", "canteen_table", "canteen-table"),
    entry("canteencart", "canteen_cart", "canteencart"),
    entry("camera", "camera", "camera"),
    entry("teaching-post", "teaching-post", "teaching-post"),
    entry("school-desk", "school_desk", "school-desk"),
    entry("school-desk-double", "school_desk_double", "school-desk-double"),
    entry("projector", "projector", "projector"),
    entry("metal-detector", "metal_detector", "metal-detector"),
    entry("electrical-panel", "pannello_elettrico", "electrical-panel"),
    entry("three-phase-panel", "three_phase_panel", "three-phase-panel"),
    entry("schneider", "schneider", "schneider"),
    entry("hiroos", "hiroos", "hiroos"),
    entry("lim", "multimedia_chalkboard", "lim"),
    entry("hub", "hub", "hub"),
    entry("naspo", "naspo", "naspo"),
    entry("bench", "bench", "bench"),
    entry("balcony", "balcony", "balcony"),
    entry("column", "round_column", "column"),
    entry("column-square", "square_column", "column-square"),
    entry("cube", "cube", "cube"),
    entry("simple-stair", "simple-stair", "simple-stair"),
    entry("text-3d", "text", "text-3d"),
    entry("cleaningcart", "cleaning_cart", "cleaningcart"),
    entry("child-chair-desk", "child_chair_desk", "child-chair-desk"),
];

/// Look up a catalog key. Exact match; unknown keys return `None`.
pub fn lookup(key: &str) -> Option<&'static CatalogEntry> {
    FURNITURE_CATALOG.iter().find(|e| e.key == key)
}

/// Floor textures with a dedicated asset in the planner client.
const SPECIAL_TEXTURES: &[(&str, &str)] = &[
    ("grass", "#grass"),
    ("ceramic", "#ceramic"),
    ("tile1", "#tile1"),
    ("strand_porcelain", "#strand_porcelain"),
    ("parquet", "#parquet"),
    ("painted", "#painted"),
];

/// Map a texture name to the client's asset reference. Names without a
/// dedicated asset pass through unchanged.
pub fn resolve_texture(name: &str) -> String {
    SPECIAL_TEXTURES
        .iter()
        .find(|(k, _)| *k == name)
        .map(|(_, v)| (*v).to_string())
        .unwrap_or_else(|| name.to_string())
}
