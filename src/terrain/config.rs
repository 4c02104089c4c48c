use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::adjacency::{BoundaryRule, Neighborhood};
use super::error::TerrainResult;

/// Default location of the terrain configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "assets/terrain_config.ron";

/// Static terrain parameters, read once before the grid is built.
///
/// These values define the grid's geometry and cost model. Changing them
/// after a `NavGrid` exists has no effect on it; rebuild the terrain instead.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    // Geometry (world units)
    pub map_length: f32,
    pub map_breadth: f32,
    pub grid_length: f32,
    pub grid_breadth: f32,
    pub origin_x: f32,
    pub origin_z: f32,

    // Cost model
    /// Tiles whose cost reaches this value are unwalkable. Costs top out at
    /// 1.0, so the default only blocks tiles whose neighbour variance hits
    /// the 0.9 clamp.
    pub unpassable_threshold: f32,

    // Adjacency
    pub neighborhood: Neighborhood,
    pub boundary: BoundaryRule,

    // Search
    /// Abort a search after expanding this many tiles. `None` searches the
    /// whole region.
    pub max_search_expansions: Option<usize>,

    /// Fail construction instead of falling back to a flat terrain when the
    /// elevation source cannot be sampled.
    pub strict_elevation: bool,

    // Debug
    pub debug_highlight_paths: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            map_length: 10.0,
            map_breadth: 10.0,
            grid_length: 0.5,
            grid_breadth: 0.5,
            origin_x: 0.0,
            origin_z: 0.0,
            unpassable_threshold: 1.0,
            neighborhood: Neighborhood::Eight,
            boundary: BoundaryRule::Clamped,
            max_search_expansions: None,
            strict_elevation: false,
            debug_highlight_paths: false,
        }
    }
}

impl TerrainConfig {
    pub fn from_ron_str(contents: &str) -> TerrainResult<Self> {
        Ok(ron::from_str::<TerrainConfig>(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> TerrainResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }
}

/// Path the startup system reads the configuration from.
#[derive(Resource, Clone, Debug)]
pub struct TerrainConfigPath(pub String);

impl Default for TerrainConfigPath {
    fn default() -> Self {
        Self(DEFAULT_CONFIG_PATH.to_string())
    }
}

/// Load the terrain configuration synchronously at startup.
/// A config inserted by the app beforehand takes precedence over the file.
pub(super) fn load_terrain_config(
    mut commands: Commands,
    path: Res<TerrainConfigPath>,
    existing: Option<Res<TerrainConfig>>,
) {
    if existing.is_some() {
        debug!("TerrainConfig already present, not reading {}", path.0);
        return;
    }

    match TerrainConfig::load(&path.0) {
        Ok(config) => {
            info!("Loaded terrain config from {}", path.0);
            commands.insert_resource(config);
        }
        Err(e) => {
            error!("Failed to load terrain config {}: {}", path.0, e);
            error!("Using default TerrainConfig");
            commands.insert_resource(TerrainConfig::default());
        }
    }
}
