//! Grid-based navigation over a heightmapped terrain.
//!
//! Build a [`NavGrid`] (or the [`TerrainNav`] resource wrapping it) from a
//! [`TerrainConfig`] and an [`ElevationSource`], then ask it for heights,
//! tile sets and A* paths by world position. [`TerrainNavPlugin`] wires the
//! same queries into a bevy app through [`TerrainPathRequest`] messages.

mod adjacency;
mod astar;
mod config;
mod connectivity;
mod debug;
mod elevation;
mod error;
mod facade;
mod nav_grid;
mod systems;
mod tile;

#[cfg(test)]
mod tests;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use adjacency::{compute_neighbours, BoundaryRule, Neighborhood, NeighbourList};
pub use astar::{PathFinder, PathOutcome, SearchScratch, SearchStats};
pub use config::{TerrainConfig, TerrainConfigPath, DEFAULT_CONFIG_PATH};
pub use debug::{tile_set_shades, TerrainHighlights};
pub use elevation::{ElevationGrid, ElevationSource, IntensityImage, MAX_INTENSITY};
pub use error::{TerrainError, TerrainResult};
pub use facade::TerrainNav;
pub use nav_grid::{BuildReport, NavGrid};
pub use systems::{TerrainPath, TerrainPathRequest};
pub use tile::{nav_cost, Tile, TileCoord, TileIndex, BASE_NAV_COST, MAX_NAV_VARIANCE, UNPASSABLE_NAV_COST_LIMIT};

use bevy::prelude::*;

/// Registers terrain path requests and loads [`TerrainConfig`] at startup.
///
/// The plugin does not build the grid: insert a [`TerrainNav`] once the
/// elevation data is available. Requests are processed only while that
/// resource exists.
pub struct TerrainNavPlugin {
    pub config_path: String,
}

impl Default for TerrainNavPlugin {
    fn default() -> Self {
        Self {
            config_path: DEFAULT_CONFIG_PATH.to_string(),
        }
    }
}

impl Plugin for TerrainNavPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<TerrainPathRequest>();
        app.init_resource::<TerrainHighlights>();
        app.insert_resource(TerrainConfigPath(self.config_path.clone()));
        app.add_systems(Startup, config::load_terrain_config);
        app.add_systems(
            Update,
            systems::process_terrain_path_requests.run_if(resource_exists::<TerrainNav>),
        );
    }
}
