use bevy::prelude::*;

use super::astar::{PathFinder, PathOutcome, SearchStats};
use super::config::TerrainConfig;
use super::elevation::ElevationSource;
use super::error::TerrainResult;
use super::nav_grid::NavGrid;
use super::tile::{TileCoord, TileIndex};

/// World-space queries over a built [`NavGrid`].
///
/// Owns the grid and one [`PathFinder`]. Coordinates outside the grid clamp
/// to the nearest edge tile, so every query here is total.
#[derive(Resource, Clone, Debug)]
pub struct TerrainNav {
    grid: NavGrid,
    path_finder: PathFinder,
    config: TerrainConfig,
}

/// Floor a world coordinate onto `0..count`. Non-finite input maps to 0.
fn axis_index(value: f32, origin: f32, spacing: f32, count: usize) -> usize {
    let cell = ((value - origin) / spacing).floor();
    if !cell.is_finite() || cell < 0.0 {
        return 0;
    }
    (cell as usize).min(count.saturating_sub(1))
}

impl TerrainNav {
    /// Build the grid for `config`, sampling `source` for elevation.
    pub fn new(config: &TerrainConfig, source: &dyn ElevationSource) -> TerrainResult<Self> {
        let grid = NavGrid::build(config, source)?;
        Ok(Self::from_grid(grid, config.clone()))
    }

    /// Wrap an already-built grid.
    pub fn from_grid(grid: NavGrid, config: TerrainConfig) -> Self {
        Self {
            grid,
            path_finder: PathFinder::with_max_expansions(config.max_search_expansions),
            config,
        }
    }

    pub fn grid(&self) -> &NavGrid {
        &self.grid
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn last_search_stats(&self) -> SearchStats {
        self.path_finder.last_stats()
    }

    /// Grid indices `(ix, iz)` of the tile containing world `(x, z)`.
    pub fn world_to_indices(&self, x: f32, z: f32) -> (usize, usize) {
        let origin = self.grid.origin();
        (
            axis_index(x, origin.x, self.grid.grid_length(), self.grid.node_count_x()),
            axis_index(z, origin.y, self.grid.grid_breadth(), self.grid.node_count_z()),
        )
    }

    pub fn node_indices_for(&self, x: f32, z: f32) -> TileCoord {
        self.world_to_indices(x, z).into()
    }

    fn index_at(&self, x: f32, z: f32) -> TileIndex {
        let (ix, iz) = self.world_to_indices(x, z);
        TileIndex((ix * self.grid.node_count_z() + iz) as u32)
    }

    /// Normalized elevation of the tile under world `(x, z)`.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.grid.tile(self.index_at(x, z)).pos_y
    }

    pub fn height_for_node(&self, coord: TileCoord) -> Option<f32> {
        self.grid.tile_at(coord).map(|tile| tile.pos_y)
    }

    pub fn tile_set_at(&self, x: f32, z: f32) -> u32 {
        self.grid.tile(self.index_at(x, z)).tile_set
    }

    pub fn all_tile_set_ids(&self) -> Vec<u32> {
        self.grid.all_tile_set_ids()
    }

    /// Search between the tiles under `start` and `end` (y is ignored).
    pub fn search_path(&mut self, start: Vec3, end: Vec3) -> PathOutcome {
        let from = self.index_at(start.x, start.z);
        let to = self.index_at(end.x, end.z);
        let outcome = self.path_finder.search(&self.grid, from, to);

        match &outcome {
            PathOutcome::Found(path) => debug!(
                "[PATHFINDING] {:?} -> {:?}: {} tiles, {} expanded",
                self.grid.coord_of(from),
                self.grid.coord_of(to),
                path.len(),
                self.path_finder.last_stats().expanded
            ),
            PathOutcome::Unreachable => debug!(
                "[PATHFINDING] {:?} -> {:?}: unreachable",
                self.grid.coord_of(from),
                self.grid.coord_of(to)
            ),
            PathOutcome::Aborted { .. } => {}
        }

        outcome
    }

    /// Tile path from `start` to `end`, excluding the start tile. Empty when
    /// there is no path.
    pub fn find_path(&mut self, start: Vec3, end: Vec3) -> Vec<TileCoord> {
        self.search_path(start, end)
            .into_path()
            .into_iter()
            .map(|index| self.grid.coord_of(index))
            .collect()
    }

    /// World positions of tile centres at their elevation.
    pub fn waypoints(&self, path: &[TileCoord]) -> Vec<Vec3> {
        path.iter()
            .filter_map(|&coord| self.grid.tile_at(coord))
            .map(|tile| Vec3::new(tile.pos_x, tile.pos_y, tile.pos_z))
            .collect()
    }
}
