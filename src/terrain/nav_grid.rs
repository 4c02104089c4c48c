use bevy::prelude::*;

use super::adjacency::{compute_neighbours, BoundaryRule, Neighborhood, NeighbourList};
use super::config::TerrainConfig;
use super::connectivity::{distinct_tile_sets, partition_tile_sets};
use super::elevation::ElevationSource;
use super::error::{TerrainError, TerrainResult};
use super::tile::{nav_cost, Tile, TileCoord, TileIndex};
use crate::profiling::profile;

/// What happened while the grid was built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildReport {
    /// The elevation source failed and the grid was built flat.
    pub elevation_degraded: bool,
    /// Why the elevation source failed, if it did.
    pub elevation_error: Option<String>,
    /// Number of distinct tile-set ids after partitioning.
    pub tile_set_count: usize,
    /// Tiles processed by the relaxation work queue.
    pub relaxation_steps: usize,
}

/// Navigation grid over a rectangular terrain.
///
/// Owns every tile in one row-major arena (`ix * node_count_z + iz`).
/// Dimensions are fixed at construction; tiles are read-only afterwards.
#[derive(Clone, Debug)]
pub struct NavGrid {
    node_count_x: usize,
    node_count_z: usize,
    grid_length: f32,
    grid_breadth: f32,
    origin: Vec2,
    neighborhood: Neighborhood,
    boundary: BoundaryRule,
    unpassable_threshold: f32,
    tiles: Vec<Tile>,
    report: BuildReport,
}

/// `floor(extent / spacing) + 1`, validated.
fn node_count(extent: f32, spacing: f32, axis: &str) -> TerrainResult<usize> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(TerrainError::invalid_grid(format!(
            "grid spacing along {} must be positive, got {}",
            axis, spacing
        )));
    }
    if !extent.is_finite() || extent < 0.0 {
        return Err(TerrainError::invalid_grid(format!(
            "map size along {} must be non-negative, got {}",
            axis, extent
        )));
    }
    let count = (extent / spacing).floor() + 1.0;
    if count > u32::MAX as f32 {
        return Err(TerrainError::invalid_grid(format!(
            "{} nodes along {} is too many",
            count, axis
        )));
    }
    Ok(count as usize)
}

impl NavGrid {
    /// Build the grid: sample elevation, wire adjacency, compute costs and
    /// partition walkable tiles into tile sets.
    ///
    /// Invalid geometry is rejected. An elevation source that cannot be
    /// sampled yields a flat grid (logged, recorded in [`BuildReport`])
    /// unless `config.strict_elevation` is set.
    #[profile(5)]
    pub fn build(config: &TerrainConfig, source: &dyn ElevationSource) -> TerrainResult<Self> {
        let node_count_x = node_count(config.map_length, config.grid_length, "x")?;
        let node_count_z = node_count(config.map_breadth, config.grid_breadth, "z")?;
        if node_count_x.checked_mul(node_count_z).map_or(true, |n| n > u32::MAX as usize) {
            return Err(TerrainError::invalid_grid(format!(
                "{}x{} tiles do not fit a u32 index",
                node_count_x, node_count_z
            )));
        }

        let mut grid = Self {
            node_count_x,
            node_count_z,
            grid_length: config.grid_length,
            grid_breadth: config.grid_breadth,
            origin: Vec2::new(config.origin_x, config.origin_z),
            neighborhood: config.neighborhood,
            boundary: config.boundary,
            unpassable_threshold: config.unpassable_threshold,
            tiles: Vec::with_capacity(node_count_x * node_count_z),
            report: BuildReport::default(),
        };

        let heights = match grid.sample_heights(source) {
            Ok(heights) => heights,
            Err(e) if config.strict_elevation => return Err(e),
            Err(e) => {
                error!("[TERRAIN] {} - building a flat {}x{} grid instead", e, node_count_x, node_count_z);
                grid.report.elevation_degraded = true;
                grid.report.elevation_error = Some(e.to_string());
                vec![0.0; node_count_x * node_count_z]
            }
        };

        for ix in 0..node_count_x {
            for iz in 0..node_count_z {
                let coord = TileCoord::new(ix, iz);
                let center = grid.cell_center(coord);
                grid.tiles.push(Tile {
                    coord,
                    pos_x: center.x,
                    pos_z: center.y,
                    pos_y: heights[ix * node_count_z + iz],
                    cost: 0.0,
                    walkable: true,
                    tile_set: (ix * node_count_z + iz) as u32,
                    neighbours: NeighbourList::new(),
                });
            }
        }

        grid.init_path_finding();

        Ok(grid)
    }

    /// Sample every tile at `(i / node_count_x, j / node_count_z)`.
    fn sample_heights(&self, source: &dyn ElevationSource) -> TerrainResult<Vec<f32>> {
        let mut heights = Vec::with_capacity(self.node_count_x * self.node_count_z);
        for ix in 0..self.node_count_x {
            for iz in 0..self.node_count_z {
                let u = ix as f32 / self.node_count_x as f32;
                let v = iz as f32 / self.node_count_z as f32;
                let height = source.sample(u, v)?;
                if !height.is_finite() {
                    return Err(TerrainError::elevation(format!(
                        "sample at ({}, {}) is {}",
                        u, v, height
                    )));
                }
                heights.push(height);
            }
        }
        Ok(heights)
    }

    /// Adjacency, cost and walkability for every tile, then the tile-set
    /// partition. Costs need every elevation, so this runs after sampling.
    fn init_path_finding(&mut self) {
        for i in 0..self.tiles.len() {
            let neighbours = compute_neighbours(
                self.tiles[i].coord,
                self.node_count_x,
                self.node_count_z,
                self.neighborhood,
                self.boundary,
            );
            let cost = nav_cost(neighbours.iter().map(|n| self.tiles[n.as_usize()].pos_y));

            let tile = &mut self.tiles[i];
            tile.cost = cost;
            tile.walkable = cost < self.unpassable_threshold;
            tile.neighbours = neighbours;
        }

        self.report.relaxation_steps = partition_tile_sets(&mut self.tiles);

        let tile_sets = distinct_tile_sets(&self.tiles);
        self.report.tile_set_count = tile_sets.len();

        let unwalkable = self.tiles.iter().filter(|t| !t.walkable).count();
        info!(
            "[TERRAIN] Built {}x{} nav grid: {} unwalkable tiles, {} tile sets after {} relaxation steps",
            self.node_count_x,
            self.node_count_z,
            unwalkable,
            tile_sets.len(),
            self.report.relaxation_steps
        );
        debug!("[TERRAIN] Available tile sets: {:?}", tile_sets);
    }

    pub fn node_count_x(&self) -> usize {
        self.node_count_x
    }

    pub fn node_count_z(&self) -> usize {
        self.node_count_z
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn grid_length(&self) -> f32 {
        self.grid_length
    }

    pub fn grid_breadth(&self) -> f32 {
        self.grid_breadth
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }

    pub fn boundary(&self) -> BoundaryRule {
        self.boundary
    }

    pub fn unpassable_threshold(&self) -> f32 {
        self.unpassable_threshold
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// World-space (x, z) centre of a cell.
    pub fn cell_center(&self, coord: TileCoord) -> Vec2 {
        Vec2::new(
            self.origin.x + coord.ix as f32 * self.grid_length + self.grid_length / 2.0,
            self.origin.y + coord.iz as f32 * self.grid_breadth + self.grid_breadth / 2.0,
        )
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.ix < self.node_count_x && coord.iz < self.node_count_z
    }

    pub fn index_of(&self, coord: TileCoord) -> Option<TileIndex> {
        self.contains(coord)
            .then(|| TileIndex((coord.ix * self.node_count_z + coord.iz) as u32))
    }

    pub fn coord_of(&self, index: TileIndex) -> TileCoord {
        let i = index.as_usize();
        TileCoord::new(i / self.node_count_z, i % self.node_count_z)
    }

    pub fn tile(&self, index: TileIndex) -> &Tile {
        &self.tiles[index.as_usize()]
    }

    pub fn tile_at(&self, coord: TileCoord) -> Option<&Tile> {
        self.index_of(coord).map(|i| self.tile(i))
    }

    /// Distinct tile-set ids, ascending.
    pub fn all_tile_set_ids(&self) -> Vec<u32> {
        distinct_tile_sets(&self.tiles)
    }
}
