use serde::{Deserialize, Serialize};

use super::adjacency::NeighbourList;

/// Grid indices of a tile.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TileCoord {
    pub ix: usize,
    pub iz: usize,
}

impl TileCoord {
    pub const fn new(ix: usize, iz: usize) -> Self {
        Self { ix, iz }
    }
}

impl From<(usize, usize)> for TileCoord {
    fn from((ix, iz): (usize, usize)) -> Self {
        Self { ix, iz }
    }
}

impl From<TileCoord> for (usize, usize) {
    fn from(coord: TileCoord) -> Self {
        (coord.ix, coord.iz)
    }
}

/// Row-major position of a tile in the grid's arena (`ix * node_count_z + iz`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TileIndex(pub u32);

impl TileIndex {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Cost at or above which a tile is unwalkable unless configured otherwise.
pub const UNPASSABLE_NAV_COST_LIMIT: f32 = 1.0;

/// Upper clamp applied to the neighbour elevation variance.
pub const MAX_NAV_VARIANCE: f32 = 0.9;

/// Flat cost added to every tile.
pub const BASE_NAV_COST: f32 = 0.1;

/// One cell of the navigation grid.
///
/// Tiles only carry build-time data. Search bookkeeping (g/f costs, open and
/// closed flags, parents) lives in the path finder's scratch space.
#[derive(Clone, Debug)]
pub struct Tile {
    pub coord: TileCoord,
    /// Cell centre in world space.
    pub pos_x: f32,
    pub pos_z: f32,
    /// Normalized elevation.
    pub pos_y: f32,
    /// Cost of leaving this tile towards any neighbour.
    pub cost: f32,
    pub walkable: bool,
    /// Connectivity region id.
    pub tile_set: u32,
    pub(super) neighbours: NeighbourList,
}

impl Tile {
    pub fn neighbours(&self) -> &[TileIndex] {
        &self.neighbours
    }

    pub fn neighbour_count(&self) -> usize {
        self.neighbours.len()
    }
}

/// Traversal cost from the elevations of a tile's neighbours:
/// `min(mean(h²), 0.9) + 0.1`. No neighbours means a variance of zero.
pub fn nav_cost(neighbour_heights: impl IntoIterator<Item = f32>) -> f32 {
    let (sum, count) = neighbour_heights
        .into_iter()
        .fold((0.0f32, 0usize), |(sum, count), h| (sum + h * h, count + 1));

    let variance = if count == 0 { 0.0 } else { sum / count as f32 };
    variance.min(MAX_NAV_VARIANCE) + BASE_NAV_COST
}
