//! Data for terrain debug overlays. Rendering is left to the host app.

use bevy::prelude::*;
use fixedbitset::FixedBitSet;

use super::nav_grid::NavGrid;
use super::tile::TileIndex;

/// Tiles a renderer should draw highlighted, e.g. the last searched path.
#[derive(Resource, Default, Debug, Clone)]
pub struct TerrainHighlights {
    tiles: FixedBitSet,
    dirty: bool,
}

impl TerrainHighlights {
    /// Grow to cover `tile_count` tiles. Existing highlights are kept.
    pub fn ensure_size(&mut self, tile_count: usize) {
        if self.tiles.len() < tile_count {
            self.tiles.grow(tile_count);
        }
    }

    pub fn highlight_node(&mut self, index: TileIndex) {
        self.ensure_size(index.as_usize() + 1);
        if !self.tiles.put(index.as_usize()) {
            self.dirty = true;
        }
    }

    pub fn clear(&mut self) {
        if self.tiles.count_ones(..) > 0 {
            self.dirty = true;
        }
        self.tiles.clear();
    }

    pub fn is_highlighted(&self, index: TileIndex) -> bool {
        self.tiles.contains(index.as_usize())
    }

    pub fn highlighted(&self) -> impl Iterator<Item = TileIndex> + '_ {
        self.tiles.ones().map(|i| TileIndex(i as u32))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// Per-tile shade in `[0, 1)`: position of the tile's set among all set ids,
/// divided by the number of sets.
pub fn tile_set_shades(grid: &NavGrid) -> Vec<f32> {
    let ids = grid.all_tile_set_ids();
    let count = ids.len() as f32;
    grid.tiles()
        .iter()
        .map(|tile| {
            let rank = ids.binary_search(&tile.tile_set).unwrap_or(0);
            rank as f32 / count
        })
        .collect()
}
