//! Tile-set partitioning: which walkable tiles can reach each other.
//!
//! Every tile starts in its own set, numbered by its arena index. Walkable
//! tiles then repeatedly adopt the smallest set id among their walkable
//! neighbours until nothing changes, so each connected walkable region ends
//! up labelled with the smallest index it contains. Unwalkable tiles keep
//! their initial id.
//!
//! Instead of sweeping the whole grid until a pass makes no change, a work
//! queue revisits only tiles whose neighbour just dropped its id. The fixed
//! point is the same. Ids only ever decrease, so the queue drains.
//!
//! Path queries use the result as a pre-filter: tiles in different sets are
//! never connected, so the search can be skipped.

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::tile::{Tile, TileIndex};

/// Relax tile-set ids to their fixed point. Returns the number of tiles
/// popped from the work queue.
pub(crate) fn partition_tile_sets(tiles: &mut [Tile]) -> usize {
    // A tile's id depends on the tiles it lists, so when a tile changes the
    // tiles listing *it* must be revisited. Under the legacy boundary rule
    // those lists are not symmetric.
    let mut listed_by: Vec<SmallVec<[TileIndex; 8]>> = vec![SmallVec::new(); tiles.len()];
    for (i, tile) in tiles.iter().enumerate() {
        for &n in tile.neighbours() {
            listed_by[n.as_usize()].push(TileIndex(i as u32));
        }
    }

    let mut queue: VecDeque<usize> = (0..tiles.len()).filter(|&i| tiles[i].walkable).collect();
    let mut queued = FixedBitSet::with_capacity(tiles.len());
    for &i in &queue {
        queued.insert(i);
    }

    let mut steps = 0;
    while let Some(current) = queue.pop_front() {
        queued.set(current, false);
        steps += 1;

        let smallest = tiles[current]
            .neighbours()
            .iter()
            .map(|n| &tiles[n.as_usize()])
            .filter(|n| n.walkable)
            .map(|n| n.tile_set)
            .min();

        let Some(smallest) = smallest else {
            continue;
        };
        if smallest >= tiles[current].tile_set {
            continue;
        }
        tiles[current].tile_set = smallest;

        for dependent in &listed_by[current] {
            let d = dependent.as_usize();
            if tiles[d].walkable && !queued.contains(d) {
                queued.insert(d);
                queue.push_back(d);
            }
        }
    }

    steps
}

/// Distinct tile-set ids present in the grid, ascending.
pub(crate) fn distinct_tile_sets(tiles: &[Tile]) -> Vec<u32> {
    let unique: FxHashSet<u32> = tiles.iter().map(|t| t.tile_set).collect();
    let mut ids: Vec<u32> = unique.into_iter().collect();
    ids.sort_unstable();
    ids
}
