// A* search over a NavGrid.
//
// Search bookkeeping lives in `SearchScratch`, indexed by `TileIndex`, so
// tiles stay read-only and several path finders can search one grid. The
// scratch is reset at the start of every search that passes the tile-set
// pre-filter.
//
// Open-set order is part of the contract: among open tiles with equal f the
// one that entered the open set first wins. A tile enters the open set at
// most once, so it keeps its entry sequence number when its f improves and
// the heap breaks ties on that number.

use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::nav_grid::NavGrid;
use super::tile::{Tile, TileIndex};
use crate::profiling::profile;

/// Result of a bounded search.
#[derive(Clone, Debug, PartialEq)]
pub enum PathOutcome {
    /// Tiles from the start's successor up to and including the goal. Empty
    /// when start and goal are the same tile.
    Found(Vec<TileIndex>),
    /// Start and goal are not connected.
    Unreachable,
    /// The expansion budget ran out before the goal was reached.
    Aborted { expanded: usize },
}

impl PathOutcome {
    /// The path, or an empty vector for every other outcome.
    pub fn into_path(self) -> Vec<TileIndex> {
        match self {
            PathOutcome::Found(path) => path,
            PathOutcome::Unreachable | PathOutcome::Aborted { .. } => Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PathOutcome::Found(_))
    }
}

/// Counters for the most recent search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Tiles popped from the open set and expanded.
    pub expanded: usize,
    /// Whether the scratch space was reset (false when the pre-filter
    /// answered without searching).
    pub reset: bool,
}

/// Manhattan distance between tile centres in world units.
pub(super) fn heuristic(a: &Tile, b: &Tile) -> f32 {
    (a.pos_x - b.pos_x).abs() + (a.pos_z - b.pos_z).abs()
}

/// Per-search state, one slot per tile.
#[derive(Clone, Debug, Default)]
pub struct SearchScratch {
    g_cost: Vec<f32>,
    f_cost: Vec<f32>,
    parent: Vec<Option<TileIndex>>,
    open_seq: Vec<u32>,
    open: FixedBitSet,
    closed: FixedBitSet,
}

impl SearchScratch {
    fn reset(&mut self, tile_count: usize) {
        self.g_cost.clear();
        self.g_cost.resize(tile_count, f32::INFINITY);
        self.f_cost.clear();
        self.f_cost.resize(tile_count, f32::INFINITY);
        self.parent.clear();
        self.parent.resize(tile_count, None);
        self.open_seq.clear();
        self.open_seq.resize(tile_count, 0);
        self.open.clear();
        self.open.grow(tile_count);
        self.closed.clear();
        self.closed.grow(tile_count);
    }

    pub fn g_cost(&self, tile: TileIndex) -> Option<f32> {
        self.g_cost.get(tile.as_usize()).copied()
    }

    pub fn f_cost(&self, tile: TileIndex) -> Option<f32> {
        self.f_cost.get(tile.as_usize()).copied()
    }

    pub fn parent(&self, tile: TileIndex) -> Option<TileIndex> {
        self.parent.get(tile.as_usize()).copied().flatten()
    }

    pub fn is_open(&self, tile: TileIndex) -> bool {
        self.open.contains(tile.as_usize())
    }

    pub fn is_closed(&self, tile: TileIndex) -> bool {
        self.closed.contains(tile.as_usize())
    }
}

/// Entry in the open set (min-heap via reversed ordering).
struct OpenEntry {
    tile: TileIndex,
    f_cost: f32,
    seq: u32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: smallest f is "greatest", then earliest entry
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A* path finder with reusable scratch space.
#[derive(Clone, Debug, Default)]
pub struct PathFinder {
    scratch: SearchScratch,
    max_expansions: Option<usize>,
    last_stats: SearchStats,
}

impl PathFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_expansions(max_expansions: Option<usize>) -> Self {
        Self {
            max_expansions,
            ..Self::default()
        }
    }

    pub fn max_expansions(&self) -> Option<usize> {
        self.max_expansions
    }

    pub fn last_stats(&self) -> SearchStats {
        self.last_stats
    }

    /// Bookkeeping left behind by the last search.
    pub fn scratch(&self) -> &SearchScratch {
        &self.scratch
    }

    /// Path from `start` to `goal`, excluding `start`. Empty when the goal
    /// is unreachable, the search was aborted, or `start == goal`.
    pub fn find_path(&mut self, grid: &NavGrid, start: TileIndex, goal: TileIndex) -> Vec<TileIndex> {
        self.search(grid, start, goal).into_path()
    }

    #[profile]
    pub fn search(&mut self, grid: &NavGrid, start: TileIndex, goal: TileIndex) -> PathOutcome {
        self.last_stats = SearchStats::default();

        let start_tile = grid.tile(start);
        let goal_tile = grid.tile(goal);

        // Different tile sets are never connected
        if start_tile.tile_set != goal_tile.tile_set {
            return PathOutcome::Unreachable;
        }

        let n = grid.tile_count();
        self.scratch.reset(n);
        self.last_stats.reset = true;

        let scratch = &mut self.scratch;
        let mut open_set = BinaryHeap::new();
        let mut next_seq: u32 = 0;

        let s = start.as_usize();
        scratch.g_cost[s] = 0.0;
        scratch.f_cost[s] = heuristic(start_tile, goal_tile);
        scratch.open.insert(s);
        scratch.open_seq[s] = next_seq;
        next_seq += 1;
        open_set.push(OpenEntry { tile: start, f_cost: scratch.f_cost[s], seq: 0 });

        let mut expanded = 0;

        while let Some(entry) = open_set.pop() {
            let ci = entry.tile.as_usize();

            // Skip entries superseded by a cheaper f for the same tile
            if !scratch.open.contains(ci) || entry.f_cost.to_bits() != scratch.f_cost[ci].to_bits() {
                continue;
            }
            scratch.open.set(ci, false);

            if let Some(limit) = self.max_expansions {
                if expanded >= limit {
                    self.last_stats.expanded = expanded;
                    warn!(
                        "[PATHFINDING] Search {:?} -> {:?} aborted after {} expansions",
                        start_tile.coord, goal_tile.coord, expanded
                    );
                    return PathOutcome::Aborted { expanded };
                }
            }
            expanded += 1;

            if entry.tile == goal {
                self.last_stats.expanded = expanded;
                return match reconstruct_path(scratch, start, goal, n) {
                    Some(path) => PathOutcome::Found(path),
                    None => {
                        error!(
                            "[PATHFINDING] Parent chain from {:?} never reached {:?}",
                            goal_tile.coord, start_tile.coord
                        );
                        PathOutcome::Unreachable
                    }
                };
            }

            let current = grid.tile(entry.tile);
            let new_g = scratch.g_cost[ci] + current.cost;

            for &neighbour in current.neighbours() {
                let ni = neighbour.as_usize();
                let neighbour_tile = grid.tile(neighbour);
                if !neighbour_tile.walkable {
                    continue;
                }

                let new_f = new_g + heuristic(neighbour_tile, goal_tile);
                let was_open = scratch.open.contains(ni);

                if was_open || scratch.closed.contains(ni) {
                    if new_f < scratch.f_cost[ni] {
                        scratch.g_cost[ni] = new_g;
                        scratch.f_cost[ni] = new_f;
                        scratch.parent[ni] = Some(entry.tile);
                        if was_open {
                            open_set.push(OpenEntry { tile: neighbour, f_cost: new_f, seq: scratch.open_seq[ni] });
                        }
                    }
                } else {
                    scratch.g_cost[ni] = new_g;
                    scratch.f_cost[ni] = new_f;
                    scratch.parent[ni] = Some(entry.tile);
                    scratch.open.insert(ni);
                    scratch.open_seq[ni] = next_seq;
                    open_set.push(OpenEntry { tile: neighbour, f_cost: new_f, seq: next_seq });
                    next_seq += 1;
                }
            }

            scratch.closed.insert(ci);
        }

        self.last_stats.expanded = expanded;
        PathOutcome::Unreachable
    }
}

/// Follow parents from `goal` back to `start` and reverse. `None` if the
/// chain does not reach `start` within `tile_count` steps.
fn reconstruct_path(
    scratch: &SearchScratch,
    start: TileIndex,
    goal: TileIndex,
    tile_count: usize,
) -> Option<Vec<TileIndex>> {
    let mut path = Vec::new();
    let mut current = goal;

    while current != start {
        if path.len() >= tile_count {
            return None;
        }
        path.push(current);
        current = scratch.parent[current.as_usize()]?;
    }

    path.reverse();
    Some(path)
}
