use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::tile::{TileCoord, TileIndex};

/// Which neighbour slots a tile gets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Neighborhood {
    /// Cardinals plus diagonals.
    #[default]
    Eight,
    /// Cardinals only.
    Four,
}

/// How the low grid edges (`iz == 0`, `ix == 0`) are tested.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryRule {
    /// A neighbour exists whenever its index is inside the grid. Adjacency is
    /// symmetric.
    #[default]
    Clamped,
    /// The `index - 1 > 0` test of earlier terrain builds: row/column 1 never
    /// links back to row/column 0, so adjacency is one-sided there.
    Legacy,
}

impl BoundaryRule {
    #[inline]
    fn has_lower(self, index: usize) -> bool {
        match self {
            BoundaryRule::Clamped => index > 0,
            BoundaryRule::Legacy => index > 1,
        }
    }
}

pub type NeighbourList = SmallVec<[TileIndex; 8]>;

/// Neighbours of `coord` in slot order: East, West, South, South-East,
/// South-West, North, North-East, North-West. Diagonals are only tried when
/// their South/North row exists; `Four` skips them entirely.
pub fn compute_neighbours(
    coord: TileCoord,
    node_count_x: usize,
    node_count_z: usize,
    neighborhood: Neighborhood,
    boundary: BoundaryRule,
) -> NeighbourList {
    let TileCoord { ix, iz } = coord;
    let index = |x: usize, z: usize| TileIndex((x * node_count_z + z) as u32);
    let diagonals = neighborhood == Neighborhood::Eight;

    let has_east = iz + 1 < node_count_z;
    let has_west = boundary.has_lower(iz);

    let mut neighbours = NeighbourList::new();

    if has_east {
        neighbours.push(index(ix, iz + 1));
    }
    if has_west {
        neighbours.push(index(ix, iz - 1));
    }

    if ix + 1 < node_count_x {
        neighbours.push(index(ix + 1, iz));
        if diagonals && has_east {
            neighbours.push(index(ix + 1, iz + 1));
        }
        if diagonals && has_west {
            neighbours.push(index(ix + 1, iz - 1));
        }
    }

    if boundary.has_lower(ix) {
        neighbours.push(index(ix - 1, iz));
        if diagonals && has_east {
            neighbours.push(index(ix - 1, iz + 1));
        }
        if diagonals && has_west {
            neighbours.push(index(ix - 1, iz - 1));
        }
    }

    neighbours
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(ix: usize, iz: usize, nz: usize) -> TileIndex {
        TileIndex((ix * nz + iz) as u32)
    }

    #[test]
    fn test_interior_slot_order() {
        let n = compute_neighbours(TileCoord::new(1, 1), 3, 3, Neighborhood::Eight, BoundaryRule::Clamped);
        let expected = [
            idx(1, 2, 3), // East
            idx(1, 0, 3), // West
            idx(2, 1, 3), // South
            idx(2, 2, 3), // South-East
            idx(2, 0, 3), // South-West
            idx(0, 1, 3), // North
            idx(0, 2, 3), // North-East
            idx(0, 0, 3), // North-West
        ];
        assert_eq!(n.as_slice(), &expected);
    }

    #[test]
    fn test_corners_are_clamped() {
        let origin = compute_neighbours(TileCoord::new(0, 0), 3, 3, Neighborhood::Eight, BoundaryRule::Clamped);
        assert_eq!(origin.as_slice(), &[idx(0, 1, 3), idx(1, 0, 3), idx(1, 1, 3)]);

        let far = compute_neighbours(TileCoord::new(2, 2), 3, 3, Neighborhood::Eight, BoundaryRule::Clamped);
        assert_eq!(far.as_slice(), &[idx(2, 1, 3), idx(1, 2, 3), idx(1, 1, 3)]);
    }

    #[test]
    fn test_four_neighbourhood_skips_diagonals() {
        let n = compute_neighbours(TileCoord::new(1, 1), 3, 3, Neighborhood::Four, BoundaryRule::Clamped);
        assert_eq!(n.as_slice(), &[idx(1, 2, 3), idx(1, 0, 3), idx(2, 1, 3), idx(0, 1, 3)]);
    }

    #[test]
    fn test_legacy_rule_drops_links_to_index_zero() {
        let legacy = compute_neighbours(TileCoord::new(1, 1), 3, 3, Neighborhood::Eight, BoundaryRule::Legacy);
        // No West, no North: only East, South, South-East remain
        assert_eq!(legacy.as_slice(), &[idx(1, 2, 3), idx(2, 1, 3), idx(2, 2, 3)]);

        // Row 0 still links forward to row 1, so the relation is one-sided
        let origin = compute_neighbours(TileCoord::new(0, 0), 3, 3, Neighborhood::Eight, BoundaryRule::Legacy);
        assert!(origin.contains(&idx(1, 1, 3)));
    }

    #[test]
    fn test_single_tile_has_no_neighbours() {
        let n = compute_neighbours(TileCoord::new(0, 0), 1, 1, Neighborhood::Eight, BoundaryRule::Clamped);
        assert!(n.is_empty());
    }
}
