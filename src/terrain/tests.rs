/// Scenario tests for terrain navigation
///
/// Small hand-traced grids whose paths and tile sets are known exactly, plus
/// randomized checks that paths are well formed and searches are repeatable.

use super::*;

fn flat_config(length: f32, breadth: f32) -> TerrainConfig {
    TerrainConfig {
        map_length: length,
        map_breadth: breadth,
        grid_length: 1.0,
        grid_breadth: 1.0,
        ..Default::default()
    }
}

fn flat_nav(config: &TerrainConfig) -> TerrainNav {
    TerrainNav::new(config, &|_: f32, _: f32| 0.0_f32).unwrap()
}

fn centre(ix: usize, iz: usize) -> Vec3 {
    Vec3::new(ix as f32 + 0.5, 0.0, iz as f32 + 0.5)
}

fn coords(path: &[(usize, usize)]) -> Vec<TileCoord> {
    path.iter().map(|&c| c.into()).collect()
}

/// 7x3 grid with ridges in rows 2 and 4: row 3 sits between them and costs
/// too much to cross at threshold 0.8.
fn barrier_nav() -> TerrainNav {
    let config = TerrainConfig {
        map_length: 6.0,
        map_breadth: 2.0,
        grid_length: 1.0,
        grid_breadth: 1.0,
        unpassable_threshold: 0.8,
        ..Default::default()
    };
    let source = ElevationGrid::from_fn(7, 3, |x, _| if x == 2 || x == 4 { 1.0 } else { 0.0 });
    TerrainNav::new(&config, &source).unwrap()
}

/// Random heights so that roughly half the tiles are walkable.
fn random_grid(rng: &mut fastrand::Rng, boundary: BoundaryRule) -> NavGrid {
    let nx = rng.usize(2..12);
    let nz = rng.usize(2..12);
    let heights: Vec<f32> = (0..nx * nz).map(|_| rng.f32()).collect();
    let config = TerrainConfig {
        map_length: (nx - 1) as f32,
        map_breadth: (nz - 1) as f32,
        grid_length: 1.0,
        grid_breadth: 1.0,
        unpassable_threshold: 0.45,
        boundary,
        ..Default::default()
    };
    NavGrid::build(&config, &ElevationGrid::from_raw(heights, nx, nz)).unwrap()
}

fn assert_valid_path(grid: &NavGrid, start: TileIndex, goal: TileIndex, path: &[TileIndex]) {
    assert!(!path.contains(&start), "path includes its start tile");
    if start != goal {
        assert_eq!(path.last(), Some(&goal), "path does not end at the goal");
    }
    let mut previous = start;
    for &step in path {
        assert!(
            grid.tile(previous).neighbours().contains(&step),
            "{:?} -> {:?} is not a neighbour step",
            grid.coord_of(previous),
            grid.coord_of(step)
        );
        assert!(grid.tile(step).walkable, "path crosses unwalkable {:?}", grid.coord_of(step));
        previous = step;
    }
    // No tile could have been skipped by stepping straight to the one after
    for window in path.windows(3) {
        assert!(
            !grid.tile(window[0]).neighbours().contains(&window[2]),
            "shortcut from {:?} to {:?}",
            grid.coord_of(window[0]),
            grid.coord_of(window[2])
        );
    }
}

#[test]
fn test_diagonal_scenario_with_four_neighbours() {
    let mut config = flat_config(2.0, 2.0);
    config.neighborhood = Neighborhood::Four;
    let mut nav = flat_nav(&config);

    let path = nav.find_path(centre(0, 0), centre(2, 2));
    assert_eq!(path, coords(&[(0, 1), (0, 2), (1, 2), (2, 2)]));
}

#[test]
fn test_diagonal_scenario_with_eight_neighbours() {
    let mut nav = flat_nav(&flat_config(2.0, 2.0));

    let path = nav.find_path(centre(0, 0), centre(2, 2));
    assert_eq!(path, coords(&[(1, 1), (2, 2)]));
    assert_eq!(
        nav.waypoints(&path),
        vec![Vec3::new(1.5, 0.0, 1.5), Vec3::new(2.5, 0.0, 2.5)]
    );
}

#[test]
fn test_start_equals_goal() {
    let mut nav = flat_nav(&flat_config(2.0, 2.0));
    assert_eq!(nav.search_path(centre(1, 1), centre(1, 1)), PathOutcome::Found(Vec::new()));
    assert!(nav.find_path(centre(2, 0), Vec3::new(2.9, 5.0, 0.1)).is_empty());
}

#[test]
fn test_barrier_splits_tile_sets() {
    let mut nav = barrier_nav();
    let grid = nav.grid();

    for iz in 0..3 {
        assert!(!grid.tile_at(TileCoord::new(3, iz)).unwrap().walkable);
    }
    assert!(grid.tiles().iter().filter(|t| t.coord.ix != 3).all(|t| t.walkable));

    assert_eq!(nav.tile_set_at(0.5, 1.5), 0);
    assert_eq!(nav.tile_set_at(6.5, 1.5), 12);
    assert_eq!(nav.all_tile_set_ids(), vec![0, 9, 10, 11, 12]);

    assert!(nav.find_path(centre(0, 1), centre(6, 1)).is_empty());
    assert_eq!(nav.search_path(centre(6, 0), centre(0, 2)), PathOutcome::Unreachable);

    // Each side is still navigable on its own
    let path = nav.find_path(centre(0, 0), centre(2, 2));
    assert_eq!(path.last(), Some(&TileCoord::new(2, 2)));
}

#[test]
fn test_height_lookup_floors_between_centres() {
    let source = ElevationGrid::from_fn(3, 3, |x, _| x as f32 * 0.25);
    let nav = TerrainNav::new(&flat_config(2.0, 2.0), &source).unwrap();

    // Midpoint between the centres of rows 0 and 1
    assert_eq!(nav.height_at(1.0, 0.5), 0.25);
    assert_eq!(nav.height_at(0.999, 0.5), 0.0);
    assert_eq!(nav.height_at(-10.0, 0.5), 0.0);
    assert_eq!(nav.height_at(10.0, 0.5), 0.5);
}

#[test]
fn test_saturated_terrain_is_unwalkable_at_default_threshold() {
    let mut nav = TerrainNav::new(&flat_config(2.0, 2.0), &|_: f32, _: f32| 1.0_f32).unwrap();
    let grid = nav.grid();

    for (i, tile) in grid.tiles().iter().enumerate() {
        assert_eq!(tile.cost, 1.0);
        assert!(!tile.walkable, "{:?} should be unwalkable", tile.coord);
        assert_eq!(tile.tile_set, i as u32);
    }
    assert_eq!(nav.all_tile_set_ids(), (0..9).collect::<Vec<u32>>());

    assert!(nav.find_path(centre(0, 0), centre(2, 2)).is_empty());
    assert!(nav.find_path(centre(1, 1), centre(1, 2)).is_empty());
}

#[test]
fn test_legacy_boundary_loses_links_to_row_zero() {
    let mut config = flat_config(2.0, 2.0);
    config.boundary = BoundaryRule::Legacy;
    let mut nav = flat_nav(&config);

    // Row/column 1 never lists row/column 0, so the corner is cut off
    assert_eq!(nav.all_tile_set_ids(), vec![0, 1, 3, 4]);
    assert_ne!(nav.tile_set_at(0.5, 0.5), nav.tile_set_at(2.5, 2.5));
    assert!(nav.find_path(centre(0, 0), centre(2, 2)).is_empty());

    // Inside the interior block paths still work
    assert_eq!(nav.find_path(centre(1, 1), centre(2, 2)), coords(&[(2, 2)]));
}

#[test]
fn test_prefilter_leaves_scratch_untouched() {
    let nav = barrier_nav();
    let grid = nav.grid();
    let mut finder = PathFinder::new();

    let west = grid.index_of(TileCoord::new(0, 0)).unwrap();
    let west_goal = grid.index_of(TileCoord::new(2, 2)).unwrap();
    let east = grid.index_of(TileCoord::new(6, 1)).unwrap();

    assert!(finder.search(grid, west, west_goal).is_found());
    let before = format!("{:?}", finder.scratch());

    assert_eq!(finder.search(grid, west, east), PathOutcome::Unreachable);
    assert!(!finder.last_stats().reset);
    assert_eq!(finder.last_stats().expanded, 0);
    assert_eq!(format!("{:?}", finder.scratch()), before);
}

#[test]
fn test_corridor_paths_take_no_detour() {
    let mut nav = flat_nav(&flat_config(0.0, 9.0));
    for (from, to) in [(0usize, 9usize), (7, 2), (4, 5)] {
        let path = nav.find_path(centre(0, from), centre(0, to));
        assert_eq!(path.len(), from.abs_diff(to));
    }
}

#[test]
fn test_random_paths_are_valid() {
    let mut rng = fastrand::Rng::with_seed(42);
    for _ in 0..40 {
        let grid = random_grid(&mut rng, BoundaryRule::Clamped);
        let mut finder = PathFinder::new();

        for _ in 0..10 {
            let start = TileIndex(rng.u32(0..grid.tile_count() as u32));
            let goal = TileIndex(rng.u32(0..grid.tile_count() as u32));
            let same_set = grid.tile(start).tile_set == grid.tile(goal).tile_set;

            match finder.search(&grid, start, goal) {
                PathOutcome::Found(path) => {
                    assert!(same_set);
                    assert_valid_path(&grid, start, goal, &path);
                }
                PathOutcome::Unreachable => assert!(!same_set, "connected tiles reported unreachable"),
                PathOutcome::Aborted { .. } => panic!("unbounded search aborted"),
            }
        }
    }
}

#[test]
fn test_search_is_deterministic() {
    let mut rng = fastrand::Rng::with_seed(3);
    let grid = random_grid(&mut rng, BoundaryRule::Clamped);
    let queries: Vec<(TileIndex, TileIndex)> = (0..20)
        .map(|_| {
            (
                TileIndex(rng.u32(0..grid.tile_count() as u32)),
                TileIndex(rng.u32(0..grid.tile_count() as u32)),
            )
        })
        .collect();

    let mut reused = PathFinder::new();
    let first: Vec<PathOutcome> = queries.iter().map(|&(s, g)| reused.search(&grid, s, g)).collect();
    let second: Vec<PathOutcome> = queries.iter().map(|&(s, g)| reused.search(&grid, s, g)).collect();
    assert_eq!(first, second);

    // A reused finder answers exactly like a fresh one
    for (&(s, g), expected) in queries.iter().zip(&first) {
        assert_eq!(&PathFinder::new().search(&grid, s, g), expected);
    }
}

#[test]
fn test_expansion_budget_from_config() {
    let mut config = flat_config(20.0, 20.0);
    config.max_search_expansions = Some(5);
    let mut nav = flat_nav(&config);
    assert_eq!(PathFinder::with_max_expansions(config.max_search_expansions).max_expansions(), Some(5));

    assert_eq!(nav.search_path(centre(0, 0), centre(20, 20)), PathOutcome::Aborted { expanded: 5 });
    assert!(nav.find_path(centre(0, 0), centre(20, 20)).is_empty());
    assert_eq!(nav.last_search_stats().expanded, 5);

    // Neighbouring tiles fit in the budget
    assert_eq!(nav.find_path(centre(0, 0), centre(0, 1)), coords(&[(0, 1)]));
}

#[test]
fn test_tile_set_shades_rank_regions() {
    let nav = barrier_nav();
    let shades = tile_set_shades(nav.grid());
    let grid = nav.grid();

    let shade = |ix: usize, iz: usize| shades[grid.index_of(TileCoord::new(ix, iz)).unwrap().as_usize()];
    assert_eq!(shade(0, 0), 0.0);
    assert_eq!(shade(3, 0), 1.0 / 5.0);
    assert_eq!(shade(3, 2), 3.0 / 5.0);
    assert_eq!(shade(6, 2), 4.0 / 5.0);
}
