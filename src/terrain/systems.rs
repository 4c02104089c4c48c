use bevy::prelude::*;

use super::astar::PathOutcome;
use super::debug::TerrainHighlights;
use super::facade::TerrainNav;
use super::tile::TileCoord;

/// Ask for a terrain path for `entity` between two world positions.
#[derive(Message, Debug, Clone)]
pub struct TerrainPathRequest {
    pub entity: Entity,
    pub start: Vec3,
    pub goal: Vec3,
}

/// Path attached to an entity after a successful request.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct TerrainPath {
    /// Tiles after the start tile, ending at the goal tile.
    pub nodes: Vec<TileCoord>,
    /// World-space tile centres matching `nodes`.
    pub waypoints: Vec<Vec3>,
    pub current_index: usize,
}

impl TerrainPath {
    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.waypoints.get(self.current_index).copied()
    }

    pub fn is_finished(&self) -> bool {
        self.current_index >= self.waypoints.len()
    }
}

pub(super) fn process_terrain_path_requests(
    mut path_requests: MessageReader<TerrainPathRequest>,
    mut commands: Commands,
    mut nav: ResMut<TerrainNav>,
    mut highlights: ResMut<TerrainHighlights>,
) {
    if path_requests.is_empty() {
        return;
    }

    let start_time = std::time::Instant::now();
    let request_count = path_requests.len();
    let highlight = nav.config().debug_highlight_paths;

    if highlight {
        highlights.clear();
        highlights.ensure_size(nav.grid().tile_count());
    }

    for request in path_requests.read() {
        let Ok(mut entity) = commands.get_entity(request.entity) else {
            warn!("[PATHFINDING] Path request for missing entity {:?}", request.entity);
            continue;
        };

        match nav.search_path(request.start, request.goal) {
            PathOutcome::Found(path) => {
                let grid = nav.grid();
                let nodes: Vec<TileCoord> = path.iter().map(|&i| grid.coord_of(i)).collect();
                let waypoints = nav.waypoints(&nodes);

                if highlight {
                    let (sx, sz) = nav.world_to_indices(request.start.x, request.start.z);
                    if let Some(start) = grid.index_of(TileCoord::new(sx, sz)) {
                        highlights.highlight_node(start);
                    }
                    for &index in &path {
                        highlights.highlight_node(index);
                    }
                }

                entity.insert(TerrainPath { nodes, waypoints, current_index: 0 });
            }
            PathOutcome::Unreachable => {
                info!(
                    "[PATHFINDING] No terrain path for {:?} from {:?} to {:?}",
                    request.entity, request.start, request.goal
                );
                entity.remove::<TerrainPath>();
            }
            PathOutcome::Aborted { expanded } => {
                warn!(
                    "[PATHFINDING] Gave up on {:?} after {} expansions",
                    request.entity, expanded
                );
                entity.remove::<TerrainPath>();
            }
        }
    }

    let total_duration = start_time.elapsed();
    if total_duration.as_millis() > 100 {
        warn!("[PATHFINDING] Slow batch processing: {:?} for {} requests", total_duration, request_count);
    }
}
