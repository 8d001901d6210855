//! Spatial partitioning for neighbor queries.
//!
//! Provides O(1) cell lookup and O(k) neighbor queries where k is the number
//! of entities in nearby cells, rather than O(n) for brute force.

use bevy_ecs::prelude::*;
use glam::Vec2;
use std::collections::HashMap;

use crate::components::{Active, EntityId, Faction, Health, Position};

/// Grid-based spatial partitioning structure.
///
/// Divides the arena into cells and tracks which actors are in each cell.
/// Rebuilt every tick before the ally AI reads it.
#[derive(Resource, Debug)]
pub struct SpatialGrid {
    /// Cell size in world units.
    pub cell_size: f32,
    /// Map from cell coordinates to list of entities in that cell.
    cells: HashMap<(i32, i32), Vec<SpatialEntry>>,
    /// Reverse lookup: entity to cell.
    entity_cells: HashMap<Entity, (i32, i32)>,
}

/// Entry in a spatial cell.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub entity: Entity,
    pub id: EntityId,
    pub position: Vec2,
    pub faction: Faction,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            entity_cells: HashMap::new(),
        }
    }

    /// Convert world coordinates to cell coordinates.
    #[inline]
    pub fn world_to_cell(&self, p: Vec2) -> (i32, i32) {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    /// Clear all entries (call before rebuilding).
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entity_cells.clear();
    }

    /// Insert an entity at a position.
    pub fn insert(&mut self, entity: Entity, id: EntityId, position: Vec2, faction: Faction) {
        let cell = self.world_to_cell(position);

        // Remove from old cell if moved
        if let Some(&old_cell) = self.entity_cells.get(&entity) {
            if let Some(entries) = self.cells.get_mut(&old_cell) {
                entries.retain(|e| e.entity != entity);
            }
        }

        let entry = SpatialEntry { entity, id, position, faction };
        self.cells.entry(cell).or_default().push(entry);
        self.entity_cells.insert(entity, cell);
    }

    /// Query all entities strictly within `radius` of a point.
    /// Returns entries sorted by distance (closest first, ties by id).
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<SpatialEntry> {
        let radius_sq = radius * radius;
        let cells_to_check = (radius / self.cell_size).ceil() as i32 + 1;
        let center_cell = self.world_to_cell(center);

        let mut results = Vec::new();

        for dx in -cells_to_check..=cells_to_check {
            for dy in -cells_to_check..=cells_to_check {
                let cell = (center_cell.0 + dx, center_cell.1 + dy);
                if let Some(entries) = self.cells.get(&cell) {
                    for entry in entries {
                        if entry.position.distance_squared(center) < radius_sq {
                            results.push(*entry);
                        }
                    }
                }
            }
        }

        results.sort_by(|a, b| {
            let dist_a = a.position.distance_squared(center);
            let dist_b = b.position.distance_squared(center);
            dist_a
                .partial_cmp(&dist_b)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });

        results
    }

    /// Query entities of one faction within radius.
    pub fn query_faction(&self, center: Vec2, radius: f32, faction: Faction) -> Vec<SpatialEntry> {
        let mut results = self.query_radius(center, radius);
        results.retain(|e| e.faction == faction);
        results
    }

    /// Nearest entity of `faction` strictly within `max_radius`.
    pub fn nearest(&self, center: Vec2, max_radius: f32, faction: Faction) -> Option<SpatialEntry> {
        self.query_faction(center, max_radius, faction).into_iter().next()
    }

    /// Get count of entities in a cell.
    pub fn cell_count(&self, cell: (i32, i32)) -> usize {
        self.cells.get(&cell).map(|v| v.len()).unwrap_or(0)
    }

    /// Get total entity count.
    pub fn total_count(&self) -> usize {
        self.entity_cells.len()
    }
}

/// System that rebuilds the spatial grid from active, living actors.
pub fn spatial_grid_update_system(
    mut grid: ResMut<SpatialGrid>,
    query: Query<(Entity, &EntityId, &Position, &Faction, &Active, Option<&Health>)>,
) {
    grid.clear();

    for (entity, id, pos, faction, active, health) in query.iter() {
        if !active.is_active() || health.is_some_and(|h| !h.is_alive()) {
            continue;
        }
        grid.insert(entity, *id, pos.0, *faction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spatial_grid_insert_query() {
        let mut grid = SpatialGrid::new(10.0);

        let e1 = Entity::from_raw(1);
        let e2 = Entity::from_raw(2);
        let e3 = Entity::from_raw(3);

        grid.insert(e1, EntityId(1), Vec2::new(5.0, 5.0), Faction::Squad);
        grid.insert(e2, EntityId(2), Vec2::new(15.0, 5.0), Faction::Squad);
        grid.insert(e3, EntityId(3), Vec2::new(100.0, 100.0), Faction::Hostile);

        let nearby = grid.query_radius(Vec2::new(5.0, 5.0), 15.0);
        assert_eq!(nearby.len(), 2);

        // Exactly on the radius is excluded.
        let nearby = grid.query_radius(Vec2::new(5.0, 5.0), 10.0);
        assert_eq!(nearby.len(), 1);

        let nearby = grid.query_radius(Vec2::new(100.0, 100.0), 10.0);
        assert_eq!(nearby.len(), 1);
    }

    #[test]
    fn test_nearest_hostile() {
        let mut grid = SpatialGrid::new(10.0);

        grid.insert(Entity::from_raw(1), EntityId(1), Vec2::ZERO, Faction::Squad);
        grid.insert(Entity::from_raw(2), EntityId(2), Vec2::new(30.0, 0.0), Faction::Hostile);
        grid.insert(Entity::from_raw(3), EntityId(3), Vec2::new(20.0, 0.0), Faction::Hostile);

        let nearest = grid.nearest(Vec2::ZERO, 50.0, Faction::Hostile);
        assert_eq!(nearest.map(|e| e.id), Some(EntityId(3)));
        assert!(grid.nearest(Vec2::ZERO, 15.0, Faction::Hostile).is_none());
    }

    #[test]
    fn test_reinsert_moves_entity() {
        let mut grid = SpatialGrid::new(10.0);
        let e = Entity::from_raw(1);
        grid.insert(e, EntityId(1), Vec2::new(5.0, 5.0), Faction::Hostile);
        grid.insert(e, EntityId(1), Vec2::new(55.0, 5.0), Faction::Hostile);
        assert_eq!(grid.cell_count((0, 0)), 0);
        assert_eq!(grid.cell_count((5, 0)), 1);
        assert_eq!(grid.total_count(), 1);
    }

    #[test]
    fn test_rebuild_skips_dead_and_inactive() {
        let mut world = World::new();
        world.insert_resource(SpatialGrid::new(50.0));
        world.spawn((EntityId(1), Position::new(0.0, 0.0), Faction::Hostile, Active(true)));
        world.spawn((EntityId(2), Position::new(10.0, 0.0), Faction::Hostile, Active(false)));
        world.spawn((
            EntityId(3),
            Position::new(20.0, 0.0),
            Faction::Squad,
            Active(true),
            Health { current: 0.0, max: 150.0 },
        ));

        let mut schedule = Schedule::default();
        schedule.add_systems(spatial_grid_update_system);
        schedule.run(&mut world);

        assert_eq!(world.resource::<SpatialGrid>().total_count(), 1);
    }
}
