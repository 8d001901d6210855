//! Spawn director - feeds enemies into the arena from beyond its edges.
//!
//! One enemy per cooldown. The cooldown shrinks with the wave
//! (`SimConfig::spawn_interval_ms`) and the kind roll unlocks runners from
//! wave 2 and brutes from wave 3.

use crate::components::*;
use crate::config::SimConfig;
use crate::registry::{ArenaRng, IdAllocator, SimClock, Viewport, Wave};
use bevy_ecs::prelude::*;
use glam::Vec2;
use rand::Rng;
use tracing::debug;

/// Spawn cadence state.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SpawnDirector {
    /// Hosts and tests can pause spawning without stopping the tick.
    pub enabled: bool,
    /// `None` until the first enemy has spawned.
    pub last_spawn_ms: Option<f64>,
}

impl Default for SpawnDirector {
    fn default() -> Self {
        Self {
            enabled: true,
            last_spawn_ms: None,
        }
    }
}

impl SpawnDirector {
    /// True when the cooldown for `interval_ms` has elapsed at `now_ms`.
    pub fn is_due(&self, now_ms: f64, interval_ms: f64) -> bool {
        match self.last_spawn_ms {
            None => true,
            Some(last) => now_ms - last > interval_ms,
        }
    }
}

/// Roll the kind of the next enemy.
///
/// Two independent draws: the brute check comes first, the runner check only
/// runs if it failed.
pub fn roll_enemy_kind(rng: &mut ArenaRng, wave: u32, config: &SimConfig) -> EnemyKind {
    let brute_roll: f32 = rng.0.random();
    let runner_roll: f32 = rng.0.random();
    if brute_roll < config.brute_chance && wave > 2 {
        EnemyKind::Brute
    } else if runner_roll < config.runner_chance && wave > 1 {
        EnemyKind::Runner
    } else {
        EnemyKind::Grunt
    }
}

/// Pick a point `buffer` units outside a uniformly chosen viewport edge.
pub fn edge_spawn_point(rng: &mut ArenaRng, viewport: &Viewport, buffer: f32) -> Vec2 {
    let along_x = rng.0.random::<f32>() * viewport.width;
    let along_y = rng.0.random::<f32>() * viewport.height;
    match rng.0.random_range(0..4u8) {
        0 => Vec2::new(along_x, -buffer),
        1 => Vec2::new(viewport.width + buffer, along_y),
        2 => Vec2::new(along_x, viewport.height + buffer),
        _ => Vec2::new(-buffer, along_y),
    }
}

/// System that spawns at most one enemy per tick when the cooldown allows.
#[allow(clippy::too_many_arguments)]
pub fn spawn_director_system(
    mut commands: Commands,
    mut director: ResMut<SpawnDirector>,
    mut ids: ResMut<IdAllocator>,
    mut rng: ResMut<ArenaRng>,
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    viewport: Res<Viewport>,
    wave: Res<Wave>,
) {
    if !director.enabled || !director.is_due(clock.now_ms, config.spawn_interval_ms(wave.0)) {
        return;
    }

    let kind = roll_enemy_kind(&mut rng, wave.0, &config);
    let at = edge_spawn_point(&mut rng, &viewport, config.enemy_spawn_buffer);
    let id = ids.next_id();
    commands.spawn(EnemyBundle::new(id, kind, at, config.enemy_base_speed));
    director.last_spawn_ms = Some(clock.now_ms);

    debug!(id = id.0, kind = kind.as_str(), x = at.x, y = at.y, "enemy spawned");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_world() -> World {
        let config = SimConfig::default();
        let mut world = World::new();
        world.insert_resource(Viewport::new(800.0, 600.0));
        world.insert_resource(config);
        world.insert_resource(SpawnDirector::default());
        world.insert_resource(IdAllocator::default());
        world.insert_resource(ArenaRng::from_seed(42));
        world.insert_resource(SimClock::default());
        world.insert_resource(Wave::default());
        world
    }

    fn enemy_count(world: &mut World) -> usize {
        world.query::<&Enemy>().iter(world).count()
    }

    #[test]
    fn test_first_spawn_is_immediate_then_cadenced() {
        let mut world = spawn_world();
        let mut schedule = Schedule::default();
        schedule.add_systems(spawn_director_system);

        schedule.run(&mut world);
        assert_eq!(enemy_count(&mut world), 1);

        // Wave 1 cadence is 1440 ms and the check is strict.
        world.resource_mut::<SimClock>().now_ms = 1440.0;
        schedule.run(&mut world);
        assert_eq!(enemy_count(&mut world), 1);

        world.resource_mut::<SimClock>().now_ms = 1441.0;
        schedule.run(&mut world);
        assert_eq!(enemy_count(&mut world), 2);

        // Never more than one per tick.
        world.resource_mut::<SimClock>().now_ms = 100_000.0;
        schedule.run(&mut world);
        assert_eq!(enemy_count(&mut world), 3);
    }

    #[test]
    fn test_disabled_director_spawns_nothing() {
        let mut world = spawn_world();
        world.resource_mut::<SpawnDirector>().enabled = false;
        let mut schedule = Schedule::default();
        schedule.add_systems(spawn_director_system);
        schedule.run(&mut world);
        assert_eq!(enemy_count(&mut world), 0);
    }

    #[test]
    fn test_spawn_points_sit_outside_viewport() {
        let mut rng = ArenaRng::from_seed(9);
        let viewport = Viewport::new(800.0, 600.0);
        for _ in 0..200 {
            let p = edge_spawn_point(&mut rng, &viewport, 50.0);
            let on_edge = p.x == -50.0 || p.x == 850.0 || p.y == -50.0 || p.y == 650.0;
            assert!(on_edge, "spawn point {p:?} is not on a buffered edge");
        }
    }

    #[test]
    fn test_kind_roll_respects_wave_gates() {
        let config = SimConfig::default();
        let mut rng = ArenaRng::from_seed(5);
        for _ in 0..200 {
            assert_eq!(roll_enemy_kind(&mut rng, 1, &config), EnemyKind::Grunt);
        }
        for _ in 0..200 {
            assert_ne!(roll_enemy_kind(&mut rng, 2, &config), EnemyKind::Brute);
        }

        let kinds: Vec<_> = (0..500).map(|_| roll_enemy_kind(&mut rng, 5, &config)).collect();
        assert!(kinds.contains(&EnemyKind::Brute));
        assert!(kinds.contains(&EnemyKind::Runner));
        assert!(kinds.contains(&EnemyKind::Grunt));
    }

    #[test]
    fn test_certain_rolls() {
        let config = SimConfig {
            brute_chance: 1.0,
            runner_chance: 0.0,
            ..Default::default()
        };
        let mut rng = ArenaRng::from_seed(0);
        assert_eq!(roll_enemy_kind(&mut rng, 3, &config), EnemyKind::Brute);
        // Brutes are gated behind wave 3 even with a certain roll.
        assert_eq!(roll_enemy_kind(&mut rng, 2, &config), EnemyKind::Grunt);
    }
}
