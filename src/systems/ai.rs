//! AI systems for the squadmates and the horde.
//!
//! Allies run a three-state controller (idle / moving / shooting) each tick,
//! reading enemy positions from the spatial grid. Enemies are stateless: every
//! tick they pick the nearest living squad member and walk straight at it.

use crate::components::*;
use crate::config::SimConfig;
use crate::math::{angle_between, unit_from_angle};
use crate::registry::{IdAllocator, Obstacles, SimClock};
use crate::spatial::SpatialGrid;
use crate::systems::combat::{try_fire, Muzzle};
use crate::systems::movement::resolve_step;
use bevy_ecs::prelude::*;
use glam::Vec2;

// ============================================================================
// ALLY CONTROLLER
// ============================================================================

/// Decide what an ally does this tick.
///
/// Straying past the leash always wins; otherwise a visible enemy pins the
/// ally in place to shoot.
pub fn decide_ally_state(distance_to_player: f32, sees_enemy: bool, leash: f32) -> AllyState {
    if distance_to_player > leash {
        AllyState::Moving
    } else if sees_enemy {
        AllyState::Shooting
    } else {
        AllyState::Moving
    }
}

/// Formation slot for `slot`, relative to the player.
pub fn formation_slot(config: &SimConfig, player: Vec2, slot: usize) -> Vec2 {
    let (dx, dy) = config.formation_offsets.get(slot).copied().unwrap_or_default();
    player + Vec2::new(dx, dy)
}

/// System that runs the squadmate controller.
///
/// ## Data Access
/// - Reads: SimConfig, SimClock, SpatialGrid, Obstacles, player Position
/// - Writes: ally Position, Velocity, Facing, AllyState, FireControl; spawns bullets
#[allow(clippy::too_many_arguments)]
pub fn ally_squad_system(
    mut commands: Commands,
    mut ids: ResMut<IdAllocator>,
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    grid: Res<SpatialGrid>,
    obstacles: Res<Obstacles>,
    player: Query<&Position, (With<Player>, Without<Ally>)>,
    mut allies: Query<
        (
            &Ally,
            &mut Position,
            &mut Velocity,
            &Radius,
            &mut Facing,
            &mut AllyState,
            &mut FireControl,
            &Health,
            &Active,
        ),
        Without<Player>,
    >,
) {
    let Ok(player_pos) = player.get_single().map(|p| p.0) else {
        return;
    };

    let mut squad: Vec<_> = allies.iter_mut().collect();
    squad.sort_by_key(|(ally, ..)| ally.slot);

    for (ally, mut pos, mut vel, radius, mut facing, mut state, mut fire, health, active) in squad {
        if !health.is_alive() || !active.is_active() {
            continue;
        }

        let nearest = grid.nearest(pos.0, config.ally_sight_range, Faction::Hostile);
        *state = decide_ally_state(
            pos.0.distance(player_pos),
            nearest.is_some(),
            config.ally_leash_distance,
        );

        vel.0 = Vec2::ZERO;
        if *state == AllyState::Moving {
            let target = formation_slot(&config, player_pos, ally.slot);
            if pos.0.distance(target) > config.ally_arrival_tolerance {
                vel.0 = unit_from_angle(angle_between(pos.0, target)) * config.ally_speed;
                pos.0 = resolve_step(pos.0, vel.0, radius.0, &obstacles, None);
            }
        }

        if let Some(enemy) = nearest {
            facing.0 = angle_between(pos.0, enemy.position);
            try_fire(
                &mut commands,
                &mut ids,
                &config,
                clock.now_ms,
                &mut fire,
                None,
                Muzzle {
                    origin: pos.0,
                    angle: facing.0,
                    owner: BulletOwner::Ally,
                },
            );
        } else if *state == AllyState::Moving {
            facing.0 = angle_between(pos.0, player_pos);
        }
    }
}

// ============================================================================
// ENEMY PURSUIT
// ============================================================================

/// System that points every enemy at its nearest target.
///
/// Candidates are the player and each living ally. Ties go to the player,
/// then to the lower slot. Movement itself happens in `enemy_movement_system`.
pub fn enemy_pursuit_system(
    player: Query<&Position, With<Player>>,
    allies: Query<(&Ally, &Position, &Health), Without<Enemy>>,
    mut enemies: Query<(&Position, &mut Velocity, &Speed, &Active), (With<Enemy>, Without<Player>)>,
) {
    let Ok(player_pos) = player.get_single().map(|p| p.0) else {
        return;
    };

    let mut living: Vec<_> = allies
        .iter()
        .filter(|(_, _, health)| health.is_alive())
        .map(|(ally, pos, _)| (ally.slot, pos.0))
        .collect();
    living.sort_by_key(|(slot, _)| *slot);

    for (pos, mut vel, speed, active) in enemies.iter_mut() {
        if !active.is_active() {
            continue;
        }

        let mut target = player_pos;
        let mut best = pos.0.distance(player_pos);
        for &(_, ally_pos) in &living {
            let d = pos.0.distance(ally_pos);
            if d < best {
                best = d;
                target = ally_pos;
            }
        }

        vel.0 = unit_from_angle(angle_between(pos.0, target)) * speed.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::spatial_grid_update_system;

    #[test]
    fn test_decide_ally_state() {
        assert_eq!(decide_ally_state(350.0, true, 300.0), AllyState::Moving);
        assert_eq!(decide_ally_state(100.0, true, 300.0), AllyState::Shooting);
        assert_eq!(decide_ally_state(100.0, false, 300.0), AllyState::Moving);
        // Exactly on the leash does not force a regroup.
        assert_eq!(decide_ally_state(300.0, true, 300.0), AllyState::Shooting);
    }

    fn squad_world(player_at: Vec2) -> World {
        let config = SimConfig::default();
        let mut world = World::new();
        let mut ids = IdAllocator::default();
        world.spawn(PlayerBundle::new(ids.next_id(), player_at, &config));
        for (slot, (dx, dy)) in config.ally_spawn_offsets.iter().enumerate() {
            let at = player_at + Vec2::new(*dx, *dy);
            world.spawn(AllyBundle::new(ids.next_id(), slot, at, &config));
        }
        world.insert_resource(ids);
        world.insert_resource(SpatialGrid::new(config.spatial_cell_size));
        world.insert_resource(config);
        world.insert_resource(SimClock::default());
        world.insert_resource(Obstacles::default());
        world
    }

    fn squad_schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems((spatial_grid_update_system, ally_squad_system).chain());
        schedule
    }

    fn ally_positions(world: &mut World) -> Vec<(usize, Vec2, AllyState)> {
        let mut out: Vec<_> = world
            .query::<(&Ally, &Position, &AllyState)>()
            .iter(world)
            .map(|(a, p, s)| (a.slot, p.0, *s))
            .collect();
        out.sort_by_key(|(slot, ..)| *slot);
        out
    }

    #[test]
    fn test_formation_converges_around_player_at_origin() {
        let mut world = squad_world(Vec2::ZERO);
        let mut schedule = squad_schedule();
        for _ in 0..60 {
            schedule.run(&mut world);
        }

        let allies = ally_positions(&mut world);
        assert!(allies[0].1.distance(Vec2::new(-60.0, -60.0)) <= 10.0);
        assert!(allies[1].1.distance(Vec2::new(60.0, -60.0)) <= 10.0);
        assert_eq!(allies[0].2, AllyState::Moving);
    }

    #[test]
    fn test_ally_holds_and_shoots_visible_enemy() {
        let mut world = squad_world(Vec2::new(400.0, 400.0));
        let mut ids = world.remove_resource::<IdAllocator>().unwrap();
        world.spawn(EnemyBundle::new(ids.next_id(), EnemyKind::Grunt, Vec2::new(400.0, 100.0), 2.0));
        world.insert_resource(ids);

        let before = ally_positions(&mut world);
        squad_schedule().run(&mut world);
        let after = ally_positions(&mut world);

        for (b, a) in before.iter().zip(&after) {
            assert_eq!(a.2, AllyState::Shooting);
            assert_eq!(a.1, b.1);
        }
        let ally_shots = world
            .query::<&Bullet>()
            .iter(&world)
            .filter(|b| b.owner == BulletOwner::Ally)
            .count();
        assert_eq!(ally_shots, 2);
    }

    #[test]
    fn test_dead_ally_is_inert() {
        let mut world = squad_world(Vec2::new(400.0, 400.0));
        let dead = world
            .query::<(Entity, &Ally)>()
            .iter(&world)
            .find(|(_, a)| a.slot == 0)
            .map(|(e, _)| e)
            .unwrap();
        world.get_mut::<Health>(dead).unwrap().current = 0.0;
        let start = world.get::<Position>(dead).unwrap().0;

        squad_schedule().run(&mut world);

        assert_eq!(world.get::<Position>(dead).unwrap().0, start);
        assert_eq!(*world.get::<AllyState>(dead).unwrap(), AllyState::Idle);
    }

    #[test]
    fn test_enemy_targets_nearest_living_squad_member() {
        let mut world = squad_world(Vec2::new(400.0, 400.0));
        let mut ids = world.remove_resource::<IdAllocator>().unwrap();
        // Ally 0 starts at (350, 350); this enemy is closer to it than to the player.
        let enemy = world
            .spawn(EnemyBundle::new(ids.next_id(), EnemyKind::Grunt, Vec2::new(350.0, 250.0), 2.0))
            .id();
        world.insert_resource(ids);

        let mut schedule = Schedule::default();
        schedule.add_systems(enemy_pursuit_system);
        schedule.run(&mut world);
        let vel = world.get::<Velocity>(enemy).unwrap().0;
        assert!((vel - Vec2::new(0.0, 2.0)).length() < 1e-5);

        // Once ally 0 is down the enemy retargets to ally 1 at (450, 350).
        let ally0 = world
            .query::<(Entity, &Ally)>()
            .iter(&world)
            .find(|(_, a)| a.slot == 0)
            .map(|(e, _)| e)
            .unwrap();
        world.get_mut::<Health>(ally0).unwrap().current = 0.0;
        schedule.run(&mut world);
        let vel = world.get::<Velocity>(enemy).unwrap().0;
        let expected = Vec2::new(1.0, 1.0).normalize() * 2.0;
        assert!((vel - expected).length() < 1e-5);
    }

    #[test]
    fn test_enemy_tie_prefers_player() {
        let mut world = squad_world(Vec2::new(400.0, 400.0));
        let mut ids = world.remove_resource::<IdAllocator>().unwrap();
        // Equidistant from the player (400,400) and ally 1 (450,350).
        let enemy = world
            .spawn(EnemyBundle::new(ids.next_id(), EnemyKind::Runner, Vec2::new(450.0, 400.0), 2.0))
            .id();
        world.insert_resource(ids);

        let mut schedule = Schedule::default();
        schedule.add_systems(enemy_pursuit_system);
        schedule.run(&mut world);
        let vel = world.get::<Velocity>(enemy).unwrap().0;
        assert!((vel - Vec2::new(-3.0, 0.0)).length() < 1e-5);
    }
}
