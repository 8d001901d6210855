//! Frame snapshot types.
//!
//! The `Snapshot` struct provides a serializable, read-only view of the arena
//! after a tick, with everything the host needs to draw a frame: positions,
//! facings, colors, health/ammo fractions and the tick's events.

use crate::components::*;
use crate::math::Rect;
use crate::registry::{GamePhase, Obstacles, SimClock, TickEvents, Wave};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub angle: f32,
    pub health: f32,
    pub health_max: f32,
    pub health_fraction: f32,
    pub ammo: u32,
    pub ammo_max: u32,
    pub ammo_fraction: f32,
    pub reloading: bool,
    pub score: u32,
    pub weapon: String,
    pub color: String,
}

/// Snapshot of a squadmate. Downed allies stay in the list with `alive: false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllySnapshot {
    pub id: u64,
    pub slot: usize,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub angle: f32,
    pub health: f32,
    pub health_max: f32,
    pub health_fraction: f32,
    pub state: String,
    pub alive: bool,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub id: u64,
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub health: f32,
    pub health_max: f32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletSnapshot {
    pub id: u64,
    pub owner: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub angle: f32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSnapshot {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub alpha: f32,
    pub color: String,
}

/// Complete arena state for one rendered frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ticks run since construction.
    pub tick: u64,
    /// Simulation clock in milliseconds.
    pub time_ms: f64,
    pub phase: String,
    pub score: u32,
    pub wave: u32,
    pub player: Option<PlayerSnapshot>,
    pub allies: Vec<AllySnapshot>,
    pub enemies: Vec<EnemySnapshot>,
    pub bullets: Vec<BulletSnapshot>,
    pub particles: Vec<ParticleSnapshot>,
    pub obstacles: Vec<Rect>,
    pub obstacle_color: String,
    /// What changed during the tick that produced this frame.
    pub events: TickEvents,
}

impl Snapshot {
    /// Create a snapshot from the ECS world. Entities are listed in id order
    /// and inactive ones are skipped.
    pub fn from_world(world: &mut World) -> Self {
        let clock = world.get_resource::<SimClock>().copied().unwrap_or_default();
        let phase = world.get_resource::<GamePhase>().copied().unwrap_or_default();
        let wave = world.get_resource::<Wave>().copied().unwrap_or_default();
        let events = world.get_resource::<TickEvents>().copied().unwrap_or_default();
        let obstacles = world
            .get_resource::<Obstacles>()
            .map(|o| o.0.clone())
            .unwrap_or_default();

        let mut player_query = world.query_filtered::<(
            &EntityId,
            &Position,
            &Velocity,
            &Radius,
            &Facing,
            &Health,
            &Magazine,
            &Reload,
            &Score,
            &Weapon,
        ), With<Player>>();
        let player = player_query.iter(world).next().map(
            |(id, pos, vel, radius, facing, health, magazine, reload, score, weapon)| PlayerSnapshot {
                id: id.0,
                x: pos.0.x,
                y: pos.0.y,
                vx: vel.0.x,
                vy: vel.0.y,
                radius: radius.0,
                angle: facing.0,
                health: health.current,
                health_max: health.max,
                health_fraction: health.fraction(),
                ammo: magazine.ammo,
                ammo_max: magazine.max,
                ammo_fraction: if magazine.max == 0 {
                    0.0
                } else {
                    magazine.ammo as f32 / magazine.max as f32
                },
                reloading: reload.is_reloading(),
                score: score.0,
                weapon: weapon.0.clone(),
                color: colors::PLAYER.to_string(),
            },
        );

        let mut ally_query = world.query::<(
            &EntityId,
            &Ally,
            &Position,
            &Velocity,
            &Radius,
            &Facing,
            &Health,
            &AllyState,
            &Active,
        )>();
        let mut allies: Vec<_> = ally_query
            .iter(world)
            .filter(|(.., active)| active.is_active())
            .map(|(id, ally, pos, vel, radius, facing, health, state, _)| AllySnapshot {
                id: id.0,
                slot: ally.slot,
                x: pos.0.x,
                y: pos.0.y,
                vx: vel.0.x,
                vy: vel.0.y,
                radius: radius.0,
                angle: facing.0,
                health: health.current,
                health_max: health.max,
                health_fraction: health.fraction(),
                state: state.as_str().to_string(),
                alive: health.is_alive(),
                color: colors::ALLY.to_string(),
            })
            .collect();
        allies.sort_by_key(|a| a.slot);

        let mut enemy_query =
            world.query::<(&EntityId, &Enemy, &Position, &Velocity, &Radius, &Health, &Active)>();
        let mut enemies: Vec<_> = enemy_query
            .iter(world)
            .filter(|(.., active)| active.is_active())
            .map(|(id, enemy, pos, vel, radius, health, _)| EnemySnapshot {
                id: id.0,
                kind: enemy.kind.as_str().to_string(),
                x: pos.0.x,
                y: pos.0.y,
                vx: vel.0.x,
                vy: vel.0.y,
                radius: radius.0,
                health: health.current,
                health_max: health.max,
                color: enemy.kind.color().to_string(),
            })
            .collect();
        enemies.sort_by_key(|e| e.id);

        let mut bullet_query =
            world.query::<(&EntityId, &Bullet, &Position, &Velocity, &Radius, &Facing, &Active)>();
        let mut bullets: Vec<_> = bullet_query
            .iter(world)
            .filter(|(.., active)| active.is_active())
            .map(|(id, bullet, pos, vel, radius, facing, _)| BulletSnapshot {
                id: id.0,
                owner: bullet.owner.as_str().to_string(),
                x: pos.0.x,
                y: pos.0.y,
                vx: vel.0.x,
                vy: vel.0.y,
                radius: radius.0,
                angle: facing.0,
                color: bullet.owner.color().to_string(),
            })
            .collect();
        bullets.sort_by_key(|b| b.id);

        let mut particle_query = world.query::<(&EntityId, &Particle, &Position, &Active)>();
        let mut particles: Vec<_> = particle_query
            .iter(world)
            .filter(|(.., active)| active.is_active())
            .map(|(id, particle, pos, _)| ParticleSnapshot {
                id: id.0,
                x: pos.0.x,
                y: pos.0.y,
                size: particle.size,
                alpha: particle.alpha,
                color: particle.kind.color().to_string(),
            })
            .collect();
        particles.sort_by_key(|p| p.id);

        Self {
            tick: clock.tick,
            time_ms: clock.now_ms,
            phase: phase.as_str().to_string(),
            score: player.as_ref().map(|p| p.score).unwrap_or(0),
            wave: wave.0,
            player,
            allies,
            enemies,
            bullets,
            particles,
            obstacles,
            obstacle_color: colors::OBSTACLE.to_string(),
            events,
        }
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use glam::Vec2;

    #[test]
    fn test_snapshot_lists_active_entities_in_id_order() {
        let config = SimConfig::default();
        let mut world = World::new();
        world.insert_resource(SimClock { now_ms: 32.0, tick: 2 });
        world.insert_resource(GamePhase::Playing);
        world.insert_resource(Wave(3));
        world.insert_resource(Obstacles(vec![Rect::new(1.0, 2.0, 3.0, 4.0)]));

        world.spawn(PlayerBundle::new(EntityId(1), Vec2::new(10.0, 10.0), &config));
        world.spawn(AllyBundle::new(EntityId(3), 1, Vec2::new(60.0, 0.0), &config));
        world.spawn(AllyBundle::new(EntityId(2), 0, Vec2::new(-60.0, 0.0), &config));
        world.spawn(EnemyBundle::new(EntityId(9), EnemyKind::Brute, Vec2::ZERO, 2.0));
        world.spawn(EnemyBundle::new(EntityId(5), EnemyKind::Runner, Vec2::ZERO, 2.0));
        let mut dead = EnemyBundle::new(EntityId(7), EnemyKind::Grunt, Vec2::ZERO, 2.0);
        dead.active = Active(false);
        world.spawn(dead);

        let snapshot = Snapshot::from_world(&mut world);

        assert_eq!(snapshot.tick, 2);
        assert_eq!(snapshot.phase, "PLAYING");
        assert_eq!(snapshot.wave, 3);
        assert_eq!(snapshot.obstacles.len(), 1);
        let player = snapshot.player.as_ref().unwrap();
        assert_eq!(player.health_fraction, 1.0);
        assert_eq!(player.ammo_fraction, 1.0);
        assert_eq!(player.weapon, "ASSAULT RIFLE");
        assert_eq!(player.color, "#34d399");
        assert_eq!(snapshot.allies.iter().map(|a| a.slot).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(snapshot.enemies.iter().map(|e| e.id).collect::<Vec<_>>(), vec![5, 9]);
        assert_eq!(snapshot.enemies[1].kind, "BRUTE");
        assert_eq!(snapshot.enemies[1].color, "#7f1d1d");
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let snapshot = Snapshot {
            tick: 42,
            time_ms: 700.0,
            phase: "GAME_OVER".to_string(),
            score: 1200,
            wave: 2,
            events: TickEvents { game_over: true, ..Default::default() },
            ..Default::default()
        };
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"game_over\":true"));
        let restored: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
    }
}
