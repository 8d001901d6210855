//! Combat systems - firing, reloads, projectiles and damage resolution.
//!
//! ## Ordering
//!
//! Within a tick combat runs in three places:
//! 1. `reload_system` resolves a due reload before anyone tries to fire
//! 2. `bullet_advance_system` moves bullets spawned by the player/ally
//!    systems earlier in the same tick and culls them against the arena
//! 3. `contact_damage_system` and `bullet_hit_system` run after enemies moved
//!
//! Hit resolution iterates bullets and enemies in `EntityId` order so a given
//! seed always produces the same kills.

use crate::components::*;
use crate::config::SimConfig;
use crate::math::unit_from_angle;
use crate::registry::{
    ArenaRng, GameOverLatch, GamePhase, IdAllocator, Obstacles, SimClock, TickEvents, Viewport, Wave,
};
use crate::systems::particles::spawn_particles;
use bevy_ecs::prelude::*;
use glam::Vec2;
use tracing::{debug, info};

/// Where and in which direction a shot leaves its shooter.
#[derive(Debug, Clone, Copy)]
pub struct Muzzle {
    pub origin: Vec2,
    pub angle: f32,
    pub owner: BulletOwner,
}

/// Spawn one bullet in front of the shooter.
pub fn spawn_bullet(commands: &mut Commands, ids: &mut IdAllocator, config: &SimConfig, muzzle: Muzzle) {
    let dir = unit_from_angle(muzzle.angle);
    commands.spawn(BulletBundle {
        id: ids.next_id(),
        bullet: Bullet {
            damage: config.bullet_damage,
            owner: muzzle.owner,
        },
        position: Position(muzzle.origin + dir * config.muzzle_offset),
        velocity: Velocity(dir * config.bullet_speed),
        radius: Radius(config.bullet_radius),
        active: Active(true),
        facing: Facing(muzzle.angle),
        speed: Speed(config.bullet_speed),
    });
}

/// Attempt a shot. Returns true if a bullet was fired.
///
/// `ammo` is `None` for allies, who never run dry.
pub fn try_fire(
    commands: &mut Commands,
    ids: &mut IdAllocator,
    config: &SimConfig,
    now_ms: f64,
    fire: &mut FireControl,
    ammo: Option<(&mut Magazine, &Reload)>,
    muzzle: Muzzle,
) -> bool {
    if !fire.ready(now_ms, config.fire_rate_ms) {
        return false;
    }

    if let Some((magazine, reload)) = ammo {
        if magazine.is_empty() || reload.is_reloading() {
            return false;
        }
        magazine.consume();
    }

    fire.record(now_ms);
    spawn_bullet(commands, ids, config, muzzle);
    true
}

/// System that completes a reload once its due time has passed.
pub fn reload_system(clock: Res<SimClock>, mut query: Query<(&mut Reload, &mut Magazine), With<Player>>) {
    for (mut reload, mut magazine) in query.iter_mut() {
        if reload.poll(clock.now_ms) {
            magazine.refill();
            debug!(ammo = magazine.ammo, "reload complete");
        }
    }
}

/// System that moves bullets and culls them against the viewport and obstacles.
pub fn bullet_advance_system(
    mut commands: Commands,
    mut ids: ResMut<IdAllocator>,
    mut rng: ResMut<ArenaRng>,
    config: Res<SimConfig>,
    viewport: Res<Viewport>,
    obstacles: Res<Obstacles>,
    mut query: Query<(&mut Position, &Velocity, &mut Active), With<Bullet>>,
) {
    let bounds = viewport.rect();

    for (mut pos, vel, mut active) in query.iter_mut() {
        if !active.is_active() {
            continue;
        }
        pos.0 += vel.0;

        // Independent checks: a bullet can leave the viewport inside an
        // obstacle that overhangs the edge.
        if bounds.excludes_point(pos.0) {
            active.deactivate();
        }

        if obstacles.blocks_point(pos.0) {
            active.deactivate();
            spawn_particles(
                &mut commands,
                &mut ids,
                &mut rng,
                &config,
                pos.0,
                ParticleKind::Debris,
                config.debris_particles,
            );
        }
    }
}

/// System that applies enemy contact damage to the player and living allies.
///
/// The player's death triggers the game-over transition exactly once per
/// mission. An ally crossing to zero health bursts into particles on that tick
/// and is inert afterwards.
#[allow(clippy::too_many_arguments)]
pub fn contact_damage_system(
    mut commands: Commands,
    mut ids: ResMut<IdAllocator>,
    mut rng: ResMut<ArenaRng>,
    config: Res<SimConfig>,
    mut events: ResMut<TickEvents>,
    mut latch: ResMut<GameOverLatch>,
    mut phase: ResMut<GamePhase>,
    enemies: Query<(&EntityId, &Position, &Radius, &Active), With<Enemy>>,
    mut player: Query<(&Position, &Radius, &mut Health), (With<Player>, Without<Ally>)>,
    mut allies: Query<(&Ally, &Position, &Radius, &mut Health), Without<Player>>,
) {
    let mut attackers: Vec<_> = enemies
        .iter()
        .filter(|(_, _, _, active)| active.is_active())
        .map(|(id, pos, radius, _)| (*id, pos.0, radius.0))
        .collect();
    attackers.sort_by_key(|(id, _, _)| *id);

    if let Ok((pos, radius, mut health)) = player.get_single_mut() {
        for &(_, enemy_pos, enemy_radius) in &attackers {
            if pos.0.distance(enemy_pos) < radius.0 + enemy_radius {
                health.damage(config.contact_damage);
                spawn_particles(
                    &mut commands,
                    &mut ids,
                    &mut rng,
                    &config,
                    pos.0,
                    ParticleKind::Blood,
                    config.contact_particles,
                );
            }
        }

        if !health.is_alive() && !latch.fired {
            latch.fired = true;
            events.game_over = true;
            *phase = GamePhase::GameOver;
            info!("player down, mission over");
        }
    }

    let mut squad: Vec<_> = allies.iter_mut().collect();
    squad.sort_by_key(|(ally, _, _, _)| ally.slot);

    for (ally, pos, radius, mut health) in squad {
        for &(_, enemy_pos, enemy_radius) in &attackers {
            if !health.is_alive() {
                break;
            }
            if pos.0.distance(enemy_pos) < radius.0 + enemy_radius {
                health.damage(config.contact_damage);
                spawn_particles(
                    &mut commands,
                    &mut ids,
                    &mut rng,
                    &config,
                    pos.0,
                    ParticleKind::Blood,
                    config.contact_particles,
                );
                if !health.is_alive() {
                    spawn_particles(
                        &mut commands,
                        &mut ids,
                        &mut rng,
                        &config,
                        pos.0,
                        ParticleKind::AllyDown,
                        config.ally_down_particles,
                    );
                    debug!(slot = ally.slot, "ally down");
                }
            }
        }
    }
}

/// System that resolves bullet hits on enemies and credits kills.
#[allow(clippy::too_many_arguments)]
pub fn bullet_hit_system(
    mut commands: Commands,
    mut ids: ResMut<IdAllocator>,
    mut rng: ResMut<ArenaRng>,
    config: Res<SimConfig>,
    mut wave: ResMut<Wave>,
    mut events: ResMut<TickEvents>,
    mut bullets: Query<(&EntityId, &Position, &Radius, &Bullet, &mut Active), Without<Enemy>>,
    mut enemies: Query<(Entity, &EntityId, &Position, &Radius, &mut Health, &mut Active), (With<Enemy>, Without<Bullet>)>,
    mut score: Query<&mut Score, With<Player>>,
) {
    let mut order: Vec<_> = enemies
        .iter()
        .filter(|(_, _, _, _, health, active)| active.is_active() && health.is_alive())
        .map(|(entity, id, _, _, _, _)| (*id, entity))
        .collect();
    order.sort_by_key(|(id, _)| *id);

    let mut shots: Vec<_> = bullets
        .iter_mut()
        .filter(|(_, _, _, bullet, active)| active.is_active() && bullet.owner != BulletOwner::Enemy)
        .collect();
    shots.sort_by_key(|(id, _, _, _, _)| **id);

    for (_, bullet_pos, bullet_radius, bullet, mut bullet_active) in shots {
        for &(_, entity) in &order {
            let Ok((_, _, enemy_pos, enemy_radius, mut health, mut enemy_active)) = enemies.get_mut(entity) else {
                continue;
            };
            if !enemy_active.is_active() {
                continue;
            }
            if bullet_pos.0.distance(enemy_pos.0) >= enemy_radius.0 + bullet_radius.0 {
                continue;
            }

            health.damage(bullet.damage);
            bullet_active.deactivate();
            spawn_particles(
                &mut commands,
                &mut ids,
                &mut rng,
                &config,
                bullet_pos.0,
                ParticleKind::Blood,
                config.hit_particles,
            );

            if !health.is_alive() {
                enemy_active.deactivate();
                spawn_particles(
                    &mut commands,
                    &mut ids,
                    &mut rng,
                    &config,
                    enemy_pos.0,
                    ParticleKind::Blood,
                    config.kill_particles,
                );

                if let Ok(mut score) = score.get_single_mut() {
                    score.0 += config.kill_score;
                    events.score_changed = Some(score.0);
                    if score.0 % config.wave_score_step == 0 {
                        wave.0 += 1;
                        events.wave_changed = Some(wave.0);
                        info!(wave = wave.0, score = score.0, "wave advanced");
                    }
                }
            }
            break;
        }
    }
}
