//! Cosmetic particles: emission helper and per-tick decay.

use crate::components::*;
use crate::config::SimConfig;
use crate::registry::{ArenaRng, IdAllocator};
use bevy_ecs::prelude::*;
use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

/// Emit `count` particles at `at`, scattered in random directions.
pub fn spawn_particles(
    commands: &mut Commands,
    ids: &mut IdAllocator,
    rng: &mut ArenaRng,
    config: &SimConfig,
    at: Vec2,
    kind: ParticleKind,
    count: u32,
) {
    for _ in 0..count {
        let angle = rng.0.random::<f32>() * TAU;
        let speed = rng.0.random::<f32>() * config.particle_max_speed;
        let size = rng.0.random::<f32>() * 3.0 + 1.0;
        commands.spawn(ParticleBundle {
            id: ids.next_id(),
            particle: Particle {
                life: 1.0,
                max_life: 1.0,
                alpha: 1.0,
                size,
                kind,
            },
            position: Position(at),
            velocity: Velocity(Vec2::new(angle.cos(), angle.sin()) * speed),
            radius: Radius(0.0),
            active: Active(true),
        });
    }
}

/// System that drifts particles and fades them out.
pub fn particle_decay_system(
    config: Res<SimConfig>,
    mut query: Query<(&mut Position, &Velocity, &mut Particle, &mut Active)>,
) {
    for (mut pos, vel, mut particle, mut active) in query.iter_mut() {
        if !active.is_active() {
            continue;
        }
        pos.0 += vel.0;
        particle.life -= config.particle_decay;
        particle.alpha = particle.life.max(0.0);
        if particle.life <= 0.0 {
            active.deactivate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particles_fade_and_expire() {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        let entity = world
            .spawn((
                Position::new(0.0, 0.0),
                Velocity(Vec2::new(1.0, 0.5)),
                Particle { life: 1.0, max_life: 1.0, alpha: 1.0, size: 2.0, kind: ParticleKind::Blood },
                Active(true),
            ))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(particle_decay_system);
        schedule.run(&mut world);

        let particle = *world.get::<Particle>(entity).unwrap();
        assert!((particle.life - 0.95).abs() < 1e-6);
        assert_eq!(particle.alpha, particle.life);
        assert_eq!(world.get::<Position>(entity).unwrap().0, Vec2::new(1.0, 0.5));

        // Roughly 20 ticks at 0.05 drain a full-life particle.
        for _ in 0..20 {
            schedule.run(&mut world);
        }
        assert!(!world.get::<Active>(entity).unwrap().is_active());
    }

    #[test]
    fn test_spawn_particles_counts_and_bounds() {
        let mut world = World::new();
        let config = SimConfig::default();
        let mut ids = IdAllocator::default();
        let mut rng = ArenaRng::from_seed(3);
        let mut queue = bevy_ecs::world::CommandQueue::default();
        {
            let mut commands = Commands::new(&mut queue, &world);
            spawn_particles(&mut commands, &mut ids, &mut rng, &config, Vec2::new(5.0, 5.0), ParticleKind::Debris, 3);
        }
        queue.apply(&mut world);

        let mut query = world.query::<(&Particle, &Velocity)>();
        let particles: Vec<_> = query.iter(&world).collect();
        assert_eq!(particles.len(), 3);
        for (p, v) in particles {
            assert!(p.size >= 1.0 && p.size < 4.0);
            assert!(v.0.length() < 3.0 + 1e-4);
            assert_eq!(p.kind, ParticleKind::Debris);
        }
    }
}
