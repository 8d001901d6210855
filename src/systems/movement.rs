//! Movement system - resolves intended displacement against the arena.
//!
//! Movement is all-or-nothing: if the destination disc overlaps any obstacle
//! the entity stays where it was this tick. There is no sliding along edges.

use crate::components::*;
use crate::math::clamp_disc_to_bounds;
use crate::registry::{Obstacles, Viewport};
use bevy_ecs::prelude::*;
use glam::Vec2;

/// Compute where an entity ends up after trying to move by `displacement`.
///
/// `bounds` clamps the destination inside the viewport first (player only).
pub fn resolve_step(
    position: Vec2,
    displacement: Vec2,
    radius: f32,
    obstacles: &Obstacles,
    bounds: Option<&Viewport>,
) -> Vec2 {
    let mut next = position + displacement;
    if let Some(viewport) = bounds {
        next = clamp_disc_to_bounds(next, radius, viewport.width, viewport.height);
    }

    if obstacles.blocks_disc(next, radius) {
        position
    } else {
        next
    }
}

/// System that applies enemy velocity to position.
/// Enemies are not clamped to the viewport; they walk in from outside it.
pub fn enemy_movement_system(
    obstacles: Res<Obstacles>,
    mut query: Query<(&mut Position, &Velocity, &Radius, &Active), With<Enemy>>,
) {
    for (mut pos, vel, radius, active) in query.iter_mut() {
        if !active.is_active() {
            continue;
        }
        pos.0 = resolve_step(pos.0, vel.0, radius.0, &obstacles, None);
    }
}
