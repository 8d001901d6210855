//! Player control - applies the tick's input snapshot to the player entity.

use crate::components::*;
use crate::config::SimConfig;
use crate::input::{Aim, InputSnapshot};
use crate::math::angle_between;
use crate::registry::{IdAllocator, Obstacles, SimClock, Viewport};
use crate::systems::combat::{try_fire, Muzzle};
use crate::systems::movement::resolve_step;
use bevy_ecs::prelude::*;

/// System that moves, aims and fires for the player.
///
/// Movement is clamped to the viewport and rejected against obstacles.
/// `Aim::Toward` is resolved from the post-move position.
#[allow(clippy::too_many_arguments)]
pub fn player_control_system(
    mut commands: Commands,
    mut ids: ResMut<IdAllocator>,
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    input: Res<InputSnapshot>,
    viewport: Res<Viewport>,
    obstacles: Res<Obstacles>,
    mut query: Query<
        (
            &mut Position,
            &mut Velocity,
            &Radius,
            &mut Facing,
            &mut Magazine,
            &Reload,
            &mut FireControl,
            &Health,
        ),
        With<Player>,
    >,
) {
    let Ok((mut pos, mut vel, radius, mut facing, mut magazine, reload, mut fire, health)) =
        query.get_single_mut()
    else {
        return;
    };
    if !health.is_alive() {
        return;
    }

    let displacement = input.movement.clamp_length_max(1.0) * config.player_speed;
    vel.0 = displacement;
    pos.0 = resolve_step(pos.0, displacement, radius.0, &obstacles, Some(&viewport));

    match input.aim {
        Aim::Keep => {}
        Aim::Angle(angle) if angle.is_finite() => facing.0 = angle,
        Aim::Angle(_) => {}
        Aim::Toward(target) => facing.0 = angle_between(pos.0, target),
    }

    if input.fire {
        try_fire(
            &mut commands,
            &mut ids,
            &config,
            clock.now_ms,
            &mut fire,
            Some((&mut *magazine, reload)),
            Muzzle {
                origin: pos.0,
                angle: facing.0,
                owner: BulletOwner::Player,
            },
        );
    }
}
