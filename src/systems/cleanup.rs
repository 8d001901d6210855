//! Tick bookkeeping: opening the tick and purging what died during it.

use crate::components::{Active, Player};
use crate::registry::{SimClock, TickEvents};
use bevy_ecs::prelude::*;

/// System that opens a tick: bumps the counter and resets outbound events.
pub fn begin_tick_system(mut clock: ResMut<SimClock>, mut events: ResMut<TickEvents>) {
    clock.tick += 1;
    events.clear();
}

/// System that despawns every entity deactivated during this tick.
///
/// Runs last so nothing is removed mid-tick. The player is never despawned.
pub fn purge_inactive_system(mut commands: Commands, query: Query<(Entity, &Active), Without<Player>>) {
    for (entity, active) in query.iter() {
        if !active.is_active() {
            commands.entity(entity).despawn();
        }
    }
}
