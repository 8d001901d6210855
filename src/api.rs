//! Public API for the simulation.
//!
//! This module provides the main interface for a host (browser shell, native
//! window, test harness) to drive the arena.
//!
//! ## Tick model
//!
//! The host calls `step(dt_ms)` once per rendered frame. The clock advances by
//! the frame delta and exactly one tick runs; speeds are per tick, timers
//! (fire rate, reload, spawn cadence) are in milliseconds. Outside the
//! `Playing` phase `step` does nothing.
//!
//! ## Host loop
//!
//! 1. feed raw events into an `InputDevice`, then `set_input(device.snapshot())`
//! 2. `set_viewport` if the window changed
//! 3. `step(dt_ms)`
//! 4. `snapshot()` and draw; react to `snapshot.events`

use crate::arena::generate_obstacles;
use crate::components::*;
use crate::config::SimConfig;
use crate::error::SimResult;
use crate::input::InputSnapshot;
use crate::math::Rect;
use crate::mission::MissionIntel;
use crate::registry::*;
use crate::spatial::{spatial_grid_update_system, SpatialGrid};
use crate::systems::*;
use crate::world::Snapshot;
use bevy_ecs::prelude::*;
use glam::Vec2;
use tracing::{debug, info};

/// The main simulation container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Initializing the arena and the squad
/// - Starting missions and stepping ticks
/// - Extracting frame snapshots
/// - Host/test helpers (spawning, placement, obstacles)
pub struct ArenaSim {
    world: World,
    schedule: Schedule,
    player: Entity,
    allies: Vec<Entity>,
}

impl ArenaSim {
    /// Create an arena with the default tuning.
    pub fn new() -> Self {
        Self::build(SimConfig::default())
    }

    /// Create an arena with custom tuning. Fails if the config is degenerate.
    pub fn with_config(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SimConfig) -> Self {
        let mut world = World::new();

        let viewport = Viewport::new(config.viewport_width, config.viewport_height);
        let mut ids = IdAllocator::default();
        let mut rng = ArenaRng::from_seed(config.seed);

        let player_home = viewport.center();
        let player = world
            .spawn(PlayerBundle::new(ids.next_id(), player_home, &config))
            .id();

        let mut allies = Vec::with_capacity(config.ally_spawn_offsets.len());
        let mut ally_homes = Vec::with_capacity(config.ally_spawn_offsets.len());
        for (slot, (dx, dy)) in config.ally_spawn_offsets.iter().enumerate() {
            let home = player_home + Vec2::new(*dx, *dy);
            allies.push(world.spawn(AllyBundle::new(ids.next_id(), slot, home, &config)).id());
            ally_homes.push(home);
        }

        let mut clear_points = vec![player_home];
        clear_points.extend(ally_homes.iter().copied());
        let obstacles = generate_obstacles(&mut rng, &viewport, &config, &clear_points);
        info!(
            seed = config.seed,
            width = viewport.width,
            height = viewport.height,
            obstacles = obstacles.0.len(),
            "arena built"
        );

        // Core resources
        world.insert_resource(SpatialGrid::new(config.spatial_cell_size));
        world.insert_resource(viewport);
        world.insert_resource(obstacles);
        world.insert_resource(ids);
        world.insert_resource(rng);
        world.insert_resource(SimClock::default());

        // Progression resources
        world.insert_resource(GamePhase::Menu);
        world.insert_resource(Wave::default());
        world.insert_resource(TickEvents::default());
        world.insert_resource(GameOverLatch::default());
        world.insert_resource(SpawnDirector::default());
        world.insert_resource(InputSnapshot::default());
        world.insert_resource(MissionIntel::default());
        world.insert_resource(config);

        // One fixed order per tick. `chain` inserts sync points so entities
        // spawned by one system are visible to the next.
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                begin_tick_system,
                reload_system,
                player_control_system,
                spatial_grid_update_system,
                ally_squad_system,
                bullet_advance_system,
                spawn_director_system,
                enemy_pursuit_system,
                enemy_movement_system,
                contact_damage_system,
                bullet_hit_system,
                particle_decay_system,
                purge_inactive_system,
            )
                .chain(),
        );

        Self {
            world,
            schedule,
            player,
            allies,
        }
    }

    // ------------------------------------------------------------------
    // Mission flow
    // ------------------------------------------------------------------

    /// Begin a mission: refill the player's health and magazine, cancel any
    /// reload, rearm the game-over latch and enter `Playing`.
    ///
    /// Score, wave, positions, allies and enemies carry over.
    pub fn start_mission(&mut self, intel: MissionIntel) {
        info!(operation = %intel.operation_name, difficulty = %intel.difficulty, "mission start");

        if let Ok(mut player) = self.world.get_entity_mut(self.player) {
            if let Some(mut health) = player.get_mut::<Health>() {
                health.restore();
            }
            if let Some(mut magazine) = player.get_mut::<Magazine>() {
                magazine.refill();
            }
            if let Some(mut reload) = player.get_mut::<Reload>() {
                reload.cancel();
            }
        }

        *self.world.resource_mut::<GameOverLatch>() = GameOverLatch::default();
        self.world.resource_mut::<TickEvents>().clear();
        self.world.insert_resource(intel);
        *self.world.resource_mut::<GamePhase>() = GamePhase::Playing;
    }

    /// Leave the after-action screen for the main menu.
    pub fn return_to_menu(&mut self) {
        *self.world.resource_mut::<GamePhase>() = GamePhase::Menu;
    }

    pub fn phase(&self) -> GamePhase {
        *self.world.resource::<GamePhase>()
    }

    /// Briefing for the current (or last) mission.
    pub fn mission(&self) -> &MissionIntel {
        self.world.resource::<MissionIntel>()
    }

    /// Advance the clock by `dt_ms` and run one tick.
    ///
    /// No-op unless a mission is in progress.
    pub fn step(&mut self, dt_ms: f64) {
        if self.phase() != GamePhase::Playing {
            return;
        }
        self.world.resource_mut::<SimClock>().advance(dt_ms);
        self.schedule.run(&mut self.world);
    }

    // ------------------------------------------------------------------
    // Host inputs
    // ------------------------------------------------------------------

    /// Resize the arena bounds. Degenerate sizes are ignored.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            *self.world.resource_mut::<Viewport>() = Viewport::new(width, height);
        }
    }

    pub fn viewport(&self) -> Viewport {
        *self.world.resource::<Viewport>()
    }

    /// Replace the input the next tick will read.
    pub fn set_input(&mut self, input: InputSnapshot) {
        self.world.insert_resource(input);
    }

    /// Start a reload. Returns false if one is already running or the
    /// magazine is full.
    pub fn request_reload(&mut self) -> bool {
        let now_ms = self.world.resource::<SimClock>().now_ms;
        let reload_time_ms = self.world.resource::<SimConfig>().reload_time_ms;

        let Ok(mut player) = self.world.get_entity_mut(self.player) else {
            return false;
        };
        let full = player.get::<Magazine>().map_or(true, |m| m.is_full());
        if full {
            return false;
        }
        let Some(mut reload) = player.get_mut::<Reload>() else {
            return false;
        };
        let started = reload.begin(now_ms, reload_time_ms);
        if started {
            debug!(due_at_ms = now_ms + reload_time_ms, "reload started");
        }
        started
    }

    // ------------------------------------------------------------------
    // Outputs
    // ------------------------------------------------------------------

    /// Get a snapshot of the current arena state.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Events raised by the most recent tick.
    pub fn events(&self) -> TickEvents {
        *self.world.resource::<TickEvents>()
    }

    pub fn score(&self) -> u32 {
        self.world.get::<Score>(self.player).map(|s| s.0).unwrap_or(0)
    }

    pub fn wave(&self) -> u32 {
        self.world.resource::<Wave>().0
    }

    /// Get current tick number.
    pub fn current_tick(&self) -> u64 {
        self.world.resource::<SimClock>().tick
    }

    /// Get current simulation time in milliseconds.
    pub fn current_time_ms(&self) -> f64 {
        self.world.resource::<SimClock>().now_ms
    }

    // ------------------------------------------------------------------
    // Host / test helpers
    // ------------------------------------------------------------------

    /// Spawn an enemy of `kind` at `(x, y)`.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, x: f32, y: f32) -> EntityId {
        let id = self.world.resource_mut::<IdAllocator>().next_id();
        let base_speed = self.world.resource::<SimConfig>().enemy_base_speed;
        self.world
            .spawn(EnemyBundle::new(id, kind, Vec2::new(x, y), base_speed));
        id
    }

    pub fn add_obstacle(&mut self, rect: Rect) {
        self.world.resource_mut::<Obstacles>().0.push(rect);
    }

    pub fn clear_obstacles(&mut self) {
        self.world.resource_mut::<Obstacles>().0.clear();
    }

    pub fn obstacles(&self) -> &[Rect] {
        &self.world.resource::<Obstacles>().0
    }

    /// Teleport the player. No bounds or obstacle checks.
    pub fn set_player_position(&mut self, x: f32, y: f32) {
        if let Some(mut pos) = self.world.get_mut::<Position>(self.player) {
            pos.0 = Vec2::new(x, y);
        }
    }

    /// Teleport an ally. Returns false for an unknown slot.
    pub fn set_ally_position(&mut self, slot: usize, x: f32, y: f32) -> bool {
        let Some(&entity) = self.allies.get(slot) else {
            return false;
        };
        match self.world.get_mut::<Position>(entity) {
            Some(mut pos) => {
                pos.0 = Vec2::new(x, y);
                true
            }
            None => false,
        }
    }

    /// Pause or resume the spawn director.
    pub fn set_spawning(&mut self, enabled: bool) {
        self.world.resource_mut::<SpawnDirector>().enabled = enabled;
    }

    pub fn player_entity(&self) -> Entity {
        self.player
    }

    pub fn ally_entity(&self, slot: usize) -> Option<Entity> {
        self.allies.get(slot).copied()
    }

    /// Get the spatial grid reference (for debugging/visualization).
    pub fn spatial_grid(&self) -> Option<&SpatialGrid> {
        self.world.get_resource::<SpatialGrid>()
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for ArenaSim {
    fn default() -> Self {
        Self::new()
    }
}
