//! Simulation tuning.
//!
//! Every numeric constant the systems use lives here so hosts can override a
//! subset from JSON. Speeds are in viewport units per tick (one tick per
//! rendered frame); durations are in milliseconds.

use crate::error::{SimError, SimResult};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for the arena simulation.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Initial viewport size (the host updates it live via `set_viewport`).
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Seed for the arena RNG (obstacles, spawns, particles).
    pub seed: u64,

    // Player
    pub player_speed: f32,
    pub player_radius: f32,
    pub player_max_health: f32,
    pub player_max_ammo: u32,
    pub weapon_name: String,
    pub reload_time_ms: f64,
    pub fire_rate_ms: f64,

    // Squad
    pub ally_speed: f32,
    pub ally_radius: f32,
    pub ally_max_health: f32,
    /// Enemies farther than this are invisible to allies.
    pub ally_sight_range: f32,
    /// Allies farther than this from the player always regroup.
    pub ally_leash_distance: f32,
    /// Distance at which an ally counts as being on its slot.
    pub ally_arrival_tolerance: f32,
    /// Formation slot offsets relative to the player, one per ally.
    pub formation_offsets: [(f32, f32); 2],
    /// Initial placement relative to the player at world construction.
    pub ally_spawn_offsets: [(f32, f32); 2],

    // Bullets
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    pub bullet_damage: f32,
    /// Distance ahead of the shooter where a bullet appears.
    pub muzzle_offset: f32,

    // Enemies
    pub enemy_base_speed: f32,
    pub enemy_spawn_interval_ms: f64,
    /// Cadence reduction per wave.
    pub enemy_spawn_step_ms: f64,
    pub enemy_spawn_floor_ms: f64,
    /// How far beyond the viewport edge enemies appear.
    pub enemy_spawn_buffer: f32,
    pub brute_chance: f32,
    pub runner_chance: f32,
    /// Health lost per tick per touching enemy.
    pub contact_damage: f32,

    // Scoring
    pub kill_score: u32,
    /// Wave advances whenever the score lands on a multiple of this.
    pub wave_score_step: u32,

    // Arena
    pub obstacle_count: u32,
    pub obstacle_min_size: f32,
    pub obstacle_max_extra: f32,
    /// Obstacles are placed with their corner at most this far from the far edge.
    pub obstacle_edge_margin: f32,
    /// Obstacles whose center is within this distance of a spawn point are dropped.
    pub obstacle_clear_radius: f32,

    // Particles
    pub particle_decay: f32,
    pub particle_max_speed: f32,
    pub debris_particles: u32,
    pub hit_particles: u32,
    pub kill_particles: u32,
    pub contact_particles: u32,
    pub ally_down_particles: u32,

    /// Cell size for the spatial grid used by ally sight queries.
    pub spatial_cell_size: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            viewport_height: 720.0,
            seed: 0x5eed_a11e,

            player_speed: 4.0,
            player_radius: 12.0,
            player_max_health: 100.0,
            player_max_ammo: 30,
            weapon_name: "ASSAULT RIFLE".to_string(),
            reload_time_ms: 1500.0,
            fire_rate_ms: 100.0,

            ally_speed: 3.5,
            ally_radius: 12.0,
            ally_max_health: 150.0,
            ally_sight_range: 600.0,
            ally_leash_distance: 300.0,
            ally_arrival_tolerance: 10.0,
            formation_offsets: [(-60.0, -60.0), (60.0, -60.0)],
            ally_spawn_offsets: [(-50.0, -50.0), (50.0, -50.0)],

            bullet_speed: 15.0,
            bullet_radius: 2.0,
            bullet_damage: 25.0,
            muzzle_offset: 20.0,

            enemy_base_speed: 2.0,
            enemy_spawn_interval_ms: 1500.0,
            enemy_spawn_step_ms: 60.0,
            enemy_spawn_floor_ms: 400.0,
            enemy_spawn_buffer: 50.0,
            brute_chance: 0.2,
            runner_chance: 0.3,
            contact_damage: 0.5,

            kill_score: 100,
            wave_score_step: 1000,

            obstacle_count: 8,
            obstacle_min_size: 60.0,
            obstacle_max_extra: 120.0,
            obstacle_edge_margin: 100.0,
            obstacle_clear_radius: 200.0,

            particle_decay: 0.05,
            particle_max_speed: 3.0,
            debris_particles: 3,
            hit_particles: 5,
            kill_particles: 15,
            contact_particles: 1,
            ally_down_particles: 20,

            spatial_cell_size: 100.0,
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) config from JSON and validate it.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: SimConfig = serde_json::from_str(json).map_err(SimError::Config)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the simulation degenerate.
    pub fn validate(&self) -> SimResult<()> {
        let positive = [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("player_speed", self.player_speed),
            ("player_radius", self.player_radius),
            ("player_max_health", self.player_max_health),
            ("ally_speed", self.ally_speed),
            ("ally_radius", self.ally_radius),
            ("ally_max_health", self.ally_max_health),
            ("bullet_speed", self.bullet_speed),
            ("bullet_radius", self.bullet_radius),
            ("bullet_damage", self.bullet_damage),
            ("enemy_base_speed", self.enemy_base_speed),
            ("particle_decay", self.particle_decay),
            ("spatial_cell_size", self.spatial_cell_size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        let durations = [
            ("reload_time_ms", self.reload_time_ms),
            ("fire_rate_ms", self.fire_rate_ms),
            ("enemy_spawn_interval_ms", self.enemy_spawn_interval_ms),
            ("enemy_spawn_floor_ms", self.enemy_spawn_floor_ms),
        ];
        for (name, value) in durations {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }

        if self.player_max_ammo == 0 {
            return Err(SimError::InvalidConfig("player_max_ammo must be at least 1".into()));
        }
        if self.kill_score == 0 || self.wave_score_step == 0 {
            return Err(SimError::InvalidConfig(
                "kill_score and wave_score_step must be non-zero".into(),
            ));
        }
        for (name, chance) in [("brute_chance", self.brute_chance), ("runner_chance", self.runner_chance)] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {chance}"
                )));
            }
        }
        Ok(())
    }

    /// Milliseconds between enemy spawns at the given wave, floored.
    pub fn spawn_interval_ms(&self, wave: u32) -> f64 {
        (self.enemy_spawn_interval_ms - wave as f64 * self.enemy_spawn_step_ms)
            .max(self.enemy_spawn_floor_ms)
    }
}
