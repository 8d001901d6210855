//! ECS Components for the arena simulation.
//!
//! Components are pure data containers attached to entities.
//! All game logic lives in systems that query these components.
//!
//! Every simulated thing (player, allies, enemies, bullets, particles) is
//! built from the same identity + geometry set (`EntityId`, `Position`,
//! `Velocity`, `Radius`, `Active`) plus a kind marker that systems filter on.

use bevy_ecs::prelude::*;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

// ============================================================================
// COLORS
// ============================================================================

/// Render colors handed to the frame sink.
pub mod colors {
    pub const PLAYER: &str = "#34d399";
    pub const ALLY: &str = "#3b82f6";
    pub const ENEMY_GRUNT: &str = "#ef4444";
    pub const ENEMY_BRUTE: &str = "#7f1d1d";
    pub const ENEMY_RUNNER: &str = "#f87171";
    pub const BULLET: &str = "#facc15";
    pub const BULLET_ALLY: &str = "#60a5fa";
    pub const BULLET_ENEMY: &str = "#ef4444";
    pub const OBSTACLE: &str = "#334155";
    pub const BLOOD: &str = "#991b1b";
    pub const DEBRIS: &str = "#cbd5e1";
}

// ============================================================================
// IDENTITY / SPATIAL COMPONENTS
// ============================================================================

/// Stable identity exposed to the host. Never reused within a world.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Position in viewport units (x right, y down).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Position(pub Vec2);

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }
}

/// Displacement applied per tick.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity(pub Vec2);

/// Collision disc radius.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Radius(pub f32);

/// Logical liveness. `Active(false)` entities are purged at end of tick.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Active(pub bool);

impl Default for Active {
    fn default() -> Self {
        Self(true)
    }
}

impl Active {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.0
    }

    pub fn deactivate(&mut self) {
        self.0 = false;
    }
}

/// Facing/aim direction in radians.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Facing(pub f32);

/// Per-tick movement speed.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Speed(pub f32);

/// Side an actor fights for. Used by the spatial grid.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Squad,
    Hostile,
}

// ============================================================================
// COMBAT COMPONENTS
// ============================================================================

/// Health of an actor, always within `[0, max]`.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn restore(&mut self) {
        self.current = self.max;
    }
}

/// Player ammunition, always within `[0, max]`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Magazine {
    pub ammo: u32,
    pub max: u32,
}

impl Magazine {
    pub fn new(max: u32) -> Self {
        Self { ammo: max, max }
    }

    pub fn is_full(&self) -> bool {
        self.ammo >= self.max
    }

    pub fn is_empty(&self) -> bool {
        self.ammo == 0
    }

    pub fn consume(&mut self) {
        self.ammo = self.ammo.saturating_sub(1);
    }

    pub fn refill(&mut self) {
        self.ammo = self.max;
    }
}

/// Single in-flight reload, completing at `due_at_ms`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Reload {
    pub due_at_ms: Option<f64>,
}

impl Reload {
    pub fn is_reloading(&self) -> bool {
        self.due_at_ms.is_some()
    }

    /// Schedule a reload. Returns false if one is already in flight.
    pub fn begin(&mut self, now_ms: f64, duration_ms: f64) -> bool {
        if self.is_reloading() {
            return false;
        }
        self.due_at_ms = Some(now_ms + duration_ms);
        true
    }

    /// Resolve the reload if it is due. Returns true exactly once per reload.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.due_at_ms {
            Some(due) if now_ms >= due => {
                self.due_at_ms = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.due_at_ms = None;
    }
}

/// Fire-rate gate shared by the player and allies.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct FireControl {
    pub last_fired_ms: Option<f64>,
}

impl FireControl {
    pub fn ready(&self, now_ms: f64, fire_rate_ms: f64) -> bool {
        match self.last_fired_ms {
            Some(last) => now_ms - last >= fire_rate_ms,
            None => true,
        }
    }

    pub fn record(&mut self, now_ms: f64) {
        self.last_fired_ms = Some(now_ms);
    }
}

// ============================================================================
// PLAYER COMPONENTS
// ============================================================================

/// Marker for the single player entity.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Player score. Only ever increases.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score(pub u32);

/// Display name of the equipped weapon.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct Weapon(pub String);

// ============================================================================
// SQUAD COMPONENTS
// ============================================================================

/// AI squadmate bound to a formation slot.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ally {
    pub slot: usize,
}

/// What an ally decided to do this tick.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AllyState {
    #[default]
    Idle,
    Moving,
    Shooting,
}

impl AllyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllyState::Idle => "IDLE",
            AllyState::Moving => "MOVING",
            AllyState::Shooting => "SHOOTING",
        }
    }
}

// ============================================================================
// ENEMY COMPONENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Grunt,
    Brute,
    Runner,
}

/// Fixed per-kind stats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub radius: f32,
    pub health: f32,
    pub speed: f32,
}

impl EnemyKind {
    pub fn stats(&self, base_speed: f32) -> EnemyStats {
        match self {
            EnemyKind::Grunt => EnemyStats { radius: 12.0, health: 50.0, speed: base_speed },
            EnemyKind::Brute => EnemyStats { radius: 20.0, health: 100.0, speed: base_speed * 0.5 },
            EnemyKind::Runner => EnemyStats { radius: 12.0, health: 30.0, speed: base_speed * 1.5 },
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            EnemyKind::Grunt => colors::ENEMY_GRUNT,
            EnemyKind::Brute => colors::ENEMY_BRUTE,
            EnemyKind::Runner => colors::ENEMY_RUNNER,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Grunt => "GRUNT",
            EnemyKind::Brute => "BRUTE",
            EnemyKind::Runner => "RUNNER",
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enemy {
    pub kind: EnemyKind,
}

// ============================================================================
// PROJECTILE / EFFECT COMPONENTS
// ============================================================================

/// Who fired a bullet. `Enemy` is never produced: enemies only deal contact
/// damage, and bullets with this owner are ignored by hit detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Ally,
    Enemy,
}

impl BulletOwner {
    pub fn color(&self) -> &'static str {
        match self {
            BulletOwner::Player => colors::BULLET,
            BulletOwner::Ally => colors::BULLET_ALLY,
            BulletOwner::Enemy => colors::BULLET_ENEMY,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BulletOwner::Player => "PLAYER",
            BulletOwner::Ally => "ALLY",
            BulletOwner::Enemy => "ENEMY",
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    pub damage: f32,
    pub owner: BulletOwner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Chips knocked off an obstacle.
    Debris,
    Blood,
    /// Burst when an ally goes down.
    AllyDown,
}

impl ParticleKind {
    pub fn color(&self) -> &'static str {
        match self {
            ParticleKind::Debris => colors::DEBRIS,
            ParticleKind::Blood => colors::BLOOD,
            ParticleKind::AllyDown => colors::ALLY,
        }
    }
}

/// Cosmetic particle. `alpha` mirrors `life`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub life: f32,
    pub max_life: f32,
    pub alpha: f32,
    pub size: f32,
    pub kind: ParticleKind,
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning the player.
#[derive(Bundle)]
pub struct PlayerBundle {
    pub id: EntityId,
    pub marker: Player,
    pub faction: Faction,
    pub position: Position,
    pub velocity: Velocity,
    pub radius: Radius,
    pub active: Active,
    pub facing: Facing,
    pub health: Health,
    pub magazine: Magazine,
    pub reload: Reload,
    pub fire: FireControl,
    pub score: Score,
    pub weapon: Weapon,
}

impl PlayerBundle {
    pub fn new(id: EntityId, position: Vec2, config: &SimConfig) -> Self {
        Self {
            id,
            marker: Player,
            faction: Faction::Squad,
            position: Position(position),
            velocity: Velocity::default(),
            radius: Radius(config.player_radius),
            active: Active(true),
            facing: Facing(0.0),
            health: Health::new(config.player_max_health),
            magazine: Magazine::new(config.player_max_ammo),
            reload: Reload::default(),
            fire: FireControl::default(),
            score: Score(0),
            weapon: Weapon(config.weapon_name.clone()),
        }
    }
}

/// Bundle for spawning a squadmate.
#[derive(Bundle)]
pub struct AllyBundle {
    pub id: EntityId,
    pub ally: Ally,
    pub faction: Faction,
    pub position: Position,
    pub velocity: Velocity,
    pub radius: Radius,
    pub active: Active,
    pub facing: Facing,
    pub health: Health,
    pub state: AllyState,
    pub fire: FireControl,
}

impl AllyBundle {
    pub fn new(id: EntityId, slot: usize, position: Vec2, config: &SimConfig) -> Self {
        Self {
            id,
            ally: Ally { slot },
            faction: Faction::Squad,
            position: Position(position),
            velocity: Velocity::default(),
            radius: Radius(config.ally_radius),
            active: Active(true),
            facing: Facing(0.0),
            health: Health::new(config.ally_max_health),
            state: AllyState::Idle,
            fire: FireControl::default(),
        }
    }
}

/// Bundle for spawning a hostile.
#[derive(Bundle)]
pub struct EnemyBundle {
    pub id: EntityId,
    pub enemy: Enemy,
    pub faction: Faction,
    pub position: Position,
    pub velocity: Velocity,
    pub radius: Radius,
    pub active: Active,
    pub health: Health,
    pub speed: Speed,
}

impl EnemyBundle {
    pub fn new(id: EntityId, kind: EnemyKind, position: Vec2, base_speed: f32) -> Self {
        let stats = kind.stats(base_speed);
        Self {
            id,
            enemy: Enemy { kind },
            faction: Faction::Hostile,
            position: Position(position),
            velocity: Velocity::default(),
            radius: Radius(stats.radius),
            active: Active(true),
            health: Health::new(stats.health),
            speed: Speed(stats.speed),
        }
    }
}

/// Bundle for spawning a projectile.
#[derive(Bundle)]
pub struct BulletBundle {
    pub id: EntityId,
    pub bullet: Bullet,
    pub position: Position,
    pub velocity: Velocity,
    pub radius: Radius,
    pub active: Active,
    pub facing: Facing,
    pub speed: Speed,
}

/// Bundle for spawning a particle.
#[derive(Bundle)]
pub struct ParticleBundle {
    pub id: EntityId,
    pub particle: Particle,
    pub position: Position,
    pub velocity: Velocity,
    pub radius: Radius,
    pub active: Active,
}
