//! World-level resources shared by all systems: identity allocation, the
//! simulation clock, the live viewport, the obstacle set, progression
//! counters and the per-tick outbound events.

use bevy_ecs::prelude::*;
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::components::EntityId;
use crate::math::Rect;

/// Hands out `EntityId`s. Ids are never reused within a world.
#[derive(Resource, Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        self.next += 1;
        EntityId(self.next)
    }
}

/// Seeded RNG for everything random in the arena.
#[derive(Resource)]
pub struct ArenaRng(pub ChaCha8Rng);

impl ArenaRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

/// Simulation time. `now_ms` is advanced by the host's frame delta before
/// each tick.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimClock {
    pub now_ms: f64,
    pub tick: u64,
}

impl SimClock {
    pub fn advance(&mut self, dt_ms: f64) {
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.now_ms += dt_ms;
        }
    }
}

/// Current host viewport. Resizable between ticks.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Static obstacles, fixed once the mission starts.
#[derive(Resource, Debug, Clone, Default)]
pub struct Obstacles(pub Vec<Rect>);

impl Obstacles {
    /// True if a disc at `center` would overlap any obstacle.
    pub fn blocks_disc(&self, center: Vec2, radius: f32) -> bool {
        self.0.iter().any(|o| o.overlaps_disc(center, radius))
    }

    /// True if the point lies strictly inside any obstacle.
    pub fn blocks_point(&self, point: Vec2) -> bool {
        self.0.iter().any(|o| o.contains_point(point))
    }
}

/// Difficulty counter. Starts at 1.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wave(pub u32);

impl Default for Wave {
    fn default() -> Self {
        Self(1)
    }
}

/// Top-level game phase.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Menu,
    Playing,
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Menu => "MENU",
            GamePhase::Playing => "PLAYING",
            GamePhase::GameOver => "GAME_OVER",
        }
    }
}

/// Outbound notifications for the frame sink, reset at the start of each
/// tick. Each field is set at most once per tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvents {
    pub score_changed: Option<u32>,
    pub wave_changed: Option<u32>,
    pub game_over: bool,
}

impl TickEvents {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Latch so game-over fires once per mission.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct GameOverLatch {
    pub fired: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let mut ids = IdAllocator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_clock_ignores_bad_deltas() {
        let mut clock = SimClock::default();
        clock.advance(16.0);
        clock.advance(-5.0);
        clock.advance(f64::NAN);
        assert_eq!(clock.now_ms, 16.0);
    }

    #[test]
    fn test_obstacle_queries() {
        let obstacles = Obstacles(vec![Rect::new(10.0, 10.0, 10.0, 10.0)]);
        assert!(obstacles.blocks_point(Vec2::new(15.0, 15.0)));
        assert!(!obstacles.blocks_point(Vec2::new(25.0, 15.0)));
        assert!(obstacles.blocks_disc(Vec2::new(25.0, 15.0), 6.0));
    }
}
