//! Squad Arena - Simulation Core
//!
//! A tick-driven ECS simulation of a top-down squad shooter: one player and two
//! AI squadmates against endless waves of enemies in an obstacle-strewn arena.
//! Uses `bevy_ecs` for the entity-component-system architecture.

pub mod api;
pub mod arena;
pub mod components;
pub mod config;
pub mod error;
pub mod input;
pub mod math;
pub mod mission;
pub mod registry;
pub mod spatial;
pub mod systems;
pub mod world;

pub use api::ArenaSim;
pub use components::*;
pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use input::{
    Aim, ClientCapabilities, ControlScheme, Direction, InputDevice, InputSnapshot, PointerKeys,
    StickSlot, TouchSticks,
};
pub use math::Rect;
pub use mission::MissionIntel;
pub use registry::{GamePhase, TickEvents, Viewport};
pub use spatial::{SpatialEntry, SpatialGrid};
pub use systems::*;
pub use world::Snapshot;
