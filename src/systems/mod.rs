//! ECS Systems for the arena simulation.
//!
//! Systems contain the game logic that operates on components.
//!
//! ## Tick Order
//!
//! `ArenaSim` chains the systems in one fixed order; each step reads what the
//! previous one wrote:
//!
//! **Open** - `begin_tick_system` bumps the tick and clears events,
//! `reload_system` finishes a due reload.
//!
//! **Squad** - `player_control_system` (move / aim / fire),
//! `spatial_grid_update_system` (sight data), `ally_squad_system`.
//!
//! **Projectiles & horde** - `bullet_advance_system`, `spawn_director_system`,
//! `enemy_pursuit_system`, `enemy_movement_system`.
//!
//! **Resolution** - `contact_damage_system`, `bullet_hit_system`.
//!
//! **Close** - `particle_decay_system`, `purge_inactive_system`.

pub mod ai;
pub mod cleanup;
pub mod combat;
pub mod movement;
pub mod particles;
pub mod player;
pub mod spawn;

pub use ai::*;
pub use cleanup::*;
pub use combat::*;
pub use movement::*;
pub use particles::*;
pub use player::*;
pub use spawn::*;
