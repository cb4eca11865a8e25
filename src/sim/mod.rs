//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Seeded RNG only
//! - Frame time is the only clock
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::Rect;
pub use spawner::Spawner;
pub use state::{GameStatus, Obstacle, ObstacleKind, Player, World};
pub use tick::{GameEvent, GravityMode, TickInput, tick};
