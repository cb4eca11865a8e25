//! Byte Runner - a neon side-scrolling runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, world state)
//! - `game_loop`: Session state machine, input queue and frame scheduling
//! - `renderer`: Procedural 2D shapes and the WebGPU pipeline that draws them
//! - `settings`: Persisted player preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod game_loop;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use game_loop::{FrameHandle, FrameScheduler, GameLoop, InputHandle, TransitionError};
pub use settings::Settings;
pub use sim::{GameEvent, GameStatus, GravityMode, World};

/// Game configuration constants
pub mod consts {
    /// Logical world dimensions
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 400.0;
    /// Ground line sits this far above the bottom edge
    pub const GROUND_OFFSET: f32 = 60.0;
    pub const GROUND_Y: f32 = WORLD_HEIGHT - GROUND_OFFSET;

    /// Player defaults
    pub const PLAYER_X: f32 = 80.0;
    pub const PLAYER_WIDTH: f32 = 30.0;
    pub const PLAYER_HEIGHT: f32 = 50.0;
    pub const JUMP_FORCE: f32 = 12.0;

    /// Downward acceleration added per tick while airborne
    pub const GRAVITY: f32 = 0.6;
    /// Nominal frame duration (60 Hz) used when gravity is delta-scaled
    pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;
    /// Frame deltas above this are treated as a stall (tab switch, debugger)
    pub const MAX_FRAME_DELTA_MS: f64 = 250.0;

    /// Obstacle geometry
    pub const OBSTACLE_WIDTH: f32 = 30.0;
    pub const OBSTACLE_HEIGHT: f32 = 40.0;
    /// Top edge of an AIR obstacle, measured up from the ground line
    pub const AIR_OBSTACLE_LIFT: f32 = 80.0;
    /// Probability that a spawned obstacle is AIR
    pub const AIR_OBSTACLE_CHANCE: f64 = 0.3;

    /// Spawn interval is SPAWN_BASE_MS + U[0, 1) * SPAWN_JITTER_MS
    pub const SPAWN_BASE_MS: f64 = 1000.0;
    pub const SPAWN_JITTER_MS: f64 = 800.0;

    /// Score points per elapsed millisecond
    pub const SCORE_PER_MS: f64 = 0.01;

    /// Obstacle speed bounds (world units per tick)
    pub const DEFAULT_SPEED: f32 = 7.0;
    pub const MIN_SPEED: f32 = 1.0;
    pub const MAX_SPEED: f32 = 40.0;
}

/// Clamp an externally supplied speed into the playable range.
///
/// Non-finite values fall back to the default speed.
pub fn sanitize_speed(speed: f32) -> f32 {
    use consts::*;
    if !speed.is_finite() {
        return DEFAULT_SPEED;
    }
    speed.clamp(MIN_SPEED, MAX_SPEED)
}
