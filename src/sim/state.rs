//! World state and core simulation types
//!
//! Everything one session mutates lives in [`World`]. A fresh world comes only
//! from [`World::new_session`], so first start and every retry share one reset path.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::spawner::Spawner;
use crate::consts::*;

/// Session status, owned by the surrounding application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// Idle, waiting for a start signal
    #[default]
    Start,
    /// Simulation running
    Playing,
    /// Frozen after a collision, final score available
    GameOver,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Start => "START",
            GameStatus::Playing => "PLAYING",
            GameStatus::GameOver => "GAMEOVER",
        }
    }

    /// Parse an external status signal. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "START" => Some(GameStatus::Start),
            "PLAYING" => Some(GameStatus::Playing),
            "GAMEOVER" | "GAME_OVER" => Some(GameStatus::GameOver),
            _ => None,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner; x never changes after creation
    pub pos: Vec2,
    pub size: Vec2,
    /// Vertical velocity (negative is up)
    pub vel_y: f32,
    pub jump_force: f32,
    pub grounded: bool,
    /// Reserved for a slide move
    #[serde(default)]
    pub sliding: bool,
    #[serde(default)]
    pub slide_timer: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, GROUND_Y - PLAYER_HEIGHT),
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            vel_y: 0.0,
            jump_force: JUMP_FORCE,
            grounded: true,
            sliding: false,
            slide_timer: 0.0,
        }
    }
}

impl Player {
    /// y coordinate at which the player rests on the ground
    pub fn rest_y(&self) -> f32 {
        GROUND_Y - self.size.y
    }

    pub fn rect(&self) -> Rect {
        Rect {
            min: self.pos,
            size: self.size,
        }
    }

    /// Start a jump. Ignored while airborne.
    pub fn try_jump(&mut self) -> bool {
        if !self.grounded {
            return false;
        }
        self.vel_y = -self.jump_force;
        self.grounded = false;
        true
    }

    /// Integrate one step of vertical motion. `scale` is 1.0 for a reference tick.
    pub fn integrate(&mut self, scale: f32) {
        if !self.grounded {
            self.vel_y += GRAVITY * scale;
        }
        self.pos.y += self.vel_y * scale;
    }

    /// Clamp to the ground line if the lower edge passed it
    pub fn resolve_ground(&mut self) {
        if self.pos.y + self.size.y > GROUND_Y {
            self.pos.y = self.rest_y();
            self.vel_y = 0.0;
            self.grounded = true;
        }
    }
}

/// Obstacle placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Sits on the ground line
    Ground,
    /// Floats above the ground
    Air,
}

impl ObstacleKind {
    /// Top edge for an obstacle of this kind
    pub fn top_y(&self) -> f32 {
        match self {
            ObstacleKind::Ground => GROUND_Y - OBSTACLE_HEIGHT,
            ObstacleKind::Air => GROUND_Y - AIR_OBSTACLE_LIFT,
        }
    }
}

/// A hazard scrolling toward the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub pos: Vec2,
    pub size: Vec2,
    /// Leftward speed per tick, fixed at spawn
    pub speed: f32,
}

impl Obstacle {
    /// Create an obstacle of `kind` at the right edge of the world
    pub fn spawn(id: u32, kind: ObstacleKind, speed: f32) -> Self {
        Self {
            id,
            kind,
            pos: Vec2::new(WORLD_WIDTH, kind.top_y()),
            size: Vec2::new(OBSTACLE_WIDTH, OBSTACLE_HEIGHT),
            speed,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            min: self.pos,
            size: self.size,
        }
    }

    /// Fully scrolled past the left edge
    pub fn is_offscreen(&self) -> bool {
        self.pos.x + self.size.x <= 0.0
    }
}

/// Mutable state of one session
#[derive(Debug, Clone)]
pub struct World {
    /// Seed this session's spawner was built from
    pub seed: u64,
    pub player: Player,
    /// Live obstacles, in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Elapsed-time score accumulator
    pub score: f64,
    /// Obstacle speed handed to the next spawn
    pub speed: f32,
    pub spawner: Spawner,
    /// Ticks simulated this session
    pub time_ticks: u64,
    next_id: u32,
}

impl World {
    /// Initial state for a new session.
    ///
    /// The spawn countdown starts at zero, so the first obstacle appears on the first tick.
    pub fn new_session(seed: u64, speed: f32) -> Self {
        Self {
            seed,
            player: Player::default(),
            obstacles: Vec::new(),
            score: 0.0,
            speed: crate::sanitize_speed(speed),
            spawner: Spawner::new(seed),
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Integer score shown to the player
    pub fn display_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }

    /// Allocate a new obstacle ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
