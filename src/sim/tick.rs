//! Simulation tick
//!
//! One call advances the world by one displayed frame: spawn, then player physics,
//! then obstacle motion, collision and culling, then score.

use serde::{Deserialize, Serialize};

use super::state::{Obstacle, ObstacleKind, World};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// A jump was requested since the previous tick
    pub jump: bool,
}

/// How vertical motion relates to frame time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GravityMode {
    /// Fixed increment per tick; jump arcs depend on the display refresh rate
    #[default]
    PerTick,
    /// Gravity and vertical motion scaled by frame time relative to 60 Hz
    Scaled,
}

impl GravityMode {
    /// Multiplier applied to vertical motion for a frame of `dt_ms`
    pub fn scale(&self, dt_ms: f64) -> f32 {
        match self {
            GravityMode::PerTick => 1.0,
            GravityMode::Scaled => (dt_ms / REFERENCE_FRAME_MS) as f32,
        }
    }
}

/// Things that happened during a tick, for the host (HUD, audio)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Jumped,
    Spawned { id: u32, kind: ObstacleKind },
    /// Obstacle scrolled off the left edge
    Cleared { id: u32 },
    /// Running score after this tick
    Score(u64),
    /// Collision ended the session
    GameOver { score: u64 },
}

/// Advance the world by `dt_ms` milliseconds.
///
/// Emits exactly one `Score` event, or exactly one `GameOver` event when the player
/// collides with an obstacle. A crashing tick does not add its time to the score.
pub fn tick(
    world: &mut World,
    input: &TickInput,
    dt_ms: f64,
    gravity: GravityMode,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let dt_ms = dt_ms.max(0.0);
    world.time_ticks += 1;

    if input.jump && world.player.try_jump() {
        events.push(GameEvent::Jumped);
    }

    // Spawn
    if let Some(kind) = world.spawner.advance(dt_ms) {
        let id = world.next_entity_id();
        world.obstacles.push(Obstacle::spawn(id, kind, world.speed));
        log::debug!("Spawned {:?} obstacle {} at tick {}", kind, id, world.time_ticks);
        events.push(GameEvent::Spawned { id, kind });
    }

    // Player
    world.player.integrate(gravity.scale(dt_ms));
    world.player.resolve_ground();

    // Move, collide, cull
    let player_rect = world.player.rect();
    let mut crashed = false;
    world.obstacles.retain_mut(|obs| {
        obs.pos.x -= obs.speed;
        if !crashed && player_rect.overlaps(&obs.rect()) {
            crashed = true;
            return false;
        }
        if obs.is_offscreen() {
            events.push(GameEvent::Cleared { id: obs.id });
            return false;
        }
        true
    });

    if crashed {
        events.push(GameEvent::GameOver {
            score: world.display_score(),
        });
        return events;
    }

    world.score += dt_ms * SCORE_PER_MS;
    events.push(GameEvent::Score(world.display_score()));
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// World with spawning pushed far into the future
    fn quiet_world() -> World {
        let mut world = World::new_session(1, DEFAULT_SPEED);
        world.spawner.timer_ms = f64::MAX;
        world
    }

    #[test]
    fn test_rest_state_is_idempotent() {
        let mut world = quiet_world();
        let rest = world.player.pos.y;
        for _ in 0..120 {
            tick(&mut world, &TickInput::default(), FRAME_MS, GravityMode::PerTick);
            assert_eq!(world.player.pos.y, rest);
            assert!(world.player.grounded);
        }
    }

    #[test]
    fn test_jump_arc_returns_to_ground() {
        let mut world = quiet_world();
        let rest = world.player.pos.y;
        let events = tick(
            &mut world,
            &TickInput { jump: true },
            FRAME_MS,
            GravityMode::PerTick,
        );
        assert!(events.contains(&GameEvent::Jumped));
        assert!(world.player.pos.y < rest);

        // Rising phase strictly decreases y
        let mut last = world.player.pos.y;
        while world.player.vel_y < 0.0 {
            tick(&mut world, &TickInput::default(), FRAME_MS, GravityMode::PerTick);
            assert!(world.player.pos.y < last || world.player.vel_y >= 0.0);
            last = world.player.pos.y;
        }

        for _ in 0..60 {
            tick(&mut world, &TickInput::default(), FRAME_MS, GravityMode::PerTick);
        }
        assert!(world.player.grounded);
        assert_eq!(world.player.pos.y, rest);
    }

    #[test]
    fn test_airborne_jump_is_ignored() {
        let mut world = quiet_world();
        tick(&mut world, &TickInput { jump: true }, FRAME_MS, GravityMode::PerTick);
        let vel_before = world.player.vel_y;
        let events = tick(&mut world, &TickInput { jump: true }, FRAME_MS, GravityMode::PerTick);
        assert!(!events.contains(&GameEvent::Jumped));
        assert!((world.player.vel_y - (vel_before + GRAVITY)).abs() < 1e-5);
    }

    #[test]
    fn test_obstacle_moves_by_its_own_speed() {
        let mut world = quiet_world();
        let mut obs = Obstacle::spawn(100, ObstacleKind::Ground, 5.0);
        obs.pos.x = 600.0;
        world.obstacles.push(obs);
        world.speed = 20.0;

        tick(&mut world, &TickInput::default(), FRAME_MS, GravityMode::PerTick);
        assert_eq!(world.obstacles[0].pos.x, 595.0);
        assert_eq!(world.obstacles[0].speed, 5.0);
    }

    #[test]
    fn test_offscreen_obstacle_is_culled() {
        let mut world = quiet_world();
        let mut obs = Obstacle::spawn(5, ObstacleKind::Air, 7.0);
        obs.pos.x = -25.0;
        world.obstacles.push(obs);

        let events = tick(&mut world, &TickInput::default(), FRAME_MS, GravityMode::PerTick);
        assert!(world.obstacles.is_empty());
        assert!(events.contains(&GameEvent::Cleared { id: 5 }));
    }

    #[test]
    fn test_collision_ends_session_once() {
        let mut world = quiet_world();
        world.score = 12.7;
        for id in 1..=2 {
            let mut obs = Obstacle::spawn(id, ObstacleKind::Ground, 7.0);
            obs.pos.x = PLAYER_X + 7.0;
            world.obstacles.push(obs);
        }

        let events = tick(&mut world, &TickInput::default(), FRAME_MS, GravityMode::PerTick);
        let game_overs: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .collect();
        assert_eq!(game_overs, vec![&GameEvent::GameOver { score: 12 }]);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Score(_))));
        // Colliding obstacle removed, the other left in place
        assert_eq!(world.obstacles.len(), 1);
        assert_eq!(world.obstacles[0].id, 2);
        assert_eq!(world.score, 12.7);
    }

    #[test]
    fn test_score_follows_elapsed_time() {
        let mut world = quiet_world();
        let events = tick(&mut world, &TickInput::default(), 250.0, GravityMode::PerTick);
        assert_eq!(events, vec![GameEvent::Score(2)]);
        tick(&mut world, &TickInput::default(), 100.0, GravityMode::PerTick);
        assert_eq!(world.display_score(), 3);
    }

    #[test]
    fn test_negative_delta_does_not_reduce_score() {
        let mut world = quiet_world();
        world.score = 5.0;
        tick(&mut world, &TickInput::default(), -500.0, GravityMode::PerTick);
        assert_eq!(world.score, 5.0);
    }

    #[test]
    fn test_scaled_gravity_matches_per_tick_at_reference_rate() {
        let mut a = quiet_world();
        let mut b = quiet_world();
        let jump = TickInput { jump: true };
        tick(&mut a, &jump, REFERENCE_FRAME_MS, GravityMode::PerTick);
        tick(&mut b, &jump, REFERENCE_FRAME_MS, GravityMode::Scaled);
        for _ in 0..10 {
            tick(&mut a, &TickInput::default(), REFERENCE_FRAME_MS, GravityMode::PerTick);
            tick(&mut b, &TickInput::default(), REFERENCE_FRAME_MS, GravityMode::Scaled);
        }
        assert!((a.player.pos.y - b.player.pos.y).abs() < 1e-3);
    }

    #[test]
    fn test_scaled_gravity_falls_further_on_long_frames() {
        let mut a = quiet_world();
        let mut b = quiet_world();
        let jump = TickInput { jump: true };
        tick(&mut a, &jump, REFERENCE_FRAME_MS, GravityMode::Scaled);
        tick(&mut b, &jump, REFERENCE_FRAME_MS * 2.0, GravityMode::Scaled);
        assert!(b.player.pos.y < a.player.pos.y);
    }
}
