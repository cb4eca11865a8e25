//! Obstacle spawner
//!
//! A countdown driven by frame time. When it runs out one obstacle is emitted and
//! the countdown is re-armed with a jittered interval. All randomness comes from a
//! seeded PCG stream so a session replays identically for the same seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::ObstacleKind;
use crate::consts::*;

/// Spawn timing and kind selection
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    /// Milliseconds until the next spawn
    pub timer_ms: f64,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            timer_ms: 0.0,
        }
    }

    /// Advance the countdown by `dt_ms`.
    ///
    /// Returns the kind of obstacle to create when the countdown expires. At most
    /// one obstacle is produced per call regardless of how large `dt_ms` is.
    pub fn advance(&mut self, dt_ms: f64) -> Option<ObstacleKind> {
        self.timer_ms -= dt_ms;
        if self.timer_ms > 0.0 {
            return None;
        }

        let kind = if self.rng.random_bool(AIR_OBSTACLE_CHANCE) {
            ObstacleKind::Air
        } else {
            ObstacleKind::Ground
        };
        self.timer_ms = self.next_interval();
        Some(kind)
    }

    /// Draw the next spawn interval in [SPAWN_BASE_MS, SPAWN_BASE_MS + SPAWN_JITTER_MS)
    fn next_interval(&mut self) -> f64 {
        SPAWN_BASE_MS + self.rng.random::<f64>() * SPAWN_JITTER_MS
    }
}
