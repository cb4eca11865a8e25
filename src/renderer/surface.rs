//! Drawing surface abstraction and the scene painter
//!
//! The simulation never talks to a GPU. It paints through [`DrawSurface`], which the
//! WebGPU path implements with a vertex batch and tests implement with a recorder.

use glam::Vec2;

use super::vertex::{Color, colors};
use crate::consts::*;
use crate::sim::{Rect, World};

/// Blur radius of the neon glow, in world units
pub const GLOW_BLUR: f32 = 10.0;
/// Thickness of the ground line
pub const GROUND_LINE_WIDTH: f32 = 2.0;

/// Soft halo drawn around a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub blur: f32,
    pub color: Color,
}

/// A 2D target in world coordinates (origin top-left, y down)
pub trait DrawSurface {
    /// Fill the whole surface with `color`, discarding what was drawn before
    fn clear(&mut self, color: Color);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);
    fn fill_rect(&mut self, rect: Rect, color: Color, glow: Option<Glow>);
}

/// Paint one frame of `world`. Read-only with respect to the simulation.
///
/// Order: background, ground line, obstacles, player.
pub fn render_world(world: &World, surface: &mut dyn DrawSurface, glow: bool) {
    let halo = |color: Color| {
        glow.then_some(Glow {
            blur: GLOW_BLUR,
            color,
        })
    };

    surface.clear(colors::BACKGROUND);
    surface.stroke_line(
        Vec2::new(0.0, GROUND_Y),
        Vec2::new(WORLD_WIDTH, GROUND_Y),
        GROUND_LINE_WIDTH,
        colors::NEON_GREEN,
    );

    for obstacle in &world.obstacles {
        surface.fill_rect(obstacle.rect(), colors::ALERT_RED, halo(colors::ALERT_RED));
    }

    surface.fill_rect(
        world.player.rect(),
        colors::NEON_GREEN,
        halo(colors::NEON_GREEN),
    );
}
