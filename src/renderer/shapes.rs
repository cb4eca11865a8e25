//! Shape generation for 2D primitives
//!
//! [`ShapeBatch`] tessellates every draw call into triangles in world coordinates.
//! The pipeline maps them to the viewport when the frame is submitted.

use glam::Vec2;

use super::surface::{DrawSurface, Glow};
use super::vertex::{Color, Vertex, colors};
use crate::sim::Rect;

/// Number of translucent layers used to fake a blur
const GLOW_LAYERS: u32 = 4;
/// Alpha of the innermost glow layer
const GLOW_ALPHA: f32 = 0.3;

/// Generate vertices for a filled rectangle (two triangles)
pub fn rect(rect: Rect, color: Color) -> [Vertex; 6] {
    let (l, t, r, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());
    [
        Vertex::new(l, t, color),
        Vertex::new(l, b, color),
        Vertex::new(r, t, color),
        Vertex::new(r, t, color),
        Vertex::new(l, b, color),
        Vertex::new(r, b, color),
    ]
}

/// Generate vertices for a line segment of the given width
pub fn line(from: Vec2, to: Vec2, width: f32, color: Color) -> [Vertex; 6] {
    let dir = (to - from).normalize_or_zero();
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);

    let a = from + perp;
    let b = from - perp;
    let c = to + perp;
    let d = to - perp;

    [
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(d.x, d.y, color),
    ]
}

/// Generate vertices for a glow halo behind `target`.
///
/// Outermost layer first so the stack fades toward the edge.
pub fn glow(target: Rect, glow: Glow) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((GLOW_LAYERS * 6) as usize);
    for i in (1..=GLOW_LAYERS).rev() {
        let t = i as f32 / GLOW_LAYERS as f32;
        let alpha = GLOW_ALPHA * (1.0 - t) + GLOW_ALPHA / GLOW_LAYERS as f32;
        let layer = target.inflate(glow.blur * t);
        vertices.extend_from_slice(&rect(layer, colors::with_alpha(glow.color, alpha)));
    }
    vertices
}

/// One frame worth of triangles plus the clear color
#[derive(Debug, Clone)]
pub struct ShapeBatch {
    clear_color: Color,
    vertices: Vec<Vertex>,
}

impl Default for ShapeBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeBatch {
    pub fn new() -> Self {
        Self {
            clear_color: colors::BACKGROUND,
            vertices: Vec::new(),
        }
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl DrawSurface for ShapeBatch {
    fn clear(&mut self, color: Color) {
        self.clear_color = color;
        self.vertices.clear();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.vertices.extend_from_slice(&line(from, to, width, color));
    }

    fn fill_rect(&mut self, target: Rect, color: Color, halo: Option<Glow>) {
        if let Some(halo) = halo {
            self.vertices.extend(glow(target, halo));
        }
        self.vertices.extend_from_slice(&rect(target, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::render_world;
    use crate::sim::World;

    #[test]
    fn test_rect_covers_corners() {
        let verts = rect(Rect::new(10.0, 20.0, 30.0, 40.0), colors::NEON_GREEN);
        let xs: Vec<f32> = verts.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = verts.iter().map(|v| v.position[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), 10.0);
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 40.0);
        assert_eq!(ys.iter().cloned().fold(f32::MAX, f32::min), 20.0);
        assert_eq!(ys.iter().cloned().fold(f32::MIN, f32::max), 60.0);
    }

    #[test]
    fn test_horizontal_line_thickness() {
        let verts = line(Vec2::new(0.0, 100.0), Vec2::new(800.0, 100.0), 2.0, colors::NEON_GREEN);
        for v in &verts {
            assert!((v.position[1] - 100.0).abs() <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn test_glow_layers_fade_outward() {
        let halo = Glow {
            blur: 10.0,
            color: colors::ALERT_RED,
        };
        let verts = glow(Rect::new(0.0, 0.0, 10.0, 10.0), halo);
        assert_eq!(verts.len(), (GLOW_LAYERS * 6) as usize);
        // First layer is the widest and faintest
        assert_eq!(verts[0].position, [-10.0, -10.0]);
        let first_alpha = verts[0].color[3];
        let last_alpha = verts[verts.len() - 1].color[3];
        assert!(first_alpha < last_alpha);
    }

    #[test]
    fn test_clear_resets_batch() {
        let mut batch = ShapeBatch::new();
        batch.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), colors::NEON_GREEN, None);
        assert_eq!(batch.vertices().len(), 6);
        batch.clear(colors::ALERT_RED);
        assert!(batch.is_empty());
        assert_eq!(batch.clear_color(), colors::ALERT_RED);
    }

    #[test]
    fn test_world_frame_vertex_count() {
        let world = World::new_session(1, 7.0);
        let mut batch = ShapeBatch::new();
        render_world(&world, &mut batch, true);
        // Ground line + player glow layers + player
        assert_eq!(batch.vertices().len(), 6 + (GLOW_LAYERS as usize * 6) + 6);

        render_world(&world, &mut batch, false);
        assert_eq!(batch.vertices().len(), 12);
    }
}
