//! Rendering module
//!
//! Procedural shapes only: rectangles, lines and a layered glow, batched into
//! triangles and drawn with a single WebGPU pipeline.

pub mod pipeline;
pub mod shapes;
pub mod surface;
pub mod vertex;

pub use pipeline::{RenderSetupError, RenderState};
pub use shapes::ShapeBatch;
pub use surface::{DrawSurface, Glow, render_world};
pub use vertex::{Color, Vertex, colors};
