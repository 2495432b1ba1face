//! Capacities and framebuffer configuration.

use crate::util::pixfmt::{ColorFormat, DepthFormat};

/// Depth of the projection matrix stack.
pub const PROJECTION_STACK_DEPTH: usize = 2;
/// Depth of the model-view matrix stack.
pub const MODELVIEW_STACK_DEPTH: usize = 8;
/// Depth of the texture matrix stack.
pub const TEXTURE_STACK_DEPTH: usize = 4;

/// Minimum `w` of a vertex that survives clipping.
pub const CLIP_EPSILON: f32 = 1e-4;

/// Capacity of the clipped polygon buffer.
///
/// Each clip plane can add at most one vertex to a convex polygon; a quad
/// clipped against the w plane, six frustum planes and four scissor
/// planes thus never exceeds 15 vertices.
pub const MAX_POLYGON_VERTS: usize = 16;

/// Upper bound of the point size.
pub const MAX_POINT_SIZE: f32 = 64.0;
/// Upper bound of the line width.
pub const MAX_LINE_WIDTH: f32 = 64.0;

/// Maximum framebuffer width or height, in pixels.
pub const MAX_FRAMEBUF_DIM: u32 = 16384;

/// Framebuffer and resource configuration of a
/// [`Context`][crate::ctx::Context].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Storage format of the color buffer.
    pub color_format: ColorFormat,
    /// Storage format of the depth buffer.
    pub depth_format: DepthFormat,
    /// Capacity of the texture object store, including the default
    /// texture with id 0.
    pub max_textures: usize,
}

impl Default for Config {
    /// Returns the default configuration:
    /// * color format: 32-bit RGBA,
    /// * depth format: 16-bit,
    /// * max textures: 128.
    fn default() -> Self {
        Self {
            color_format: ColorFormat::R8G8B8A8,
            depth_format: DepthFormat::D16,
            max_textures: 128,
        }
    }
}
