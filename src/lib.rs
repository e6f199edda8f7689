//! Retained-mode 2D vector drawing.
//!
//! A [`Graphics`](graphics::Graphics) facade records drawing calls into a
//! graphics render node while keeping a running content bounding box for its
//! display target. Render nodes are rasterized by a
//! [`NodeRasterizer`](renderer::NodeRasterizer) into a
//! [`RenderBuffer`](buffer::RenderBuffer); the same path is used for pixel
//! accurate hit-testing.

pub mod buffer;
pub mod color;
pub mod display;
pub mod error;
pub mod geometry;
pub mod graphics;
pub mod node;
pub mod number;
pub mod path;
pub mod renderer;
pub mod transform;

pub mod prelude {
    pub use crate::buffer::{PixmapBuffer, RenderBuffer, ScratchBuffer};
    pub use crate::color::Color;
    pub use crate::display::{DisplayTarget, Shape};
    pub use crate::error::{RenderError, Result};
    pub use crate::geometry::{Rect, Region};
    pub use crate::graphics::{Graphics, LineStyle};
    pub use crate::node::{
        BitmapData, NodeKind, RenderNode, RenderNodeRef, RenderNodeType, TextFormat,
    };
    pub use crate::number::{number_or_zero, IntoNumber};
    pub use crate::path::{CapsStyle, GradientType, JointStyle, LineScaleMode};
    pub use crate::renderer::{CpuRasterizer, NodeRasterizer, RendererConfig};
    pub use crate::transform::Transform;
}
