//! Rasterization of render nodes into pixel buffers.

mod path_builder;

use resvg::tiny_skia::{
    self, FillRule, FilterQuality, GradientStop, LineCap, LineJoin, LinearGradient, Paint,
    Pattern, Point, RadialGradient, Shader, SpreadMode, Stroke,
};

use crate::buffer::PixmapBuffer;
use crate::color::Color;
use crate::error::Result;
use crate::node::{BitmapNode, GraphicsNode, GroupNode, NodeKind, RenderNode};
use crate::path::{CapsStyle, FillStyle, GradientFill, GradientType, JointStyle, PathStyle};
use crate::transform::Transform;

pub use path_builder::build_path;

/// Settings for [`CpuRasterizer`] and the buffers it draws into.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub anti_alias: bool,
    pub fill_rule: FillRule,
    /// JPEG quality used by `to_data_url` when none is given, in `0..=1`.
    pub jpeg_quality: f64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            anti_alias: true,
            fill_rule: FillRule::Winding,
            jpeg_quality: 0.92,
        }
    }
}

impl RendererConfig {
    pub fn anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    pub fn fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    pub fn jpeg_quality(mut self, quality: f64) -> Self {
        self.jpeg_quality = quality;
        self
    }
}

/// Something that can draw a render node into a buffer.
pub trait NodeRasterizer {
    /// Draw `node` with `matrix` applied. In hit-test mode vector content is
    /// painted opaque so that its coverage can be read back.
    ///
    /// Returns the number of primitives drawn.
    fn draw_node_to_buffer(
        &mut self,
        node: &RenderNode,
        buffer: &mut PixmapBuffer,
        matrix: &Transform,
        for_hit_test: bool,
    ) -> Result<usize>;
}

/// Transform and alpha in effect while walking a node.
#[derive(Debug, Clone, Copy)]
struct DrawState {
    transform: Transform,
    alpha: f64,
    for_hit_test: bool,
}

/// Software rasterizer built on tiny-skia.
#[derive(Debug, Clone, Default)]
pub struct CpuRasterizer {
    config: RendererConfig,
}

impl CpuRasterizer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    fn draw_node(&self, node: &RenderNode, buffer: &mut PixmapBuffer, state: DrawState) -> usize {
        match node.kind() {
            NodeKind::Graphics(graphics) => self.draw_graphics(graphics, buffer, state),
            NodeKind::Bitmap(bitmap) => self.draw_bitmap(bitmap, buffer, state),
            NodeKind::Group(group) => self.draw_group(group, buffer, state),
            NodeKind::Text(text) => {
                log::trace!("skipping {} text draw(s)", text.draws.len());
                0
            }
            NodeKind::SetTransform(_) | NodeKind::SetAlpha(_) => 0,
        }
    }

    fn draw_graphics(&self, node: &GraphicsNode, buffer: &mut PixmapBuffer, state: DrawState) -> usize {
        let transform = state.transform.to_skia();
        let mut drawn = 0;

        for path in node.paths() {
            let Some(geometry) = build_path(path) else {
                continue;
            };

            let mut paint = Paint {
                anti_alias: self.config.anti_alias || state.for_hit_test,
                ..Default::default()
            };

            match path.style() {
                PathStyle::Fill(fill) => {
                    if state.for_hit_test {
                        paint.set_color(Color::BLACK.to_skia());
                    } else if !self.set_fill_shader(&mut paint, fill, state.alpha) {
                        continue;
                    }
                    let (pixmap, clip) = buffer.surface_and_clip();
                    pixmap.fill_path(&geometry, &paint, self.config.fill_rule, transform, clip);
                }
                PathStyle::Stroke(style) => {
                    if state.for_hit_test {
                        paint.set_color(Color::BLACK.to_skia());
                    } else {
                        let color = Color::from_hex_alpha(style.color, style.alpha * state.alpha);
                        paint.set_color(color.to_skia());
                    }
                    let stroke = Stroke {
                        width: style.thickness as f32,
                        miter_limit: style.miter_limit as f32,
                        line_cap: line_cap(style.caps),
                        line_join: line_join(style.joints),
                        dash: None,
                    };
                    let (pixmap, clip) = buffer.surface_and_clip();
                    pixmap.stroke_path(&geometry, &paint, &stroke, transform, clip);
                }
            }
            drawn += 1;
        }
        drawn
    }

    /// Returns false when the fill paints nothing.
    fn set_fill_shader(&self, paint: &mut Paint, fill: &FillStyle, alpha: f64) -> bool {
        match fill {
            FillStyle::Solid { color, alpha: fill_alpha } => {
                paint.set_color(Color::from_hex_alpha(*color, fill_alpha * alpha).to_skia());
                true
            }
            FillStyle::Gradient(gradient) => match gradient_shader(gradient, alpha) {
                Some(shader) => {
                    paint.shader = shader;
                    true
                }
                None => false,
            },
        }
    }

    fn draw_bitmap(&self, node: &BitmapNode, buffer: &mut PixmapBuffer, state: DrawState) -> usize {
        let Some(image) = &node.image else {
            return 0;
        };
        if image.is_origin_restricted() {
            buffer.taint();
        }

        let transform = match &node.matrix {
            Some(matrix) => state.transform.then(matrix),
            None => state.transform,
        };
        let quality = if node.smoothing {
            FilterQuality::Bilinear
        } else {
            FilterQuality::Nearest
        };

        let mut drawn = 0;
        for draw in &node.draws {
            if draw.source_w <= 0.0 || draw.source_h <= 0.0 {
                continue;
            }
            let Some(dest) = tiny_skia::Rect::from_xywh(
                draw.draw_x as f32,
                draw.draw_y as f32,
                draw.draw_w as f32,
                draw.draw_h as f32,
            ) else {
                continue;
            };

            let scale_x = draw.draw_w / draw.source_w;
            let scale_y = draw.draw_h / draw.source_h;
            let sample = Transform::new(
                scale_x,
                0.0,
                0.0,
                scale_y,
                draw.draw_x - draw.source_x * scale_x,
                draw.draw_y - draw.source_y * scale_y,
            );
            let paint = Paint {
                shader: Pattern::new(
                    image.pixmap().as_ref(),
                    SpreadMode::Pad,
                    quality,
                    state.alpha as f32,
                    sample.to_skia(),
                ),
                anti_alias: self.config.anti_alias,
                ..Default::default()
            };

            let (pixmap, clip) = buffer.surface_and_clip();
            pixmap.fill_rect(dest, &paint, transform.to_skia(), clip);
            drawn += 1;
        }
        drawn
    }

    /// Children are drawn in order. Set-transform and set-alpha children
    /// change the state for the siblings that follow them.
    fn draw_group(&self, node: &GroupNode, buffer: &mut PixmapBuffer, state: DrawState) -> usize {
        let mut current = state;
        let mut drawn = 0;

        for child in &node.children {
            let Ok(child) = child.try_borrow() else {
                log::warn!("skipping render node that is already borrowed");
                continue;
            };
            match child.kind() {
                NodeKind::SetTransform(set) => {
                    current.transform = state.transform.then(&set.combined());
                }
                NodeKind::SetAlpha(set) => {
                    current.alpha = state.alpha * set.alpha.unwrap_or(1.0);
                }
                _ => drawn += self.draw_node(&child, buffer, current),
            }
        }
        drawn
    }
}

impl NodeRasterizer for CpuRasterizer {
    fn draw_node_to_buffer(
        &mut self,
        node: &RenderNode,
        buffer: &mut PixmapBuffer,
        matrix: &Transform,
        for_hit_test: bool,
    ) -> Result<usize> {
        let state = DrawState {
            transform: *matrix,
            alpha: 1.0,
            for_hit_test,
        };
        Ok(self.draw_node(node, buffer, state))
    }
}

fn line_cap(caps: CapsStyle) -> LineCap {
    match caps {
        CapsStyle::None => LineCap::Butt,
        CapsStyle::Round => LineCap::Round,
        CapsStyle::Square => LineCap::Square,
    }
}

fn line_join(joints: JointStyle) -> LineJoin {
    match joints {
        JointStyle::Bevel => LineJoin::Bevel,
        JointStyle::Miter => LineJoin::Miter,
        JointStyle::Round => LineJoin::Round,
    }
}

/// Gradient shader in unit gradient space mapped by the fill's matrix.
///
/// Stop arrays of different lengths are cut to the shortest one.
fn gradient_shader(fill: &GradientFill, alpha: f64) -> Option<Shader<'static>> {
    let stops: Vec<GradientStop> = fill
        .colors
        .iter()
        .zip(&fill.alphas)
        .zip(&fill.ratios)
        .map(|((color, stop_alpha), ratio)| {
            let position = (ratio / 255.0).clamp(0.0, 1.0) as f32;
            let color = Color::from_hex_alpha(*color, stop_alpha * alpha);
            GradientStop::new(position, color.to_skia())
        })
        .collect();
    if stops.is_empty() {
        return None;
    }

    let transform = fill.matrix.to_skia();
    match fill.gradient_type {
        GradientType::Linear => LinearGradient::new(
            Point::from_xy(-1.0, 0.0),
            Point::from_xy(1.0, 0.0),
            stops,
            SpreadMode::Pad,
            transform,
        ),
        GradientType::Radial => RadialGradient::new(
            Point::from_xy(0.0, 0.0),
            Point::from_xy(0.0, 0.0),
            1.0,
            stops,
            SpreadMode::Pad,
            transform,
        ),
    }
}
