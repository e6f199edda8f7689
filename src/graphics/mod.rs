//! Vector drawing facade.
//!
//! [`Graphics`] records drawing calls into a graphics render node, keeps a
//! running content bounding box, and tells its display target whenever the
//! content bounds change.

pub mod bounds;

use std::f64::consts::PI;
use std::rc::{Rc, Weak};

use crate::buffer::{PixmapBuffer, RenderBuffer, ScratchBuffer, SCRATCH_SIZE};
use crate::display::DisplayTarget;
use crate::error::{RenderError, Result};
use crate::geometry::Rect;
use crate::node::{RenderNode, RenderNodeRef};
use crate::number::{number_or_zero, IntoNumber};
use crate::path::{CapsStyle, GradientType, JointStyle, LineScaleMode, Path2D, PathHandle};
use crate::renderer::{CpuRasterizer, NodeRasterizer};
use crate::transform::Transform;

pub use bounds::{BoundsTracker, Pen, StrokeMargins};

/// Normalize an angle into `[0, 2π)`.
fn clamp_angle(value: f64) -> f64 {
    let value = value % (PI * 2.0);
    if value < 0.0 {
        value + PI * 2.0
    } else {
        value
    }
}

fn color_or_zero(value: impl IntoNumber) -> u32 {
    number_or_zero(value) as u32
}

/// Stroke settings for [`Graphics::line_style`].
///
/// Thickness defaults to NaN, which coerces to 0 and turns the stroke off.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub thickness: f64,
    pub color: u32,
    pub alpha: f64,
    pub pixel_hinting: bool,
    pub scale_mode: LineScaleMode,
    pub caps: Option<CapsStyle>,
    pub joints: Option<JointStyle>,
    pub miter_limit: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            thickness: f64::NAN,
            color: 0,
            alpha: 1.0,
            pixel_hinting: false,
            scale_mode: LineScaleMode::Normal,
            caps: None,
            joints: None,
            miter_limit: 3.0,
        }
    }
}

impl LineStyle {
    pub fn new(thickness: impl IntoNumber) -> Self {
        Self {
            thickness: number_or_zero(thickness),
            ..Default::default()
        }
    }

    pub fn color(mut self, color: impl IntoNumber) -> Self {
        self.color = color_or_zero(color);
        self
    }

    pub fn alpha(mut self, alpha: impl IntoNumber) -> Self {
        self.alpha = number_or_zero(alpha);
        self
    }

    pub fn pixel_hinting(mut self, pixel_hinting: bool) -> Self {
        self.pixel_hinting = pixel_hinting;
        self
    }

    pub fn scale_mode(mut self, scale_mode: LineScaleMode) -> Self {
        self.scale_mode = scale_mode;
        self
    }

    pub fn caps(mut self, caps: CapsStyle) -> Self {
        self.caps = Some(caps);
        self
    }

    pub fn joints(mut self, joints: JointStyle) -> Self {
        self.joints = Some(joints);
        self
    }

    pub fn miter_limit(mut self, miter_limit: impl IntoNumber) -> Self {
        self.miter_limit = number_or_zero(miter_limit);
        self
    }
}

/// Drawing API bound to one display target at a time.
///
/// Every numeric argument goes through [`number_or_zero`]: anything that is
/// not a usable number draws as 0 instead of failing.
pub struct Graphics {
    node: RenderNodeRef,
    target: Option<Weak<dyn DisplayTarget>>,
    fill_path: Option<PathHandle>,
    stroke_path: Option<PathHandle>,
    bounds: BoundsTracker,
}

impl Default for Graphics {
    fn default() -> Self {
        Self::new()
    }
}

impl Graphics {
    pub fn new() -> Self {
        Self {
            node: RenderNode::graphics().into_ref(),
            target: None,
            fill_path: None,
            stroke_path: None,
            bounds: BoundsTracker::new(),
        }
    }

    /// The graphics render node this facade writes to.
    pub fn render_node(&self) -> RenderNodeRef {
        Rc::clone(&self.node)
    }

    /// Bind to `target`, handing it the render node. The previous target,
    /// if still alive, loses the node.
    pub fn set_target<T: DisplayTarget + 'static>(&mut self, target: &Rc<T>) {
        if let Some(previous) = self.target() {
            previous.set_render_node(None);
        }
        target.set_render_node(Some(self.render_node()));
        let weak: Weak<T> = Rc::downgrade(target);
        let weak: Weak<dyn DisplayTarget> = weak;
        self.target = Some(weak);
        log::debug!("graphics bound to a new display target");
    }

    pub fn target(&self) -> Option<Rc<dyn DisplayTarget>> {
        self.target.as_ref().and_then(Weak::upgrade)
    }

    pub fn bounds(&self) -> &BoundsTracker {
        &self.bounds
    }

    pub fn has_fill(&self) -> bool {
        self.fill_path.is_some()
    }

    pub fn has_stroke(&self) -> bool {
        self.stroke_path.is_some()
    }

    /// Start a solid fill. Any open fill is abandoned; what it already
    /// recorded stays in the node.
    pub fn begin_fill(&mut self, color: impl IntoNumber, alpha: impl IntoNumber) {
        let color = color_or_zero(color);
        let alpha = number_or_zero(alpha);
        let handle = self
            .node
            .borrow_mut()
            .begin_fill(color, alpha, self.stroke_path);
        self.open_fill(handle);
    }

    /// Start a gradient fill. Mismatched stop arrays are accepted as is.
    pub fn begin_gradient_fill(
        &mut self,
        gradient_type: GradientType,
        colors: Vec<u32>,
        alphas: Vec<f64>,
        ratios: Vec<f64>,
        matrix: Option<&Transform>,
    ) {
        let handle = self.node.borrow_mut().begin_gradient_fill(
            gradient_type,
            colors,
            alphas,
            ratios,
            matrix,
            self.stroke_path,
        );
        self.open_fill(handle);
    }

    fn open_fill(&mut self, handle: Option<PathHandle>) {
        self.fill_path = handle;
        self.seed_at_pen(handle);
    }

    /// Stop adding to the current fill.
    pub fn end_fill(&mut self) {
        self.fill_path = None;
    }

    /// Start a stroke, or turn stroking off when the thickness is not
    /// positive.
    pub fn line_style(&mut self, style: LineStyle) {
        let thickness = number_or_zero(style.thickness);
        if thickness <= 0.0 {
            self.stroke_path = None;
            self.bounds.set_margins(StrokeMargins::NONE);
            return;
        }

        let alpha = number_or_zero(style.alpha);
        let miter_limit = number_or_zero(style.miter_limit);
        self.bounds.set_margins(StrokeMargins::for_thickness(thickness));
        let handle = self.node.borrow_mut().line_style(
            thickness,
            style.color,
            alpha,
            style.caps,
            style.joints,
            miter_limit,
        );
        self.stroke_path = handle;
        self.seed_at_pen(handle);
    }

    pub fn draw_rect(
        &mut self,
        x: impl IntoNumber,
        y: impl IntoNumber,
        width: impl IntoNumber,
        height: impl IntoNumber,
    ) {
        let x = number_or_zero(x);
        let y = number_or_zero(y);
        let width = number_or_zero(width);
        let height = number_or_zero(height);
        self.for_each_open_path(|path| path.draw_rect(x, y, width, height));
        self.bounds.extend_by_point(x + width, y + height);
        self.update_position(x, y);
    }

    /// Rounded rectangle. An `ellipse_height` of 0 reuses `ellipse_width`.
    pub fn draw_round_rect(
        &mut self,
        x: impl IntoNumber,
        y: impl IntoNumber,
        width: impl IntoNumber,
        height: impl IntoNumber,
        ellipse_width: impl IntoNumber,
        ellipse_height: impl IntoNumber,
    ) {
        let x = number_or_zero(x);
        let y = number_or_zero(y);
        let width = number_or_zero(width);
        let height = number_or_zero(height);
        let ellipse_width = number_or_zero(ellipse_width);
        let ellipse_height = number_or_zero(ellipse_height);
        self.for_each_open_path(|path| {
            path.draw_round_rect(x, y, width, height, ellipse_width, ellipse_height)
        });

        let radius_x = (ellipse_width * 0.5).trunc();
        let radius_y = if ellipse_height != 0.0 {
            (ellipse_height * 0.5).trunc()
        } else {
            radius_x
        };
        let right = x + width;
        let bottom = y + height;
        self.bounds.extend_by_point(x, y);
        self.bounds.extend_by_point(right, bottom);
        self.update_position(right, bottom - radius_y);
    }

    pub fn draw_circle(&mut self, x: impl IntoNumber, y: impl IntoNumber, radius: impl IntoNumber) {
        let x = number_or_zero(x);
        let y = number_or_zero(y);
        let radius = number_or_zero(radius);
        self.for_each_open_path(|path| path.draw_circle(x, y, radius));
        self.bounds.extend_by_point(x - radius, y - radius);
        self.bounds.extend_by_point(x + radius, y + radius);
        self.update_position(x + radius, y);
    }

    pub fn draw_ellipse(
        &mut self,
        x: impl IntoNumber,
        y: impl IntoNumber,
        width: impl IntoNumber,
        height: impl IntoNumber,
    ) {
        let x = number_or_zero(x);
        let y = number_or_zero(y);
        let width = number_or_zero(width);
        let height = number_or_zero(height);
        self.for_each_open_path(|path| path.draw_ellipse(x, y, width, height));
        self.bounds.extend_by_point(x + width, y + height);
        self.update_position(x, y);
    }

    /// Move the pen. The new position only counts towards the bounds once
    /// something is drawn from it.
    pub fn move_to(&mut self, x: impl IntoNumber, y: impl IntoNumber) {
        let x = number_or_zero(x);
        let y = number_or_zero(y);
        self.for_each_open_path(|path| path.move_to(x, y));
        self.bounds.move_pen(x, y);
    }

    pub fn line_to(&mut self, x: impl IntoNumber, y: impl IntoNumber) {
        let x = number_or_zero(x);
        let y = number_or_zero(y);
        self.for_each_open_path(|path| path.line_to(x, y));
        self.update_position(x, y);
    }

    /// Quadratic curve. The bounds cover the control point, not the curve's
    /// true extremum.
    pub fn curve_to(
        &mut self,
        control_x: impl IntoNumber,
        control_y: impl IntoNumber,
        anchor_x: impl IntoNumber,
        anchor_y: impl IntoNumber,
    ) {
        let control_x = number_or_zero(control_x);
        let control_y = number_or_zero(control_y);
        let anchor_x = number_or_zero(anchor_x);
        let anchor_y = number_or_zero(anchor_y);
        self.for_each_open_path(|path| path.curve_to(control_x, control_y, anchor_x, anchor_y));
        self.bounds.extend_by_point(control_x, control_y);
        self.bounds.extend_by_point(anchor_x, anchor_y);
        self.update_position(anchor_x, anchor_y);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn cubic_curve_to(
        &mut self,
        control_x1: impl IntoNumber,
        control_y1: impl IntoNumber,
        control_x2: impl IntoNumber,
        control_y2: impl IntoNumber,
        anchor_x: impl IntoNumber,
        anchor_y: impl IntoNumber,
    ) {
        let control_x1 = number_or_zero(control_x1);
        let control_y1 = number_or_zero(control_y1);
        let control_x2 = number_or_zero(control_x2);
        let control_y2 = number_or_zero(control_y2);
        let anchor_x = number_or_zero(anchor_x);
        let anchor_y = number_or_zero(anchor_y);
        self.for_each_open_path(|path| {
            path.cubic_curve_to(control_x1, control_y1, control_x2, control_y2, anchor_x, anchor_y)
        });
        self.bounds.extend_by_point(control_x1, control_y1);
        self.bounds.extend_by_point(control_x2, control_y2);
        self.bounds.extend_by_point(anchor_x, anchor_y);
        self.update_position(anchor_x, anchor_y);
    }

    /// Circular arc around `(x, y)`. Does nothing for a negative radius or
    /// equal start and end angles, compared before coercion so that two NaN
    /// angles still draw a full circle.
    pub fn draw_arc(
        &mut self,
        x: impl IntoNumber,
        y: impl IntoNumber,
        radius: impl IntoNumber,
        start_angle: impl IntoNumber,
        end_angle: impl IntoNumber,
        anticlockwise: bool,
    ) {
        let radius = radius.into_number();
        let start_angle = start_angle.into_number();
        let end_angle = end_angle.into_number();
        if radius < 0.0 || start_angle == end_angle {
            return;
        }
        let radius = number_or_zero(radius);
        let start_angle = number_or_zero(start_angle);
        let end_angle = number_or_zero(end_angle);
        let x = number_or_zero(x);
        let y = number_or_zero(y);
        let start_angle = clamp_angle(start_angle);
        let end_angle = clamp_angle(end_angle);

        self.for_each_open_path(|path| {
            path.draw_arc(x, y, radius, start_angle, end_angle, anticlockwise)
        });
        if anticlockwise {
            self.bounds.extend_by_arc(x, y, radius, end_angle, start_angle);
        } else {
            self.bounds.extend_by_arc(x, y, radius, start_angle, end_angle);
        }
        self.update_position(
            x + end_angle.cos() * radius,
            y + end_angle.sin() * radius,
        );
    }

    /// Drop all recorded geometry and reset the pen and the bounds.
    pub fn clear(&mut self) {
        if let Some(node) = self.node.borrow_mut().as_graphics_mut() {
            node.clear();
        }
        self.fill_path = None;
        self.stroke_path = None;
        self.update_position(0.0, 0.0);
        self.bounds.reset_box();
    }

    /// Local bounds of everything drawn so far, or `None` if nothing was.
    pub fn measure_content_bounds(&self) -> Option<Rect> {
        self.bounds.measure()
    }

    /// Hit-test a stage point against the drawn pixels, using this thread's
    /// scratch buffer.
    ///
    /// Returns the target when the pixel under the point is not fully
    /// transparent. An unbound facade never hits.
    pub fn hit_test(
        &self,
        stage_x: impl IntoNumber,
        stage_y: impl IntoNumber,
    ) -> Result<Option<Rc<dyn DisplayTarget>>> {
        let mut scratch = ScratchBuffer::acquire()?;
        self.hit_test_with(stage_x, stage_y, &mut scratch, &mut CpuRasterizer::default())
    }

    /// Hit-test into an explicit buffer with an explicit rasterizer.
    ///
    /// The buffer is resized to 3x3 and the node drawn so that the point of
    /// interest lands on pixel (1, 1).
    pub fn hit_test_with(
        &self,
        stage_x: impl IntoNumber,
        stage_y: impl IntoNumber,
        buffer: &mut PixmapBuffer,
        rasterizer: &mut dyn NodeRasterizer,
    ) -> Result<Option<Rc<dyn DisplayTarget>>> {
        let Some(target) = self.target() else {
            log::warn!("hit test on graphics without a display target");
            return Ok(None);
        };

        let inverted = target.inverted_concatenated_transform();
        let (local_x, local_y) =
            inverted.transform_point(number_or_zero(stage_x), number_or_zero(stage_y));

        buffer.resize(SCRATCH_SIZE, SCRATCH_SIZE, false)?;
        let matrix = Transform::translate(1.0 - local_x, 1.0 - local_y);
        {
            let node = self.node.borrow();
            rasterizer.draw_node_to_buffer(&node, buffer, &matrix, true)?;
        }

        let pixel = buffer.get_pixel(1, 1).map_err(|err| {
            log::warn!("hit test readback failed: {}", err);
            RenderError::ReadbackBlocked
        })?;
        log::trace!(
            "hit test at local ({}, {}): alpha {}",
            local_x,
            local_y,
            pixel[3]
        );

        if pixel[3] == 0 {
            Ok(None)
        } else {
            Ok(Some(target))
        }
    }

    /// Start a freshly opened path at the pen position.
    fn seed_at_pen(&self, handle: Option<PathHandle>) {
        let Some(handle) = handle else {
            return;
        };
        let pen = self.bounds.pen();
        let mut node = self.node.borrow_mut();
        if let Some(path) = node.as_graphics_mut().and_then(|g| g.path_mut(handle)) {
            path.move_to(pen.x, pen.y);
        }
    }

    fn for_each_open_path(&self, mut f: impl FnMut(&mut Path2D)) {
        let mut node = self.node.borrow_mut();
        let Some(graphics) = node.as_graphics_mut() else {
            return;
        };
        for handle in [self.fill_path, self.stroke_path].into_iter().flatten() {
            if let Some(path) = graphics.path_mut(handle) {
                f(path);
            }
        }
    }

    /// Fold the pen into the bounds, move it, and notify the target.
    fn update_position(&mut self, x: f64, y: f64) {
        self.bounds.update_position(x, y);
        if let Some(target) = self.target() {
            target.invalidate_content_bounds();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{PathCommand, PathStyle};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn commands(graphics: &Graphics) -> Vec<Vec<PathCommand>> {
        let node = graphics.render_node();
        let node = node.borrow();
        node.as_graphics()
            .unwrap()
            .paths()
            .iter()
            .map(|p| p.commands().to_vec())
            .collect()
    }

    #[test]
    fn test_clamp_angle() {
        assert!(approx_eq(clamp_angle(-PI / 2.0), PI * 1.5));
        assert!(approx_eq(clamp_angle(PI * 5.0), PI));
        assert_eq!(clamp_angle(0.0), 0.0);
    }

    #[test]
    fn test_fill_is_seeded_at_pen() {
        let mut graphics = Graphics::new();
        graphics.move_to(4, 6);
        graphics.begin_fill(0xFF0000, 1);
        assert_eq!(
            commands(&graphics)[0],
            vec![PathCommand::MoveTo { x: 4.0, y: 6.0 }]
        );
    }

    #[test]
    fn test_primitives_go_to_both_open_paths() {
        let mut graphics = Graphics::new();
        graphics.line_style(LineStyle::new(2).color(0x00FF00));
        graphics.begin_fill(0xFF0000, 1);
        graphics.draw_rect(0, 0, 10, 10);

        let recorded = commands(&graphics);
        assert_eq!(recorded.len(), 2);
        for path in recorded {
            assert_eq!(path.len(), 2);
            assert!(matches!(path[1], PathCommand::Rect { width, .. } if width == 10.0));
        }
    }

    #[test]
    fn test_fill_lands_below_stroke() {
        let mut graphics = Graphics::new();
        graphics.line_style(LineStyle::new(1));
        graphics.begin_fill(0, 1);
        let node = graphics.render_node();
        let node = node.borrow();
        let paths = node.as_graphics().unwrap().paths();
        assert!(matches!(paths[0].style(), PathStyle::Fill(_)));
        assert!(matches!(paths[1].style(), PathStyle::Stroke(_)));
    }

    #[test]
    fn test_zero_thickness_turns_stroke_off() {
        let mut graphics = Graphics::new();
        graphics.line_style(LineStyle::new(4));
        assert!(graphics.has_stroke());
        assert_eq!(graphics.bounds().margins(), StrokeMargins::for_thickness(4.0));

        graphics.line_style(LineStyle::default());
        assert!(!graphics.has_stroke());
        assert_eq!(graphics.bounds().margins(), StrokeMargins::NONE);
    }

    #[test]
    fn test_end_fill_keeps_recorded_geometry() {
        let mut graphics = Graphics::new();
        graphics.begin_fill(0, 1);
        graphics.draw_circle(5, 5, 5);
        graphics.end_fill();
        graphics.draw_rect(0, 0, 1, 1);
        assert!(!graphics.has_fill());
        assert_eq!(commands(&graphics)[0].len(), 2);
    }

    #[test]
    fn test_round_rect_pen_position() {
        let mut graphics = Graphics::new();
        graphics.draw_round_rect(0, 0, 20, 10, 7, 0);
        let pen = graphics.bounds().pen();
        // radius 3 from trunc(7 / 2), reused for the height.
        assert_eq!((pen.x, pen.y), (20.0, 7.0));
    }

    #[test]
    fn test_arc_ignores_negative_radius_and_equal_angles() {
        let mut graphics = Graphics::new();
        graphics.draw_arc(0, 0, -1, 0, 1, false);
        graphics.draw_arc(0, 0, 5, 1, 1, false);
        graphics.draw_arc(0, 0, 5, -0.0, 0.0, false);
        assert!(graphics.measure_content_bounds().is_none());
    }

    #[test]
    fn test_arc_with_unusable_angles_draws_full_circle() {
        let mut graphics = Graphics::new();
        graphics.draw_arc(0, 0, 5, f64::NAN, f64::NAN, false);
        assert_eq!(
            graphics.measure_content_bounds(),
            Some(Rect::new(-5.0, -5.0, 10.0, 10.0))
        );

        let mut missing = Graphics::new();
        missing.draw_arc(0, 0, 5, None::<f64>, 0, false);
        assert_eq!(
            missing.measure_content_bounds(),
            Some(Rect::new(-5.0, -5.0, 10.0, 10.0))
        );
    }

    #[test]
    fn test_anticlockwise_arc_bounds_use_reverse_sweep() {
        let mut graphics = Graphics::new();
        graphics.draw_arc(0, 0, 10, 0.0, PI / 2.0, true);
        let rect = graphics.measure_content_bounds().unwrap();
        // Sweeping from 90° forward to 0° crosses 180° and 270°.
        assert_eq!(rect.x, -10.0);
        assert_eq!(rect.y, -10.0);
        assert_eq!(rect.right(), 10.0);
        assert_eq!(rect.bottom(), 10.0);
    }

    #[test]
    fn test_non_numeric_input_draws_at_zero() {
        let mut graphics = Graphics::new();
        graphics.draw_rect("abc", f64::NAN, "10", Some(10.0));
        assert_eq!(
            graphics.measure_content_bounds().unwrap(),
            Rect::new(0.0, 0.0, 10.0, 10.0)
        );
    }

    #[test]
    fn test_hit_test_without_target_misses() {
        let mut graphics = Graphics::new();
        graphics.begin_fill(0, 1);
        graphics.draw_rect(0, 0, 10, 10);
        assert!(graphics.hit_test(5, 5).unwrap().is_none());
    }
}
