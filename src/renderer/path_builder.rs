//! Conversion of recorded paths into tiny-skia geometry.

use std::f64::consts::{FRAC_PI_2, PI};

use resvg::tiny_skia::{self, PathBuilder};

use crate::path::{Path2D, PathCommand};

/// Control point distance for a quarter circle approximated by one cubic.
const KAPPA: f64 = 0.552_284_749_8;

/// Convert a recorded path into a tiny-skia path.
///
/// Returns `None` when the path has no drawable segments.
pub fn build_path(path: &Path2D) -> Option<tiny_skia::Path> {
    let mut builder = SegmentBuilder {
        inner: PathBuilder::new(),
        has_current: false,
    };
    for command in path.commands() {
        builder.push(command);
    }
    builder.inner.finish()
}

struct SegmentBuilder {
    inner: PathBuilder,
    has_current: bool,
}

impl SegmentBuilder {
    fn push(&mut self, command: &PathCommand) {
        match *command {
            PathCommand::MoveTo { x, y } => self.move_to(x, y),
            PathCommand::LineTo { x, y } => self.line_to(x, y),
            PathCommand::CurveTo {
                control_x,
                control_y,
                anchor_x,
                anchor_y,
            } => {
                self.ensure_started();
                self.inner.quad_to(
                    control_x as f32,
                    control_y as f32,
                    anchor_x as f32,
                    anchor_y as f32,
                );
            }
            PathCommand::CubicCurveTo {
                control_x1,
                control_y1,
                control_x2,
                control_y2,
                anchor_x,
                anchor_y,
            } => {
                self.ensure_started();
                self.inner.cubic_to(
                    control_x1 as f32,
                    control_y1 as f32,
                    control_x2 as f32,
                    control_y2 as f32,
                    anchor_x as f32,
                    anchor_y as f32,
                );
            }
            PathCommand::Rect {
                x,
                y,
                width,
                height,
            } => self.rect(x, y, width, height),
            PathCommand::RoundRect {
                x,
                y,
                width,
                height,
                ellipse_width,
                ellipse_height,
            } => self.round_rect(x, y, width, height, ellipse_width, ellipse_height),
            PathCommand::Circle { x, y, radius } => {
                self.ellipse(x - radius, y - radius, radius * 2.0, radius * 2.0)
            }
            PathCommand::Ellipse {
                x,
                y,
                width,
                height,
            } => self.ellipse(x, y, width, height),
            PathCommand::Arc {
                x,
                y,
                radius,
                start_angle,
                end_angle,
                anticlockwise,
            } => self.arc(x, y, radius, start_angle, end_angle, anticlockwise),
        }
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.inner.move_to(x as f32, y as f32);
        self.has_current = true;
    }

    fn line_to(&mut self, x: f64, y: f64) {
        if self.has_current {
            self.inner.line_to(x as f32, y as f32);
        } else {
            self.move_to(x, y);
        }
    }

    /// Curves drawn from a fresh path start at the origin.
    fn ensure_started(&mut self) {
        if !self.has_current {
            self.move_to(0.0, 0.0);
        }
    }

    fn close(&mut self) {
        self.inner.close();
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.move_to(x, y);
        self.line_to(x + width, y);
        self.line_to(x + width, y + height);
        self.line_to(x, y + height);
        self.close();
    }

    fn round_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        ellipse_width: f64,
        ellipse_height: f64,
    ) {
        let radius_x = (ellipse_width / 2.0).trunc();
        let radius_y = if ellipse_height != 0.0 {
            (ellipse_height / 2.0).trunc()
        } else {
            radius_x
        };
        let (left, right) = (x.min(x + width), x.max(x + width));
        let (top, bottom) = (y.min(y + height), y.max(y + height));
        let rx = radius_x.abs().min((right - left) / 2.0);
        let ry = radius_y.abs().min((bottom - top) / 2.0);

        if rx <= 0.0 || ry <= 0.0 {
            self.rect(left, top, right - left, bottom - top);
            return;
        }

        let kx = rx * KAPPA;
        let ky = ry * KAPPA;
        self.move_to(right, bottom - ry);
        self.cubic(right, bottom - ry + ky, right - rx + kx, bottom, right - rx, bottom);
        self.line_to(left + rx, bottom);
        self.cubic(left + rx - kx, bottom, left, bottom - ry + ky, left, bottom - ry);
        self.line_to(left, top + ry);
        self.cubic(left, top + ry - ky, left + rx - kx, top, left + rx, top);
        self.line_to(right - rx, top);
        self.cubic(right - rx + kx, top, right, top + ry - ky, right, top + ry);
        self.close();
    }

    fn ellipse(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let rx = width.abs() / 2.0;
        let ry = height.abs() / 2.0;
        let cx = x.min(x + width) + rx;
        let cy = y.min(y + height) + ry;
        let kx = rx * KAPPA;
        let ky = ry * KAPPA;

        self.move_to(cx + rx, cy);
        self.cubic(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
        self.cubic(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
        self.cubic(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);
        self.cubic(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
        self.close();
    }

    /// Circular arc, joined to the current point by a straight line.
    fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) {
        let mut end_angle = end_angle;
        if anticlockwise {
            if end_angle >= start_angle {
                end_angle -= PI * 2.0;
            }
        } else if end_angle <= start_angle {
            end_angle += PI * 2.0;
        }

        let start_x = x + start_angle.cos() * radius;
        let start_y = y + start_angle.sin() * radius;
        self.line_to(start_x, start_y);

        let sweep = end_angle - start_angle;
        let segments = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / segments as f64;
        let k = 4.0 / 3.0 * (step / 4.0).tan();

        let mut angle = start_angle;
        for _ in 0..segments {
            let next = angle + step;
            let (sin0, cos0) = angle.sin_cos();
            let (sin1, cos1) = next.sin_cos();
            self.cubic(
                x + (cos0 - k * sin0) * radius,
                y + (sin0 + k * cos0) * radius,
                x + (cos1 + k * sin1) * radius,
                y + (sin1 - k * cos1) * radius,
                x + cos1 * radius,
                y + sin1 * radius,
            );
            angle = next;
        }
    }

    fn cubic(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        self.inner.cubic_to(
            x1 as f32, y1 as f32, x2 as f32, y2 as f32, x as f32, y as f32,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{FillStyle, PathHandle, PathStyle};

    fn fill_path() -> Path2D {
        Path2D::new(
            PathHandle(1),
            PathStyle::Fill(FillStyle::Solid {
                color: 0,
                alpha: 1.0,
            }),
        )
    }

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_empty_path_has_no_geometry() {
        assert!(build_path(&fill_path()).is_none());
    }

    #[test]
    fn test_rect_bounds() {
        let mut path = fill_path();
        path.draw_rect(10.0, 20.0, 30.0, 40.0);
        let bounds = build_path(&path).unwrap().bounds();
        assert!(approx_eq(bounds.left(), 10.0));
        assert!(approx_eq(bounds.bottom(), 60.0));
    }

    #[test]
    fn test_negative_ellipse_is_normalized() {
        let mut path = fill_path();
        path.draw_ellipse(10.0, 10.0, -10.0, -4.0);
        let bounds = build_path(&path).unwrap().bounds();
        assert!(approx_eq(bounds.left(), 0.0));
        assert!(approx_eq(bounds.right(), 10.0));
        assert!(approx_eq(bounds.top(), 6.0));
    }

    #[test]
    fn test_round_rect_radius_is_clamped() {
        let mut path = fill_path();
        path.draw_round_rect(0.0, 0.0, 10.0, 10.0, 100.0, 0.0);
        let bounds = build_path(&path).unwrap().bounds();
        assert!(approx_eq(bounds.width(), 10.0));
        assert!(approx_eq(bounds.height(), 10.0));
    }

    #[test]
    fn test_half_circle_arc() {
        let mut path = fill_path();
        path.draw_arc(0.0, 0.0, 10.0, 0.0, PI, false);
        let bounds = build_path(&path).unwrap().bounds();
        assert!(approx_eq(bounds.left(), -10.0));
        assert!(approx_eq(bounds.right(), 10.0));
        assert!(approx_eq(bounds.top(), 0.0));
        assert!(approx_eq(bounds.bottom(), 10.0));
    }
}
