//! Incremental content bounds for a [`Graphics`](super::Graphics) facade.
//!
//! Every drawn point is folded into a running axis-aligned box, widened by
//! the stroke margins in effect when that point was drawn. Margins are never
//! reapplied to points that were already folded in.
//!
//! The pen position is part of this contract. A bare `move_to` marks the new
//! position as pending; it is folded in only when the next bounds-affecting
//! call draws from it, so a `move_to` on its own never grows the box.

use std::f64::consts::PI;

use crate::geometry::Rect;

/// Arc spans below this many radians are bounded as full circles.
const FULL_CIRCLE_EPSILON: f64 = 0.01;

/// Asymmetric stroke margins applied around every drawn point.
///
/// Thin strokes are biased down-right so hairlines land on whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StrokeMargins {
    pub top_left: f64,
    pub bottom_right: f64,
}

impl StrokeMargins {
    pub const NONE: Self = Self {
        top_left: 0.0,
        bottom_right: 0.0,
    };

    /// Margins for a stroke of the given thickness.
    pub fn for_thickness(thickness: f64) -> Self {
        if thickness == 1.0 {
            Self {
                top_left: 0.0,
                bottom_right: 1.0,
            }
        } else if thickness == 3.0 {
            Self {
                top_left: 1.0,
                bottom_right: 2.0,
            }
        } else {
            let half = (thickness * 0.5).ceil();
            let half = if half.is_finite() { half } else { 0.0 };
            Self {
                top_left: half,
                bottom_right: half,
            }
        }
    }
}

/// Current drawing position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub x: f64,
    pub y: f64,
    /// Whether `(x, y)` has already been folded into the bounds.
    pub included: bool,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            included: true,
        }
    }
}

/// Running bounding box plus the pen and stroke state that feed it.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsTracker {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    margins: StrokeMargins,
    pen: Pen,
}

impl Default for BoundsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundsTracker {
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
            margins: StrokeMargins::NONE,
            pen: Pen::default(),
        }
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn is_empty(&self) -> bool {
        self.min_x == f64::INFINITY
    }

    pub fn margins(&self) -> StrokeMargins {
        self.margins
    }

    pub fn set_margins(&mut self, margins: StrokeMargins) {
        self.margins = margins;
    }

    pub fn pen(&self) -> Pen {
        self.pen
    }

    /// The box as a rect, or `None` while nothing has been drawn.
    pub fn measure(&self) -> Option<Rect> {
        if self.is_empty() {
            None
        } else {
            Some(Rect::from_ltrb(
                self.min_x, self.min_y, self.max_x, self.max_y,
            ))
        }
    }

    /// Empty the box. Pen and margins are left alone.
    pub fn reset_box(&mut self) {
        self.min_x = f64::INFINITY;
        self.min_y = f64::INFINITY;
        self.max_x = f64::NEG_INFINITY;
        self.max_y = f64::NEG_INFINITY;
    }

    pub fn extend_by_point(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x - self.margins.top_left);
        self.max_x = self.max_x.max(x + self.margins.bottom_right);
        self.min_y = self.min_y.min(y - self.margins.top_left);
        self.max_y = self.max_y.max(y + self.margins.bottom_right);
    }

    /// Move the pen without touching the box; the position stays pending.
    pub fn move_pen(&mut self, x: f64, y: f64) {
        self.pen = Pen {
            x,
            y,
            included: false,
        };
    }

    /// Fold any pending pen position in, move the pen to `(x, y)` and fold
    /// that in as well.
    pub fn update_position(&mut self, x: f64, y: f64) {
        if !self.pen.included {
            self.extend_by_point(self.pen.x, self.pen.y);
        }
        self.pen = Pen {
            x,
            y,
            included: true,
        };
        self.extend_by_point(x, y);
    }

    /// Extend the box by the arc of `radius` around `(x, y)` swept forward
    /// from `start_angle` to `end_angle`.
    ///
    /// Both angles must already be normalized to `[0, 2π)`. Every axis
    /// extremum the sweep crosses is forced into the box, and the result is
    /// widened to whole pixels before merging.
    pub fn extend_by_arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        if (start_angle - end_angle).abs() < FULL_CIRCLE_EPSILON {
            self.extend_by_point(x - radius, y - radius);
            self.extend_by_point(x + radius, y + radius);
            return;
        }

        let end_angle = if start_angle > end_angle {
            end_angle + PI * 2.0
        } else {
            end_angle
        };

        let start_x = start_angle.cos() * radius;
        let end_x = end_angle.cos() * radius;
        let mut x_min = start_x.min(end_x);
        let mut x_max = start_x.max(end_x);

        let start_y = start_angle.sin() * radius;
        let end_y = end_angle.sin() * radius;
        let mut y_min = start_y.min(end_y);
        let mut y_max = start_y.max(end_y);

        let start_range = start_angle / (PI * 0.5);
        let end_range = end_angle / (PI * 0.5);
        let mut quadrant = start_range.ceil();
        while quadrant <= end_range {
            match (quadrant as i64).rem_euclid(4) {
                0 => x_max = radius,
                1 => y_max = radius,
                2 => x_min = -radius,
                _ => y_min = -radius,
            }
            quadrant += 1.0;
        }

        self.extend_by_point(x_min.floor() + x, y_min.floor() + y);
        self.extend_by_point(x_max.ceil() + x, y_max.ceil() + y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker_is_empty() {
        let tracker = BoundsTracker::new();
        assert!(tracker.is_empty());
        assert_eq!(tracker.min_x(), f64::INFINITY);
        assert_eq!(tracker.max_y(), f64::NEG_INFINITY);
        assert!(tracker.measure().is_none());
    }

    #[test]
    fn test_stroke_margin_table() {
        assert_eq!(
            StrokeMargins::for_thickness(1.0),
            StrokeMargins {
                top_left: 0.0,
                bottom_right: 1.0
            }
        );
        assert_eq!(
            StrokeMargins::for_thickness(3.0),
            StrokeMargins {
                top_left: 1.0,
                bottom_right: 2.0
            }
        );
        assert_eq!(
            StrokeMargins::for_thickness(4.0),
            StrokeMargins {
                top_left: 2.0,
                bottom_right: 2.0
            }
        );
        assert_eq!(
            StrokeMargins::for_thickness(2.5),
            StrokeMargins {
                top_left: 2.0,
                bottom_right: 2.0
            }
        );
        assert_eq!(StrokeMargins::for_thickness(0.0), StrokeMargins::NONE);
    }

    #[test]
    fn test_margins_are_snapshotted_per_point() {
        let mut tracker = BoundsTracker::new();
        tracker.extend_by_point(10.0, 10.0);
        tracker.set_margins(StrokeMargins::for_thickness(4.0));
        tracker.extend_by_point(20.0, 20.0);
        let rect = tracker.measure().unwrap();
        assert_eq!(rect, Rect::from_ltrb(10.0, 10.0, 22.0, 22.0));
    }

    #[test]
    fn test_pending_pen_is_folded_in_later() {
        let mut tracker = BoundsTracker::new();
        tracker.move_pen(5.0, 5.0);
        assert!(tracker.is_empty());
        assert!(!tracker.pen().included);

        tracker.update_position(8.0, 9.0);
        assert!(tracker.pen().included);
        assert_eq!(tracker.measure().unwrap(), Rect::from_ltrb(5.0, 5.0, 8.0, 9.0));
    }

    #[test]
    fn test_arc_crossing_ninety_degrees() {
        let mut tracker = BoundsTracker::new();
        tracker.extend_by_arc(0.0, 0.0, 10.0, 0.0, PI);
        assert_eq!(tracker.max_y(), 10.0);
        assert_eq!(tracker.min_x(), -10.0);
        assert_eq!(tracker.max_x(), 10.0);
        assert_eq!(tracker.min_y(), 0.0);
    }

    #[test]
    fn test_arc_wrapping_past_zero() {
        // 270° -> 45°, crossing 0° (the +X extremum) only.
        let mut tracker = BoundsTracker::new();
        tracker.extend_by_arc(0.0, 0.0, 10.0, PI * 1.5, PI * 0.25);
        assert_eq!(tracker.max_x(), 10.0);
        assert_eq!(tracker.min_y(), -10.0);
        assert_eq!(tracker.max_y(), 8.0);
        // cos(270°) is a hair below zero, and flooring keeps the box conservative.
        assert_eq!(tracker.min_x(), -1.0);
    }

    #[test]
    fn test_tiny_span_is_full_circle() {
        let mut tracker = BoundsTracker::new();
        tracker.extend_by_arc(50.0, 50.0, 5.0, 1.0, 1.005);
        assert_eq!(tracker.measure().unwrap(), Rect::from_ltrb(45.0, 45.0, 55.0, 55.0));
    }

    #[test]
    fn test_arc_bounds_are_pixel_aligned() {
        let mut tracker = BoundsTracker::new();
        tracker.extend_by_arc(0.5, 0.5, 3.0, 0.2, 0.4);
        let rect = tracker.measure().unwrap();
        assert_eq!(rect.x.fract().abs(), 0.5);
        assert_eq!(rect.right().fract().abs(), 0.5);
    }
}
