use crate::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_ltrb(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check that `other` lies entirely inside this rect (edges inclusive).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Integer-aligned screen-space region.
///
/// Used as a render node's cached screen region and as a clip rectangle for
/// render buffers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Region {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub width: f64,
    pub height: f64,
    pub area: f64,
}

impl Region {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        let mut region = Self::default();
        region.set_to(min_x, min_y, max_x, max_y);
        region
    }

    pub fn set_to(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        self.min_x = min_x;
        self.min_y = min_y;
        self.max_x = max_x;
        self.max_y = max_y;
        self.update_area();
    }

    pub fn set_empty(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Set this region to the pixel-aligned screen-space box of `bounds`
    /// transformed by `matrix`.
    pub fn update_region(&mut self, bounds: &Rect, matrix: &Transform) {
        if bounds.is_empty() {
            self.set_empty();
            return;
        }
        let corners = [
            matrix.transform_point(bounds.x, bounds.y),
            matrix.transform_point(bounds.right(), bounds.y),
            matrix.transform_point(bounds.right(), bounds.bottom()),
            matrix.transform_point(bounds.x, bounds.bottom()),
        ];
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (x, y) in corners {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        self.set_to(min_x.floor(), min_y.floor(), max_x.ceil(), max_y.ceil());
    }

    pub fn intersects(&self, other: &Region) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    fn update_area(&mut self) {
        self.width = self.max_x - self.min_x;
        self.height = self.max_y - self.min_y;
        self.area = self.width * self.height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(0.0, 0.0));
        assert!(r.contains(9.99, 9.99));
        assert!(!r.contains(10.0, 5.0));
    }

    #[test]
    fn test_region_area() {
        let region = Region::new(1.0, 2.0, 5.0, 10.0);
        assert_eq!(region.width, 4.0);
        assert_eq!(region.height, 8.0);
        assert_eq!(region.area, 32.0);
    }

    #[test]
    fn test_update_region_rotated() {
        let mut region = Region::default();
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        region.update_region(&bounds, &Transform::rotate_degrees(90.0));
        assert_eq!(region.min_x, -10.0);
        assert_eq!(region.max_x, 1.0);
        assert_eq!(region.min_y, 0.0);
        assert_eq!(region.max_y, 10.0);
    }

    #[test]
    fn test_update_region_empty_bounds() {
        let mut region = Region::new(0.0, 0.0, 4.0, 4.0);
        region.update_region(&Rect::default(), &Transform::IDENTITY);
        assert!(region.is_empty());
    }

    #[test]
    fn test_intersects() {
        let a = Region::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Region::new(5.0, 5.0, 15.0, 15.0)));
        assert!(!a.intersects(&Region::new(10.0, 0.0, 20.0, 10.0)));
    }
}
