use resvg::tiny_skia;

/// A 2D affine transform.
///
/// Maps a point as `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Transform {
    /// Identity matrix (no transformation)
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// Create an identity transform
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Create a translation transform
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            tx: x,
            ty: y,
            ..Self::IDENTITY
        }
    }

    /// Create a rotation transform (clockwise in y-down screen space)
    pub fn rotate(angle_radians: f64) -> Self {
        let cos = angle_radians.cos();
        let sin = angle_radians.sin();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Create a rotation transform from degrees
    pub fn rotate_degrees(angle_degrees: f64) -> Self {
        Self::rotate(angle_degrees.to_radians())
    }

    /// Create a uniform scale transform
    pub fn scale(s: f64) -> Self {
        Self::scale_xy(s, s)
    }

    /// Create a non-uniform scale transform
    pub fn scale_xy(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Matrix mapping the unit gradient square `[-1, 1]` onto a box of
    /// `width` x `height` rotated by `rotation` and placed at `(tx, ty)`.
    ///
    /// The result is in the caller-facing gradient convention, where the
    /// graphics node later scales the linear part by 819.2.
    pub fn create_gradient_box(width: f64, height: f64, rotation: f64, tx: f64, ty: f64) -> Self {
        let sx = width / 1638.4;
        let sy = height / 1638.4;
        let cos = rotation.cos();
        let sin = rotation.sin();
        Self {
            a: cos * sx,
            b: sin * sy,
            c: -sin * sx,
            d: cos * sy,
            tx: tx + width / 2.0,
            ty: ty + height / 2.0,
        }
    }

    /// Compose this transform with another: self * other
    /// Applies `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    /// Compute the inverse of this transform.
    /// A degenerate (non-invertible) transform inverts to identity.
    pub fn inverse(&self) -> Transform {
        let det = self.a * self.d - self.b * self.c;

        if det.abs() < 1e-12 {
            return Self::IDENTITY;
        }

        let inv_det = 1.0 / det;

        Transform {
            a: self.d * inv_det,
            b: -self.b * inv_det,
            c: -self.c * inv_det,
            d: self.a * inv_det,
            tx: (self.c * self.ty - self.d * self.tx) * inv_det,
            ty: (self.b * self.tx - self.a * self.ty) * inv_det,
        }
    }

    /// Transform a 2D point by this matrix
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    /// Check if this is the identity transform
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn to_skia(&self) -> tiny_skia::Transform {
        tiny_skia::Transform::from_row(
            self.a as f32,
            self.b as f32,
            self.c as f32,
            self.d as f32,
            self.tx as f32,
            self.ty as f32,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identity() {
        let t = Transform::identity();
        assert_eq!(t, Transform::IDENTITY);
        assert!(t.is_identity());
    }

    #[test]
    fn test_translate() {
        let t = Transform::translate(10.0, 20.0);
        let (x, y) = t.transform_point(5.0, 5.0);
        assert!(approx_eq(x, 15.0));
        assert!(approx_eq(y, 25.0));
    }

    #[test]
    fn test_rotate() {
        let t = Transform::rotate_degrees(90.0);
        let (x, y) = t.transform_point(1.0, 0.0);
        assert!(approx_eq(x, 0.0));
        assert!(approx_eq(y, 1.0));
    }

    #[test]
    fn test_compose() {
        // Point (0,0) -> translate -> (10,0) -> scale -> (20,0)
        let composed = Transform::scale(2.0).then(&Transform::translate(10.0, 0.0));
        let (x, y) = composed.transform_point(0.0, 0.0);
        assert!(approx_eq(x, 20.0));
        assert!(approx_eq(y, 0.0));
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = Transform::translate(3.0, -7.0)
            .then(&Transform::rotate_degrees(30.0))
            .then(&Transform::scale_xy(2.0, 0.5));
        let (x, y) = t.inverse().then(&t).transform_point(4.0, 9.0);
        assert!(approx_eq(x, 4.0));
        assert!(approx_eq(y, 9.0));
    }

    #[test]
    fn test_degenerate_inverse_is_identity() {
        assert!(Transform::scale(0.0).inverse().is_identity());
    }

    #[test]
    fn test_gradient_box_center() {
        let m = Transform::create_gradient_box(200.0, 100.0, 0.0, 10.0, 20.0);
        assert!(approx_eq(m.tx, 110.0));
        assert!(approx_eq(m.ty, 70.0));
        assert!(approx_eq(m.a * 819.2, 100.0));
        assert!(approx_eq(m.d * 819.2, 50.0));
    }
}
