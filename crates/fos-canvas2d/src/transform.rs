//! Affine Transform
//!
//! 2D affine map used by the canvas transform pipeline.

use crate::geometry::{Point, Rect};

/// 2D affine transform (3x3 homogeneous)
/// | a c e |
/// | b d f |
/// | 0 0 1 |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f64, // scale x
    pub b: f64, // skew y
    pub c: f64, // skew x
    pub d: f64, // scale y
    pub e: f64, // translate x
    pub f: f64, // translate y
}

impl AffineTransform {
    /// Identity matrix
    pub const fn identity() -> Self {
        Self {
            a: 1.0, b: 0.0,
            c: 0.0, d: 1.0,
            e: 0.0, f: 0.0,
        }
    }

    /// Create from the six matrix components
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Translation matrix
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Scale matrix
    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation matrix (angle in radians, clockwise in y-down space)
    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// `self * other`: `other` acts on a point first, then `self`.
    pub fn multiply(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Post-multiply in place. Subsequent input is interpreted in the
    /// local space of `other`.
    pub fn append(&mut self, other: &Self) {
        *self = self.multiply(other);
    }

    pub fn translate(&mut self, tx: f64, ty: f64) {
        self.append(&Self::translation(tx, ty));
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.append(&Self::scaling(sx, sy));
    }

    pub fn rotate(&mut self, angle: f64) {
        self.append(&Self::rotation(angle));
    }

    /// Map a point
    pub fn map_point(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Map a rect; the result is the bounding box of the mapped corners.
    pub fn map_rect(&self, r: &Rect) -> Rect {
        Rect::from_points(r.corners().map(|p| self.map_point(p)))
    }

    /// Inverse matrix, `None` when singular
    pub fn inverse(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if det == 0.0 || !det.is_finite() {
            return None;
        }

        let inv_det = 1.0 / det;
        Some(Self {
            a: self.d * inv_det,
            b: -self.b * inv_det,
            c: -self.c * inv_det,
            d: self.a * inv_det,
            e: (self.c * self.f - self.d * self.e) * inv_det,
            f: (self.b * self.e - self.a * self.f) * inv_det,
        })
    }

    /// Check if identity
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// All six components are finite
    pub fn is_finite(&self) -> bool {
        [self.a, self.b, self.c, self.d, self.e, self.f].iter().all(|v| v.is_finite())
    }

    /// Scale factor when the matrix is a uniform scale combined with
    /// rotation, reflection and translation. Lengths then scale by the same
    /// factor in every direction.
    pub fn uniform_scale(&self) -> Option<f64> {
        let sx = self.a.hypot(self.b);
        let sy = self.c.hypot(self.d);
        let tolerance = 1e-9 * sx.max(sy);
        let orthogonal = (self.a * self.c + self.b * self.d).abs() <= tolerance * sx.max(sy);
        (sx > 0.0 && sx.is_finite() && (sx - sy).abs() <= tolerance && orthogonal).then_some(sx)
    }

    /// Only scale and translation, so rects map to rects
    pub fn is_axis_aligned(&self) -> bool {
        self.b == 0.0 && self.c == 0.0
    }

    /// Convert to tiny-skia Transform
    pub fn to_tiny_skia(&self) -> tiny_skia::Transform {
        tiny_skia::Transform::from_row(
            self.a as f32, self.b as f32,
            self.c as f32, self.d as f32,
            self.e as f32, self.f as f32,
        )
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}
