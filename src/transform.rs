//! 2D affine transforms for the visual pipeline.
//!
//! Transforms are visual only: layout runs in untransformed desktop
//! coordinates, and a control's scale/rotation is applied around a pivot
//! expressed as a fraction of its own bounds. `to_global` maps a local point
//! to screen space, `to_local` applies the cached inverse.

use crate::math::{Rect, Vector2};

/// A 2×3 row-major affine matrix:
///
/// ```text
/// | m11 m12 |        x' = x*m11 + y*m21 + dx
/// | m21 m22 |        y' = x*m12 + y*m22 + dy
/// | dx  dy  |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
        dx: 0.0,
        dy: 0.0,
    };

    pub fn translation(dx: f32, dy: f32) -> Self {
        Transform {
            dx,
            dy,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Transform {
            m11: sx,
            m22: sy,
            ..Self::IDENTITY
        }
    }

    pub fn rotation_degrees(degrees: f32) -> Self {
        let radians = degrees.to_radians();
        let (sin, cos) = radians.sin_cos();
        Transform {
            m11: cos,
            m12: sin,
            m21: -sin,
            m22: cos,
            dx: 0.0,
            dy: 0.0,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// `self` applied first, then `after`.
    pub fn then(&self, after: &Transform) -> Transform {
        Transform {
            m11: self.m11 * after.m11 + self.m12 * after.m21,
            m12: self.m11 * after.m12 + self.m12 * after.m22,
            m21: self.m21 * after.m11 + self.m22 * after.m21,
            m22: self.m21 * after.m12 + self.m22 * after.m22,
            dx: self.dx * after.m11 + self.dy * after.m21 + after.dx,
            dy: self.dx * after.m12 + self.dy * after.m22 + after.dy,
        }
    }

    pub fn apply(&self, p: Vector2) -> Vector2 {
        Vector2::new(
            p.x * self.m11 + p.y * self.m21 + self.dx,
            p.x * self.m12 + p.y * self.m22 + self.dy,
        )
    }

    /// Inverse matrix, or `None` when the transform is singular
    /// (e.g. a zero scale axis).
    pub fn invert(&self) -> Option<Transform> {
        let det = self.m11 * self.m22 - self.m12 * self.m21;
        if det.abs() < f32::EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let m11 = self.m22 * inv_det;
        let m12 = -self.m12 * inv_det;
        let m21 = -self.m21 * inv_det;
        let m22 = self.m11 * inv_det;
        Some(Transform {
            m11,
            m12,
            m21,
            m22,
            dx: -(self.dx * m11 + self.dy * m21),
            dy: -(self.dx * m12 + self.dy * m22),
        })
    }

    /// Builds the visual pose for a control: rotation and scale around a
    /// pivot given as a fraction of `bounds`.
    pub fn from_pose(bounds: Rect, origin_fraction: Vector2, scale: Vector2, rotation_degrees: f32) -> Transform {
        if scale == Vector2::ONE && rotation_degrees == 0.0 {
            return Self::IDENTITY;
        }
        let pivot = Vector2::new(
            bounds.x as f32 + bounds.width as f32 * origin_fraction.x,
            bounds.y as f32 + bounds.height as f32 * origin_fraction.y,
        );
        Self::translation(-pivot.x, -pivot.y)
            .then(&Self::scale(scale.x, scale.y))
            .then(&Self::rotation_degrees(rotation_degrees))
            .then(&Self::translation(pivot.x, pivot.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rect;

    fn close(a: Vector2, b: Vector2) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn compose_order_is_left_to_right() {
        let t = Transform::scale(2.0, 2.0).then(&Transform::translation(10.0, 0.0));
        assert!(close(t.apply(Vector2::new(1.0, 1.0)), Vector2::new(12.0, 2.0)));

        let t = Transform::translation(10.0, 0.0).then(&Transform::scale(2.0, 2.0));
        assert!(close(t.apply(Vector2::new(1.0, 1.0)), Vector2::new(22.0, 2.0)));
    }

    #[test]
    fn invert_round_trips() {
        let t = Transform::from_pose(
            Rect::new(10, 20, 100, 50),
            Vector2::new(0.5, 0.5),
            Vector2::new(2.0, 3.0),
            37.0,
        );
        let inv = t.invert().unwrap();
        let p = Vector2::new(42.0, 31.0);
        assert!(close(inv.apply(t.apply(p)), p));
        assert!(close(t.apply(inv.apply(p)), p));
    }

    #[test]
    fn zero_scale_is_singular() {
        assert!(Transform::scale(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn rotation_around_pivot_keeps_pivot_fixed() {
        let bounds = Rect::new(0, 0, 100, 100);
        let t = Transform::from_pose(bounds, Vector2::new(0.5, 0.5), Vector2::ONE, 90.0);
        assert!(close(t.apply(Vector2::new(50.0, 50.0)), Vector2::new(50.0, 50.0)));
        // Top-left corner rotates to the top-right corner.
        assert!(close(t.apply(Vector2::new(0.0, 0.0)), Vector2::new(100.0, 0.0)));
    }

    #[test]
    fn default_pose_is_identity() {
        let t = Transform::from_pose(
            Rect::new(5, 5, 10, 10),
            Vector2::new(0.5, 0.5),
            Vector2::ONE,
            0.0,
        );
        assert!(t.is_identity());
    }
}
