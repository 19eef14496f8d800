use glam::{Quat, Vec3, Vec4};

/// Values that can be blended between two keyframes.
pub trait Interpolatable: Copy + Clone + Sized {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + t * (end - start)
    }
}

impl Interpolatable for Quat {
    /// Shortest-path component-wise blend.
    ///
    /// Both inputs are normalized first. When they lie on opposite
    /// hemispheres (negative dot product) `end` is negated so the blend
    /// follows the shorter arc. The result is *not* renormalized; see
    /// [`RotationBlend`](crate::RotationBlend) for the normalized variant.
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        let a = Vec4::from(start.normalize());
        let mut b = Vec4::from(end.normalize());

        if a.dot(b) < 0.0 {
            b = -b;
        }

        Quat::from_vec4(a * (1.0 - t) + b * t)
    }
}
