// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use strata_core::math::{Mat4, Quat, Vec3};

/// Rigid transform with non-uniform scale used for entity placement.
///
/// Conventions:
/// - `translation` in world units.
/// - `rotation` as a unit quaternion (normalized internally when converting).
/// - `scale` is non-uniform and applied before rotation/translation.
///
/// Determinism:
/// - `to_mat4` constructs `M = T * R * S` with `f32` ops; no FMA to keep
///   results stable across CPUs/targets.
/// - [`Transform::compose`] and [`Transform::inverse`] are exact for uniform
///   scale, which is all the entity hierarchy uses.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Identity transform (no translation, no rotation, unit scale).
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::new(0.0, 0.0, 0.0),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    /// Creates a transform from components.
    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Pure translation.
    pub const fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity(), Vec3::new(1.0, 1.0, 1.0))
    }

    /// Translation component.
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Rotation component.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Scale component.
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Copy with a different translation.
    pub fn with_translation(&self, translation: Vec3) -> Self {
        Self {
            translation,
            ..*self
        }
    }

    /// Copy with a different rotation.
    pub fn with_rotation(&self, rotation: Quat) -> Self {
        Self { rotation, ..*self }
    }

    /// Heading about the vertical axis in degrees, `[0, 360)`.
    pub fn yaw_degrees(&self) -> f32 {
        self.rotation.yaw_degrees()
    }

    /// Returns the column-major `Mat4` corresponding to this transform.
    pub fn to_mat4(&self) -> Mat4 {
        let [sx, sy, sz] = self.scale.to_array();
        let [tx, ty, tz] = self.translation.to_array();
        Mat4::translation(tx, ty, tz)
            .multiply(&self.rotation.to_mat4())
            .multiply(&Mat4::scale(sx, sy, sz))
    }

    /// Maps a point from this transform's local space into its parent space.
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        let scaled = Vec3::new(
            point.x() * self.scale.x(),
            point.y() * self.scale.y(),
            point.z() * self.scale.z(),
        );
        self.rotation.rotate(&scaled).add(&self.translation)
    }

    /// `self ∘ child`: places a child expressed in this transform's local space.
    pub fn compose(&self, child: &Self) -> Self {
        Self {
            translation: self.transform_point(&child.translation),
            rotation: self.rotation.multiply(&child.rotation).normalize(),
            scale: Vec3::new(
                self.scale.x() * child.scale.x(),
                self.scale.y() * child.scale.y(),
                self.scale.z() * child.scale.z(),
            ),
        }
    }

    /// Inverse transform. Zero scale components invert to zero.
    pub fn inverse(&self) -> Self {
        let inv = |s: f32| if s.abs() <= f32::EPSILON { 0.0 } else { 1.0 / s };
        let scale = Vec3::new(inv(self.scale.x()), inv(self.scale.y()), inv(self.scale.z()));
        let rotation = self.rotation.conjugate();
        let back = rotation.rotate(&self.translation.scale(-1.0));
        Self {
            translation: Vec3::new(back.x() * scale.x(), back.y() * scale.y(), back.z() * scale.z()),
            rotation,
            scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_then_inverse_round_trips_a_point() {
        let parent = Transform::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_yaw_degrees(90.0), Vec3::ONE);
        let child = Transform::from_translation(Vec3::new(2.0, 0.0, 0.0));
        let world = parent.compose(&child);
        assert!(world.translation().approx_eq(&Vec3::new(1.0, 2.0, 1.0), 1e-5));
        let local = parent.inverse().compose(&world);
        assert!(local.translation().approx_eq(&child.translation(), 1e-5));
    }

    #[test]
    fn matrix_and_direct_point_mapping_agree() {
        let t = Transform::new(
            Vec3::new(-4.0, 0.5, 2.0),
            Quat::from_yaw_degrees(270.0),
            Vec3::new(2.0, 2.0, 2.0),
        );
        let p = Vec3::new(1.0, 1.0, 0.5);
        assert!(t.to_mat4().transform_point(&p).approx_eq(&t.transform_point(&p), 1e-5));
    }
}
