// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::{deg_to_rad, rad_to_deg, wrap_degrees, Mat4, Vec3, EPSILON};

/// Quaternion stored as `(x, y, z, w)` with deterministic float32 rounding.
///
/// Rotations are right-handed about their axis, so a positive quarter turn
/// about +Y carries +X onto -Z. The surface model relies on that sense: the
/// horizontal faces X+, Z-, X-, Z+ follow each other under +90° yaw steps.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quat {
    data: [f32; 4],
}

impl Quat {
    /// Creates a quaternion from components.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { data: [x, y, z, w] }
    }

    /// Returns the quaternion as an array.
    pub fn to_array(self) -> [f32; 4] {
        self.data
    }

    fn component(&self, idx: usize) -> f32 {
        self.data[idx]
    }

    /// Returns the identity quaternion.
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Constructs a quaternion from a rotation axis and angle in radians.
    ///
    /// Returns the identity quaternion when the axis length is ≤ `EPSILON`.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let len_sq = axis.length_squared();
        if len_sq <= EPSILON * EPSILON {
            return Self::identity();
        }
        let norm_axis = axis.scale(1.0 / len_sq.sqrt());
        let (sin_half, cos_half) = (angle * 0.5).sin_cos();
        let scaled = norm_axis.scale(sin_half);
        Self::new(scaled.x(), scaled.y(), scaled.z(), cos_half)
    }

    /// Rotation of `degrees` about the vertical axis.
    pub fn from_yaw_degrees(degrees: f32) -> Self {
        Self::from_axis_angle(Vec3::UNIT_Y, deg_to_rad(degrees))
    }

    /// Builds a rotation from Euler angles in degrees.
    ///
    /// Applied as roll about Z, then pitch about X, then yaw about Y (all
    /// about fixed world axes), which is the order authored `SetRot` triples
    /// expect.
    pub fn from_euler_degrees(euler: Vec3) -> Self {
        let qx = Self::from_axis_angle(Vec3::UNIT_X, deg_to_rad(euler.x()));
        let qy = Self::from_axis_angle(Vec3::UNIT_Y, deg_to_rad(euler.y()));
        let qz = Self::from_axis_angle(Vec3::UNIT_Z, deg_to_rad(euler.z()));
        qy.multiply(&qx).multiply(&qz)
    }

    /// Hamilton product (`self * other`): applying the result rotates by
    /// `other` first and then by `self`.
    ///
    /// # Examples
    /// ```
    /// use strata_core::math::{Quat, Vec3};
    /// let yaw = Quat::from_yaw_degrees(90.0);
    /// let pitch = Quat::from_axis_angle(Vec3::UNIT_X, core::f32::consts::FRAC_PI_2);
    /// assert_ne!(yaw.multiply(&pitch).to_array(), pitch.multiply(&yaw).to_array());
    /// ```
    pub fn multiply(&self, other: &Self) -> Self {
        let [ax, ay, az, aw] = self.data;
        let [bx, by, bz, bw] = other.data;
        Self::new(
            aw * bx + ax * bw + ay * bz - az * by,
            aw * by - ax * bz + ay * bw + az * bx,
            aw * bz + ax * by - ay * bx + az * bw,
            aw * bw - ax * bx - ay * by - az * bz,
        )
    }

    /// Inverse rotation for unit quaternions.
    pub fn conjugate(&self) -> Self {
        Self::new(
            -self.component(0),
            -self.component(1),
            -self.component(2),
            self.component(3),
        )
    }

    /// Normalises the quaternion; returns identity when norm is ~0.
    pub fn normalize(&self) -> Self {
        let len = self.data.iter().map(|c| c * c).sum::<f32>().sqrt();
        if len <= EPSILON {
            return Self::identity();
        }
        let inv = 1.0 / len;
        Self::new(
            self.component(0) * inv,
            self.component(1) * inv,
            self.component(2) * inv,
            self.component(3) * inv,
        )
    }

    /// Rotates a vector by this (unit) quaternion.
    pub fn rotate(&self, v: &Vec3) -> Vec3 {
        let q = Vec3::new(self.component(0), self.component(1), self.component(2));
        let w = self.component(3);
        let t = q.cross(v).scale(2.0);
        v.add(&t.scale(w)).add(&q.cross(&t))
    }

    /// Heading about the vertical axis in degrees, wrapped into `[0, 360)`.
    ///
    /// Measured from where +X ends up after the rotation, projected onto the
    /// ground plane.
    pub fn yaw_degrees(&self) -> f32 {
        let forward = self.rotate(&Vec3::UNIT_X);
        wrap_degrees(rad_to_deg((-forward.z()).atan2(forward.x())))
    }

    /// Converts the quaternion to a rotation matrix (column-major 4×4).
    pub fn to_mat4(&self) -> Mat4 {
        let q = self.normalize();
        let [x, y, z, w] = q.data;

        let xx = x * x;
        let yy = y * y;
        let zz = z * z;
        let xy = x * y;
        let xz = x * z;
        let yz = y * z;
        let wx = w * x;
        let wy = w * y;
        let wz = w * z;

        Mat4::new([
            1.0 - 2.0 * (yy + zz),
            2.0 * (xy + wz),
            2.0 * (xz - wy),
            0.0,
            2.0 * (xy - wz),
            1.0 - 2.0 * (xx + zz),
            2.0 * (yz + wx),
            0.0,
            2.0 * (xz + wy),
            2.0 * (yz - wx),
            1.0 - 2.0 * (xx + yy),
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f32; 4]> for Quat {
    fn from(value: [f32; 4]) -> Self {
        Self { data: value }
    }
}
