// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Deterministic math helpers: vectors, quaternions, column-major matrices,
//! and the seedable random source every stochastic decision funnels through.
//!
//! All operations round to `f32` so a fixed seed reproduces the same
//! structure on every supported platform.

use std::f32::consts::TAU;

mod mat4;
mod prng;
mod quat;
mod vec3;

pub use mat4::Mat4;
pub use prng::{Prng, RandomSource};
pub use quat::Quat;
pub use vec3::Vec3;

/// Global epsilon used by math routines when detecting degenerate values.
pub const EPSILON: f32 = 1e-6;

/// Converts degrees to radians with float32 precision.
pub fn deg_to_rad(value: f32) -> f32 {
    value * (TAU / 360.0)
}

/// Converts radians to degrees with float32 precision.
pub fn rad_to_deg(value: f32) -> f32 {
    value * (360.0 / TAU)
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(value: f32) -> f32 {
    let wrapped = value % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}
