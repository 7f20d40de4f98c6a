// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use strata_core::math::Vec3;

use crate::types::aabb::Aabb;
use crate::types::transform::Transform;

/// Slack added to the full width of each axis when testing containment.
pub const REGION_TOLERANCE: f32 = 0.2;

/// Bounded box that spawned tiles must stay inside.
///
/// A point passes when `2 * |center - p| <= size + REGION_TOLERANCE` on every
/// axis, i.e. the box grown by half the tolerance on each side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    bounds: Aabb,
}

impl Region {
    /// Region spanning `origin` to `origin + size`.
    pub fn new(origin: Vec3, size: Vec3) -> Self {
        Self {
            bounds: Aabb::from_origin_size(origin, size),
        }
    }

    /// The exact box, without tolerance.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Whether `point` lies within the tolerant bounds.
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.bounds.inflate(REGION_TOLERANCE * 0.5).contains_point(point)
    }

    /// Whether a tile of `size` placed at `world` keeps both its origin
    /// corner and its far corner inside.
    ///
    /// Only those two probes are tested; a rotated tile can poke a side
    /// corner out and still pass.
    pub fn contains_tile(&self, world: &Transform, size: Vec3) -> bool {
        self.contains_point(&world.translation()) && self.contains_point(&world.transform_point(&size))
    }
}
