// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use strata_core::math::{Mat4, Vec3};

/// Axis-aligned bounding box.
///
/// Invariants:
/// - `min` components are less than or equal to `max` components.
/// - Values are `f32` world units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Constructs an AABB from its minimum and maximum corners, sorting each
    /// axis so the invariant holds for any input.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self::from_points(&[a, b])
    }

    /// Box spanning `origin` to `origin + size` (negative sizes are sorted).
    pub fn from_origin_size(origin: Vec3, size: Vec3) -> Self {
        Self::new(origin, origin.add(&size))
    }

    /// Returns the minimum corner.
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Returns the maximum corner.
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Vec3 {
        self.min.add(&self.max).scale(0.5)
    }

    /// Edge lengths.
    pub fn size(&self) -> Vec3 {
        self.max.sub(&self.min)
    }

    /// Returns `true` if `point` lies inside or on the boundary.
    pub fn contains_point(&self, point: &Vec3) -> bool {
        let p = point.to_array();
        let lo = self.min.to_array();
        let hi = self.max.to_array();
        (0..3).all(|i| lo[i] <= p[i] && p[i] <= hi[i])
    }

    /// Returns the union of two AABBs.
    pub fn union(&self, other: &Self) -> Self {
        let a = self.min.to_array();
        let b = self.max.to_array();
        let c = other.min.to_array();
        let d = other.max.to_array();
        Self {
            min: Vec3::new(a[0].min(c[0]), a[1].min(c[1]), a[2].min(c[2])),
            max: Vec3::new(b[0].max(d[0]), b[1].max(d[1]), b[2].max(d[2])),
        }
    }

    /// Grows the box by a uniform margin `m` in all directions.
    pub fn inflate(&self, m: f32) -> Self {
        let delta = Vec3::new(m, m, m);
        Self {
            min: self.min.sub(&delta),
            max: self.max.add(&delta),
        }
    }

    /// Box that bounds this one after transformation by `mat`.
    pub fn transformed(&self, mat: &Mat4) -> Self {
        let [minx, miny, minz] = self.min.to_array();
        let [maxx, maxy, maxz] = self.max.to_array();
        let corners = [
            Vec3::new(minx, miny, minz),
            Vec3::new(minx, miny, maxz),
            Vec3::new(minx, maxy, minz),
            Vec3::new(minx, maxy, maxz),
            Vec3::new(maxx, miny, minz),
            Vec3::new(maxx, miny, maxz),
            Vec3::new(maxx, maxy, minz),
            Vec3::new(maxx, maxy, maxz),
        ]
        .map(|c| mat.transform_point(&c));
        Self::from_points(&corners)
    }

    /// Minimal box containing all `points`; a degenerate box at the origin
    /// when `points` is empty.
    fn from_points(points: &[Vec3]) -> Self {
        let Some((first, rest)) = points.split_first() else {
            return Self {
                min: Vec3::ZERO,
                max: Vec3::ZERO,
            };
        };
        let mut min = *first;
        let mut max = *first;
        for p in rest {
            let a = p.to_array();
            let mi = min.to_array();
            let ma = max.to_array();
            min = Vec3::new(mi[0].min(a[0]), mi[1].min(a[1]), mi[2].min(a[2]));
            max = Vec3::new(ma[0].max(a[0]), ma[1].max(a[1]), ma[2].max(a[2]));
        }
        Self { min, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_sorted_per_axis() {
        let b = Aabb::new(Vec3::new(2.0, -1.0, 5.0), Vec3::new(0.0, 3.0, 4.0));
        assert_eq!(b.min(), Vec3::new(0.0, -1.0, 4.0));
        assert_eq!(b.max(), Vec3::new(2.0, 3.0, 5.0));
        assert_eq!(b.center(), Vec3::new(1.0, 1.0, 4.5));
    }

    #[test]
    fn containment_is_inclusive() {
        let b = Aabb::from_origin_size(Vec3::ZERO, Vec3::ONE);
        assert!(b.contains_point(&Vec3::ONE));
        assert!(!b.contains_point(&Vec3::new(1.01, 0.5, 0.5)));
        assert!(b.inflate(0.1).contains_point(&Vec3::new(1.05, 0.5, 0.5)));
    }

    #[test]
    fn transformed_box_bounds_translated_corners() {
        let b = Aabb::from_origin_size(Vec3::ZERO, Vec3::ONE);
        let moved = b.transformed(&Mat4::translation(3.0, 0.0, -1.0));
        assert_eq!(moved.min(), Vec3::new(3.0, 0.0, -1.0));
        assert_eq!(moved.union(&b).size(), Vec3::new(4.0, 1.0, 2.0));
    }
}
