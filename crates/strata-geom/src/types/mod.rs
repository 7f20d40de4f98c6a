// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Core geometry types used for placement and validation (transform, AABB).
//!
//! Determinism notes:
//! - Containment is inclusive on faces so tiles that exactly touch a region
//!   boundary are accepted.
//! - Affine math uses `f32` without fused multiply-add to preserve identical
//!   results across platforms.

#[doc = "Axis-aligned bounding boxes."]
pub mod aabb;
#[doc = "Rigid transforms with non-uniform scale."]
pub mod transform;
