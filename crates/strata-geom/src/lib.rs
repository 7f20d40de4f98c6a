// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    rust_2018_idioms,
    missing_docs,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::module_name_repetitions, clippy::too_many_arguments)]
#![doc = r"Geometry for strata tiles.

This crate provides:
- Axis-aligned bounding boxes (`Aabb`) and rigid transforms (`Transform`).
- The six-face surface model and the yaw that turns one face onto another.
- The tile placement solver that joins two tiles face to face.
- The sequential generator that grows a chain of compatible tiles.
- The bounded `Region` that spawned tiles are validated against.

Design notes:
- Deterministic: every random choice goes through a caller-supplied
  `RandomSource`.
- Float32 throughout; operations favor clarity and reproducibility.
"]

/// Sequential tile generation.
pub mod generator;
/// Bounded validation region.
pub mod region;
/// Faces, axis modes and face identifiers.
pub mod surface;
/// Tile shapes and face-to-face placement.
pub mod tile;
/// Foundational geometric types.
pub mod types;

pub use generator::{generate, GenerateError, Generation, GeneratorParams, PlacedTile, PlacementCandidate};
pub use region::{Region, REGION_TOLERANCE};
pub use surface::{
    compatible, rotation_delta, AxisMode, FaceIds, FaceSpan, FaceSpans, SurfaceDirection, SurfaceParseError,
};
pub use tile::{align, place, quantized_yaw, PlacementError, TileShape};
pub use types::aabb::Aabb;
pub use types::transform::Transform;
