// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tile geometry and the face-to-face placement solver.
use strata_core::math::{Quat, Vec3};
use thiserror::Error;

use crate::surface::{compatible, rotation_delta, AxisMode, FaceIds, FaceSpans, SurfaceDirection};
use crate::types::transform::Transform;

/// Yaw values closer than this to a quarter turn snap onto it.
pub const YAW_SNAP_TOLERANCE: f32 = 1e-2;

/// Declared geometry of a tile: a box from the local origin to `size`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileShape {
    /// Extent along each local axis.
    pub size: Vec3,
    /// Face identifiers.
    #[cfg_attr(feature = "serde", serde(default))]
    pub faces: FaceIds,
    /// Usable edge span of each horizontal face.
    #[cfg_attr(feature = "serde", serde(default))]
    pub spans: FaceSpans,
}

impl TileShape {
    /// Local reference point on `face`, at the start of its span.
    pub fn pivot(&self, face: SurfaceDirection) -> Vec3 {
        self.pivot_at(face, false)
    }

    /// Local reference point on `face`, at the end of its span.
    ///
    /// Top and bottom faces have a single pivot.
    pub fn reverted_pivot(&self, face: SurfaceDirection) -> Vec3 {
        self.pivot_at(face, true)
    }

    fn pivot_at(&self, face: SurfaceDirection, reverted: bool) -> Vec3 {
        let along = |span: crate::surface::FaceSpan| if reverted { span.end } else { span.start };
        let [sx, sy, sz] = self.size.to_array();
        match face {
            SurfaceDirection::XPos => Vec3::new(sx, 0.0, along(self.spans.x_pos)),
            SurfaceDirection::ZNeg => Vec3::new(along(self.spans.z_neg), 0.0, 0.0),
            SurfaceDirection::XNeg => Vec3::new(0.0, 0.0, along(self.spans.x_neg)),
            SurfaceDirection::ZPos => Vec3::new(along(self.spans.z_pos), 0.0, sz),
            SurfaceDirection::YPos => Vec3::new(0.0, sy, 0.0),
            SurfaceDirection::YNeg => Vec3::ZERO,
        }
    }

    /// Pivot on the anchor's `anchor_face` that a neighbour joining with
    /// `moving_face` lines up against.
    ///
    /// Joins that mirror the neighbour along the edge use the end of the span.
    pub fn anchor_pivot(&self, anchor_face: SurfaceDirection, moving_face: SurfaceDirection) -> Vec3 {
        use SurfaceDirection::{XNeg, XPos, ZNeg, ZPos};
        let reverted = match anchor_face {
            XPos => moving_face == XPos,
            ZNeg => moving_face == ZNeg,
            XNeg => matches!(moving_face, XNeg | ZPos),
            ZPos => matches!(moving_face, ZPos | XNeg),
            SurfaceDirection::YPos | SurfaceDirection::YNeg => false,
        };
        self.pivot_at(anchor_face, reverted)
    }

    /// World point of `face` used when this tile is the one being moved.
    pub fn reference_point(&self, placed: &Transform, face: SurfaceDirection) -> Vec3 {
        match face {
            SurfaceDirection::YPos => placed.translation().add(&Vec3::new(0.0, self.size.y(), 0.0)),
            SurfaceDirection::YNeg => placed.translation(),
            _ => placed.transform_point(&self.pivot(face)),
        }
    }
}

/// A requested face pairing that the identifiers do not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("face {anchor_face} (id {anchor_id}) cannot join face {moving_face} (id {moving_id})")]
pub struct PlacementError {
    /// Face on the tile already in place.
    pub anchor_face: SurfaceDirection,
    /// Its identifier.
    pub anchor_id: u32,
    /// Face on the tile being placed.
    pub moving_face: SurfaceDirection,
    /// Its identifier.
    pub moving_id: u32,
}

/// Anchor yaw snapped to a quarter turn; anything off-grid counts as `0`.
pub fn quantized_yaw(transform: &Transform) -> f32 {
    let yaw = transform.yaw_degrees();
    [0.0_f32, 90.0, 180.0, 270.0, 360.0]
        .into_iter()
        .find(|q| (yaw - q).abs() <= YAW_SNAP_TOLERANCE)
        .map_or(0.0, |q| if q >= 360.0 { 0.0 } else { q })
}

/// Moves `moving` so its `moving_face` sits flush against `anchor_face`.
///
/// Rotation: the moving tile turns by the anchor's (snapped) yaw plus the
/// delta that points `moving_face` opposite `anchor_face`, on top of its
/// current orientation. Position: the tile then slides so its face pivot
/// lands on the anchor's pivot. Scale is left alone. Face identifiers are not
/// consulted; see [`place`].
pub fn align(
    anchor: &TileShape,
    anchor_transform: &Transform,
    anchor_face: SurfaceDirection,
    moving: &TileShape,
    moving_transform: &Transform,
    moving_face: SurfaceDirection,
    mode: AxisMode,
) -> Transform {
    let target = anchor_face.opposite();
    let yaw = quantized_yaw(anchor_transform) + rotation_delta(moving_face, target, mode);
    let rotated = moving_transform.with_rotation(
        moving_transform
            .rotation()
            .multiply(&Quat::from_yaw_degrees(yaw))
            .normalize(),
    );

    let target_point = anchor_transform.transform_point(&anchor.anchor_pivot(anchor_face, moving_face));
    let related = moving.reference_point(&rotated, moving_face);
    rotated.with_translation(rotated.translation().add(&target_point.sub(&related)))
}

/// [`align`] guarded by face compatibility.
///
/// # Errors
/// [`PlacementError`] when the identifiers differ, either is zero, or both
/// faces are the same vertical face.
pub fn place(
    anchor: &TileShape,
    anchor_transform: &Transform,
    anchor_face: SurfaceDirection,
    moving: &TileShape,
    moving_transform: &Transform,
    moving_face: SurfaceDirection,
    mode: AxisMode,
) -> Result<Transform, PlacementError> {
    if !compatible(&anchor.faces, anchor_face, &moving.faces, moving_face) {
        return Err(PlacementError {
            anchor_face,
            anchor_id: anchor.faces.get(anchor_face),
            moving_face,
            moving_id: moving.faces.get(moving_face),
        });
    }
    Ok(align(
        anchor,
        anchor_transform,
        anchor_face,
        moving,
        moving_transform,
        moving_face,
        mode,
    ))
}
