// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Box faces, their opposites, and the yaw needed to turn one face into another.
//!
//! Horizontal faces form the cycle `X+ → Z- → X- → Z+`: a +90° yaw carries
//! each face onto the next one. Discriminants follow that cycle, so the
//! rotation between two horizontal faces depends only on the difference of
//! their indices.
use core::fmt;
use core::str::FromStr;

use thiserror::Error;
use tracing::warn;

/// One of the six axis-aligned faces of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceDirection {
    /// Face whose outward normal is +X.
    #[cfg_attr(feature = "serde", serde(rename = "x+"))]
    XPos = 0,
    /// Face whose outward normal is -Z.
    #[cfg_attr(feature = "serde", serde(rename = "z-"))]
    ZNeg = 1,
    /// Face whose outward normal is -X.
    #[cfg_attr(feature = "serde", serde(rename = "x-"))]
    XNeg = 2,
    /// Face whose outward normal is +Z.
    #[cfg_attr(feature = "serde", serde(rename = "z+"))]
    ZPos = 3,
    /// Top face.
    #[cfg_attr(feature = "serde", serde(rename = "y+"))]
    YPos = 4,
    /// Bottom face.
    #[cfg_attr(feature = "serde", serde(rename = "y-"))]
    YNeg = 5,
}

impl SurfaceDirection {
    /// Every face in index order.
    pub const ALL: [Self; 6] = [
        Self::XPos,
        Self::ZNeg,
        Self::XNeg,
        Self::ZPos,
        Self::YPos,
        Self::YNeg,
    ];

    /// Position in [`SurfaceDirection::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Face on the other side of the box.
    pub const fn opposite(self) -> Self {
        match self {
            Self::XPos => Self::XNeg,
            Self::ZNeg => Self::ZPos,
            Self::XNeg => Self::XPos,
            Self::ZPos => Self::ZNeg,
            Self::YPos => Self::YNeg,
            Self::YNeg => Self::YPos,
        }
    }

    /// `true` for the top and bottom faces.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::YPos | Self::YNeg)
    }

    /// Short label as written in method arguments.
    pub const fn label(self) -> &'static str {
        match self {
            Self::XPos => "x+",
            Self::ZNeg => "z-",
            Self::XNeg => "x-",
            Self::ZPos => "z+",
            Self::YPos => "y+",
            Self::YNeg => "y-",
        }
    }
}

impl fmt::Display for SurfaceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A face label that is not one of `x+ x- z+ z- y+ y-`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid surface direction {0:?}")]
pub struct SurfaceParseError(pub String);

impl FromStr for SurfaceDirection {
    type Err = SurfaceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x+" => Ok(Self::XPos),
            "x-" => Ok(Self::XNeg),
            "z+" => Ok(Self::ZPos),
            "z-" => Ok(Self::ZNeg),
            "y+" => Ok(Self::YPos),
            "y-" => Ok(Self::YNeg),
            _ => Err(SurfaceParseError(s.to_owned())),
        }
    }
}

/// Which faces take part in adjacency search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AxisMode {
    /// All four horizontal faces.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "xz"))]
    Xz,
    /// The X pair only.
    X,
    /// The Z pair only.
    Z,
    /// Top and bottom only; tiles stack.
    Y,
}

impl AxisMode {
    /// Faces relevant to this mode, in cycle order.
    pub const fn available_directions(self) -> &'static [SurfaceDirection] {
        use SurfaceDirection::{XNeg, XPos, YNeg, YPos, ZNeg, ZPos};
        match self {
            Self::Xz => &[XPos, ZNeg, XNeg, ZPos],
            Self::X => &[XPos, XNeg],
            Self::Z => &[ZPos, ZNeg],
            Self::Y => &[YPos, YNeg],
        }
    }
}

/// Yaw in degrees that turns face `from` so it points where `to` points.
///
/// In [`AxisMode::Y`] the answer is `0` for equal faces and `180` otherwise.
/// Every other mode uses the horizontal cycle; pairs outside it (a vertical
/// face in a horizontal mode) log a warning and yield `0`.
pub fn rotation_delta(from: SurfaceDirection, to: SurfaceDirection, mode: AxisMode) -> f32 {
    let dist = from as i32 - to as i32;
    if mode == AxisMode::Y {
        return if dist == 0 { 0.0 } else { 180.0 };
    }
    match dist {
        1 | -3 => 270.0,
        2 | -2 => 180.0,
        3 | -1 => 90.0,
        0 => 0.0,
        _ => {
            warn!(%from, %to, "no horizontal rotation between faces");
            0.0
        }
    }
}

/// Face identifiers of one tile. Zero marks a face that joins nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FaceIds {
    /// `x+` identifier.
    pub x_pos: u32,
    /// `z-` identifier.
    pub z_neg: u32,
    /// `x-` identifier.
    pub x_neg: u32,
    /// `z+` identifier.
    pub z_pos: u32,
    /// `y+` identifier.
    pub y_pos: u32,
    /// `y-` identifier.
    pub y_neg: u32,
}

impl FaceIds {
    /// Identifier on `face`.
    pub const fn get(&self, face: SurfaceDirection) -> u32 {
        match face {
            SurfaceDirection::XPos => self.x_pos,
            SurfaceDirection::ZNeg => self.z_neg,
            SurfaceDirection::XNeg => self.x_neg,
            SurfaceDirection::ZPos => self.z_pos,
            SurfaceDirection::YPos => self.y_pos,
            SurfaceDirection::YNeg => self.y_neg,
        }
    }
}

/// Whether `anchor_face` of one tile may join `moving_face` of another.
///
/// Identifiers must match and be non-zero, and two top faces (or two bottom
/// faces) never stack.
pub fn compatible(
    anchor: &FaceIds,
    anchor_face: SurfaceDirection,
    moving: &FaceIds,
    moving_face: SurfaceDirection,
) -> bool {
    let id = anchor.get(anchor_face);
    id != 0 && id == moving.get(moving_face) && !(anchor_face.is_vertical() && anchor_face == moving_face)
}

/// Start and end of a horizontal face's usable edge, in tile-local units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaceSpan {
    /// Offset used when the neighbour keeps the default alignment.
    pub start: f32,
    /// Offset used when the neighbour has to be mirrored along the edge.
    pub end: f32,
}

/// Edge spans of the four horizontal faces.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FaceSpans {
    /// `x+` span, measured along local Z.
    pub x_pos: FaceSpan,
    /// `z-` span, measured along local X.
    pub z_neg: FaceSpan,
    /// `x-` span, measured along local Z.
    pub x_neg: FaceSpan,
    /// `z+` span, measured along local X.
    pub z_pos: FaceSpan,
}

impl FaceSpans {
    /// Span of a horizontal face; `None` for the top and bottom.
    pub const fn get(&self, face: SurfaceDirection) -> Option<FaceSpan> {
        match face {
            SurfaceDirection::XPos => Some(self.x_pos),
            SurfaceDirection::ZNeg => Some(self.z_neg),
            SurfaceDirection::XNeg => Some(self.x_neg),
            SurfaceDirection::ZPos => Some(self.z_pos),
            SurfaceDirection::YPos | SurfaceDirection::YNeg => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SurfaceDirection::{XNeg, XPos, YNeg, YPos, ZNeg, ZPos};
    use super::*;
    use strata_core::math::{Quat, Vec3};

    fn normal(face: SurfaceDirection) -> Vec3 {
        match face {
            XPos => Vec3::UNIT_X,
            XNeg => Vec3::UNIT_X.scale(-1.0),
            ZPos => Vec3::UNIT_Z,
            ZNeg => Vec3::UNIT_Z.scale(-1.0),
            YPos => Vec3::UNIT_Y,
            YNeg => Vec3::UNIT_Y.scale(-1.0),
        }
    }

    #[test]
    fn opposite_is_an_involution() {
        for face in SurfaceDirection::ALL {
            assert_ne!(face.opposite(), face);
            assert_eq!(face.opposite().opposite(), face);
        }
    }

    #[test]
    fn rotation_table_matches_signed_differences() {
        assert_eq!(rotation_delta(ZNeg, XPos, AxisMode::Xz), 270.0);
        assert_eq!(rotation_delta(XPos, ZPos, AxisMode::Xz), 270.0);
        assert_eq!(rotation_delta(XNeg, XPos, AxisMode::Xz), 180.0);
        assert_eq!(rotation_delta(XPos, XNeg, AxisMode::X), 180.0);
        assert_eq!(rotation_delta(ZPos, XPos, AxisMode::Xz), 90.0);
        assert_eq!(rotation_delta(XPos, ZNeg, AxisMode::Z), 90.0);
        assert_eq!(rotation_delta(ZPos, ZPos, AxisMode::Xz), 0.0);
        assert_eq!(rotation_delta(YPos, YNeg, AxisMode::Y), 180.0);
        assert_eq!(rotation_delta(YNeg, YNeg, AxisMode::Y), 0.0);
        assert_eq!(rotation_delta(YPos, XPos, AxisMode::Xz), 0.0);
    }

    #[test]
    fn rotation_delta_turns_the_face_normal_onto_the_target() {
        let horizontal = AxisMode::Xz.available_directions();
        for &from in horizontal {
            for &to in horizontal {
                let q = Quat::from_yaw_degrees(rotation_delta(from, to, AxisMode::Xz));
                assert!(
                    q.rotate(&normal(from)).approx_eq(&normal(to), 1e-5),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn labels_parse_case_insensitively() {
        for face in SurfaceDirection::ALL {
            assert_eq!(face.label().parse::<SurfaceDirection>(), Ok(face));
            assert_eq!(face.label().to_uppercase().parse::<SurfaceDirection>(), Ok(face));
        }
        assert!("x".parse::<SurfaceDirection>().is_err());
    }

    #[test]
    fn available_directions_per_mode() {
        assert_eq!(AxisMode::Y.available_directions(), &[YPos, YNeg]);
        assert_eq!(AxisMode::X.available_directions(), &[XPos, XNeg]);
        assert_eq!(AxisMode::Z.available_directions(), &[ZPos, ZNeg]);
        assert_eq!(AxisMode::Xz.available_directions().len(), 4);
    }

    #[test]
    fn compatibility_requires_equal_non_zero_ids() {
        let a = FaceIds {
            x_pos: 3,
            y_pos: 7,
            ..FaceIds::default()
        };
        let b = FaceIds {
            x_neg: 3,
            y_neg: 7,
            y_pos: 7,
            ..FaceIds::default()
        };
        assert!(compatible(&a, XPos, &b, XNeg));
        assert!(compatible(&a, YPos, &b, YNeg));
        assert!(!compatible(&a, YPos, &b, YPos));
        assert!(!compatible(&a, ZPos, &b, ZPos));
        assert!(!compatible(&a, XPos, &b, ZNeg));
    }
}
