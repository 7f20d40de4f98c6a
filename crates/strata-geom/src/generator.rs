// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sequential tile generator: grows a chain of tiles face to face.
//!
//! Every step looks only at the most recently placed tile, collects each
//! `(free face, prefab, prefab face)` triple with matching identifiers, picks
//! a face direction uniformly among the directions that have any candidate and
//! then a candidate uniformly within it. A step with no candidate ends the
//! chain early; a short chain is a normal result.
use strata_core::math::{Quat, RandomSource, Vec3};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::surface::{compatible, AxisMode, SurfaceDirection};
use crate::tile::{place, TileShape};
use crate::types::aabb::Aabb;
use crate::types::transform::Transform;

/// Knobs for one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GeneratorParams {
    /// Requested number of tiles.
    pub count: usize,
    /// Faces that take part in adjacency.
    pub axis_mode: AxisMode,
    /// Prefab for the first tile; random when `None`.
    pub first: Option<usize>,
    /// Prefab reserved for the final slot; no reservation when `None`.
    pub last: Option<usize>,
    /// Whether a prefab may appear more than once.
    pub allow_repeats: bool,
    /// Turn the first tile by a random quarter turn.
    pub random_start_rotation: bool,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            count: 0,
            axis_mode: AxisMode::Xz,
            first: None,
            last: None,
            allow_repeats: false,
            random_start_rotation: true,
        }
    }
}

/// One way to attach a prefab to the current tail of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementCandidate {
    /// Index into the prefab list.
    pub prefab: usize,
    /// Free face on the tail tile.
    pub anchor_face: SurfaceDirection,
    /// Face of the prefab that joins it.
    pub moving_face: SurfaceDirection,
}

/// A tile that made it into the chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTile {
    /// Index into the prefab list.
    pub prefab: usize,
    /// Placement relative to the generator.
    pub transform: Transform,
    /// Faces already joined to a neighbour, indexed by [`SurfaceDirection::index`].
    pub used_faces: [bool; 6],
    /// Face of the previous tile and own face it was joined by; `None` for
    /// the first tile.
    pub joint: Option<(SurfaceDirection, SurfaceDirection)>,
}

impl PlacedTile {
    fn new(prefab: usize, transform: Transform) -> Self {
        Self {
            prefab,
            transform,
            used_faces: [false; 6],
            joint: None,
        }
    }

    /// Whether `face` already joins a neighbour.
    pub const fn is_used(&self, face: SurfaceDirection) -> bool {
        self.used_faces[face.index()]
    }
}

/// Result of [`generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// Tiles in placement order.
    pub tiles: Vec<PlacedTile>,
    /// Summed tile heights in [`AxisMode::Y`], the tallest tile otherwise.
    pub height: f32,
}

impl Generation {
    /// Bounds of every placed tile in generator space; `None` when empty.
    pub fn bounds(&self, prefabs: &[TileShape]) -> Option<Aabb> {
        self.tiles
            .iter()
            .filter_map(|t| {
                let shape = prefabs.get(t.prefab)?;
                Some(Aabb::from_origin_size(Vec3::ZERO, shape.size).transformed(&t.transform.to_mat4()))
            })
            .reduce(|a, b| a.union(&b))
    }
}

/// Generator inputs that cannot produce a chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// Tiles were requested from an empty prefab list.
    #[error("generator has no tile prefabs")]
    NoPrefabs,
    /// `first` or `last` points past the prefab list.
    #[error("{role} prefab index {index} out of range for {len} prefabs")]
    IndexOutOfRange {
        /// `"first"` or `"last"`.
        role: &'static str,
        /// Requested index.
        index: usize,
        /// Number of prefabs.
        len: usize,
    },
}

/// Candidates for attaching the next tile to `tail`.
///
/// Only the mode's faces of `tail` are offered as anchors. The joining tile
/// may use any face of the same family (any horizontal face outside
/// [`AxisMode::Y`]) and is turned onto the anchor by the solver.
///
/// `final_slot` applies the `last` reservation: the reserved prefab is the
/// only choice on the final slot and excluded everywhere else.
pub fn collect_candidates(
    prefabs: &[TileShape],
    tail: &PlacedTile,
    params: &GeneratorParams,
    used_prefabs: &[bool],
    final_slot: bool,
) -> Vec<PlacementCandidate> {
    let Some(tail_shape) = prefabs.get(tail.prefab) else {
        return Vec::new();
    };
    let directions = params.axis_mode.available_directions();
    let moving_faces = match params.axis_mode {
        AxisMode::Y => AxisMode::Y.available_directions(),
        AxisMode::Xz | AxisMode::X | AxisMode::Z => AxisMode::Xz.available_directions(),
    };
    let mut out = Vec::new();
    for &anchor_face in directions {
        if tail.is_used(anchor_face) || tail_shape.faces.get(anchor_face) == 0 {
            continue;
        }
        for (prefab, shape) in prefabs.iter().enumerate() {
            if !params.allow_repeats && used_prefabs.get(prefab).copied().unwrap_or(false) {
                continue;
            }
            if let Some(last) = params.last {
                if final_slot != (prefab == last) {
                    continue;
                }
            }
            for &moving_face in moving_faces {
                if compatible(&tail_shape.faces, anchor_face, &shape.faces, moving_face) {
                    out.push(PlacementCandidate {
                        prefab,
                        anchor_face,
                        moving_face,
                    });
                }
            }
        }
    }
    out
}

fn pick(candidates: &[PlacementCandidate], rng: &mut dyn RandomSource) -> Option<PlacementCandidate> {
    let mut directions: Vec<SurfaceDirection> = candidates.iter().map(|c| c.anchor_face).collect();
    directions.sort_unstable();
    directions.dedup();
    if directions.is_empty() {
        return None;
    }
    let face = directions[rng.next_index(directions.len())];
    let in_direction: Vec<&PlacementCandidate> = candidates.iter().filter(|c| c.anchor_face == face).collect();
    Some(*in_direction[rng.next_index(in_direction.len())])
}

fn check_index(role: &'static str, index: Option<usize>, len: usize) -> Result<(), GenerateError> {
    match index {
        Some(index) if index >= len => Err(GenerateError::IndexOutOfRange { role, index, len }),
        _ => Ok(()),
    }
}

/// Grows a chain of up to `params.count` tiles from `prefabs`.
///
/// The first tile sits at the generator origin. Transforms are relative to
/// the generator.
///
/// # Errors
/// [`GenerateError`] when `count > 0` and the prefab list is empty or an
/// explicit index is out of range.
#[instrument(skip_all, fields(count = params.count, mode = ?params.axis_mode))]
pub fn generate(
    prefabs: &[TileShape],
    params: &GeneratorParams,
    rng: &mut dyn RandomSource,
) -> Result<Generation, GenerateError> {
    if params.count == 0 {
        return Ok(Generation {
            tiles: Vec::new(),
            height: 0.0,
        });
    }
    if prefabs.is_empty() {
        return Err(GenerateError::NoPrefabs);
    }
    check_index("first", params.first, prefabs.len())?;
    check_index("last", params.last, prefabs.len())?;

    let mut used_prefabs = vec![false; prefabs.len()];
    let first = params.first.unwrap_or_else(|| rng.next_index(prefabs.len()));
    let mut start = Transform::identity();
    if params.random_start_rotation {
        let turns = rng.next_index(4) as f32;
        start = start.with_rotation(Quat::from_yaw_degrees(turns * 90.0));
    }
    let mut tiles = vec![PlacedTile::new(first, start)];

    for slot in 1..params.count {
        let tail_index = tiles.len() - 1;
        let tail = tiles[tail_index];
        if !params.allow_repeats {
            used_prefabs[tail.prefab] = true;
        }
        let candidates = collect_candidates(prefabs, &tail, params, &used_prefabs, slot == params.count - 1);
        let Some(choice) = pick(&candidates, rng) else {
            debug!(slot, "no compatible tile; stopping early");
            break;
        };
        let anchor = &prefabs[tail.prefab];
        let moving = &prefabs[choice.prefab];
        let Ok(transform) = place(
            anchor,
            &tail.transform,
            choice.anchor_face,
            moving,
            &Transform::identity(),
            choice.moving_face,
            params.axis_mode,
        ) else {
            break;
        };
        debug!(slot, prefab = choice.prefab, anchor = %choice.anchor_face, moving = %choice.moving_face, "tile placed");
        tiles[tail_index].used_faces[choice.anchor_face.index()] = true;
        let mut placed = PlacedTile::new(choice.prefab, transform);
        placed.used_faces[choice.moving_face.index()] = true;
        placed.joint = Some((choice.anchor_face, choice.moving_face));
        tiles.push(placed);
    }

    let heights = tiles.iter().map(|t| prefabs[t.prefab].size.y());
    let height: f32 = if params.axis_mode == AxisMode::Y {
        heights.sum()
    } else {
        heights.fold(0.0, f32::max)
    };
    Ok(Generation { tiles, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::FaceIds;
    use strata_core::math::Prng;

    fn block(height: f32, y_id: u32) -> TileShape {
        TileShape {
            size: Vec3::new(1.0, height, 1.0),
            faces: FaceIds {
                y_pos: y_id,
                y_neg: y_id,
                ..FaceIds::default()
            },
            ..TileShape::default()
        }
    }

    #[test]
    fn zero_count_generates_nothing() {
        let mut rng = Prng::from_seed_u64(1);
        let g = generate(&[], &GeneratorParams::default(), &mut rng).unwrap();
        assert!(g.tiles.is_empty());
        assert_eq!(g.height, 0.0);
    }

    #[test]
    fn stacking_sums_heights() {
        let prefabs = [block(2.0, 5), block(3.0, 5), block(0.5, 5)];
        let params = GeneratorParams {
            count: 3,
            axis_mode: AxisMode::Y,
            first: Some(0),
            last: Some(2),
            ..GeneratorParams::default()
        };
        let mut rng = Prng::from_seed_u64(9);
        let g = generate(&prefabs, &params, &mut rng).unwrap();
        let order: Vec<usize> = g.tiles.iter().map(|t| t.prefab).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert!((g.height - 5.5).abs() < 1e-5);
    }

    #[test]
    fn chain_stops_when_prefabs_run_out() {
        let prefabs = [block(1.0, 5), block(1.0, 5)];
        let params = GeneratorParams {
            count: 6,
            axis_mode: AxisMode::Y,
            ..GeneratorParams::default()
        };
        let mut rng = Prng::from_seed_u64(3);
        let g = generate(&prefabs, &params, &mut rng).unwrap();
        assert_eq!(g.tiles.len(), 2);
        assert!((g.height - 2.0).abs() < 1e-5);
    }

    #[test]
    fn reserved_last_prefab_waits_for_the_final_slot() {
        let prefabs = [block(1.0, 5), block(1.0, 5)];
        let params = GeneratorParams {
            count: 3,
            axis_mode: AxisMode::Y,
            first: Some(0),
            last: Some(1),
            allow_repeats: true,
            ..GeneratorParams::default()
        };
        let mut rng = Prng::from_seed_u64(4);
        let g = generate(&prefabs, &params, &mut rng).unwrap();
        let order: Vec<usize> = g.tiles.iter().map(|t| t.prefab).collect();
        assert_eq!(order, vec![0, 0, 1]);
    }

    #[test]
    fn single_axis_chains_turn_tiles_onto_side_faces() {
        let a = TileShape {
            size: Vec3::new(2.0, 1.0, 1.0),
            faces: FaceIds {
                x_pos: 1,
                ..FaceIds::default()
            },
            ..TileShape::default()
        };
        let b = TileShape {
            size: Vec3::ONE,
            faces: FaceIds {
                z_neg: 1,
                ..FaceIds::default()
            },
            ..TileShape::default()
        };
        let params = GeneratorParams {
            count: 2,
            axis_mode: AxisMode::X,
            first: Some(0),
            random_start_rotation: false,
            ..GeneratorParams::default()
        };
        let mut rng = Prng::from_seed_u64(6);
        let g = generate(&[a, b], &params, &mut rng).unwrap();
        assert_eq!(g.tiles.len(), 2);
        let joined = g.tiles[1];
        assert_eq!(joined.prefab, 1);
        assert_eq!(joined.joint, Some((SurfaceDirection::XPos, SurfaceDirection::ZNeg)));
        assert!(joined.is_used(SurfaceDirection::ZNeg));

        // b's z- face now looks back along -X at a's x+ face.
        let facing = joined.transform.rotation().rotate(&Vec3::new(0.0, 0.0, -1.0));
        assert!(facing.approx_eq(&Vec3::new(-1.0, 0.0, 0.0), 1e-4), "{facing}");
        let target = a.anchor_pivot(SurfaceDirection::XPos, SurfaceDirection::ZNeg);
        let related = b.reference_point(&joined.transform, SurfaceDirection::ZNeg);
        assert!(related.approx_eq(&target, 1e-4), "{related} vs {target}");
    }

    #[test]
    fn bad_indices_are_reported() {
        let prefabs = [block(1.0, 5)];
        let mut rng = Prng::from_seed_u64(0);
        let params = GeneratorParams {
            count: 2,
            last: Some(4),
            ..GeneratorParams::default()
        };
        assert_eq!(
            generate(&prefabs, &params, &mut rng),
            Err(GenerateError::IndexOutOfRange {
                role: "last",
                index: 4,
                len: 1
            })
        );
        let params = GeneratorParams {
            count: 1,
            ..GeneratorParams::default()
        };
        assert_eq!(generate(&[], &params, &mut rng), Err(GenerateError::NoPrefabs));
    }
}
