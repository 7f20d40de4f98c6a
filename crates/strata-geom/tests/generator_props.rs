// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
use proptest::prelude::*;
use strata_core::math::{Prng, Vec3};
use strata_geom::{
    compatible, generate, AxisMode, FaceIds, FaceSpan, FaceSpans, GeneratorParams, SurfaceDirection, TileShape,
};

fn normal(face: SurfaceDirection) -> Vec3 {
    match face {
        SurfaceDirection::XPos => Vec3::UNIT_X,
        SurfaceDirection::XNeg => Vec3::UNIT_X.scale(-1.0),
        SurfaceDirection::ZPos => Vec3::UNIT_Z,
        SurfaceDirection::ZNeg => Vec3::UNIT_Z.scale(-1.0),
        SurfaceDirection::YPos => Vec3::UNIT_Y,
        SurfaceDirection::YNeg => Vec3::UNIT_Y.scale(-1.0),
    }
}

fn span() -> impl Strategy<Value = FaceSpan> {
    (0.0f32..2.0, 0.0f32..2.0).prop_map(|(start, end)| FaceSpan { start, end })
}

fn tile() -> impl Strategy<Value = TileShape> {
    (
        (0.5f32..3.0, 0.5f32..3.0, 0.5f32..3.0),
        prop::array::uniform6(0u32..3),
        (span(), span(), span(), span()),
    )
        .prop_map(|((x, y, z), ids, (a, b, c, d))| TileShape {
            size: Vec3::new(x, y, z),
            faces: FaceIds {
                x_pos: ids[0],
                z_neg: ids[1],
                x_neg: ids[2],
                z_pos: ids[3],
                y_pos: ids[4],
                y_neg: ids[5],
            },
            spans: FaceSpans {
                x_pos: a,
                z_neg: b,
                x_neg: c,
                z_pos: d,
            },
        })
}

fn mode() -> impl Strategy<Value = AxisMode> {
    prop::sample::select(vec![AxisMode::Xz, AxisMode::X, AxisMode::Z, AxisMode::Y])
}

proptest! {
    #[test]
    fn every_joint_pairs_compatible_faces_flush(
        prefabs in prop::collection::vec(tile(), 1..6),
        count in 0usize..8,
        axis_mode in mode(),
        allow_repeats in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let params = GeneratorParams { count, axis_mode, allow_repeats, ..GeneratorParams::default() };
        let g = generate(&prefabs, &params, &mut Prng::from_seed_u64(seed)).unwrap();
        prop_assert!(g.tiles.len() <= count);
        prop_assert_eq!(g.tiles.is_empty(), count == 0);
        prop_assert!(g.tiles.first().map_or(true, |t| t.joint.is_none()));

        for pair in g.tiles.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let (anchor_face, moving_face) = next.joint.unwrap();
            let (a, m) = (&prefabs[prev.prefab], &prefabs[next.prefab]);
            prop_assert!(compatible(&a.faces, anchor_face, &m.faces, moving_face));
            prop_assert!(axis_mode.available_directions().contains(&anchor_face));
            prop_assert!(prev.is_used(anchor_face) && next.is_used(moving_face));

            let target = prev.transform.transform_point(&a.anchor_pivot(anchor_face, moving_face));
            let related = m.reference_point(&next.transform, moving_face);
            prop_assert!(related.approx_eq(&target, 1e-3), "{} vs {}", related, target);

            let out_prev = prev.transform.rotation().rotate(&normal(anchor_face));
            let out_next = next.transform.rotation().rotate(&normal(moving_face));
            prop_assert!(out_next.approx_eq(&out_prev.scale(-1.0), 1e-3));
        }

        if !allow_repeats {
            let mut seen: Vec<usize> = g.tiles.iter().map(|t| t.prefab).collect();
            seen.sort_unstable();
            seen.dedup();
            prop_assert_eq!(seen.len(), g.tiles.len());
        }
    }

    #[test]
    fn stacks_are_contiguous_and_report_summed_height(
        heights in prop::collection::vec(0.5f32..3.0, 1..6),
        count in 1usize..8,
        seed in any::<u64>(),
    ) {
        let prefabs: Vec<TileShape> = heights
            .iter()
            .map(|&h| TileShape {
                size: Vec3::new(1.0, h, 1.0),
                faces: FaceIds { y_pos: 1, y_neg: 1, ..FaceIds::default() },
                ..TileShape::default()
            })
            .collect();
        let params = GeneratorParams { count, axis_mode: AxisMode::Y, ..GeneratorParams::default() };
        let g = generate(&prefabs, &params, &mut Prng::from_seed_u64(seed)).unwrap();
        prop_assert_eq!(g.tiles.len(), count.min(prefabs.len()));

        let total: f32 = g.tiles.iter().map(|t| prefabs[t.prefab].size.y()).sum();
        prop_assert!((g.height - total).abs() < 1e-4);

        for pair in g.tiles.windows(2) {
            let (lo_a, lo_b) = (pair[0].transform.translation().y(), pair[1].transform.translation().y());
            let (h_a, h_b) = (prefabs[pair[0].prefab].size.y(), prefabs[pair[1].prefab].size.y());
            let on_top = (lo_b - (lo_a + h_a)).abs() < 1e-3;
            let below = ((lo_b + h_b) - lo_a).abs() < 1e-3;
            prop_assert!(on_top || below);
        }
    }
}

#[test]
fn reserved_last_prefab_closes_the_chain() {
    let cube = TileShape {
        size: Vec3::ONE,
        faces: FaceIds {
            x_pos: 4,
            x_neg: 4,
            ..FaceIds::default()
        },
        ..TileShape::default()
    };
    let params = GeneratorParams {
        count: 4,
        axis_mode: AxisMode::X,
        first: Some(0),
        last: Some(3),
        ..GeneratorParams::default()
    };
    for seed in 0..32 {
        let g = generate(&[cube; 4], &params, &mut Prng::from_seed_u64(seed)).unwrap();
        assert_eq!(g.tiles.len(), 4);
        assert_eq!(g.tiles[0].prefab, 0);
        assert_eq!(g.tiles[3].prefab, 3);
        assert!(g.tiles[1..3].iter().all(|t| t.prefab != 3));
        assert!((g.height - 1.0).abs() < 1e-6);
    }
}
