// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Region validator: tiles must stay inside the configured space.
use strata_core::{EntityId, SpatialValidator};
use strata_geom::{Region, TileShape};
use tracing::warn;

use crate::scene::{EntityKind, Scene};

/// Flags tiles (and generators, through their tiles) that leave a [`Region`].
///
/// Entities without geometry never violate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionValidator {
    region: Region,
}

impl RegionValidator {
    /// Validator for `region`.
    pub fn new(region: Region) -> Self {
        Self { region }
    }

    /// The region checked against.
    pub fn region(&self) -> &Region {
        &self.region
    }

    fn tile_outside(&self, scene: &Scene, id: EntityId, shape: &TileShape) -> bool {
        let Some(world) = scene.world_transform(id) else {
            return false;
        };
        let inside = self.region.contains_tile(&world, shape.size);
        if !inside {
            let name = scene.get(id).map_or("", |e| e.name());
            warn!(entity = %id, name, position = %world.translation(), "tile outside space");
        }
        !inside
    }
}

impl SpatialValidator<Scene> for RegionValidator {
    fn violates(&self, scene: &Scene, entity: EntityId) -> bool {
        match scene.get(entity).map(|e| e.kind()) {
            Some(EntityKind::Tile(shape)) => self.tile_outside(scene, entity, shape),
            Some(EntityKind::Generator { tiles, .. }) => tiles.iter().any(|&tile| {
                match scene.get(tile).map(|e| e.kind()) {
                    Some(EntityKind::Tile(shape)) => self.tile_outside(scene, tile, shape),
                    _ => false,
                }
            }),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{Link, LinkTable};
    use crate::prefab::{Prefab, PrefabCatalog, PrefabKind};
    use strata_core::math::{Prng, Vec3};
    use strata_core::{SpawnRequest, Spawner};
    use strata_geom::Transform;

    #[test]
    fn only_tiles_can_leave_the_region() {
        let catalog = PrefabCatalog::new(vec![Prefab {
            name: "Box".into(),
            kind: PrefabKind::Tile(TileShape {
                size: Vec3::ONE,
                ..TileShape::default()
            }),
        }]);
        let links = LinkTable::new(vec![Link {
            symbol: "B".into(),
            prefabs: vec!["Box".into()],
        }]);
        let mut scene = Scene::new(catalog, links);
        let mut rng = Prng::from_seed_u64(2);
        let tile = scene.spawn(&SpawnRequest { name: "B", args: "" }, &mut rng).entity;
        let marker = scene.spawn(&SpawnRequest { name: "M", args: "" }, &mut rng).entity;

        let validator = RegionValidator::new(Region::new(Vec3::ZERO, Vec3::new(2.0, 2.0, 2.0)));
        assert!(!validator.violates(&scene, tile));

        let far = Transform::from_translation(Vec3::new(5.0, 0.0, 0.0));
        scene.set_world_transform(tile, far);
        scene.set_world_transform(marker, far);
        assert!(validator.violates(&scene, tile));
        assert!(!validator.violates(&scene, marker));
    }
}
