// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Entity arena with a transform hierarchy; the reference [`Spawner`].
//!
//! Each run owns a holder entity placed at the spawn origin. Every entity the
//! engine spawns during that run starts out as a child of the holder, so
//! moving the holder moves the whole run.
use strata_core::math::{RandomSource, Vec3};
use strata_core::{EntityId, MethodCall, SpawnRequest, SpawnedEntity, Spawner};
use strata_geom::{generate, TileShape, Transform};
use tracing::{debug, warn};

use crate::link::LinkTable;
use crate::methods;
use crate::prefab::{GeneratorPrefab, PrefabCatalog, PrefabKind};

/// What an entity is.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    /// Root of one run.
    Holder,
    /// Entity without geometry.
    Marker,
    /// Entity with declared geometry.
    Tile(TileShape),
    /// Entity whose geometry lives in the tiles it generated.
    Generator {
        /// Generated tiles in placement order; all are children.
        tiles: Vec<EntityId>,
        /// Reported structure height.
        height: f32,
    },
}

/// One node of the hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    name: String,
    prefab: Option<String>,
    kind: EntityKind,
    local: Transform,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    settled: bool,
}

impl Entity {
    fn new(name: impl Into<String>, prefab: Option<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            prefab,
            kind,
            local: Transform::identity(),
            parent: None,
            children: Vec::new(),
            settled: false,
        }
    }

    /// Symbol (or holder) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prefab the entity was built from; `None` for placeholders and holders.
    pub fn prefab(&self) -> Option<&str> {
        self.prefab.as_deref()
    }

    /// Kind and kind-specific data.
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Transform relative to the parent.
    pub fn local(&self) -> Transform {
        self.local
    }

    /// Parent in the hierarchy.
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Children in attachment order.
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Whether the end-of-execution notification arrived.
    pub fn is_settled(&self) -> bool {
        self.settled
    }
}

/// Arena of entities. Discarded slots stay empty; ids are never reused.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    catalog: PrefabCatalog,
    links: LinkTable,
    spawn_origin: Vec3,
    entities: Vec<Option<Entity>>,
    holder: Option<EntityId>,
}

impl Scene {
    /// Empty scene spawning from `catalog` through `links`.
    pub fn new(catalog: PrefabCatalog, links: LinkTable) -> Self {
        Self {
            catalog,
            links,
            ..Self::default()
        }
    }

    /// Sets the world position new holders are created at.
    pub fn with_spawn_origin(mut self, origin: Vec3) -> Self {
        self.spawn_origin = origin;
        self
    }

    /// Prefab catalogue.
    pub fn catalog(&self) -> &PrefabCatalog {
        &self.catalog
    }

    /// Live entity, if any.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(usize::try_from(id.0).ok()?)?.as_ref()
    }

    fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(usize::try_from(id.0).ok()?)?.as_mut()
    }

    /// Whether `id` refers to a live entity.
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Live entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .filter_map(|(i, e)| Some((EntityId(i as u64), e.as_ref()?)))
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.iter().flatten().count()
    }

    /// `true` when nothing is alive.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, entity: Entity, parent: Option<EntityId>) -> EntityId {
        let id = EntityId(self.entities.len() as u64);
        self.entities.push(Some(entity));
        if let Some(parent) = parent {
            self.attach(id, parent);
        }
        id
    }

    fn attach(&mut self, child: EntityId, parent: EntityId) {
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    fn detach(&mut self, child: EntityId) {
        let Some(parent) = self.get_mut(child).and_then(|c| c.parent.take()) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|&c| c != child);
        }
    }

    /// World transform, composed through every ancestor.
    pub fn world_transform(&self, id: EntityId) -> Option<Transform> {
        let entity = self.get(id)?;
        Some(match entity.parent {
            Some(parent) => self.world_transform(parent).unwrap_or_default().compose(&entity.local),
            None => entity.local,
        })
    }

    /// Moves an entity so its world transform becomes `world`.
    pub fn set_world_transform(&mut self, id: EntityId, world: Transform) {
        let parent_world = self
            .get(id)
            .and_then(|e| e.parent)
            .and_then(|p| self.world_transform(p))
            .unwrap_or_default();
        if let Some(entity) = self.get_mut(id) {
            entity.local = parent_world.inverse().compose(&world);
        }
    }

    /// Replaces the local transform.
    pub fn set_local_transform(&mut self, id: EntityId, local: Transform) {
        if let Some(entity) = self.get_mut(id) {
            entity.local = local;
        }
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.get(current).and_then(Entity::parent);
        }
        false
    }

    /// Reparents `child` under `parent`.
    ///
    /// `keep_world` preserves the world transform; otherwise the local
    /// transform is kept and the entity moves with its new parent. Refuses
    /// (returns `false`) missing entities and cycles.
    pub fn set_parent(&mut self, child: EntityId, parent: EntityId, keep_world: bool) -> bool {
        if !self.contains(child) || !self.contains(parent) || self.is_ancestor(child, parent) {
            return false;
        }
        let world = self.world_transform(child).unwrap_or_default();
        self.detach(child);
        self.attach(child, parent);
        if keep_world {
            self.set_world_transform(child, world);
        }
        true
    }

    /// Removes `id` and everything below it.
    pub fn remove(&mut self, id: EntityId) {
        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = usize::try_from(current.0).ok().and_then(|i| self.entities.get_mut(i)) else {
                continue;
            };
            if let Some(entity) = slot.take() {
                stack.extend(entity.children);
            }
        }
    }

    /// Forgets the current holder so the next spawn opens a new one.
    pub fn begin_run(&mut self) {
        self.holder = None;
    }

    /// Closes the current run and returns its holder, if anything spawned.
    pub fn finish_run(&mut self) -> Option<EntityId> {
        self.holder.take()
    }

    fn ensure_holder(&mut self, first_symbol: &str) -> EntityId {
        if let Some(holder) = self.holder.filter(|&h| self.contains(h)) {
            return holder;
        }
        let mut entity = Entity::new(format!("{first_symbol} Holder"), None, EntityKind::Holder);
        entity.local = Transform::from_translation(self.spawn_origin);
        let holder = self.insert(entity, None);
        self.holder = Some(holder);
        holder
    }

    fn spawn_generator(&mut self, id: EntityId, prefab: &GeneratorPrefab, rng: &mut dyn RandomSource) {
        let shapes: Option<Vec<TileShape>> = prefab.tiles.iter().map(|name| self.catalog.tile(name).copied()).collect();
        let Some(shapes) = shapes else {
            warn!(entity = %id, "generator lists a prefab that is not a tile; nothing generated");
            return;
        };
        let generation = match generate(&shapes, &prefab.params, rng) {
            Ok(generation) => generation,
            Err(err) => {
                warn!(entity = %id, %err, "generation failed");
                return;
            }
        };
        let mut tiles = Vec::with_capacity(generation.tiles.len());
        for placed in &generation.tiles {
            let mut tile = Entity::new(
                prefab.tiles[placed.prefab].clone(),
                Some(prefab.tiles[placed.prefab].clone()),
                EntityKind::Tile(shapes[placed.prefab]),
            );
            tile.local = placed.transform;
            tiles.push(self.insert(tile, Some(id)));
        }
        debug!(entity = %id, tiles = tiles.len(), height = generation.height, "generator filled");
        if let Some(entity) = self.get_mut(id) {
            entity.kind = EntityKind::Generator {
                tiles,
                height: generation.height,
            };
        }
    }
}

impl Spawner for Scene {
    fn spawn(&mut self, request: &SpawnRequest<'_>, rng: &mut dyn RandomSource) -> SpawnedEntity {
        let holder = self.ensure_holder(request.name);
        let prefab = self
            .links
            .resolve(request.name, request.args, rng)
            .map(str::to_owned)
            .and_then(|name| {
                let found = self.catalog.get(&name).cloned();
                if found.is_none() {
                    warn!(symbol = request.name, prefab = %name, "linked prefab missing; spawning a marker");
                }
                found
            });

        let Some(prefab) = prefab else {
            let id = self.insert(Entity::new(request.name, None, EntityKind::Marker), Some(holder));
            return SpawnedEntity { entity: id, size: None };
        };

        let kind = match &prefab.kind {
            PrefabKind::Marker => EntityKind::Marker,
            PrefabKind::Tile(shape) => EntityKind::Tile(*shape),
            PrefabKind::Generator(_) => EntityKind::Generator {
                tiles: Vec::new(),
                height: 0.0,
            },
        };
        let id = self.insert(Entity::new(request.name, Some(prefab.name.clone()), kind), Some(holder));
        let size = match &prefab.kind {
            PrefabKind::Marker => None,
            PrefabKind::Tile(shape) => Some(shape.size),
            PrefabKind::Generator(generator) => {
                self.spawn_generator(id, generator, rng);
                self.generated_bounds(id).map(|b| b.size())
            }
        };
        SpawnedEntity { entity: id, size }
    }

    fn execute_method(&mut self, entity: EntityId, call: &MethodCall<'_>) -> bool {
        methods::dispatch(self, entity, call)
    }

    fn discard(&mut self, entity: EntityId) {
        self.remove(entity);
    }

    fn end_of_execution(&mut self, entity: EntityId) {
        if let Some(e) = self.get_mut(entity) {
            e.settled = true;
        }
    }
}

impl Scene {
    /// Local-space bounds of a generator's tiles.
    pub fn generated_bounds(&self, generator: EntityId) -> Option<strata_geom::Aabb> {
        let EntityKind::Generator { tiles, .. } = &self.get(generator)?.kind else {
            return None;
        };
        tiles
            .iter()
            .filter_map(|&t| {
                let tile = self.get(t)?;
                let EntityKind::Tile(shape) = &tile.kind else {
                    return None;
                };
                Some(strata_geom::Aabb::from_origin_size(Vec3::ZERO, shape.size).transformed(&tile.local.to_mat4()))
            })
            .reduce(|a, b| a.union(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::math::{Prng, Quat};

    fn bare() -> Scene {
        Scene::new(PrefabCatalog::default(), LinkTable::default()).with_spawn_origin(Vec3::new(10.0, 0.0, 0.0))
    }

    fn spawn(scene: &mut Scene, name: &str) -> EntityId {
        let mut rng = Prng::from_seed_u64(1);
        scene
            .spawn(&SpawnRequest { name, args: "" }, &mut rng)
            .entity
    }

    #[test]
    fn unlinked_symbols_become_markers_under_one_holder() {
        let mut scene = bare();
        let a = spawn(&mut scene, "A");
        let b = spawn(&mut scene, "B");
        let holder = scene.get(a).unwrap().parent().unwrap();
        assert_eq!(scene.get(b).unwrap().parent(), Some(holder));
        assert_eq!(scene.get(holder).unwrap().name(), "A Holder");
        assert_eq!(scene.get(a).unwrap().kind(), &EntityKind::Marker);
        assert_eq!(scene.world_transform(b).unwrap().translation(), Vec3::new(10.0, 0.0, 0.0));

        scene.begin_run();
        let c = spawn(&mut scene, "C");
        assert_ne!(scene.get(c).unwrap().parent(), Some(holder));
    }

    #[test]
    fn reparenting_can_keep_or_drop_the_world_pose() {
        let mut scene = bare();
        let parent = spawn(&mut scene, "P");
        let child = spawn(&mut scene, "C");
        scene.set_world_transform(
            parent,
            Transform::new(Vec3::new(0.0, 5.0, 0.0), Quat::from_yaw_degrees(90.0), Vec3::ONE),
        );
        scene.set_world_transform(child, Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));

        assert!(scene.set_parent(child, parent, true));
        let kept = scene.world_transform(child).unwrap().translation();
        assert!(kept.approx_eq(&Vec3::new(1.0, 0.0, 0.0), 1e-5));

        let other = spawn(&mut scene, "O");
        assert!(scene.set_parent(other, parent, false));
        let moved = scene.world_transform(other).unwrap().translation();
        assert!(moved.approx_eq(&Vec3::new(0.0, 5.0, 0.0), 1e-5), "{moved}");
    }

    #[test]
    fn cycles_are_refused_and_removal_takes_the_subtree() {
        let mut scene = bare();
        let a = spawn(&mut scene, "A");
        let b = spawn(&mut scene, "B");
        assert!(scene.set_parent(b, a, true));
        assert!(!scene.set_parent(a, b, true));
        assert!(!scene.set_parent(a, a, true));

        let before = scene.len();
        scene.remove(a);
        assert!(!scene.contains(a));
        assert!(!scene.contains(b));
        assert_eq!(scene.len(), before - 2);
        scene.remove(a);
        assert_eq!(scene.len(), before - 2);
    }

    #[test]
    fn notification_settles_the_entity() {
        let mut scene = bare();
        let a = spawn(&mut scene, "A");
        assert!(!scene.get(a).unwrap().is_settled());
        scene.end_of_execution(a);
        assert!(scene.get(a).unwrap().is_settled());
    }
}
