// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collaborator seams the engine drives: entity spawning and spatial checks.
use crate::ident::EntityId;
use crate::math::{RandomSource, Vec3};

/// What the engine asks a [`Spawner`] to materialise for an Object symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnRequest<'a> {
    /// Symbol name, used as the link-table key.
    pub name: &'a str,
    /// Argument string; carries the variant index when present.
    pub args: &'a str,
}

/// Handle and declared extent of a freshly spawned entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnedEntity {
    /// Handle owned by the spawner.
    pub entity: EntityId,
    /// Declared size, when the entity has geometry.
    pub size: Option<Vec3>,
}

/// A Method symbol routed to the entity of the most recent Object symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodCall<'a> {
    /// Method name.
    pub name: &'a str,
    /// Raw comma-separated arguments.
    pub args: &'a str,
    /// Entities bound to the target symbol's producers, nearest first.
    ///
    /// Producers that are Rule symbols appear as `None`.
    pub lineage: &'a [Option<EntityId>],
    /// Entity of the symbol that produced the method symbol itself. Differs
    /// from `lineage[0]` when the method and its target came from different
    /// templates.
    pub producer: Option<EntityId>,
}

/// Owner of every entity the engine creates.
pub trait Spawner {
    /// Creates the entity for an Object symbol. Never fails: unknown names
    /// yield a placeholder.
    fn spawn(&mut self, request: &SpawnRequest<'_>, rng: &mut dyn RandomSource) -> SpawnedEntity;

    /// Runs a named capability on `entity`; returns `false` when the entity
    /// has no such capability.
    fn execute_method(&mut self, entity: EntityId, call: &MethodCall<'_>) -> bool;

    /// Destroys an entity spawned during an aborted pass.
    fn discard(&mut self, entity: EntityId);

    /// One-shot notification that the run this entity belongs to finished.
    fn end_of_execution(&mut self, entity: EntityId);
}

/// Decides whether a spawned entity breaks the spatial constraints of `W`.
pub trait SpatialValidator<W: ?Sized> {
    /// `true` signals a violation.
    fn violates(&self, world: &W, entity: EntityId) -> bool;
}

/// Accepts every entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl<W: ?Sized> SpatialValidator<W> for NoValidation {
    fn violates(&self, _world: &W, _entity: EntityId) -> bool {
        false
    }
}
