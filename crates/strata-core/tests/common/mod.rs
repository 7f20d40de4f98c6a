// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use strata_core::math::{RandomSource, Vec3};
use strata_core::{
    args, EntityId, MethodCall, Rule, RuleTable, SpatialValidator, SpawnRequest, SpawnedEntity,
    Spawner,
};

#[derive(Debug, Clone)]
pub struct MockEntity {
    pub name: String,
    pub args: String,
    pub position: Vec3,
    pub discarded: bool,
    pub settled: u32,
    /// Lineage and producer seen by each `Record` call.
    pub calls: Vec<(Vec<Option<EntityId>>, Option<EntityId>)>,
}

/// Minimal world: entities with a position and a couple of methods.
#[derive(Debug, Default)]
pub struct MockWorld {
    pub entities: Vec<MockEntity>,
    pub discards: Vec<EntityId>,
}

impl MockWorld {
    pub fn entity(&self, id: EntityId) -> &MockEntity {
        &self.entities[id.0 as usize]
    }

    pub fn live_names(&self) -> Vec<&str> {
        self.entities
            .iter()
            .filter(|e| !e.discarded)
            .map(|e| e.name.as_str())
            .collect()
    }
}

impl Spawner for MockWorld {
    fn spawn(&mut self, request: &SpawnRequest<'_>, _rng: &mut dyn RandomSource) -> SpawnedEntity {
        let entity = EntityId(self.entities.len() as u64);
        self.entities.push(MockEntity {
            name: request.name.to_owned(),
            args: request.args.to_owned(),
            position: Vec3::ZERO,
            discarded: false,
            settled: 0,
            calls: Vec::new(),
        });
        SpawnedEntity {
            entity,
            size: Some(Vec3::ONE),
        }
    }

    fn execute_method(&mut self, entity: EntityId, call: &MethodCall<'_>) -> bool {
        let target = &mut self.entities[entity.0 as usize];
        match call.name {
            "SetPos" => {
                if let Some(p) = args::vec3(call.args) {
                    target.position = p;
                }
                true
            }
            "Move" => {
                if let Some(d) = args::vec3(call.args) {
                    target.position = target.position.add(&d);
                }
                true
            }
            "Record" => {
                target.calls.push((call.lineage.to_vec(), call.producer));
                true
            }
            _ => false,
        }
    }

    fn discard(&mut self, entity: EntityId) {
        self.entities[entity.0 as usize].discarded = true;
        self.discards.push(entity);
    }

    fn end_of_execution(&mut self, entity: EntityId) {
        self.entities[entity.0 as usize].settled += 1;
    }
}

/// Flags every entity spawned under one of the listed names.
pub struct RejectNames(pub Vec<&'static str>);

impl SpatialValidator<MockWorld> for RejectNames {
    fn violates(&self, world: &MockWorld, entity: EntityId) -> bool {
        self.0.contains(&world.entity(entity).name.as_str())
    }
}

/// Random source that always rolls the bottom of the range, so weighted
/// selection always takes the first live alternative.
pub struct FirstPick;

impl RandomSource for FirstPick {
    fn next_f32(&mut self) -> f32 {
        0.0
    }

    fn next_index(&mut self, _len: usize) -> usize {
        0
    }
}

pub fn table(rules: &[(&str, &[(f32, &str)])]) -> RuleTable {
    RuleTable::new(
        rules
            .iter()
            .map(|(input, outputs)| Rule::new(input, outputs.iter().copied()))
            .collect(),
    )
}
