// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Execution trigger: runs a document's grammar `repeat` times into a scene.
use strata_core::math::RandomSource;
use strata_core::{Engine, EngineError, EntityId, NoValidation, RuleTable, RunReport};
use tracing::{info, instrument, warn};

use crate::config::GrammarDocument;
use crate::link::LinkTable;
use crate::prefab::PrefabCatalog;
use crate::scene::Scene;
use crate::space::RegionValidator;

/// Result of one grammar run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Holder of everything this run spawned; `None` when nothing spawned.
    pub holder: Option<EntityId>,
    /// Engine report, or the reason the run gave up.
    pub result: Result<RunReport, EngineError>,
}

impl GrammarDocument {
    /// Empty scene wired to this document's prefabs, links and spawn origin.
    pub fn build_scene(&self) -> Scene {
        let scene = Scene::new(
            PrefabCatalog::new(self.prefabs.clone()),
            LinkTable::new(self.links.clone()),
        );
        match &self.space {
            Some(space) => scene.with_spawn_origin(space.spawn_origin()),
            None => scene,
        }
    }

    /// Engine over this document's rules.
    pub fn build_engine(&self) -> Engine {
        Engine::new(RuleTable::new(self.rules.clone()), self.engine_config())
    }
}

/// Runs the grammar `doc.repeat` times into `scene`.
///
/// Each run gets its own holder. With a scatter area configured the holder is
/// moved to a random point inside it once the run ends. A run that gives up
/// does not stop the remaining repetitions.
#[instrument(skip_all, fields(repeat = doc.repeat))]
pub fn execute(doc: &GrammarDocument, scene: &mut Scene, rng: &mut dyn RandomSource) -> Vec<RunOutcome> {
    let engine = doc.build_engine();
    let validator = doc.space.as_ref().map(|s| RegionValidator::new(s.region()));
    let mut outcomes = Vec::with_capacity(doc.repeat as usize);

    for run in 0..doc.repeat {
        scene.begin_run();
        let result = match &validator {
            Some(validator) => engine.run(&doc.start, scene, validator, rng),
            None => engine.run(&doc.start, scene, &NoValidation, rng),
        };
        let holder = scene.finish_run();

        if let (Some(area), Some(holder)) = (&doc.scatter, holder) {
            let target = area.sample(rng);
            if let Some(world) = scene.world_transform(holder) {
                scene.set_world_transform(holder, world.with_translation(target));
            }
        }

        match &result {
            Ok(report) => info!(
                run,
                iterations = report.iterations.len(),
                recoveries = report.recoveries,
                spawned = report.spawned.len(),
                "run finished"
            ),
            Err(err) => warn!(run, %err, "run gave up"),
        }
        outcomes.push(RunOutcome { holder, result });
    }
    outcomes
}
