// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rewriting engine: expansion passes, spatial rollback, and re-derivation.
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::diagnostic::Diagnostic;
use crate::ident::{make_run_digest, short_hex, EntityId, Hash, SymbolId};
use crate::lifecycle::EndOfExecution;
use crate::math::RandomSource;
use crate::parser::{parse, ParseError};
use crate::port::{MethodCall, SpatialValidator, SpawnRequest, Spawner};
use crate::rule::{ExclusionSet, Lookup, RuleTable};
use crate::sentence::Sentence;
use crate::symbol::{SymbolArena, SymbolKind};

/// Default cap on consecutive rollbacks within one iteration.
pub const DEFAULT_MAX_RECOVERY_ATTEMPTS: u32 = 1024;

/// How many rewriting passes a run may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationBudget {
    /// At most this many passes.
    Bounded(u32),
    /// Run until the sentence is empty.
    Unbounded,
}

impl IterationBudget {
    /// Whether pass number `iteration` (zero-based) may run.
    pub fn allows(self, iteration: u32) -> bool {
        match self {
            Self::Bounded(limit) => iteration < limit,
            Self::Unbounded => true,
        }
    }
}

impl Default for IterationBudget {
    fn default() -> Self {
        Self::Bounded(1)
    }
}

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Pass limit.
    pub budget: IterationBudget,
    /// Apply the exclusion set to every symbol of the previous sentence during
    /// re-derivation, not only to the producer that caused the violation.
    pub relaxed_recovery: bool,
    /// Rollbacks allowed within one iteration before the run gives up.
    pub max_recovery_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            budget: IterationBudget::default(),
            relaxed_recovery: false,
            max_recovery_attempts: DEFAULT_MAX_RECOVERY_ATTEMPTS,
        }
    }
}

/// Errors emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Spatial recovery did not converge within the configured cap.
    #[error("spatial recovery gave up on {symbol} after {attempts} attempts in iteration {iteration}")]
    RecoveryExhausted {
        /// Iteration that kept failing.
        iteration: u32,
        /// Rollbacks performed in that iteration.
        attempts: u32,
        /// Raw text of the last Object symbol that failed validation.
        symbol: String,
    },
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A pass produced a sentence with no symbols.
    Converged,
    /// The iteration budget ran out first.
    BudgetExhausted,
}

/// Sentence executed by one completed iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationRecord {
    /// Zero-based iteration number.
    pub index: u32,
    /// Text of the sentence that was executed (after any re-derivation).
    pub sentence: String,
    /// Digest of `sentence`.
    pub digest: Hash,
    /// Rollbacks needed before the pass went through.
    pub recoveries: u32,
}

/// Outcome of [`Engine::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// One record per completed iteration.
    pub iterations: Vec<IterationRecord>,
    /// Sentence left when the run stopped; empty on convergence.
    pub final_sentence: String,
    /// Stop reason.
    pub termination: Termination,
    /// Rollbacks across the whole run.
    pub recoveries: u32,
    /// Non-fatal problems in the order they happened.
    pub diagnostics: Vec<Diagnostic>,
    /// Entities that survived the run, in spawn order.
    pub spawned: Vec<EntityId>,
    /// Wall-clock time spent in [`Engine::run`].
    pub elapsed: Duration,
}

impl RunReport {
    /// Digest over every iteration's sentence digest.
    pub fn run_digest(&self) -> Hash {
        make_run_digest(self.iterations.iter().map(|r| &r.digest))
    }
}

/// Probabilistic rewriting engine bound to one rule table.
///
/// The engine is immutable while running: all per-run state lives in a
/// private state value created by [`Engine::run`], so a single engine may
/// drive any number of independent runs.
#[derive(Debug, Clone)]
pub struct Engine {
    rules: RuleTable,
    config: EngineConfig,
}

enum PassOutcome {
    Completed(Sentence),
    Violation(SymbolId),
}

struct RunState<'s> {
    start: &'s str,
    iteration: u32,
    arena: SymbolArena,
    current: Sentence,
    previous: Option<Sentence>,
    exclusions: ExclusionSet,
    spawned_this_pass: Vec<EntityId>,
    end_of_execution: EndOfExecution,
    diagnostics: Vec<Diagnostic>,
}

impl<'s> RunState<'s> {
    fn new(start: &'s str) -> Self {
        Self {
            start,
            iteration: 0,
            arena: SymbolArena::new(),
            current: Sentence::new(),
            previous: None,
            exclusions: ExclusionSet::default(),
            spawned_this_pass: Vec::new(),
            end_of_execution: EndOfExecution::default(),
            diagnostics: Vec::new(),
        }
    }

    fn note_parse_errors(&mut self, errors: Vec<ParseError>) {
        let iteration = self.iteration;
        self.diagnostics
            .extend(errors.into_iter().map(|error| Diagnostic::Parse { iteration, error }));
    }
}

impl Engine {
    /// Creates an engine over `rules`.
    pub fn new(rules: RuleTable, config: EngineConfig) -> Self {
        Self { rules, config }
    }

    /// Rule table in use.
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Active settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rewrites `start` until it converges or the budget runs out.
    ///
    /// Every Object symbol is spawned through `world` and checked by
    /// `validator` before the next Object or Rule symbol is read. A violation
    /// discards the whole pass, excludes the alternative that produced the
    /// offending symbol, re-derives the sentence from the previous one and
    /// retries. A violation during the first iteration re-reads `start`.
    ///
    /// # Errors
    /// Returns [`EngineError::RecoveryExhausted`] once an iteration rolls back
    /// more than [`EngineConfig::max_recovery_attempts`] times. Entities that
    /// survived earlier iterations still receive their end-of-execution
    /// notification.
    #[instrument(skip_all, fields(budget = ?self.config.budget))]
    pub fn run<W, V>(
        &self,
        start: &str,
        world: &mut W,
        validator: &V,
        rng: &mut dyn RandomSource,
    ) -> Result<RunReport, EngineError>
    where
        W: Spawner + ?Sized,
        V: SpatialValidator<W> + ?Sized,
    {
        let started = Instant::now();
        let mut state = RunState::new(start);
        state.current = Self::read_start(&mut state, rng);

        let mut records = Vec::new();
        let mut recoveries = 0_u32;
        let mut termination = Termination::BudgetExhausted;

        while self.config.budget.allows(state.iteration) {
            let iteration = state.iteration;
            info!(iteration, sentence = %state.current.text(), "sentence");

            let mut attempts = 0_u32;
            let next = loop {
                match self.expand(&mut state, world, validator, rng) {
                    PassOutcome::Completed(next) => break next,
                    PassOutcome::Violation(symbol) => {
                        Self::roll_back(&mut state, world);
                        attempts += 1;
                        recoveries += 1;
                        if attempts > self.config.max_recovery_attempts {
                            let symbol = state.arena.get(symbol).raw.clone();
                            error!(iteration, attempts, %symbol, "spatial recovery exhausted");
                            Self::finish(&mut state, world);
                            return Err(EngineError::RecoveryExhausted {
                                iteration,
                                attempts,
                                symbol,
                            });
                        }
                        Self::record_violation(&mut state, symbol);
                        state.current = self.derive(&mut state, rng);
                        info!(iteration, attempt = attempts, sentence = %state.current.text(), "re-derived sentence");
                    }
                }
            };

            let digest = state.current.digest();
            debug!(iteration, digest = %short_hex(&digest), "iteration complete");
            records.push(IterationRecord {
                index: iteration,
                sentence: state.current.text().to_owned(),
                digest,
                recoveries: attempts,
            });
            state.previous = Some(std::mem::replace(&mut state.current, next));
            state.iteration = state.iteration.saturating_add(1);

            if state.current.is_empty() {
                info!(iteration, "no symbols left");
                termination = Termination::Converged;
                break;
            }
        }

        let spawned = Self::finish(&mut state, world);
        let elapsed = started.elapsed();
        info!(
            iterations = records.len(),
            recoveries,
            elapsed_ms = elapsed.as_millis(),
            "grammar execution finished"
        );
        Ok(RunReport {
            iterations: records,
            final_sentence: state.current.text().to_owned(),
            termination,
            recoveries,
            diagnostics: state.diagnostics,
            spawned,
            elapsed,
        })
    }

    fn read_start(state: &mut RunState<'_>, rng: &mut dyn RandomSource) -> Sentence {
        let parsed = parse(state.start, rng);
        state.note_parse_errors(parsed.errors);
        let mut sentence = Sentence::new();
        sentence.append_parsed(&mut state.arena, parsed.symbols, None);
        sentence
    }

    /// One left-to-right pass over the current sentence.
    fn expand<W, V>(
        &self,
        state: &mut RunState<'_>,
        world: &mut W,
        validator: &V,
        rng: &mut dyn RandomSource,
    ) -> PassOutcome
    where
        W: Spawner + ?Sized,
        V: SpatialValidator<W> + ?Sized,
    {
        state.spawned_this_pass.clear();
        let mut next = Sentence::new();
        let mut last_object: Option<SymbolId> = None;

        let ids = state.current.symbols().to_vec();
        for id in ids {
            let kind = state.arena.get(id).kind;
            match kind {
                SymbolKind::Object | SymbolKind::Rule => {
                    // Validation trails spawning by one symbol.
                    if let Some(pending) = last_object.take() {
                        if Self::violates(state, world, validator, pending) {
                            return PassOutcome::Violation(pending);
                        }
                    }
                    if kind == SymbolKind::Object {
                        Self::spawn(state, world, id, rng);
                        last_object = Some(id);
                    }
                    self.expand_symbol(state, id, &[], &mut next, rng);
                }
                SymbolKind::Method => Self::dispatch(state, world, id, last_object),
                SymbolKind::Invalid => {
                    debug!(symbol = %state.arena.get(id).raw, "skipping invalid symbol");
                }
            }
        }
        if let Some(pending) = last_object {
            if Self::violates(state, world, validator, pending) {
                return PassOutcome::Violation(pending);
            }
        }
        debug!(
            iteration = state.iteration,
            spawned = state.spawned_this_pass.len(),
            next = next.len(),
            "pass complete"
        );
        PassOutcome::Completed(next)
    }

    /// Rebuilds the current sentence from the previous one without spawning.
    fn derive(&self, state: &mut RunState<'_>, rng: &mut dyn RandomSource) -> Sentence {
        let Some(ids) = state.previous.as_ref().map(|p| p.symbols().to_vec()) else {
            return Self::read_start(state, rng);
        };
        let excluded = state.exclusions.indices().to_vec();
        let target = state.exclusions.parent();

        let mut next = Sentence::new();
        for id in ids {
            if !state.arena.get(id).kind.expands() {
                continue;
            }
            let skip: &[usize] = if self.config.relaxed_recovery || target == Some(id) {
                &excluded
            } else {
                &[]
            };
            self.expand_symbol(state, id, skip, &mut next, rng);
        }
        next
    }

    fn expand_symbol(
        &self,
        state: &mut RunState<'_>,
        id: SymbolId,
        excluded: &[usize],
        next: &mut Sentence,
        rng: &mut dyn RandomSource,
    ) {
        let lookup = self.rules.lookup(&state.arena.get(id).name, excluded, rng);
        let Lookup::Selected { index, template } = lookup else {
            state.arena.get_mut(id).chosen_output = None;
            return;
        };
        state.arena.get_mut(id).chosen_output = Some(index);
        let parsed = parse(template, rng);
        state.note_parse_errors(parsed.errors);
        next.append_parsed(&mut state.arena, parsed.symbols, Some(id));
    }

    fn spawn<W: Spawner + ?Sized>(
        state: &mut RunState<'_>,
        world: &mut W,
        id: SymbolId,
        rng: &mut dyn RandomSource,
    ) {
        let symbol = state.arena.get(id);
        let spawned = world.spawn(
            &SpawnRequest {
                name: &symbol.name,
                args: &symbol.args,
            },
            rng,
        );
        debug!(symbol = %symbol.raw, entity = %spawned.entity, size = ?spawned.size, "spawned");
        state.arena.get_mut(id).entity = Some(spawned.entity);
        state.spawned_this_pass.push(spawned.entity);
        state.end_of_execution.subscribe(spawned.entity);
    }

    fn dispatch<W: Spawner + ?Sized>(
        state: &mut RunState<'_>,
        world: &mut W,
        id: SymbolId,
        target: Option<SymbolId>,
    ) {
        let iteration = state.iteration;
        let method = state.arena.get(id);
        let Some(target) = target else {
            error!(iteration, method = %method.raw, "method symbol must follow an object symbol");
            state.diagnostics.push(Diagnostic::MethodPlacementOrder {
                iteration,
                method: method.raw.clone(),
            });
            return;
        };
        let Some(entity) = state.arena.get(target).entity else {
            return;
        };
        let lineage = state.arena.lineage(target);
        let producer = method.parent.and_then(|p| state.arena.get(p).entity);
        let call = MethodCall {
            name: &method.name,
            args: &method.args,
            lineage: &lineage,
            producer,
        };
        if !world.execute_method(entity, &call) {
            let target = state.arena.get(target).raw.clone();
            warn!(iteration, method = %method.raw, %target, "method not found");
            state.diagnostics.push(Diagnostic::MethodNotFound {
                iteration,
                method: method.raw.clone(),
                target,
            });
        }
    }

    fn violates<W, V>(state: &mut RunState<'_>, world: &W, validator: &V, id: SymbolId) -> bool
    where
        W: Spawner + ?Sized,
        V: SpatialValidator<W> + ?Sized,
    {
        let symbol = state.arena.get(id);
        let Some(entity) = symbol.entity else {
            return false;
        };
        if !validator.violates(world, entity) {
            return false;
        }
        warn!(iteration = state.iteration, symbol = %symbol.raw, %entity, "object left the grammar space; rolling back pass");
        state.diagnostics.push(Diagnostic::SpatialViolation {
            iteration: state.iteration,
            symbol: symbol.raw.clone(),
            entity,
        });
        true
    }

    fn roll_back<W: Spawner + ?Sized>(state: &mut RunState<'_>, world: &mut W) {
        for entity in state.spawned_this_pass.drain(..) {
            world.discard(entity);
            state.end_of_execution.unsubscribe(entity);
        }
    }

    fn record_violation(state: &mut RunState<'_>, symbol: SymbolId) {
        let Some(parent) = state.arena.get(symbol).parent else {
            debug!("root-level violation; re-reading the starting sentence");
            return;
        };
        let chosen = state.arena.get(parent).chosen_output;
        state.exclusions.record(parent, chosen);
        debug!(
            parent = %state.arena.get(parent).raw,
            excluded = ?state.exclusions.indices(),
            "exclusions updated"
        );
    }

    fn finish<W: Spawner + ?Sized>(state: &mut RunState<'_>, world: &mut W) -> Vec<EntityId> {
        let survivors = state.end_of_execution.drain();
        for entity in &survivors {
            world.end_of_execution(*entity);
        }
        survivors
    }
}
