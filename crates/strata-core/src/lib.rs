// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! strata-core: probabilistic symbol rewriting with spatial backtracking.
//!
//! A run starts from a grammar sentence such as `<object Tower>` and rewrites
//! it through weighted rules. Object symbols are materialised by a
//! [`Spawner`] and checked by a [`SpatialValidator`]; a failed check rolls the
//! pass back and re-derives it with the offending alternative excluded.
//! All randomness flows through one injectable [`math::RandomSource`].
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions
)]

pub mod args;
pub mod math;
pub mod parser;

mod diagnostic;
mod engine_impl;
mod ident;
mod lifecycle;
mod port;
mod rule;
mod sentence;
mod symbol;

// Re-exports for stable public API
pub use diagnostic::Diagnostic;
pub use engine_impl::{
    Engine, EngineConfig, EngineError, IterationBudget, IterationRecord, RunReport, Termination,
    DEFAULT_MAX_RECOVERY_ATTEMPTS,
};
pub use ident::{make_run_digest, make_sentence_digest, short_hex, EntityId, Hash, SymbolId};
pub use lifecycle::EndOfExecution;
pub use parser::{parse, render, Parse, ParseError, ParsedSymbol};
pub use port::{MethodCall, NoValidation, SpatialValidator, SpawnRequest, SpawnedEntity, Spawner};
pub use rule::{select_weighted, ExclusionSet, Lookup, Rule, RuleOutput, RuleTable};
pub use sentence::Sentence;
pub use symbol::{Ancestors, Symbol, SymbolArena, SymbolKind};
