// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! strata-scene: reference collaborators for the rewriting engine.
//!
//! [`Scene`] is an entity arena with a transform hierarchy that implements
//! [`strata_core::Spawner`]. Object symbols resolve through a [`LinkTable`] to
//! prefabs from a [`PrefabCatalog`]; Method symbols dispatch through
//! per-kind capability tables; [`RegionValidator`] keeps tiles inside the
//! configured space. [`GrammarDocument`] bundles all of it as JSON and
//! [`execute`] runs it.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
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
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod config;
mod executor;
mod link;
pub mod methods;
mod prefab;
mod scene;
mod space;

pub use config::{DocumentError, EngineSettings, GrammarDocument, ScatterArea, SpaceConfig};
pub use executor::{execute, RunOutcome};
pub use link::{Link, LinkTable};
pub use prefab::{GeneratorPrefab, Prefab, PrefabCatalog, PrefabKind};
pub use scene::{Entity, EntityKind, Scene};
pub use space::RegionValidator;
