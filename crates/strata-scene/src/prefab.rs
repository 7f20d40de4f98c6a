// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Prefab catalogue: the templates that Object symbols are spawned from.
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strata_geom::{GeneratorParams, TileShape};
use tracing::warn;

/// What a spawned prefab becomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrefabKind {
    /// Plain entity without geometry.
    Marker,
    /// Entity with declared size and faces.
    Tile(TileShape),
    /// Entity that grows a chain of tiles when spawned.
    Generator(GeneratorPrefab),
}

/// Generator settings plus the tile prefabs it draws from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorPrefab {
    /// Chain parameters; `first`/`last` index into `tiles`.
    #[serde(flatten)]
    pub params: GeneratorParams,
    /// Names of tile prefabs in the catalogue.
    pub tiles: Vec<String>,
}

/// Named template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefab {
    /// Catalogue key.
    pub name: String,
    /// Template payload.
    #[serde(flatten)]
    pub kind: PrefabKind,
}

/// Prefabs indexed by name.
#[derive(Debug, Clone, Default)]
pub struct PrefabCatalog {
    prefabs: Vec<Prefab>,
    by_name: FxHashMap<String, usize>,
}

impl PrefabCatalog {
    /// Indexes `prefabs`; the first prefab with a given name wins.
    pub fn new(prefabs: Vec<Prefab>) -> Self {
        let mut by_name = FxHashMap::default();
        for (index, prefab) in prefabs.iter().enumerate() {
            if by_name.contains_key(&prefab.name) {
                warn!(name = %prefab.name, "duplicate prefab ignored");
                continue;
            }
            by_name.insert(prefab.name.clone(), index);
        }
        Self { prefabs, by_name }
    }

    /// Looks up a prefab.
    pub fn get(&self, name: &str) -> Option<&Prefab> {
        self.by_name.get(name).map(|&i| &self.prefabs[i])
    }

    /// Tile geometry of `name`, when it is a tile prefab.
    pub fn tile(&self, name: &str) -> Option<&TileShape> {
        match &self.get(name)?.kind {
            PrefabKind::Tile(shape) => Some(shape),
            _ => None,
        }
    }

    /// Every prefab in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Prefab> {
        self.prefabs.iter()
    }
}
