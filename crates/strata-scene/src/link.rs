// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Link table: which prefab variants an Object symbol name may spawn.
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strata_core::args;
use strata_core::math::RandomSource;
use tracing::warn;

/// Variants available to one symbol name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Object symbol name.
    pub symbol: String,
    /// Prefab names, addressed by index from the symbol's arguments.
    pub prefabs: Vec<String>,
}

/// Links indexed by symbol name.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    links: FxHashMap<String, Vec<String>>,
}

impl LinkTable {
    /// Indexes `links`; the first entry for a symbol wins.
    pub fn new(links: Vec<Link>) -> Self {
        let mut table: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for link in links {
            if table.contains_key(&link.symbol) {
                warn!(symbol = %link.symbol, "duplicate link ignored");
                continue;
            }
            table.insert(link.symbol, link.prefabs);
        }
        Self { links: table }
    }

    /// Variants for `symbol`.
    pub fn variants(&self, symbol: &str) -> Option<&[String]> {
        self.links.get(symbol).map(Vec::as_slice)
    }

    /// Picks the prefab for an Object symbol.
    ///
    /// Blank arguments or `-1` pick a uniformly random variant. An index that
    /// does not parse or is out of range is logged and also falls back to a
    /// random variant. `None` when the symbol has no (non-empty) link.
    pub fn resolve(&self, symbol: &str, arguments: &str, rng: &mut dyn RandomSource) -> Option<&str> {
        let variants = self.variants(symbol).filter(|v| !v.is_empty())?;
        let requested = if arguments.trim().is_empty() {
            None
        } else {
            match args::int(arguments) {
                Some(-1) => None,
                Some(i) => match usize::try_from(i).ok().filter(|&i| i < variants.len()) {
                    Some(i) => Some(i),
                    None => {
                        warn!(symbol, index = i, variants = variants.len(), "variant index out of range; picking at random");
                        None
                    }
                },
                None => {
                    warn!(symbol, arguments, "variant index unreadable; picking at random");
                    None
                }
            }
        };
        let index = requested.unwrap_or_else(|| rng.next_index(variants.len()));
        variants.get(index).map(String::as_str)
    }
}
