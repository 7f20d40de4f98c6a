// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Grammar symbols and the run-scoped arena that owns them.

use crate::ident::{EntityId, SymbolId};

/// Classification of a symbol by its leading kind token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// `rule`/`r`: expands through the rule table, never spawns.
    Rule,
    /// `object`/`obj`/`o`: expands and spawns an entity.
    Object,
    /// `method`/`m`: invokes a capability on the most recent object's entity.
    Method,
    /// Unrecognised kind token; ignored by the engine.
    Invalid,
}

impl SymbolKind {
    /// Resolves a kind token, case-insensitively, in long or short form.
    pub fn from_token(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "rule" | "r" => Self::Rule,
            "object" | "obj" | "o" => Self::Object,
            "method" | "m" => Self::Method,
            _ => Self::Invalid,
        }
    }

    /// Rule and Object symbols take part in rewriting.
    pub fn expands(self) -> bool {
        matches!(self, Self::Rule | Self::Object)
    }
}

/// One grammar token.
///
/// Everything except `chosen_output` and `entity` is fixed at parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Source text including the angle brackets.
    pub raw: String,
    /// Kind parsed from the leading token.
    pub kind: SymbolKind,
    /// Identifier with whitespace removed.
    pub name: String,
    /// Argument string with `R[min,max]` placeholders already resolved.
    pub args: String,
    /// Symbol whose expansion produced this one; `None` at the root level.
    pub parent: Option<SymbolId>,
    /// Rule alternative selected the last time this symbol was expanded.
    pub chosen_output: Option<usize>,
    /// Entity spawned for this symbol (Object symbols only).
    pub entity: Option<EntityId>,
}

/// Arena holding every symbol created during one grammar run.
///
/// Symbols reference their producer by [`SymbolId`]; the arena outlives all
/// of them and is dropped as a unit when the run ends.
#[derive(Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a symbol and returns its handle.
    pub fn insert(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(u32::try_from(self.symbols.len()).unwrap_or(u32::MAX));
        self.symbols.push(symbol);
        id
    }

    /// Shared access to a symbol.
    ///
    /// # Panics
    /// Panics if `id` did not come from this arena.
    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// Mutable access to a symbol.
    ///
    /// # Panics
    /// Panics if `id` did not come from this arena.
    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    /// Number of symbols allocated so far.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` when nothing has been allocated.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Walks the producer chain upward, nearest ancestor first.
    pub fn ancestors(&self, id: SymbolId) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            next: self.get(id).parent,
        }
    }

    /// Entities bound to the ancestors of `id`, nearest first.
    ///
    /// Rule ancestors contribute `None` so positions still line up with depth.
    pub fn lineage(&self, id: SymbolId) -> Vec<Option<EntityId>> {
        self.ancestors(id).map(|a| self.get(a).entity).collect()
    }
}

/// Iterator over a symbol's producers. See [`SymbolArena::ancestors`].
pub struct Ancestors<'a> {
    arena: &'a SymbolArena,
    next: Option<SymbolId>,
}

impl Iterator for Ancestors<'_> {
    type Item = SymbolId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.arena.get(current).parent;
        Some(current)
    }
}
