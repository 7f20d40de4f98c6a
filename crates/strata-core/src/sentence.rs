// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ordered symbol sequences produced by one rewriting pass.
use crate::ident::{make_sentence_digest, Hash, SymbolId};
use crate::parser::ParsedSymbol;
use crate::symbol::{Symbol, SymbolArena};

/// Ordered handles into a [`SymbolArena`] plus their concatenated raw text.
///
/// Built by appending; the engine never edits a sentence after the pass that
/// produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sentence {
    symbols: Vec<SymbolId>,
    text: String,
}

impl Sentence {
    /// Creates an empty sentence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves parsed symbols into `arena` and appends them, tagged with `parent`.
    pub fn append_parsed(
        &mut self,
        arena: &mut SymbolArena,
        parsed: Vec<ParsedSymbol>,
        parent: Option<SymbolId>,
    ) {
        for p in parsed {
            self.text.push_str(&p.raw);
            let id = arena.insert(Symbol {
                raw: p.raw,
                kind: p.kind,
                name: p.name,
                args: p.args,
                parent,
                chosen_output: None,
                entity: None,
            });
            self.symbols.push(id);
        }
    }

    /// Symbol handles in order.
    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }

    /// Concatenated raw text of every symbol.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// A sentence without symbols ends the run.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Digest of [`Sentence::text`].
    pub fn digest(&self) -> Hash {
        make_sentence_digest(&self.text)
    }
}
