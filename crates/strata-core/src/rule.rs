// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Production rules and weighted selection with exclusion.
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::ident::SymbolId;
use crate::math::RandomSource;
use crate::parser::strip_whitespace;

/// One weighted alternative of a rule.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleOutput {
    /// Relative weight in `[0, 1]`; zero is never selected.
    pub probability: f32,
    /// Grammar text produced when this alternative is chosen.
    pub template: String,
}

/// Named production mapping a symbol name to weighted output templates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    /// Symbol name this rule rewrites.
    pub input: String,
    /// Alternatives in authored order.
    pub outputs: Vec<RuleOutput>,
}

impl Rule {
    /// Builds a rule from `(probability, template)` pairs.
    pub fn new<'a>(input: &str, outputs: impl IntoIterator<Item = (f32, &'a str)>) -> Self {
        Self {
            input: input.to_owned(),
            outputs: outputs
                .into_iter()
                .map(|(probability, template)| RuleOutput {
                    probability,
                    template: template.to_owned(),
                })
                .collect(),
        }
    }
}

/// Result of a rule table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// Alternative `index` was drawn and has non-blank text.
    Selected {
        /// Position of the alternative within its rule.
        index: usize,
        /// Grammar text of the alternative.
        template: &'a str,
    },
    /// No rule, nothing selectable, or a blank alternative: a terminal symbol.
    NoOutput,
}

/// Read-only rule dataset with name lookup.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
    by_name: FxHashMap<String, usize>,
}

impl RuleTable {
    /// Indexes `rules` by whitespace-normalized input name.
    ///
    /// Names are expected to be unique; when they are not the first rule wins.
    pub fn new(rules: Vec<Rule>) -> Self {
        let mut by_name = FxHashMap::default();
        for (idx, rule) in rules.iter().enumerate() {
            let key = strip_whitespace(&rule.input);
            if by_name.contains_key(&key) {
                warn!(rule = %key, "duplicate rule input; keeping the first definition");
                continue;
            }
            by_name.insert(key, idx);
        }
        Self { rules, by_name }
    }

    /// Rules in authored order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rule registered for `name`, if any.
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.by_name.get(name).map(|idx| &self.rules[*idx])
    }

    /// Draws an alternative for `name`, skipping indices in `excluded`.
    ///
    /// The weight total is recomputed over the live alternatives on every
    /// call, so excluding an index redistributes its share proportionally.
    pub fn lookup(&self, name: &str, excluded: &[usize], rng: &mut dyn RandomSource) -> Lookup<'_> {
        let Some(rule) = self.rule(name) else {
            return Lookup::NoOutput;
        };
        let Some(index) = select_weighted(&rule.outputs, excluded, rng) else {
            return Lookup::NoOutput;
        };
        let template = rule.outputs[index].template.as_str();
        if template.trim().is_empty() {
            return Lookup::NoOutput;
        }
        Lookup::Selected { index, template }
    }
}

/// Proportional pick among non-excluded alternatives.
///
/// Returns `None` when every live weight is zero (or everything is excluded).
pub fn select_weighted(
    outputs: &[RuleOutput],
    excluded: &[usize],
    rng: &mut dyn RandomSource,
) -> Option<usize> {
    let live = |idx: &usize| !excluded.contains(idx);
    let weight = |out: &RuleOutput| out.probability.max(0.0);

    let total: f32 = outputs
        .iter()
        .enumerate()
        .filter(|(idx, _)| live(idx))
        .map(|(_, out)| weight(out))
        .sum();
    if total <= 0.0 {
        return None;
    }

    let roll = rng.next_f32() * total;
    let mut cumulative = 0.0;
    for (idx, out) in outputs.iter().enumerate() {
        if !live(&idx) {
            continue;
        }
        cumulative += weight(out);
        if roll < cumulative {
            return Some(idx);
        }
    }
    None
}

/// Alternatives already tried and rejected for one producing symbol.
///
/// Reset whenever a different producer becomes the source of a violation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    parent: Option<SymbolId>,
    indices: Vec<usize>,
}

impl ExclusionSet {
    /// Records that `parent`'s alternative `index` led to a violation.
    pub fn record(&mut self, parent: SymbolId, index: Option<usize>) {
        if self.parent != Some(parent) {
            self.parent = Some(parent);
            self.indices.clear();
        }
        if let Some(index) = index {
            if !self.indices.contains(&index) {
                self.indices.push(index);
            }
        }
    }

    /// Producer the set currently applies to.
    pub fn parent(&self) -> Option<SymbolId> {
        self.parent
    }

    /// Excluded alternative indices.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Forgets the current episode.
    pub fn clear(&mut self) {
        self.parent = None;
        self.indices.clear();
    }
}
