// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
use proptest::prelude::*;
use strata_core::math::Prng;
use strata_core::{parse, render, Lookup, Rule, RuleOutput, RuleTable};

fn symbol_text() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["rule", "r", "object", "obj", "o", "method", "m", "OBJ", "R"]),
        "[A-Za-z][A-Za-z0-9]{0,6}",
        prop::option::of("[0-9]{1,3}(,[0-9]{1,3}){0,2}"),
        "[ \t\n]{0,2}",
    )
        .prop_map(|(kind, name, args, gap)| match args {
            Some(args) => format!("<{kind} {name}( {args} )>{gap}"),
            None => format!("<{kind} {name}>{gap}"),
        })
}

fn grammar_text() -> impl Strategy<Value = String> {
    prop::collection::vec(symbol_text(), 0..12).prop_map(|parts| parts.concat())
}

fn outputs(weights: &[f32]) -> Vec<RuleOutput> {
    weights
        .iter()
        .enumerate()
        .map(|(i, w)| RuleOutput {
            probability: *w,
            template: format!("<o T{i}>"),
        })
        .collect()
}

proptest! {
    #[test]
    fn reparsing_rendered_symbols_is_stable(text in grammar_text(), seed in any::<u64>()) {
        let first = parse(&text, &mut Prng::from_seed_u64(seed));
        prop_assert!(first.errors.is_empty());
        let second = parse(&render(&first.symbols), &mut Prng::from_seed_u64(seed));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn excluding_all_but_one_live_alternative_forces_it(
        weights in prop::collection::vec(0.0f32..1.0, 1..8),
        pick in any::<prop::sample::Index>(),
        seed in any::<u64>(),
    ) {
        let k = pick.index(weights.len());
        let mut weights = weights;
        weights[k] = weights[k].max(0.01);
        let excluded: Vec<usize> = (0..weights.len()).filter(|i| *i != k).collect();
        let table = RuleTable::new(vec![Rule { input: "A".into(), outputs: outputs(&weights) }]);
        let mut rng = Prng::from_seed_u64(seed);
        for _ in 0..16 {
            match table.lookup("A", &excluded, &mut rng) {
                Lookup::Selected { index, .. } => prop_assert_eq!(index, k),
                Lookup::NoOutput => prop_assert!(false, "expected alternative {}", k),
            }
        }
    }

    #[test]
    fn all_zero_or_fully_excluded_is_no_output(
        len in 1usize..8,
        weights in prop::collection::vec(0.0f32..1.0, 8),
        seed in any::<u64>(),
    ) {
        let mut rng = Prng::from_seed_u64(seed);
        let zeros = RuleTable::new(vec![Rule { input: "A".into(), outputs: outputs(&vec![0.0; len]) }]);
        prop_assert_eq!(zeros.lookup("A", &[], &mut rng), Lookup::NoOutput);

        let live = RuleTable::new(vec![Rule { input: "A".into(), outputs: outputs(&weights[..len]) }]);
        let all: Vec<usize> = (0..len).collect();
        prop_assert_eq!(live.lookup("A", &all, &mut rng), Lookup::NoOutput);
    }

    #[test]
    fn selection_never_returns_an_excluded_or_zero_alternative(
        weights in prop::collection::vec(prop_oneof![Just(0.0f32), 0.05f32..1.0], 1..8),
        excluded in prop::collection::vec(0usize..8, 0..4),
        seed in any::<u64>(),
    ) {
        let table = RuleTable::new(vec![Rule { input: "A".into(), outputs: outputs(&weights) }]);
        let mut rng = Prng::from_seed_u64(seed);
        for _ in 0..16 {
            if let Lookup::Selected { index, .. } = table.lookup("A", &excluded, &mut rng) {
                prop_assert!(!excluded.contains(&index));
                prop_assert!(weights[index] > 0.0);
            }
        }
    }
}
