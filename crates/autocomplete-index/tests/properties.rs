//! Property tests: the binary-search index against the linear-scan reference.

use std::cell::Cell;

use autocomplete_index::{
    Autocompletor, BruteAutocomplete, PrefixOrder, Selection, Term, TermIndex, first_index_of,
    last_index_of,
};
use proptest::prelude::*;

/// Words over a tiny alphabet so prefixes collide often.
fn word_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[abA]{0,5}").unwrap()
}

fn store_strategy() -> impl Strategy<Value = Vec<(String, f64)>> {
    prop::collection::vec((word_strategy(), 0u32..20), 0..40).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(w, x)| (w, f64::from(x)))
            .collect()
    })
}

fn split(pairs: &[(String, f64)]) -> (Vec<&str>, Vec<f64>) {
    pairs.iter().map(|(w, x)| (w.as_str(), *x)).unzip()
}

fn ceil_log2(n: usize) -> usize {
    n.next_power_of_two().trailing_zeros() as usize
}

proptest! {
    #[test]
    fn prop_store_sorted(pairs in store_strategy()) {
        let (words, weights) = split(&pairs);
        let index = TermIndex::new(&words, &weights).unwrap();
        prop_assert_eq!(index.len(), pairs.len());
        for w in index.terms().windows(2) {
            prop_assert!(w[0].word() <= w[1].word());
        }
    }

    #[test]
    fn prop_range_is_exactly_the_prefix_run(pairs in store_strategy(), prefix in word_strategy()) {
        let (words, weights) = split(&pairs);
        let index = TermIndex::new(&words, &weights).unwrap();
        let range = index.match_range(&prefix);
        for (i, term) in index.terms().iter().enumerate() {
            prop_assert_eq!(
                range.contains(&i),
                term.word().starts_with(prefix.as_str()),
                "index {} word {:?} prefix {:?}", i, term.word(), prefix
            );
        }
    }

    #[test]
    fn prop_search_calls_bounded(pairs in store_strategy(), prefix in word_strategy()) {
        let (words, weights) = split(&pairs);
        let index = TermIndex::new(&words, &weights).unwrap();
        let order = PrefixOrder::new(prefix.chars().count());
        let key = Term::new(prefix.as_str(), 0.0);
        let calls = Cell::new(0usize);
        let counting = |a: &Term, b: &Term| {
            calls.set(calls.get() + 1);
            autocomplete_index::TermOrder::compare(&order, a, b)
        };
        let bound = 1 + ceil_log2(index.len());

        let first = first_index_of(index.terms(), &key, &counting);
        prop_assert!(calls.get() <= bound, "first: {} calls for n={}", calls.get(), index.len());
        calls.set(0);
        let last = last_index_of(index.terms(), &key, &counting);
        prop_assert!(calls.get() <= bound, "last: {} calls for n={}", calls.get(), index.len());
        prop_assert_eq!(first.is_some(), last.is_some());
    }

    #[test]
    fn prop_matches_brute_force(
        pairs in store_strategy(),
        prefix in word_strategy(),
        k in 0usize..12
    ) {
        let (words, weights) = split(&pairs);
        let index = TermIndex::new(&words, &weights).unwrap();
        let brute = BruteAutocomplete::new(&words, &weights).unwrap();

        prop_assert_eq!(
            Autocompletor::top_matches(&index, prefix.as_str(), k),
            brute.top_matches(&prefix, k)
        );
        prop_assert_eq!(
            Autocompletor::top_match(&index, prefix.as_str()),
            brute.top_match(&prefix)
        );
        for &word in &words {
            prop_assert_eq!(Autocompletor::weight_of(&index, word), brute.weight_of(word));
        }
    }

    #[test]
    fn prop_top_k_laws(pairs in store_strategy(), prefix in word_strategy(), k in 0usize..12) {
        let (words, weights) = split(&pairs);
        let index = TermIndex::new(&words, &weights).unwrap();
        let matched = index.count_matches(&prefix);

        let top = index.top_terms(&prefix, k);
        prop_assert_eq!(top.len(), k.min(matched));
        for w in top.windows(2) {
            prop_assert!(w[0].weight() >= w[1].weight());
        }

        let first = index.top_matches(&prefix, 1);
        prop_assert_eq!(index.top_match(&prefix), first.first().copied());

        for selection in [Selection::Sort, Selection::Heap] {
            prop_assert_eq!(
                index.top_matches_with(&prefix, k, selection),
                index.top_matches(&prefix, k)
            );
        }
        prop_assert_eq!(index.top_matches(&prefix, k), index.top_matches(&prefix, k));
    }
}
