use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use autocomplete_term::{ReverseWeightOrder, Term, TermOrder, WeightOrder};

/// The heap pays off once the match range is this many times larger than `k`.
pub const HEAP_RATIO: usize = 8;

/// How `top_matches` ranks a match range.
///
/// Every strategy yields the same sequence: weight descending, with equal
/// weights kept in store (lexicographic) order.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Selection {
    /// Pick per query from the range size and `k`.
    #[default]
    Auto,
    /// Stable sort of the whole range, `O(m log m)`.
    Sort,
    /// Bounded min-heap of size `k`, `O(m log k)`.
    Heap,
}

impl Selection {
    /// Collapse `Auto` into a concrete strategy for `k` out of `m` matches.
    pub fn resolve(self, k: usize, m: usize) -> Self {
        match self {
            Selection::Auto if k.saturating_mul(HEAP_RATIO) < m => Selection::Heap,
            Selection::Auto => Selection::Sort,
            other => other,
        }
    }
}

/// Up to `k` of `matches` by descending weight.
pub fn top_k(matches: &[Term], k: usize, selection: Selection) -> Vec<&Term> {
    if k == 0 || matches.is_empty() {
        return Vec::new();
    }
    match selection.resolve(k, matches.len()) {
        Selection::Heap => top_k_heap(matches, k),
        _ => top_k_sort(matches, k),
    }
}

/// Heaviest term in `matches`; the earliest one wins a tie.
pub fn top_one(matches: &[Term]) -> Option<&Term> {
    let mut best: Option<&Term> = None;
    for term in matches {
        match best {
            Some(current) if current.weight() >= term.weight() => {}
            _ => best = Some(term),
        }
    }
    best
}

fn top_k_sort(matches: &[Term], k: usize) -> Vec<&Term> {
    let mut ranked: Vec<&Term> = matches.iter().collect();
    ranked.sort_by(|a, b| ReverseWeightOrder.compare(a, b));
    ranked.truncate(k);
    ranked
}

fn top_k_heap(matches: &[Term], k: usize) -> Vec<&Term> {
    let mut heap: BinaryHeap<Reverse<Ranked<'_>>> =
        BinaryHeap::with_capacity(k.min(matches.len()));
    for (pos, term) in matches.iter().enumerate() {
        let candidate = Ranked { term, pos };
        if heap.len() < k {
            heap.push(Reverse(candidate));
        } else if let Some(mut weakest) = heap.peek_mut()
            && candidate > weakest.0
        {
            *weakest = Reverse(candidate);
        }
    }
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(ranked)| ranked.term)
        .collect()
}

/// Heap entry: heavier is greater, and among equal weights the earlier
/// position is greater so it survives eviction.
struct Ranked<'a> {
    term: &'a Term,
    pos: usize,
}

impl PartialEq for Ranked<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked<'_> {}

impl PartialOrd for Ranked<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        WeightOrder
            .compare(self.term, other.term)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Term> {
        [
            ("a0", 3.0),
            ("a1", 9.0),
            ("a2", 3.0),
            ("a3", 7.0),
            ("a4", 9.0),
            ("a5", 1.0),
            ("a6", 3.0),
        ]
        .into_iter()
        .map(|(w, x)| Term::new(w, x))
        .collect()
    }

    fn words<'a>(terms: &[&'a Term]) -> Vec<&'a str> {
        terms.iter().map(|t| t.word()).collect()
    }

    #[test]
    fn auto_prefers_heap_for_small_k() {
        assert_eq!(Selection::Auto.resolve(1, 100), Selection::Heap);
        assert_eq!(Selection::Auto.resolve(20, 100), Selection::Sort);
        assert_eq!(Selection::Sort.resolve(1, 100), Selection::Sort);
        assert_eq!(Selection::Heap.resolve(100, 1), Selection::Heap);
        assert_eq!(Selection::Auto.resolve(usize::MAX, 3), Selection::Sort);
    }

    #[test]
    fn sort_keeps_store_order_on_ties() {
        let terms = sample();
        let top = top_k(&terms, 5, Selection::Sort);
        assert_eq!(words(&top), vec!["a1", "a4", "a3", "a0", "a2"]);
    }

    #[test]
    fn heap_matches_sort_for_every_k() {
        let terms = sample();
        for k in 0..=terms.len() + 2 {
            assert_eq!(
                words(&top_k(&terms, k, Selection::Heap)),
                words(&top_k(&terms, k, Selection::Sort)),
                "k={k}"
            );
        }
    }

    #[test]
    fn zero_k_and_empty_input() {
        let terms = sample();
        assert!(top_k(&terms, 0, Selection::Auto).is_empty());
        assert!(top_k(&[], 3, Selection::Heap).is_empty());
    }

    #[test]
    fn huge_k_returns_every_match() {
        let terms = sample();
        for selection in [Selection::Heap, Selection::Sort, Selection::Auto] {
            let top = top_k(&terms, usize::MAX, selection);
            assert_eq!(
                words(&top),
                vec!["a1", "a4", "a3", "a0", "a2", "a6", "a5"],
                "{selection:?}"
            );
        }
    }

    #[test]
    fn top_one_first_occurrence_wins() {
        let terms = sample();
        assert_eq!(top_one(&terms).map(Term::word), Some("a1"));
        assert_eq!(top_one(&[]), None);
    }
}
