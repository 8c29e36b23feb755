//! Leftmost/rightmost binary search under an equivalence-inducing order.
//!
//! Both searches keep an inclusive bracket `[lo, hi]` that must contain the
//! answer if one exists, spend one comparator call per halving step, and
//! finish with a single equivalence check on the surviving index. For a
//! slice of length `n` that is at most `1 + ceil(log2 n)` comparator calls.

use std::cmp::Ordering;

use autocomplete_term::{Term, TermOrder};

/// Index of the first element `order` considers equivalent to `key`.
///
/// `items` must be sorted consistently with `order`. Returns `None` when no
/// element is equivalent, including for an empty slice.
pub fn first_index_of<O>(items: &[Term], key: &Term, order: &O) -> Option<usize>
where
    O: TermOrder + ?Sized,
{
    if items.is_empty() {
        return None;
    }
    let mut lo = 0;
    let mut hi = items.len() - 1;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if order.compare(&items[mid], key) == Ordering::Less {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    (order.compare(&items[lo], key) == Ordering::Equal).then_some(lo)
}

/// Index of the last element `order` considers equivalent to `key`.
pub fn last_index_of<O>(items: &[Term], key: &Term, order: &O) -> Option<usize>
where
    O: TermOrder + ?Sized,
{
    if items.is_empty() {
        return None;
    }
    let mut lo = 0;
    let mut hi = items.len() - 1;
    while lo < hi {
        // Round up so the bracket always shrinks when `lo` moves.
        let mid = lo + (hi - lo).div_ceil(2);
        if order.compare(&items[mid], key) == Ordering::Greater {
            hi = mid - 1;
        } else {
            lo = mid;
        }
    }
    (order.compare(&items[lo], key) == Ordering::Equal).then_some(lo)
}
