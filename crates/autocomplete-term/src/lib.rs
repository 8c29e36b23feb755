//! Weighted terms and the orderings prefix autocomplete is built on.
//!
//! A [`Term`] is a `(word, weight)` pair. Its natural order ([`Ord`]) sorts by
//! word using plain character-code order (case sensitive), then by weight, so
//! a slice of terms can be sorted once and searched by prefix afterwards.
//!
//! Searches are parameterized by a [`TermOrder`] strategy:
//! [`LexicalOrder`] compares full words, [`PrefixOrder`] compares only the
//! first `r` characters, and [`WeightOrder`] / [`ReverseWeightOrder`] rank by
//! weight. Any `Fn(&Term, &Term) -> Ordering` closure is also a strategy.
//!
//! ```rust
//! use std::cmp::Ordering;
//! use autocomplete_term::{PrefixOrder, Term, TermOrder};
//!
//! let bell = Term::new("bell", 4.0);
//! let probe = Term::new("be", 0.0);
//! assert_eq!(PrefixOrder::new(2).compare(&bell, &probe), Ordering::Equal);
//! assert_eq!(PrefixOrder::new(3).compare(&bell, &probe), Ordering::Greater);
//! ```

use std::cmp::Ordering;
use std::fmt;

/// A word paired with a non-negative weight.
#[derive(Clone, Debug)]
pub struct Term {
    word: String,
    weight: f64,
}

impl Term {
    pub fn new(word: impl Into<String>, weight: f64) -> Self {
        Self {
            word: word.into(),
            weight,
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Compare the word against `other` ignoring case, one `char` at a time.
    ///
    /// Uses full Unicode lowercase mapping, so `"STRASSE"` does not equal
    /// `"straße"` but `"Ärger"` equals `"ärger"`.
    pub fn word_eq_ignore_case(&self, other: &str) -> bool {
        self.word
            .chars()
            .flat_map(char::to_lowercase)
            .eq(other.chars().flat_map(char::to_lowercase))
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Term {}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        self.word
            .cmp(&other.word)
            .then_with(|| self.weight.total_cmp(&other.weight))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.weight, self.word)
    }
}

/// Comparison strategy handed to the search primitives.
pub trait TermOrder {
    fn compare(&self, a: &Term, b: &Term) -> Ordering;
}

impl<F> TermOrder for F
where
    F: Fn(&Term, &Term) -> Ordering,
{
    fn compare(&self, a: &Term, b: &Term) -> Ordering {
        self(a, b)
    }
}

/// Full-word character-code order.
#[derive(Clone, Copy, Debug, Default)]
pub struct LexicalOrder;

impl TermOrder for LexicalOrder {
    fn compare(&self, a: &Term, b: &Term) -> Ordering {
        a.word.cmp(&b.word)
    }
}

/// Order on the first `r` characters of each word.
///
/// Words are truncated to `r` characters and the truncations compared, which
/// keeps the order consistent with [`LexicalOrder`]: a slice sorted by word
/// is also sorted under every `PrefixOrder`. A word shorter than `r` is a
/// proper prefix of any `r`-character key it shares characters with, so it
/// sorts before that key and never compares equal to it.
#[derive(Clone, Copy, Debug)]
pub struct PrefixOrder {
    len: usize,
}

impl PrefixOrder {
    pub fn new(len: usize) -> Self {
        Self { len }
    }

    /// Prefix length in characters.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl TermOrder for PrefixOrder {
    fn compare(&self, a: &Term, b: &Term) -> Ordering {
        truncate_chars(&a.word, self.len).cmp(truncate_chars(&b.word, self.len))
    }
}

/// Ascending weight.
#[derive(Clone, Copy, Debug, Default)]
pub struct WeightOrder;

impl TermOrder for WeightOrder {
    fn compare(&self, a: &Term, b: &Term) -> Ordering {
        a.weight.total_cmp(&b.weight)
    }
}

/// Descending weight. Ties compare equal; callers that need a stable
/// tie-break rely on a stable sort over an already word-sorted slice.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReverseWeightOrder;

impl TermOrder for ReverseWeightOrder {
    fn compare(&self, a: &Term, b: &Term) -> Ordering {
        b.weight.total_cmp(&a.weight)
    }
}

/// First `n` characters of `s` (all of `s` when it is shorter).
pub fn truncate_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
